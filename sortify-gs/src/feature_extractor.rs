//! Track feature extraction
//!
//! Projects loosely-typed music-service responses onto the typed values the
//! classifier needs. Audio-feature responses carry many more fields than the
//! ten in [`FEATURE_NAMES`]; those are ignored. Nothing is normalized or
//! imputed: a missing feature is an error, never a default.

use crate::error::GenreError;
use crate::types::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use serde_json::Value;

fn extract_at(response: &Value, position: usize) -> Result<FeatureVector, GenreError> {
    let mut values = Vec::with_capacity(FEATURE_COUNT);

    for name in FEATURE_NAMES {
        // A null response (track without analysis) has no fields at all
        let value = response
            .get(name)
            .filter(|v| !v.is_null())
            .ok_or_else(|| GenreError::MissingFeature {
                feature: name.to_string(),
                position,
            })?;

        let number = value.as_f64().ok_or_else(|| GenreError::DataFormat {
            position,
            field: name.to_string(),
            reason: format!("is not numeric: {}", value),
        })?;

        values.push(number);
    }

    Ok(FeatureVector::new(values))
}

/// Build the feature vector for one audio-feature response
pub fn extract_features(response: &Value) -> Result<FeatureVector, GenreError> {
    extract_at(response, 0)
}

/// Build feature vectors for a batch of responses, preserving order
///
/// Error positions refer to indices in `responses`.
pub fn extract_feature_batch(responses: &[Value]) -> Result<Vec<FeatureVector>, GenreError> {
    responses
        .iter()
        .enumerate()
        .map(|(i, r)| extract_at(r, i))
        .collect()
}

/// Unwrap saved-track entries (`{"track": {"id": ...}}`) into track ids
pub fn extract_track_ids(wrappers: &[Value]) -> Result<Vec<String>, GenreError> {
    wrappers
        .iter()
        .enumerate()
        .map(|(position, wrapper)| {
            let track = wrapper
                .get("track")
                .filter(|t| t.is_object())
                .ok_or_else(|| GenreError::MalformedTrack {
                    position,
                    reason: "missing inner track object".to_string(),
                })?;

            track
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| GenreError::MalformedTrack {
                    position,
                    reason: "track has no identifier".to_string(),
                })
        })
        .collect()
}
