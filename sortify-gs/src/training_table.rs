//! Training table builder
//!
//! Turns raw historical track records into index-aligned feature vectors and
//! canonical genre labels:
//! 1. Records without any genre, or whose first genre is blank, are skipped
//!    (they cannot be labeled)
//! 2. Each record gets one canonical genre (see [`canonical_genre`])
//! 3. Genres with fewer than `min_tracks` records are removed entirely
//! 4. Surviving records are projected onto [`FEATURE_NAMES`]
//!
//! Support counts are computed once over the whole labeled dataset before any
//! record is removed.

use crate::error::GenreError;
use crate::types::{CanonicalGenre, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use std::collections::HashMap;
use tracing::{debug, info};

/// Default minimum support for a genre to stay in the training set
pub const DEFAULT_MIN_TRACKS: usize = 100;

/// One historical track with its raw genre list and raw field values
///
/// Field values stay unparsed until the record survives filtering, so a bad
/// value on a record that is dropped anyway never fails the build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTrackRecord {
    /// Raw genre phrases, most significant first
    pub genres: Vec<String>,
    /// Raw field values keyed by column name
    pub fields: HashMap<String, String>,
}

impl RawTrackRecord {
    pub fn new(genres: Vec<String>, fields: HashMap<String, String>) -> Self {
        Self { genres, fields }
    }
}

/// Cleaned training data: `features[i]` is labeled `labels[i]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingTable {
    pub features: Vec<FeatureVector>,
    pub labels: Vec<CanonicalGenre>,
}

impl TrainingTable {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of rows per genre
    pub fn genre_counts(&self) -> HashMap<CanonicalGenre, usize> {
        count_genres(self.labels.iter().map(String::as_str))
    }
}

/// Derive the canonical genre of a raw genre list
///
/// Takes the first raw genre, lowercases it, and keeps its last word. Words
/// are separated by whitespace or hyphens, so "k-pop" and "dance pop" both
/// give "pop". Lossy and order-dependent: later genres in the list are never
/// looked at.
///
/// Returns `None` for an empty list or a first genre with no words.
pub fn canonical_genre(genres: &[String]) -> Option<CanonicalGenre> {
    let first = genres.first()?;
    first
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|word| !word.is_empty())
        .last()
        .map(str::to_string)
}

fn count_genres<'a>(genres: impl Iterator<Item = &'a str>) -> HashMap<CanonicalGenre, usize> {
    let mut counts = HashMap::new();
    for genre in genres {
        *counts.entry(genre.to_string()).or_insert(0) += 1;
    }
    counts
}

fn parse_feature(position: usize, fields: &HashMap<String, String>, name: &str) -> Result<f64, GenreError> {
    let raw = fields.get(name).ok_or_else(|| GenreError::DataFormat {
        position,
        field: name.to_string(),
        reason: "is missing".to_string(),
    })?;

    let value: f64 = raw.trim().parse().map_err(|_| GenreError::DataFormat {
        position,
        field: name.to_string(),
        reason: format!("is not numeric: '{}'", raw),
    })?;

    if !value.is_finite() {
        return Err(GenreError::DataFormat {
            position,
            field: name.to_string(),
            reason: format!("is not a finite number: '{}'", raw),
        });
    }

    Ok(value)
}

/// Build the training table from raw records
///
/// Record numbers in errors are positions in `records`.
pub fn build_training_table(
    records: &[RawTrackRecord],
    min_tracks: usize,
) -> Result<TrainingTable, GenreError> {
    let labeled: Vec<(usize, CanonicalGenre)> = records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| canonical_genre(&r.genres).map(|g| (i, g)))
        .collect();

    debug!(
        total = records.len(),
        labeled = labeled.len(),
        "Skipped records without genre information"
    );

    // Counts are taken once, before any removal
    let counts = count_genres(labeled.iter().map(|(_, g)| g.as_str()));
    let dropped_genres = counts.values().filter(|&&c| c < min_tracks).count();

    let mut table = TrainingTable::default();
    for (index, genre) in labeled {
        if counts.get(&genre).copied().unwrap_or(0) < min_tracks {
            continue;
        }

        let fields = &records[index].fields;
        let mut values = Vec::with_capacity(FEATURE_COUNT);
        for name in FEATURE_NAMES {
            values.push(parse_feature(index, fields, name)?);
        }

        table.features.push(FeatureVector::new(values));
        table.labels.push(genre);
    }

    if table.is_empty() {
        return Err(GenreError::EmptyTrainingSet);
    }

    info!(
        rows = table.len(),
        genres = counts.len() - dropped_genres,
        dropped_genres,
        min_tracks,
        "Training table built"
    );

    Ok(table)
}
