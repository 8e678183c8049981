//! Core types shared by the classification pipeline
//!
//! The feature order defined here is the contract between the training table
//! and inference: every [`FeatureVector`] holds the values of
//! [`FEATURE_NAMES`] in exactly this order.

use serde::{Deserialize, Serialize};

/// Audio features used for classification, in vector order
pub const FEATURE_NAMES: [&str; 10] = [
    "acousticness",
    "danceability",
    "duration_ms",
    "energy",
    "instrumentalness",
    "liveness",
    "loudness",
    "speechiness",
    "tempo",
    "valence",
];

/// Number of features in a [`FeatureVector`]
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Single-token genre label used as the classification target
pub type CanonicalGenre = String;

/// Ordered numeric audio features for one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value at `index`, in [`FEATURE_NAMES`] order
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values.to_vec())
    }
}
