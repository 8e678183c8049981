//! Error types for sortify-gs
//!
//! [`GenreError`] covers the classification pipeline. Every variant is a hard
//! failure: the pipeline never retries and never skips malformed input.
//! [`SortError`] is what a sorting run reports, wrapping pipeline, service
//! and dataset failures.

use crate::dataset::DatasetError;
use crate::services::ServiceError;
use thiserror::Error;

/// Classification pipeline errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenreError {
    /// Feature field absent or non-numeric
    ///
    /// `position` indexes the training records or the feature responses,
    /// whichever input was being read.
    #[error("Data format error at position {position}: field '{field}' {reason}")]
    DataFormat {
        position: usize,
        field: String,
        reason: String,
    },

    /// No records left after cleaning and support filtering
    #[error("Training set is empty after filtering")]
    EmptyTrainingSet,

    /// `predict` called on a classifier that was never trained
    #[error("Classifier has not been trained")]
    UntrainedModel,

    /// `train` called on a classifier that is already trained
    #[error("Classifier is already trained")]
    AlreadyTrained,

    /// Vector length differs from the training feature count
    #[error("Feature vector has {actual} values, expected {expected}")]
    FeatureShape { expected: usize, actual: usize },

    /// Feature response lacks a named feature
    #[error("Feature response {position} is missing '{feature}'")]
    MissingFeature { feature: String, position: usize },

    /// Saved-track wrapper without an inner track or identifier
    #[error("Malformed track at position {position}: {reason}")]
    MalformedTrack { position: usize, reason: String },

    /// The underlying forest failed to fit or predict
    #[error("Model error: {0}")]
    Model(String),

    /// Two index-aligned sequences differ in length
    #[error("Length mismatch: {left} {what} vs {right}")]
    LengthMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },
}

/// Sorting run errors
#[derive(Debug, Error)]
pub enum SortError {
    /// Classification pipeline error
    #[error(transparent)]
    Genre(#[from] GenreError),

    /// Music service error
    #[error("Music service error: {0}")]
    Service(#[from] ServiceError),

    /// Training dataset could not be loaded
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
}

/// Result type for sorting runs
pub type SortResult<T> = Result<T, SortError>;
