//! Genre classifier
//!
//! A random forest trained once per run on the training table and then used
//! for batch inference. Predictions are index-aligned with their input.
//!
//! Each tree votes; ties between equally voted genres resolve to the lexicographically
//! smallest genre, since class indices follow sorted genre order.

mod forest;

use crate::error::GenreError;
use crate::types::{CanonicalGenre, FeatureVector};
use forest::RandomForest;
use sortify_common::config::ClassifierConfig;
use std::collections::BTreeSet;
use tracing::info;

/// Forest hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestParams {
    /// Number of trees
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Seed for bootstrap sampling and feature subsampling
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            seed: 42,
        }
    }
}

impl From<&ClassifierConfig> for ForestParams {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            n_trees: config.n_trees.max(1),
            max_depth: config.max_depth.max(1),
            seed: config.seed,
        }
    }
}

/// Fitted model: immutable after training
#[derive(Debug)]
pub struct TrainedModel {
    classes: Vec<CanonicalGenre>,
    n_features: usize,
    forest: RandomForest,
}

impl TrainedModel {
    fn fit(
        features: &[FeatureVector],
        labels: &[CanonicalGenre],
        params: ForestParams,
    ) -> Result<Self, GenreError> {
        if features.len() != labels.len() {
            return Err(GenreError::LengthMismatch {
                what: "feature vectors vs labels",
                left: features.len(),
                right: labels.len(),
            });
        }
        if features.is_empty() {
            return Err(GenreError::EmptyTrainingSet);
        }

        let n_features = features[0].len();
        if n_features == 0 {
            return Err(GenreError::FeatureShape {
                expected: crate::types::FEATURE_COUNT,
                actual: 0,
            });
        }
        if let Some(ragged) = features.iter().find(|f| f.len() != n_features) {
            return Err(GenreError::FeatureShape {
                expected: n_features,
                actual: ragged.len(),
            });
        }

        let classes: Vec<CanonicalGenre> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let class_index: Vec<usize> = labels
            .iter()
            .map(|l| classes.binary_search(l).unwrap_or_default())
            .collect();
        let rows: Vec<&[f64]> = features.iter().map(FeatureVector::as_slice).collect();

        let forest = RandomForest::fit(
            &rows,
            &class_index,
            classes.len(),
            params.n_trees,
            params.max_depth,
            params.seed,
        )?;

        info!(
            rows = rows.len(),
            classes = classes.len(),
            trees = forest.n_trees(),
            features_per_split = forest.max_features(),
            seed = params.seed,
            "Genre classifier trained"
        );

        Ok(Self {
            classes,
            n_features,
            forest,
        })
    }

    /// Genres the model can predict, sorted
    pub fn classes(&self) -> &[CanonicalGenre] {
        &self.classes
    }

    /// Vector length seen during training
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Predict one genre per vector, in input order
    ///
    /// Fails on the first vector whose length differs from the training
    /// feature count; nothing is predicted in that case.
    pub fn predict(&self, vectors: &[FeatureVector]) -> Result<Vec<CanonicalGenre>, GenreError> {
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.n_features) {
            return Err(GenreError::FeatureShape {
                expected: self.n_features,
                actual: bad.len(),
            });
        }

        let rows: Vec<&[f64]> = vectors.iter().map(FeatureVector::as_slice).collect();
        self.forest
            .predict_classes(&rows)?
            .into_iter()
            .map(|class| {
                self.classes
                    .get(class)
                    .cloned()
                    .ok_or_else(|| GenreError::Model(format!("unknown class index {}", class)))
            })
            .collect()
    }
}

/// Train-once, predict-many genre classifier
#[derive(Debug, Default)]
pub struct GenreClassifier {
    params: ForestParams,
    model: Option<TrainedModel>,
}

impl GenreClassifier {
    pub fn new(params: ForestParams) -> Self {
        Self { params, model: None }
    }

    pub fn params(&self) -> ForestParams {
        self.params
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// The fitted model, if trained
    pub fn model(&self) -> Option<&TrainedModel> {
        self.model.as_ref()
    }

    /// Fit the forest on index-aligned features and labels
    ///
    /// A classifier is fitted exactly once; a second call fails with
    /// [`GenreError::AlreadyTrained`].
    pub fn train(
        &mut self,
        features: &[FeatureVector],
        labels: &[CanonicalGenre],
    ) -> Result<(), GenreError> {
        if self.model.is_some() {
            return Err(GenreError::AlreadyTrained);
        }
        self.model = Some(TrainedModel::fit(features, labels, self.params)?);
        Ok(())
    }

    /// Predict one genre per vector, in input order
    pub fn predict(&self, vectors: &[FeatureVector]) -> Result<Vec<CanonicalGenre>, GenreError> {
        self.model
            .as_ref()
            .ok_or(GenreError::UntrainedModel)?
            .predict(vectors)
    }
}
