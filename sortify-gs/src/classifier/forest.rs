//! Random forest backed by smartcore
//!
//! Training rows are packed into an `ndarray` matrix and handed to
//! smartcore's bagged CART forest. Class labels are indices into the sorted
//! genre list, so smartcore's first-maximum vote resolves ties to the lowest
//! index.

use crate::error::GenreError;
use ndarray::{Array1, Array2};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};

type Forest = RandomForestClassifier<f64, i32, Array2<f64>, Array1<i32>>;

/// Candidate features per split: `floor(sqrt(n_features))`, at least one
pub(crate) fn sqrt_features(n_features: usize) -> usize {
    ((n_features as f64).sqrt().floor() as usize).max(1)
}

/// Pack equally long rows into a row-major matrix
pub(crate) fn to_matrix(rows: &[&[f64]]) -> Result<Array2<f64>, GenreError> {
    let n_cols = rows.first().map_or(0, |r| r.len());
    let flat: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
    Array2::from_shape_vec((rows.len(), n_cols), flat).map_err(|e| GenreError::Model(e.to_string()))
}

/// Fitted forest
///
/// smartcore needs at least two classes to grow a tree; a one-genre training
/// set keeps no trees and always answers class 0.
pub(crate) struct RandomForest {
    model: Option<Forest>,
    n_trees: usize,
    max_features: usize,
}

impl std::fmt::Debug for RandomForest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomForest")
            .field("n_trees", &self.n_trees)
            .field("max_features", &self.max_features)
            .field("single_class", &self.model.is_none())
            .finish()
    }
}

impl RandomForest {
    pub(crate) fn fit(
        rows: &[&[f64]],
        labels: &[usize],
        n_classes: usize,
        n_trees: usize,
        max_depth: usize,
        seed: u64,
    ) -> Result<Self, GenreError> {
        let n_features = rows.first().map_or(0, |r| r.len());
        let max_features = sqrt_features(n_features);

        if n_classes < 2 {
            return Ok(Self {
                model: None,
                n_trees: 0,
                max_features,
            });
        }

        let x = to_matrix(rows)?;
        let y: Array1<i32> = labels
            .iter()
            .map(|&l| i32::try_from(l).map_err(|e| GenreError::Model(e.to_string())))
            .collect::<Result<_, _>>()?;

        let params = RandomForestClassifierParameters::default()
            .with_n_trees(u16::try_from(n_trees).unwrap_or(u16::MAX))
            .with_max_depth(u16::try_from(max_depth).unwrap_or(u16::MAX))
            .with_m(max_features)
            .with_seed(seed);

        let model = Forest::fit(&x, &y, params).map_err(|e| GenreError::Model(e.to_string()))?;

        Ok(Self {
            model: Some(model),
            n_trees,
            max_features,
        })
    }

    /// Majority-vote class index per row, in row order
    pub(crate) fn predict_classes(&self, rows: &[&[f64]]) -> Result<Vec<usize>, GenreError> {
        let model = match &self.model {
            Some(model) => model,
            None => return Ok(vec![0; rows.len()]),
        };
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let predicted = model
            .predict(&to_matrix(rows)?)
            .map_err(|e| GenreError::Model(e.to_string()))?;

        Ok(predicted.iter().map(|&c| c.max(0) as usize).collect())
    }

    pub(crate) fn n_trees(&self) -> usize {
        self.n_trees
    }

    pub(crate) fn max_features(&self) -> usize {
        self.max_features
    }
}
