//! The discrete dataset consumed by the selector.
//!
//! Features are stored feature-major: row `i` of the matrix holds feature
//! `i` for every sample, so each feature is one contiguous slice and every
//! histogram pass walks memory linearly. Codes are trusted to be dense and
//! zero-based within each column; they are not re-validated here.
use ndarray::{Array2, ArrayView2};

use crate::error::{Result, SelectionError};

#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteDataset {
    /// Feature codes, `n_features * n_samples`, one feature per row.
    codes: Vec<u32>,
    n_features: usize,
    n_samples: usize,
    labels: Vec<u32>,
    weights: Option<Vec<f64>>,
}

impl DiscreteDataset {
    /// Build a dataset from a feature-major matrix (`n_features x n_samples`)
    /// and one label per sample.
    pub fn new(features: Array2<u32>, labels: Vec<u32>) -> Result<Self> {
        let (n_features, n_samples) = features.dim();
        if labels.len() != n_samples {
            return Err(SelectionError::LengthMismatch {
                what: "labels",
                expected: n_samples,
                found: labels.len(),
            });
        }
        // Logical (row-major) order regardless of the input's memory layout.
        let codes: Vec<u32> = features.iter().copied().collect();

        Ok(Self {
            codes,
            n_features,
            n_samples,
            labels,
            weights: None,
        })
    }

    /// Build a dataset from the conventional sample-major layout
    /// (`n_samples x n_features`).
    pub fn from_sample_major(x: ArrayView2<'_, u32>, labels: Vec<u32>) -> Result<Self> {
        Self::new(x.t().to_owned(), labels)
    }

    /// Build a dataset from one code vector per feature.
    pub fn from_columns(columns: Vec<Vec<u32>>, labels: Vec<u32>) -> Result<Self> {
        let n_samples = labels.len();
        let n_features = columns.len();
        let mut codes = Vec::with_capacity(n_features * n_samples);
        for column in columns {
            if column.len() != n_samples {
                return Err(SelectionError::LengthMismatch {
                    what: "feature column",
                    expected: n_samples,
                    found: column.len(),
                });
            }
            codes.extend(column);
        }
        Ok(Self {
            codes,
            n_features,
            n_samples,
            labels,
            weights: None,
        })
    }

    /// Attach per-sample weights, switching selection to its cost-sensitive
    /// form.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Result<Self> {
        if weights.len() != self.n_samples {
            return Err(SelectionError::LengthMismatch {
                what: "weights",
                expected: self.n_samples,
                found: weights.len(),
            });
        }
        if let Some((index, &value)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(SelectionError::InvalidWeight { index, value });
        }
        self.weights = Some(weights);
        Ok(self)
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Codes of feature `index`, one per sample.
    ///
    /// Panics if `index >= n_features()`.
    pub fn feature(&self, index: usize) -> &[u32] {
        assert!(index < self.n_features, "feature index out of bounds");
        let start = index * self.n_samples;
        &self.codes[start..start + self.n_samples]
    }

    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    pub fn is_weighted(&self) -> bool {
        self.weights.is_some()
    }
}
