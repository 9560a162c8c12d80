use thiserror::Error;

/// Errors reported before a selection run starts.
///
/// Degenerate inputs (zero samples, constant columns) are not errors: the
/// information measures of such columns are exactly zero.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectionError {
    #[error("the number of features to select must be at least 1")]
    ZeroFeatureBudget,

    #[error("{what} has length {found}, expected {expected} (one entry per sample)")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("unknown selection criterion: {0}")]
    UnknownCriterion(String),

    #[error("sample weight at index {index} must be finite and non-negative, got {value}")]
    InvalidWeight { index: usize, value: f64 },

    #[error("criterion {0} has no sample-weighted variant")]
    WeightsUnsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, SelectionError>;
