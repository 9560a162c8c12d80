//! Information-theoretic feature selection.
//!
//! [`FeatureSelector`] runs greedy forward selection with one of the
//! criteria in [`Criterion`]; [`select_features`] drives it from a
//! [`SelectionConfig`].
pub mod criterion;
pub mod greedy;
pub mod pair_cache;

pub use criterion::Criterion;
pub use greedy::{FeatureSelector, ScoredFeatures, SelectedFeature, StopReason};
pub use pair_cache::PairTermCache;

use crate::config::SelectionConfig;
use crate::dataset::DiscreteDataset;
use crate::error::Result;

/// Select features from `data` as described by `config`.
pub fn select_features(data: &DiscreteDataset, config: &SelectionConfig) -> Result<ScoredFeatures> {
    let selector = FeatureSelector::new(config.criterion).parallel(config.parallel);
    match config.num_features {
        Some(k) => selector.select(data, k),
        None => selector.rank(data),
    }
}
