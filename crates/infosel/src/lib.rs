//! infosel: information-theoretic feature selection for discrete data.
//!
//! The crate estimates entropies and (conditional) mutual information from
//! integer-coded columns and uses them to greedily pick an informative,
//! non-redundant subset of features with respect to a label. MIM, MIFS, CIFE
//! (and any β/γ mix), CMIM, JMI, DISR, ICAP, CondMI and mRMR are supported;
//! MIM, CMIM, CondMI, DISR and JMI also accept per-sample weights.
//!
//! ```rust
//! use infosel::{Criterion, DiscreteDataset, FeatureSelector};
//! use ndarray::array;
//!
//! let data = DiscreteDataset::new(
//!     array![[0, 0, 1, 1], [1, 0, 1, 0]],
//!     vec![0, 0, 1, 1],
//! ).unwrap();
//! let selected = FeatureSelector::new(Criterion::Jmi).select(&data, 2).unwrap();
//! assert_eq!(selected.indices(), vec![0, 1]);
//! ```
pub mod config;
pub mod dataset;
pub mod error;
pub mod feature_selection;
pub mod math;

pub use config::{load_selection_config, SelectionConfig};
pub use dataset::DiscreteDataset;
pub use error::{Result, SelectionError};
pub use feature_selection::{
    select_features, Criterion, FeatureSelector, ScoredFeatures, SelectedFeature, StopReason,
};
