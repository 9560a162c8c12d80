//! Probability estimation and information measures over integer-coded columns.
//!
//! `histogram` accumulates (optionally weighted) frequency tables; the
//! `information` module turns them into entropies and (conditional) mutual
//! information. All logarithms use [`LOG_BASE`], so every quantity in the
//! crate is measured in bits.
pub mod histogram;
pub mod information;

pub use histogram::{
    num_states, FrequencyTable, JointHistogram, MarginalHistogram, SampleWeights, TripleHistogram,
};
pub use information::{
    conditional_entropy, conditional_mutual_information, entropy, joint_entropy,
    joint_mutual_information, merge_states, mutual_information, Estimator,
};

/// Base of every logarithm in the crate.
pub const LOG_BASE: f64 = 2.0;

#[inline]
pub(crate) fn log(x: f64) -> f64 {
    x.log2()
}
