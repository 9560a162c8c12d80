//! Entropy, mutual information and conditional mutual information.
//!
//! | Function | Quantity |
//! |----------|----------|
//! | [`entropy`] | `H(X) = -Σ p(x) log p(x)` |
//! | [`joint_entropy`] | `H(X,Y)` |
//! | [`conditional_entropy`] | `H(X|Y) = H(X,Y) - H(Y)` |
//! | [`mutual_information`] | `I(X;Y) = H(X) + H(Y) - H(X,Y)` |
//! | [`joint_mutual_information`] | `I(X,Z;Y)` with `(X,Z)` merged into one variable |
//! | [`conditional_mutual_information`] | `I(X;Y|Z) = Σ_z p(z) I(X;Y|Z=z)` |
//!
//! The free functions are unweighted; [`Estimator`] carries optional
//! per-sample weights and exposes the same measures.
//!
//! Inputs are columns of dense zero-based codes. Columns with a single state
//! or no samples are valid and produce `0.0`, never NaN. Columns (and
//! weights) of different lengths are rejected with
//! [`SelectionError::LengthMismatch`](crate::error::SelectionError).

use std::collections::HashMap;

use super::histogram::{
    dense_cell_limit, num_states, JointHistogram, MarginalHistogram, SampleWeights,
    TripleHistogram,
};
use crate::error::{Result, SelectionError};

/// Information measures under a fixed sample weighting.
///
/// ```rust
/// use infosel::math::Estimator;
///
/// let x = [0, 0, 1, 1];
/// let y = [0, 0, 1, 1];
/// let weights = [1.0, 1.0, 1.0, 1.0];
///
/// let plain = Estimator::unweighted().mutual_information(&x, &y)?;
/// let weighted = Estimator::weighted(&weights).mutual_information(&x, &y)?;
/// assert_eq!(plain, 1.0);
/// assert_eq!(plain, weighted);
/// # Ok::<(), infosel::SelectionError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Estimator<'a> {
    weights: SampleWeights<'a>,
}

impl<'a> Estimator<'a> {
    pub fn unweighted() -> Self {
        Self {
            weights: SampleWeights::Uniform,
        }
    }

    pub fn weighted(weights: &'a [f64]) -> Self {
        Self {
            weights: SampleWeights::Weighted(weights),
        }
    }

    pub fn from_weights(weights: Option<&'a [f64]>) -> Self {
        Self {
            weights: SampleWeights::from_option(weights),
        }
    }

    pub fn sample_weights(&self) -> SampleWeights<'a> {
        self.weights
    }

    pub fn is_weighted(&self) -> bool {
        matches!(self.weights, SampleWeights::Weighted(_))
    }

    pub fn entropy(&self, x: &[u32]) -> Result<f64> {
        Ok(MarginalHistogram::new(x, self.weights)?.entropy())
    }

    pub fn joint_entropy(&self, x: &[u32], y: &[u32]) -> Result<f64> {
        Ok(JointHistogram::new(x, y, self.weights)?.joint_entropy())
    }

    pub fn conditional_entropy(&self, x: &[u32], given: &[u32]) -> Result<f64> {
        let joint = JointHistogram::new(x, given, self.weights)?;
        Ok((joint.joint_entropy() - joint.y_marginal().entropy()).max(0.0))
    }

    pub fn mutual_information(&self, x: &[u32], y: &[u32]) -> Result<f64> {
        Ok(JointHistogram::new(x, y, self.weights)?.mutual_information())
    }

    /// `I(X,Z;Y)`: the information the pair `(x, z)` carries about `y`.
    pub fn joint_mutual_information(&self, x: &[u32], z: &[u32], y: &[u32]) -> Result<f64> {
        let merged = merge_states(x, z)?;
        self.mutual_information(&merged, y)
    }

    pub fn conditional_mutual_information(
        &self,
        x: &[u32],
        y: &[u32],
        z: &[u32],
    ) -> Result<f64> {
        Ok(TripleHistogram::new(x, y, z, self.weights)?.conditional_mutual_information())
    }
}

/// Shannon entropy of `x` in bits.
pub fn entropy(x: &[u32]) -> Result<f64> {
    Estimator::unweighted().entropy(x)
}

/// Joint entropy `H(X,Y)`.
pub fn joint_entropy(x: &[u32], y: &[u32]) -> Result<f64> {
    Estimator::unweighted().joint_entropy(x, y)
}

/// Conditional entropy `H(X|Y)`.
pub fn conditional_entropy(x: &[u32], given: &[u32]) -> Result<f64> {
    Estimator::unweighted().conditional_entropy(x, given)
}

/// Mutual information `I(X;Y)`.
///
/// Exactly `0.0` when either column is constant or the two are independent
/// in the empirical distribution.
pub fn mutual_information(x: &[u32], y: &[u32]) -> Result<f64> {
    Estimator::unweighted().mutual_information(x, y)
}

/// Joint mutual information `I(X,Z;Y)`.
pub fn joint_mutual_information(x: &[u32], z: &[u32], y: &[u32]) -> Result<f64> {
    Estimator::unweighted().joint_mutual_information(x, z, y)
}

/// Conditional mutual information `I(X;Y|Z)`, always non-negative.
pub fn conditional_mutual_information(x: &[u32], y: &[u32], z: &[u32]) -> Result<f64> {
    Estimator::unweighted().conditional_mutual_information(x, y, z)
}

/// Merge two columns into a single column over their joint states.
///
/// Joint states are renumbered densely in order of first appearance, so the
/// result has at most `min(len, states(a) * states(b))` states and can be fed
/// back into any measure (or merged again) without its state space growing
/// with the number of merged columns.
pub fn merge_states(first: &[u32], second: &[u32]) -> Result<Vec<u32>> {
    if first.len() != second.len() {
        return Err(SelectionError::LengthMismatch {
            what: "merged column",
            expected: first.len(),
            found: second.len(),
        });
    }
    let first_states = num_states(first).max(1) as u128;
    let joint_states = first_states * num_states(second).max(1) as u128;
    let mut next_state = 0u32;

    // The lookup vector is sized like a dense frequency table for this many
    // samples; larger joint spaces go through a map of the observed pairs.
    let merged = if joint_states <= dense_cell_limit(first.len()) {
        let mut ids = vec![u32::MAX; joint_states as usize];
        first
            .iter()
            .zip(second)
            .map(|(&a, &b)| {
                let slot = &mut ids[(a as u128 + first_states * b as u128) as usize];
                if *slot == u32::MAX {
                    *slot = next_state;
                    next_state += 1;
                }
                *slot
            })
            .collect()
    } else {
        let mut ids: HashMap<u128, u32> = HashMap::with_capacity(first.len());
        first
            .iter()
            .zip(second)
            .map(|(&a, &b)| {
                *ids.entry(a as u128 + first_states * b as u128)
                    .or_insert_with(|| {
                        let id = next_state;
                        next_state += 1;
                        id
                    })
            })
            .collect()
    };
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn fair_coin_has_one_bit() {
        assert_eq!(entropy(&[0, 1, 0, 1]).unwrap(), 1.0);
        assert_eq!(entropy(&[0, 1, 2, 3]).unwrap(), 2.0);
    }

    #[test]
    fn constant_column_has_zero_entropy() {
        assert_eq!(entropy(&[0, 0, 0, 0]).unwrap(), 0.0);
        assert_eq!(entropy(&[]).unwrap(), 0.0);
    }

    #[test]
    fn identical_columns_share_all_information() {
        let x = [0, 1, 2, 0, 1, 1];
        assert_abs_diff_eq!(
            mutual_information(&x, &x).unwrap(),
            entropy(&x).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn independent_columns_have_exactly_zero_mi() {
        let x = [0, 0, 1, 1];
        let y = [0, 1, 0, 1];
        assert_eq!(mutual_information(&x, &y).unwrap(), 0.0);
        assert_eq!(mutual_information(&[0, 0, 0, 0], &x).unwrap(), 0.0);
    }

    #[test]
    fn xor_label_is_invisible_pairwise_but_not_jointly() -> Result<()> {
        let a = [0, 0, 1, 1];
        let b = [0, 1, 0, 1];
        let y = [0, 1, 1, 0];
        assert_eq!(mutual_information(&a, &y)?, 0.0);
        assert_eq!(mutual_information(&b, &y)?, 0.0);
        assert_abs_diff_eq!(joint_mutual_information(&a, &b, &y)?, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(conditional_mutual_information(&a, &y, &b)?, 1.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn conditional_entropy_of_determined_column_is_zero() -> Result<()> {
        let x = [0, 1, 1, 0];
        let y = [1, 0, 0, 1];
        assert_eq!(conditional_entropy(&x, &y)?, 0.0);
        assert_abs_diff_eq!(conditional_entropy(&x, &[0, 0, 0, 0])?, 1.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn merge_numbers_joint_states_by_first_appearance() {
        let merged = merge_states(&[1, 0, 1, 0, 1], &[0, 0, 0, 1, 0]).unwrap();
        assert_eq!(merged, vec![0, 1, 0, 2, 0]);
    }

    #[test]
    fn merge_of_wide_state_space_uses_observed_pairs() {
        let first = [0, 1 << 20, 0];
        let second = [1 << 20, 0, 1 << 20];
        let joint_states = ((1u128 << 20) + 1) * ((1u128 << 20) + 1);
        assert!(joint_states > dense_cell_limit(first.len()));
        assert_eq!(merge_states(&first, &second).unwrap(), vec![0, 1, 0]);
    }

    #[test]
    fn mismatched_lengths_are_errors() {
        let err = mutual_information(&[0, 1, 0], &[0, 1]).unwrap_err();
        assert_eq!(
            err,
            SelectionError::LengthMismatch {
                what: "y column",
                expected: 3,
                found: 2
            }
        );
        assert!(merge_states(&[0, 1], &[0]).is_err());
        assert!(conditional_mutual_information(&[0, 1], &[0, 1], &[0]).is_err());
        assert!(Estimator::weighted(&[1.0]).entropy(&[0, 1]).is_err());
    }

    #[test]
    fn weighted_estimator_with_unit_weights_matches_counts() -> Result<()> {
        let x = [0, 1, 2, 2, 1, 0, 0];
        let y = [1, 1, 0, 0, 1, 1, 0];
        let ones = vec![1.0; x.len()];
        let weighted = Estimator::weighted(&ones);
        assert_eq!(weighted.mutual_information(&x, &y)?, mutual_information(&x, &y)?);
        assert_eq!(weighted.entropy(&x)?, entropy(&x)?);
        Ok(())
    }

    #[test]
    fn zero_weight_samples_are_ignored() -> Result<()> {
        let x = [0, 1, 0, 1, 1];
        let y = [0, 1, 0, 1, 0];
        let weights = [1.0, 1.0, 1.0, 1.0, 0.0];
        let weighted = Estimator::weighted(&weights).mutual_information(&x, &y)?;
        assert_abs_diff_eq!(weighted, mutual_information(&x[..4], &y[..4])?, epsilon = 1e-12);
        Ok(())
    }
}
