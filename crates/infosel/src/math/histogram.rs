//! Frequency tables over one, two or three discrete variables.
//!
//! Every table accumulates sample weights; the unweighted case is the
//! degenerate one where each sample contributes exactly `1.0`. Tables are
//! dense vectors when the cross product of states is small relative to the
//! number of samples and fall back to an ordered sparse map otherwise, so a
//! joint over many high-cardinality columns never allocates the full product.
//! Both layouts visit occupied cells in ascending cell order, which keeps
//! every sum derived from a table deterministic.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::iter::Enumerate;
use std::slice;

use super::log;
use crate::error::{Result, SelectionError};

/// Tables at or below this many cells are always dense.
const MIN_DENSE_CELLS: u128 = 1 << 12;
/// Tables above this many cells are always sparse.
const MAX_DENSE_CELLS: u128 = 1 << 24;

/// Per-sample weighting applied while accumulating a table.
#[derive(Debug, Clone, Copy, Default)]
pub enum SampleWeights<'a> {
    /// Every sample counts once.
    #[default]
    Uniform,
    /// Sample `i` contributes `weights[i]`.
    Weighted(&'a [f64]),
}

impl<'a> SampleWeights<'a> {
    pub fn from_option(weights: Option<&'a [f64]>) -> Self {
        weights.map_or(SampleWeights::Uniform, SampleWeights::Weighted)
    }

    #[inline]
    pub fn get(&self, sample: usize) -> f64 {
        match self {
            SampleWeights::Uniform => 1.0,
            SampleWeights::Weighted(weights) => weights[sample],
        }
    }

    fn check_len(&self, num_samples: usize) -> Result<()> {
        match self {
            SampleWeights::Weighted(weights) => check_len("weights", num_samples, weights.len()),
            SampleWeights::Uniform => Ok(()),
        }
    }
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(SelectionError::LengthMismatch {
            what,
            expected,
            found,
        })
    }
}

/// Tables with more cells than this are kept sparse for `num_samples`
/// samples; a column set never occupies more cells than it has samples.
pub(crate) fn dense_cell_limit(num_samples: usize) -> u128 {
    (num_samples as u128)
        .saturating_mul(4)
        .clamp(MIN_DENSE_CELLS, MAX_DENSE_CELLS)
}

/// `(a * b) / (c * d)` for positive masses.
///
/// Integer counts keep the plain product form, which is exact and gives
/// `1.0` for independent cells. Weighted masses whose products leave the
/// normal range are divided pairwise instead.
#[inline]
fn mass_ratio(a: f64, b: f64, c: f64, d: f64) -> f64 {
    let (numerator, denominator) = (a * b, c * d);
    if numerator.is_normal() && denominator.is_normal() {
        numerator / denominator
    } else {
        (a / c) * (b / d)
    }
}

/// Number of states spanned by a column of zero-based codes (`max + 1`).
///
/// An empty column spans no states.
pub fn num_states(codes: &[u32]) -> usize {
    codes.iter().copied().max().map_or(0, |max| max as usize + 1)
}

#[derive(Debug, Clone)]
enum Cells {
    Dense(Vec<f64>),
    Sparse(BTreeMap<u128, f64>),
}

/// Accumulated sample weight per cell of a flattened state space.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    cells: Cells,
    total: f64,
}

impl FrequencyTable {
    /// Create an empty table able to hold `num_cells` cells for a column
    /// set of `num_samples` samples.
    pub fn with_cells(num_cells: u128, num_samples: usize) -> Self {
        let cells = if num_cells <= dense_cell_limit(num_samples) {
            Cells::Dense(vec![0.0; num_cells as usize])
        } else {
            Cells::Sparse(BTreeMap::new())
        };
        Self { cells, total: 0.0 }
    }

    #[inline]
    pub fn add(&mut self, cell: u128, weight: f64) {
        match &mut self.cells {
            Cells::Dense(cells) => cells[cell as usize] += weight,
            Cells::Sparse(cells) => *cells.entry(cell).or_insert(0.0) += weight,
        }
        self.total += weight;
    }

    /// Total accumulated weight (the sample count when unweighted).
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Accumulated weight of one cell; zero for cells never observed.
    pub fn mass(&self, cell: u128) -> f64 {
        match &self.cells {
            Cells::Dense(cells) => cells.get(cell as usize).copied().unwrap_or(0.0),
            Cells::Sparse(cells) => cells.get(&cell).copied().unwrap_or(0.0),
        }
    }

    /// Empirical probability of one cell; zero when the table holds no mass.
    pub fn probability(&self, cell: u128) -> f64 {
        if self.total > 0.0 {
            self.mass(cell) / self.total
        } else {
            0.0
        }
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self.cells, Cells::Sparse(_))
    }

    /// Cells with strictly positive mass, in ascending cell order.
    pub fn occupied(&self) -> Occupied<'_> {
        let inner = match &self.cells {
            Cells::Dense(cells) => OccupiedInner::Dense(cells.iter().enumerate()),
            Cells::Sparse(cells) => OccupiedInner::Sparse(cells.iter()),
        };
        Occupied { inner }
    }

    /// Shannon entropy of the normalized table.
    ///
    /// Each term is evaluated as `p * log(total / mass)` so that zero cells
    /// never reach the logarithm and an empty table yields `0.0`.
    pub fn entropy(&self) -> f64 {
        let total = self.total;
        if total <= 0.0 {
            return 0.0;
        }
        self.occupied()
            .map(|(_, mass)| (mass / total) * log(total / mass))
            .sum()
    }
}

/// Iterator over the occupied cells of a [`FrequencyTable`].
pub struct Occupied<'a> {
    inner: OccupiedInner<'a>,
}

enum OccupiedInner<'a> {
    Dense(Enumerate<slice::Iter<'a, f64>>),
    Sparse(btree_map::Iter<'a, u128, f64>),
}

impl<'a> Iterator for Occupied<'a> {
    type Item = (u128, f64);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            OccupiedInner::Dense(cells) => cells
                .find(|(_, mass)| **mass > 0.0)
                .map(|(cell, mass)| (cell as u128, *mass)),
            OccupiedInner::Sparse(cells) => cells
                .find(|(_, mass)| **mass > 0.0)
                .map(|(cell, mass)| (*cell, *mass)),
        }
    }
}

/// Frequency table of a single discrete variable.
#[derive(Debug, Clone)]
pub struct MarginalHistogram {
    states: usize,
    table: FrequencyTable,
}

impl MarginalHistogram {
    /// Accumulate the table of `x`.
    ///
    /// Fails with [`SelectionError::LengthMismatch`] when the weights do not
    /// cover every sample.
    pub fn new(x: &[u32], weights: SampleWeights<'_>) -> Result<Self> {
        weights.check_len(x.len())?;
        let states = num_states(x).max(1);
        let mut table = FrequencyTable::with_cells(states as u128, x.len());
        for (i, &code) in x.iter().enumerate() {
            table.add(code as u128, weights.get(i));
        }
        Ok(Self { states, table })
    }

    pub fn states(&self) -> usize {
        self.states
    }

    pub fn mass(&self, state: u32) -> f64 {
        self.table.mass(state as u128)
    }

    pub fn probability(&self, state: u32) -> f64 {
        self.table.probability(state as u128)
    }

    pub fn total(&self) -> f64 {
        self.table.total()
    }

    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    pub fn entropy(&self) -> f64 {
        self.table.entropy()
    }
}

/// Joint frequency table of two discrete variables with both marginals.
#[derive(Debug, Clone)]
pub struct JointHistogram {
    x_states: usize,
    y_states: usize,
    joint: FrequencyTable,
    x: FrequencyTable,
    y: FrequencyTable,
}

impl JointHistogram {
    /// Accumulate the joint table of `x` and `y`.
    ///
    /// Fails with [`SelectionError::LengthMismatch`] if `y` or the weights
    /// differ in length from `x`.
    pub fn new(x: &[u32], y: &[u32], weights: SampleWeights<'_>) -> Result<Self> {
        check_len("y column", x.len(), y.len())?;
        weights.check_len(x.len())?;

        let n = x.len();
        let x_states = num_states(x).max(1);
        let y_states = num_states(y).max(1);
        let mut joint = FrequencyTable::with_cells(x_states as u128 * y_states as u128, n);
        let mut x_table = FrequencyTable::with_cells(x_states as u128, n);
        let mut y_table = FrequencyTable::with_cells(y_states as u128, n);

        for i in 0..n {
            let w = weights.get(i);
            let (xi, yi) = (x[i] as u128, y[i] as u128);
            joint.add(xi + x_states as u128 * yi, w);
            x_table.add(xi, w);
            y_table.add(yi, w);
        }

        Ok(Self {
            x_states,
            y_states,
            joint,
            x: x_table,
            y: y_table,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.x_states, self.y_states)
    }

    pub fn joint_mass(&self, x: u32, y: u32) -> f64 {
        self.joint.mass(x as u128 + self.x_states as u128 * y as u128)
    }

    pub fn total(&self) -> f64 {
        self.joint.total()
    }

    pub fn joint(&self) -> &FrequencyTable {
        &self.joint
    }

    pub fn x_marginal(&self) -> &FrequencyTable {
        &self.x
    }

    pub fn y_marginal(&self) -> &FrequencyTable {
        &self.y
    }

    pub fn joint_entropy(&self) -> f64 {
        self.joint.entropy()
    }

    /// `I(X;Y)` evaluated in one pass over the occupied joint cells.
    ///
    /// The ratio inside the logarithm is formed from raw masses,
    /// `m(x,y) * total / (m(x) * m(y))`, so that for integer counts an
    /// empirically independent pair evaluates to exactly `log(1) = 0`.
    /// Uniformly rescaling the weights leaves the result unchanged up to
    /// rounding.
    pub fn mutual_information(&self) -> f64 {
        let total = self.joint.total();
        if total <= 0.0 {
            return 0.0;
        }
        let x_states = self.x_states as u128;
        let mut mi = 0.0;
        for (cell, mass) in self.joint.occupied() {
            let mx = self.x.mass(cell % x_states);
            let my = self.y.mass(cell / x_states);
            mi += (mass / total) * log(mass_ratio(mass, total, mx, my));
        }
        // Only rounding can push the sum below zero.
        if mi < 0.0 {
            0.0
        } else {
            mi
        }
    }
}

/// Joint frequency table of three variables `(X, Y, Z)` together with the
/// `(X, Z)`, `(Y, Z)` and `Z` tables needed for conditioning on `Z`.
#[derive(Debug, Clone)]
pub struct TripleHistogram {
    x_states: usize,
    y_states: usize,
    z_states: usize,
    xyz: FrequencyTable,
    xz: FrequencyTable,
    yz: FrequencyTable,
    z: FrequencyTable,
}

impl TripleHistogram {
    /// Accumulate the three-way table of `x`, `y` and `z`.
    ///
    /// Fails with [`SelectionError::LengthMismatch`] if any column or the
    /// weights differ in length from `x`.
    pub fn new(x: &[u32], y: &[u32], z: &[u32], weights: SampleWeights<'_>) -> Result<Self> {
        check_len("y column", x.len(), y.len())?;
        check_len("z column", x.len(), z.len())?;
        weights.check_len(x.len())?;

        let n = x.len();
        let x_states = num_states(x).max(1);
        let y_states = num_states(y).max(1);
        let z_states = num_states(z).max(1);
        let (xs, ys, zs) = (x_states as u128, y_states as u128, z_states as u128);

        let mut xyz = FrequencyTable::with_cells(xs.saturating_mul(ys).saturating_mul(zs), n);
        let mut xz = FrequencyTable::with_cells(xs * zs, n);
        let mut yz = FrequencyTable::with_cells(ys * zs, n);
        let mut z_table = FrequencyTable::with_cells(zs, n);

        for i in 0..n {
            let w = weights.get(i);
            let (xi, yi, zi) = (x[i] as u128, y[i] as u128, z[i] as u128);
            xyz.add(xi + xs * (yi + ys * zi), w);
            xz.add(xi + xs * zi, w);
            yz.add(yi + ys * zi, w);
            z_table.add(zi, w);
        }

        Ok(Self {
            x_states,
            y_states,
            z_states,
            xyz,
            xz,
            yz,
            z: z_table,
        })
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.x_states, self.y_states, self.z_states)
    }

    pub fn joint_mass(&self, x: u32, y: u32, z: u32) -> f64 {
        let (xs, ys) = (self.x_states as u128, self.y_states as u128);
        self.xyz.mass(x as u128 + xs * (y as u128 + ys * z as u128))
    }

    pub fn total(&self) -> f64 {
        self.xyz.total()
    }

    pub fn joint_entropy(&self) -> f64 {
        self.xyz.entropy()
    }

    /// `I(X;Y|Z) = Σ p(x,y,z) log(p(x,y,z) p(z) / (p(x,z) p(y,z)))`.
    pub fn conditional_mutual_information(&self) -> f64 {
        let total = self.xyz.total();
        if total <= 0.0 {
            return 0.0;
        }
        let (xs, ys) = (self.x_states as u128, self.y_states as u128);
        let mut cmi = 0.0;
        for (cell, mass) in self.xyz.occupied() {
            let x = cell % xs;
            let rest = cell / xs;
            let y = rest % ys;
            let z = rest / ys;
            let mz = self.z.mass(z);
            let mxz = self.xz.mass(x + xs * z);
            let myz = self.yz.mass(y + ys * z);
            cmi += (mass / total) * log(mass_ratio(mass, mz, mxz, myz));
        }
        if cmi < 0.0 {
            0.0
        } else {
            cmi
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn marginal_counts_each_state() {
        let hist = MarginalHistogram::new(&[0, 1, 1, 2, 2, 2], SampleWeights::Uniform).unwrap();
        assert_eq!(hist.states(), 3);
        assert_eq!(hist.mass(0), 1.0);
        assert_eq!(hist.mass(1), 2.0);
        assert_eq!(hist.mass(2), 3.0);
        assert_eq!(hist.mass(7), 0.0);
        assert_eq!(hist.total(), 6.0);
        assert_abs_diff_eq!(hist.probability(2), 0.5);
    }

    #[test]
    fn weighted_marginal_sums_weights() {
        let weights = [0.5, 2.0, 1.0, 0.0];
        let hist = MarginalHistogram::new(&[0, 1, 1, 0], SampleWeights::Weighted(&weights)).unwrap();
        assert_eq!(hist.mass(0), 0.5);
        assert_eq!(hist.mass(1), 3.0);
        assert_eq!(hist.total(), 3.5);
    }

    #[test]
    fn joint_histogram_tracks_marginals() {
        let x = [0, 0, 1, 1];
        let y = [0, 1, 0, 0];
        let hist = JointHistogram::new(&x, &y, SampleWeights::Uniform).unwrap();
        assert_eq!(hist.shape(), (2, 2));
        assert_eq!(hist.joint_mass(1, 0), 2.0);
        assert_eq!(hist.joint_mass(1, 1), 0.0);
        assert_eq!(hist.x_marginal().mass(0), 2.0);
        assert_eq!(hist.y_marginal().mass(0), 3.0);
        assert_eq!(hist.joint().occupied().count(), 3);
    }

    #[test]
    fn triple_histogram_counts_joint_cells() {
        let x = [0, 1, 0, 1];
        let y = [1, 1, 0, 0];
        let z = [0, 0, 1, 1];
        let hist = TripleHistogram::new(&x, &y, &z, SampleWeights::Uniform).unwrap();
        assert_eq!(hist.shape(), (2, 2, 2));
        assert_eq!(hist.joint_mass(1, 1, 0), 1.0);
        assert_eq!(hist.joint_mass(1, 1, 1), 0.0);
        assert_eq!(hist.total(), 4.0);
    }

    #[test]
    fn empty_columns_have_zero_entropy() {
        let hist = MarginalHistogram::new(&[], SampleWeights::Uniform).unwrap();
        assert_eq!(hist.total(), 0.0);
        assert_eq!(hist.entropy(), 0.0);
        let joint = JointHistogram::new(&[], &[], SampleWeights::Uniform).unwrap();
        assert_eq!(joint.mutual_information(), 0.0);
    }

    #[test]
    fn sparse_and_dense_tables_agree() {
        let mut dense = FrequencyTable::with_cells(16, 8);
        let mut sparse = FrequencyTable::with_cells(u128::MAX, 8);
        assert!(!dense.is_sparse());
        assert!(sparse.is_sparse());
        for (cell, w) in [(3u128, 1.0), (7, 2.0), (3, 1.0), (11, 0.5)] {
            dense.add(cell, w);
            sparse.add(cell, w);
        }
        let d: Vec<_> = dense.occupied().collect();
        let s: Vec<_> = sparse.occupied().collect();
        assert_eq!(d, s);
        assert_eq!(dense.entropy(), sparse.entropy());
    }

    #[test]
    fn mismatched_lengths_are_reported() {
        let err = JointHistogram::new(&[0, 1], &[0], SampleWeights::Uniform).unwrap_err();
        assert_eq!(
            err,
            SelectionError::LengthMismatch {
                what: "y column",
                expected: 2,
                found: 1
            }
        );
        let weights = [1.0; 3];
        let err = TripleHistogram::new(&[0, 1], &[0, 1], &[1, 1], SampleWeights::Weighted(&weights))
            .unwrap_err();
        assert!(matches!(err, SelectionError::LengthMismatch { what: "weights", .. }));
    }

    #[test]
    fn extreme_weight_scales_keep_the_ratio_in_range() {
        assert_eq!(mass_ratio(2.0, 4.0, 2.0, 2.0), 2.0);
        let tiny = mass_ratio(2e-200, 4e-200, 2e-200, 2e-200);
        let huge = mass_ratio(2e200, 4e200, 2e200, 2e200);
        assert_abs_diff_eq!(tiny, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(huge, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn scaled_weights_leave_information_unchanged() {
        let x = [0, 0, 1, 1];
        let y = [0, 0, 1, 1];
        let z = [0, 1, 0, 1];
        for scale in [1e-200, 1e-160, 1e160, 1e200] {
            let weights = [scale; 4];
            let w = SampleWeights::Weighted(&weights);
            let mi = JointHistogram::new(&x, &y, w).unwrap().mutual_information();
            assert_abs_diff_eq!(mi, 1.0, epsilon = 1e-12);
            let cmi = TripleHistogram::new(&x, &y, &z, w)
                .unwrap()
                .conditional_mutual_information();
            assert_abs_diff_eq!(cmi, 1.0, epsilon = 1e-12);
        }
    }
}
