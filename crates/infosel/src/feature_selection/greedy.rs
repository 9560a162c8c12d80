//! Greedy forward selection.
//!
//! Each round scores every unselected feature with the configured
//! [`Criterion`] and adds the best one. Pairwise terms between a candidate and
//! an already selected feature never change during a run, so each is computed
//! once (in the round after the feature is selected) and read back from a
//! [`PairTermCache`] afterwards. A run of `k` rounds over `n` features thus
//! computes at most `n * k` pairwise terms.
//!
//! Ties are broken towards the lowest feature index. Candidate scoring may run
//! on the rayon thread pool; the argmax is always taken sequentially, so
//! parallel and sequential runs return identical results.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::criterion::Criterion;
use super::pair_cache::PairTermCache;
use crate::dataset::DiscreteDataset;
use crate::error::{Result, SelectionError};
use crate::math::{merge_states, Estimator};

/// Why a selection run stopped.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The requested number of features was selected.
    BudgetReached,
    /// Fewer features exist than were requested; all of them were selected.
    CandidatesExhausted,
    /// No remaining candidate scored above zero (CondMI only).
    NoPositiveScore,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct SelectedFeature {
    pub index: usize,
    /// Criterion score at the moment the feature was selected.
    pub score: f64,
}

/// Outcome of a selection run, in selection order.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ScoredFeatures {
    pub criterion: Criterion,
    pub features: Vec<SelectedFeature>,
    pub stop_reason: StopReason,
    /// Number of pairwise terms computed during the run.
    pub cached_terms: usize,
}

impl ScoredFeatures {
    pub fn indices(&self) -> Vec<usize> {
        self.features.iter().map(|f| f.index).collect()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.features.iter().map(|f| f.score).collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SelectedFeature> {
        self.features.iter()
    }

    /// True when CondMI stopped before the budget ran out.
    pub fn terminated_early(&self) -> bool {
        self.stop_reason == StopReason::NoPositiveScore
    }
}

impl<'a> IntoIterator for &'a ScoredFeatures {
    type Item = &'a SelectedFeature;
    type IntoIter = std::slice::Iter<'a, SelectedFeature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

/// Greedy forward selector for one criterion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSelector {
    criterion: Criterion,
    parallel: bool,
}

impl Default for FeatureSelector {
    fn default() -> Self {
        Self::new(Criterion::default())
    }
}

impl FeatureSelector {
    pub fn new(criterion: Criterion) -> Self {
        FeatureSelector {
            criterion,
            parallel: true,
        }
    }

    /// Score candidates on the rayon thread pool (the default) or inline.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    /// Rank every feature of `data`.
    pub fn rank(&self, data: &DiscreteDataset) -> Result<ScoredFeatures> {
        self.select(data, data.n_features().max(1))
    }

    /// Select up to `k` features from `data`.
    ///
    /// `k` larger than the number of features is clamped. When `data` carries
    /// sample weights the criterion's weighted form is used, which only
    /// MIM, CMIM, CondMI, DISR and JMI have.
    pub fn select(&self, data: &DiscreteDataset, k: usize) -> Result<ScoredFeatures> {
        if k == 0 {
            return Err(SelectionError::ZeroFeatureBudget);
        }
        if data.is_weighted() && !self.criterion.supports_weights() {
            return Err(SelectionError::WeightsUnsupported(self.criterion.name()));
        }

        let n_features = data.n_features();
        let budget = k.min(n_features);
        if budget < k {
            log::debug!(
                "Requested {} features but only {} are available; ranking all of them",
                k,
                n_features
            );
        }
        log::info!(
            "Selecting {} of {} features over {} samples with {}{}",
            budget,
            n_features,
            data.n_samples(),
            self.criterion,
            if data.is_weighted() { " (weighted)" } else { "" }
        );

        let estimator = Estimator::from_weights(data.weights());
        let labels = data.labels();

        let all: Vec<usize> = (0..n_features).collect();
        let relevance = score_all(self.parallel, &all, |f| {
            estimator.mutual_information(data.feature(f), labels)
        })?;

        let mut run = SelectionRun {
            selected: Vec::with_capacity(budget),
            is_selected: vec![false; n_features],
            cache: PairTermCache::new(),
            conditioning: None,
        };

        let mut stop_reason = if budget < k {
            StopReason::CandidatesExhausted
        } else {
            StopReason::BudgetReached
        };

        while run.selected.len() < budget {
            let candidates: Vec<usize> = (0..n_features).filter(|&f| !run.is_selected[f]).collect();
            if candidates.is_empty() {
                stop_reason = StopReason::CandidatesExhausted;
                break;
            }

            if self.criterion.uses_pair_terms() {
                if let Some(last) = run.selected.last().map(|s| s.index) {
                    self.cache_terms_against(&estimator, data, &candidates, last, &mut run.cache)?;
                }
            }

            let scores = score_all(self.parallel, &candidates, |c| {
                self.score_candidate(&estimator, data, c, relevance[c], &run)
            })?;

            let (best, best_score) = argmax(&candidates, &scores);

            if self.criterion.stops_without_information()
                && !run.selected.is_empty()
                && best_score <= 0.0
            {
                log::info!(
                    "No remaining feature adds information after {} selections; stopping",
                    run.selected.len()
                );
                stop_reason = StopReason::NoPositiveScore;
                break;
            }

            log::debug!(
                "Round {}: selected feature {} (score {:.6})",
                run.selected.len() + 1,
                best,
                best_score
            );
            run.push(best, best_score, self.criterion, data)?;
        }

        log::info!(
            "Selected {} features with {} ({:?}, {} cached terms)",
            run.selected.len(),
            self.criterion,
            stop_reason,
            run.cache.len()
        );

        Ok(ScoredFeatures {
            criterion: self.criterion,
            features: run.selected,
            stop_reason,
            cached_terms: run.cache.len(),
        })
    }

    /// Compute the terms between every candidate and the newest selection.
    fn cache_terms_against(
        &self,
        estimator: &Estimator<'_>,
        data: &DiscreteDataset,
        candidates: &[usize],
        last: usize,
        cache: &mut PairTermCache,
    ) -> Result<()> {
        let labels = data.labels();
        let selected = data.feature(last);
        let terms = score_all(self.parallel, candidates, |c| {
            self.criterion
                .pair_term(estimator, data.feature(c), selected, labels)
        })?;
        for (&c, term) in candidates.iter().zip(terms) {
            if cache.insert(c, last, term) {
                log::trace!("term({}, {}) = {}", c, last, term);
            }
        }
        Ok(())
    }

    fn score_candidate(
        &self,
        estimator: &Estimator<'_>,
        data: &DiscreteDataset,
        candidate: usize,
        relevance: f64,
        run: &SelectionRun,
    ) -> Result<f64> {
        match self.criterion {
            Criterion::CondMi => match &run.conditioning {
                Some(conditioning) => estimator.conditional_mutual_information(
                    data.feature(candidate),
                    data.labels(),
                    conditioning,
                ),
                None => Ok(relevance),
            },
            criterion => Ok(criterion.score(
                relevance,
                run.selected
                    .iter()
                    .filter_map(|s| run.cache.get(candidate, s.index)),
            )),
        }
    }
}

/// Mutable state of one selection run.
struct SelectionRun {
    selected: Vec<SelectedFeature>,
    is_selected: Vec<bool>,
    cache: PairTermCache,
    /// The selected features merged into one joint variable (CondMI only).
    conditioning: Option<Vec<u32>>,
}

impl SelectionRun {
    fn push(
        &mut self,
        index: usize,
        score: f64,
        criterion: Criterion,
        data: &DiscreteDataset,
    ) -> Result<()> {
        self.is_selected[index] = true;
        self.selected.push(SelectedFeature { index, score });
        if criterion == Criterion::CondMi {
            let column = data.feature(index);
            self.conditioning = Some(match self.conditioning.take() {
                Some(conditioning) => merge_states(&conditioning, column)?,
                None => column.to_vec(),
            });
        }
        Ok(())
    }
}

fn score_all<F>(parallel: bool, candidates: &[usize], f: F) -> Result<Vec<f64>>
where
    F: Fn(usize) -> Result<f64> + Sync + Send,
{
    if parallel {
        candidates.par_iter().map(|&c| f(c)).collect()
    } else {
        candidates.iter().map(|&c| f(c)).collect()
    }
}

/// First candidate with the strictly greatest score.
fn argmax(candidates: &[usize], scores: &[f64]) -> (usize, f64) {
    let mut best = (candidates[0], scores[0]);
    for (&c, &score) in candidates.iter().zip(scores).skip(1) {
        if score > best.1 {
            best = (c, score);
        }
    }
    best
}
