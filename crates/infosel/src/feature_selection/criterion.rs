//! Information-theoretic scoring criteria for greedy forward selection.
//!
//! A criterion scores a candidate feature `f` against the label `Y` and the
//! features `S` selected so far. Every criterion except MIM and CondMI is a
//! combination of the candidate's relevance `I(f;Y)` with one pairwise term
//! per selected feature; those terms are what the selector caches between
//! rounds.
//!
//! References:
//! - MIM, JMI, DISR, ICAP, CondMI, beta/gamma: Brown et al., "Conditional
//!   Likelihood Maximisation: A Unifying Framework for Information Theoretic
//!   Feature Selection", JMLR (2012)
//! - CMIM: Fleuret, "Fast Binary Feature Selection with Conditional Mutual
//!   Information", JMLR (2004)
//! - mRMR: Peng et al., IEEE PAMI (2005)
//! - Cost-sensitive variants: Pocock et al., "Information Theoretic Feature
//!   Selection for Cost-Sensitive Problems" (2017)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SelectionError};
use crate::math::{merge_states, Estimator};

/// Selection criterion, carrying any criterion-specific parameters.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum Criterion {
    /// Mutual information maximisation: `I(f;Y)`.
    Mim,
    /// `I(f;Y) - β Σ I(f;s) + γ Σ I(f;s|Y)`; MIFS is (1, 0), CIFE is (1, 1).
    BetaGamma { beta: f64, gamma: f64 },
    /// Conditional mutual information maximisation:
    /// `I(f;Y) - max_s [I(f;s) - I(f;s|Y)]`.
    Cmim,
    /// Joint mutual information: mean of `I(f,s;Y)` over `S`.
    #[default]
    Jmi,
    /// Double input symmetrical relevance: mean of `I(f,s;Y) / H(f,s)`.
    Disr,
    /// Interaction capping: `I(f;Y) - Σ max(0, I(f;s) - I(f;s|Y))`.
    Icap,
    /// `I(f;Y|S)` with `S` as a single joint variable. Stops selecting once
    /// no candidate adds information.
    CondMi,
    /// Minimum redundancy maximum relevance (difference form):
    /// `I(f;Y) - mean_s I(f;s)`.
    Mrmr,
}

impl Criterion {
    /// Battiti's MIFS with β = 1.
    pub fn mifs() -> Self {
        Criterion::BetaGamma {
            beta: 1.0,
            gamma: 0.0,
        }
    }

    /// Lin and Tang's conditional infomax feature extraction.
    pub fn cife() -> Self {
        Criterion::BetaGamma {
            beta: 1.0,
            gamma: 1.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Criterion::Mim => "MIM",
            Criterion::BetaGamma { .. } => "BetaGamma",
            Criterion::Cmim => "CMIM",
            Criterion::Jmi => "JMI",
            Criterion::Disr => "DISR",
            Criterion::Icap => "ICAP",
            Criterion::CondMi => "CondMI",
            Criterion::Mrmr => "mRMR",
        }
    }

    /// Whether the criterion has a cost-sensitive (sample-weighted) form.
    pub fn supports_weights(&self) -> bool {
        matches!(
            self,
            Criterion::Mim | Criterion::Cmim | Criterion::CondMi | Criterion::Disr | Criterion::Jmi
        )
    }

    /// Whether scoring needs one cached term per (candidate, selected) pair.
    pub fn uses_pair_terms(&self) -> bool {
        !matches!(self, Criterion::Mim | Criterion::CondMi)
    }

    /// Whether selection stops as soon as no candidate scores above zero.
    pub fn stops_without_information(&self) -> bool {
        matches!(self, Criterion::CondMi)
    }

    /// The term this criterion caches for one (candidate, selected) pair.
    ///
    /// Every term is symmetric in `candidate` and `selected`, so a cache may
    /// key it by the unordered pair.
    pub fn pair_term(
        &self,
        estimator: &Estimator<'_>,
        candidate: &[u32],
        selected: &[u32],
        labels: &[u32],
    ) -> Result<f64> {
        let term = match *self {
            Criterion::Mim | Criterion::CondMi => 0.0,
            Criterion::BetaGamma { beta, gamma } => {
                beta * estimator.mutual_information(candidate, selected)?
                    - gamma * estimator.conditional_mutual_information(candidate, selected, labels)?
            }
            Criterion::Cmim | Criterion::Icap => {
                estimator.mutual_information(candidate, selected)?
                    - estimator.conditional_mutual_information(candidate, selected, labels)?
            }
            Criterion::Mrmr => estimator.mutual_information(candidate, selected)?,
            Criterion::Jmi => estimator.joint_mutual_information(candidate, selected, labels)?,
            Criterion::Disr => {
                let pair = merge_states(candidate, selected)?;
                let pair_entropy = estimator.entropy(&pair)?;
                if pair_entropy > 0.0 {
                    estimator.mutual_information(&pair, labels)? / pair_entropy
                } else {
                    0.0
                }
            }
        };
        Ok(term)
    }

    /// Combine a candidate's relevance with its pairwise terms.
    ///
    /// `relevance` is `I(f;Y)`, except for CondMI where the selector passes
    /// `I(f;Y|S)` directly and no terms. With no terms (the first round)
    /// every criterion scores the relevance.
    pub fn score<I>(&self, relevance: f64, terms: I) -> f64
    where
        I: IntoIterator<Item = f64>,
    {
        let summary = TermSummary::collect(terms);
        if summary.count == 0 {
            return relevance;
        }
        match self {
            Criterion::Mim | Criterion::CondMi => relevance,
            Criterion::BetaGamma { .. } => relevance - summary.sum,
            Criterion::Cmim => relevance - summary.max,
            Criterion::Jmi | Criterion::Disr => summary.mean(),
            Criterion::Icap => relevance - summary.positive_sum,
            Criterion::Mrmr => relevance - summary.mean(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TermSummary {
    count: usize,
    sum: f64,
    max: f64,
    positive_sum: f64,
}

impl TermSummary {
    fn collect<I: IntoIterator<Item = f64>>(terms: I) -> Self {
        terms.into_iter().fold(
            TermSummary {
                count: 0,
                sum: 0.0,
                max: f64::NEG_INFINITY,
                positive_sum: 0.0,
            },
            |mut acc, term| {
                acc.count += 1;
                acc.sum += term;
                acc.max = acc.max.max(term);
                if term > 0.0 {
                    acc.positive_sum += term;
                }
                acc
            },
        )
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Criterion::BetaGamma { beta, gamma } => {
                write!(f, "BetaGamma(beta={}, gamma={})", beta, gamma)
            }
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Criterion {
    type Err = SelectionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mim" => Ok(Criterion::Mim),
            "mifs" => Ok(Criterion::mifs()),
            "cife" => Ok(Criterion::cife()),
            "cmim" => Ok(Criterion::Cmim),
            "jmi" => Ok(Criterion::Jmi),
            "disr" => Ok(Criterion::Disr),
            "icap" => Ok(Criterion::Icap),
            "condmi" | "cond_mi" => Ok(Criterion::CondMi),
            "mrmr" | "mrmr_d" | "mrmr-d" => Ok(Criterion::Mrmr),
            _ => Err(SelectionError::UnknownCriterion(s.to_string())),
        }
    }
}
