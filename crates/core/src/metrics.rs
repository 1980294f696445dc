//! Derived progress arithmetic.
//!
//! Everything here is integer math with round-half-up, so a weighted score of
//! exactly `51.5` always reports `52` regardless of float representation.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Catalog, ProgressState};

/// Upper bound for every percentage produced by this module.
pub const MAX_PERCENT: u32 = 100;

/// Catalog size assumed when no catalog is available.
pub const DEFAULT_TOTAL_MODULES: u32 = 8;

/// Catalog size assumed when no catalog is available.
pub const DEFAULT_TOTAL_QUIZZES: u32 = 8;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WeightsError {
    #[error("preparedness weights must sum to 100, got {sum}")]
    BadSum { sum: u32 },

    #[error("expected three comma-separated whole percentages, got {raw:?}")]
    Malformed { raw: String },
}

//
// ─── ROUNDING ──────────────────────────────────────────────────────────────────
//

/// Rounds `numerator / denominator` to the nearest integer, halves going up.
///
/// A zero denominator yields zero.
#[must_use]
pub fn round_half_up(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    (numerator * 2 + denominator) / (denominator * 2)
}

fn to_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Score as a whole percentage of `total`; `0` for an empty quiz.
#[must_use]
pub fn percentage(score: u32, total: u32) -> u32 {
    to_u32(round_half_up(u64::from(score) * 100, u64::from(total)))
}

/// Share of a catalog that is complete, clamped to 100.
#[must_use]
pub fn completion_rate(completed: usize, total: u32) -> u32 {
    let completed = u64::try_from(completed).unwrap_or(u64::MAX / 200);
    to_u32(round_half_up(completed * 100, u64::from(total))).min(MAX_PERCENT)
}

/// Mean of the given percentages, rounded; empty input is `0`.
#[must_use]
pub fn rounded_average(percentages: &[u32]) -> u32 {
    let sum: u64 = percentages.iter().map(|p| u64::from(*p)).sum();
    to_u32(round_half_up(sum, percentages.len() as u64))
}

//
// ─── WEIGHTS & POLICY ──────────────────────────────────────────────────────────
//

/// Relative weight, in whole percent, of each input to the preparedness score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparednessWeights {
    modules: u32,
    quiz_completion: u32,
    quiz_score: u32,
}

impl PreparednessWeights {
    /// # Errors
    ///
    /// Returns `WeightsError::BadSum` unless the weights add up to 100.
    pub fn new(modules: u32, quiz_completion: u32, quiz_score: u32) -> Result<Self, WeightsError> {
        let sum = modules
            .saturating_add(quiz_completion)
            .saturating_add(quiz_score);
        if sum != 100 {
            return Err(WeightsError::BadSum { sum });
        }
        Ok(Self {
            modules,
            quiz_completion,
            quiz_score,
        })
    }

    #[must_use]
    pub fn modules(&self) -> u32 {
        self.modules
    }

    #[must_use]
    pub fn quiz_completion(&self) -> u32 {
        self.quiz_completion
    }

    #[must_use]
    pub fn quiz_score(&self) -> u32 {
        self.quiz_score
    }
}

/// Parses `modules,quiz_completion,quiz_score`, e.g. `40,30,30`.
impl FromStr for PreparednessWeights {
    type Err = WeightsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || WeightsError::Malformed { raw: s.to_owned() };
        let parts = s
            .split(',')
            .map(|part| part.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| malformed())?;
        match parts[..] {
            [modules, quiz_completion, quiz_score] => {
                Self::new(modules, quiz_completion, quiz_score)
            }
            _ => Err(malformed()),
        }
    }
}

impl Default for PreparednessWeights {
    /// 40% module completion, 30% quiz completion, 30% quiz performance.
    fn default() -> Self {
        Self {
            modules: 40,
            quiz_completion: 30,
            quiz_score: 30,
        }
    }
}

/// Denominators and weights used to turn raw progress into percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub total_modules: u32,
    pub total_quizzes: u32,
    pub weights: PreparednessWeights,
}

impl ScoringPolicy {
    #[must_use]
    pub fn new(total_modules: u32, total_quizzes: u32, weights: PreparednessWeights) -> Self {
        Self {
            total_modules,
            total_quizzes,
            weights,
        }
    }

    /// Policy whose denominators match the catalog actually on offer.
    #[must_use]
    pub fn for_catalog(catalog: &Catalog) -> Self {
        Self {
            total_modules: to_u32(catalog.module_count() as u64),
            total_quizzes: to_u32(catalog.quiz_count() as u64),
            weights: PreparednessWeights::default(),
        }
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_TOTAL_MODULES,
            DEFAULT_TOTAL_QUIZZES,
            PreparednessWeights::default(),
        )
    }
}

//
// ─── PREPAREDNESS ──────────────────────────────────────────────────────────────
//

/// Weighted blend of module completion, quiz completion and mean quiz score.
///
/// The mean is taken over `quiz_percentages`; no quizzes means a mean of zero.
/// The result never exceeds 100.
#[must_use]
pub fn preparedness(
    module_rate: u32,
    quiz_rate: u32,
    quiz_percentages: &[u32],
    weights: &PreparednessWeights,
) -> u32 {
    let rates = u64::from(weights.modules) * u64::from(module_rate)
        + u64::from(weights.quiz_completion) * u64::from(quiz_rate);
    let count = quiz_percentages.len() as u64;

    let value = if count == 0 {
        round_half_up(rates, 100)
    } else {
        let sum: u64 = quiz_percentages.iter().map(|p| u64::from(*p)).sum();
        round_half_up(
            count * rates + u64::from(weights.quiz_score) * sum,
            100 * count,
        )
    };
    to_u32(value).min(MAX_PERCENT)
}

/// Every derived number a dashboard shows, computed from one consistent state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressMetrics {
    pub module_completion_rate: u32,
    pub quiz_completion_rate: u32,
    pub average_quiz_score: u32,
    pub overall_preparedness: u32,
}

impl ProgressMetrics {
    #[must_use]
    pub fn compute(state: &ProgressState, policy: &ScoringPolicy) -> Self {
        let module_completion_rate =
            completion_rate(state.completed_module_count(), policy.total_modules);
        let quiz_completion_rate =
            completion_rate(state.completed_quiz_count(), policy.total_quizzes);
        let percentages = state.quiz_percentages();

        Self {
            module_completion_rate,
            quiz_completion_rate,
            average_quiz_score: rounded_average(&percentages),
            overall_preparedness: preparedness(
                module_completion_rate,
                quiz_completion_rate,
                &percentages,
                &policy.weights,
            ),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
