use super::dto::{DomainScore, DomainWeight, DomainWeightedScore, WeightedResult};
use crate::shared::validation::ValidationError;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Allowed drift of Σ domain_weight from 100
pub const WEIGHT_TOTAL_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResultsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("domain {0} appears more than once in {1}")]
    DuplicateDomain(i64, &'static str),
}

pub fn weighted_score(domain_weight: f64, domain_score: f64) -> f64 {
    domain_weight * domain_score / 100.0
}

/// Joins weights and scores on `domain_id` and sums the weighted scores.
///
/// Domains present on only one side are skipped. Output order follows `weights`.
pub fn aggregate(
    weights: &[DomainWeight],
    scores: &[DomainScore],
    program_id: i64,
) -> Result<WeightedResult, ResultsError> {
    let mut seen = HashSet::new();
    for weight in weights {
        if !seen.insert(weight.domain_id) {
            return Err(ResultsError::DuplicateDomain(weight.domain_id, "domain weights"));
        }
        ensure_finite(weight.domain_weight, "domain_weight", weight.domain_id)?;
    }

    let mut by_domain: HashMap<i64, &DomainScore> = HashMap::with_capacity(scores.len());
    for score in scores {
        ensure_finite(score.domain_score, "domain_score", score.domain_id)?;
        if by_domain.insert(score.domain_id, score).is_some() {
            return Err(ResultsError::DuplicateDomain(score.domain_id, "domain scores"));
        }
    }

    let result_by_domain: Vec<DomainWeightedScore> = weights
        .iter()
        .filter_map(|weight| {
            by_domain.get(&weight.domain_id).map(|score| DomainWeightedScore {
                domain_id: weight.domain_id,
                domain_weight: weight.domain_weight,
                domain_score: score.domain_score,
                domain_weighted_score: weighted_score(weight.domain_weight, score.domain_score),
            })
        })
        .collect();

    let final_program_score = result_by_domain
        .iter()
        .map(|row| row.domain_weighted_score)
        .sum();

    Ok(WeightedResult {
        program_id,
        result_by_domain,
        final_program_score,
    })
}

fn ensure_finite(value: f64, field: &'static str, domain_id: i64) -> Result<(), ResultsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite {
            context: format!("domain {}", domain_id),
            field,
        }
        .into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct WeightTotal {
    pub total: f64,
    pub within_tolerance: bool,
}

/// Checks that the backend's weights add up to 100
pub fn check_weight_total(weights: &[DomainWeight]) -> WeightTotal {
    let total: f64 = weights.iter().map(|w| w.domain_weight).sum();
    WeightTotal {
        total,
        within_tolerance: (total - 100.0).abs() <= WEIGHT_TOTAL_TOLERANCE,
    }
}
