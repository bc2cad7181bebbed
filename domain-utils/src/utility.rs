use std::sync::Arc;

use crate::bid::Bid;
use crate::domain::Domain;
use crate::error::DomainError;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Additive utility function over a discrete domain: per-issue weights
/// (non-negative, summing to 1) and per-issue per-value evaluation scores
/// in [0, 1]. Utility of a bid is the weighted sum of the scores of its
/// values. Immutable once validated against the domain.
#[derive(Clone, Debug)]
pub struct AdditiveUtilitySpace {
    domain: Arc<Domain>,
    weights: Vec<f64>,
    scores: Vec<Vec<f64>>,
}

impl AdditiveUtilitySpace {
    /// `weights[i]` and `scores[i][j]` refer to issue `i` and its value `j`
    /// in domain order.
    pub fn new(
        domain: Arc<Domain>,
        weights: Vec<f64>,
        scores: Vec<Vec<f64>>,
    ) -> Result<AdditiveUtilitySpace, DomainError> {
        if weights.len() != domain.num_issues() || scores.len() != domain.num_issues() {
            return Err(DomainError::ShapeMismatch(format!(
                "{} weights and {} score rows for {} issues",
                weights.len(),
                scores.len(),
                domain.num_issues()
            )));
        }

        for (issue, (&weight, row)) in domain.issues().iter().zip(weights.iter().zip(&scores)) {
            if weight < 0.0 {
                return Err(DomainError::NegativeWeight {
                    issue: issue.name().to_string(),
                    weight,
                });
            }
            if row.len() != issue.num_values() {
                return Err(DomainError::ShapeMismatch(format!(
                    "{} scores for {} values of issue '{}'",
                    row.len(),
                    issue.num_values(),
                    issue.name()
                )));
            }
            for (value, &score) in issue.values().iter().zip(row) {
                if !(0.0..=1.0).contains(&score) {
                    return Err(DomainError::ScoreOutOfRange {
                        issue: issue.name().to_string(),
                        value: value.name().to_string(),
                        score,
                    });
                }
            }
        }

        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(DomainError::WeightsNotNormalized(sum));
        }

        Ok(AdditiveUtilitySpace {
            domain,
            weights,
            scores,
        })
    }

    pub fn domain(&self) -> &Arc<Domain> {
        &self.domain
    }

    /// Utility of `bid` in [0, 1]. Fails on bids malformed for the domain.
    pub fn utility(&self, bid: &Bid) -> Result<f64, DomainError> {
        let indices = self.domain.value_indices(bid)?;
        Ok(indices
            .iter()
            .enumerate()
            .map(|(issue, &value)| self.weights[issue] * self.scores[issue][value])
            .sum())
    }
}
