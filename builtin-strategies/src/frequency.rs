use std::fmt::Write;
use std::sync::Arc;

use negotiation_domain::{Bid, BidCatalogue, Domain, DomainError};

/// Frequency-based estimate of a counterpart's preferences, built purely
/// from the offers they made.
///
/// Per-issue per-value counts grow with every observed offer. Two tables
/// are derived from them on `update`:
/// - an issue weight from how concentrated the issue's observed values are
///   (sum of squared relative frequencies, normalized over issues), and
/// - a per-value desirability from the value's frequency rank within its
///   issue.
///
/// Derivation is lazy: `estimated_utility` reflects new observations only
/// after the next explicit `update` call.
pub struct FrequencyModel {
    domain: Arc<Domain>,
    counts: Vec<Vec<u64>>,
    issue_weights: Vec<f64>,
    value_desirability: Vec<Vec<f64>>,
}

impl FrequencyModel {
    pub fn new(domain: Arc<Domain>) -> FrequencyModel {
        let counts: Vec<Vec<u64>> = domain
            .issues()
            .iter()
            .map(|issue| vec![0; issue.num_values()])
            .collect();
        let issue_weights = vec![0.0; domain.num_issues()];
        let value_desirability = desirability_table(&counts);
        FrequencyModel {
            domain,
            counts,
            issue_weights,
            value_desirability,
        }
    }

    pub fn domain(&self) -> &Arc<Domain> {
        &self.domain
    }

    /// Records one observed counterpart offer. O(#issues).
    /// Fails on bids malformed for the model's domain.
    pub fn observe(&mut self, bid: &Bid) -> Result<(), DomainError> {
        let indices = self.domain.value_indices(bid)?;
        for (issue, value) in indices.into_iter().enumerate() {
            self.counts[issue][value] += 1;
        }
        Ok(())
    }

    /// Recomputes both derived tables from the current counts. Idempotent
    /// until the next `observe`.
    pub fn update(&mut self) {
        self.issue_weights = concentration_weights(&self.counts);
        self.value_desirability = desirability_table(&self.counts);
    }

    /// Estimated counterpart utility of `bid` under the tables derived at
    /// the last `update`. Zero until the first `update` after observations.
    pub fn estimated_utility(&self, bid: &Bid) -> Result<f64, DomainError> {
        let indices = self.domain.value_indices(bid)?;
        Ok(indices
            .into_iter()
            .enumerate()
            .map(|(issue, value)| {
                self.issue_weights[issue] * self.value_desirability[issue][value]
            })
            .sum())
    }

    /// Estimated counterpart utility of every catalogue bid, catalogue order.
    pub fn estimated_utilities(&self, catalogue: &BidCatalogue) -> Result<Vec<f64>, DomainError> {
        catalogue
            .bids()
            .iter()
            .map(|bid| self.estimated_utility(bid))
            .collect()
    }

    pub fn issue_weights(&self) -> &[f64] {
        &self.issue_weights
    }

    /// Diagnostic rendering of the issue weight table.
    pub fn issue_weight_table(&self) -> String {
        let mut out = String::from("estimated issue weights:\n");
        for (issue, &weight) in self.domain.issues().iter().zip(&self.issue_weights) {
            let _ = writeln!(out, "  {}: {:.4}", issue.name(), weight);
        }
        out
    }

    /// Diagnostic rendering of the value desirability table.
    pub fn option_value_table(&self) -> String {
        let mut out = String::from("estimated option values:\n");
        for (issue, row) in self.domain.issues().iter().zip(&self.value_desirability) {
            let _ = writeln!(out, "  {}:", issue.name());
            for (value, &desirability) in issue.values().iter().zip(row) {
                let _ = writeln!(out, "    {}: {:.4}", value, desirability);
            }
        }
        out
    }

    /// Diagnostic rendering of the raw observation counts.
    pub fn bid_count_table(&self) -> String {
        let mut out = String::from("observed value counts:\n");
        for (issue, row) in self.domain.issues().iter().zip(&self.counts) {
            let _ = writeln!(out, "  {}:", issue.name());
            for (value, &count) in issue.values().iter().zip(row) {
                let _ = writeln!(out, "    {}: {}", value, count);
            }
        }
        out
    }
}

/// Herfindahl-style concentration per issue, normalized to sum to 1 over
/// issues. An issue whose observed values cluster tightly gets a high
/// weight. A never-observed issue contributes a raw score of zero; the
/// remaining issues are not renormalized to compensate.
fn concentration_weights(counts: &[Vec<u64>]) -> Vec<f64> {
    let mut raw = Vec::with_capacity(counts.len());
    for issue_counts in counts {
        let total: u64 = issue_counts.iter().sum();
        if total == 0 {
            raw.push(0.0);
            continue;
        }
        let total = total as f64;
        raw.push(
            issue_counts
                .iter()
                .map(|&count| (count as f64 / total).powi(2))
                .sum(),
        );
    }

    let sum: f64 = raw.iter().sum();
    if sum > 0.0 {
        for weight in &mut raw {
            *weight /= sum;
        }
    }
    raw
}

/// Rank-based desirability per value. The most frequent value of an issue
/// with K values gets (K - 1 + 1) / K = 1.0, the rank-r value gets
/// (K - r + 1) / K. Tied counts share the rank `1 + #strictly-greater`,
/// so ranks skip over tied groups.
fn desirability_table(counts: &[Vec<u64>]) -> Vec<Vec<f64>> {
    counts
        .iter()
        .map(|issue_counts| {
            let k = issue_counts.len() as f64;
            issue_counts
                .iter()
                .map(|&count| {
                    let rank = 1 + issue_counts
                        .iter()
                        .filter(|&&other| other > count)
                        .count();
                    (k - rank as f64 + 1.0) / k
                })
                .collect()
        })
        .collect()
}
