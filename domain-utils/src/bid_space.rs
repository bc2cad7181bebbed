use std::cmp::Ordering;
use std::sync::Arc;

use crate::bid::Bid;
use crate::domain::Domain;
use crate::error::DomainError;
use crate::utility::AdditiveUtilitySpace;

/// Catalogue sizes above this only produce a warning. Enumeration is
/// combinatorial and no hard bound is enforced; callers negotiating very
/// large domains should check `Domain::size` before enumerating.
pub const ENUMERATION_WARN_THRESHOLD: usize = 1 << 20;

/// Full ordered enumeration of every bid a domain admits. Generated once
/// per session and shared read-only afterwards; all strategy bookkeeping
/// refers to bids by their index in this catalogue.
#[derive(Clone, Debug)]
pub struct BidCatalogue {
    domain: Arc<Domain>,
    bids: Vec<Bid>,
}

impl BidCatalogue {
    /// Enumerates the Cartesian product of all issues' value sets, keeping
    /// domain issue order and per-issue value order. The last issue varies
    /// fastest.
    pub fn enumerate(domain: Arc<Domain>) -> BidCatalogue {
        let size = domain.size();
        if size > ENUMERATION_WARN_THRESHOLD {
            log::warn!(
                "Enumerating {} bids; domain is likely too large for exhaustive search.",
                size
            );
        }

        let mut combinations: Vec<Vec<_>> = vec![vec![]];
        for issue in domain.issues() {
            let mut extended = Vec::with_capacity(combinations.len() * issue.num_values());
            for combination in &combinations {
                for value in issue.values() {
                    let mut bid_values = combination.clone();
                    bid_values.push(value.clone());
                    extended.push(bid_values);
                }
            }
            combinations = extended;
        }

        let bids = combinations.into_iter().map(Bid::new_unchecked).collect();
        BidCatalogue { domain, bids }
    }

    pub fn domain(&self) -> &Arc<Domain> {
        &self.domain
    }

    pub fn len(&self) -> usize {
        self.bids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bid> {
        self.bids.get(index)
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    /// Utility of every catalogue bid under `space`, in catalogue order.
    pub fn utilities(&self, space: &AdditiveUtilitySpace) -> Result<Vec<f64>, DomainError> {
        self.bids.iter().map(|bid| space.utility(bid)).collect()
    }
}

/// Indices of bids reaching `threshold`, in catalogue order.
/// `utilities` is indexed by catalogue position.
pub fn feasible_indices(utilities: &[f64], threshold: f64) -> Vec<usize> {
    utilities
        .iter()
        .enumerate()
        .filter(|(_, &utility)| utility >= threshold)
        .map(|(index, _)| index)
        .collect()
}

/// Reorders `indices` by descending utility. The sort is stable, so equal
/// utilities keep their catalogue enumeration order.
pub fn rank_desc(indices: &[usize], utilities: &[f64]) -> Vec<usize> {
    let mut ranked = indices.to_vec();
    ranked.sort_by(|&a, &b| {
        utilities[b]
            .partial_cmp(&utilities[a])
            .unwrap_or(Ordering::Equal)
    });
    ranked
}

/// The `n` highest-utility catalogue indices, descending, ties in catalogue
/// order. Returns the whole ranking when `n` exceeds the catalogue size.
pub fn top_n_desc(utilities: &[f64], n: usize) -> Vec<usize> {
    let all: Vec<usize> = (0..utilities.len()).collect();
    let mut ranked = rank_desc(&all, utilities);
    ranked.truncate(n);
    ranked
}

/// Index with the maximum utility among `indices`; the first occurrence
/// wins on ties. `None` for an empty slice.
pub fn best_index(indices: &[usize], utilities: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for &index in indices {
        match best {
            Some(current) if utilities[index] <= utilities[current] => (),
            _ => best = Some(index),
        }
    }
    best
}
