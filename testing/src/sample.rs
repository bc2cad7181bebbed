use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

use negotiation_domain::{AdditiveUtilitySpace, Bid, BidCatalogue};
use strategy_component::{DecisionAction, NegotiationStrategy};

/// Baseline opponent for tests: offers uniformly random catalogue bids and
/// accepts anything above a fixed utility threshold. Seeded for
/// reproducible sessions.
pub struct RandomBidder {
    catalogue: Arc<BidCatalogue>,
    utility_space: AdditiveUtilitySpace,
    acceptance_threshold: f64,
    rng: StdRng,
}

impl RandomBidder {
    pub fn new(
        catalogue: Arc<BidCatalogue>,
        utility_space: AdditiveUtilitySpace,
        acceptance_threshold: f64,
        seed: u64,
    ) -> RandomBidder {
        RandomBidder {
            catalogue,
            utility_space,
            acceptance_threshold,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl NegotiationStrategy for RandomBidder {
    fn decide(
        &mut self,
        standing_offer: Option<&Bid>,
        _time_fraction: f64,
    ) -> anyhow::Result<DecisionAction> {
        if let Some(offer) = standing_offer {
            if self.utility_space.utility(offer)? >= self.acceptance_threshold {
                return Ok(DecisionAction::Accept);
            }
        }

        let index = self.rng.gen_range(0..self.catalogue.len());
        match self.catalogue.get(index) {
            Some(bid) => Ok(DecisionAction::Offer(bid.clone())),
            None => anyhow::bail!("Empty bid catalogue."),
        }
    }

    fn offer_received(&mut self, _sender: &str, _bid: &Bid) -> anyhow::Result<()> {
        Ok(())
    }
}
