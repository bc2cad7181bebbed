use std::collections::HashMap;
use std::sync::Arc;

use negotiation_domain::{top_n_desc, AdditiveUtilitySpace, Bid, BidCatalogue};
use strategy_component::{DecisionAction, NegotiationStrategy};

use crate::concession::{Config, ConcessionEngine};
use crate::frequency::FrequencyModel;

/// Adaptive concession strategy for negotiations with several counterparts.
///
/// One `FrequencyModel` is kept per counterpart identity, created lazily on
/// their first observed offer. Recalibration intersects the feasible set
/// with every counterpart's estimated-best list, so a bid counts as common
/// only when all of them should find it attractive. The care gate of each
/// emitted offer is checked against a single "favored" counterpart, rotated
/// round-robin after every offer whether or not the gate matched.
pub struct MultiPartyStrategy {
    engine: ConcessionEngine,
    models: HashMap<String, FrequencyModel>,
    /// Counterpart identities in order of first contact; rotation order.
    order: Vec<String>,
    favored: usize,
}

impl MultiPartyStrategy {
    pub fn new(
        params: serde_yaml::Value,
        catalogue: Arc<BidCatalogue>,
        utility_space: AdditiveUtilitySpace,
    ) -> anyhow::Result<MultiPartyStrategy> {
        Self::with_config(Config::from_params(params)?, catalogue, utility_space)
    }

    pub fn with_config(
        config: Config,
        catalogue: Arc<BidCatalogue>,
        utility_space: AdditiveUtilitySpace,
    ) -> anyhow::Result<MultiPartyStrategy> {
        let engine = ConcessionEngine::new(config, catalogue, utility_space)?;
        Ok(MultiPartyStrategy {
            engine,
            models: HashMap::new(),
            order: vec![],
            favored: 0,
        })
    }

    pub fn aspiration(&self) -> f64 {
        self.engine.aspiration()
    }

    /// Identity whose model gates the next offer, if any offers were
    /// observed yet.
    pub fn favored_counterpart(&self) -> Option<&str> {
        self.order.get(self.favored).map(String::as_str)
    }

    fn advance_favored(&mut self) {
        if !self.order.is_empty() {
            self.favored = (self.favored + 1) % self.order.len();
        }
    }

    fn next_offer(&mut self) -> anyhow::Result<Bid> {
        let engine = &mut self.engine;

        if engine.in_warmup() {
            let index = engine.warmup_index();
            return engine.bid(index);
        }

        if engine.recalibration_due() {
            let mut tops = Vec::with_capacity(self.order.len());
            for identity in &self.order {
                if let Some(model) = self.models.get_mut(identity) {
                    model.update();
                    log::debug!("Counterpart '{}': {}", identity, model.issue_weight_table());
                    let estimates = model.estimated_utilities(engine.catalogue())?;
                    tops.push(top_n_desc(&estimates, engine.config().opponent_top_n));
                }
            }
            engine.recalibrate(&tops);
        }

        let models = &self.models;
        let favored = self
            .order
            .get(self.favored)
            .and_then(|identity| models.get(identity));
        let index = engine.select(|bid| match favored {
            Some(model) => Ok(model.estimated_utility(bid)?),
            // Nobody to please yet.
            None => Ok(0.0),
        })?;
        engine.bid(index)
    }
}

impl NegotiationStrategy for MultiPartyStrategy {
    fn decide(
        &mut self,
        standing_offer: Option<&Bid>,
        time_fraction: f64,
    ) -> anyhow::Result<DecisionAction> {
        if let Some(offer) = standing_offer {
            if self.engine.acceptable(offer)? {
                return Ok(DecisionAction::Accept);
            }
            if time_fraction >= self.engine.config().deadline_fraction {
                return Ok(DecisionAction::EndNegotiation);
            }
        }

        let offer = self.next_offer()?;
        self.advance_favored();
        Ok(DecisionAction::Offer(offer))
    }

    fn offer_received(&mut self, sender: &str, bid: &Bid) -> anyhow::Result<()> {
        if !self.models.contains_key(sender) {
            self.models.insert(
                sender.to_string(),
                FrequencyModel::new(self.engine.catalogue().domain().clone()),
            );
            self.order.push(sender.to_string());
        }
        if let Some(model) = self.models.get_mut(sender) {
            model.observe(bid)?;
        }
        Ok(())
    }
}
