use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use negotiation_domain::{
    best_index, feasible_indices, rank_desc, top_n_desc, AdditiveUtilitySpace, Bid, BidCatalogue,
};
use strategy_component::{DecisionAction, NegotiationStrategy};

use crate::frequency::FrequencyModel;

/// Tunables of the concession schedule; every field can be overridden
/// from yaml params.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Starting aspiration level (minimum acceptable own utility).
    pub initial_aspiration: f64,
    /// Starting care threshold (minimum estimated counterpart utility
    /// an emitted offer should reach).
    pub initial_care: f64,
    /// Care threshold multiplier applied at every recalibration.
    pub care_growth: f64,
    /// Reluctance multiplier decay applied at every recalibration.
    pub reluctance_decay: f64,
    /// Recalibrate every this many rounds.
    pub recalibration_period: u32,
    /// Rounds of own-best-first bidding before the adaptive phase.
    pub warmup_rounds: u32,
    /// Size of the counterpart's estimated-best list used for the
    /// common-bid intersection.
    pub opponent_top_n: usize,
    /// Walk away when a standing offer is unacceptable and the timeline
    /// reached this fraction.
    pub deadline_fraction: f64,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            initial_aspiration: 0.85,
            initial_care: 0.4,
            care_growth: 1.04,
            reluctance_decay: 0.985,
            recalibration_period: 10,
            warmup_rounds: 10,
            opponent_top_n: 200,
            deadline_fraction: 0.99,
        }
    }
}

impl Config {
    pub fn from_params(params: serde_yaml::Value) -> anyhow::Result<Config> {
        let config = match params {
            serde_yaml::Value::Null => Config::default(),
            params => serde_yaml::from_value(params)?,
        };
        if config.recalibration_period == 0 {
            bail!("recalibration_period must be positive");
        }
        Ok(config)
    }
}

/// Mutable per-session state of the concession schedule. Discarded with
/// the session; nothing persists across negotiations.
#[derive(Clone, Debug)]
struct StrategyState {
    /// Aspiration level: concedes over time through the reluctance decay.
    aspiration: f64,
    /// Care threshold: grows over time.
    care: f64,
    /// Multiplier slowing the concession of the aspiration level.
    reluctance: f64,
    round: u32,
    /// Scan position inside the ranked feasible list.
    cursor: usize,
}

/// Aspiration bookkeeping shared by the bilateral and multi-party
/// strategies: the own-utility view of the catalogue, the ranked feasible
/// list with its cursor, and the periodic recalibration step.
pub(crate) struct ConcessionEngine {
    config: Config,
    utility_space: AdditiveUtilitySpace,
    catalogue: Arc<BidCatalogue>,
    /// Own utility per catalogue bid, catalogue order.
    utilities: Vec<f64>,
    /// Catalogue indices with own utility >= aspiration, catalogue order.
    feasible: Vec<usize>,
    /// `feasible` sorted by descending own utility, stable.
    ranked: Vec<usize>,
    /// Highest-own-utility catalogue index; the empty-feasible fallback.
    best_overall: usize,
    state: StrategyState,
}

impl ConcessionEngine {
    pub fn new(
        config: Config,
        catalogue: Arc<BidCatalogue>,
        utility_space: AdditiveUtilitySpace,
    ) -> anyhow::Result<ConcessionEngine> {
        let utilities = catalogue.utilities(&utility_space)?;
        let all: Vec<usize> = (0..utilities.len()).collect();
        let best_overall = best_index(&all, &utilities)
            .ok_or_else(|| anyhow!("Can't negotiate over an empty bid catalogue"))?;

        let state = StrategyState {
            aspiration: config.initial_aspiration,
            care: config.initial_care,
            reluctance: 1.0,
            round: 0,
            cursor: 0,
        };

        let mut engine = ConcessionEngine {
            config,
            utility_space,
            catalogue,
            utilities,
            feasible: vec![],
            ranked: vec![],
            best_overall,
            state,
        };
        engine.rebuild_feasible();
        Ok(engine)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalogue(&self) -> &BidCatalogue {
        &self.catalogue
    }

    pub fn aspiration(&self) -> f64 {
        self.state.aspiration
    }

    pub fn care(&self) -> f64 {
        self.state.care
    }

    pub fn bid(&self, index: usize) -> anyhow::Result<Bid> {
        self.catalogue
            .get(index)
            .cloned()
            .ok_or_else(|| anyhow!("Bid index {} outside the catalogue", index))
    }

    /// Whether the standing offer clears the current aspiration level.
    pub fn acceptable(&self, offer: &Bid) -> anyhow::Result<bool> {
        Ok(self.utility_space.utility(offer)? >= self.state.aspiration)
    }

    pub fn in_warmup(&self) -> bool {
        self.state.round < self.config.warmup_rounds
    }

    pub fn recalibration_due(&self) -> bool {
        self.state.round % self.config.recalibration_period == 0
    }

    fn rebuild_feasible(&mut self) {
        self.feasible = feasible_indices(&self.utilities, self.state.aspiration);
        self.ranked = rank_desc(&self.feasible, &self.utilities);
    }

    fn fallback_index(&self) -> usize {
        self.ranked.first().copied().unwrap_or(self.best_overall)
    }

    /// Own-best-first bidding for the warm-up phase: the round-th entry of
    /// the ranked feasible list.
    pub fn warmup_index(&mut self) -> usize {
        let index = self
            .ranked
            .get(self.state.cursor)
            .copied()
            .unwrap_or_else(|| self.fallback_index());
        self.state.round += 1;
        self.state.cursor += 1;
        index
    }

    /// Periodic recalibration: rebuilds the feasible list under the current
    /// aspiration, tightens care and reluctance, and derives the next
    /// aspiration from the best bid still attractive to every counterpart
    /// (`counterpart_tops` holds each counterpart's estimated-best catalogue
    /// indices). Falls back to the best feasible bid when the intersection
    /// is empty, and to the best catalogue bid when even the feasible set is.
    pub fn recalibrate(&mut self, counterpart_tops: &[Vec<usize>]) {
        self.rebuild_feasible();
        self.state.care *= self.config.care_growth;
        self.state.reluctance *= self.config.reluctance_decay;

        let mut common = self.feasible.clone();
        for top in counterpart_tops {
            let top: HashSet<usize> = top.iter().copied().collect();
            common.retain(|index| top.contains(index));
        }

        let pivot = best_index(&common, &self.utilities)
            .or_else(|| best_index(&self.feasible, &self.utilities))
            .unwrap_or(self.best_overall);
        self.state.aspiration = self.utilities[pivot] * self.state.reluctance;

        log::debug!(
            "Recalibration at round {}: {} feasible, {} common bids, aspiration {:.3}, care {:.3}",
            self.state.round,
            self.feasible.len(),
            common.len(),
            self.state.aspiration,
            self.state.care,
        );
    }

    /// Scans the ranked feasible list from the cursor for the first bid
    /// clearing both the aspiration level and the care threshold under
    /// `care_estimate`. When the scan runs dry the cursor resets and the
    /// single best feasible bid is offered again.
    pub fn select(
        &mut self,
        care_estimate: impl Fn(&Bid) -> anyhow::Result<f64>,
    ) -> anyhow::Result<usize> {
        self.state.round += 1;

        for position in self.state.cursor..self.ranked.len() {
            let index = self.ranked[position];
            if self.utilities[index] < self.state.aspiration {
                continue;
            }
            let bid = self.bid(index)?;
            if care_estimate(&bid)? >= self.state.care {
                self.state.cursor = position + 1;
                return Ok(index);
            }
        }

        self.state.cursor = 0;
        Ok(self.fallback_index())
    }
}

/// Bilateral adaptive concession strategy built on a single frequency
/// opponent model. Accepts a standing offer clearing the aspiration level,
/// walks away near the deadline, and otherwise offers the next bid that is
/// good enough for itself and plausible for the counterpart.
pub struct ConcessionStrategy {
    engine: ConcessionEngine,
    model: FrequencyModel,
}

impl ConcessionStrategy {
    pub fn new(
        params: serde_yaml::Value,
        catalogue: Arc<BidCatalogue>,
        utility_space: AdditiveUtilitySpace,
    ) -> anyhow::Result<ConcessionStrategy> {
        Self::with_config(Config::from_params(params)?, catalogue, utility_space)
    }

    pub fn with_config(
        config: Config,
        catalogue: Arc<BidCatalogue>,
        utility_space: AdditiveUtilitySpace,
    ) -> anyhow::Result<ConcessionStrategy> {
        let model = FrequencyModel::new(catalogue.domain().clone());
        let engine = ConcessionEngine::new(config, catalogue, utility_space)?;
        Ok(ConcessionStrategy { engine, model })
    }

    pub fn aspiration(&self) -> f64 {
        self.engine.aspiration()
    }

    pub fn care(&self) -> f64 {
        self.engine.care()
    }

    fn next_offer(&mut self) -> anyhow::Result<Bid> {
        let engine = &mut self.engine;

        if engine.in_warmup() {
            let index = engine.warmup_index();
            return engine.bid(index);
        }

        if engine.recalibration_due() {
            self.model.update();
            log::debug!("{}", self.model.issue_weight_table());
            log::trace!("{}", self.model.option_value_table());

            let estimates = self.model.estimated_utilities(engine.catalogue())?;
            let top = top_n_desc(&estimates, engine.config().opponent_top_n);
            engine.recalibrate(&[top]);
        }

        let model = &self.model;
        let index = engine.select(|bid| Ok(model.estimated_utility(bid)?))?;
        engine.bid(index)
    }
}

impl NegotiationStrategy for ConcessionStrategy {
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
        Ok(DecisionAction::Offer(self.next_offer()?))
    }

    fn offer_received(&mut self, _sender: &str, bid: &Bid) -> anyhow::Result<()> {
        self.model.observe(bid)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use negotiation_domain::{Domain, Issue, Value};

    fn two_by_two() -> Arc<Domain> {
        let issues = vec![
            Issue::new("a", vec![Value::discrete("a1"), Value::discrete("a2")]).unwrap(),
            Issue::new("b", vec![Value::discrete("b1"), Value::discrete("b2")]).unwrap(),
        ];
        Arc::new(Domain::new(issues).unwrap())
    }

    fn space(domain: Arc<Domain>, top_score: f64) -> AdditiveUtilitySpace {
        AdditiveUtilitySpace::new(
            domain,
            vec![0.5, 0.5],
            vec![vec![top_score, 0.0], vec![top_score, 0.0]],
        )
        .unwrap()
    }

    fn bid(domain: &Domain, a: &str, b: &str) -> Bid {
        domain
            .bid(vec![Value::discrete(a), Value::discrete(b)])
            .unwrap()
    }

    fn strategy(config: Config, top_score: f64) -> (ConcessionStrategy, Arc<Domain>) {
        let domain = two_by_two();
        let catalogue = Arc::new(BidCatalogue::enumerate(domain.clone()));
        let strategy =
            ConcessionStrategy::with_config(config, catalogue, space(domain.clone(), top_score))
                .unwrap();
        (strategy, domain)
    }

    #[test]
    fn test_accepts_offer_meeting_aspiration() {
        let (mut strategy, domain) = strategy(Config::default(), 1.0);
        let offer = bid(&domain, "a1", "b1");
        let action = strategy.decide(Some(&offer), 0.1).unwrap();
        assert_eq!(action, DecisionAction::Accept);
    }

    #[test]
    fn test_walks_away_at_deadline() {
        let (mut strategy, domain) = strategy(Config::default(), 1.0);
        let offer = bid(&domain, "a2", "b2");

        let action = strategy.decide(Some(&offer), 0.995).unwrap();
        assert_eq!(action, DecisionAction::EndNegotiation);

        // Before the deadline an unacceptable offer is countered.
        let action = strategy.decide(Some(&offer), 0.5).unwrap();
        assert!(matches!(action, DecisionAction::Offer(_)));
    }

    #[test]
    fn test_warmup_follows_own_ranking() {
        let config = Config {
            initial_aspiration: 0.4,
            ..Config::default()
        };
        let (mut strategy, domain) = strategy(config, 1.0);

        let expected = vec![
            bid(&domain, "a1", "b1"),
            bid(&domain, "a1", "b2"),
            bid(&domain, "a2", "b1"),
        ];
        for expected in expected {
            match strategy.decide(None, 0.0).unwrap() {
                DecisionAction::Offer(offered) => assert_eq!(offered, expected),
                other => panic!("Expected Offer, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_empty_feasible_set_falls_back_to_best_bid() {
        // Maximum reachable utility 0.6 stays below the 0.85 aspiration.
        let (mut strategy, domain) = strategy(Config::default(), 0.6);

        let action = strategy.decide(None, 0.0).unwrap();
        assert_eq!(action, DecisionAction::Offer(bid(&domain, "a1", "b1")));
    }

    #[test]
    fn test_recalibration_derives_aspiration_from_best_feasible() {
        // No warm-up and an empty top list force the empty-intersection
        // path on the very first decision.
        let config = Config {
            warmup_rounds: 0,
            recalibration_period: 1,
            opponent_top_n: 0,
            ..Config::default()
        };
        let (mut strategy, _domain) = strategy(config, 1.0);

        let action = strategy.decide(None, 0.0).unwrap();
        assert!(matches!(action, DecisionAction::Offer(_)));

        // Best feasible own utility is 1.0; one reluctance decay applies.
        assert!((strategy.aspiration() - 0.985).abs() < 1e-9);
        assert!((strategy.care() - 0.4 * 1.04).abs() < 1e-9);
    }

    #[test]
    fn test_scan_skips_bids_failing_the_care_threshold() {
        let config = Config {
            initial_aspiration: 0.4,
            warmup_rounds: 0,
            recalibration_period: 1,
            initial_care: 0.7,
            care_growth: 1.0,
            reluctance_decay: 0.5,
            ..Config::default()
        };
        let (mut strategy, domain) = strategy(config, 1.0);

        // Counterpart keeps asking for b2 while conceding on issue a.
        for offer in &[
            bid(&domain, "a2", "b2"),
            bid(&domain, "a1", "b2"),
            bid(&domain, "a2", "b2"),
        ] {
            strategy.offer_received("them", offer).unwrap();
        }

        // After recalibration the aspiration drops to 0.5. The own-best
        // (a1, b1) is scanned first but its estimated counterpart utility
        // (0.5) misses the care threshold; (a1, b2) clears both gates.
        let action = strategy.decide(None, 0.01).unwrap();
        assert_eq!(action, DecisionAction::Offer(bid(&domain, "a1", "b2")));
        assert!((strategy.aspiration() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_config_params_roundtrip() {
        let config = Config::from_params(serde_yaml::Value::Null).unwrap();
        assert_eq!(config.recalibration_period, 10);
        assert_eq!(config.opponent_top_n, 200);

        let overridden: Config =
            serde_yaml::from_str("initial_aspiration: 0.9\nwarmup_rounds: 3").unwrap();
        assert!((overridden.initial_aspiration - 0.9).abs() < 1e-9);
        assert_eq!(overridden.warmup_rounds, 3);
        assert_eq!(overridden.recalibration_period, 10);
    }
}
