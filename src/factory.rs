use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use builtin_strategies::{ConcessionStrategy, MultiPartyStrategy};
use negotiation_domain::{AdditiveUtilitySpace, BidCatalogue};
use strategy_component::NegotiationStrategy;

/// Configuration of a single strategy instance: a builtin strategy name
/// plus its yaml params. Round-trips through yaml config files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

/// Instantiates a builtin strategy by name over the session's bid
/// catalogue and the agent's own utility space.
pub fn create_strategy(
    config: StrategyConfig,
    catalogue: Arc<BidCatalogue>,
    utility_space: AdditiveUtilitySpace,
) -> anyhow::Result<Box<dyn NegotiationStrategy>> {
    log::info!(
        "Creating '{}' strategy over a catalogue of {} bids.",
        config.name,
        catalogue.len()
    );

    let strategy = match config.name.as_str() {
        "Concession" => Box::new(ConcessionStrategy::new(
            config.params,
            catalogue,
            utility_space,
        )?) as Box<dyn NegotiationStrategy>,
        "MultiParty" => Box::new(MultiPartyStrategy::new(
            config.params,
            catalogue,
            utility_space,
        )?) as Box<dyn NegotiationStrategy>,
        _ => bail!("Builtin strategy '{}' doesn't exist.", config.name),
    };
    Ok(strategy)
}
