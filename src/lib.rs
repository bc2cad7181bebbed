pub mod factory;

pub use factory::{create_strategy, StrategyConfig};

pub use builtin_strategies::{concession, frequency, multi_party};
pub use builtin_strategies::{ConcessionStrategy, FrequencyModel, MultiPartyStrategy};
pub use negotiation_domain as domain;
pub use strategy_component::{DecisionAction, NegotiationStrategy};
