pub mod component;

pub use component::{DecisionAction, NegotiationStrategy};
