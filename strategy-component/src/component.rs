use serde::{Deserialize, Serialize};

use negotiation_domain::Bid;

/// Decision emitted by a `NegotiationStrategy` for its turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DecisionAction {
    /// Accept the standing offer as the final agreement.
    Accept,
    /// Propose this bid to the counterpart(s).
    Offer(Bid),
    /// Walk away without an agreement.
    EndNegotiation,
}

/// Turn-based bidding strategy driven by the negotiation host.
///
/// The host calls `decide` once per own turn and blocks on the result;
/// every counterpart offer observed since the previous turn is delivered
/// through `offer_received` first. Invocation is strictly sequential, so
/// implementations keep plain mutable state and don't need any internal
/// synchronization.
pub trait NegotiationStrategy {
    /// Decide the next move. `standing_offer` is the most recent counterpart
    /// offer still on the table, if any; `time_fraction` is the normalized
    /// position on the negotiation timeline in [0, 1].
    fn decide(
        &mut self,
        standing_offer: Option<&Bid>,
        time_fraction: f64,
    ) -> anyhow::Result<DecisionAction>;

    /// Notification of an offer made by counterpart `sender`. Identities are
    /// opaque to the strategy; distinct senders are tracked separately by
    /// multi-party strategies.
    fn offer_received(&mut self, sender: &str, bid: &Bid) -> anyhow::Result<()>;
}
