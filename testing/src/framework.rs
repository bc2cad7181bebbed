use anyhow::bail;

use negotiation_domain::Bid;
use strategy_component::{DecisionAction, NegotiationStrategy};

/// Result of a simulated negotiation session.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionOutcome {
    Agreement {
        bid: Bid,
        round: u32,
        accepted_by: String,
    },
    NoAgreement {
        rounds: u32,
    },
}

#[derive(Clone, Debug)]
pub struct RecordedAction {
    pub round: u32,
    pub party: String,
    pub action: DecisionAction,
}

/// Everything that happened during a session, for assertions in tests.
#[derive(Clone, Debug)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub actions: Vec<RecordedAction>,
}

impl SessionReport {
    pub fn offers_from(&self, party: &str) -> usize {
        self.actions
            .iter()
            .filter(|recorded| {
                recorded.party == party && matches!(recorded.action, DecisionAction::Offer(_))
            })
            .count()
    }
}

/// Synchronous turn-based host loop for driving strategies against each
/// other. Parties act in registration order; every emitted offer becomes
/// the standing offer and is relayed to all other parties.
///
/// The first `Accept` closes the session as an agreement — unanimity
/// voting of real multilateral protocols is deliberately not modelled.
pub struct SessionRunner {
    parties: Vec<(String, Box<dyn NegotiationStrategy>)>,
    deadline_rounds: u32,
}

impl SessionRunner {
    pub fn new(deadline_rounds: u32) -> SessionRunner {
        SessionRunner {
            parties: vec![],
            deadline_rounds,
        }
    }

    pub fn add_party(
        mut self,
        name: impl ToString,
        strategy: Box<dyn NegotiationStrategy>,
    ) -> SessionRunner {
        self.parties.push((name.to_string(), strategy));
        self
    }

    pub fn run(mut self) -> anyhow::Result<SessionReport> {
        if self.parties.len() < 2 {
            bail!(
                "A session needs at least 2 parties, got {}.",
                self.parties.len()
            );
        }

        let mut actions = vec![];
        let mut standing: Option<(String, Bid)> = None;

        for round in 0..self.deadline_rounds {
            let time_fraction = f64::from(round) / f64::from(self.deadline_rounds);

            for current in 0..self.parties.len() {
                let standing_bid = standing.as_ref().map(|(_, bid)| bid.clone());
                let (name, strategy) = &mut self.parties[current];
                let name = name.clone();

                let action = strategy.decide(standing_bid.as_ref(), time_fraction)?;
                log::debug!("Round {}, '{}': {:?}", round, name, action);
                actions.push(RecordedAction {
                    round,
                    party: name.clone(),
                    action: action.clone(),
                });

                match action {
                    DecisionAction::Accept => {
                        let (_, bid) = match standing.take() {
                            Some(standing) => standing,
                            None => bail!("'{}' accepted without a standing offer.", name),
                        };
                        return Ok(SessionReport {
                            outcome: SessionOutcome::Agreement {
                                bid,
                                round,
                                accepted_by: name,
                            },
                            actions,
                        });
                    }
                    DecisionAction::EndNegotiation => {
                        log::info!("Round {}: '{}' ended the negotiation.", round, name);
                        return Ok(SessionReport {
                            outcome: SessionOutcome::NoAgreement { rounds: round },
                            actions,
                        });
                    }
                    DecisionAction::Offer(bid) => {
                        for other in 0..self.parties.len() {
                            if other == current {
                                continue;
                            }
                            self.parties[other].1.offer_received(&name, &bid)?;
                        }
                        standing = Some((name, bid));
                    }
                }
            }
        }

        Ok(SessionReport {
            outcome: SessionOutcome::NoAgreement {
                rounds: self.deadline_rounds,
            },
            actions,
        })
    }
}
