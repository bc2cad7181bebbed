use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::bid::Bid;
use crate::error::DomainError;

/// Single discrete option of an `Issue`. The closed set of variants rejects
/// non-discrete value kinds at the type level instead of at lookup time.
#[derive(Clone, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    #[display(fmt = "{}", _0)]
    Discrete(String),
}

impl Value {
    pub fn discrete(name: impl ToString) -> Value {
        Value::Discrete(name.to_string())
    }

    pub fn name(&self) -> &str {
        match self {
            Value::Discrete(name) => name,
        }
    }
}

/// Negotiated issue with its ordered set of discrete values.
/// Static for the whole negotiation session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Issue {
    name: String,
    values: Vec<Value>,
}

impl Issue {
    pub fn new(name: impl ToString, values: Vec<Value>) -> Result<Issue, DomainError> {
        let name = name.to_string();
        if values.is_empty() {
            return Err(DomainError::EmptyIssue(name));
        }

        let mut seen = HashSet::new();
        for value in &values {
            if !seen.insert(value.clone()) {
                return Err(DomainError::DuplicateValue {
                    issue: name,
                    value: value.name().to_string(),
                });
            }
        }
        Ok(Issue { name, values })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    /// Position of `value` in this issue's ordered value set.
    pub fn value_index(&self, value: &Value) -> Option<usize> {
        self.values.iter().position(|candidate| candidate == value)
    }
}

/// Ordered set of issues negotiated in a session. Immutable once built;
/// shared read-only between strategies and opponent models.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Domain {
    issues: Vec<Issue>,
}

impl Domain {
    pub fn new(issues: Vec<Issue>) -> Result<Domain, DomainError> {
        if issues.is_empty() {
            return Err(DomainError::EmptyDomain);
        }
        Ok(Domain { issues })
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn num_issues(&self) -> usize {
        self.issues.len()
    }

    /// Number of distinct bids the domain admits (product of value counts).
    pub fn size(&self) -> usize {
        self.issues
            .iter()
            .map(|issue| issue.num_values())
            .product()
    }

    /// Builds a `Bid` assigning `values[i]` to issue `i`, validating the
    /// assignment against the domain. The only way to construct a `Bid`.
    pub fn bid(&self, values: Vec<Value>) -> Result<Bid, DomainError> {
        if values.len() != self.issues.len() {
            return Err(DomainError::IssueCountMismatch {
                expected: self.issues.len(),
                got: values.len(),
            });
        }
        for (issue, value) in self.issues.iter().zip(values.iter()) {
            if issue.value_index(value).is_none() {
                return Err(DomainError::UnknownValue {
                    issue: issue.name().to_string(),
                    value: value.name().to_string(),
                });
            }
        }
        Ok(Bid::new_unchecked(values))
    }

    /// Resolves every value of `bid` to its per-issue value index.
    /// Fails on bids malformed for this domain (wrong arity or foreign values).
    pub fn value_indices(&self, bid: &Bid) -> Result<Vec<usize>, DomainError> {
        if bid.values().len() != self.issues.len() {
            return Err(DomainError::IssueCountMismatch {
                expected: self.issues.len(),
                got: bid.values().len(),
            });
        }
        self.issues
            .iter()
            .zip(bid.values())
            .map(|(issue, value)| {
                issue
                    .value_index(value)
                    .ok_or_else(|| DomainError::UnknownValue {
                        issue: issue.name().to_string(),
                        value: value.name().to_string(),
                    })
            })
            .collect()
    }
}
