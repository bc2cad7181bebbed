use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Value;

/// Total assignment of one `Value` to every issue of a `Domain`, in domain
/// issue order. Immutable once constructed; built through `Domain::bid`,
/// which validates the assignment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bid {
    values: Vec<Value>,
}

impl Bid {
    pub(crate) fn new_unchecked(values: Vec<Value>) -> Bid {
        Bid { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value assigned to the issue at `issue_index` (domain issue order).
    pub fn value(&self, issue_index: usize) -> Option<&Value> {
        self.values.get(issue_index)
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.values.iter().map(|value| value.name()).collect();
        write!(f, "({})", names.join(", "))
    }
}
