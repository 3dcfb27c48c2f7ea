use derive_more::{Constructor, Display, From};
use serde::{Deserialize, Serialize};

/// Wraps an item that passed every applicable risk check.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Display, From, Constructor,
)]
pub struct RiskApproved<T>(pub T);

impl<T> RiskApproved<T> {
    pub fn into_item(self) -> T {
        self.0
    }
}

/// Wraps an item that failed a risk check, along with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRefused<T, Reason = String> {
    pub item: T,
    pub reason: Reason,
}

impl<T, Reason> RiskRefused<T, Reason> {
    pub fn new(item: T, reason: Reason) -> Self {
        Self { item, reason }
    }

    pub fn into_item(self) -> T {
        self.item
    }
}
