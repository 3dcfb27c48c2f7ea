use apex_book::{Decimal, Timestamp};
use derive_more::Constructor;
use serde::{Deserialize, Serialize};

/// One currency's holdings: `locked = total - available`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Constructor)]
pub struct Balance {
    pub currency: String,
    pub total: Decimal,
    pub available: Decimal,
    pub last_update: Timestamp,
}

impl Balance {
    pub fn zero(currency: impl Into<String>, now: Timestamp) -> Self {
        Self::new(currency.into(), Decimal::ZERO, Decimal::ZERO, now)
    }

    pub fn locked(&self) -> Decimal {
        self.total - self.available
    }

    /// Reserves `amount` of `available` against `locked`, e.g. when an
    /// order is accepted. Errs with the shortfall amount if insufficient.
    pub fn reserve(&mut self, amount: Decimal, now: Timestamp) -> Result<(), Decimal> {
        if amount > self.available {
            return Err(amount - self.available);
        }
        self.available -= amount;
        self.last_update = now;
        Ok(())
    }

    /// Releases a previously reserved amount back to `available`, e.g. on
    /// order cancellation or rejection.
    pub fn release(&mut self, amount: Decimal, now: Timestamp) {
        self.available = (self.available + amount).min(self.total);
        self.last_update = now;
    }

    /// Applies a settlement: `total` changes by `delta`, and `available`
    /// moves by `delta` as well since a fill both consumes a reservation
    /// and realizes the new balance in one step.
    pub fn settle(&mut self, delta: Decimal, now: Timestamp) {
        self.total += delta;
        self.available += delta;
        self.last_update = now;
    }
}
