use crate::{Decimal, Timestamp};
use serde::{Deserialize, Serialize};

/// One price level of a `BookSide`, identified by `price` within the side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Decimal,
    pub amount: Decimal,
    pub update_id: i64,
    pub arrival: Timestamp,
}

impl PriceLevel {
    pub fn new(price: Decimal, amount: Decimal, update_id: i64, arrival: Timestamp) -> Self {
        Self {
            price,
            amount,
            update_id,
            arrival,
        }
    }
}
