use apex_book::{Decimal, Timestamp};
use apex_markets::{ExchangeId, Side};
use derive_more::Constructor;
use serde::{Deserialize, Serialize};

/// A single completed fill, reconciled against the originating order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Constructor)]
pub struct Trade {
    pub trade_id: String,
    pub client_order_id: String,
    pub exchange_order_id: Option<String>,
    pub exchange: ExchangeId,
    pub symbol: String,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub fee: Decimal,
    pub fee_currency: String,
    pub timestamp: Timestamp,
}

impl Trade {
    pub fn notional(&self) -> Decimal {
        self.price * self.quantity
    }
}
