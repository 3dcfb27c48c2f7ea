use apex_book::decimal::round_decimal18;
use apex_book::{Decimal, Timestamp};
use apex_markets::{ExchangeId, OrderStatus, OrderType, Side, TradingPair};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rounding tolerance for the invariant that summed execution quantities
/// equal `filled_quantity`.
const FILL_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 8);

#[derive(Debug, Clone, thiserror::Error)]
pub enum OrderError {
    #[error("client_order_id must not be empty")]
    EmptyClientOrderId,
    #[error("trading_pair must not be empty")]
    EmptyTradingPair,
    #[error("quantity must be > 0")]
    NonPositiveQuantity,
    #[error("price must be > 0 for order type {0}")]
    NonPositivePrice(OrderType),
    #[error("filled_quantity {filled} exceeds quantity {quantity}")]
    OverFilled { filled: Decimal, quantity: Decimal },
    #[error("illegal status transition from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },
}

/// A single (possibly partial) execution of an order, as reported by a venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub execution_id: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub fee_amount: Decimal,
    pub fee_currency: String,
    pub exchange: ExchangeId,
    pub timestamp: Timestamp,
}

/// A client-originated order and its lifecycle state.
///
/// Status transitions: `PENDING -> OPEN | REJECTED`, `OPEN -> PARTIAL |
/// FILLED | CANCELLED | EXPIRED`, `PARTIAL -> PARTIAL | FILLED | CANCELLED |
/// EXPIRED`. The terminal set is `{FILLED, CANCELLED, REJECTED, EXPIRED}`;
/// once there, no further transition is permitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub client_order_id: String,
    pub trading_pair: String,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub base_ccy: String,
    pub quote_ccy: String,
    pub price: Decimal,
    pub quantity: Decimal,
    pub filled_quantity: Decimal,
    pub creation_time: Timestamp,
    pub last_update_time: Timestamp,
    pub status: OrderStatus,
    pub position_tag: Option<String>,
    pub exchange_order_id: Option<String>,
    pub executions: Vec<Execution>,
    pub rejection_reason: Option<String>,
    pub expiry_time: Option<Timestamp>,
}

/// The canonical wire shape for an order: every stored field plus the
/// derived fields {remaining_quantity, fill_percentage, age_ms, is_active,
/// average_execution_price, total_fees}. Produced by [`Order::to_json`].
///
/// `Order::from_json` deserializes straight into `Order` and ignores the
/// extra derived fields, so `from_json(to_json(o))` restores every stored
/// field exactly while the derived ones are recomputed on demand rather than
/// trusted from the wire.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSnapshot {
    pub client_order_id: String,
    pub trading_pair: String,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub base_ccy: String,
    pub quote_ccy: String,
    pub price: Decimal,
    pub quantity: Decimal,
    pub filled_quantity: Decimal,
    pub creation_time: Timestamp,
    pub last_update_time: Timestamp,
    pub status: OrderStatus,
    pub position_tag: Option<String>,
    pub exchange_order_id: Option<String>,
    pub executions: Vec<Execution>,
    pub rejection_reason: Option<String>,
    pub expiry_time: Option<Timestamp>,
    pub remaining_quantity: Decimal,
    pub fill_percentage: Decimal,
    pub age_ms: i64,
    pub is_active: bool,
    pub average_execution_price: Decimal,
    pub total_fees: HashMap<String, Decimal>,
}

impl Order {
    /// Constructs a new `PENDING` order. `trading_pair` is parsed per the
    /// `<BASE>-<QUOTE>` grammar; a pair with no `-` defaults its quote
    /// currency to `"USDT"`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client_order_id: impl Into<String>,
        trading_pair: impl Into<String>,
        side: Side,
        order_type: OrderType,
        price: Decimal,
        quantity: Decimal,
        now: Timestamp,
    ) -> Result<Self, OrderError> {
        let client_order_id = client_order_id.into();
        let trading_pair = trading_pair.into();
        if client_order_id.is_empty() {
            return Err(OrderError::EmptyClientOrderId);
        }
        if trading_pair.is_empty() {
            return Err(OrderError::EmptyTradingPair);
        }
        if quantity <= Decimal::ZERO {
            return Err(OrderError::NonPositiveQuantity);
        }
        if order_type.requires_price() && price <= Decimal::ZERO {
            return Err(OrderError::NonPositivePrice(order_type));
        }

        let (base_ccy, quote_ccy) = match TradingPair::parse(&trading_pair) {
            Ok(pair) => (pair.base().to_string(), pair.quote().to_string()),
            Err(_) => (trading_pair.clone(), "USDT".to_string()),
        };

        Ok(Self {
            client_order_id,
            trading_pair,
            side,
            order_type,
            base_ccy,
            quote_ccy,
            price,
            quantity,
            filled_quantity: Decimal::ZERO,
            creation_time: now,
            last_update_time: now,
            status: OrderStatus::Pending,
            position_tag: None,
            exchange_order_id: None,
            executions: Vec::new(),
            rejection_reason: None,
            expiry_time: None,
        })
    }

    pub fn remaining(&self) -> Decimal {
        self.quantity - self.filled_quantity
    }

    pub fn fill_percentage(&self) -> Decimal {
        if self.quantity.is_zero() {
            Decimal::ZERO
        } else {
            round_decimal18(self.filled_quantity / self.quantity * Decimal::from(100))
        }
    }

    pub fn average_execution_price(&self) -> Decimal {
        if self.filled_quantity.is_zero() {
            return Decimal::ZERO;
        }
        let notional: Decimal = self.executions.iter().map(|e| e.quantity * e.price).sum();
        round_decimal18(notional / self.filled_quantity)
    }

    /// Total fees per currency. No implicit cross-currency conversion.
    pub fn total_fees(&self) -> HashMap<String, Decimal> {
        let mut totals: HashMap<String, Decimal> = HashMap::new();
        for exec in &self.executions {
            *totals.entry(exec.fee_currency.clone()).or_insert(Decimal::ZERO) += exec.fee_amount;
        }
        totals
    }

    pub fn age_ms(&self, now: Timestamp) -> i64 {
        now.as_millis() - self.creation_time.as_millis()
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Snapshots this order for wire transmission: every stored field plus
    /// `remaining_quantity`, `fill_percentage`, `age_ms`, `is_active`,
    /// `average_execution_price`, and `total_fees`.
    pub fn to_json(&self, now: Timestamp) -> OrderSnapshot {
        OrderSnapshot {
            client_order_id: self.client_order_id.clone(),
            trading_pair: self.trading_pair.clone(),
            side: self.side,
            order_type: self.order_type,
            base_ccy: self.base_ccy.clone(),
            quote_ccy: self.quote_ccy.clone(),
            price: self.price,
            quantity: self.quantity,
            filled_quantity: self.filled_quantity,
            creation_time: self.creation_time,
            last_update_time: self.last_update_time,
            status: self.status,
            position_tag: self.position_tag.clone(),
            exchange_order_id: self.exchange_order_id.clone(),
            executions: self.executions.clone(),
            rejection_reason: self.rejection_reason.clone(),
            expiry_time: self.expiry_time,
            remaining_quantity: self.remaining(),
            fill_percentage: self.fill_percentage(),
            age_ms: self.age_ms(now),
            is_active: self.is_active(),
            average_execution_price: self.average_execution_price(),
            total_fees: self.total_fees(),
        }
    }

    /// Parses an order from JSON text, such as one produced by serializing
    /// [`OrderSnapshot`]. Unknown fields (the derived ones `to_json` adds)
    /// are ignored; only the stored fields are restored.
    pub fn from_json(json: &str) -> Result<Order, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn transition_to(&mut self, to: OrderStatus, now: Timestamp) -> Result<(), OrderError> {
        let from = self.status;
        let allowed = matches!(
            (from, to),
            (OrderStatus::Pending, OrderStatus::Open)
                | (OrderStatus::Pending, OrderStatus::Rejected)
                | (OrderStatus::Open, OrderStatus::Partial)
                | (OrderStatus::Open, OrderStatus::Filled)
                | (OrderStatus::Open, OrderStatus::Cancelled)
                | (OrderStatus::Open, OrderStatus::Expired)
                | (OrderStatus::Partial, OrderStatus::Partial)
                | (OrderStatus::Partial, OrderStatus::Filled)
                | (OrderStatus::Partial, OrderStatus::Cancelled)
                | (OrderStatus::Partial, OrderStatus::Expired)
        );
        if !allowed {
            return Err(OrderError::IllegalTransition { from, to });
        }
        self.status = to;
        self.last_update_time = now;
        Ok(())
    }

    pub fn accept(&mut self, now: Timestamp) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Open, now)
    }

    pub fn reject(&mut self, reason: impl Into<String>, now: Timestamp) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Rejected, now)?;
        self.rejection_reason = Some(reason.into());
        Ok(())
    }

    pub fn cancel(&mut self, now: Timestamp) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Cancelled, now)
    }

    pub fn expire(&mut self, now: Timestamp) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Expired, now)
    }

    /// Records a fill. If `execution` is `None`, a synthetic one is
    /// synthesized from `qty`/`price`. Fills exceeding `quantity` are
    /// clamped; the excess is reported as a validation error but does not
    /// corrupt the order.
    pub fn apply_fill(
        &mut self,
        qty: Decimal,
        price: Decimal,
        execution: Option<Execution>,
        now: Timestamp,
    ) -> Result<(), OrderError> {
        let clamped = (self.filled_quantity + qty).min(self.quantity);
        let accepted_qty = clamped - self.filled_quantity;
        let overflow = (self.filled_quantity + qty) - clamped;

        let execution = execution.unwrap_or_else(|| Execution {
            execution_id: format!("{}-{}", self.client_order_id, self.executions.len() + 1),
            quantity: accepted_qty,
            price,
            fee_amount: Decimal::ZERO,
            fee_currency: self.quote_ccy.clone(),
            exchange: ExchangeId::Simulated,
            timestamp: now,
        });
        self.executions.push(execution);
        self.filled_quantity = clamped;

        let next_status = if self.filled_quantity >= self.quantity {
            OrderStatus::Filled
        } else {
            OrderStatus::Partial
        };
        self.transition_to(next_status, now)?;

        if overflow.is_sign_positive() && !overflow.is_zero() {
            return Err(OrderError::OverFilled {
                filled: self.filled_quantity + overflow,
                quantity: self.quantity,
            });
        }
        Ok(())
    }

    pub fn add_execution(&mut self, execution: Execution, now: Timestamp) -> Result<(), OrderError> {
        self.apply_fill(execution.quantity, execution.price, Some(execution), now)
    }

    pub fn fills_within_tolerance(&self) -> bool {
        let total: Decimal = self.executions.iter().map(|e| e.quantity).sum();
        (total - self.filled_quantity).abs() <= FILL_TOLERANCE
    }

    /// Comparator used by sorted order containers: primary by price (BUY
    /// higher-first, SELL lower-first), tie-broken by `creation_time`
    /// ascending.
    pub fn priority_cmp(&self, other: &Order) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        let price_order = match self.side {
            Side::Buy => other.price.cmp(&self.price),
            Side::Sell => self.price.cmp(&other.price),
        };
        match price_order {
            Ordering::Equal => self.creation_time.cmp(&other.creation_time),
            ordering => ordering,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn t(n: i64) -> Timestamp {
        Timestamp::from_nanos(n)
    }

    fn new_order() -> Order {
        Order::new("cid-1", "BTC-USDT", Side::Buy, OrderType::Limit, dec!(100), dec!(2), t(0))
            .unwrap()
    }

    #[test]
    fn trading_pair_without_dash_defaults_quote_to_usdt() {
        let order =
            Order::new("cid-2", "BTC", Side::Buy, OrderType::Market, dec!(0), dec!(1), t(0))
                .unwrap();
        assert_eq!(order.base_ccy, "BTC");
        assert_eq!(order.quote_ccy, "USDT");
    }

    #[test]
    fn limit_order_requires_positive_price() {
        let err = Order::new("cid", "BTC-USDT", Side::Buy, OrderType::Limit, dec!(0), dec!(1), t(0))
            .unwrap_err();
        assert!(matches!(err, OrderError::NonPositivePrice(_)));
    }

    #[test]
    fn status_progression_never_leaves_terminal_state() {
        let mut order = new_order();
        order.accept(t(1)).unwrap();
        order.cancel(t(2)).unwrap();
        assert!(order.accept(t(3)).is_err());
        assert!(order.cancel(t(3)).is_err());
    }

    #[test]
    fn partial_then_full_fill_transitions_correctly() {
        let mut order = new_order();
        order.accept(t(1)).unwrap();
        order.apply_fill(dec!(1), dec!(100), None, t(2)).unwrap();
        assert_eq!(order.status, OrderStatus::Partial);
        order.apply_fill(dec!(1), dec!(100), None, t(3)).unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(order.fills_within_tolerance());
    }

    #[test]
    fn overfill_is_clamped_and_reported() {
        let mut order = new_order();
        order.accept(t(1)).unwrap();
        let err = order.apply_fill(dec!(5), dec!(100), None, t(2)).unwrap_err();
        assert_eq!(order.filled_quantity, dec!(2));
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(matches!(err, OrderError::OverFilled { .. }));
    }

    #[test]
    fn round_trip_through_json_preserves_stored_fields() {
        let mut order = new_order();
        order.accept(t(1)).unwrap();
        order.apply_fill(dec!(1), dec!(100), None, t(2)).unwrap();

        let json = serde_json::to_string(&order).unwrap();
        let restored: Order = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.client_order_id, order.client_order_id);
        assert_eq!(restored.filled_quantity, order.filled_quantity);
        assert_eq!(restored.status, order.status);
        assert_eq!(restored.executions, order.executions);
    }

    #[test]
    fn to_json_includes_derived_fields_and_from_json_restores_stored_ones() {
        let mut order = new_order();
        order.accept(t(1)).unwrap();
        order.apply_fill(dec!(1), dec!(100), None, t(2)).unwrap();

        let snapshot = order.to_json(t(1_000_000));
        assert_eq!(snapshot.remaining_quantity, dec!(1));
        assert_eq!(snapshot.fill_percentage, dec!(50));
        assert_eq!(snapshot.average_execution_price, dec!(100));
        assert!(snapshot.is_active);
        assert_eq!(snapshot.age_ms, 1);

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored = Order::from_json(&json).unwrap();
        assert_eq!(restored.client_order_id, order.client_order_id);
        assert_eq!(restored.filled_quantity, order.filled_quantity);
        assert_eq!(restored.status, order.status);
        assert_eq!(restored.executions, order.executions);
    }

    #[test]
    fn priority_cmp_orders_buy_side_price_descending() {
        let high =
            Order::new("a", "BTC-USDT", Side::Buy, OrderType::Limit, dec!(101), dec!(1), t(0))
                .unwrap();
        let low =
            Order::new("b", "BTC-USDT", Side::Buy, OrderType::Limit, dec!(100), dec!(1), t(0))
                .unwrap();
        assert_eq!(high.priority_cmp(&low), std::cmp::Ordering::Less);
    }
}
