use apex_book::Decimal;
use apex_execution::{Balance, Order, Position, Trade};

/// The outbound notification surface `TradingCore` drives through its event
/// queue. Every method has a no-op default, so a consumer only implements
/// the callbacks it cares about — mirroring the capability-bundle shape
/// called for in place of the pervasive mutable callback fields this
/// pattern replaces.
///
/// Implementations are invoked from the event-dispatch thread, never
/// inline with the call that produced the event; they MUST NOT block for
/// long, since a slow callback delays every later event in the queue.
pub trait TradingCallbacks: Send + Sync {
    fn on_order_filled(&self, order: &Order) {
        let _ = order;
    }

    fn on_order_cancelled(&self, order: &Order) {
        let _ = order;
    }

    fn on_order_rejected(&self, order: &Order) {
        let _ = order;
    }

    fn on_trade_executed(&self, trade: &Trade) {
        let _ = trade;
    }

    fn on_position_update(&self, position: &Position) {
        let _ = position;
    }

    fn on_balance_update(&self, balance: &Balance) {
        let _ = balance;
    }

    fn on_market_data(&self, symbol: &str, price: Decimal, quantity: Decimal, is_bid: bool) {
        let _ = (symbol, price, quantity, is_bid);
    }

    fn on_trade(&self, symbol: &str, price: Decimal, quantity: Decimal, is_buy: bool) {
        let _ = (symbol, price, quantity, is_buy);
    }

    fn on_error(&self, source: &str, message: &str) {
        let _ = (source, message);
    }
}

/// The default callbacks implementation: every method is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCallbacks;

impl TradingCallbacks for NoopCallbacks {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_callbacks_accept_every_event_without_panicking() {
        let callbacks = NoopCallbacks;
        callbacks.on_error("test", "message");
        callbacks.on_market_data("BTC-USDT", Decimal::ZERO, Decimal::ZERO, true);
    }
}
