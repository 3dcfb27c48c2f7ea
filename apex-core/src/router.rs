use crate::event::TradingEvent;
use crate::trading_core::{FillReport, TradingCore};
use apex_book::{Decimal, Timestamp};
use apex_markets::{ExchangeId, Side};
use std::sync::Arc;

/// A single price-level update from an external feed, as delivered to
/// [`MarketDataRouter::submit_market_tick`].
///
/// `update_id` is the venue-provided monotonic id for this book mutation;
/// when the adapter has none, `timestamp` acts as the id instead.
#[derive(Debug, Clone)]
pub struct MarketTick {
    pub symbol: String,
    pub exchange: ExchangeId,
    pub price: Decimal,
    pub quantity: Decimal,
    pub is_bid: bool,
    pub timestamp: u64,
    pub update_id: Option<i64>,
}

impl MarketTick {
    fn effective_update_id(&self) -> i64 {
        self.update_id.unwrap_or(self.timestamp as i64)
    }
}

/// An informational trade print from an external feed (not a fill against
/// a client order — see [`TradingEvent::TickTrade`] vs
/// [`TradingEvent::TradeExecuted`]).
#[derive(Debug, Clone)]
pub struct TradeTick {
    pub symbol: String,
    pub exchange: ExchangeId,
    pub price: Decimal,
    pub quantity: Decimal,
    pub side: Side,
}

/// Normalizes external market data into `OrderBook` mutations and
/// `TradingCore` events.
///
/// Wraps the same `TradingCore` it feeds rather than holding its own
/// registry/clock/event-queue handles, since both types live in this crate
/// and duplicating that ownership would only invite the two to drift.
#[derive(Debug, Clone)]
pub struct MarketDataRouter {
    core: Arc<TradingCore>,
}

impl MarketDataRouter {
    pub fn new(core: Arc<TradingCore>) -> Self {
        Self { core }
    }

    /// Applies `tick` to the symbol's book via `update_bid`/`update_ask`
    /// and enqueues an `on_market_data` notification. A level with zero
    /// quantity deletes the price per the book engine's own edge case
    /// handling — this router does not special-case it.
    pub fn submit_market_tick(&self, tick: MarketTick) {
        let book = self.core.registry().get_or_create(&tick.symbol);
        let now = self.core.now();
        let id = tick.effective_update_id();
        if tick.is_bid {
            book.update_bid(tick.price, tick.quantity, id, now);
        } else {
            book.update_ask(tick.price, tick.quantity, id, now);
        }
        self.core.mark_to_market(&tick.symbol, book.mid_price());
        self.core.event_queue().enqueue(TradingEvent::MarketData {
            symbol: tick.symbol,
            price: tick.price,
            quantity: tick.quantity,
            is_bid: tick.is_bid,
        });
    }

    /// Enqueues an `on_trade` notification for an informational print. This
    /// does not touch any order book or position — it is purely a market
    /// data pass-through.
    pub fn submit_trade_tick(&self, tick: TradeTick) {
        self.core.event_queue().enqueue(TradingEvent::TickTrade {
            symbol: tick.symbol,
            price: tick.price,
            quantity: tick.quantity,
            is_buy: tick.side.is_buy(),
        });
    }

    /// Forwards a venue fill report to [`TradingCore::on_exchange_fill`].
    /// `timestamp_ms` is carried on [`FillReport::timestamp`] for
    /// diagnostics only; the mutation itself is stamped with the core's own
    /// clock.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_fill_report(
        &self,
        client_order_id: impl Into<String>,
        exchange_order_id: Option<String>,
        exchange: ExchangeId,
        symbol: impl Into<String>,
        side: Side,
        price: Decimal,
        quantity: Decimal,
        fee_amount: Decimal,
        fee_currency: impl Into<String>,
        timestamp_ms: u64,
    ) {
        self.core.on_exchange_fill(FillReport {
            client_order_id: client_order_id.into(),
            exchange_order_id,
            exchange,
            symbol: symbol.into(),
            side,
            price,
            quantity,
            fee_amount,
            fee_currency: fee_currency.into(),
            timestamp: timestamp_ms,
        });
    }

    pub fn now(&self) -> Timestamp {
        self.core.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClockMode, TradingCoreConfigBuilder};
    use rust_decimal_macros::dec;

    fn router() -> MarketDataRouter {
        let core = TradingCore::initialize(
            TradingCoreConfigBuilder::new().clock_mode(ClockMode::Backtest { origin: None }).build(),
        );
        MarketDataRouter::new(core)
    }

    #[test]
    fn market_tick_updates_the_books_best_bid() {
        let router = router();
        router.submit_market_tick(MarketTick {
            symbol: "BTC-USDT".into(),
            exchange: ExchangeId::Simulated,
            price: dec!(100),
            quantity: dec!(1),
            is_bid: true,
            timestamp: 1,
            update_id: Some(1),
        });
        let book = router.core.registry().get("BTC-USDT").unwrap();
        assert_eq!(book.best_bid(), dec!(100));
    }

    #[test]
    fn zero_quantity_tick_deletes_the_level() {
        let router = router();
        router.submit_market_tick(MarketTick {
            symbol: "BTC-USDT".into(),
            exchange: ExchangeId::Simulated,
            price: dec!(100),
            quantity: dec!(1),
            is_bid: true,
            timestamp: 1,
            update_id: Some(1),
        });
        router.submit_market_tick(MarketTick {
            symbol: "BTC-USDT".into(),
            exchange: ExchangeId::Simulated,
            price: dec!(100),
            quantity: Decimal::ZERO,
            is_bid: true,
            timestamp: 2,
            update_id: Some(2),
        });
        let book = router.core.registry().get("BTC-USDT").unwrap();
        assert_eq!(book.best_bid(), Decimal::ZERO);
    }

    #[test]
    fn market_tick_without_explicit_update_id_falls_back_to_timestamp() {
        let router = router();
        router.submit_market_tick(MarketTick {
            symbol: "BTC-USDT".into(),
            exchange: ExchangeId::Simulated,
            price: dec!(100),
            quantity: dec!(1),
            is_bid: true,
            timestamp: 42,
            update_id: None,
        });
        let book = router.core.registry().get("BTC-USDT").unwrap();
        assert_eq!(book.last_update_id(), 42);
    }

    #[test]
    fn market_tick_marks_open_position_to_market() {
        let router = router();
        router.core.on_exchange_fill(crate::trading_core::FillReport {
            client_order_id: "seed".into(),
            exchange_order_id: None,
            exchange: ExchangeId::Simulated,
            symbol: "BTC-USDT".into(),
            side: Side::Buy,
            price: dec!(100),
            quantity: dec!(1),
            fee_amount: Decimal::ZERO,
            fee_currency: "USDT".into(),
            timestamp: 0,
        });

        router.submit_market_tick(MarketTick {
            symbol: "BTC-USDT".into(),
            exchange: ExchangeId::Simulated,
            price: dec!(110),
            quantity: dec!(1),
            is_bid: true,
            timestamp: 1,
            update_id: Some(1),
        });
        router.submit_market_tick(MarketTick {
            symbol: "BTC-USDT".into(),
            exchange: ExchangeId::Simulated,
            price: dec!(112),
            quantity: dec!(1),
            is_bid: false,
            timestamp: 2,
            update_id: Some(2),
        });

        let position = router.core.get_position("BTC-USDT");
        assert_eq!(position.unrealized_pnl, dec!(11));
    }

    #[test]
    fn fill_report_forwards_to_on_exchange_fill() {
        let router = router();
        let order = apex_execution::Order::new(
            "cid-1",
            "BTC-USDT",
            Side::Buy,
            apex_markets::OrderType::Limit,
            dec!(100),
            dec!(1),
            router.now(),
        )
        .unwrap();
        assert!(router.core.submit_order(order));

        router.submit_fill_report(
            "cid-1",
            None,
            ExchangeId::Simulated,
            "BTC-USDT",
            Side::Buy,
            dec!(100),
            dec!(1),
            Decimal::ZERO,
            "USDT",
            0,
        );

        let position = router.core.get_position("BTC-USDT");
        assert_eq!(position.quantity, dec!(1));
    }
}
