use crate::callbacks::{NoopCallbacks, TradingCallbacks};
use crate::clock::EngineClock;
use crate::config::TradingCoreConfig;
use crate::event::{EventQueue, TradingEvent};
use apex_book::{Decimal, OrderBookRegistry, Timestamp};
use apex_execution::{Balance, Execution, Order, Position, Trade};
use apex_markets::{ExchangeId, Side, TradingPair};
use apex_risk::{DefaultRiskManager, RiskLimits, RiskManager};
use fnv::FnvHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// The default quote currency assumed when a symbol carries no `-`
/// separator, matching `Order::new`'s own trading-pair grammar.
const DEFAULT_QUOTE: &str = "USDT";

/// An external fill report, as delivered by
/// `MarketDataRouter::submit_fill_report`. Drives `TradingCore::on_exchange_fill`.
#[derive(Debug, Clone)]
pub struct FillReport {
    pub client_order_id: String,
    pub exchange_order_id: Option<String>,
    pub exchange: ExchangeId,
    pub symbol: String,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub fee_amount: Decimal,
    pub fee_currency: String,
    /// Venue-reported timestamp, milliseconds since epoch. Recorded for
    /// diagnostics only — the `Trade`/`Position`/`Balance` mutations this
    /// report drives are all stamped with `TradingCore`'s own `Clock`, not
    /// this value, since comparing timestamps across two different clocks
    /// is meaningless.
    pub timestamp: u64,
}

/// JSON-serializable operational snapshot returned by `get_statistics()`.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub active_orders: usize,
    pub open_positions: usize,
    pub trade_count: usize,
    pub running: bool,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    pub daily_pnl: Decimal,
    pub total_pnl: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub symbol: String,
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub realized_pnl: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub currency: String,
    pub total: Decimal,
    pub available: Decimal,
}

/// The persistence surface of `export_state`/`import_state`: positions,
/// balances, and running P&L totals. Active orders and order books are
/// deliberately not part of this snapshot — they belong to in-flight
/// execution and live order-book feeds, not portfolio state a backtest
/// harness would want to carry across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub positions: Vec<PositionSnapshot>,
    pub balances: Vec<BalanceSnapshot>,
    pub total_pnl: Decimal,
    pub daily_pnl: Decimal,
}

#[derive(Debug, Default)]
struct CoreState {
    active_orders: FnvHashMap<String, Order>,
    positions: FnvHashMap<String, Position>,
    balances: FnvHashMap<String, Balance>,
    trade_history: Vec<Trade>,
    daily_pnl: Decimal,
    total_pnl: Decimal,
}

/// Orchestrator: owns the `OrderBookRegistry`, the `Clock`, the order /
/// position / balance maps, the trade history, and the event queue;
/// performs risk gating, fill accounting, and P&L tracking.
///
/// `TradingCore` state (`active_orders`, `positions`, `balances`,
/// `trade_history`, `risk_limits`, P&L totals) is protected by a single
/// reader-writer lock. The event queue has its own, separate lock —
/// enqueues never happen while the state lock is held, to keep the lock
/// order `registry < core_state < event_queue` (see `crate::error`).
pub struct TradingCore {
    clock: Arc<dyn EngineClock>,
    registry: Arc<OrderBookRegistry>,
    state: RwLock<CoreState>,
    risk_limits: RwLock<RiskLimits>,
    risk_manager: Box<dyn RiskManager + Send + Sync>,
    events: Arc<EventQueue>,
    callbacks: Arc<dyn TradingCallbacks>,
    running: AtomicBool,
    trade_seq: AtomicU64,
}

impl std::fmt::Debug for TradingCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradingCore")
            .field("running", &self.running.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl TradingCore {
    /// Installs a new `Clock` and `OrderBookRegistry` per `config`.
    pub fn initialize(config: TradingCoreConfig) -> Arc<Self> {
        let clock = config.clock_mode.build_clock();
        let callbacks = config.callbacks.unwrap_or_else(|| Arc::new(NoopCallbacks));
        Arc::new(Self {
            clock,
            registry: Arc::new(OrderBookRegistry::new()),
            state: RwLock::new(CoreState::default()),
            risk_limits: RwLock::new(config.risk_limits),
            risk_manager: Box::new(DefaultRiskManager),
            events: Arc::new(EventQueue::new()),
            callbacks,
            running: AtomicBool::new(false),
            trade_seq: AtomicU64::new(0),
        })
    }

    /// Idempotent: spawns the clock dispatcher and the event-dispatch
    /// thread.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        self.clock.start();
        self.events.start(self.callbacks.clone());
    }

    /// Idempotent: stops and joins both dispatchers.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.clock.stop();
        self.events.stop();
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn clock(&self) -> Arc<dyn EngineClock> {
        self.clock.clone()
    }

    pub fn registry(&self) -> Arc<OrderBookRegistry> {
        self.registry.clone()
    }

    pub(crate) fn event_queue(&self) -> Arc<EventQueue> {
        self.events.clone()
    }

    fn validate(&self, order: &Order) -> Result<(), String> {
        if order.client_order_id.is_empty() {
            return Err("client_order_id must not be empty".to_string());
        }
        if order.trading_pair.is_empty() {
            return Err("trading_pair must not be empty".to_string());
        }
        if order.quantity <= Decimal::ZERO {
            return Err("quantity must be > 0".to_string());
        }
        if order.order_type.requires_price() && order.price <= Decimal::ZERO {
            return Err(format!("price must be > 0 for order type {}", order.order_type));
        }
        if order.filled_quantity > order.quantity {
            return Err("filled_quantity exceeds quantity".to_string());
        }
        Ok(())
    }

    /// Pre-trade gating: order size, then hypothetical position size, then
    /// daily loss — each group skipped when its `enable_*` flag is off.
    fn check_risk_limits(&self, order: &Order) -> Result<(), apex_risk::RiskViolation> {
        let limits = *self.risk_limits.read();
        let (current_position_qty, daily_pnl) = {
            let state = self.state.read();
            let qty = state
                .positions
                .get(&order.trading_pair)
                .map(|p| p.quantity)
                .unwrap_or(Decimal::ZERO);
            (qty, state.daily_pnl)
        };
        self.risk_manager
            .check_order(&limits, order.side, order.quantity, current_position_qty, daily_pnl)
            .map(|_approved| ())
            .map_err(|refused| refused.reason)
    }

    /// Validates, risk-gates, transitions to `OPEN`, and stores `order`.
    /// Returns `false` with no state change on validation failure; on a
    /// risk failure, transitions `order` to `REJECTED`, enqueues
    /// `on_order_rejected`, and returns `false`.
    pub fn submit_order(&self, mut order: Order) -> bool {
        if let Err(reason) = self.validate(&order) {
            tracing::warn!(client_order_id = %order.client_order_id, %reason, "order validation failed");
            return false;
        }

        if self.state.read().active_orders.contains_key(&order.client_order_id) {
            tracing::warn!(client_order_id = %order.client_order_id, "duplicate client_order_id");
            return false;
        }

        if let Err(violation) = self.check_risk_limits(&order) {
            let now = self.clock.now();
            let _ = order.reject(violation.to_string(), now);
            self.events.enqueue(TradingEvent::OrderRejected(order));
            return false;
        }

        let now = self.clock.now();
        if order.accept(now).is_err() {
            return false;
        }
        self.state.write().active_orders.insert(order.client_order_id.clone(), order);
        true
    }

    /// Marks the order `CANCELLED`, enqueues `on_order_cancelled`, and
    /// removes it from the active map. `false` if `id` is not active.
    pub fn cancel_order(&self, id: &str) -> bool {
        let now = self.clock.now();
        let order = {
            let mut state = self.state.write();
            match state.active_orders.remove(id) {
                Some(mut order) => {
                    if order.cancel(now).is_err() {
                        state.active_orders.insert(order.client_order_id.clone(), order);
                        return false;
                    }
                    order
                }
                None => return false,
            }
        };
        self.events.enqueue(TradingEvent::OrderCancelled(order));
        true
    }

    /// Price-only modify: `new_quantity` is accepted in the signature but
    /// ignored, per the documented (unsupported) in-place quantity
    /// modification — callers must cancel-and-resubmit for that. `false`
    /// if `id` is not active.
    pub fn modify_order(&self, id: &str, new_price: Option<Decimal>, _new_quantity: Option<Decimal>) -> bool {
        let now = self.clock.now();
        let mut state = self.state.write();
        match state.active_orders.get_mut(id) {
            Some(order) => {
                if let Some(price) = new_price {
                    if !price.is_zero() {
                        order.price = price;
                        order.last_update_time = now;
                    }
                }
                true
            }
            None => false,
        }
    }

    pub fn get_active_orders(&self, symbol: Option<&str>) -> Vec<Order> {
        self.state
            .read()
            .active_orders
            .values()
            .filter(|o| symbol.map_or(true, |s| o.trading_pair == s))
            .cloned()
            .collect()
    }

    pub fn get_position(&self, symbol: &str) -> Position {
        self.state
            .read()
            .positions
            .get(symbol)
            .copied()
            .unwrap_or_else(|| Position::flat(symbol, self.clock.now()))
    }

    pub fn get_all_positions(&self) -> Vec<Position> {
        self.state.read().positions.values().copied().collect()
    }

    pub fn get_balance(&self, currency: &str) -> Balance {
        self.state
            .read()
            .balances
            .get(currency)
            .copied()
            .unwrap_or_else(|| Balance::zero(currency, self.clock.now()))
    }

    pub fn get_all_balances(&self) -> Vec<Balance> {
        self.state.read().balances.values().copied().collect()
    }

    /// `balances(base_ccy).total` plus each open position's quantity
    /// valued at its book's current mid price. No FX conversion is
    /// applied — a position only contributes when its order book's mid
    /// price is already denominated in `base_ccy`. Fees are ignored.
    pub fn get_portfolio_value(&self, base_ccy: &str) -> Decimal {
        let (mut value, open_positions) = {
            let state = self.state.read();
            let value = state.balances.get(base_ccy).map(|b| b.total).unwrap_or(Decimal::ZERO);
            let open_positions: Vec<(String, Decimal)> = state
                .positions
                .values()
                .filter(|p| !p.quantity.is_zero())
                .map(|p| (p.symbol.clone(), p.quantity))
                .collect();
            (value, open_positions)
        };
        for (symbol, quantity) in open_positions {
            if let Some(book) = self.registry.get(&symbol) {
                let mid = book.mid_price();
                if !mid.is_zero() {
                    value += quantity * mid;
                }
            }
        }
        value
    }

    pub fn get_realized_pnl(&self) -> Decimal {
        self.state.read().total_pnl
    }

    pub fn get_unrealized_pnl(&self) -> Decimal {
        self.state.read().positions.values().map(|p| p.unrealized_pnl).sum()
    }

    /// Marks the `symbol` position to `mark_price`, recomputing its
    /// `unrealized_pnl` against the current `average_price`. A no-op if no
    /// position exists for `symbol` yet — there is nothing to value.
    /// Called by `MarketDataRouter` as book-derived prices move, keeping
    /// `get_unrealized_pnl`/`get_statistics` live without a fill.
    pub fn mark_to_market(&self, symbol: &str, mark_price: Decimal) {
        if mark_price.is_zero() {
            return;
        }
        let now = self.clock.now();
        let mut state = self.state.write();
        if let Some(position) = state.positions.get_mut(symbol) {
            if !position.is_flat() {
                position.mark_to_market(mark_price, now);
            }
        }
    }

    /// No automatic midnight-boundary reset is implemented. This
    /// accumulator only resets via `reset()`; callers that want a daily
    /// boundary must call `reset()` (full reset) or track their own offset
    /// externally.
    pub fn get_daily_pnl(&self) -> Decimal {
        self.state.read().daily_pnl
    }

    pub fn get_trade_history(&self, symbol: Option<&str>, limit: Option<usize>) -> Vec<Trade> {
        let state = self.state.read();
        let mut trades: Vec<Trade> = state
            .trade_history
            .iter()
            .filter(|t| symbol.map_or(true, |s| t.symbol == s))
            .cloned()
            .collect();
        if let Some(limit) = limit {
            let len = trades.len();
            if limit < len {
                trades = trades.split_off(len - limit);
            }
        }
        trades
    }

    pub fn get_statistics(&self) -> Statistics {
        let state = self.state.read();
        Statistics {
            active_orders: state.active_orders.len(),
            open_positions: state.positions.values().filter(|p| !p.is_flat()).count(),
            trade_count: state.trade_history.len(),
            running: self.running.load(Ordering::SeqCst),
            realized_pnl: state.total_pnl,
            unrealized_pnl: state.positions.values().map(|p| p.unrealized_pnl).sum(),
            daily_pnl: state.daily_pnl,
            total_pnl: state.total_pnl,
        }
    }

    fn next_trade_id(&self) -> String {
        let seq = self.trade_seq.fetch_add(1, Ordering::SeqCst);
        format!("trade-{seq}")
    }

    /// Applies an externally reported fill: updates the originating active
    /// order's executions (removing it from the active map and enqueuing
    /// `on_order_filled` if it reached a terminal state), then mutates
    /// position, balances, and P&L, enqueuing `on_trade_executed`,
    /// `on_position_update`, and `on_balance_update` for each affected
    /// currency. A fill for an unknown `client_order_id` still mutates
    /// position/balance/P&L state (the fill happened on the exchange
    /// regardless of whether the local order ledger knows about it); only
    /// the order-ledger update and `on_order_filled` are skipped, and an
    /// `on_error` is emitted alongside the usual trade/position/balance
    /// events.
    pub fn on_exchange_fill(&self, report: FillReport) {
        let now = self.clock.now();
        let trade = Trade::new(
            self.next_trade_id(),
            report.client_order_id.clone(),
            report.exchange_order_id.clone(),
            report.exchange,
            report.symbol.clone(),
            report.side,
            report.price,
            report.quantity,
            report.fee_amount,
            report.fee_currency.clone(),
            now,
        );

        let filled_order = {
            let mut state = self.state.write();
            match state.active_orders.get_mut(&report.client_order_id) {
                Some(order) => {
                    let execution = Execution {
                        execution_id: format!("{}-{}", trade.trade_id, order.executions.len() + 1),
                        quantity: report.quantity,
                        price: report.price,
                        fee_amount: report.fee_amount,
                        fee_currency: report.fee_currency.clone(),
                        exchange: report.exchange,
                        timestamp: now,
                    };
                    if let Err(err) = order.add_execution(execution, now) {
                        tracing::warn!(client_order_id = %report.client_order_id, %err, "fill application error");
                    }
                    if order.status.is_terminal() {
                        state.active_orders.remove(&report.client_order_id)
                    } else {
                        None
                    }
                }
                None => {
                    drop(state);
                    self.events.enqueue(TradingEvent::Error {
                        source: "on_exchange_fill".to_string(),
                        message: format!("fill reported for unknown client_order_id {}", report.client_order_id),
                    });
                    None
                }
            }
        };

        if let Some(order) = filled_order {
            self.events.enqueue(TradingEvent::OrderFilled(order));
        }

        let (position, touched_balances) = self.apply_trade_to_books(&trade, now);

        self.state.write().trade_history.push(trade.clone());

        self.events.enqueue(TradingEvent::TradeExecuted(trade));
        self.events.enqueue(TradingEvent::PositionUpdate(position));
        for balance in touched_balances {
            self.events.enqueue(TradingEvent::BalanceUpdate(balance));
        }
    }

    /// Mutates the position, settles base/quote (and, if distinct, fee)
    /// balances, and folds the realized P&L delta into the running daily
    /// and total totals. Returns the post-trade position snapshot and the
    /// balances touched, for the caller to turn into events.
    fn apply_trade_to_books(&self, trade: &Trade, now: Timestamp) -> (Position, Vec<Balance>) {
        let mut state = self.state.write();
        let signed_qty = if trade.side.is_buy() { trade.quantity } else { -trade.quantity };

        let (position_snapshot, realized_delta) = {
            let position = state
                .positions
                .entry(trade.symbol.clone())
                .or_insert_with(|| Position::flat(trade.symbol.clone(), now));
            let realized_before = position.realized_pnl;
            position.apply_trade(signed_qty, trade.price, now);
            position.mark_to_market(trade.price, now);
            (*position, position.realized_pnl - realized_before)
        };
        state.daily_pnl += realized_delta;
        state.total_pnl += realized_delta;

        let (base_ccy, quote_ccy) = split_symbol(&trade.symbol);
        let notional = trade.price * trade.quantity;

        let base_delta = if trade.side.is_buy() { trade.quantity } else { -trade.quantity };
        settle_balance(&mut state.balances, &base_ccy, base_delta, now);

        let quote_delta = if trade.side.is_buy() { -notional } else { notional };
        settle_balance(&mut state.balances, &quote_ccy, quote_delta, now);

        if !trade.fee.is_zero() {
            settle_balance(&mut state.balances, &trade.fee_currency, -trade.fee, now);
        }

        let mut touched_currencies = vec![base_ccy, quote_ccy];
        if !trade.fee.is_zero() && !touched_currencies.contains(&trade.fee_currency) {
            touched_currencies.push(trade.fee_currency.clone());
        }
        let touched = touched_currencies
            .into_iter()
            .filter_map(|ccy| state.balances.get(&ccy).copied())
            .collect();

        (position_snapshot, touched)
    }

    /// Clears active orders, positions, balances, trade history, P&L
    /// totals, and every order book. Intended for BACKTEST harnesses
    /// between runs.
    pub fn reset(&self) {
        {
            let mut state = self.state.write();
            state.active_orders.clear();
            state.positions.clear();
            state.balances.clear();
            state.trade_history.clear();
            state.daily_pnl = Decimal::ZERO;
            state.total_pnl = Decimal::ZERO;
        }
        self.registry.clear_all();
    }

    /// JSON snapshot of positions, balances, and P&L totals. Active orders
    /// and order books are deliberately excluded, by design.
    pub fn export_state(&self) -> StateSnapshot {
        let state = self.state.read();
        StateSnapshot {
            positions: state
                .positions
                .values()
                .map(|p| PositionSnapshot {
                    symbol: p.symbol.clone(),
                    quantity: p.quantity,
                    average_price: p.average_price,
                    realized_pnl: p.realized_pnl,
                })
                .collect(),
            balances: state
                .balances
                .values()
                .map(|b| BalanceSnapshot {
                    currency: b.currency.clone(),
                    total: b.total,
                    available: b.available,
                })
                .collect(),
            total_pnl: state.total_pnl,
            daily_pnl: state.daily_pnl,
        }
    }

    /// Restores positions, balances, and P&L totals from a prior
    /// `export_state` snapshot.
    pub fn import_state(&self, snapshot: StateSnapshot) {
        let now = self.clock.now();
        let mut state = self.state.write();
        state.positions = snapshot
            .positions
            .into_iter()
            .map(|p| {
                (
                    p.symbol.clone(),
                    Position {
                        symbol: p.symbol,
                        quantity: p.quantity,
                        average_price: p.average_price,
                        unrealized_pnl: Decimal::ZERO,
                        realized_pnl: p.realized_pnl,
                        last_update: now,
                    },
                )
            })
            .collect();
        state.balances = snapshot
            .balances
            .into_iter()
            .map(|b| (b.currency.clone(), Balance::new(b.currency, b.total, b.available, now)))
            .collect();
        state.total_pnl = snapshot.total_pnl;
        state.daily_pnl = snapshot.daily_pnl;
    }
}

fn settle_balance(balances: &mut FnvHashMap<String, Balance>, currency: &str, delta: Decimal, now: Timestamp) {
    balances
        .entry(currency.to_string())
        .or_insert_with(|| Balance::zero(currency, now))
        .settle(delta, now);
}

fn split_symbol(symbol: &str) -> (String, String) {
    match TradingPair::parse(symbol) {
        Ok(pair) => (pair.base().to_string(), pair.quote().to_string()),
        Err(_) => (symbol.to_string(), DEFAULT_QUOTE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClockMode, TradingCoreConfigBuilder};
    use apex_markets::OrderType;
    use rust_decimal_macros::dec;

    fn core_with_limits(limits: RiskLimits) -> Arc<TradingCore> {
        TradingCore::initialize(
            TradingCoreConfigBuilder::new()
                .clock_mode(ClockMode::Backtest { origin: None })
                .risk_limits(limits)
                .build(),
        )
    }

    fn limit_order(core: &TradingCore, id: &str, side: Side, qty: Decimal, price: Decimal) -> Order {
        Order::new(id, "BTC-USDT", side, OrderType::Limit, price, qty, core.now()).unwrap()
    }

    #[test]
    fn submit_order_rejects_when_order_exceeds_max_order_size() {
        let core = core_with_limits(RiskLimits::new().with_max_order_size(dec!(1.0)));
        let order = limit_order(&core, "cid-1", Side::Buy, dec!(1.5), dec!(100));
        assert!(!core.submit_order(order));
        assert!(core.get_active_orders(None).is_empty());
    }

    #[test]
    fn submit_order_rejects_when_position_limit_would_be_breached() {
        let core = core_with_limits(RiskLimits::new().with_max_position_size(dec!(1)));
        core.on_exchange_fill(FillReport {
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
        let order = limit_order(&core, "cid-2", Side::Buy, dec!(1), dec!(100));
        assert!(!core.submit_order(order));
    }

    #[test]
    fn get_active_orders_excludes_terminal_states() {
        let core = core_with_limits(RiskLimits::default());
        let order = limit_order(&core, "cid-3", Side::Buy, dec!(1), dec!(100));
        assert!(core.submit_order(order));
        assert_eq!(core.get_active_orders(None).len(), 1);
        assert!(core.cancel_order("cid-3"));
        assert!(core.get_active_orders(None).is_empty());
    }

    #[test]
    fn buy_fill_opens_position_at_trade_price() {
        let core = core_with_limits(RiskLimits::default());
        let order = limit_order(&core, "cid-4", Side::Buy, dec!(1), dec!(50000));
        assert!(core.submit_order(order));
        core.on_exchange_fill(FillReport {
            client_order_id: "cid-4".into(),
            exchange_order_id: None,
            exchange: ExchangeId::Simulated,
            symbol: "BTC-USDT".into(),
            side: Side::Buy,
            price: dec!(50000),
            quantity: dec!(1),
            fee_amount: Decimal::ZERO,
            fee_currency: "USDT".into(),
            timestamp: 0,
        });
        let position = core.get_position("BTC-USDT");
        assert_eq!(position.quantity, dec!(1));
        assert_eq!(position.average_price, dec!(50000));
        assert!(core.get_active_orders(None).is_empty());
    }

    #[test]
    fn sell_fill_against_long_realizes_pnl() {
        let core = core_with_limits(RiskLimits::default());
        core.on_exchange_fill(FillReport {
            client_order_id: "buy-1".into(),
            exchange_order_id: None,
            exchange: ExchangeId::Simulated,
            symbol: "BTC-USDT".into(),
            side: Side::Buy,
            price: dec!(50000),
            quantity: dec!(1),
            fee_amount: Decimal::ZERO,
            fee_currency: "USDT".into(),
            timestamp: 0,
        });
        core.on_exchange_fill(FillReport {
            client_order_id: "sell-1".into(),
            exchange_order_id: None,
            exchange: ExchangeId::Simulated,
            symbol: "BTC-USDT".into(),
            side: Side::Sell,
            price: dec!(50100),
            quantity: dec!(0.4),
            fee_amount: Decimal::ZERO,
            fee_currency: "USDT".into(),
            timestamp: 0,
        });

        let position = core.get_position("BTC-USDT");
        assert_eq!(position.quantity, dec!(0.6));
        assert_eq!(position.average_price, dec!(50000));
        assert_eq!(core.get_realized_pnl(), dec!(40));
        assert_eq!(core.get_daily_pnl(), dec!(40));
    }

    #[test]
    fn fill_for_unknown_order_still_updates_position_and_reports_error() {
        let core = core_with_limits(RiskLimits::default());
        core.on_exchange_fill(FillReport {
            client_order_id: "no-such-order".into(),
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
        let position = core.get_position("BTC-USDT");
        assert_eq!(position.quantity, dec!(1));
        assert_eq!(position.average_price, dec!(100));
        assert!(core.get_active_orders(None).is_empty());
    }

    #[test]
    fn export_then_reset_then_import_restores_positions_and_pnl() {
        let core = core_with_limits(RiskLimits::default());
        core.on_exchange_fill(FillReport {
            client_order_id: "buy-1".into(),
            exchange_order_id: None,
            exchange: ExchangeId::Simulated,
            symbol: "BTC-USDT".into(),
            side: Side::Buy,
            price: dec!(50000),
            quantity: dec!(1),
            fee_amount: Decimal::ZERO,
            fee_currency: "USDT".into(),
            timestamp: 0,
        });

        let snapshot = core.export_state();
        core.reset();
        assert!(core.get_all_positions().is_empty());
        assert!(core.get_active_orders(None).is_empty());

        core.import_state(snapshot);
        let position = core.get_position("BTC-USDT");
        assert_eq!(position.quantity, dec!(1));
        assert_eq!(position.average_price, dec!(50000));
        assert!(core.get_active_orders(None).is_empty());
    }

    #[test]
    fn modify_order_changes_price_only() {
        let core = core_with_limits(RiskLimits::default());
        let order = limit_order(&core, "cid-5", Side::Buy, dec!(1), dec!(100));
        assert!(core.submit_order(order));
        assert!(core.modify_order("cid-5", Some(dec!(105)), Some(dec!(999))));
        let stored = core.get_active_orders(None).into_iter().next().unwrap();
        assert_eq!(stored.price, dec!(105));
        assert_eq!(stored.quantity, dec!(1));
    }

    #[test]
    fn cancel_unknown_order_returns_false() {
        let core = core_with_limits(RiskLimits::default());
        assert!(!core.cancel_order("does-not-exist"));
    }
}
