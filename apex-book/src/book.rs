use crate::decimal::round_decimal18;
use crate::{BookSide, Decimal, PriceLevel, Timestamp};
use apex_markets::Side;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// A registered listener. Invoked synchronously under the listener-list
/// lock — callbacks MUST be short, non-blocking, and must not reenter the
/// same book.
pub type BookUpdateCallback = Arc<dyn Fn(&OrderBook) + Send + Sync>;

/// The bid/ask pair for one symbol.
///
/// `OrderBook` is a *consumer* of venue-published levels, never a matching
/// engine: `apply_updates`/`update_bid`/`update_ask` replace or remove
/// levels verbatim, they never cross bids against asks.
pub struct OrderBook {
    symbol: String,
    bids: BookSide,
    asks: BookSide,
    last_update_id: Mutex<i64>,
    last_update_time: Mutex<Timestamp>,
    listeners: Mutex<Vec<BookUpdateCallback>>,
}

impl std::fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("symbol", &self.symbol)
            .field("last_update_id", &*self.last_update_id.lock())
            .finish_non_exhaustive()
    }
}

/// One venue-published level update, as consumed by [`OrderBook::apply_updates`].
#[derive(Debug, Clone, Copy)]
pub struct LevelUpdate {
    pub price: Decimal,
    pub amount: Decimal,
}

impl OrderBook {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            last_update_id: Mutex::new(0),
            last_update_time: Mutex::new(Timestamp::EPOCH),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bids(&self) -> &BookSide {
        &self.bids
    }

    pub fn asks(&self) -> &BookSide {
        &self.asks
    }

    pub fn last_update_id(&self) -> i64 {
        *self.last_update_id.lock()
    }

    pub fn last_update_time(&self) -> Timestamp {
        *self.last_update_time.lock()
    }

    pub fn update_bid(&self, price: Decimal, amount: Decimal, id: i64, now: Timestamp) {
        self.bids.update(price, amount, id, now);
        self.finish_update(id, now);
    }

    pub fn update_ask(&self, price: Decimal, amount: Decimal, id: i64, now: Timestamp) {
        self.asks.update(price, amount, id, now);
        self.finish_update(id, now);
    }

    /// Applies every bid update then every ask update, then a single
    /// notification with one timestamp and `final_id` — atomic from a
    /// listener's perspective.
    pub fn apply_updates(
        &self,
        bids_batch: &[LevelUpdate],
        asks_batch: &[LevelUpdate],
        final_id: i64,
        now: Timestamp,
    ) {
        for u in bids_batch {
            self.bids.update(u.price, u.amount, final_id, now);
        }
        for u in asks_batch {
            self.asks.update(u.price, u.amount, final_id, now);
        }
        self.finish_update(final_id, now);
    }

    fn finish_update(&self, id: i64, now: Timestamp) {
        *self.last_update_id.lock() = id;
        *self.last_update_time.lock() = now;
        if !self.is_valid() {
            tracing::error!(
                symbol = %self.symbol,
                update_id = id,
                best_bid = %self.best_bid(),
                best_ask = %self.best_ask(),
                "book crossed after update; no automatic recovery"
            );
        }
        self.notify_listeners();
    }

    fn notify_listeners(&self) {
        let listeners = self.listeners.lock();
        for cb in listeners.iter() {
            cb(self);
        }
    }

    /// Zero when the side is empty — this collides with legitimate zero
    /// prices; callers must also consult `bids().is_empty()`/`asks().is_empty()`.
    pub fn best_bid(&self) -> Decimal {
        self.bids.best().map(|l| l.price).unwrap_or(Decimal::ZERO)
    }

    pub fn best_ask(&self) -> Decimal {
        self.asks.best().map(|l| l.price).unwrap_or(Decimal::ZERO)
    }

    pub fn mid_price(&self) -> Decimal {
        match (self.bids.best(), self.asks.best()) {
            (Some(b), Some(a)) => round_decimal18((b.price + a.price) / Decimal::from(2)),
            _ => Decimal::ZERO,
        }
    }

    pub fn spread(&self) -> Decimal {
        match (self.bids.best(), self.asks.best()) {
            (Some(b), Some(a)) => a.price - b.price,
            _ => Decimal::ZERO,
        }
    }

    /// Volume-weighted average fill price a market order of `qty` would
    /// achieve walking the opposite side. Zero if liquidity is insufficient
    /// to fill `qty` entirely — reported as zero, not a panic; the caller is
    /// responsible for checking available depth first if the distinction
    /// matters.
    pub fn impact_price(&self, is_buy: bool, qty: Decimal) -> Decimal {
        if qty.is_sign_negative() || qty.is_zero() {
            return Decimal::ZERO;
        }
        let side = if is_buy { &self.asks } else { &self.bids };
        let levels = side.levels(0);

        let mut remaining = qty;
        let mut notional = Decimal::ZERO;
        for level in &levels {
            if remaining.is_zero() {
                break;
            }
            let take = remaining.min(level.amount);
            notional += take * level.price;
            remaining -= take;
        }

        if remaining.is_sign_positive() && !remaining.is_zero() {
            return Decimal::ZERO;
        }
        round_decimal18(notional / qty)
    }

    /// Sum of amounts on the opposite side that would be touched by a sweep
    /// to `price`.
    pub fn volume_at_price(&self, is_buy: bool, price: Decimal) -> Decimal {
        let side = if is_buy { &self.asks } else { &self.bids };
        side.volume_at_or_better(price)
    }

    pub fn register_update_callback(&self, cb: BookUpdateCallback) {
        self.listeners.lock().push(cb);
    }

    /// `false` only when both sides are non-empty and crossed
    /// (`best_bid >= best_ask`).
    pub fn is_valid(&self) -> bool {
        match (self.bids.best(), self.asks.best()) {
            (Some(b), Some(a)) => b.price < a.price,
            _ => true,
        }
    }

    pub fn to_json(&self, depth: usize) -> OrderBookSnapshot {
        OrderBookSnapshot {
            symbol: self.symbol.clone(),
            timestamp: self.last_update_time().as_millis(),
            last_update_id: self.last_update_id(),
            bids: levels_as_pairs(&self.bids, depth),
            asks: levels_as_pairs(&self.asks, depth),
            bid_notional: crate::decimal::render(self.bids.depth_notional(depth)),
            ask_notional: crate::decimal::render(self.asks.depth_notional(depth)),
        }
    }
}

fn levels_as_pairs(side: &BookSide, depth: usize) -> Vec<(String, String)> {
    side.levels(depth)
        .into_iter()
        .map(|l| (crate::decimal::render(l.price), crate::decimal::render(l.amount)))
        .collect()
}

/// Canonical `to_json` snapshot shape. `bid_notional`/`ask_notional` are the
/// depth-weighted notional (`price * amount` summed over the returned
/// levels) on each side, at the same `depth` the level lists were cut to.
#[derive(Debug, Clone, Serialize)]
pub struct OrderBookSnapshot {
    pub symbol: String,
    pub timestamp: i64,
    #[serde(rename = "lastUpdateId")]
    pub last_update_id: i64,
    pub bids: Vec<(String, String)>,
    pub asks: Vec<(String, String)>,
    pub bid_notional: String,
    pub ask_notional: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn t(n: i64) -> Timestamp {
        Timestamp::from_nanos(n)
    }

    fn build_book() -> OrderBook {
        let book = OrderBook::new("BTC-USDT");
        book.apply_updates(
            &[
                LevelUpdate { price: dec!(49900), amount: dec!(1.5) },
                LevelUpdate { price: dec!(49850), amount: dec!(2.3) },
            ],
            &[
                LevelUpdate { price: dec!(50000), amount: dec!(1.2) },
                LevelUpdate { price: dec!(50050), amount: dec!(0.8) },
            ],
            10,
            t(1),
        );
        book
    }

    #[test]
    fn scenario_book_build() {
        let book = build_book();
        assert_eq!(book.best_bid(), dec!(49900));
        assert_eq!(book.best_ask(), dec!(50000));
        assert_eq!(book.mid_price(), dec!(49950));
        assert_eq!(book.spread(), dec!(100));
        assert_eq!(book.last_update_id(), 10);
        assert!(book.is_valid());
    }

    #[test]
    fn scenario_impact_price() {
        let book = build_book();
        assert_eq!(book.impact_price(true, dec!(1.5)), dec!(50010));
        assert_eq!(book.impact_price(true, dec!(3.0)), Decimal::ZERO);
    }

    #[test]
    fn scenario_zero_amount_delete() {
        let book = build_book();
        book.update_bid(dec!(49900), dec!(0), 11, t(2));
        assert_eq!(book.best_bid(), dec!(49850));
        assert_eq!(book.spread(), dec!(150));
    }

    #[test]
    fn crossed_book_is_invalid() {
        let book = OrderBook::new("X-Y");
        book.update_bid(dec!(100), dec!(1), 1, t(1));
        book.update_ask(dec!(99), dec!(1), 2, t(2));
        assert!(!book.is_valid());
    }

    #[test]
    fn empty_sides_report_zero_sentinels() {
        let book = OrderBook::new("X-Y");
        assert_eq!(book.best_bid(), Decimal::ZERO);
        assert_eq!(book.best_ask(), Decimal::ZERO);
        assert_eq!(book.mid_price(), Decimal::ZERO);
        assert_eq!(book.spread(), Decimal::ZERO);
        assert!(book.is_valid());
    }

    #[test]
    fn listener_fires_once_per_successful_mutator() {
        let book = OrderBook::new("X-Y");
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        book.register_update_callback(Arc::new(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        book.update_bid(dec!(100), dec!(1), 1, t(1));
        book.update_ask(dec!(101), dec!(1), 2, t(2));
        book.apply_updates(&[], &[], 3, t(3));

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn to_json_matches_canonical_shape() {
        let book = build_book();
        let snap = book.to_json(0);
        assert_eq!(snap.symbol, "BTC-USDT");
        assert_eq!(snap.last_update_id, 10);
        assert_eq!(snap.bids[0], ("49900".to_string(), "1.5".to_string()));
        assert_eq!(snap.asks[0], ("50000".to_string(), "1.2".to_string()));
        // 49900*1.5 + 49850*2.3 = 74850 + 114655 = 189505
        assert_eq!(snap.bid_notional, "189505");
        // 50000*1.2 + 50050*0.8 = 60000 + 40040 = 100040
        assert_eq!(snap.ask_notional, "100040");
    }
}
