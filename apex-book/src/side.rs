use crate::decimal::round_decimal18;
use crate::{Decimal, PriceLevel, Timestamp};
use apex_markets::Side as TradeSide;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// One side of one symbol's order book: an ordered set of [`PriceLevel`]s
/// under a single-writer/multi-reader discipline.
///
/// Levels are stored ascending by price in a `BTreeMap`; the side-specific
/// comparator (BUY descending, SELL ascending) is applied only at read time
/// by choosing forward or reverse iteration, so a single storage layout
/// serves both sides.
#[derive(Debug)]
pub struct BookSide {
    side: TradeSide,
    levels: Mutex<BTreeMap<Decimal, PriceLevel>>,
}

impl BookSide {
    pub fn new(side: TradeSide) -> Self {
        Self {
            side,
            levels: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn side(&self) -> TradeSide {
        self.side
    }

    /// Applies a venue-published level update.
    ///
    /// `amount == 0` removes the level at `price` (a no-op if absent).
    /// Otherwise the level is inserted or replaced with the given amount and
    /// `update_id`; `arrival` is re-stamped to `now` on every call, including
    /// a replace of an existing price.
    ///
    /// This replace-resets-arrival policy is intentional: this engine
    /// consumes exchange-published levels rather than anonymous individual
    /// orders, so there is no real "time priority" being lost by resetting
    /// arrival on a quantity refresh.
    pub fn update(&self, price: Decimal, amount: Decimal, update_id: i64, now: Timestamp) {
        let mut levels = self.levels.lock();
        if amount.is_zero() {
            levels.remove(&price);
        } else {
            levels.insert(price, PriceLevel::new(price, amount, update_id, now));
        }
    }

    /// The best (highest priority) level, per the side's comparator.
    pub fn best(&self) -> Option<PriceLevel> {
        let levels = self.levels.lock();
        match self.side {
            TradeSide::Buy => levels.iter().next_back().map(|(_, l)| *l),
            TradeSide::Sell => levels.iter().next().map(|(_, l)| *l),
        }
    }

    /// The first `limit` levels in comparator order. `limit == 0` returns
    /// every level.
    pub fn levels(&self, limit: usize) -> Vec<PriceLevel> {
        let levels = self.levels.lock();
        let iter: Box<dyn Iterator<Item = &PriceLevel>> = match self.side {
            TradeSide::Buy => Box::new(levels.values().rev()),
            TradeSide::Sell => Box::new(levels.values()),
        };
        if limit == 0 {
            iter.copied().collect()
        } else {
            iter.take(limit).copied().collect()
        }
    }

    /// Sum of amounts across levels whose price is `>= price` (BUY) or
    /// `<= price` (SELL). Exploits the sorted storage via a bounded range
    /// scan rather than a linear walk plus early-exit.
    pub fn volume_at_or_better(&self, price: Decimal) -> Decimal {
        let levels = self.levels.lock();
        let range: Box<dyn Iterator<Item = &PriceLevel>> = match self.side {
            TradeSide::Buy => Box::new(levels.range(price..).map(|(_, l)| l)),
            TradeSide::Sell => Box::new(levels.range(..=price).map(|(_, l)| l)),
        };
        range.fold(Decimal::ZERO, |acc, l| acc + l.amount)
    }

    /// Sum of `price * amount` across the first `limit` levels (`0` = all).
    /// Feeds the per-side notional in `OrderBook::to_json`.
    pub fn depth_notional(&self, limit: usize) -> Decimal {
        let sum = self
            .levels(limit)
            .iter()
            .fold(Decimal::ZERO, |acc, l| acc + l.price * l.amount);
        round_decimal18(sum)
    }

    pub fn clear(&self) {
        self.levels.lock().clear();
    }

    pub fn size(&self) -> usize {
        self.levels.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.lock().is_empty()
    }
}
