use apex_book::decimal::round_decimal18;
use apex_book::{Decimal, Timestamp};
use serde::{Deserialize, Serialize};

/// A signed net position in one symbol: positive `quantity` is long,
/// negative is short, zero is flat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub unrealized_pnl: Decimal,
    pub realized_pnl: Decimal,
    pub last_update: Timestamp,
}

impl Position {
    pub fn flat(symbol: impl Into<String>, now: Timestamp) -> Self {
        Self {
            symbol: symbol.into(),
            quantity: Decimal::ZERO,
            average_price: Decimal::ZERO,
            unrealized_pnl: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            last_update: now,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.quantity.is_zero()
    }

    pub fn is_long(&self) -> bool {
        self.quantity.is_sign_positive() && !self.quantity.is_zero()
    }

    pub fn is_short(&self) -> bool {
        self.quantity.is_sign_negative()
    }

    /// Applies one fill to this position.
    ///
    /// Buys (`trade_qty > 0`) that extend or open a position grow
    /// `average_price` as a size-weighted mean of the prior position and the
    /// new trade. A fill that reduces exposure toward flat realizes P&L on
    /// the closed portion; `average_price` is unchanged by a reduction. A
    /// fill that flips the position's sign closes the old side in full and
    /// opens the new side at the trade price.
    pub fn apply_trade(&mut self, trade_qty: Decimal, trade_price: Decimal, now: Timestamp) {
        if trade_qty.is_zero() {
            self.last_update = now;
            return;
        }

        let same_direction = self.quantity.is_zero()
            || (self.quantity.is_sign_positive() == trade_qty.is_sign_positive());

        if same_direction {
            let current_qty = self.quantity;
            let new_qty = current_qty + trade_qty;
            if !new_qty.is_zero() {
                self.average_price = round_decimal18(
                    (current_qty * self.average_price + trade_qty * trade_price).abs()
                        / new_qty.abs(),
                );
            }
            self.quantity = new_qty;
        } else {
            let closing_qty = trade_qty.abs().min(self.quantity.abs());
            let realized = if self.quantity.is_sign_positive() {
                (trade_price - self.average_price) * closing_qty
            } else {
                (self.average_price - trade_price) * closing_qty
            };
            self.realized_pnl += realized;

            let was_long = self.quantity.is_sign_positive();
            self.quantity -= if was_long { closing_qty } else { -closing_qty };

            let remaining_trade_qty = trade_qty.abs() - closing_qty;
            if !remaining_trade_qty.is_zero() {
                // The closing side fully unwound with trade quantity left over:
                // the position flips and reopens on the trade's side.
                self.quantity = if trade_qty.is_sign_positive() {
                    remaining_trade_qty
                } else {
                    -remaining_trade_qty
                };
                self.average_price = trade_price;
            }
        }
        self.last_update = now;
    }

    pub fn mark_to_market(&mut self, mark_price: Decimal, now: Timestamp) {
        self.unrealized_pnl = if self.quantity.is_zero() {
            Decimal::ZERO
        } else if self.quantity.is_sign_positive() {
            (mark_price - self.average_price) * self.quantity
        } else {
            (self.average_price - mark_price) * self.quantity.abs()
        };
        self.last_update = now;
    }

    pub fn total_pnl(&self) -> Decimal {
        self.realized_pnl + self.unrealized_pnl
    }
}
