use crate::{CheckHigherThan, CheckLowerThan, RiskApproved, RiskCheck, RiskLimits, RiskRefused};
use apex_markets::Side;
use rust_decimal::Decimal;

/// The result of gating one candidate order: either an [`RiskApproved`]
/// pass-through, or a [`RiskRefused`] carrying the [`RiskViolation`] reason.
pub type RiskDecision = Result<RiskApproved<()>, RiskRefused<(), RiskViolation>>;

/// Gates one candidate order against a set of [`RiskLimits`].
///
/// Implementors receive only the primitives a check needs (side, order
/// quantity, the position's current signed quantity, and today's running
/// P&L) rather than a full order/position type, so this crate stays free of
/// a dependency on `apex-execution`.
pub trait RiskManager {
    fn check_order(
        &self,
        limits: &RiskLimits,
        side: Side,
        order_quantity: Decimal,
        current_position_qty: Decimal,
        daily_pnl: Decimal,
    ) -> RiskDecision;
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RiskViolation {
    #[error("order quantity {0} exceeds max_order_size {1}")]
    OrderSizeExceeded(Decimal, Decimal),
    #[error("hypothetical position {0} exceeds max_position_size {1}")]
    PositionSizeExceeded(Decimal, Decimal),
    #[error("daily_pnl {0} breaches max_daily_loss {1}")]
    DailyLossExceeded(Decimal, Decimal),
}

/// The standard gating sequence: order size, then position size, then daily
/// loss. Each group is skipped when its `enable_*` flag is off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRiskManager;

impl RiskManager for DefaultRiskManager {
    fn check_order(
        &self,
        limits: &RiskLimits,
        side: Side,
        order_quantity: Decimal,
        current_position_qty: Decimal,
        daily_pnl: Decimal,
    ) -> RiskDecision {
        if limits.enable_order_limits {
            let check = CheckHigherThan::new(limits.max_order_size);
            if check.check(&order_quantity).is_err() {
                return Err(RiskRefused::new(
                    (),
                    RiskViolation::OrderSizeExceeded(order_quantity, limits.max_order_size),
                ));
            }
        }

        if limits.enable_position_limits {
            let signed_delta = if side.is_buy() { order_quantity } else { -order_quantity };
            let hypothetical = (current_position_qty + signed_delta).abs();
            let check = CheckHigherThan::new(limits.max_position_size);
            if check.check(&hypothetical).is_err() {
                return Err(RiskRefused::new(
                    (),
                    RiskViolation::PositionSizeExceeded(hypothetical, limits.max_position_size),
                ));
            }
        }

        if limits.enable_loss_limits {
            let check = CheckLowerThan::new(-limits.max_daily_loss);
            if check.check(&daily_pnl).is_err() {
                return Err(RiskRefused::new(
                    (),
                    RiskViolation::DailyLossExceeded(daily_pnl, limits.max_daily_loss),
                ));
            }
        }

        Ok(RiskApproved(()))
    }
}

/// Pass-through manager that approves every order unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRiskManager;

impl RiskManager for NoRiskManager {
    fn check_order(
        &self,
        _limits: &RiskLimits,
        _side: Side,
        _order_quantity: Decimal,
        _current_position_qty: Decimal,
        _daily_pnl: Decimal,
    ) -> RiskDecision {
        Ok(RiskApproved(()))
    }
}
