use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pre-trade risk configuration. Every `enable_*` flag gates one group of
/// checks independently; a disabled group always passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLimits {
    pub max_position_size: Decimal,
    pub max_order_size: Decimal,
    pub max_daily_loss: Decimal,
    pub max_drawdown: Decimal,
    pub max_orders_per_second: u32,
    pub enable_position_limits: bool,
    pub enable_order_limits: bool,
    pub enable_loss_limits: bool,
}

impl Default for RiskLimits {
    /// Every check disabled, so a freshly constructed engine behaves as a
    /// pass-through until the operator opts into limits explicitly.
    fn default() -> Self {
        Self {
            max_position_size: Decimal::ZERO,
            max_order_size: Decimal::ZERO,
            max_daily_loss: Decimal::ZERO,
            max_drawdown: Decimal::ZERO,
            max_orders_per_second: 0,
            enable_position_limits: false,
            enable_order_limits: false,
            enable_loss_limits: false,
        }
    }
}

impl RiskLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_position_size(mut self, limit: Decimal) -> Self {
        self.max_position_size = limit;
        self.enable_position_limits = true;
        self
    }

    pub fn with_max_order_size(mut self, limit: Decimal) -> Self {
        self.max_order_size = limit;
        self.enable_order_limits = true;
        self
    }

    pub fn with_max_daily_loss(mut self, limit: Decimal) -> Self {
        self.max_daily_loss = limit;
        self.enable_loss_limits = true;
        self
    }

    pub fn with_max_drawdown(mut self, limit: Decimal) -> Self {
        self.max_drawdown = limit;
        self
    }

    pub fn with_max_orders_per_second(mut self, limit: u32) -> Self {
        self.max_orders_per_second = limit;
        self
    }
}
