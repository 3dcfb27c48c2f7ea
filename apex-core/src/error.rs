//! Central error type for `apex-core`.
//!
//! Lock order across the crate is fixed to avoid inversion:
//! `OrderBookRegistry` < `TradingCore` state < event queue. A thread never
//! holds two of these simultaneously except in that order — in particular,
//! the event queue is always enqueued to *after* releasing any state lock,
//! never while holding it.
//!
//! Public mutating operations on [`crate::trading_core::TradingCore`] report
//! failure as a `bool` (cancelling an unknown id, for instance, just returns
//! `false`); [`CoreError`] exists for internal logging and for the few call
//! sites that want a reason rather than a flat boolean.
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("no active order with client_order_id {0:?}")]
    UnknownOrder(String),

    #[error(transparent)]
    Order(#[from] apex_execution::OrderError),

    #[error("risk check failed: {0}")]
    Risk(#[from] apex_risk::RiskViolation),
}
