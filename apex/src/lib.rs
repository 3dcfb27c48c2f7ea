#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms)]

//! "apex" facade crate
//!
//! Provides a single entry point that re-exports the sub-crates of the
//! Apex engine. Useful for embedders who prefer to depend on just one
//! crate rather than naming `apex-book`, `apex-execution`, `apex-risk`,
//! and `apex-core` individually.
//!
//! # Example
//! ```
//! use apex::core::{ClockMode, TradingCore, TradingCoreConfigBuilder};
//! use apex::markets::Side;
//!
//! let core = TradingCore::initialize(
//!     TradingCoreConfigBuilder::new().clock_mode(ClockMode::Backtest { origin: None }).build(),
//! );
//! let _ = core.get_position("BTC-USDT");
//! let _buy = Side::Buy;
//! ```

// Re-export of internal crates with organized namespaces
pub use apex_book as book;
pub use apex_core as core;
pub use apex_execution as execution;
pub use apex_markets as markets;
pub use apex_risk as risk;

// Flat re-exports of very frequently used symbols
pub use apex_core::{MarketDataRouter, TradingCore};
pub use apex_markets::{ExchangeId, Side};

/// Single-import convenience surface for embedding applications.
pub mod prelude {
    pub use crate::book::{Decimal, OrderBook, OrderBookRegistry, Timestamp};
    pub use crate::core::{
        ClockMode, MarketDataRouter, MarketTick, NoopCallbacks, TradeTick, TradingCallbacks, TradingCore,
        TradingCoreConfig, TradingCoreConfigBuilder,
    };
    pub use crate::execution::{Balance, Execution, Order, Position, Trade};
    pub use crate::markets::{ExchangeId, OrderStatus, OrderType, Side, TradingPair};
    pub use crate::risk::{DefaultRiskManager, NoRiskManager, RiskLimits, RiskManager};
}
