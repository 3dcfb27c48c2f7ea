#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms)]

//! # Apex Core
//!
//! The orchestrator: [`clock`]'s three-mode [`clock::EngineClock`], the
//! [`TradingCore`] state machine that gates, fills, and accounts for
//! orders, and the [`MarketDataRouter`] that feeds external ticks into it.
//!
//! Lock order, enforced throughout this crate: `OrderBookRegistry` (in
//! `apex_book`) < `TradingCore`'s internal state lock < the event queue's
//! lock. Never acquire two of these out of order; see [`error`] for the
//! full rationale.

pub mod clock;
pub mod logging;
pub mod scheduler;

mod callbacks;
mod config;
mod error;
mod event;
mod router;
mod trading_core;

pub use callbacks::{NoopCallbacks, TradingCallbacks};
pub use config::{ClockMode, TradingCoreConfig, TradingCoreConfigBuilder};
pub use error::CoreError;
pub use event::{EventQueue, TradingEvent};
pub use router::{MarketDataRouter, MarketTick, TradeTick};
pub use trading_core::{BalanceSnapshot, FillReport, PositionSnapshot, StateSnapshot, Statistics, TradingCore};
