#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms)]

//! # Apex Book
//!
//! The limit order book engine: [`Decimal`]/[`Timestamp`] primitives shared
//! across the workspace, [`PriceLevel`], [`BookSide`], [`OrderBook`], and
//! [`OrderBookRegistry`].
//!
//! This crate is a *consumer* of exchange-published price levels, not a
//! matching engine — it maintains the shape of the book an external feed
//! describes; it never derives fills from crossing orders itself.

pub mod decimal;
pub mod registry;
pub mod side;
pub mod time;

mod book;
mod error;
mod level;

pub use book::{BookUpdateCallback, LevelUpdate, OrderBook, OrderBookSnapshot};
pub use decimal::Decimal;
pub use error::BookError;
pub use level::PriceLevel;
pub use registry::OrderBookRegistry;
pub use side::BookSide;
pub use time::Timestamp;
