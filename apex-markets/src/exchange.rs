use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifies the venue a piece of market data, order, or fill originated
/// from or is destined for.
///
/// The surface of supported venues is small and closed, so this is modelled
/// as a tagged variant rather than a trait object, with the common
/// [`ExchangeAdapter`] capability carrying whatever behaviour a concrete
/// venue connector needs.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub enum ExchangeId {
    Binance,
    Bybit,
    Okx,
    Coinbase,
    Kraken,
    /// A fully deterministic venue used by backtests and unit tests.
    Simulated,
    /// A venue double that echoes submitted orders back as fills, for paper
    /// trading without a real connection.
    Mock,
}

impl ExchangeId {
    pub fn is_crypto(&self) -> bool {
        !matches!(self, ExchangeId::Simulated | ExchangeId::Mock)
    }
}

impl Display for ExchangeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExchangeId::Binance => "binance",
            ExchangeId::Bybit => "bybit",
            ExchangeId::Okx => "okx",
            ExchangeId::Coinbase => "coinbase",
            ExchangeId::Kraken => "kraken",
            ExchangeId::Simulated => "simulated",
            ExchangeId::Mock => "mock",
        };
        write!(f, "{s}")
    }
}

/// The capability every venue adapter (implemented outside this crate) is
/// expected to provide. The core engine depends only on this trait, never on
/// a concrete venue's wire format.
pub trait ExchangeAdapter {
    const EXCHANGE: ExchangeId;

    fn connect(&mut self) -> Result<(), AdapterError>;
    fn disconnect(&mut self) -> Result<(), AdapterError>;
    fn is_connected(&self) -> bool;
    fn subscribe(&mut self, symbol: &str) -> Result<(), AdapterError>;
    fn unsubscribe(&mut self, symbol: &str) -> Result<(), AdapterError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AdapterError {
    #[error("adapter for {0} is not connected")]
    NotConnected(ExchangeId),
    #[error("transport error: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_and_mock_are_not_crypto() {
        assert!(!ExchangeId::Simulated.is_crypto());
        assert!(!ExchangeId::Mock.is_crypto());
        assert!(ExchangeId::Binance.is_crypto());
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(ExchangeId::Okx.to_string(), "okx");
    }
}
