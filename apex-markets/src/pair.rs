use serde::{Deserialize, Serialize};
use std::fmt;

/// The default quote currency assumed when a trading-pair string carries no
/// `-` separator.
pub const DEFAULT_QUOTE: &str = "USDT";

/// A parsed `<BASE>-<QUOTE>` trading pair.
///
/// Grammar: BASE and QUOTE are non-empty uppercase alphanumeric strings.
/// Absence of `-` means `base = pair`, `quote = "USDT"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    raw: String,
    base: String,
    quote: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TradingPairError {
    #[error("trading pair string is empty")]
    Empty,
    #[error("trading pair {0:?} has an empty base or quote segment")]
    EmptySegment(String),
    #[error("trading pair {0:?} contains non-alphanumeric characters")]
    NotAlphanumeric(String),
}

impl TradingPair {
    pub fn parse(pair: &str) -> Result<Self, TradingPairError> {
        if pair.is_empty() {
            return Err(TradingPairError::Empty);
        }

        let (base, quote) = match pair.split_once('-') {
            Some((base, quote)) => (base, quote),
            None => (pair, DEFAULT_QUOTE),
        };

        if base.is_empty() || quote.is_empty() {
            return Err(TradingPairError::EmptySegment(pair.to_string()));
        }
        if !base.chars().all(|c| c.is_ascii_alphanumeric())
            || !quote.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(TradingPairError::NotAlphanumeric(pair.to_string()));
        }

        Ok(Self {
            raw: pair.to_string(),
            base: base.to_ascii_uppercase(),
            quote: quote.to_ascii_uppercase(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashed_pair_splits_base_and_quote() {
        let p = TradingPair::parse("BTC-USDT").unwrap();
        assert_eq!(p.base(), "BTC");
        assert_eq!(p.quote(), "USDT");
    }

    #[test]
    fn bare_symbol_defaults_quote_to_usdt() {
        let p = TradingPair::parse("BTC").unwrap();
        assert_eq!(p.base(), "BTC");
        assert_eq!(p.quote(), "USDT");
    }

    #[test]
    fn lowercase_is_normalized() {
        let p = TradingPair::parse("btc-eth").unwrap();
        assert_eq!(p.base(), "BTC");
        assert_eq!(p.quote(), "ETH");
    }

    #[test]
    fn empty_string_is_rejected() {
        assert!(matches!(TradingPair::parse(""), Err(TradingPairError::Empty)));
    }

    #[test]
    fn dangling_dash_is_rejected() {
        assert!(matches!(
            TradingPair::parse("BTC-"),
            Err(TradingPairError::EmptySegment(_))
        ));
        assert!(matches!(
            TradingPair::parse("-USDT"),
            Err(TradingPairError::EmptySegment(_))
        ));
    }

    #[test]
    fn non_alphanumeric_is_rejected() {
        assert!(matches!(
            TradingPair::parse("BTC/USDT"),
            Err(TradingPairError::NotAlphanumeric(_))
        ));
    }

    #[test]
    fn round_trips_through_json() {
        let pair = TradingPair::parse("BTC-USDT").unwrap();
        let json = serde_json::to_string(&pair).unwrap();
        let restored: TradingPair = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, pair);
    }
}
