//! Trading pair and venue symbol metadata.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A base/quote currency pair, e.g. COMP/USDT.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub base: String,
    pub quote: String,
}

impl Pair {
    /// Create a pair; currency codes are normalized to upper case.
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into().to_uppercase(),
            quote: quote.into().to_uppercase(),
        }
    }

    /// Venue symbol: concatenated base and quote, e.g. "COMPUSDT".
    pub fn symbol(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Venue metadata for a symbol, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Venue-defined minimum order notional, in quote currency.
    pub min_notional: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pair_symbol() {
        let pair = Pair::new("comp", "usdt");
        assert_eq!(pair.symbol(), "COMPUSDT");
        assert_eq!(pair.to_string(), "COMP/USDT");
    }

    #[test]
    fn test_symbol_info_roundtrip() {
        let info = SymbolInfo {
            min_notional: dec!(10),
        };
        let json = serde_json::to_string(&info).unwrap();
        let back: SymbolInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }
}
