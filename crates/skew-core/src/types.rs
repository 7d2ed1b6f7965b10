//! Per-cycle market state: best bid/offer, portfolio balances, and the
//! combined snapshot handed to the strategy engine.

use crate::decimal::Price;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Best bid and offer at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bbo {
    pub best_bid: Price,
    pub best_ask: Price,
}

impl Bbo {
    pub fn new(best_bid: Price, best_ask: Price) -> Self {
        Self { best_bid, best_ask }
    }

    /// Mid price: (bid + ask) / 2.
    pub fn mid_price(&self) -> Price {
        Price::new((self.best_bid.inner() + self.best_ask.inner()) / Decimal::TWO)
    }

    /// A snapshot is usable only when both sides are positive and the
    /// book is not crossed. A crossed book is treated as stale data:
    /// skip the cycle and retry.
    pub fn is_valid(&self) -> bool {
        self.best_bid.is_positive()
            && self.best_ask.is_positive()
            && self.best_bid <= self.best_ask
    }
}

/// Free balances of the two session assets, in native units.
///
/// Balances are mutated externally by fills; the core only observes
/// them through per-cycle snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Free base-currency amount.
    pub base_free: Decimal,
    /// Free quote-currency amount.
    pub quote_free: Decimal,
}

impl Portfolio {
    pub fn new(base_free: Decimal, quote_free: Decimal) -> Self {
        Self {
            base_free,
            quote_free,
        }
    }

    /// Total portfolio value in quote currency at the given price.
    pub fn total_value(&self, price: Price) -> Decimal {
        self.quote_free + self.base_free * price.inner()
    }

    /// Signed inventory skew: base share of total value minus 0.5.
    ///
    /// Zero at a perfect 50/50 split, positive when base-heavy,
    /// negative when quote-heavy. Range roughly [-0.5, 0.5].
    pub fn asset_ratio(&self, price: Price) -> Decimal {
        let total = self.total_value(price);
        if total.is_zero() {
            return Decimal::ZERO;
        }
        (self.base_free * price.inner()) / total - dec!(0.5)
    }
}

/// Combined market state captured atomically per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketSnapshot {
    pub bbo: Bbo,
    pub portfolio: Portfolio,
    /// Venue server time at capture; staleness checks diff against
    /// this, not the local clock.
    pub server_time: DateTime<Utc>,
}

impl MarketSnapshot {
    pub fn mid_price(&self) -> Price {
        self.bbo.mid_price()
    }

    pub fn is_valid(&self) -> bool {
        self.bbo.is_valid()
    }
}
