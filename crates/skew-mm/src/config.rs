//! Market-making configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Strategy and lifecycle parameters.
///
/// The defaults are the quoting behavior; overriding them in config is
/// for experiments, not expected operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakerConfig {
    /// Spread floor the quotes decay toward as the session ends.
    #[serde(default = "default_spread_floor")]
    pub spread_floor: Decimal,

    /// Fraction of the market width contributing to the spread.
    #[serde(default = "default_width_factor")]
    pub width_factor: Decimal,

    /// Fraction of starting capital a single order may commit.
    /// The resulting cap is fixed at session start, never recomputed.
    #[serde(default = "default_capital_fraction")]
    pub capital_fraction: Decimal,

    /// Exponential decay rate applied to the side that would further
    /// unbalance the portfolio.
    #[serde(default = "default_skew_decay")]
    pub skew_decay: Decimal,

    /// Decimal digits quoted prices and sizes are truncated to.
    #[serde(default = "default_price_decimals")]
    pub price_decimals: u32,

    /// Safety margin added to the venue's minimum notional.
    #[serde(default = "default_notional_margin")]
    pub notional_margin: Decimal,

    /// Pause between reconciliation cycles, seconds.
    #[serde(default = "default_refresh_pause_secs")]
    pub refresh_pause_secs: u64,

    /// Window after which a resting order counts as stale, seconds.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,

    /// Iterations between order-history sweeps into the trade ledger.
    #[serde(default = "default_record_every")]
    pub record_every: u32,
}

fn default_spread_floor() -> Decimal {
    dec!(0.001)
}

fn default_width_factor() -> Decimal {
    dec!(0.25)
}

fn default_capital_fraction() -> Decimal {
    dec!(0.2)
}

fn default_skew_decay() -> Decimal {
    dec!(5)
}

fn default_price_decimals() -> u32 {
    2
}

fn default_notional_margin() -> Decimal {
    dec!(0.5)
}

fn default_refresh_pause_secs() -> u64 {
    5
}

fn default_stale_after_secs() -> u64 {
    15
}

fn default_record_every() -> u32 {
    200
}

impl Default for MakerConfig {
    fn default() -> Self {
        Self {
            spread_floor: default_spread_floor(),
            width_factor: default_width_factor(),
            capital_fraction: default_capital_fraction(),
            skew_decay: default_skew_decay(),
            price_decimals: default_price_decimals(),
            notional_margin: default_notional_margin(),
            refresh_pause_secs: default_refresh_pause_secs(),
            stale_after_secs: default_stale_after_secs(),
            record_every: default_record_every(),
        }
    }
}
