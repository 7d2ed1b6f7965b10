//! Quote price and size calculation.
//!
//! Pure functions over `(MarketSnapshot, session progress, config)`.
//! The two sides share one parameterized body; the sign of the side is
//! the only difference, so the bid/ask symmetry holds by construction.

use rust_decimal::Decimal;

use skew_core::{MarketSnapshot, OrderSide, Price, Size};

use crate::config::MakerConfig;

/// A computed quote. No identity until submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub side: OrderSide,
    pub price: Price,
    pub size: Size,
}

/// Compute `e^x` for Decimal values via f64 conversion.
/// Used for the inventory-skew size decay where the precision loss is
/// acceptable.
fn decimal_exp(exponent: Decimal) -> Decimal {
    use rust_decimal::prelude::ToPrimitive;
    let e = exponent.to_f64().unwrap_or(0.0);
    Decimal::from_f64_retain(e.exp()).unwrap_or(Decimal::ZERO)
}

/// Half-spread as a fraction of mid, tightening as the session runs out.
///
/// `width = width_factor * (ask - bid)`, expressed as a fraction of the
/// best bid, then scaled down by elapsed session time toward the floor.
/// Near the deadline the quotes become pure market-following, which
/// drains inventory risk before the final flatten.
pub fn market_spread(snapshot: &MarketSnapshot, percent_completed: Decimal, config: &MakerConfig) -> Decimal {
    let bbo = &snapshot.bbo;
    let width = config.width_factor * (bbo.best_ask.inner() - bbo.best_bid.inner());
    let base_fraction = width / bbo.best_bid.inner();
    config.spread_floor + base_fraction * (Decimal::ONE - percent_completed)
}

/// Quote price for a side, truncated to the venue's decimal precision.
///
/// Truncation, not rounding: the quoted price never lands on the
/// aggressive side of the computed one.
pub fn quote_price(
    snapshot: &MarketSnapshot,
    spread: Decimal,
    side: OrderSide,
    config: &MakerConfig,
) -> Price {
    let sign = Decimal::from(side.sign());
    let raw = snapshot.mid_price().inner() * (Decimal::ONE - sign * spread);
    Price::new(raw).truncate(config.price_decimals)
}

/// Per-order size cap: a fraction of total portfolio value at session
/// start, in base units. Computed once; the cap does not follow the
/// portfolio as it changes.
pub fn max_order_size(snapshot: &MarketSnapshot, config: &MakerConfig) -> Size {
    let total = snapshot.portfolio.total_value(snapshot.mid_price());
    Size::new(config.capital_fraction * total / snapshot.bbo.best_bid.inner())
}

/// Inventory-skew-aware quote size for a side.
///
/// The rebalancing side quotes at the cap; the side that would push the
/// portfolio further from 50/50 decays exponentially in the skew.
pub fn quote_size(
    snapshot: &MarketSnapshot,
    side: OrderSide,
    max_order_size: Size,
    config: &MakerConfig,
) -> Size {
    let ratio = snapshot.portfolio.asset_ratio(snapshot.mid_price());
    let signed = Decimal::from(side.sign()) * ratio;
    if signed < Decimal::ZERO {
        max_order_size
    } else {
        Size::new(max_order_size.inner() * decimal_exp(-config.skew_decay * signed))
    }
}

/// Build a full quote for a side, or `None` when its notional would not
/// clear the venue minimum plus margin. Suppression is policy, not an
/// error: the side sits out the cycle.
pub fn build_quote(
    snapshot: &MarketSnapshot,
    percent_completed: Decimal,
    side: OrderSide,
    max_order_size: Size,
    min_order_size: Decimal,
    config: &MakerConfig,
) -> Option<Quote> {
    let spread = market_spread(snapshot, percent_completed, config);
    let price = quote_price(snapshot, spread, side, config);
    let size = quote_size(snapshot, side, max_order_size, config).truncate(config.price_decimals);

    let notional = size.notional(price);
    if notional > min_order_size {
        Some(Quote { side, price, size })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use skew_core::{Bbo, Portfolio};

    fn snapshot(bid: Decimal, ask: Decimal, base_free: Decimal, quote_free: Decimal) -> MarketSnapshot {
        MarketSnapshot {
            bbo: Bbo::new(Price::new(bid), Price::new(ask)),
            portfolio: Portfolio::new(base_free, quote_free),
            server_time: Utc::now(),
        }
    }

    fn config() -> MakerConfig {
        MakerConfig::default()
    }

    #[test]
    fn test_spread_scenario_at_session_start() {
        // width = 0.25 * 0.50 = 0.125; fraction = 0.125 / 100 = 0.00125
        let snap = snapshot(dec!(100.00), dec!(100.50), dec!(1), dec!(100));
        let spread = market_spread(&snap, dec!(0), &config());
        assert_eq!(spread, dec!(0.00225));
        assert_eq!(snap.mid_price().inner(), dec!(100.25));
    }

    #[test]
    fn test_prices_bracket_mid() {
        let snap = snapshot(dec!(100.00), dec!(100.50), dec!(1), dec!(100));
        let spread = market_spread(&snap, dec!(0), &config());
        let bid = quote_price(&snap, spread, OrderSide::Buy, &config());
        let ask = quote_price(&snap, spread, OrderSide::Sell, &config());

        let mid = snap.mid_price();
        assert!(bid < mid, "bid {bid} not below mid {mid}");
        assert!(ask > mid, "ask {ask} not above mid {mid}");

        // Truncated to 2 decimals, never upward.
        assert_eq!(bid.inner(), dec!(100.02));
        assert_eq!(ask.inner(), dec!(100.47));
    }

    #[test]
    fn test_spread_floor_holds_at_session_end() {
        let snap = snapshot(dec!(100.00), dec!(100.50), dec!(1), dec!(100));
        let spread = market_spread(&snap, dec!(1), &config());
        assert_eq!(spread, config().spread_floor);
    }

    #[test]
    fn test_spread_monotone_in_session_progress() {
        let snap = snapshot(dec!(100.00), dec!(101.00), dec!(1), dec!(100));
        let mut last = market_spread(&snap, dec!(0), &config());
        for pct in [dec!(0.25), dec!(0.5), dec!(0.75), dec!(1)] {
            let spread = market_spread(&snap, pct, &config());
            assert!(spread <= last, "spread widened at pct {pct}");
            assert!(spread >= config().spread_floor);
            last = spread;
        }
    }

    #[test]
    fn test_max_order_size_fraction_of_capital() {
        // total = 100 + 1 * 100.25 = 200.25; cap = 0.2 * 200.25 / 100
        let snap = snapshot(dec!(100.00), dec!(100.50), dec!(1), dec!(100));
        let cap = max_order_size(&snap, &config());
        assert_eq!(cap.inner(), dec!(0.40050));
    }

    #[test]
    fn test_sizes_capped_at_max() {
        let cap = Size::new(dec!(2));
        for (base, quote) in [(dec!(0.1), dec!(99)), (dec!(5), dec!(1)), (dec!(1), dec!(50))] {
            let snap = snapshot(dec!(50), dec!(50), base, quote);
            for side in [OrderSide::Buy, OrderSide::Sell] {
                let size = quote_size(&snap, side, cap, &config());
                assert!(size <= cap, "size {size} above cap for {side}");
                assert!(size.inner() >= Decimal::ZERO);
            }
        }
    }

    #[test]
    fn test_balanced_portfolio_quotes_cap_both_sides() {
        // base value 50, quote 50: asset ratio exactly zero
        let snap = snapshot(dec!(50), dec!(50), dec!(1), dec!(50));
        let cap = Size::new(dec!(2));
        assert_eq!(quote_size(&snap, OrderSide::Buy, cap, &config()), cap);
        assert_eq!(quote_size(&snap, OrderSide::Sell, cap, &config()), cap);
    }

    #[test]
    fn test_quote_heavy_portfolio_sizing() {
        // base value 40, quote 60: ratio = -0.1. Buy side rebalances,
        // so it quotes the cap; sell side decays by e^(-0.5).
        let snap = snapshot(dec!(50), dec!(50), dec!(0.8), dec!(60));
        let cap = Size::new(dec!(2));

        let bid_size = quote_size(&snap, OrderSide::Buy, cap, &config());
        assert_eq!(bid_size, cap);

        let ask_size = quote_size(&snap, OrderSide::Sell, cap, &config());
        let expected = cap.inner() * decimal_exp(dec!(-0.5));
        assert_eq!(ask_size.inner(), expected);
        // e^-0.5 is roughly 0.6065
        assert!(ask_size.inner() > dec!(1.212) && ask_size.inner() < dec!(1.214));
    }

    #[test]
    fn test_min_notional_requires_strict_excess() {
        // Degenerate book pins the bid at 99.90, so size 0.1 gives a
        // notional of exactly 9.99.
        let snap = snapshot(dec!(100), dec!(100), dec!(0), dec!(500));
        let config = config();
        let cap = Size::new(dec!(0.1));

        // notional == min exactly: suppressed (strict > required)
        assert!(build_quote(&snap, dec!(0), OrderSide::Buy, cap, dec!(9.99), &config).is_none());

        // notional just above min: quoted
        let quote = build_quote(&snap, dec!(0), OrderSide::Buy, cap, dec!(9.98), &config).unwrap();
        assert_eq!(quote.price.inner(), dec!(99.90));
        assert_eq!(quote.size.inner(), dec!(0.1));
    }

    #[test]
    fn test_build_quote_truncates_price_and_size() {
        let snap = snapshot(dec!(100.00), dec!(100.50), dec!(1), dec!(1000));
        let quote = build_quote(
            &snap,
            dec!(0),
            OrderSide::Buy,
            Size::new(dec!(1.23456)),
            dec!(10),
            &config(),
        )
        .unwrap();
        assert_eq!(quote.size.inner(), dec!(1.23));
        assert_eq!(quote.price.inner().scale(), 2);
    }

    #[test]
    fn test_decimal_exp_identity() {
        assert_eq!(decimal_exp(Decimal::ZERO), Decimal::ONE);
        assert!(decimal_exp(dec!(-1)) < Decimal::ONE);
    }
}
