//! Core domain types for the skew market-making bot.
//!
//! This crate provides the fundamental types used throughout the system:
//! - `Price`, `Size`: precision-safe numeric types
//! - `Pair`, `SymbolInfo`: trading pair and venue metadata
//! - `Session`: the immutable trading-session clock
//! - `Bbo`, `Portfolio`, `MarketSnapshot`: per-cycle market state
//! - `RestingOrder`, `VenueOrder`, `FilledOrder`: order records

pub mod decimal;
pub mod error;
pub mod market;
pub mod order;
pub mod session;
pub mod types;

pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use market::{Pair, SymbolInfo};
pub use order::{ClientOrderId, FilledOrder, OrderSide, OrderStatus, RestingOrder, VenueOrder};
pub use session::Session;
pub use types::{Bbo, MarketSnapshot, Portfolio};
