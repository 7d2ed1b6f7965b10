//! The exchange gateway trait.
//!
//! Dyn-compatible async trait via boxed futures, so the session loop and
//! order manager can hold an `Arc<dyn ExchangeGateway>` and tests can
//! substitute the mock.

use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use skew_core::{Bbo, ClientOrderId, OrderSide, Pair, Price, Size, SymbolInfo, VenueOrder};

use crate::error::GatewayResult;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Blocking request/response access to the venue.
///
/// All calls are atomic from the core's perspective; the implementation
/// may retry transparently but must ultimately succeed or report an
/// error. Order-state transitions stay re-derivable from `open_orders`
/// and `all_orders`, so a crash-and-restart can resynchronize from the
/// venue alone.
pub trait ExchangeGateway: Send + Sync {
    /// Venue metadata for the pair's symbol (minimum notional and friends).
    fn symbol_info<'a>(&'a self, pair: &'a Pair) -> BoxFuture<'a, GatewayResult<SymbolInfo>>;

    /// Best bid and ask, best-first.
    fn order_book_top<'a>(&'a self, pair: &'a Pair) -> BoxFuture<'a, GatewayResult<Bbo>>;

    /// Free balance of a single asset.
    fn asset_balance<'a>(&'a self, asset: &'a str) -> BoxFuture<'a, GatewayResult<Decimal>>;

    /// All currently open orders for the pair.
    fn open_orders<'a>(&'a self, pair: &'a Pair) -> BoxFuture<'a, GatewayResult<Vec<VenueOrder>>>;

    /// Full order history for the pair. Filled orders drop out of the
    /// open-orders view, so executions are recovered from here.
    fn all_orders<'a>(&'a self, pair: &'a Pair) -> BoxFuture<'a, GatewayResult<Vec<VenueOrder>>>;

    /// Submit a post-only limit order.
    fn create_order<'a>(
        &'a self,
        pair: &'a Pair,
        side: OrderSide,
        qty: Size,
        price: Price,
        client_id: ClientOrderId,
    ) -> BoxFuture<'a, GatewayResult<VenueOrder>>;

    /// Cancel a single resting order by venue id.
    fn cancel_order<'a>(&'a self, pair: &'a Pair, order_id: u64) -> BoxFuture<'a, GatewayResult<()>>;

    /// Venue server time. Staleness decisions diff order transact times
    /// against this clock, never the local one.
    fn server_time(&self) -> BoxFuture<'_, GatewayResult<DateTime<Utc>>>;
}

/// Arc wrapper for gateway trait objects.
pub type DynGateway = Arc<dyn ExchangeGateway>;
