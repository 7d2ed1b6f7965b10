//! Market snapshot provider.
//!
//! Bundles the per-cycle venue reads (book top, both balances, server
//! time) into one `MarketSnapshot`. The strategy engine only ever sees
//! the snapshot from the immediately preceding fetch.

use skew_core::{MarketSnapshot, Pair, Portfolio};
use tracing::debug;

use crate::error::GatewayResult;
use crate::gateway::DynGateway;

/// Fetches point-in-time market state for one pair.
pub struct SnapshotProvider {
    gateway: DynGateway,
    pair: Pair,
}

impl SnapshotProvider {
    pub fn new(gateway: DynGateway, pair: Pair) -> Self {
        Self { gateway, pair }
    }

    /// Capture a snapshot. Validity (crossed or empty book) is the
    /// caller's decision to act on; fetching itself only fails on
    /// gateway errors.
    pub async fn fetch(&self) -> GatewayResult<MarketSnapshot> {
        let bbo = self.gateway.order_book_top(&self.pair).await?;
        let base_free = self.gateway.asset_balance(&self.pair.base).await?;
        let quote_free = self.gateway.asset_balance(&self.pair.quote).await?;
        let server_time = self.gateway.server_time().await?;

        debug!(
            bid = %bbo.best_bid,
            ask = %bbo.best_ask,
            base = %base_free,
            quote = %quote_free,
            "snapshot"
        );

        Ok(MarketSnapshot {
            bbo,
            portfolio: Portfolio::new(base_free, quote_free),
            server_time,
        })
    }
}
