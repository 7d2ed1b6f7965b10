//! Order lifecycle management.
//!
//! Tracks the two resting orders (one per side, never more) and runs the
//! per-cycle reconciliation against the venue's open-orders view. The
//! reconciliation bound: at most one stale order per side survives past
//! the timeout window, which caps adverse-selection exposure from quotes
//! that have drifted from fair value.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use skew_core::{
    ClientOrderId, OrderSide, Pair, RestingOrder, Session, Size, SymbolInfo, VenueOrder,
};
use skew_gateway::{DynGateway, SnapshotProvider};

use crate::config::MakerConfig;
use crate::error::MmResult;
use crate::strategy;

/// Per-side order state.
///
/// `Cancelling` holds an order whose cancel request failed: it must not
/// be treated as gone until an open-orders query confirms its absence.
#[derive(Debug, Clone)]
pub enum SideState {
    Empty,
    Resting(RestingOrder),
    Cancelling(RestingOrder),
}

impl SideState {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The tracked order, resolved or not.
    pub fn order(&self) -> Option<&RestingOrder> {
        match self {
            Self::Empty => None,
            Self::Resting(order) | Self::Cancelling(order) => Some(order),
        }
    }
}

/// Whether a resting order has outlived the staleness window.
///
/// The comparison runs against venue server time, never the local
/// clock; this function is the only place that difference is taken.
pub fn is_stale(
    order: &RestingOrder,
    server_time: DateTime<Utc>,
    stale_after: chrono::Duration,
) -> bool {
    server_time - order.submitted_at > stale_after
}

/// Owns the two resting orders and drives their lifecycle.
pub struct OrderManager {
    gateway: DynGateway,
    provider: SnapshotProvider,
    pair: Pair,
    config: MakerConfig,
    /// Venue minimum notional plus safety margin; quotes must clear
    /// this strictly.
    min_order_size: Decimal,
    /// Session-start order cap, fixed for the whole session.
    max_order_size: Size,
    bid: SideState,
    ask: SideState,
}

impl OrderManager {
    pub fn new(
        gateway: DynGateway,
        pair: Pair,
        symbol_info: &SymbolInfo,
        max_order_size: Size,
        config: MakerConfig,
    ) -> Self {
        let provider = SnapshotProvider::new(gateway.clone(), pair.clone());
        let min_order_size = symbol_info.min_notional + config.notional_margin;
        Self {
            gateway,
            provider,
            pair,
            config,
            min_order_size,
            max_order_size,
            bid: SideState::Empty,
            ask: SideState::Empty,
        }
    }

    pub fn bid_state(&self) -> &SideState {
        &self.bid
    }

    pub fn ask_state(&self) -> &SideState {
        &self.ask
    }

    /// Re-derive per-side state from the venue's open-orders view.
    ///
    /// Tracked orders missing from the view resolve to `Empty` (filled
    /// or cancelled); unknown open orders are adopted, which lets a
    /// restarted process resynchronize without any in-memory state.
    pub fn sync_with_open(&mut self, open: &[VenueOrder]) {
        for side in [OrderSide::Buy, OrderSide::Sell] {
            let slot = match side {
                OrderSide::Buy => &mut self.bid,
                OrderSide::Sell => &mut self.ask,
            };

            if let Some(order) = slot.order() {
                if !open.iter().any(|o| o.order_id == order.id) {
                    debug!(%side, order_id = order.id, "tracked order left the book");
                    *slot = SideState::Empty;
                }
            }

            if slot.is_empty() {
                if let Some(found) = open.iter().find(|o| o.side == side) {
                    debug!(%side, order_id = found.order_id, "adopting resting order");
                    *slot = SideState::Resting(RestingOrder {
                        id: found.order_id,
                        client_id: ClientOrderId::from_string(found.client_order_id.clone()),
                        side,
                        price: found.price,
                        size: found.orig_qty,
                        submitted_at: found.time,
                    });
                }
            }
        }
    }

    /// Cancel every order for the pair and resolve side states.
    ///
    /// Idempotent: with nothing open this is a no-op reported as
    /// success. A failed cancel keeps its side unresolved
    /// (`Cancelling`) rather than assuming the order is gone.
    pub async fn cancel_all(&mut self) -> MmResult<()> {
        let open = self.gateway.open_orders(&self.pair).await?;
        self.sync_with_open(&open);
        self.cancel_open(&open).await
    }

    /// One reconciliation cycle: snapshot, branch on the venue's open
    /// order count, act, pause.
    pub async fn reconcile(&mut self, session: &Session) -> MmResult<()> {
        let snapshot = self.provider.fetch().await?;
        if !snapshot.is_valid() {
            warn!(
                bid = %snapshot.bbo.best_bid,
                ask = %snapshot.bbo.best_ask,
                "stale snapshot, skipping this cycle's decision"
            );
            self.pause().await;
            return Ok(());
        }

        let open = self.gateway.open_orders(&self.pair).await?;
        self.sync_with_open(&open);

        match open.len() {
            // Both sides filled or nothing resting: replace immediately.
            0 => {
                self.replace_both(session).await?;
            }
            // One side filled. Give the survivor the staleness window;
            // if it is still alone afterwards, reset both sides rather
            // than let one quote rest while the market moves.
            1 => {
                sleep(Duration::from_secs(self.config.stale_after_secs)).await;
                let open = self.gateway.open_orders(&self.pair).await?;
                self.sync_with_open(&open);
                if open.len() == 1 {
                    info!("lone order outlived the stale window, resetting both sides");
                    self.cancel_open(&open).await?;
                    self.replace_both(session).await?;
                }
            }
            // Neither side filled: reset once the bid has gone stale.
            _ => {
                let stale_after = chrono::Duration::seconds(self.config.stale_after_secs as i64);
                let stale = match self.bid.order() {
                    Some(order) => is_stale(order, snapshot.server_time, stale_after),
                    // A resting bid we cannot date is treated as stale.
                    None => true,
                };
                if stale {
                    info!("resting quotes went stale, resetting both sides");
                    self.cancel_open(&open).await?;
                    self.replace_both(session).await?;
                }
            }
        }

        self.pause().await;
        Ok(())
    }

    /// Quote both sides from a fresh snapshot. Ask first, then bid,
    /// mirroring the venue submission order of the reset path.
    async fn replace_both(&mut self, session: &Session) -> MmResult<()> {
        let snapshot = self.provider.fetch().await?;
        if !snapshot.is_valid() {
            warn!("stale snapshot, skipping quote placement");
            return Ok(());
        }
        let percent = session.percent_completed(Utc::now());
        self.place(OrderSide::Sell, &snapshot, percent).await;
        self.place(OrderSide::Buy, &snapshot, percent).await;
        Ok(())
    }

    /// Submit one side's quote. Below-minimum suppression and venue
    /// rejections both leave the side `Empty` for this cycle; neither
    /// is fatal.
    async fn place(
        &mut self,
        side: OrderSide,
        snapshot: &skew_core::MarketSnapshot,
        percent_completed: Decimal,
    ) {
        if !self.side(side).is_empty() {
            warn!(%side, "side unresolved, not quoting");
            return;
        }

        let Some(quote) = strategy::build_quote(
            snapshot,
            percent_completed,
            side,
            self.max_order_size,
            self.min_order_size,
            &self.config,
        ) else {
            info!(%side, "quote below minimum notional, sitting out this cycle");
            return;
        };

        let client_id = ClientOrderId::new();
        match self
            .gateway
            .create_order(&self.pair, side, quote.size, quote.price, client_id.clone())
            .await
        {
            Ok(placed) => {
                info!(
                    %side,
                    order_id = placed.order_id,
                    price = %quote.price,
                    size = %quote.size,
                    "order placed"
                );
                *self.side_mut(side) = SideState::Resting(RestingOrder {
                    id: placed.order_id,
                    client_id,
                    side,
                    price: quote.price,
                    size: quote.size,
                    submitted_at: placed.time,
                });
            }
            Err(e) => {
                warn!(%side, error = %e, "order submission failed, side sits out");
            }
        }
    }

    /// Cancel the given open orders one by one, resolving side states
    /// as the venue confirms.
    async fn cancel_open(&mut self, open: &[VenueOrder]) -> MmResult<()> {
        for order in open {
            match self.gateway.cancel_order(&self.pair, order.order_id).await {
                Ok(()) => {
                    debug!(order_id = order.order_id, "order cancelled");
                    self.resolve_cancelled(order.order_id);
                }
                Err(e) => {
                    warn!(
                        order_id = order.order_id,
                        error = %e,
                        "cancel failed, keeping order unresolved"
                    );
                    self.mark_cancel_failed(order.order_id);
                }
            }
        }
        Ok(())
    }

    fn side(&self, side: OrderSide) -> &SideState {
        match side {
            OrderSide::Buy => &self.bid,
            OrderSide::Sell => &self.ask,
        }
    }

    fn side_mut(&mut self, side: OrderSide) -> &mut SideState {
        match side {
            OrderSide::Buy => &mut self.bid,
            OrderSide::Sell => &mut self.ask,
        }
    }

    fn resolve_cancelled(&mut self, order_id: u64) {
        for slot in [&mut self.bid, &mut self.ask] {
            if slot.order().is_some_and(|o| o.id == order_id) {
                *slot = SideState::Empty;
            }
        }
    }

    fn mark_cancel_failed(&mut self, order_id: u64) {
        for slot in [&mut self.bid, &mut self.ask] {
            if let SideState::Resting(order) = slot {
                if order.id == order_id {
                    let order = order.clone();
                    *slot = SideState::Cancelling(order);
                }
            }
        }
    }

    async fn pause(&self) {
        sleep(Duration::from_secs(self.config.refresh_pause_secs)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use skew_gateway::{ExchangeGateway, MockGateway};
    use std::sync::Arc;

    fn fast_config() -> MakerConfig {
        MakerConfig {
            refresh_pause_secs: 0,
            stale_after_secs: 0,
            ..MakerConfig::default()
        }
    }

    fn manager(mock: &Arc<MockGateway>, config: MakerConfig) -> OrderManager {
        OrderManager::new(
            mock.clone(),
            Pair::new("COMP", "USDT"),
            &SymbolInfo {
                min_notional: dec!(10),
            },
            Size::new(dec!(1)),
            config,
        )
    }

    fn funded_mock() -> Arc<MockGateway> {
        let mock = Arc::new(MockGateway::new());
        mock.set_bbo(dec!(100.00), dec!(100.50));
        mock.set_balance("COMP", dec!(5));
        mock.set_balance("USDT", dec!(500));
        mock
    }

    fn session(mock: &MockGateway) -> Session {
        Session::new(mock.now(), 3600).unwrap()
    }

    #[tokio::test]
    async fn test_empty_book_places_both_sides() {
        let mock = funded_mock();
        let mut mgr = manager(&mock, fast_config());

        mgr.reconcile(&session(&mock)).await.unwrap();

        assert_eq!(mock.create_calls(), 2);
        assert_eq!(mock.open_order_count(), 2);
        assert!(matches!(mgr.bid_state(), SideState::Resting(_)));
        assert!(matches!(mgr.ask_state(), SideState::Resting(_)));

        let open = mock.open_orders_snapshot();
        assert!(open.iter().any(|o| o.side == OrderSide::Buy));
        assert!(open.iter().any(|o| o.side == OrderSide::Sell));
    }

    #[tokio::test]
    async fn test_lone_survivor_outliving_window_resets_both() {
        let mock = funded_mock();
        let mut mgr = manager(&mock, fast_config());
        mgr.reconcile(&session(&mock)).await.unwrap();

        // One side fills; the other keeps resting through the window.
        let ask_id = mock
            .open_orders_snapshot()
            .iter()
            .find(|o| o.side == OrderSide::Sell)
            .unwrap()
            .order_id;
        mock.fill_order(ask_id);

        mgr.reconcile(&session(&mock)).await.unwrap();

        // The survivor was cancelled and exactly two fresh orders placed.
        assert_eq!(mock.cancel_calls(), 1);
        assert_eq!(mock.create_calls(), 4);
        assert_eq!(mock.open_order_count(), 2);
    }

    #[tokio::test]
    async fn test_two_fresh_orders_left_alone() {
        let mock = funded_mock();
        let config = MakerConfig {
            refresh_pause_secs: 0,
            stale_after_secs: 1000,
            ..MakerConfig::default()
        };
        let mut mgr = manager(&mock, config);

        mgr.reconcile(&session(&mock)).await.unwrap();
        assert_eq!(mock.create_calls(), 2);

        mgr.reconcile(&session(&mock)).await.unwrap();
        assert_eq!(mock.create_calls(), 2, "fresh orders must not be replaced");
        assert_eq!(mock.cancel_calls(), 0);
    }

    #[tokio::test]
    async fn test_two_stale_orders_reset() {
        let mock = funded_mock();
        let mut mgr = manager(&mock, fast_config());

        mgr.reconcile(&session(&mock)).await.unwrap();
        let first_ids: Vec<u64> = mock
            .open_orders_snapshot()
            .iter()
            .map(|o| o.order_id)
            .collect();

        // stale_after is zero, so any elapsed venue time goes stale.
        mock.advance(1);
        mgr.reconcile(&session(&mock)).await.unwrap();

        assert_eq!(mock.cancel_calls(), 2);
        assert_eq!(mock.create_calls(), 4);
        let second_ids: Vec<u64> = mock
            .open_orders_snapshot()
            .iter()
            .map(|o| o.order_id)
            .collect();
        assert!(first_ids.iter().all(|id| !second_ids.contains(id)));
    }

    #[tokio::test]
    async fn test_cancel_all_idempotent_with_empty_book() {
        let mock = funded_mock();
        let mut mgr = manager(&mock, fast_config());

        mgr.cancel_all().await.unwrap();
        mgr.cancel_all().await.unwrap();

        assert_eq!(mock.cancel_calls(), 0);
        assert!(mgr.bid_state().is_empty());
        assert!(mgr.ask_state().is_empty());
    }

    #[tokio::test]
    async fn test_failed_cancel_keeps_side_unresolved() {
        let mock = funded_mock();
        let mut mgr = manager(&mock, fast_config());
        mgr.reconcile(&session(&mock)).await.unwrap();

        // The ask was submitted first, so it is cancelled first and
        // takes the injected failure.
        mock.fail_next_cancel();
        mgr.cancel_all().await.unwrap();

        assert!(matches!(mgr.ask_state(), SideState::Cancelling(_)));
        assert!(mgr.bid_state().is_empty());
        assert_eq!(mock.open_order_count(), 1);

        // The retry confirms the cancel and resolves the side.
        mgr.cancel_all().await.unwrap();
        assert!(mgr.ask_state().is_empty());
        assert_eq!(mock.open_order_count(), 0);
    }

    #[tokio::test]
    async fn test_tiny_cap_suppresses_both_quotes() {
        let mock = funded_mock();
        let mut mgr = OrderManager::new(
            mock.clone(),
            Pair::new("COMP", "USDT"),
            &SymbolInfo {
                min_notional: dec!(10),
            },
            Size::new(dec!(0.05)),
            fast_config(),
        );

        mgr.reconcile(&session(&mock)).await.unwrap();

        assert_eq!(mock.create_calls(), 0);
        assert!(mgr.bid_state().is_empty());
        assert!(mgr.ask_state().is_empty());
    }

    #[tokio::test]
    async fn test_crossed_book_skips_cycle() {
        let mock = funded_mock();
        mock.set_bbo(dec!(101.00), dec!(100.00));
        let mut mgr = manager(&mock, fast_config());

        mgr.reconcile(&session(&mock)).await.unwrap();

        assert_eq!(mock.create_calls(), 0);
        assert_eq!(mock.cancel_calls(), 0);
    }

    #[tokio::test]
    async fn test_sync_adopts_unknown_resting_orders() {
        let mock = funded_mock();

        // Orders left over from a previous run of the process.
        let pair = Pair::new("COMP", "USDT");
        mock.create_order(
            &pair,
            OrderSide::Buy,
            Size::new(dec!(1)),
            skew_core::Price::new(dec!(99.00)),
            ClientOrderId::new(),
        )
        .await
        .unwrap();
        mock.create_order(
            &pair,
            OrderSide::Sell,
            Size::new(dec!(1)),
            skew_core::Price::new(dec!(101.00)),
            ClientOrderId::new(),
        )
        .await
        .unwrap();

        let mut mgr = manager(&mock, fast_config());
        let open = mock.open_orders_snapshot();
        mgr.sync_with_open(&open);

        assert!(matches!(mgr.bid_state(), SideState::Resting(_)));
        assert!(matches!(mgr.ask_state(), SideState::Resting(_)));
        assert_eq!(mgr.bid_state().order().unwrap().price.inner(), dec!(99.00));
    }

    #[test]
    fn test_is_stale_boundary_and_skew() {
        let now = Utc::now();
        let order = RestingOrder {
            id: 1,
            client_id: ClientOrderId::new(),
            side: OrderSide::Buy,
            price: skew_core::Price::new(dec!(100)),
            size: Size::new(dec!(1)),
            submitted_at: now,
        };
        let window = chrono::Duration::seconds(15);

        // Exactly at the window: not yet stale (strict >).
        assert!(!is_stale(&order, now + chrono::Duration::seconds(15), window));
        assert!(is_stale(&order, now + chrono::Duration::seconds(16), window));

        // Server clock behind the submit time (skew): never stale.
        assert!(!is_stale(&order, now - chrono::Duration::seconds(60), window));
    }
}
