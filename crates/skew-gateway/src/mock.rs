//! Scripted in-memory venue for tests.
//!
//! Holds the venue-side state (book top, balances, open orders, order
//! history, server clock) behind a mutex, records calls, and supports
//! one-shot failure injection so reconciliation error paths can be
//! driven deterministically.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use skew_core::{
    Bbo, ClientOrderId, OrderSide, OrderStatus, Pair, Price, Size, SymbolInfo, VenueOrder,
};

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{BoxFuture, ExchangeGateway};

#[derive(Debug)]
struct MockState {
    symbol_info: SymbolInfo,
    bbo: Bbo,
    balances: HashMap<String, Decimal>,
    open: Vec<VenueOrder>,
    history: Vec<VenueOrder>,
    now: DateTime<Utc>,
    next_order_id: u64,
    fail_next_create: bool,
    fail_next_cancel: bool,
    create_calls: u32,
    cancel_calls: u32,
}

/// Mock exchange gateway.
#[derive(Debug)]
pub struct MockGateway {
    state: Mutex<MockState>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                symbol_info: SymbolInfo {
                    min_notional: dec!(10),
                },
                bbo: Bbo::new(Price::new(dec!(100.00)), Price::new(dec!(100.50))),
                balances: HashMap::new(),
                open: Vec::new(),
                history: Vec::new(),
                now: DateTime::from_timestamp(1_750_000_000, 0).expect("valid epoch"),
                next_order_id: 1,
                fail_next_create: false,
                fail_next_cancel: false,
                create_calls: 0,
                cancel_calls: 0,
            }),
        }
    }

    pub fn set_min_notional(&self, min_notional: Decimal) {
        self.state.lock().symbol_info = SymbolInfo { min_notional };
    }

    pub fn set_bbo(&self, best_bid: Decimal, best_ask: Decimal) {
        self.state.lock().bbo = Bbo::new(Price::new(best_bid), Price::new(best_ask));
    }

    pub fn set_balance(&self, asset: &str, free: Decimal) {
        self.state.lock().balances.insert(asset.to_string(), free);
    }

    /// Advance the mock venue clock.
    pub fn advance(&self, secs: i64) {
        self.state.lock().now += Duration::seconds(secs);
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.state.lock().now
    }

    /// Simulate a fill: the order leaves the open view and its history
    /// entry becomes FILLED with the full quantity executed.
    pub fn fill_order(&self, order_id: u64) {
        let mut state = self.state.lock();
        state.open.retain(|o| o.order_id != order_id);
        let fill_time = state.now;
        if let Some(entry) = state.history.iter_mut().find(|o| o.order_id == order_id) {
            entry.status = OrderStatus::Filled;
            entry.executed_qty = entry.orig_qty;
            entry.time = fill_time;
        }
    }

    /// Make the next create_order call fail with a venue rejection.
    pub fn fail_next_create(&self) {
        self.state.lock().fail_next_create = true;
    }

    /// Make the next cancel_order call fail with a transport error.
    pub fn fail_next_cancel(&self) {
        self.state.lock().fail_next_cancel = true;
    }

    pub fn create_calls(&self) -> u32 {
        self.state.lock().create_calls
    }

    pub fn cancel_calls(&self) -> u32 {
        self.state.lock().cancel_calls
    }

    pub fn open_order_count(&self) -> usize {
        self.state.lock().open.len()
    }

    pub fn open_orders_snapshot(&self) -> Vec<VenueOrder> {
        self.state.lock().open.clone()
    }
}

impl ExchangeGateway for MockGateway {
    fn symbol_info<'a>(&'a self, _pair: &'a Pair) -> BoxFuture<'a, GatewayResult<SymbolInfo>> {
        Box::pin(async move { Ok(self.state.lock().symbol_info.clone()) })
    }

    fn order_book_top<'a>(&'a self, _pair: &'a Pair) -> BoxFuture<'a, GatewayResult<Bbo>> {
        Box::pin(async move { Ok(self.state.lock().bbo) })
    }

    fn asset_balance<'a>(&'a self, asset: &'a str) -> BoxFuture<'a, GatewayResult<Decimal>> {
        Box::pin(async move {
            Ok(self
                .state
                .lock()
                .balances
                .get(asset)
                .copied()
                .unwrap_or(Decimal::ZERO))
        })
    }

    fn open_orders<'a>(&'a self, _pair: &'a Pair) -> BoxFuture<'a, GatewayResult<Vec<VenueOrder>>> {
        Box::pin(async move { Ok(self.state.lock().open.clone()) })
    }

    fn all_orders<'a>(&'a self, _pair: &'a Pair) -> BoxFuture<'a, GatewayResult<Vec<VenueOrder>>> {
        Box::pin(async move { Ok(self.state.lock().history.clone()) })
    }

    fn create_order<'a>(
        &'a self,
        _pair: &'a Pair,
        side: OrderSide,
        qty: Size,
        price: Price,
        client_id: ClientOrderId,
    ) -> BoxFuture<'a, GatewayResult<VenueOrder>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            state.create_calls += 1;

            if state.fail_next_create {
                state.fail_next_create = false;
                return Err(GatewayError::Venue {
                    code: -2010,
                    message: "Order would immediately match and take.".to_string(),
                });
            }

            let order = VenueOrder {
                order_id: state.next_order_id,
                client_order_id: client_id.to_string(),
                side,
                price,
                orig_qty: qty,
                executed_qty: Size::ZERO,
                status: OrderStatus::New,
                time: state.now,
            };
            state.next_order_id += 1;
            state.open.push(order.clone());
            state.history.push(order.clone());
            Ok(order)
        })
    }

    fn cancel_order<'a>(
        &'a self,
        _pair: &'a Pair,
        order_id: u64,
    ) -> BoxFuture<'a, GatewayResult<()>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            state.cancel_calls += 1;

            if state.fail_next_cancel {
                state.fail_next_cancel = false;
                return Err(GatewayError::Http("cancel request timed out".to_string()));
            }

            let before = state.open.len();
            state.open.retain(|o| o.order_id != order_id);
            if state.open.len() == before {
                return Err(GatewayError::Venue {
                    code: -2011,
                    message: "Unknown order sent.".to_string(),
                });
            }
            if let Some(entry) = state.history.iter_mut().find(|o| o.order_id == order_id) {
                entry.status = OrderStatus::Canceled;
            }
            Ok(())
        })
    }

    fn server_time(&self) -> BoxFuture<'_, GatewayResult<DateTime<Utc>>> {
        Box::pin(async move { Ok(self.state.lock().now) })
    }
}
