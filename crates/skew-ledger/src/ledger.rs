//! In-memory ledger of observed executions.

use std::collections::HashSet;

use skew_core::{FilledOrder, VenueOrder};
use tracing::debug;

/// Collects executed orders from history sweeps, exactly once each.
#[derive(Debug, Default)]
pub struct FillLedger {
    /// Venue order ids already recorded.
    seen: HashSet<u64>,
    records: Vec<FilledOrder>,
}

impl FillLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record newly-observed executions from an order-history sweep.
    ///
    /// An order counts as executed once any quantity filled, including
    /// partial fills later cancelled. Returns how many records were new.
    pub fn observe(&mut self, symbol: &str, history: &[VenueOrder]) -> usize {
        let mut added = 0;
        for order in history {
            if order.is_executed() && self.seen.insert(order.order_id) {
                self.records.push(FilledOrder::from_venue(symbol, order));
                added += 1;
            }
        }
        if added > 0 {
            debug!(added, total = self.records.len(), "ledger updated");
        }
        added
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the ledger, returning records sorted by execution time.
    pub fn into_sorted(self) -> Vec<FilledOrder> {
        let mut records = self.records;
        records.sort_by_key(|r| r.time);
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use rust_decimal_macros::dec;
    use skew_core::{OrderSide, OrderStatus, Price, Size};

    fn venue_order(id: u64, executed: &str, time: DateTime<Utc>) -> VenueOrder {
        VenueOrder {
            order_id: id,
            client_order_id: format!("skew_{id}"),
            side: OrderSide::Buy,
            price: Price::new(dec!(100)),
            orig_qty: Size::new(dec!(1)),
            executed_qty: executed.parse().unwrap(),
            status: OrderStatus::Filled,
            time,
        }
    }

    #[test]
    fn test_unexecuted_orders_ignored() {
        let mut ledger = FillLedger::new();
        let added = ledger.observe("COMPUSDT", &[venue_order(1, "0", Utc::now())]);
        assert_eq!(added, 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_repeat_observation_recorded_once() {
        let mut ledger = FillLedger::new();
        let history = vec![venue_order(1, "1", Utc::now())];

        assert_eq!(ledger.observe("COMPUSDT", &history), 1);
        // The same history entry comes back on every later sweep.
        assert_eq!(ledger.observe("COMPUSDT", &history), 0);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_into_sorted_orders_by_execution_time() {
        let base = Utc::now();
        let mut ledger = FillLedger::new();
        ledger.observe(
            "COMPUSDT",
            &[
                venue_order(2, "1", base + Duration::seconds(30)),
                venue_order(1, "1", base),
                venue_order(3, "0.5", base + Duration::seconds(10)),
            ],
        );

        let sorted = ledger.into_sorted();
        assert_eq!(sorted.len(), 3);
        assert!(sorted.windows(2).all(|w| w[0].time <= w[1].time));
    }
}
