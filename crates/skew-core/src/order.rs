//! Order-related types and identifiers.

use crate::decimal::{Price, Size};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Order side: buy (bid) or sell (ask).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns +1 for buy, -1 for sell.
    ///
    /// Used to parameterize the bid/ask symmetry in sizing and pricing
    /// so the two sides share one body instead of mirrored copies.
    pub fn sign(&self) -> i8 {
        match self {
            Self::Buy => 1,
            Self::Sell => -1,
        }
    }

    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Venue order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    PendingCancel,
    Rejected,
    Expired,
}

impl OrderStatus {
    /// Whether the order can still rest on the book.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::New | Self::PartiallyFilled | Self::PendingCancel)
    }
}

/// Client order ID for submit idempotency.
///
/// Every submission carries a unique client id so a retried request
/// cannot create a duplicate resting order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientOrderId(String);

impl ClientOrderId {
    /// Create a new unique client order ID.
    ///
    /// Format: `skew_{timestamp_ms}_{uuid_short}`
    pub fn new() -> Self {
        let ts = Utc::now().timestamp_millis();
        let uuid_short = &Uuid::new_v4().to_string()[..8];
        Self(format!("skew_{ts}_{uuid_short}"))
    }

    /// Create from an existing string (for parsing venue responses).
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClientOrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An order resting on the venue book, owned by the order lifecycle
/// manager. At most one exists per side at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestingOrder {
    /// Venue-assigned order id.
    pub id: u64,
    /// Our client order id.
    pub client_id: ClientOrderId,
    pub side: OrderSide,
    pub price: Price,
    pub size: Size,
    /// Venue transact time of the submission. Staleness is measured
    /// against venue server time, never the local clock.
    pub submitted_at: DateTime<Utc>,
}

/// An order record as reported by the venue (open-orders or history view).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueOrder {
    pub order_id: u64,
    pub client_order_id: String,
    pub side: OrderSide,
    pub price: Price,
    pub orig_qty: Size,
    pub executed_qty: Size,
    pub status: OrderStatus,
    /// Venue transact time.
    pub time: DateTime<Utc>,
}

impl VenueOrder {
    /// Whether any quantity executed. Partially filled then cancelled
    /// orders still count as executions for the trade ledger.
    pub fn is_executed(&self) -> bool {
        self.executed_qty.is_positive()
    }
}

/// Immutable record of an executed order, appended to the trade ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilledOrder {
    /// Execution time as reported by the venue.
    pub time: DateTime<Utc>,
    pub symbol: String,
    pub side: OrderSide,
    pub executed_qty: Size,
    pub price: Price,
}

impl FilledOrder {
    /// Build a ledger record from a venue order history entry.
    pub fn from_venue(symbol: &str, order: &VenueOrder) -> Self {
        Self {
            time: order.time,
            symbol: symbol.to_string(),
            side: order.side,
            executed_qty: order.executed_qty,
            price: order.price,
        }
    }
}
