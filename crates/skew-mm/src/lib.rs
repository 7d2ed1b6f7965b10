//! Market-making strategy and order lifecycle for the skew bot.
//!
//! Two halves, one crate:
//! - [`strategy`]: pure pricing/sizing functions over a market snapshot
//!   and session progress
//! - [`orders`]: the per-side order state machine and the per-cycle
//!   reconciliation against the venue's open-orders view

pub mod config;
pub mod error;
pub mod orders;
pub mod strategy;

pub use config::MakerConfig;
pub use error::{MmError, MmResult};
pub use orders::{OrderManager, SideState};
pub use strategy::Quote;
