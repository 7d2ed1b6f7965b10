//! Exchange gateway for the skew market-making bot.
//!
//! The core consumes the venue exclusively through the [`ExchangeGateway`]
//! trait: every call either succeeds or reports an error, and retry policy
//! lives behind the trait, never in the strategy or reconciliation code.
//!
//! Provided implementations:
//! - [`RestGateway`]: Binance-style `/api/v3` REST client with HMAC-SHA256
//!   request signing for account endpoints.
//! - [`MockGateway`]: scripted in-memory venue for tests.

pub mod error;
pub mod gateway;
pub mod mock;
pub mod rest;
pub mod snapshot;

pub use error::{GatewayError, GatewayResult};
pub use gateway::{BoxFuture, DynGateway, ExchangeGateway};
pub use mock::MockGateway;
pub use rest::RestGateway;
pub use snapshot::SnapshotProvider;
