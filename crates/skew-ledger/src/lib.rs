//! Filled-order ledger for the skew bot.
//!
//! The venue drops filled orders from its open-orders view, so
//! executions are recovered from periodic order-history sweeps. The
//! ledger records each execution once and writes the session's trades
//! as CSV at shutdown.

pub mod error;
pub mod ledger;
pub mod writer;

pub use error::{LedgerError, LedgerResult};
pub use ledger::FillLedger;
pub use writer::TradeLogWriter;
