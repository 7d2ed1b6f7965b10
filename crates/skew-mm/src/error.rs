//! Error types for skew-mm.

use skew_gateway::GatewayError;
use thiserror::Error;

/// Market-making errors.
///
/// Policy rejections (a quote below minimum notional) are not errors;
/// they surface as absent quotes. Everything here is a venue problem.
#[derive(Debug, Error)]
pub enum MmError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Result type alias for market-making operations.
pub type MmResult<T> = std::result::Result<T, MmError>;
