//! Error types for the exchange gateway.

use thiserror::Error;

/// Gateway error types.
///
/// `Venue` carries the venue's own error code and message; everything
/// else is transport or decoding trouble on our side of the wire.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Venue error {code}: {message}")]
    Venue { code: i64, message: String },

    #[error("Response parse error: {0}")]
    Parse(String),

    #[error("Missing data: {0}")]
    MissingData(String),
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
