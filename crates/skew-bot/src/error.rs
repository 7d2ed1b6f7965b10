//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Preflight error: {0}")]
    Preflight(String),

    #[error("Core error: {0}")]
    Core(#[from] skew_core::CoreError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] skew_gateway::GatewayError),

    #[error("Market-making error: {0}")]
    Mm(#[from] skew_mm::MmError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] skew_ledger::LedgerError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] skew_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
