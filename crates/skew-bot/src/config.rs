//! Application configuration.
//!
//! Session configuration (pair, duration) is resolved once before the
//! loop starts and is immutable afterwards. CLI flags override the
//! config file.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use skew_mm::MakerConfig;

/// Trading pair section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairConfig {
    /// Base currency code, e.g. "COMP".
    pub base: String,
    /// Quote currency code, e.g. "USDT".
    pub quote: String,
}

/// Session section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long the bot quotes before flattening, in seconds.
    pub duration_secs: u64,
}

/// Venue connection section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Venue REST API root.
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Environment variable holding the API secret.
    #[serde(default = "default_api_secret_env")]
    pub api_secret_env: String,
}

fn default_rest_url() -> String {
    "https://api.binance.us".to_string()
}

fn default_api_key_env() -> String {
    "SKEW_API_KEY".to_string()
}

fn default_api_secret_env() -> String {
    "SKEW_API_SECRET".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            rest_url: default_rest_url(),
            api_key_env: default_api_key_env(),
            api_secret_env: default_api_secret_env(),
        }
    }
}

/// Trade log section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Output path for the session's CSV trade log.
    #[serde(default = "default_trade_log_path")]
    pub path: String,
}

fn default_trade_log_path() -> String {
    "trade_data.csv".to_string()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_trade_log_path(),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub pair: PairConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub maker: MakerConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

impl AppConfig {
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config {path}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_minimal_config() {
        let config: AppConfig = toml::from_str(
            r#"
            [pair]
            base = "COMP"
            quote = "USDT"

            [session]
            duration_secs = 3600
            "#,
        )
        .unwrap();

        assert_eq!(config.pair.base, "COMP");
        assert_eq!(config.session.duration_secs, 3600);
        assert_eq!(config.gateway.api_key_env, "SKEW_API_KEY");
        assert_eq!(config.maker.spread_floor, dec!(0.001));
        assert_eq!(config.ledger.path, "trade_data.csv");
    }

    #[test]
    fn test_maker_overrides() {
        let config: AppConfig = toml::from_str(
            r#"
            [pair]
            base = "COMP"
            quote = "USDT"

            [session]
            duration_secs = 60

            [maker]
            stale_after_secs = 30
            record_every = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.maker.stale_after_secs, 30);
        assert_eq!(config.maker.record_every, 50);
        // untouched fields keep their defaults
        assert_eq!(config.maker.refresh_pause_secs, 5);
    }

    #[test]
    fn test_missing_pair_rejected() {
        let result: Result<AppConfig, _> = toml::from_str(
            r#"
            [session]
            duration_secs = 60
            "#,
        );
        assert!(result.is_err());
    }
}
