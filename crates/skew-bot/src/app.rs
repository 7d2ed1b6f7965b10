//! Application wiring and the session loop.
//!
//! One logical thread of control: preflight, clean slate, then
//! snapshot → decide → act cycles until the deadline, then a mandatory
//! drain (cancel everything) and the trade-log flush.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::sleep;
use tracing::{info, warn};

use skew_core::{Pair, Session, Size, SymbolInfo};
use skew_gateway::{DynGateway, RestGateway, SnapshotProvider};
use skew_ledger::{FillLedger, TradeLogWriter};
use skew_mm::{strategy, OrderManager};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// The assembled application.
pub struct Application {
    config: AppConfig,
    gateway: DynGateway,
    pair: Pair,
}

impl Application {
    /// Build against the real venue, reading credentials from the
    /// environment variables named in the config.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let api_key = std::env::var(&config.gateway.api_key_env).map_err(|_| {
            AppError::Config(format!("{} is not set", config.gateway.api_key_env))
        })?;
        let api_secret = std::env::var(&config.gateway.api_secret_env).map_err(|_| {
            AppError::Config(format!("{} is not set", config.gateway.api_secret_env))
        })?;

        let gateway = Arc::new(RestGateway::new(&config.gateway.rest_url, api_key, api_secret)?);
        Ok(Self::with_gateway(config, gateway))
    }

    /// Build against any gateway implementation.
    pub fn with_gateway(config: AppConfig, gateway: DynGateway) -> Self {
        let pair = Pair::new(&config.pair.base, &config.pair.quote);
        Self {
            config,
            gateway,
            pair,
        }
    }

    /// Resolve venue metadata and starting balances. Failure here is
    /// fatal: the bot aborts before quoting anything.
    async fn preflight(&self) -> AppResult<(SymbolInfo, Size)> {
        let symbol_info = self.gateway.symbol_info(&self.pair).await?;
        info!(
            symbol = %self.pair.symbol(),
            min_notional = %symbol_info.min_notional,
            "symbol metadata resolved"
        );

        let provider = SnapshotProvider::new(self.gateway.clone(), self.pair.clone());
        let snapshot = provider.fetch().await?;
        if !snapshot.is_valid() {
            return Err(AppError::Preflight(format!(
                "book is crossed or empty at startup (bid {}, ask {})",
                snapshot.bbo.best_bid, snapshot.bbo.best_ask
            )));
        }

        // The per-order cap is a slice of STARTING capital; it stays
        // fixed even as fills reshape the portfolio.
        let max_order_size = strategy::max_order_size(&snapshot, &self.config.maker);
        if !max_order_size.is_positive() {
            return Err(AppError::Preflight(
                "starting balances resolve to a zero order cap".to_string(),
            ));
        }
        info!(
            total_value = %snapshot.portfolio.total_value(snapshot.mid_price()),
            max_order_size = %max_order_size,
            "starting portfolio resolved"
        );

        Ok((symbol_info, max_order_size))
    }

    /// Run the session to completion.
    pub async fn run(self) -> AppResult<()> {
        let (symbol_info, max_order_size) = self.preflight().await?;

        let session = Session::new(Utc::now(), self.config.session.duration_secs)?;
        info!(
            start = %session.start(),
            end = %session.end(),
            pair = %self.pair,
            "session opened"
        );

        let mut manager = OrderManager::new(
            self.gateway.clone(),
            self.pair.clone(),
            &symbol_info,
            max_order_size,
            self.config.maker.clone(),
        );

        // Clean slate: anything resting from a previous run goes first.
        manager.cancel_all().await?;

        let symbol = self.pair.symbol();
        let mut ledger = FillLedger::new();
        let mut writer = TradeLogWriter::new(&self.config.ledger.path);
        let mut iter_count: u32 = 0;

        while !session.is_over(Utc::now()) {
            // Filled orders vanish from the open-orders view, so sweep
            // the full history into the ledger at a slower cadence.
            if iter_count < self.config.maker.record_every {
                iter_count += 1;
            } else {
                iter_count = 0;
                match self.gateway.all_orders(&self.pair).await {
                    Ok(history) => {
                        ledger.observe(&symbol, &history);
                    }
                    Err(e) => warn!(error = %e, "order history sweep failed"),
                }
            }

            if let Err(e) = manager.reconcile(&session).await {
                warn!(error = %e, "reconciliation cycle failed");
                sleep(Duration::from_secs(self.config.maker.refresh_pause_secs)).await;
            }
        }

        // Deadline reached: drain is mandatory, not best-effort.
        info!("session deadline reached, flattening");
        manager.cancel_all().await?;

        match self.gateway.all_orders(&self.pair).await {
            Ok(history) => {
                ledger.observe(&symbol, &history);
            }
            Err(e) => warn!(error = %e, "final order history sweep failed"),
        }

        let records = ledger.into_sorted();
        info!(fills = records.len(), path = %self.config.ledger.path, "writing trade log");
        writer.write_all(&records)?;
        writer.close()?;

        info!("session complete");
        Ok(())
    }
}
