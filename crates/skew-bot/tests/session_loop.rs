//! End-to-end session test against the mock venue: clean slate on
//! entry, two-sided quoting, fill capture, drain on deadline, and the
//! CSV trade log.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use tempfile::TempDir;
use tokio::time::sleep;

use skew_bot::config::{LedgerConfig, PairConfig, SessionConfig};
use skew_bot::{AppConfig, Application};
use skew_core::{ClientOrderId, OrderSide, Pair, Price, Size};
use skew_gateway::{ExchangeGateway, MockGateway};
use skew_mm::MakerConfig;

fn test_config(ledger_path: &str, duration_secs: u64) -> AppConfig {
    AppConfig {
        pair: PairConfig {
            base: "COMP".to_string(),
            quote: "USDT".to_string(),
        },
        session: SessionConfig { duration_secs },
        gateway: Default::default(),
        maker: MakerConfig {
            refresh_pause_secs: 0,
            stale_after_secs: 0,
            record_every: 0,
            ..MakerConfig::default()
        },
        ledger: LedgerConfig {
            path: ledger_path.to_string(),
        },
    }
}

fn funded_mock() -> Arc<MockGateway> {
    let mock = Arc::new(MockGateway::new());
    mock.set_bbo(dec!(100.00), dec!(100.50));
    mock.set_balance("COMP", dec!(5));
    mock.set_balance("USDT", dec!(500));
    mock
}

#[tokio::test]
async fn test_session_quotes_drains_and_logs_fills() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trades.csv");
    let mock = funded_mock();

    // An order left resting by a previous run; the clean slate on
    // entry must remove it.
    let pair = Pair::new("COMP", "USDT");
    let leftover = mock
        .create_order(
            &pair,
            OrderSide::Buy,
            Size::new(dec!(1)),
            Price::new(dec!(90.00)),
            ClientOrderId::new(),
        )
        .await
        .unwrap();

    let app = Application::with_gateway(
        test_config(path.to_str().unwrap(), 1),
        mock.clone(),
    );
    let handle = tokio::spawn(app.run());

    // Wait for an ask to rest, then fill it mid-session.
    let mut ask_id = None;
    for _ in 0..100 {
        if let Some(ask) = mock
            .open_orders_snapshot()
            .iter()
            .find(|o| o.side == OrderSide::Sell && o.order_id != leftover.order_id)
        {
            ask_id = Some(ask.order_id);
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }
    mock.fill_order(ask_id.expect("no ask quoted within the session"));

    handle.await.unwrap().unwrap();

    // Deadline drain: nothing may rest after exit.
    assert_eq!(mock.open_order_count(), 0);

    // Exactly one execution happened; the log holds the header plus
    // that one row.
    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "time,symbol,side,executedQty,price");
    assert_eq!(lines.len(), 2, "log:\n{content}");
    assert!(lines[1].contains("COMPUSDT,SELL,"));
}

#[tokio::test]
async fn test_zero_capital_aborts_before_quoting() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trades.csv");

    // Book exists but the account is empty: preflight must abort.
    let mock = Arc::new(MockGateway::new());
    mock.set_bbo(dec!(100.00), dec!(100.50));

    let app = Application::with_gateway(
        test_config(path.to_str().unwrap(), 1),
        mock.clone(),
    );
    let result = app.run().await;

    assert!(result.is_err());
    assert_eq!(mock.create_calls(), 0);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_crossed_book_at_startup_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trades.csv");

    let mock = funded_mock();
    mock.set_bbo(dec!(101.00), dec!(100.00));

    let app = Application::with_gateway(test_config(path.to_str().unwrap(), 1), mock.clone());
    assert!(app.run().await.is_err());
    assert_eq!(mock.create_calls(), 0);
}
