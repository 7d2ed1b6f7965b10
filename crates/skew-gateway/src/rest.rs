//! Binance-style REST gateway.
//!
//! Public endpoints (`exchangeInfo`, `depth`, `time`) are plain GETs.
//! Account endpoints (`account`, `openOrders`, `allOrders`, `order`)
//! are signed: HMAC-SHA256 over the query string, keyed by the API
//! secret, with the API key in the `X-MBX-APIKEY` header.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::{Client, Method};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;
use tracing::{debug, warn};

use skew_core::{
    Bbo, ClientOrderId, OrderSide, OrderStatus, Pair, Price, Size, SymbolInfo, VenueOrder,
};

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{BoxFuture, ExchangeGateway};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Order book depth requested per side; only the top level is used.
const DEPTH_LIMIT: u32 = 5;

type HmacSha256 = Hmac<Sha256>;

/// Venue error body, e.g. `{"code":-1013,"msg":"Filter failure"}`.
#[derive(Debug, Deserialize)]
struct VenueErrorBody {
    code: i64,
    msg: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerTimeResponse {
    server_time: i64,
}

#[derive(Debug, Deserialize)]
struct DepthResponse {
    bids: Vec<(Decimal, Decimal)>,
    asks: Vec<(Decimal, Decimal)>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterWire {
    filter_type: String,
    min_notional: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct SymbolWire {
    symbol: String,
    filters: Vec<FilterWire>,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfoResponse {
    symbols: Vec<SymbolWire>,
}

#[derive(Debug, Deserialize)]
struct BalanceWire {
    asset: String,
    free: Decimal,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    balances: Vec<BalanceWire>,
}

/// Order record as the venue reports it. `transactTime` appears on
/// submit responses, `time`/`updateTime` on history queries.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderWire {
    order_id: u64,
    #[serde(default)]
    client_order_id: Option<String>,
    side: OrderSide,
    price: Decimal,
    orig_qty: Decimal,
    executed_qty: Decimal,
    status: OrderStatus,
    #[serde(default)]
    time: Option<i64>,
    #[serde(default)]
    transact_time: Option<i64>,
    #[serde(default)]
    update_time: Option<i64>,
}

impl OrderWire {
    fn into_venue_order(self) -> GatewayResult<VenueOrder> {
        let millis = self
            .transact_time
            .or(self.time)
            .or(self.update_time)
            .ok_or_else(|| {
                GatewayError::Parse(format!("order {} carries no timestamp", self.order_id))
            })?;
        let time = DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| GatewayError::Parse(format!("invalid order timestamp {millis}")))?;
        Ok(VenueOrder {
            order_id: self.order_id,
            client_order_id: self.client_order_id.unwrap_or_default(),
            side: self.side,
            price: Price::new(self.price),
            orig_qty: Size::new(self.orig_qty),
            executed_qty: Size::new(self.executed_qty),
            status: self.status,
            time,
        })
    }
}

/// REST client for a Binance-compatible venue.
pub struct RestGateway {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    /// Signed-request validity window in milliseconds.
    recv_window_ms: u64,
}

impl RestGateway {
    /// Create a new REST gateway.
    ///
    /// # Arguments
    /// * `base_url` - venue API root, e.g. "https://api.binance.us"
    /// * `api_key` / `api_secret` - account credentials
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            recv_window_ms: 5_000,
        })
    }

    /// HMAC-SHA256 signature over the serialized query string.
    fn sign(&self, query: &str) -> GatewayResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .map_err(|e| GatewayError::Http(format!("invalid API secret: {e}")))?;
        mac.update(query.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn encode_query(params: &[(&str, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    async fn decode_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> GatewayResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Http(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            // The venue reports rejections as {"code": ..., "msg": ...}.
            if let Ok(err) = serde_json::from_str::<VenueErrorBody>(&body) {
                return Err(GatewayError::Venue {
                    code: err.code,
                    message: err.msg,
                });
            }
            return Err(GatewayError::Http(format!("HTTP {status}: {body}")));
        }

        serde_json::from_str(&body).map_err(|e| GatewayError::Parse(format!("{e}: {body}")))
    }

    async fn get_public<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> GatewayResult<T> {
        let query = Self::encode_query(params);
        let url = if query.is_empty() {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}{path}?{query}", self.base_url)
        };
        debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Http(format!("request failed: {e}")))?;

        Self::decode_response(response).await
    }

    async fn send_signed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> GatewayResult<T> {
        let mut signed: Vec<(&str, String)> = params.to_vec();
        signed.push(("recvWindow", self.recv_window_ms.to_string()));
        signed.push(("timestamp", Utc::now().timestamp_millis().to_string()));

        let query = Self::encode_query(&signed);
        let signature = self.sign(&query)?;
        let url = format!("{}{path}?{query}&signature={signature}", self.base_url);
        debug!(%path, %method, "signed request");

        let response = self
            .client
            .request(method, &url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(|e| GatewayError::Http(format!("request failed: {e}")))?;

        Self::decode_response(response).await
    }
}

impl ExchangeGateway for RestGateway {
    fn symbol_info<'a>(&'a self, pair: &'a Pair) -> BoxFuture<'a, GatewayResult<SymbolInfo>> {
        Box::pin(async move {
            let symbol = pair.symbol();
            let info: ExchangeInfoResponse = self
                .get_public("/api/v3/exchangeInfo", &[("symbol", symbol.clone())])
                .await?;

            let entry = info
                .symbols
                .into_iter()
                .find(|s| s.symbol == symbol)
                .ok_or_else(|| GatewayError::MissingData(format!("symbol {symbol} unknown")))?;

            // Newer venue versions rename MIN_NOTIONAL to NOTIONAL.
            let min_notional = entry
                .filters
                .iter()
                .filter(|f| f.filter_type == "MIN_NOTIONAL" || f.filter_type == "NOTIONAL")
                .find_map(|f| f.min_notional)
                .ok_or_else(|| {
                    GatewayError::MissingData(format!("no notional filter for {symbol}"))
                })?;

            Ok(SymbolInfo { min_notional })
        })
    }

    fn order_book_top<'a>(&'a self, pair: &'a Pair) -> BoxFuture<'a, GatewayResult<Bbo>> {
        Box::pin(async move {
            let depth: DepthResponse = self
                .get_public(
                    "/api/v3/depth",
                    &[
                        ("symbol", pair.symbol()),
                        ("limit", DEPTH_LIMIT.to_string()),
                    ],
                )
                .await?;

            let (best_bid, _) = depth
                .bids
                .first()
                .ok_or_else(|| GatewayError::MissingData("order book has no bids".to_string()))?;
            let (best_ask, _) = depth
                .asks
                .first()
                .ok_or_else(|| GatewayError::MissingData("order book has no asks".to_string()))?;

            Ok(Bbo::new(Price::new(*best_bid), Price::new(*best_ask)))
        })
    }

    fn asset_balance<'a>(&'a self, asset: &'a str) -> BoxFuture<'a, GatewayResult<Decimal>> {
        Box::pin(async move {
            let account: AccountResponse =
                self.send_signed(Method::GET, "/api/v3/account", &[]).await?;

            // Venues omit zero balances from the account view.
            let free = account
                .balances
                .into_iter()
                .find(|b| b.asset == asset)
                .map(|b| b.free)
                .unwrap_or(Decimal::ZERO);

            Ok(free)
        })
    }

    fn open_orders<'a>(&'a self, pair: &'a Pair) -> BoxFuture<'a, GatewayResult<Vec<VenueOrder>>> {
        Box::pin(async move {
            let orders: Vec<OrderWire> = self
                .send_signed(
                    Method::GET,
                    "/api/v3/openOrders",
                    &[("symbol", pair.symbol())],
                )
                .await?;
            orders.into_iter().map(OrderWire::into_venue_order).collect()
        })
    }

    fn all_orders<'a>(&'a self, pair: &'a Pair) -> BoxFuture<'a, GatewayResult<Vec<VenueOrder>>> {
        Box::pin(async move {
            let orders: Vec<OrderWire> = self
                .send_signed(
                    Method::GET,
                    "/api/v3/allOrders",
                    &[("symbol", pair.symbol())],
                )
                .await?;
            orders.into_iter().map(OrderWire::into_venue_order).collect()
        })
    }

    fn create_order<'a>(
        &'a self,
        pair: &'a Pair,
        side: OrderSide,
        qty: Size,
        price: Price,
        client_id: ClientOrderId,
    ) -> BoxFuture<'a, GatewayResult<VenueOrder>> {
        Box::pin(async move {
            let order: OrderWire = self
                .send_signed(
                    Method::POST,
                    "/api/v3/order",
                    &[
                        ("symbol", pair.symbol()),
                        ("side", side.to_string()),
                        // Post-only: rejected instead of crossing the book.
                        ("type", "LIMIT_MAKER".to_string()),
                        ("quantity", qty.to_string()),
                        ("price", price.to_string()),
                        ("newClientOrderId", client_id.to_string()),
                        ("newOrderRespType", "RESULT".to_string()),
                    ],
                )
                .await?;
            order.into_venue_order()
        })
    }

    fn cancel_order<'a>(&'a self, pair: &'a Pair, order_id: u64) -> BoxFuture<'a, GatewayResult<()>> {
        Box::pin(async move {
            let result: serde_json::Value = self
                .send_signed(
                    Method::DELETE,
                    "/api/v3/order",
                    &[
                        ("symbol", pair.symbol()),
                        ("orderId", order_id.to_string()),
                    ],
                )
                .await?;
            debug!(order_id, ?result, "order cancelled");
            Ok(())
        })
    }

    fn server_time(&self) -> BoxFuture<'_, GatewayResult<DateTime<Utc>>> {
        Box::pin(async move {
            let time: ServerTimeResponse = self.get_public("/api/v3/time", &[]).await?;
            DateTime::<Utc>::from_timestamp_millis(time.server_time).ok_or_else(|| {
                warn!(millis = time.server_time, "unparseable server time");
                GatewayError::Parse(format!("invalid server time {}", time.server_time))
            })
        })
    }
}
