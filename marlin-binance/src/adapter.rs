use std::time::Duration;

use async_trait::async_trait;
use marlin_core::{Interval, MarlinError};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::{Map, Value};
use url::Url;

/// One kline exactly as Binance returns it (a 12-element JSON array).
///
/// Fields: open time (ms), open, high, low, close, volume, close time (ms),
/// quote asset volume, number of trades, taker buy base volume,
/// taker buy quote volume, ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Kline(
    pub i64,
    pub String,
    pub String,
    pub String,
    pub String,
    pub String,
    pub i64,
    pub String,
    pub i64,
    pub String,
    pub String,
    pub IgnoredAny,
);

/// `exchangeInfo` payload, reduced to the parts marlin reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeInfoResponse {
    /// Every symbol the segment knows about, tradable or not.
    pub symbols: Vec<SymbolEntry>,
}

/// One symbol of an `exchangeInfo` payload.
///
/// Spot-only and futures-only fields default when absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolEntry {
    /// Pair name, e.g. `BTCUSDT`.
    pub symbol: String,
    /// Trading status, e.g. `TRADING`.
    pub status: String,
    /// Base asset.
    pub base_asset: String,
    /// Base asset precision.
    #[serde(default)]
    pub base_asset_precision: u32,
    /// Quote asset.
    pub quote_asset: String,
    /// Quote precision.
    #[serde(default)]
    pub quote_precision: u32,
    /// Spot only.
    #[serde(default)]
    pub is_spot_trading_allowed: bool,
    /// Spot only.
    #[serde(default)]
    pub is_margin_trading_allowed: bool,
    /// Futures only, e.g. `PERPETUAL`.
    #[serde(default)]
    pub contract_type: String,
    /// Raw filter objects keyed by `filterType`.
    #[serde(default)]
    pub filters: Vec<Map<String, Value>>,
}

/// Transport abstraction over one Binance REST segment (so we can inject mocks in tests).
#[async_trait]
pub trait BinanceApi: Send + Sync {
    /// `GET klines`: up to `limit` rows from `start_ms`.
    async fn klines(
        &self,
        symbol: &str,
        interval: Interval,
        start_ms: i64,
        limit: usize,
    ) -> Result<Vec<Kline>, MarlinError>;

    /// `GET exchangeInfo`.
    async fn exchange_info(&self) -> Result<ExchangeInfoResponse, MarlinError>;
}

/// Production adapter backed by `reqwest`.
pub struct RealAdapter {
    http: reqwest::Client,
    base: Url,
    connector: &'static str,
}

impl RealAdapter {
    /// Build an adapter for `base` (which must end with `/`).
    ///
    /// # Errors
    /// Returns `Connector` if the HTTP client cannot be built.
    pub fn new(base: Url, timeout: Duration, connector: &'static str) -> Result<Self, MarlinError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| MarlinError::connector(connector, format!("http client: {e}")))?;
        Ok(Self {
            http,
            base,
            connector,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, MarlinError> {
        self.base
            .join(path)
            .map_err(|e| MarlinError::InvalidArg(format!("bad endpoint {path}: {e}")))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        context: &str,
    ) -> Result<T, MarlinError> {
        let resp = self
            .http
            .get(self.endpoint(path)?)
            .query(query)
            .send()
            .await
            .map_err(|e| map_transport_err(self.connector, &e, context))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(map_status(self.connector, status, &body, context));
        }
        resp.json::<T>()
            .await
            .map_err(|e| MarlinError::Data(format!("{context}: malformed payload: {e}")))
    }
}

fn map_transport_err(connector: &str, e: &reqwest::Error, context: &str) -> MarlinError {
    if e.is_timeout() {
        MarlinError::connector(connector, format!("timeout: {context}"))
    } else {
        MarlinError::connector(connector, format!("transport error: {context}: {e}"))
    }
}

pub(crate) fn map_status(connector: &str, status: StatusCode, body: &str, context: &str) -> MarlinError {
    if status == StatusCode::NOT_FOUND || body.contains("Invalid symbol") {
        return MarlinError::not_found(context.to_string());
    }
    if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() == 418 {
        return MarlinError::connector(connector, format!("rate limit: {context}"));
    }
    if status.is_server_error() {
        return MarlinError::connector(connector, format!("server error {status}: {context}"));
    }
    MarlinError::connector(connector, format!("status {status}: {context}: {body}"))
}

#[async_trait]
impl BinanceApi for RealAdapter {
    async fn klines(
        &self,
        symbol: &str,
        interval: Interval,
        start_ms: i64,
        limit: usize,
    ) -> Result<Vec<Kline>, MarlinError> {
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", interval.as_str().to_string()),
            ("startTime", start_ms.to_string()),
            ("limit", limit.to_string()),
        ];
        self.get_json("klines", &query, &format!("klines for {symbol}"))
            .await
    }

    async fn exchange_info(&self) -> Result<ExchangeInfoResponse, MarlinError> {
        self.get_json("exchangeInfo", &[], "exchange info").await
    }
}
