use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use marlin_core::MarlinError;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

/// One entry of the `splits` endpoint, e.g. `{"date": "2020-08-31", "split": "4.000000/1.000000"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SplitEntry {
    /// Effective date, `YYYY-MM-DD`.
    pub date: String,
    /// Ratio as `new/old`.
    pub split: String,
}

/// Transport abstraction over the EOD REST API (so we can inject mocks in tests).
///
/// `ticker` is the provider ticker including the exchange suffix, e.g. `AAPL.US`.
#[async_trait]
pub trait EodApi: Send + Sync {
    /// Daily bars as CSV, from `from` or from the beginning of history.
    async fn eod_csv(&self, ticker: &str, from: Option<NaiveDate>) -> Result<String, MarlinError>;

    /// Split history.
    async fn splits(&self, ticker: &str) -> Result<Vec<SplitEntry>, MarlinError>;
}

/// Production adapter backed by `reqwest`.
pub struct RealAdapter {
    http: reqwest::Client,
    base: Url,
    token: String,
}

impl RealAdapter {
    /// Production API root.
    pub const DEFAULT_BASE_URL: &'static str = "https://eodhistoricaldata.com/api/";

    /// Build an adapter for `base` (which must end with `/`) authenticating with `token`.
    ///
    /// # Errors
    /// Returns `Connector` if the HTTP client cannot be built.
    pub fn new(base: Url, token: impl Into<String>, timeout: Duration) -> Result<Self, MarlinError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| MarlinError::connector(crate::EodConnector::NAME, format!("http client: {e}")))?;
        Ok(Self {
            http,
            base,
            token: token.into(),
        })
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        context: &str,
    ) -> Result<reqwest::Response, MarlinError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| MarlinError::InvalidArg(format!("bad endpoint {path}: {e}")))?;
        let resp = self
            .http
            .get(url)
            .query(&[("api_token", self.token.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| {
                MarlinError::connector(crate::EodConnector::NAME, format!("transport error: {context}: {e}"))
            })?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        Err(match status {
            StatusCode::NOT_FOUND => MarlinError::not_found(context.to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                MarlinError::connector(crate::EodConnector::NAME, format!("unauthorized: {context}"))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                MarlinError::connector(crate::EodConnector::NAME, format!("rate limit: {context}"))
            }
            s => MarlinError::connector(crate::EodConnector::NAME, format!("status {s}: {context}")),
        })
    }
}

#[async_trait]
impl EodApi for RealAdapter {
    async fn eod_csv(&self, ticker: &str, from: Option<NaiveDate>) -> Result<String, MarlinError> {
        let mut query = vec![("period", "d".to_string())];
        if let Some(day) = from {
            query.push(("from", day.format("%Y-%m-%d").to_string()));
        }
        let context = format!("daily bars for {ticker}");
        self.get(&format!("eod/{ticker}"), &query, &context)
            .await?
            .text()
            .await
            .map_err(|e| MarlinError::Data(format!("{context}: {e}")))
    }

    async fn splits(&self, ticker: &str) -> Result<Vec<SplitEntry>, MarlinError> {
        let context = format!("splits for {ticker}");
        self.get(&format!("splits/{ticker}"), &[("fmt", "json".to_string())], &context)
            .await?
            .json()
            .await
            .map_err(|e| MarlinError::Data(format!("{context}: malformed payload: {e}")))
    }
}
