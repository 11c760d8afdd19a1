//! marlin-eod
//!
//! Connector for daily US equities served by EOD Historical Data, exposed under
//! the `UNICORN` broker id. Candles come from the CSV end-of-day endpoint; the
//! listing is derived from the whitelist and enriched with split history.
//!
//! A listing issues one split lookup per whitelisted ticker. Each lookup is
//! bounded by the connector's call timeout; the listing as a whole is not.
#![warn(missing_docs)]

/// Transport trait and the production adapter backed by `reqwest`.
pub mod adapter;
/// Payload decoding.
pub mod parse;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use marlin_core::connector::{CandleProvider, ListingProvider, MarlinConnector};
use marlin_core::{
    BatchPolicy, Capability, Interval, ListedSymbol, MarlinError, RawCandle, SymbolWhitelist,
    TradeConstraints, fetch_bounded,
};
use url::Url;

use adapter::{EodApi, RealAdapter};

/// Public connector type for the US end-of-day exchange.
pub struct EodConnector {
    api: Arc<dyn EodApi>,
    whitelist: Arc<SymbolWhitelist>,
    split_concurrency: usize,
    call_timeout: Duration,
}

impl EodConnector {
    /// Connector name used in logs and errors.
    pub const NAME: &'static str = "marlin-eod";
    /// Broker id.
    pub const BROKER_ID: &'static str = "UNICORN";
    /// Exchange id, also the provider ticker suffix.
    pub const EXCHANGE_ID: &'static str = "US";
    /// Quote currency of every listed ticker.
    pub const QUOTE_ASSET: &'static str = "USD";

    const RESOLUTIONS: &'static [Interval] = &[Interval::I1d];
    const PRECISION: u32 = 2;

    /// Default parallelism ceiling for split lookups.
    pub const DEFAULT_SPLIT_CONCURRENCY: usize = 20;
    /// Default timeout of one upstream call.
    pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

    /// Build with the production HTTP adapter.
    ///
    /// # Errors
    /// Returns `Connector` if the HTTP client cannot be built.
    pub fn new(api_token: impl Into<String>, whitelist: SymbolWhitelist) -> Result<Self, MarlinError> {
        let base = Url::parse(RealAdapter::DEFAULT_BASE_URL)
            .map_err(|e| MarlinError::InvalidArg(e.to_string()))?;
        let api = RealAdapter::new(base, api_token, Self::DEFAULT_CALL_TIMEOUT)?;
        Ok(Self::with_api(Arc::new(api), whitelist))
    }

    /// Build from any transport, e.g. a scripted one in tests.
    #[must_use]
    pub fn with_api(api: Arc<dyn EodApi>, whitelist: SymbolWhitelist) -> Self {
        Self {
            api,
            whitelist: Arc::new(whitelist),
            split_concurrency: Self::DEFAULT_SPLIT_CONCURRENCY,
            call_timeout: Self::DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Parallelism ceiling for split lookups during a listing.
    #[must_use]
    pub const fn with_split_concurrency(mut self, n: usize) -> Self {
        self.split_concurrency = n;
        self
    }

    /// Timeout applied to each split lookup.
    #[must_use]
    pub const fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    fn ticker(symbol: &str) -> String {
        format!("{symbol}.{}", Self::EXCHANGE_ID)
    }
}

#[async_trait]
impl CandleProvider for EodConnector {
    async fn raw_candles(
        &self,
        symbol: &str,
        start: i64,
        _limit: usize,
    ) -> Result<Vec<RawCandle>, MarlinError> {
        let from = if start == 0 {
            None
        } else {
            let day = DateTime::from_timestamp(start, 0)
                .ok_or_else(|| MarlinError::InvalidArg(format!("start {start} out of range")))?
                .date_naive();
            Some(day)
        };
        let body = self.api.eod_csv(&Self::ticker(symbol), from).await?;
        parse::parse_eod_csv(&body).map_err(|e| match e {
            MarlinError::Data(msg) => MarlinError::Data(format!("{symbol}: {msg}")),
            other => other,
        })
    }
}

#[async_trait]
impl ListingProvider for EodConnector {
    async fn symbol_listing(&self) -> Result<Vec<ListedSymbol>, MarlinError> {
        let api = &self.api;
        let timeout = self.call_timeout;
        let splits = fetch_bounded(
            self.whitelist.iter().map(str::to_owned),
            self.split_concurrency,
            BatchPolicy::FailFast,
            |symbol| async move {
                let entries = tokio::time::timeout(timeout, api.splits(&Self::ticker(&symbol)))
                    .await
                    .map_err(|_| MarlinError::provider_timeout(Self::NAME, Capability::Splits.as_str()))??;
                let mut splits = entries
                    .iter()
                    .map(parse::parse_split)
                    .collect::<Result<Vec<_>, _>>()?;
                splits.sort_by_key(|s| s.time);
                Ok::<_, MarlinError>(splits)
            },
        )
        .await?;

        Ok(splits
            .values
            .into_iter()
            .map(|(symbol, splits)| ListedSymbol {
                pair: format!("{symbol}{}", Self::QUOTE_ASSET),
                base_asset: symbol.clone(),
                symbol,
                base_asset_precision: Self::PRECISION,
                quote_asset: Self::QUOTE_ASSET.to_string(),
                quote_precision: Self::PRECISION,
                constraints: TradeConstraints::default(),
                splits,
            })
            .collect())
    }
}

impl MarlinConnector for EodConnector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn broker_id(&self) -> &'static str {
        Self::BROKER_ID
    }

    fn broker_name(&self) -> &'static str {
        "Unicorn"
    }

    fn exchange_id(&self) -> &'static str {
        Self::EXCHANGE_ID
    }

    fn exchange_name(&self) -> &'static str {
        "USA Stocks"
    }

    fn resolutions(&self) -> &'static [Interval] {
        Self::RESOLUTIONS
    }

    fn as_candle_provider(&self) -> Option<&dyn CandleProvider> {
        Some(self as &dyn CandleProvider)
    }

    fn as_listing_provider(&self) -> Option<&dyn ListingProvider> {
        Some(self as &dyn ListingProvider)
    }
}
