//! marlin-binance
//!
//! Connector for the Binance spot and USDⓈ-M futures REST APIs. Each segment
//! is its own `MarlinConnector` serving one-minute candles, a whitelisted
//! symbol listing with parsed trading filters, and onboarding-date lookups.
#![warn(missing_docs)]

/// Transport trait and the production adapter backed by `reqwest`.
pub mod adapter;
mod builder;
/// Trading-filter parsing.
pub mod filters;

use std::sync::Arc;

use async_trait::async_trait;
use marlin_core::connector::{
    CandleProvider, EarliestTimestampProvider, ListingProvider, MarlinConnector,
};
use marlin_core::timeseries::util::parse_number;
use marlin_core::{Interval, ListedSymbol, MarlinError, RawCandle, SymbolWhitelist};

use adapter::{BinanceApi, Kline, SymbolEntry};
pub use builder::BinanceConnectorBuilder;
pub use filters::FilterKeys;

/// Binance market segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Spot market.
    Spot,
    /// USDⓈ-M perpetual futures.
    Futures,
}

impl Segment {
    /// Exchange id used in asset identifiers.
    #[must_use]
    pub const fn exchange_id(self) -> &'static str {
        match self {
            Self::Spot => "SPOT",
            Self::Futures => "PERP",
        }
    }

    /// Display name of the segment.
    #[must_use]
    pub const fn exchange_name(self) -> &'static str {
        match self {
            Self::Spot => "Spot Trading",
            Self::Futures => "Futures Trading",
        }
    }

    /// Connector name used in logs and errors.
    #[must_use]
    pub const fn connector_name(self) -> &'static str {
        match self {
            Self::Spot => "marlin-binance-spot",
            Self::Futures => "marlin-binance-futures",
        }
    }

    /// Production REST base URL.
    #[must_use]
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Spot => "https://api.binance.com/api/v3/",
            Self::Futures => "https://fapi.binance.com/fapi/v1/",
        }
    }

    /// Filter key names published by this segment.
    #[must_use]
    pub const fn filter_keys(self) -> FilterKeys {
        match self {
            Self::Spot => FilterKeys::SPOT,
            Self::Futures => FilterKeys::FUTURES,
        }
    }
}

/// Public connector type for one Binance segment.
pub struct BinanceConnector {
    segment: Segment,
    api: Arc<dyn BinanceApi>,
    whitelist: Arc<SymbolWhitelist>,
    keys: FilterKeys,
}

impl BinanceConnector {
    /// Broker id shared by both segments.
    pub const BROKER_ID: &'static str = "BINANCE";
    /// Only quote asset that is listed.
    pub const QUOTE_ASSET: &'static str = "USDT";

    const RESOLUTIONS: &'static [Interval] = &[Interval::I1m];

    /// Start configuring a connector for `segment`.
    #[must_use]
    pub fn builder(segment: Segment) -> BinanceConnectorBuilder {
        BinanceConnectorBuilder::new(segment)
    }

    /// Build directly from a transport, e.g. a scripted one in tests.
    #[must_use]
    pub fn with_api(segment: Segment, api: Arc<dyn BinanceApi>, whitelist: SymbolWhitelist) -> Self {
        Self {
            segment,
            api,
            whitelist: Arc::new(whitelist),
            keys: segment.filter_keys(),
        }
    }

    /// Override the filter key names for this connector.
    #[must_use]
    pub const fn with_filter_keys(mut self, keys: FilterKeys) -> Self {
        self.keys = keys;
        self
    }

    /// The segment this connector serves.
    #[must_use]
    pub const fn segment(&self) -> Segment {
        self.segment
    }

    fn is_listed(&self, s: &SymbolEntry) -> bool {
        let common = s.status == "TRADING"
            && s.quote_asset == Self::QUOTE_ASSET
            && self.whitelist.contains(&s.base_asset);
        match self.segment {
            Segment::Spot => common && s.is_spot_trading_allowed && s.is_margin_trading_allowed,
            Segment::Futures => common && s.contract_type == "PERPETUAL",
        }
    }

    fn to_listed(&self, s: &SymbolEntry) -> Result<ListedSymbol, MarlinError> {
        let constraints = filters::parse_constraints(&s.filters, &self.keys)
            .map_err(|e| MarlinError::Data(format!("{}: {e}", s.symbol)))?;
        Ok(ListedSymbol {
            symbol: s.symbol.clone(),
            pair: s.symbol.clone(),
            base_asset: s.base_asset.clone(),
            base_asset_precision: s.base_asset_precision,
            quote_asset: s.quote_asset.clone(),
            quote_precision: s.quote_precision,
            constraints,
            splits: Vec::new(),
        })
    }
}

/// Convert one kline into a raw row with second resolution.
///
/// Taker volume is the taker-buy quote volume.
///
/// # Errors
/// Returns `Err(MarlinError::Data)` if any decimal field is malformed.
pub fn kline_to_raw(k: &Kline) -> Result<RawCandle, MarlinError> {
    Ok(RawCandle {
        open_time: k.0.div_euclid(1000),
        open: parse_number("open", &k.1)?,
        high: parse_number("high", &k.2)?,
        low: parse_number("low", &k.3)?,
        close: parse_number("close", &k.4)?,
        volume: parse_number("volume", &k.5)?,
        number_of_trades: k.8,
        taker_volume: parse_number("taker buy quote volume", &k.10)?,
    })
}

#[async_trait]
impl CandleProvider for BinanceConnector {
    async fn raw_candles(
        &self,
        symbol: &str,
        start: i64,
        limit: usize,
    ) -> Result<Vec<RawCandle>, MarlinError> {
        let start_ms = start
            .checked_mul(1000)
            .ok_or_else(|| MarlinError::InvalidArg(format!("start {start} out of range")))?;
        let rows = self.api.klines(symbol, Interval::I1m, start_ms, limit).await?;
        rows.iter().map(kline_to_raw).collect()
    }
}

#[async_trait]
impl ListingProvider for BinanceConnector {
    async fn symbol_listing(&self) -> Result<Vec<ListedSymbol>, MarlinError> {
        let info = self.api.exchange_info().await?;
        info.symbols
            .iter()
            .filter(|s| self.is_listed(s))
            .map(|s| self.to_listed(s))
            .collect()
    }
}

#[async_trait]
impl EarliestTimestampProvider for BinanceConnector {
    async fn earliest_timestamp(&self, symbol: &str) -> Result<i64, MarlinError> {
        let rows = self.api.klines(symbol, Interval::I1m, 0, 1).await?;
        rows.first()
            .map(|k| k.0.div_euclid(1000))
            .ok_or_else(|| MarlinError::not_found(format!("earliest candle for {symbol}")))
    }
}

impl MarlinConnector for BinanceConnector {
    fn name(&self) -> &'static str {
        self.segment.connector_name()
    }

    fn broker_id(&self) -> &'static str {
        Self::BROKER_ID
    }

    fn broker_name(&self) -> &'static str {
        "Binance"
    }

    fn exchange_id(&self) -> &'static str {
        self.segment.exchange_id()
    }

    fn exchange_name(&self) -> &'static str {
        self.segment.exchange_name()
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

    fn as_earliest_timestamp_provider(&self) -> Option<&dyn EarliestTimestampProvider> {
        Some(self as &dyn EarliestTimestampProvider)
    }
}
