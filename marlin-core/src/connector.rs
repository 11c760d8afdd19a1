use async_trait::async_trait;

use marlin_types::{Interval, ListedSymbol, MarlinError, RawCandle};

/// Focused role trait for connectors that provide raw OHLCV rows.
#[async_trait]
pub trait CandleProvider: Send + Sync {
    /// Fetch up to `limit` rows for `symbol` starting at `start` (unix seconds).
    ///
    /// Rows are ascending by time, may be fewer than `limit`, and may start later
    /// than `start`, but must never start earlier. Calendar-step connectors treat
    /// `start == 0` as "full history" and may ignore `limit`.
    async fn raw_candles(
        &self,
        symbol: &str,
        start: i64,
        limit: usize,
    ) -> Result<Vec<RawCandle>, MarlinError>;
}

/// Focused role trait for connectors that list their tradable symbols.
#[async_trait]
pub trait ListingProvider: Send + Sync {
    /// Fetch every tradable symbol with parsed trading filters.
    ///
    /// Callers do not time-limit the listing as a whole; implementations must
    /// bound each upstream call they make.
    async fn symbol_listing(&self) -> Result<Vec<ListedSymbol>, MarlinError>;
}

/// Focused role trait for connectors that can resolve onboarding dates.
#[async_trait]
pub trait EarliestTimestampProvider: Send + Sync {
    /// Timestamp (unix seconds) of the earliest available row for `symbol`.
    async fn earliest_timestamp(&self, symbol: &str) -> Result<i64, MarlinError>;
}

/// Main connector trait implemented by broker crates.
///
/// One connector serves exactly one broker + market-segment scope and becomes
/// one `ExchangeInfo` entry of the metadata snapshot.
pub trait MarlinConnector: Send + Sync {
    /// A stable identifier used in logs and errors (e.g. "marlin-binance-spot").
    fn name(&self) -> &'static str;

    /// Broker id, e.g. `BINANCE`.
    fn broker_id(&self) -> &'static str;

    /// Human-friendly broker name, e.g. "Binance".
    fn broker_name(&self) -> &'static str {
        self.broker_id()
    }

    /// Exchange (market segment) id, e.g. `SPOT`.
    fn exchange_id(&self) -> &'static str;

    /// Human-friendly exchange name, e.g. "Spot Trading".
    fn exchange_name(&self) -> &'static str {
        self.exchange_id()
    }

    /// Resolutions this connector serves.
    fn resolutions(&self) -> &'static [Interval];

    /// Whether `interval` is among [`MarlinConnector::resolutions`].
    fn supports_interval(&self, interval: Interval) -> bool {
        self.resolutions().contains(&interval)
    }

    /// Advertise candle capability by returning a usable trait object reference when supported.
    fn as_candle_provider(&self) -> Option<&dyn CandleProvider> {
        None
    }

    /// If implemented, returns a trait object for symbol listings.
    fn as_listing_provider(&self) -> Option<&dyn ListingProvider> {
        None
    }

    /// If implemented, returns a trait object for onboarding lookups.
    fn as_earliest_timestamp_provider(&self) -> Option<&dyn EarliestTimestampProvider> {
        None
    }
}
