//! Marlin serves gap-explicit candle history and cached exchange metadata
//! across multiple market-data brokers.
//!
//! Overview
//! - Each registered connector covers one broker + exchange scope (e.g. Binance
//!   spot) and implements the `marlin_core` role traits it can serve.
//! - Historical requests are routed by identifier to their connector, fetched
//!   with a per-call timeout and aligned to the interval's cadence: fixed-step
//!   series always have the configured capacity, calendar-step series span the
//!   available history with one entry per day.
//! - Exchange metadata lives in an [`ExchangeInfoCache`]: loaded from disk or
//!   fetched once at startup, served without blocking, refreshed in the
//!   background when any exchange entry is older than the staleness threshold.
//!
//! Key behaviors and trade-offs
//! - Gaps are never hidden: placeholders carry `missing = true` and zeroed
//!   prices, so consumers can tell an outage from a flat market.
//! - Upstream rows earlier than requested abort the build with an integrity
//!   error instead of being truncated.
//! - Readers of the metadata snapshot may see data up to one refresh old; they
//!   never wait for upstream.
//! - Offline mode serves the persisted snapshot only and refuses to start
//!   without one.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use marlin::{AssetIdentifier, Interval, Marlin};
//! use marlin_binance::{BinanceConnector, Segment};
//!
//! let spot = BinanceConnector::builder(Segment::Spot).whitelist(whitelist).build()?;
//! let marlin = Marlin::builder()
//!     .with_connector(Arc::new(spot))
//!     .open()
//!     .await?;
//!
//! let btc: AssetIdentifier = "BINANCE:SPOT:BTCUSDT".parse()?;
//! let candles = marlin.historical(&btc, 1_700_000_040, Interval::I1m).await?;
//! let info = marlin.asset_info(&btc);
//! ```
//!
//! See `marlin/examples/` for runnable demonstrations against the mock connector.
#![warn(missing_docs)]

/// Exchange metadata cache, its refresh source and on-disk store.
pub mod cache;
pub(crate) mod core;
mod router;

pub use cache::{
    ConnectorSource, ExchangeInfoCache, ExchangeListSource, RefreshTicket, SnapshotStore,
};
pub use core::{Marlin, MarlinBuilder};

// Re-export core types for convenience
pub use marlin_core::{
    AssetIdentifier, AssetInfo, AssetSplit, BatchPolicy, BrokerInfo, CacheConfig, Cadence,
    Candle, CandlesPayload, Capability, ErrorKind, ExchangeInfo, ExchangeList, Interval,
    ListedSymbol, MarlinConfig, MarlinConnector, MarlinError, ONBOARD_UNKNOWN, RawCandle,
    SymbolWhitelist, TradeConstraints,
};
