//! Re-export of foundational types from `marlin-types`.
// Consolidated re-exports so downstream crates can depend on `marlin-core` only

pub use marlin_types::{Capability, ErrorKind, MarlinError};

pub use marlin_types::{
    AssetIdentifier, AssetInfo, AssetSplit, BrokerInfo, Candle, CandlesPayload, ExchangeInfo,
    ExchangeList, ListedSymbol, ONBOARD_UNKNOWN, RawCandle, TradeConstraints,
};

pub use marlin_types::{Cadence, DAY_SECS, Interval, MINUTE_SECS};

pub use marlin_types::{BatchPolicy, CacheConfig, MarlinConfig, SymbolWhitelist};
