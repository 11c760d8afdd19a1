//! Marlin data transfer objects, errors and configuration primitives.
#![warn(missing_docs)]

mod asset;
mod candle;
mod capability;
mod config;
mod error;
mod exchange;
mod identifier;
mod interval;
mod whitelist;

pub use asset::{AssetInfo, AssetSplit, ListedSymbol, ONBOARD_UNKNOWN, TradeConstraints};
pub use candle::{Candle, CandlesPayload, RawCandle};
pub use capability::Capability;
pub use config::{BatchPolicy, CacheConfig, MarlinConfig};
pub use error::{ErrorKind, MarlinError};
pub use exchange::{BrokerInfo, ExchangeInfo, ExchangeList};
pub use identifier::AssetIdentifier;
pub use interval::{Cadence, DAY_SECS, Interval, MINUTE_SECS};
pub use whitelist::SymbolWhitelist;
