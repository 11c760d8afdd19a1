use serde::{Deserialize, Serialize};

use crate::AssetIdentifier;

/// Onboarding sentinel meaning "unknown, treat as earliest possible".
pub const ONBOARD_UNKNOWN: i64 = i64::MIN;

/// Per-symbol numeric trading limits.
///
/// `Default` is all-zero and is used by brokers that publish no filters.
/// Exchange-filter parsers start from [`TradeConstraints::exchange_defaults`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeConstraints {
    /// Lowest accepted order price.
    pub min_price: f64,
    /// Highest accepted order price.
    pub max_price: f64,
    /// Price increment.
    pub tick_size: f64,
    /// Lowest accepted order quantity.
    pub min_quantity: f64,
    /// Highest accepted order quantity.
    pub max_quantity: f64,
    /// Quantity increment.
    pub step_size: f64,
    /// Maximum number of open orders.
    pub max_num_orders: i64,
    /// Minimum order value in quote currency.
    pub min_notional: f64,
}

impl TradeConstraints {
    /// Limits assumed for exchange symbols before their filters are applied.
    #[must_use]
    pub const fn exchange_defaults() -> Self {
        Self {
            min_price: 0.0,
            max_price: f64::MAX,
            tick_size: 0.000_001,
            min_quantity: 0.001,
            max_quantity: 10_000_000.0,
            step_size: 0.001,
            max_num_orders: 100,
            min_notional: 5.0,
        }
    }
}

/// A corporate split effective at `time` (unix seconds, UTC midnight).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetSplit {
    /// Effective time.
    pub time: i64,
    /// New shares per old share.
    pub ratio: f64,
}

/// Normalized per-symbol record returned by a symbol listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedSymbol {
    /// Symbol used in identifiers and candle requests, e.g. `BTCUSDT` or `AAPL`.
    pub symbol: String,
    /// Trading pair, e.g. `BTCUSDT` or `AAPLUSD`.
    pub pair: String,
    /// Base asset, e.g. `BTC`.
    pub base_asset: String,
    /// Base asset precision in decimal places.
    pub base_asset_precision: u32,
    /// Quote asset, e.g. `USDT`.
    pub quote_asset: String,
    /// Quote asset precision in decimal places.
    pub quote_precision: u32,
    /// Parsed trading limits.
    pub constraints: TradeConstraints,
    /// Split history, ordered by time.
    pub splits: Vec<AssetSplit>,
}

/// Cached metadata for one tradable asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    /// Join key.
    pub identifier: AssetIdentifier,
    /// Canonical string form of `identifier` for every broker, equal to the
    /// key the asset is stored under. The bare ticker is `identifier.symbol()`.
    pub symbol: String,
    /// Broker-native pair name.
    pub pair: String,
    /// Base asset.
    pub base_asset: String,
    /// Base asset precision.
    pub base_asset_precision: u32,
    /// Quote asset.
    pub quote_asset: String,
    /// Quote asset precision.
    pub quote_precision: u32,
    /// First tradable timestamp, or [`ONBOARD_UNKNOWN`].
    pub on_board_date: i64,
    /// Trading limits.
    pub constraints: TradeConstraints,
    /// Split history, ordered by time.
    pub splits: Vec<AssetSplit>,
}

impl AssetInfo {
    /// Combine a listed symbol with its identifier and onboarding date.
    ///
    /// `symbol` is always `identifier.to_string()`, never the listing ticker.
    #[must_use]
    pub fn from_listing(identifier: AssetIdentifier, listed: ListedSymbol, on_board_date: i64) -> Self {
        Self {
            symbol: identifier.to_string(),
            identifier,
            pair: listed.pair,
            base_asset: listed.base_asset,
            base_asset_precision: listed.base_asset_precision,
            quote_asset: listed.quote_asset,
            quote_precision: listed.quote_precision,
            on_board_date,
            constraints: listed.constraints,
            splits: listed.splits,
        }
    }

    /// True when the onboarding date is the unknown sentinel.
    #[must_use]
    pub const fn onboarding_unknown(&self) -> bool {
        self.on_board_date == ONBOARD_UNKNOWN
    }
}
