use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{AssetIdentifier, AssetInfo, Interval};

/// One broker + market-segment scope, e.g. Binance spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
    /// Display name, e.g. "Spot Trading".
    pub name: String,
    /// Exchange id, e.g. `SPOT`.
    pub exchange_id: String,
    /// Broker id, e.g. `BINANCE`.
    pub broker_id: String,
    /// Time of the refresh that produced this entry, unix seconds.
    pub last_update: i64,
    /// Resolutions the scope can serve.
    pub resolution: Vec<Interval>,
    /// Assets keyed by identifier string.
    pub symbols: BTreeMap<String, AssetInfo>,
}

impl ExchangeInfo {
    /// True if this entry was refreshed strictly more than `threshold` before `now`.
    #[must_use]
    pub fn is_stale(&self, now: i64, threshold: Duration) -> bool {
        let threshold = i64::try_from(threshold.as_secs()).unwrap_or(i64::MAX);
        now.saturating_sub(self.last_update) > threshold
    }
}

/// Display metadata for a broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerInfo {
    /// Human-facing broker name.
    pub name: String,
}

/// Full metadata snapshot: the unit of persistence and atomic replacement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeList {
    /// Exchange entries in registration order.
    pub exchanges: Vec<ExchangeInfo>,
    /// Broker id to display metadata.
    pub broker_info: BTreeMap<String, BrokerInfo>,
}

impl ExchangeList {
    /// True if any exchange is older than `threshold`.
    #[must_use]
    pub fn is_stale(&self, now: i64, threshold: Duration) -> bool {
        self.exchanges.iter().any(|e| e.is_stale(now, threshold))
    }

    /// Find the exchange entry for `(broker, exchange)`.
    #[must_use]
    pub fn exchange(&self, broker_id: &str, exchange_id: &str) -> Option<&ExchangeInfo> {
        self.exchanges
            .iter()
            .find(|e| e.broker_id == broker_id && e.exchange_id == exchange_id)
    }

    /// Look up one asset by identifier.
    #[must_use]
    pub fn asset(&self, id: &AssetIdentifier) -> Option<&AssetInfo> {
        self.exchange(id.broker(), id.exchange())
            .and_then(|e| e.symbols.get(&id.to_string()))
    }
}
