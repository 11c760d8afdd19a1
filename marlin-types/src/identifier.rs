use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::MarlinError;

/// Immutable `(broker, exchange, symbol)` triple identifying one tradable asset.
///
/// The canonical string form is `BROKER:EXCHANGE:SYMBOL`, e.g. `BINANCE:SPOT:BTCUSDT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetIdentifier {
    broker: String,
    exchange: String,
    symbol: String,
}

impl AssetIdentifier {
    /// Build an identifier from its parts.
    ///
    /// # Errors
    /// Returns `InvalidArg` if any part is empty or contains the `:` separator.
    pub fn new(
        broker: impl Into<String>,
        exchange: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Result<Self, MarlinError> {
        let id = Self {
            broker: broker.into(),
            exchange: exchange.into(),
            symbol: symbol.into(),
        };
        for part in [&id.broker, &id.exchange, &id.symbol] {
            if part.is_empty() || part.contains(':') {
                return Err(MarlinError::InvalidArg(format!(
                    "invalid asset identifier part '{part}'"
                )));
            }
        }
        Ok(id)
    }

    /// Broker id, e.g. `BINANCE`.
    #[must_use]
    pub fn broker(&self) -> &str {
        &self.broker
    }

    /// Exchange (market segment) id, e.g. `SPOT`.
    #[must_use]
    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// Broker-native symbol, e.g. `BTCUSDT`.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl fmt::Display for AssetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.broker, self.exchange, self.symbol)
    }
}

impl FromStr for AssetIdentifier {
    type Err = MarlinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(broker), Some(exchange), Some(symbol), None) => {
                Self::new(broker, exchange, symbol)
            }
            _ => Err(MarlinError::InvalidArg(format!(
                "asset identifier '{s}' is not BROKER:EXCHANGE:SYMBOL"
            ))),
        }
    }
}

impl TryFrom<String> for AssetIdentifier {
    type Error = MarlinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AssetIdentifier> for String {
    fn from(id: AssetIdentifier) -> Self {
        id.to_string()
    }
}
