use core::fmt;
use serde::{Deserialize, Serialize};

/// Capability labels for routing, errors, and telemetry.
///
/// These map one-to-one with connector role traits and allow consistent
/// Display formatting in timeout and unsupported errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Capability {
    /// Raw OHLCV rows for a single symbol.
    Candles,
    /// Most recent rows, served without gap filling.
    Latest,
    /// Tradable symbols and their trading filters.
    SymbolListing,
    /// First tradable timestamp of a symbol.
    EarliestTimestamp,
    /// Corporate split history.
    Splits,
    /// Full exchange metadata refresh.
    ExchangeInfo,
}

impl Capability {
    /// Stable, kebab-case identifier for logs/errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Candles => "candles",
            Self::Latest => "latest",
            Self::SymbolListing => "symbol-listing",
            Self::EarliestTimestamp => "earliest-timestamp",
            Self::Splits => "splits",
            Self::ExchangeInfo => "exchange-info",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
