use serde::{Deserialize, Serialize};

/// One OHLCV bucket of a normalized series.
///
/// When `missing` is true every price and volume field is zero and the record
/// only preserves cadence; `time` is always meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Base volume traded in the bucket.
    pub volume: f64,
    /// Number of trades, when the broker reports it.
    pub number_of_trades: i64,
    /// Taker (aggressor) volume, when the broker reports it.
    pub taker_volume: f64,
    /// Bucket open time, unix seconds.
    pub time: i64,
    /// True for synthetic placeholders inserted by gap filling.
    pub missing: bool,
}

impl Candle {
    /// A synthetic placeholder at `time`.
    #[must_use]
    pub const fn missing_at(time: i64) -> Self {
        Self {
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close: 0.0,
            volume: 0.0,
            number_of_trades: 0,
            taker_volume: 0.0,
            time,
            missing: true,
        }
    }
}

/// A raw row as delivered by a broker adapter, before alignment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCandle {
    /// Bucket open time, unix seconds.
    pub open_time: i64,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Base volume.
    pub volume: f64,
    /// Number of trades (0 when unknown).
    pub number_of_trades: i64,
    /// Taker volume (0 when unknown).
    pub taker_volume: f64,
}

impl RawCandle {
    /// Convert a real upstream row into a non-missing [`Candle`] stamped at `time`.
    #[must_use]
    pub const fn to_candle_at(&self, time: i64) -> Candle {
        Candle {
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            number_of_trades: self.number_of_trades,
            taker_volume: self.taker_volume,
            time,
            missing: false,
        }
    }

    /// Convert using the row's own open time.
    #[must_use]
    pub const fn to_candle(&self) -> Candle {
        self.to_candle_at(self.open_time)
    }
}

/// Transport wrapper for a candle series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CandlesPayload {
    /// Ordered candles.
    pub candles: Vec<Candle>,
}

impl From<Vec<Candle>> for CandlesPayload {
    fn from(candles: Vec<Candle>) -> Self {
        Self { candles }
    }
}
