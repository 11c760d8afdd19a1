use core::fmt;
use serde::{Deserialize, Serialize};

use crate::MarlinError;

/// Seconds in one minute bucket.
pub const MINUTE_SECS: i64 = 60;
/// Seconds in one calendar day.
pub const DAY_SECS: i64 = 86_400;

/// Candle resolution offered by a connector.
///
/// Serialized as the bucket length in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Interval {
    /// One-minute buckets.
    I1m,
    /// One-day buckets.
    I1d,
}

/// How a series with a given interval is aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Fixed step in seconds with a fixed output capacity.
    FixedStep {
        /// Step between consecutive buckets, in seconds.
        step: i64,
    },
    /// One bucket per calendar day; length follows the data.
    CalendarDay,
}

impl Interval {
    /// Bucket length in seconds.
    #[must_use]
    pub const fn seconds(self) -> i64 {
        match self {
            Self::I1m => MINUTE_SECS,
            Self::I1d => DAY_SECS,
        }
    }

    /// Alignment policy for this interval.
    #[must_use]
    pub const fn cadence(self) -> Cadence {
        match self {
            Self::I1m => Cadence::FixedStep { step: MINUTE_SECS },
            Self::I1d => Cadence::CalendarDay,
        }
    }

    /// Short label used in upstream query strings and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::I1m => "1m",
            Self::I1d => "1d",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i64> for Interval {
    type Error = MarlinError;

    fn try_from(secs: i64) -> Result<Self, Self::Error> {
        match secs {
            MINUTE_SECS => Ok(Self::I1m),
            DAY_SECS => Ok(Self::I1d),
            other => Err(MarlinError::InvalidArg(format!(
                "unsupported interval of {other} seconds"
            ))),
        }
    }
}

impl From<Interval> for i64 {
    fn from(i: Interval) -> Self {
        i.seconds()
    }
}
