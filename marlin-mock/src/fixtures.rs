//! Deterministic fixture data backing [`crate::MockConnector`].
//!
//! Minute history covers three days from 2023-11-14T00:00:00Z with a hole every
//! thirteenth minute; daily history covers calendar year 2020, weekdays only.

use chrono::{DateTime, Datelike, Weekday};
use marlin_core::{DAY_SECS, ListedSymbol, MINUTE_SECS, RawCandle, TradeConstraints};

/// First minute of the minute fixture.
pub const MINUTE_START: i64 = 1_699_920_000;
/// End (exclusive) of the minute fixture.
pub const MINUTE_END: i64 = MINUTE_START + 3 * DAY_SECS;
/// First day of the daily fixture (2020-01-01).
pub const DAILY_START: i64 = 1_577_836_800;
/// End (exclusive) of the daily fixture (2021-01-01).
pub const DAILY_END: i64 = 1_609_459_200;

/// One symbol of the fixture catalog.
#[derive(Debug, Clone, Copy)]
pub struct FixtureSymbol {
    /// Symbol as sent to the provider.
    pub symbol: &'static str,
    /// Trading pair.
    pub pair: &'static str,
    /// Base asset.
    pub base: &'static str,
    /// Quote asset.
    pub quote: &'static str,
    /// First row of history.
    pub onboard: i64,
    /// Price level the synthetic rows oscillate around.
    pub base_price: f64,
}

/// Minute-cadence catalog.
pub const MINUTE_SYMBOLS: &[FixtureSymbol] = &[
    FixtureSymbol {
        symbol: "BTCUSDT",
        pair: "BTCUSDT",
        base: "BTC",
        quote: "USDT",
        onboard: MINUTE_START,
        base_price: 36_500.0,
    },
    FixtureSymbol {
        symbol: "ETHUSDT",
        pair: "ETHUSDT",
        base: "ETH",
        quote: "USDT",
        onboard: MINUTE_START + 10 * MINUTE_SECS,
        base_price: 2_050.0,
    },
];

/// Daily-cadence catalog.
pub const DAILY_SYMBOLS: &[FixtureSymbol] = &[
    FixtureSymbol {
        symbol: "AAPL",
        pair: "AAPLUSD",
        base: "AAPL",
        quote: "USD",
        onboard: DAILY_START,
        base_price: 75.0,
    },
    FixtureSymbol {
        symbol: "MSFT",
        pair: "MSFTUSD",
        base: "MSFT",
        quote: "USD",
        onboard: DAILY_START,
        base_price: 160.0,
    },
];

/// Find a symbol in `catalog`.
#[must_use]
pub fn lookup(catalog: &[FixtureSymbol], symbol: &str) -> Option<FixtureSymbol> {
    catalog.iter().find(|s| s.symbol == symbol).copied()
}

fn row(sym: &FixtureSymbol, time: i64, idx: i64) -> RawCandle {
    #[allow(clippy::cast_precision_loss)]
    let wobble = (idx % 40) as f64 * 0.25;
    let open = sym.base_price + wobble;
    RawCandle {
        open_time: time,
        open,
        high: open + 1.0,
        low: open - 1.0,
        close: open + 0.5,
        volume: 10.0 + wobble,
        number_of_trades: 5 + idx % 7,
        taker_volume: 4.0,
    }
}

/// Up to `limit` minute rows at or after `start`, honoring the fixture holes.
#[must_use]
pub fn minute_rows(symbol: &str, start: i64, limit: usize) -> Option<Vec<RawCandle>> {
    let sym = lookup(MINUTE_SYMBOLS, symbol)?;
    let first = start.max(sym.onboard);
    let first = first + (MINUTE_SECS - first.rem_euclid(MINUTE_SECS)) % MINUTE_SECS;
    let rows = (first..MINUTE_END)
        .step_by(60)
        .map(|t| (t, (t - MINUTE_START) / MINUTE_SECS))
        .filter(|(_, idx)| idx % 13 != 7)
        .take(limit)
        .map(|(t, idx)| row(&sym, t, idx))
        .collect();
    Some(rows)
}

/// Weekday rows from the day containing `start` (or from the beginning when
/// `start` is zero).
#[must_use]
pub fn daily_rows(symbol: &str, start: i64) -> Option<Vec<RawCandle>> {
    let sym = lookup(DAILY_SYMBOLS, symbol)?;
    let first = start.max(sym.onboard);
    let first = first - first.rem_euclid(DAY_SECS);
    let rows = (first..DAILY_END)
        .step_by(86_400)
        .filter(|t| {
            DateTime::from_timestamp(*t, 0)
                .is_some_and(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        })
        .map(|t| row(&sym, t, (t - DAILY_START) / DAY_SECS))
        .collect();
    Some(rows)
}

/// Listing record for a fixture symbol.
#[must_use]
pub fn listed(sym: &FixtureSymbol, constraints: TradeConstraints) -> ListedSymbol {
    ListedSymbol {
        symbol: sym.symbol.to_string(),
        pair: sym.pair.to_string(),
        base_asset: sym.base.to_string(),
        base_asset_precision: 8,
        quote_asset: sym.quote.to_string(),
        quote_precision: 8,
        constraints,
        splits: Vec::new(),
    }
}

/// `count` consecutive minute rows starting at `start`, every one present.
#[must_use]
pub fn contiguous_minutes(start: i64, count: usize) -> Vec<RawCandle> {
    let sym = MINUTE_SYMBOLS[0];
    (0..count)
        .map(|i| {
            let t = start + i64::try_from(i).unwrap_or(i64::MAX) * MINUTE_SECS;
            row(&sym, t, (t - start) / MINUTE_SECS)
        })
        .collect()
}
