use chrono::{DateTime, NaiveDate, NaiveTime};
use marlin_types::{Candle, MarlinError, RawCandle};

/// Align daily rows to one entry per calendar day (UTC).
///
/// The first row fixes the start of the series; there is no pre-fill before it.
/// Days skipped between two rows (weekends, holidays, outages) become
/// [`Candle::missing_at`] entries stamped at UTC midnight. Real rows are stamped
/// at midnight of their own day.
///
/// # Errors
/// `Data` if a timestamp is out of range or two rows fall on the same or a
/// decreasing day.
pub fn align_calendar_days(symbol: &str, rows: &[RawCandle]) -> Result<Vec<Candle>, MarlinError> {
    let mut out = Vec::with_capacity(rows.len());
    let mut current: Option<NaiveDate> = None;

    for row in rows {
        let date = day_of(symbol, row.open_time)?;
        if let Some(prev) = current {
            if date <= prev {
                return Err(MarlinError::Data(format!(
                    "{symbol}: daily rows out of order at {date} after {prev}"
                )));
            }
            let mut day = next_day(symbol, prev)?;
            while day < date {
                out.push(Candle::missing_at(midnight(day)));
                day = next_day(symbol, day)?;
            }
        }
        out.push(row.to_candle_at(midnight(date)));
        current = Some(date);
    }
    Ok(out)
}

/// UTC midnight of `day` as unix seconds.
#[must_use]
pub fn midnight(day: NaiveDate) -> i64 {
    day.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn day_of(symbol: &str, ts: i64) -> Result<NaiveDate, MarlinError> {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| MarlinError::Data(format!("{symbol}: timestamp {ts} out of range")))
}

fn next_day(symbol: &str, day: NaiveDate) -> Result<NaiveDate, MarlinError> {
    day.succ_opt()
        .ok_or_else(|| MarlinError::Data(format!("{symbol}: no day after {day}")))
}
