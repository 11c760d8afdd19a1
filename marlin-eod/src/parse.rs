//! Payload decoding for the EOD endpoints.

use marlin_core::timeseries::calendar::midnight;
use marlin_core::timeseries::util::{parse_day, parse_number};
use marlin_core::{AssetSplit, MarlinError, RawCandle};

use crate::adapter::SplitEntry;

/// Parse the daily CSV (`Date,Open,High,Low,Close,Adjusted_close,Volume`).
///
/// The header row is skipped. Each row is stamped at UTC midnight of its date.
/// Adjusted close is ignored.
///
/// # Errors
/// Returns `Err(MarlinError::Data)` for a malformed date, number, or short row.
pub fn parse_eod_csv(body: &str) -> Result<Vec<RawCandle>, MarlinError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| MarlinError::Data(format!("csv row {}: {e}", idx + 1)))?;
        let col = |i: usize, name: &str| {
            record
                .get(i)
                .ok_or_else(|| MarlinError::Data(format!("csv row {}: missing {name}", idx + 1)))
        };
        rows.push(RawCandle {
            open_time: midnight(parse_day("date", col(0, "date")?)?),
            open: parse_number("open", col(1, "open")?)?,
            high: parse_number("high", col(2, "high")?)?,
            low: parse_number("low", col(3, "low")?)?,
            close: parse_number("close", col(4, "close")?)?,
            volume: parse_number("volume", col(6, "volume")?)?,
            number_of_trades: 0,
            taker_volume: 0.0,
        });
    }
    Ok(rows)
}

/// Convert a split entry into an [`AssetSplit`] effective at UTC midnight.
///
/// # Errors
/// Returns `Err(MarlinError::Data)` for a malformed date or ratio.
pub fn parse_split(entry: &SplitEntry) -> Result<AssetSplit, MarlinError> {
    let (num, den) = entry
        .split
        .split_once('/')
        .ok_or_else(|| MarlinError::Data(format!("split '{}' is not n/d", entry.split)))?;
    let num = parse_number("split numerator", num)?;
    let den = parse_number("split denominator", den)?;
    if den == 0.0 {
        return Err(MarlinError::Data(format!("split '{}' has zero denominator", entry.split)));
    }
    Ok(AssetSplit {
        time: midnight(parse_day("split date", &entry.date)?),
        ratio: num / den,
    })
}
