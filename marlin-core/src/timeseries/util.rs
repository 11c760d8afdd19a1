//! Shared helpers for decoding upstream rows.

use chrono::NaiveDate;
use marlin_types::MarlinError;

/// Parse a decimal field, naming the field in the error.
///
/// # Errors
/// Returns `Err(MarlinError::Data)` if `raw` is not a finite number.
pub fn parse_number(field: &str, raw: &str) -> Result<f64, MarlinError> {
    let v: f64 = raw
        .trim()
        .parse()
        .map_err(|_| MarlinError::Data(format!("invalid {field} '{raw}'")))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(MarlinError::Data(format!("non-finite {field} '{raw}'")))
    }
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
/// Returns `Err(MarlinError::Data)` on any other layout.
pub fn parse_day(field: &str, raw: &str) -> Result<NaiveDate, MarlinError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| MarlinError::Data(format!("invalid {field} '{raw}': {e}")))
}
