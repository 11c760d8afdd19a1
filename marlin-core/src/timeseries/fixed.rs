use marlin_types::{Candle, MarlinError, RawCandle};

/// Align raw rows to `requested_start, requested_start + step, ...`.
///
/// The output always has exactly `capacity` entries unless an outage longer than
/// the remaining capacity is found mid-fill, in which case the series is returned
/// as soon as it is full. Buckets with no upstream row are synthetic
/// [`Candle::missing_at`] entries.
///
/// All rows are validated before anything is produced, so an error never comes
/// with a partial series.
///
/// # Errors
/// - `Integrity` if any row opens before `requested_start`.
/// - `Data` if rows are not strictly increasing or not aligned to `step`.
/// - `InvalidArg` if `step` is not positive or the series would not fit in `i64`.
pub fn align_fixed_step(
    symbol: &str,
    rows: &[RawCandle],
    requested_start: i64,
    step: i64,
    capacity: usize,
) -> Result<Vec<Candle>, MarlinError> {
    if step <= 0 {
        return Err(MarlinError::InvalidArg(format!(
            "step must be positive, got {step}"
        )));
    }
    let out_of_range = || {
        MarlinError::InvalidArg(format!(
            "{symbol}: {capacity} steps of {step}s from {requested_start} leave the timestamp range"
        ))
    };
    let span = i64::try_from(capacity)
        .ok()
        .and_then(|c| step.checked_mul(c))
        .ok_or_else(out_of_range)?;
    requested_start.checked_add(span).ok_or_else(out_of_range)?;
    let mut last_open = requested_start.checked_sub(step).ok_or_else(out_of_range)?;
    validate(symbol, rows, requested_start, step)?;

    let mut out = Vec::with_capacity(capacity);
    let next = |t: i64| t.checked_add(step).ok_or_else(out_of_range);

    for (consumed, row) in rows.iter().enumerate() {
        while row.open_time > next(last_open)? {
            if out.len() == capacity {
                log_dropped(symbol, rows.len() - consumed, DropReason::GapFill);
                return Ok(out);
            }
            last_open = next(last_open)?;
            out.push(Candle::missing_at(last_open));
        }
        if out.len() == capacity {
            log_dropped(symbol, rows.len() - consumed, DropReason::Full);
            return Ok(out);
        }
        last_open = row.open_time;
        out.push(row.to_candle());
    }

    while out.len() < capacity {
        last_open = next(last_open)?;
        out.push(Candle::missing_at(last_open));
    }
    Ok(out)
}

fn validate(
    symbol: &str,
    rows: &[RawCandle],
    requested_start: i64,
    step: i64,
) -> Result<(), MarlinError> {
    let mut prev: Option<i64> = None;
    for row in rows {
        if row.open_time < requested_start {
            return Err(MarlinError::integrity(symbol, requested_start, row.open_time));
        }
        if prev.is_some_and(|p| row.open_time <= p) {
            return Err(MarlinError::Data(format!(
                "{symbol}: rows are not strictly increasing at {}",
                row.open_time
            )));
        }
        if row.open_time.abs_diff(requested_start) % step.unsigned_abs() != 0 {
            return Err(MarlinError::Data(format!(
                "{symbol}: row at {} is not aligned to a {step}s step from {requested_start}",
                row.open_time
            )));
        }
        prev = Some(row.open_time);
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum DropReason {
    GapFill,
    Full,
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn log_dropped(symbol: &str, remaining: usize, reason: DropReason) {
    #[cfg(feature = "tracing")]
    match reason {
        DropReason::GapFill => tracing::warn!(
            symbol = %symbol,
            dropped_rows = remaining,
            "series capacity reached while filling a gap"
        ),
        DropReason::Full => tracing::warn!(
            symbol = %symbol,
            dropped_rows = remaining,
            "series capacity reached; rows past the last bucket dropped"
        ),
    }
}
