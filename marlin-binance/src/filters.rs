//! Trading-filter parsing for `exchangeInfo` symbols.

use marlin_core::timeseries::util::parse_number;
use marlin_core::{MarlinError, TradeConstraints};
use serde_json::{Map, Value};

/// Per-segment key names inside the `MAX_NUM_ORDERS` and `MIN_NOTIONAL` filters.
///
/// Spot and futures publish the same filter types with different field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterKeys {
    /// Field holding the order-count limit.
    pub max_num_orders: &'static str,
    /// Field holding the minimum notional.
    pub min_notional: &'static str,
}

impl FilterKeys {
    /// Keys used by the spot API.
    pub const SPOT: Self = Self {
        max_num_orders: "maxNumOrders",
        min_notional: "minNotional",
    };

    /// Keys used by the USDⓈ-M futures API.
    pub const FUTURES: Self = Self {
        max_num_orders: "limit",
        min_notional: "notional",
    };
}

/// Parse a symbol's filters on top of [`TradeConstraints::exchange_defaults`].
///
/// Unknown filter types are ignored; a known filter missing one of its fields
/// is a data error.
///
/// # Errors
/// Returns `Err(MarlinError::Data)` on missing or non-numeric fields.
pub fn parse_constraints(
    filters: &[Map<String, Value>],
    keys: &FilterKeys,
) -> Result<TradeConstraints, MarlinError> {
    let mut c = TradeConstraints::exchange_defaults();
    for filter in filters {
        let kind = filter.get("filterType").and_then(Value::as_str).unwrap_or("");
        match kind {
            "PRICE_FILTER" => {
                c.max_price = number(filter, kind, "maxPrice")?;
                c.min_price = number(filter, kind, "minPrice")?;
                c.tick_size = number(filter, kind, "tickSize")?;
            }
            "MARKET_LOT_SIZE" => {
                c.max_quantity = number(filter, kind, "maxQty")?;
                c.min_quantity = number(filter, kind, "minQty")?;
                c.step_size = number(filter, kind, "stepSize")?;
            }
            "MAX_NUM_ORDERS" => {
                c.max_num_orders = integer(filter, kind, keys.max_num_orders)?;
            }
            "MIN_NOTIONAL" | "NOTIONAL" => {
                c.min_notional = number(filter, kind, keys.min_notional)?;
            }
            _ => {}
        }
    }
    Ok(c)
}

fn field<'a>(filter: &'a Map<String, Value>, kind: &str, key: &str) -> Result<&'a Value, MarlinError> {
    filter
        .get(key)
        .ok_or_else(|| MarlinError::Data(format!("{kind} filter has no '{key}'")))
}

fn number(filter: &Map<String, Value>, kind: &str, key: &str) -> Result<f64, MarlinError> {
    match field(filter, kind, key)? {
        Value::String(s) => parse_number(key, s),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| MarlinError::Data(format!("{kind}.{key} out of range"))),
        other => Err(MarlinError::Data(format!("{kind}.{key} is not numeric: {other}"))),
    }
}

fn integer(filter: &Map<String, Value>, kind: &str, key: &str) -> Result<i64, MarlinError> {
    match field(filter, kind, key)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| MarlinError::Data(format!("{kind}.{key} is not an integer"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| MarlinError::Data(format!("{kind}.{key} is not an integer: '{s}'"))),
        other => Err(MarlinError::Data(format!("{kind}.{key} is not numeric: {other}"))),
    }
}
