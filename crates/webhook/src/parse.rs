use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::error;

use common::{Error, OrderSide, Result, TradingSignal};

/// Parse a verified webhook payload into a [`TradingSignal`].
///
/// Required fields: `symbol` (non-empty string), `action` (BUY/SELL, any
/// case), `price` (positive number, numeric strings accepted). Optional:
/// `timestamp` (unix epoch seconds, defaults to receipt time), `strategy`,
/// `parameters` (object, defaults to empty).
///
/// Total over all JSON inputs: failures are `Error::Validation` naming the
/// offending field, never a panic.
pub fn parse_signal(payload: &Value) -> Result<TradingSignal> {
    let obj = payload
        .as_object()
        .ok_or_else(|| invalid("payload must be a JSON object"))?;

    let symbol = obj
        .get("symbol")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid("field 'symbol' must be a non-empty string"))?
        .to_string();

    let action = obj
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("field 'action' is missing or not a string"))?;
    let action = match action.to_ascii_uppercase().as_str() {
        "BUY" => OrderSide::Buy,
        "SELL" => OrderSide::Sell,
        _ => return Err(invalid("field 'action' must be BUY or SELL")),
    };

    let price = obj
        .get("price")
        .and_then(coerce_f64)
        .ok_or_else(|| invalid("field 'price' must be a number"))?;
    if !price.is_finite() || price <= 0.0 {
        return Err(invalid("field 'price' must be positive"));
    }

    let timestamp = match obj.get("timestamp") {
        None => Utc::now(),
        Some(v) => v
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| invalid("field 'timestamp' must be unix epoch seconds"))?,
    };

    let strategy = obj
        .get("strategy")
        .and_then(Value::as_str)
        .map(str::to_string);

    let parameters = match obj.get("parameters") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => return Err(invalid("field 'parameters' must be an object")),
    };

    Ok(TradingSignal {
        symbol,
        action,
        price,
        timestamp,
        strategy,
        parameters,
    })
}

/// Accept JSON numbers and numeric strings, matching what alert templates
/// actually send.
fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn invalid(msg: &str) -> Error {
    error!("Error parsing signal: {msg}");
    Error::Validation(msg.to_string())
}
