//! Development readout of the current state
//!
//! Pretty JSON with every floating-point field rounded to two decimals.
//! Not part of the simulation contract.

use serde_json::{Number, Value};

use crate::sim::GameState;

pub fn readout(state: &GameState) -> String {
    let value = match serde_json::to_value(state) {
        Ok(value) => round_floats(value),
        Err(e) => {
            log::warn!("Debug readout failed: {}", e);
            return String::new();
        }
    };
    serde_json::to_string_pretty(&value).unwrap_or_default()
}

fn round_floats(value: Value) -> Value {
    match value {
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map(|f| (f * 100.0).round() / 100.0)
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number),
        Value::Array(items) => Value::Array(items.into_iter().map(round_floats).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k, round_floats(v)))
                .collect(),
        ),
        other => other,
    }
}
