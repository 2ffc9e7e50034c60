//! Literal and key helpers shared by the backend converters

use crate::core_types::expression::{Expression, LogicalOperator, Value};
use chrono::{DateTime, Utc};

/// ISO-8601 UTC timestamp, second precision: `2024-03-01T12:00:00Z`.
pub(crate) fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// The value as a JSON document node.
///
/// Non-finite floats have no JSON form and become `null`; the shared
/// validation pass rejects them before any converter writes.
pub(crate) fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(flag) => serde_json::Value::Bool(*flag),
        Value::Int(number) => serde_json::Value::from(*number),
        Value::Float(number) => serde_json::Number::from_f64(*number)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Date(timestamp) => serde_json::Value::String(format_timestamp(timestamp)),
        Value::Text(text) => serde_json::Value::String(text.clone()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
    }
}

/// A JSON string literal with quotes and escapes.
pub(crate) fn json_string(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

/// Numbers rendered the way JSON renders them (`2`, `2.5`, `1.0`).
pub(crate) fn render_number(value: &Value) -> Option<String> {
    match value {
        Value::Int(_) | Value::Float(_) => Some(to_json(value).to_string()),
        _ => None,
    }
}

/// `namespace.identifier`, or just the identifier when there is no namespace.
pub(crate) fn namespaced(namespace: &str, identifier: &str) -> String {
    if namespace.is_empty() {
        identifier.to_string()
    } else {
        format!("{namespace}.{identifier}")
    }
}

/// Whether an infix grammar must parenthesise `child` under `parent`.
///
/// Only a bare compound of the other operator changes meaning when written
/// without parentheses; explicit groups already carry their own.
pub(crate) fn needs_parentheses(parent: LogicalOperator, child: &Expression) -> bool {
    matches!(child, Expression::Compound { operator, .. } if *operator != parent)
}
