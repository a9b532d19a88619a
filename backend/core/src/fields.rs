//! Lenient accessors for JSON bodies sent by the OCR service.
//!
//! The service owns its wire format, so a missing or mistyped field is never
//! an error here. Accessors return `None` and the report shows [`NOT_AVAILABLE`].

use std::fmt::Display;

use serde_json::Value;

/// Placeholder rendered for any field the service did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Read a field as display text. Numbers and booleans are stringified.
pub fn text(obj: &Value, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn float(obj: &Value, key: &str) -> Option<f64> {
    obj.get(key)?.as_f64()
}

pub fn boolean(obj: &Value, key: &str) -> Option<bool> {
    obj.get(key)?.as_bool()
}

/// Render a value or the `N/A` placeholder.
pub fn or_na<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
