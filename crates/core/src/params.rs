//! Pure helpers for extracting typed parameters from a `serde_json::Value` object.
//!
//! Each helper takes a JSON value, a key name, and a default. If the key is
//! missing or the value is not the expected shape, the default is returned.
//! These never fail; validation of the resulting values happens in the
//! typed config that consumes them.

use serde_json::Value;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
///
/// JSON integers are accepted and converted.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or
/// not a non-negative integer.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Extracts a `String` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Extracts a `[min, max]` pair of numbers.
///
/// Anything other than a two-element numeric array yields `default`.
/// Ordering is not checked here.
pub fn param_range_f64(params: &Value, name: &str, default: (f64, f64)) -> (f64, f64) {
    match params.get(name).and_then(Value::as_array).map(Vec::as_slice) {
        Some([lo, hi]) => match (lo.as_f64(), hi.as_f64()) {
            (Some(lo), Some(hi)) => (lo, hi),
            _ => default,
        },
        _ => default,
    }
}

/// Extracts a `[min, max]` pair of non-negative integers.
pub fn param_range_usize(params: &Value, name: &str, default: (usize, usize)) -> (usize, usize) {
    match params.get(name).and_then(Value::as_array).map(Vec::as_slice) {
        Some([lo, hi]) => match (lo.as_u64(), hi.as_u64()) {
            (Some(lo), Some(hi)) => (lo as usize, hi as usize),
            _ => default,
        },
        _ => default,
    }
}

/// Extracts an array of strings. A non-array, or an array containing any
/// non-string element, yields `default`.
pub fn param_string_list(params: &Value, name: &str, default: &[&str]) -> Vec<String> {
    params
        .get(name)
        .and_then(Value::as_array)
        .and_then(|items| {
            items
                .iter()
                .map(|v| v.as_str().map(String::from))
                .collect::<Option<Vec<_>>>()
        })
        .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect())
}
