//! Query-string and path parameter helpers.
//!
//! None of these fail the request on their own: bad integers are recorded in
//! the caller's [`Validator`] so every problem can be reported at once.

use std::collections::HashMap;

use bedrock_core::Validator;
use thiserror::Error;

/// Parsed query string, as produced by `Query<HashMap<String, String>>`.
pub type QueryParams = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid id parameter")]
pub struct InvalidIdParam;

/// Value for `key`, or `default` when absent or empty.
pub fn read_string(qs: &QueryParams, key: &str, default: &str) -> String {
    match qs.get(key) {
        Some(v) if !v.is_empty() => v.clone(),
        _ => default.to_string(),
    }
}

/// Comma-separated values for `key`, or `default` when absent or empty.
pub fn read_csv(qs: &QueryParams, key: &str, default: &[&str]) -> Vec<String> {
    match qs.get(key) {
        Some(v) if !v.is_empty() => v.split(',').map(str::to_owned).collect(),
        _ => default.iter().map(|s| s.to_string()).collect(),
    }
}

/// Integer value for `key`, or `default` when absent or empty.
///
/// A value that is present but not an integer is recorded against `key` in
/// `v` and `default` is returned.
pub fn read_int(qs: &QueryParams, key: &str, default: i64, v: &mut Validator) -> i64 {
    let raw = match qs.get(key) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return default,
    };

    match raw.parse() {
        Ok(n) => n,
        Err(_) => {
            v.add_error(key, "must be an integer value");
            default
        }
    }
}

/// Parse a positive resource id taken from the URL path.
pub fn read_id_param(raw: &str) -> Result<i64, InvalidIdParam> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(InvalidIdParam),
    }
}
