//! Field-keyed validation error collector.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Pattern accepted for email addresses (WHATWG "valid email address").
pub static EMAIL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email regex is valid")
});

/// Accumulates validation failures keyed by field name.
///
/// Checks never short-circuit: callers run every rule and then inspect
/// [`Validator::valid`] once, so a response can report all violations together.
/// Only the first message recorded for a field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when no errors have been recorded.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record `message` for `key` unless the field already has an error.
    pub fn add_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(key.into()).or_insert_with(|| message.into());
    }

    /// Record `message` for `key` when `ok` is false.
    pub fn check(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_error(key, message);
        }
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }
}

/// `true` if `value` is one of `permitted`.
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

/// `true` if `value` matches `rx`.
pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_error_for_a_field_wins() {
        let mut v = Validator::new();
        v.add_error("email", "must be provided");
        v.add_error("email", "must be a valid email address");

        assert!(!v.valid());
        assert_eq!(v.errors()["email"], "must be provided");
    }

    #[test]
    fn check_collects_every_failing_field() {
        let mut v = Validator::new();
        v.check(false, "page", "must be greater than zero");
        v.check(true, "page_size", "must be greater than zero");
        v.check(false, "sort", "invalid sort value");

        let errors = v.errors();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("page"));
        assert!(errors.contains_key("sort"));
    }

    #[test]
    fn serializes_as_plain_map() {
        let mut v = Validator::new();
        v.add_error("name", "must be provided");

        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json, serde_json::json!({"name": "must be provided"}));
    }

    #[test]
    fn email_pattern() {
        assert!(matches("alice@example.com", &EMAIL_RX));
        assert!(!matches("alice@", &EMAIL_RX));
        assert!(!matches("not an email", &EMAIL_RX));
    }

    #[test]
    fn helpers() {
        assert!(permitted_value(&"id", &["id", "-id"]));
        assert!(!permitted_value(&"name", &["id", "-id"]));
    }
}
