//! Typed environment variable lookups with defaults

use std::str::FromStr;

/// String variable, or `default` when unset
pub(crate) fn string(key: &str, default: impl Into<String>) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

/// Parsed variable, or `default` when unset or unparsable
pub(crate) fn parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
