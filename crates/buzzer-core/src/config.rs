//! Helpers for loading function configuration from environment variables.
//!
//! Every loader takes a lookup function instead of reading `std::env`
//! directly, so configs can be built from a map in tests. Use [`env_lookup`]
//! at startup.

use std::str::FromStr;

/// Errors raised while reading configuration at cold start.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for env var {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Reads a variable from the process environment.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Read a required variable. Empty (or whitespace-only) values count as missing.
pub fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

/// Read and parse an optional variable. Unset or empty yields `None`;
/// a value that does not parse is an error rather than silently ignored.
pub fn optional_parsed<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_owned()) {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: v }),
    }
}
