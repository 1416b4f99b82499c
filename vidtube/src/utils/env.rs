//! Environment variable parsing helpers.
//!
//! Each helper reads a variable, parses it and falls back to a default when the
//! variable is unset or malformed.

use std::path::PathBuf;
use std::time::Duration;

/// Get a u64 from environment, with default fallback.
#[inline]
pub fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Get a u32 from environment, with default fallback.
#[inline]
pub fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Get an i64 from environment, with default fallback.
#[inline]
pub fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Get a u16 from environment, with default fallback.
#[inline]
pub fn env_u16(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Get a bool from environment, with default fallback.
///
/// Recognizes "true", "1", "yes" and "on" (case-insensitive) as true.
#[inline]
pub fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
        .unwrap_or(default)
}

/// Get a String from environment, with default fallback.
#[inline]
pub fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an optional String from environment. Blank values count as unset.
#[inline]
pub fn env_string_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get a PathBuf from environment, with default fallback.
#[inline]
pub fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

/// Get a Duration (in seconds) from environment, with default fallback.
#[inline]
pub fn env_duration_secs(key: &str, default_secs: u64) -> Duration {
    Duration::from_secs(env_u64(key, default_secs))
}

/// Get a comma-separated list from environment.
///
/// Entries are trimmed and empty entries dropped. Returns `default` when the
/// variable is unset.
pub fn env_list(key: &str, default: &[&str]) -> Vec<String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => default.iter().map(|s| s.to_string()).collect(),
    }
}
