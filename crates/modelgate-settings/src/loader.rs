//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ModelgateSettings::default()`]
//! 2. If `~/.modelgate/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use modelgate_core::EndpointCategory;
use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::ModelgateSettings;

/// Resolve the path to the settings file (`~/.modelgate/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".modelgate").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ModelgateSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON or an out-of-range value, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<ModelgateSettings> {
    load_settings_with(path, |name| std::env::var(name).ok())
}

/// Load settings from `path`, reading overrides through `env`.
pub fn load_settings_with<F>(path: &Path, env: F) -> Result<ModelgateSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = serde_json::to_value(ModelgateSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: ModelgateSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings, env);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// `env` looks a variable up by name. Invalid values are ignored with a
/// warning (fall back to file/default).
pub fn apply_env_overrides<F>(settings: &mut ModelgateSettings, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read_string = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    // ── Catalog settings ────────────────────────────────────────────
    if let Some(v) = read_string("MODELGATE_BASE_URL") {
        settings.catalog.base_url = v;
    }
    if let Some(v) = read_string("MODELGATE_CLIENT_ID") {
        settings.catalog.client_id = v;
    }
    if let Some(v) = read_string("MODELGATE_CATEGORY") {
        match v.parse::<EndpointCategory>() {
            Ok(category) => settings.catalog.preferred_category = category,
            Err(_) => warn_invalid("MODELGATE_CATEGORY", &v),
        }
    }
    if let Some(v) = read_string("MODELGATE_TIMEOUT_MS") {
        match parse_u64_range(&v, 100, 600_000) {
            Some(n) => settings.catalog.request_timeout_ms = n,
            None => warn_invalid("MODELGATE_TIMEOUT_MS", &v),
        }
    }

    // ── Retry settings ──────────────────────────────────────────────
    if let Some(v) = read_string("MODELGATE_MAX_ATTEMPTS") {
        match parse_u32_range(&v, 1, 20) {
            Some(n) => settings.retry.max_attempts = n,
            None => warn_invalid("MODELGATE_MAX_ATTEMPTS", &v),
        }
    }
    if let Some(v) = read_string("MODELGATE_BASE_DELAY_MS") {
        match parse_u64_range(&v, 1, 60_000) {
            Some(n) => settings.retry.base_delay_ms = n,
            None => warn_invalid("MODELGATE_BASE_DELAY_MS", &v),
        }
    }

    // ── Logging settings ────────────────────────────────────────────
    if let Some(v) = read_string("MODELGATE_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_string("MODELGATE_LOG_JSON") {
        match parse_bool(&v) {
            Some(b) => settings.logging.json = b,
            None => warn_invalid("MODELGATE_LOG_JSON", &v),
        }
    }
}

fn warn_invalid(key: &str, value: &str) {
    tracing::warn!(key, value, "invalid env var, ignoring");
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
