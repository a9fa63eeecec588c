//! # Feature Composer
//!
//! Turns a base model id plus a [`FeatureToggleSnapshot`] into the request
//! augmentation the upstream service expects.
//!
//! Composition is a pure function of its inputs: no I/O, no clocks, no
//! globals. Maps are `BTreeMap`s so two calls with identical inputs
//! serialize to identical bytes.
//!
//! Encoding rules:
//! - Search and memory are suffix tokens, always search first then memory
//!   (upstream parses suffixes left to right).
//! - Reasoning is a `reasoning` body field.
//! - BYOK is the `x-use-byok` header plus a `byok` body field.

use std::collections::BTreeMap;

use modelgate_core::ValidationError;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::toggles::{FeatureToggleSnapshot, SearchMode, ToggleOverride};

/// Memory retention upstream applies when no day count is given.
pub const MEMORY_DEFAULT_DAYS: u32 = 30;
/// Smallest accepted memory retention.
pub const MEMORY_MIN_DAYS: u32 = 1;
/// Largest accepted memory retention.
pub const MEMORY_MAX_DAYS: u32 = 365;

/// Suffix for standard web search.
pub const ONLINE_SUFFIX: &str = ":online";
/// Suffix for deep web search.
pub const DEEP_SEARCH_SUFFIX: &str = ":online/linkup-deep";
/// Suffix for memory with the default retention.
pub const MEMORY_SUFFIX: &str = ":memory";
/// Header enabling bring-your-own-key routing.
pub const BYOK_HEADER: &str = "x-use-byok";

/// Body field carrying reasoning settings.
pub const REASONING_FIELD: &str = "reasoning";
/// Body field carrying BYOK settings.
pub const BYOK_FIELD: &str = "byok";

/// Request fragment produced by [`compose`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedRequest {
    /// Model id the caller asked for.
    pub base_id: String,
    /// Suffix tokens appended to `base_id` (e.g. `":online:memory"`).
    pub suffix: String,
    /// Extra request headers; keys are unique.
    pub headers: BTreeMap<String, String>,
    /// Extra top-level body fields.
    pub body_fields: BTreeMap<String, Value>,
}

impl ComposedRequest {
    /// The model id to send upstream: `base_id` followed by `suffix`.
    pub fn model(&self) -> String {
        format!("{}{}", self.base_id, self.suffix)
    }

    /// Whether no augmentation was produced.
    pub fn is_plain(&self) -> bool {
        self.suffix.is_empty() && self.headers.is_empty() && self.body_fields.is_empty()
    }

    /// Merge into an outgoing chat-completion body.
    ///
    /// Sets `model` and inserts every body field, replacing existing keys.
    pub fn apply_to_body(&self, body: &mut Map<String, Value>) {
        let _ = body.insert("model".to_string(), Value::String(self.model()));
        for (key, value) in &self.body_fields {
            let _ = body.insert(key.clone(), value.clone());
        }
    }
}

/// Compose `base_id` with `toggles`, applying `overrides` first.
///
/// Every field is validated before any token is emitted; on error nothing is
/// produced.
pub fn compose(
    base_id: &str,
    toggles: &FeatureToggleSnapshot,
    overrides: Option<&ToggleOverride>,
) -> Result<ComposedRequest, ValidationError> {
    let effective = match overrides {
        Some(o) => toggles.with_override(o),
        None => toggles.clone(),
    };
    validate(base_id, &effective)?;

    let mut suffix = String::new();
    if effective.search.enabled {
        suffix.push_str(match effective.search.mode {
            SearchMode::Standard => ONLINE_SUFFIX,
            SearchMode::Deep => DEEP_SEARCH_SUFFIX,
        });
    }
    if effective.memory.enabled {
        if effective.memory.days == MEMORY_DEFAULT_DAYS {
            suffix.push_str(MEMORY_SUFFIX);
        } else {
            suffix.push_str(&format!("{MEMORY_SUFFIX}-{}", effective.memory.days));
        }
    }

    let mut headers = BTreeMap::new();
    let mut body_fields = BTreeMap::new();

    if effective.reasoning.enabled {
        let _ = body_fields.insert(
            REASONING_FIELD.to_string(),
            json!({
                "enabled": true,
                "effort": effective.reasoning.effort.as_str(),
            }),
        );
    }
    if effective.byok.enabled {
        let _ = headers.insert(BYOK_HEADER.to_string(), "true".to_string());
        let _ = body_fields.insert(
            BYOK_FIELD.to_string(),
            json!({
                "enabled": true,
                "provider": effective.byok.provider.as_str(),
            }),
        );
    }

    Ok(ComposedRequest {
        base_id: base_id.to_string(),
        suffix,
        headers,
        body_fields,
    })
}

/// Check every composable field. Enumerated fields are already typed, so
/// only free-form values remain to check here.
fn validate(base_id: &str, toggles: &FeatureToggleSnapshot) -> Result<(), ValidationError> {
    if base_id.trim().is_empty() {
        return Err(ValidationError::new(
            "baseId",
            "non-empty model id",
            format!("{base_id:?}"),
        ));
    }
    let days = toggles.memory.days;
    if !(MEMORY_MIN_DAYS..=MEMORY_MAX_DAYS).contains(&days) {
        return Err(ValidationError::new(
            "memory.days",
            format!("integer in [{MEMORY_MIN_DAYS}, {MEMORY_MAX_DAYS}]"),
            days,
        ));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
