//! # Model Normalizer
//!
//! Turns one validated catalog entry into a [`ModelDescriptor`].
//!
//! Normalization never fails. An entry whose lengths cannot be used (fraction,
//! negative, zero, out of range) becomes a minimal descriptor with defaults,
//! and the reason is returned alongside it as a [`Degradation`] so the caller
//! can count and report it.

use modelgate_core::{EndpointCategory, ModelCapabilities, ModelDescriptor};
use serde::Serialize;
use serde_json::Value;

/// Context window assumed when the catalog does not state one.
pub const DEFAULT_CONTEXT_LENGTH: u64 = 128_000;

/// Output token limit assumed when the catalog does not state one.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u64 = 4_096;

/// A catalog entry that was kept in minimal form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Degradation {
    /// ID of the degraded entry.
    pub model_id: String,
    /// Why the full descriptor could not be built.
    pub reason: String,
}

/// Result of normalizing one entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Normalized {
    /// The descriptor, full or minimal.
    pub descriptor: ModelDescriptor,
    /// Present when `descriptor` is the minimal fallback.
    pub degradation: Option<Degradation>,
}

/// Normalize a raw catalog entry fetched from `category`.
pub fn normalize(entry: &Value, category: EndpointCategory) -> Normalized {
    let id = entry
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match full_descriptor(entry, &id, category) {
        Ok(descriptor) => Normalized {
            descriptor,
            degradation: None,
        },
        Err(reason) => {
            tracing::warn!(model_id = %id, %category, %reason, "degraded catalog entry");
            Normalized {
                descriptor: minimal_descriptor(id.clone(), category),
                degradation: Some(Degradation {
                    model_id: id,
                    reason,
                }),
            }
        }
    }
}

fn full_descriptor(
    entry: &Value,
    id: &str,
    category: EndpointCategory,
) -> Result<ModelDescriptor, String> {
    let display_name = entry
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(id)
        .to_string();

    let context_length = length(entry, "context_length")?.unwrap_or(DEFAULT_CONTEXT_LENGTH);
    let max_output_tokens =
        length(entry, "max_output_tokens")?.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS);

    let pricing = match entry.get("pricing") {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map.clone()),
        Some(_) => return Err("pricing is not an object".to_string()),
    };

    Ok(ModelDescriptor {
        id: id.to_string(),
        display_name,
        context_length,
        max_output_tokens,
        capabilities: ModelCapabilities {
            tool_calling: true,
            image_input: has_vision(entry),
        },
        pricing,
        category,
    })
}

fn minimal_descriptor(id: String, category: EndpointCategory) -> ModelDescriptor {
    ModelDescriptor {
        display_name: id.clone(),
        id,
        context_length: DEFAULT_CONTEXT_LENGTH,
        max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        capabilities: ModelCapabilities {
            tool_calling: true,
            image_input: false,
        },
        pricing: None,
        category,
    }
}

/// A positive integral token count, `None` when absent or null.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn length(entry: &Value, key: &str) -> Result<Option<u64>, String> {
    let Some(value) = entry.get(key).filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let Value::Number(number) = value else {
        return Err(format!("{key} is not a number"));
    };
    if let Some(n) = number.as_u64() {
        return if n == 0 {
            Err(format!("{key} is zero"))
        } else {
            Ok(Some(n))
        };
    }
    if number.as_i64().is_some() {
        return Err(format!("{key} is negative"));
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f > 0.0 && f <= 9_007_199_254_740_992.0 => {
            Ok(Some(f as u64))
        }
        Some(f) if f <= 0.0 => Err(format!("{key} is not positive ({f})")),
        Some(f) => Err(format!("{key} is not an integer ({f})")),
        None => Err(format!("{key} is out of range")),
    }
}

fn has_vision(entry: &Value) -> bool {
    let flag = entry.get("vision").and_then(Value::as_bool) == Some(true);
    let listed = entry
        .get("capabilities")
        .and_then(Value::as_array)
        .is_some_and(|caps| caps.iter().any(|c| c.as_str() == Some("vision")));
    flag || listed
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CAT: EndpointCategory = EndpointCategory::Premium;

    #[test]
    fn defaults_fill_missing_lengths() {
        let out = normalize(&json!({ "id": "m", "object": "model" }), CAT);
        assert!(out.degradation.is_none());
        let d = out.descriptor;
        assert_eq!(d.context_length, DEFAULT_CONTEXT_LENGTH);
        assert_eq!(d.max_output_tokens, DEFAULT_MAX_OUTPUT_TOKENS);
        assert_eq!(d.display_name, "m");
        assert_eq!(d.category, CAT);
        assert!(d.capabilities.tool_calling);
        assert!(!d.capabilities.image_input);
        assert!(d.pricing.is_none());
    }

    #[test]
    fn null_lengths_use_defaults() {
        let entry = json!({ "id": "m", "object": "model", "context_length": null, "max_output_tokens": null });
        let d = normalize(&entry, CAT).descriptor;
        assert_eq!(d.context_length, DEFAULT_CONTEXT_LENGTH);
        assert_eq!(d.max_output_tokens, DEFAULT_MAX_OUTPUT_TOKENS);
    }

    #[test]
    fn stated_values_preserved() {
        let entry = json!({
            "id": "gpt-4o", "object": "model", "name": "GPT-4o",
            "context_length": 200_000, "max_output_tokens": 16_384.0,
            "pricing": { "prompt": 2.5, "completion": 10, "currency": "USD" }
        });
        let d = normalize(&entry, CAT).descriptor;
        assert_eq!(d.display_name, "GPT-4o");
        assert_eq!(d.context_length, 200_000);
        assert_eq!(d.max_output_tokens, 16_384);
        let pricing = d.pricing.unwrap();
        assert_eq!(pricing["prompt"], json!(2.5));
        assert_eq!(pricing["currency"], json!("USD"));
    }

    #[test]
    fn blank_name_falls_back_to_id() {
        let d = normalize(&json!({ "id": "m", "object": "model", "name": "  " }), CAT).descriptor;
        assert_eq!(d.display_name, "m");
    }

    #[test]
    fn vision_flag_sets_image_input() {
        let d = normalize(&json!({ "id": "m", "object": "model", "vision": true }), CAT).descriptor;
        assert!(d.capabilities.image_input);
    }

    #[test]
    fn vision_capability_sets_image_input() {
        let entry = json!({ "id": "m", "object": "model", "vision": null, "capabilities": ["vision"] });
        assert!(normalize(&entry, CAT).descriptor.capabilities.image_input);
    }

    #[test]
    fn vision_false_stays_false() {
        let entry = json!({ "id": "m", "object": "model", "vision": false, "capabilities": ["reasoning"] });
        assert!(!normalize(&entry, CAT).descriptor.capabilities.image_input);
    }

    // ── Degradation ─────────────────────────────────────────────────────

    #[test]
    fn fractional_length_degrades() {
        let entry = json!({
            "id": "odd", "object": "model", "name": "Odd", "vision": true,
            "context_length": 1000.5, "pricing": { "prompt": 1 }
        });
        let out = normalize(&entry, CAT);
        let degradation = out.degradation.unwrap();
        assert_eq!(degradation.model_id, "odd");
        assert!(degradation.reason.contains("context_length"));

        let d = out.descriptor;
        assert_eq!(d.id, "odd");
        assert_eq!(d.display_name, "odd");
        assert_eq!(d.context_length, DEFAULT_CONTEXT_LENGTH);
        assert!(!d.capabilities.image_input);
        assert!(d.pricing.is_none());
        assert_eq!(d.category, CAT);
    }

    #[test]
    fn negative_length_degrades() {
        let out = normalize(&json!({ "id": "n", "object": "model", "max_output_tokens": -1 }), CAT);
        assert!(out.degradation.unwrap().reason.contains("negative"));
    }

    #[test]
    fn zero_length_degrades() {
        let out = normalize(&json!({ "id": "z", "object": "model", "context_length": 0 }), CAT);
        assert!(out.degradation.unwrap().reason.contains("zero"));
    }

    #[test]
    fn unvalidated_garbage_never_panics() {
        let out = normalize(&json!("not an object"), CAT);
        assert_eq!(out.descriptor.id, "");
        assert!(out.degradation.is_none());

        let out = normalize(&json!({ "id": "p", "pricing": [1, 2] }), CAT);
        assert!(out.degradation.is_some());
    }
}
