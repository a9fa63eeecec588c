//! # Catalog Schema
//!
//! Structural validation of a catalog response body.
//!
//! The upstream document is loosely typed, so every field is checked
//! explicitly and the first mismatch is reported as a [`ValidationError`]
//! naming its path (`data[3].pricing.prompt`). Fields not listed here pass
//! through unchecked.

use modelgate_core::ValidationError;
use serde_json::{Map, Value};

/// Pricing keys that must be numeric when present.
pub const NUMERIC_PRICING_KEYS: &[&str] = &[
    "prompt",
    "completion",
    "request",
    "image",
    "input_cache_read",
    "input_cache_write",
];

/// Allowed values of an entry's `capabilities` array.
pub const CAPABILITY_VOCABULARY: &[&str] = &[
    "vision",
    "tool_calling",
    "reasoning",
    "web_search",
    "structured_output",
    "audio_input",
    "image_output",
];

/// Allowed values of an entry's `features` array.
pub const FEATURE_VOCABULARY: &[&str] = &["online", "memory", "byok", "thinking"];

/// Validate a catalog document and return its `data` entries.
///
/// The document must be an object with a string `object` field and an array
/// `data` field. Emptiness of `data` is not checked here.
pub fn validate_catalog(doc: &Value) -> Result<&[Value], ValidationError> {
    let Some(root) = doc.as_object() else {
        return Err(mismatch("$", "object", doc));
    };
    let _ = require_string(root, "object", "")?;
    let data = match root.get("data") {
        Some(Value::Array(items)) => items.as_slice(),
        Some(other) => return Err(mismatch("data", "array", other)),
        None => return Err(ValidationError::missing("data", "array")),
    };
    for (index, entry) in data.iter().enumerate() {
        validate_entry(entry, &format!("data[{index}]"))?;
    }
    Ok(data)
}

fn validate_entry(entry: &Value, path: &str) -> Result<(), ValidationError> {
    let Some(fields) = entry.as_object() else {
        return Err(mismatch(path, "object", entry));
    };

    let _ = require_string(fields, "id", path)?;
    let _ = require_string(fields, "object", path)?;

    optional(fields, "name", path, Shape::NullableString)?;
    optional(fields, "description", path, Shape::NullableString)?;
    optional(fields, "owned_by", path, Shape::String)?;
    optional(fields, "created", path, Shape::Number)?;
    optional(fields, "context_length", path, Shape::NullableNumber)?;
    optional(fields, "max_output_tokens", path, Shape::NullableNumber)?;
    optional(fields, "vision", path, Shape::NullableBool)?;

    match fields.get("pricing") {
        None | Some(Value::Null) => {}
        Some(Value::Object(pricing)) => {
            let pricing_path = format!("{path}.pricing");
            for key in NUMERIC_PRICING_KEYS {
                optional(pricing, key, &pricing_path, Shape::Number)?;
            }
        }
        Some(other) => return Err(mismatch(&format!("{path}.pricing"), "object or null", other)),
    }

    vocabulary_array(fields, "capabilities", path, CAPABILITY_VOCABULARY)?;
    vocabulary_array(fields, "features", path, FEATURE_VOCABULARY)?;
    Ok(())
}

#[derive(Clone, Copy)]
enum Shape {
    String,
    NullableString,
    Number,
    NullableNumber,
    NullableBool,
}

impl Shape {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::NullableString => value.is_string() || value.is_null(),
            Self::Number => value.is_number(),
            Self::NullableNumber => value.is_number() || value.is_null(),
            Self::NullableBool => value.is_boolean() || value.is_null(),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::NullableString => "string or null",
            Self::Number => "number",
            Self::NullableNumber => "number or null",
            Self::NullableBool => "boolean or null",
        }
    }
}

fn require_string<'a>(
    fields: &'a Map<String, Value>,
    key: &str,
    parent: &str,
) -> Result<&'a str, ValidationError> {
    let path = join(parent, key);
    match fields.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(mismatch(&path, "string", other)),
        None => Err(ValidationError::missing(path, "string")),
    }
}

fn optional(
    fields: &Map<String, Value>,
    key: &str,
    parent: &str,
    shape: Shape,
) -> Result<(), ValidationError> {
    match fields.get(key) {
        Some(value) if !shape.accepts(value) => {
            Err(mismatch(&join(parent, key), shape.expected(), value))
        }
        _ => Ok(()),
    }
}

fn vocabulary_array(
    fields: &Map<String, Value>,
    key: &str,
    parent: &str,
    vocabulary: &[&str],
) -> Result<(), ValidationError> {
    let path = join(parent, key);
    let items = match fields.get(key) {
        None => return Ok(()),
        Some(Value::Array(items)) => items,
        Some(other) => return Err(mismatch(&path, "array of strings", other)),
    };
    for (index, item) in items.iter().enumerate() {
        let item_path = format!("{path}[{index}]");
        match item.as_str() {
            Some(s) if vocabulary.contains(&s) => {}
            Some(s) => {
                return Err(ValidationError::new(
                    item_path,
                    format!("one of {}", vocabulary.join(", ")),
                    format!("{s:?}"),
                ));
            }
            None => return Err(mismatch(&item_path, "string", item)),
        }
    }
    Ok(())
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn mismatch(path: &str, expected: &str, found: &Value) -> ValidationError {
    ValidationError::new(path, expected, kind_of(found))
}

/// JSON type name of `value`, as used in validation messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
