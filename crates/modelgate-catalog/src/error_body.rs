//! Excerpts of non-2xx catalog response bodies.
//!
//! Recognized envelopes, tried in order:
//! - Nested:   `{"error": {"message": "..."}}`
//! - Detail:   `{"detail": "..."}`
//! - Flat:     `{"message": "..."}`
//!
//! Anything else falls back to the raw body text.

use serde_json::Value;

/// Maximum number of characters kept from an error body.
pub const MAX_EXCERPT_CHARS: usize = 200;

/// Human-readable excerpt of an error response body.
///
/// Extracts the message from a known JSON envelope when present and truncates
/// the result to [`MAX_EXCERPT_CHARS`] characters, marking the cut with `…`.
pub fn excerpt(body: &str) -> String {
    let message = envelope_message(body).unwrap_or_else(|| body.trim().to_string());
    truncate(&message, MAX_EXCERPT_CHARS)
}

fn envelope_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json["error"]["message"]
        .as_str()
        .or_else(|| json["detail"].as_str())
        .or_else(|| json["message"].as_str())
        .or_else(|| json["error"].as_str())
        .map(String::from)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_error_message() {
        let body = r#"{"error":{"type":"server_error","message":"Upstream unavailable"}}"#;
        assert_eq!(excerpt(body), "Upstream unavailable");
    }

    #[test]
    fn detail_format() {
        assert_eq!(excerpt(r#"{"detail":"Invalid API key"}"#), "Invalid API key");
    }

    #[test]
    fn flat_message_format() {
        let body = r#"{"message":"Rate limited","code":"rate_limit"}"#;
        assert_eq!(excerpt(body), "Rate limited");
    }

    #[test]
    fn string_error_field() {
        assert_eq!(excerpt(r#"{"error":"Unauthorized"}"#), "Unauthorized");
    }

    #[test]
    fn unrecognized_json_keeps_raw_body() {
        assert_eq!(excerpt(r#"{"error":{}}"#), r#"{"error":{}}"#);
    }

    #[test]
    fn non_json_body() {
        assert_eq!(excerpt("Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn empty_body() {
        assert_eq!(excerpt(""), "");
    }

    #[test]
    fn long_body_truncated_with_ellipsis() {
        let body = "x".repeat(500);
        let out = excerpt(&body);
        assert_eq!(out.chars().count(), MAX_EXCERPT_CHARS + 1);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn exact_limit_not_truncated() {
        let body = "y".repeat(MAX_EXCERPT_CHARS);
        assert_eq!(excerpt(&body), body);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "é".repeat(300);
        let out = excerpt(&body);
        assert_eq!(out.chars().count(), MAX_EXCERPT_CHARS + 1);
    }
}
