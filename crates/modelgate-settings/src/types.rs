//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]`. Each type implements
//! [`Default`] with production default values, and `#[serde(default)]`
//! allows partial JSON: missing fields get their default value.

use modelgate_compose::{FeatureToggleSnapshot, compose};
use modelgate_core::{EndpointCategory, RetryPolicy, ValidationError};
use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// Loaded from `~/.modelgate/settings.json` with defaults applied for
/// missing fields. Environment variables can override specific values.
///
/// # JSON Format
///
/// ```json
/// {
///   "catalog": { "preferredCategory": "subscription" },
///   "retry": { "maxAttempts": 5 },
///   "features": { "search": { "enabled": true, "mode": "deep" } }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelgateSettings {
    /// Catalog endpoint settings.
    pub catalog: CatalogSettings,
    /// Retry policy applied per endpoint category.
    pub retry: RetryPolicy,
    /// Default feature toggles used when composing requests.
    pub features: FeatureToggleSnapshot,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl ModelgateSettings {
    /// Check cross-field invariants that `serde` cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.retry.validate()?;
        self.catalog.validate()?;
        // Composing against a placeholder id runs the composer's own checks.
        let _ = compose("settings", &self.features, None).map_err(|e| ValidationError {
            path: format!("features.{}", e.path),
            ..e
        })?;
        Ok(())
    }
}

/// Catalog endpoint settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSettings {
    /// Scheme and host of the upstream service.
    pub base_url: String,
    /// Value of the client-identifier header.
    pub client_id: String,
    /// Category tried first when resolving the catalog.
    pub preferred_category: EndpointCategory,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// How long a resolved catalog is reused, in milliseconds.
    pub cache_ttl_ms: u64,
    /// Whether a malformed or empty catalog escalates to the next category.
    pub escalate_on_validation_error: bool,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: "https://nano-gpt.com".to_string(),
            client_id: "modelgate".to_string(),
            preferred_category: EndpointCategory::All,
            request_timeout_ms: 30_000,
            cache_ttl_ms: 300_000,
            escalate_on_validation_error: true,
        }
    }
}

impl CatalogSettings {
    fn validate(&self) -> Result<(), ValidationError> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ValidationError::new(
                "catalog.baseUrl",
                "http(s) URL",
                format!("{:?}", self.base_url),
            ));
        }
        if self.client_id.trim().is_empty() {
            return Err(ValidationError::new(
                "catalog.clientId",
                "non-empty string",
                "\"\"",
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(ValidationError::new(
                "catalog.requestTimeoutMs",
                "integer > 0",
                0,
            ));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level for the stderr subscriber.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
