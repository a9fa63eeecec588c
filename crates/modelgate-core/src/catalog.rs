//! # Catalog Types
//!
//! Shared types describing a fetched model catalog. Descriptors are created
//! fresh on every fetch and never mutated afterwards; a newer fetch result
//! replaces the whole list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Provenance tier of a catalog endpoint.
///
/// The declaration order is the fallback priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointCategory {
    /// Every model the platform offers.
    All,
    /// Pay-per-use premium models.
    Premium,
    /// Models included in the user's subscription.
    Subscription,
}

impl EndpointCategory {
    /// All categories in fallback priority order.
    pub const ALL: [Self; 3] = [Self::All, Self::Premium, Self::Subscription];

    /// String label for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Premium => "premium",
            Self::Subscription => "subscription",
        }
    }
}

impl fmt::Display for EndpointCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndpointCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "premium" => Ok(Self::Premium),
            "subscription" => Ok(Self::Subscription),
            _ => Err(ValidationError::new(
                "category",
                "one of all, premium, subscription",
                format!("{s:?}"),
            )),
        }
    }
}

/// Capability flags derived during normalization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCapabilities {
    /// Supports tool calling. Guaranteed by the upstream contract.
    pub tool_calling: bool,
    /// Accepts image inputs.
    pub image_input: bool,
}

/// Upstream pricing object, preserved verbatim.
pub type Pricing = serde_json::Map<String, serde_json::Value>;

/// A normalized model entry from one catalog fetch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// API model ID, unique within one fetch result.
    pub id: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Context window size in tokens.
    pub context_length: u64,
    /// Maximum output tokens.
    pub max_output_tokens: u64,
    /// Derived capability flags.
    pub capabilities: ModelCapabilities,
    /// Upstream pricing, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    /// Category of the endpoint this descriptor was fetched from.
    pub category: EndpointCategory,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_order_is_fallback_order() {
        let mut sorted = EndpointCategory::ALL;
        sorted.sort();
        assert_eq!(sorted, EndpointCategory::ALL);
        assert_eq!(EndpointCategory::ALL[0], EndpointCategory::All);
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!("Premium".parse::<EndpointCategory>().unwrap(), EndpointCategory::Premium);
        assert_eq!(
            " subscription ".parse::<EndpointCategory>().unwrap(),
            EndpointCategory::Subscription
        );
    }

    #[test]
    fn category_parse_rejects_unknown() {
        let err = "free".parse::<EndpointCategory>().unwrap_err();
        assert_eq!(err.path, "category");
        assert!(err.found.contains("free"));
    }

    #[test]
    fn category_serde_lowercase() {
        let json = serde_json::to_string(&EndpointCategory::Premium).unwrap();
        assert_eq!(json, "\"premium\"");
        let back: EndpointCategory = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(back, EndpointCategory::All);
    }

    #[test]
    fn descriptor_skips_absent_pricing() {
        let descriptor = ModelDescriptor {
            id: "gpt-4o".into(),
            display_name: "GPT-4o".into(),
            context_length: 128_000,
            max_output_tokens: 4096,
            capabilities: ModelCapabilities {
                tool_calling: true,
                image_input: true,
            },
            pricing: None,
            category: EndpointCategory::All,
        };
        let json = serde_json::to_value(&descriptor).unwrap();
        assert!(json.get("pricing").is_none());
        assert_eq!(json["displayName"], "GPT-4o");
        assert_eq!(json["capabilities"]["imageInput"], true);
        assert_eq!(json["category"], "all");
    }
}
