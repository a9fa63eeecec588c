//! # Feature Toggles
//!
//! Immutable snapshot of the user's capability toggles, plus the per-call
//! override that can replace any of its fields.
//!
//! Enumerated values parse through [`FromStr`] (and `serde` via
//! `TryFrom<String>`), so an unknown effort, mode or provider is reported as
//! a [`ValidationError`] before the composer ever sees it.

use std::fmt;
use std::str::FromStr;

use modelgate_core::ValidationError;
use serde::{Deserialize, Serialize};

use crate::composer::MEMORY_DEFAULT_DAYS;

// ─────────────────────────────────────────────────────────────────────────────
// Enumerated values
// ─────────────────────────────────────────────────────────────────────────────

/// Reasoning effort level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ReasoningEffort {
    /// Low reasoning effort.
    Low,
    /// Medium reasoning effort.
    #[default]
    Medium,
    /// High reasoning effort.
    High,
}

impl ReasoningEffort {
    /// String label sent upstream.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for ReasoningEffort {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ValidationError::new(
                "reasoning.effort",
                "one of low, medium, high",
                format!("{s:?}"),
            )),
        }
    }
}

/// Web search depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SearchMode {
    /// Standard web search (`:online`).
    #[default]
    Standard,
    /// Deep web search (`:online/linkup-deep`).
    Deep,
}

impl SearchMode {
    /// String label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Deep => "deep",
        }
    }
}

impl FromStr for SearchMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "deep" => Ok(Self::Deep),
            _ => Err(ValidationError::new(
                "search.mode",
                "one of standard, deep",
                format!("{s:?}"),
            )),
        }
    }
}

/// Third-party provider used for bring-your-own-key routing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ByokProvider {
    /// `OpenAI`.
    #[default]
    Openai,
    /// Anthropic.
    Anthropic,
    /// Google.
    Google,
}

impl ByokProvider {
    /// String label sent upstream.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Openai => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
        }
    }
}

impl FromStr for ByokProvider {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Self::Openai),
            "anthropic" => Ok(Self::Anthropic),
            "google" => Ok(Self::Google),
            _ => Err(ValidationError::new(
                "byok.provider",
                "one of openai, anthropic, google",
                format!("{s:?}"),
            )),
        }
    }
}

macro_rules! string_conversions {
    ($($ty:ty),+) => {$(
        impl TryFrom<String> for $ty {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    )+};
}

string_conversions!(ReasoningEffort, SearchMode, ByokProvider);

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot
// ─────────────────────────────────────────────────────────────────────────────

/// Extended reasoning toggle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReasoningToggle {
    /// Whether reasoning is requested.
    pub enabled: bool,
    /// Requested effort.
    pub effort: ReasoningEffort,
}

/// Persistent memory toggle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryToggle {
    /// Whether memory is requested.
    pub enabled: bool,
    /// Retention in days, 1 to 365.
    pub days: u32,
}

impl Default for MemoryToggle {
    fn default() -> Self {
        Self {
            enabled: false,
            days: MEMORY_DEFAULT_DAYS,
        }
    }
}

/// Web search toggle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchToggle {
    /// Whether web search is requested.
    pub enabled: bool,
    /// Search depth.
    pub mode: SearchMode,
}

/// Bring-your-own-key toggle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ByokToggle {
    /// Whether requests route through the user's own provider key.
    pub enabled: bool,
    /// Provider whose key is used.
    pub provider: ByokProvider,
}

/// Read-only snapshot of all capability toggles.
///
/// Supplied by the caller per composition call; the composer never writes it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureToggleSnapshot {
    /// Extended reasoning.
    pub reasoning: ReasoningToggle,
    /// Persistent memory.
    pub memory: MemoryToggle,
    /// Web search.
    pub search: SearchToggle,
    /// Bring-your-own-key routing.
    pub byok: ByokToggle,
}

// ─────────────────────────────────────────────────────────────────────────────
// Override
// ─────────────────────────────────────────────────────────────────────────────

/// Per-call override of [`ReasoningToggle`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReasoningOverride {
    /// Replaces `reasoning.enabled` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Replaces `reasoning.effort` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<ReasoningEffort>,
}

/// Per-call override of [`MemoryToggle`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryOverride {
    /// Replaces `memory.enabled` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Replaces `memory.days` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

/// Per-call override of [`SearchToggle`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchOverride {
    /// Replaces `search.enabled` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Replaces `search.mode` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<SearchMode>,
}

/// Per-call override of [`ByokToggle`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ByokOverride {
    /// Replaces `byok.enabled` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Replaces `byok.provider` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ByokProvider>,
}

/// Field-by-field override applied on top of a [`FeatureToggleSnapshot`].
///
/// Absent fields fall through to the snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToggleOverride {
    /// Reasoning overrides.
    pub reasoning: ReasoningOverride,
    /// Memory overrides.
    pub memory: MemoryOverride,
    /// Search overrides.
    pub search: SearchOverride,
    /// BYOK overrides.
    pub byok: ByokOverride,
}

impl ToggleOverride {
    /// Whether no field is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl FeatureToggleSnapshot {
    /// A new snapshot with `overrides` applied field by field.
    #[must_use]
    pub fn with_override(&self, overrides: &ToggleOverride) -> Self {
        Self {
            reasoning: ReasoningToggle {
                enabled: overrides.reasoning.enabled.unwrap_or(self.reasoning.enabled),
                effort: overrides.reasoning.effort.unwrap_or(self.reasoning.effort),
            },
            memory: MemoryToggle {
                enabled: overrides.memory.enabled.unwrap_or(self.memory.enabled),
                days: overrides.memory.days.unwrap_or(self.memory.days),
            },
            search: SearchToggle {
                enabled: overrides.search.enabled.unwrap_or(self.search.enabled),
                mode: overrides.search.mode.unwrap_or(self.search.mode),
            },
            byok: ByokToggle {
                enabled: overrides.byok.enabled.unwrap_or(self.byok.enabled),
                provider: overrides.byok.provider.unwrap_or(self.byok.provider),
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
