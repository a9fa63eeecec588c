//! # modelgate-settings
//!
//! Configuration snapshot with layered sources.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`ModelgateSettings::default()`]
//! 2. **User file**: `~/.modelgate/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `MODELGATE_*` overrides (highest priority)
//!
//! The loaded value is an immutable snapshot. There is no global instance:
//! the host loads it once and passes it to the catalog service and composer.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, deep_merge, load_settings, load_settings_from_path, load_settings_with,
    settings_path,
};
pub use types::{CatalogSettings, LoggingSettings, ModelgateSettings};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
