//! # modelgate-compose
//!
//! Pure mapping from a base model id and a set of orthogonal capability
//! toggles (reasoning, memory, web search, BYOK) to the model-id suffix,
//! headers and body fields the upstream service expects.
//!
//! ```ignore
//! let composed = compose("gpt-4o", &toggles, None)?;
//! assert_eq!(composed.model(), "gpt-4o:online:memory");
//! ```

#![deny(unsafe_code)]

pub mod composer;
pub mod toggles;

pub use composer::{
    BYOK_HEADER, ComposedRequest, MEMORY_DEFAULT_DAYS, MEMORY_MAX_DAYS, MEMORY_MIN_DAYS, compose,
};
pub use toggles::{
    ByokOverride, ByokProvider, ByokToggle, FeatureToggleSnapshot, MemoryOverride, MemoryToggle,
    ReasoningEffort, ReasoningOverride, ReasoningToggle, SearchMode, SearchOverride, SearchToggle,
    ToggleOverride,
};
