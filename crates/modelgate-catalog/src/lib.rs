//! # modelgate-catalog
//!
//! Remote model catalog resolution across endpoint categories.
//!
//! - Endpoint registry: `category -> EndpointDescriptor { url, display_label }`
//! - Catalog fetcher: authenticated GET, schema validation, per-entry normalization
//! - Retry executor: bounded exponential backoff with cooperative cancellation
//! - Fallback orchestrator: preferred category first, then the rest in registry order
//! - Single-flight cache keyed by (category, credential fingerprint)
//! - [`CatalogService`]: facade combining the above with the host's ports

#![deny(unsafe_code)]

pub mod cache;
pub mod endpoints;
pub mod error_body;
pub mod errors;
pub mod fetcher;
pub mod normalize;
pub mod orchestrator;
pub mod retry;
pub mod schema;
pub mod service;

pub use cache::CatalogCache;
pub use endpoints::{EndpointDescriptor, EndpointRegistry};
pub use errors::{AggregateFetchError, CatalogError, CatalogResult, CategoryFailure};
pub use fetcher::{CatalogSource, FetchOutcome, HttpCatalogFetcher, parse_catalog};
pub use normalize::{DEFAULT_CONTEXT_LENGTH, DEFAULT_MAX_OUTPUT_TOKENS, Degradation, normalize};
pub use orchestrator::{CatalogResolver, EscalationPolicy, Resolution};
pub use schema::validate_catalog;
pub use service::CatalogService;
