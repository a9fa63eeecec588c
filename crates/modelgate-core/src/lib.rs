//! # modelgate-core
//!
//! Foundation types, errors, and collaborator ports shared by the modelgate crates.
//!
//! This crate provides the shared vocabulary that the catalog, composer and
//! settings crates depend on:
//!
//! - **Catalog types**: [`EndpointCategory`], [`ModelDescriptor`], [`ModelCapabilities`]
//! - **Validation**: [`ValidationError`] naming the offending field path
//! - **Retry**: [`RetryPolicy`] and the backoff schedule it implies
//! - **Ports**: [`CredentialAccessor`] and [`Notifier`], implemented by the host
//! - **Logging**: [`logging::init_subscriber`] for the `tracing` stderr subscriber

#![deny(unsafe_code)]

pub mod catalog;
pub mod errors;
pub mod logging;
pub mod ports;
pub mod retry;

pub use catalog::{EndpointCategory, ModelCapabilities, ModelDescriptor, Pricing};
pub use errors::ValidationError;
pub use ports::{
    CredentialAccessor, EnvCredential, Notifier, PromptMode, RecordingNotifier, StaticCredential,
    TracingNotifier,
};
pub use retry::RetryPolicy;
