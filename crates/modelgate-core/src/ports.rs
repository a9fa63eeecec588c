//! # Collaborator Ports
//!
//! Capabilities the host application provides to the core. Catalog and
//! composition logic only ever talks to these traits, never to a concrete
//! secret store or UI, so tests can run fully offline.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

/// Whether a credential lookup may interact with the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptMode {
    /// Return a stored credential or nothing; never prompt.
    Silent,
    /// Prompt through the host's interactive flow when nothing is stored.
    Interactive,
}

/// Source of the bearer token used for catalog requests.
#[async_trait]
pub trait CredentialAccessor: Send + Sync {
    /// Get the credential, or `None` when none is available.
    async fn get(&self, mode: PromptMode) -> Option<String>;
}

/// Sink for user-facing informational messages.
pub trait Notifier: Send + Sync {
    /// Inform the user.
    fn inform(&self, message: &str);
}

// ─────────────────────────────────────────────────────────────────────────────
// Credential accessors
// ─────────────────────────────────────────────────────────────────────────────

/// A fixed credential, mostly useful in tests and scripts.
#[derive(Clone, Debug, Default)]
pub struct StaticCredential(Option<String>);

impl StaticCredential {
    /// Accessor that always yields `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// Accessor that never yields a token.
    pub fn absent() -> Self {
        Self(None)
    }
}

#[async_trait]
impl CredentialAccessor for StaticCredential {
    async fn get(&self, _mode: PromptMode) -> Option<String> {
        self.0.clone()
    }
}

/// Reads the credential from an environment variable on every lookup.
#[derive(Clone, Debug)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    /// Accessor backed by the environment variable `var`.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl CredentialAccessor for EnvCredential {
    async fn get(&self, _mode: PromptMode) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

#[async_trait]
impl<T: CredentialAccessor + ?Sized> CredentialAccessor for Arc<T> {
    async fn get(&self, mode: PromptMode) -> Option<String> {
        (**self).get(mode).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Notifiers
// ─────────────────────────────────────────────────────────────────────────────

/// Forwards notifications to the `tracing` subscriber at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn inform(&self, message: &str) {
        tracing::info!(target: "modelgate::notify", "{message}");
    }
}

/// Keeps every notification in memory for later assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages received so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Number of messages received.
    pub fn count(&self) -> usize {
        self.messages.lock().len()
    }
}

impl Notifier for RecordingNotifier {
    fn inform(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
