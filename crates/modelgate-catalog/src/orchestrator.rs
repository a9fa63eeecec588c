//! # Fallback Orchestrator
//!
//! Resolves a catalog by trying the preferred category first and then the
//! remaining categories in registry order, each with its own retry budget.
//! The first success wins.
//!
//! A fallback to a non-preferred category is reported to the [`Notifier`]
//! exactly once per resolution. Cancellation short-circuits everything and
//! never notifies.

use std::sync::Arc;

use modelgate_core::{EndpointCategory, ModelDescriptor, Notifier, RetryPolicy};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::endpoints::EndpointRegistry;
use crate::errors::{AggregateFetchError, CatalogError, CatalogResult, CategoryFailure};
use crate::fetcher::{CatalogSource, FetchOutcome};
use crate::normalize::Degradation;
use crate::retry;

/// When a failed category hands over to the next one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EscalationPolicy {
    /// Every failure escalates, including malformed and empty catalogs.
    #[default]
    Always,
    /// Only transient failures escalate. Validation and empty-catalog
    /// failures end the resolution.
    TransientOnly,
}

impl EscalationPolicy {
    /// Policy matching the `escalateOnValidationError` setting.
    pub fn from_setting(escalate_on_validation_error: bool) -> Self {
        if escalate_on_validation_error {
            Self::Always
        } else {
            Self::TransientOnly
        }
    }

    fn escalates(self, err: &CatalogError) -> bool {
        match self {
            Self::Always => true,
            Self::TransientOnly => err.is_transient(),
        }
    }
}

/// A resolved catalog.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Descriptors from the category that succeeded.
    pub descriptors: Vec<ModelDescriptor>,
    /// Category the descriptors came from.
    pub origin: EndpointCategory,
    /// Category that was asked for.
    pub preferred: EndpointCategory,
    /// Entries that were kept in minimal form or dropped as duplicates.
    pub degraded: Vec<Degradation>,
}

impl Resolution {
    /// Whether the descriptors came from a category other than the preferred one.
    pub fn fell_back(&self) -> bool {
        self.origin != self.preferred
    }

    /// Number of degraded entries.
    pub fn degraded_count(&self) -> usize {
        self.degraded.len()
    }
}

/// Drives a [`CatalogSource`] across the endpoint registry.
pub struct CatalogResolver {
    source: Arc<dyn CatalogSource>,
    registry: EndpointRegistry,
    policy: RetryPolicy,
    notifier: Arc<dyn Notifier>,
    escalation: EscalationPolicy,
}

impl CatalogResolver {
    /// Create a resolver with the default retry and escalation policies.
    pub fn new(
        source: Arc<dyn CatalogSource>,
        registry: EndpointRegistry,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            registry,
            policy: RetryPolicy::default(),
            notifier,
            escalation: EscalationPolicy::default(),
        }
    }

    /// Use `policy` for each category's retry budget.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use `escalation` to decide whether failures hand over.
    #[must_use]
    pub fn with_escalation(mut self, escalation: EscalationPolicy) -> Self {
        self.escalation = escalation;
        self
    }

    /// Resolve the catalog starting at `preferred`.
    ///
    /// Returns [`CatalogError::Cancelled`] if `cancel` fires, and
    /// [`CatalogError::Aggregate`] if every attempted category fails.
    pub async fn resolve(
        &self,
        preferred: EndpointCategory,
        credential: &str,
        cancel: &CancellationToken,
    ) -> CatalogResult<Resolution> {
        let first = match self.fetch_category(preferred, credential, cancel).await {
            Ok(outcome) => return Ok(self.resolved(preferred, preferred, outcome)),
            Err(CatalogError::Cancelled) => return Err(CatalogError::Cancelled),
            Err(err) => err,
        };
        let mut escalate = self.escalation.escalates(&first);
        let mut aggregate = AggregateFetchError {
            preferred: CategoryFailure::new(preferred, first),
            subsequent: Vec::new(),
        };

        for category in self.registry.fallback_order(preferred).into_iter().skip(1) {
            if !escalate {
                break;
            }
            info!(from = %preferred, to = %category, "escalating to next catalog category");

            match self.fetch_category(category, credential, cancel).await {
                Ok(outcome) => return Ok(self.resolved(preferred, category, outcome)),
                Err(CatalogError::Cancelled) => return Err(CatalogError::Cancelled),
                Err(err) => {
                    escalate = self.escalation.escalates(&err);
                    aggregate.subsequent.push(CategoryFailure::new(category, err));
                }
            }
        }

        warn!(
            %preferred,
            attempted = aggregate.subsequent.len() + 1,
            root_cause = aggregate.root_cause().kind(),
            "all catalog categories failed"
        );
        Err(aggregate.into())
    }

    fn resolved(
        &self,
        preferred: EndpointCategory,
        origin: EndpointCategory,
        outcome: FetchOutcome,
    ) -> Resolution {
        let resolution = Resolution {
            descriptors: outcome.descriptors,
            origin,
            preferred,
            degraded: outcome.degraded,
        };
        self.announce_fallback(&resolution);
        info!(
            %preferred,
            %origin,
            models = resolution.descriptors.len(),
            degraded = resolution.degraded_count(),
            "catalog resolved"
        );
        resolution
    }

    /// Tell the notifier when `resolution` came from a category other than
    /// the one asked for.
    pub(crate) fn announce_fallback(&self, resolution: &Resolution) {
        if resolution.fell_back() {
            self.notifier.inform(&format!(
                "{} unavailable; using {} instead",
                self.registry.get(resolution.preferred).display_label,
                self.registry.get(resolution.origin).display_label,
            ));
        }
    }

    async fn fetch_category(
        &self,
        category: EndpointCategory,
        credential: &str,
        cancel: &CancellationToken,
    ) -> CatalogResult<FetchOutcome> {
        let endpoint = self.registry.get(category);
        retry::execute(
            |_attempt| self.source.fetch(endpoint, credential),
            &self.policy,
            cancel,
        )
        .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
