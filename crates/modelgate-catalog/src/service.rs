//! Catalog service facade.
//!
//! Wires the settings snapshot, credential accessor and notifier into a
//! cached [`CatalogResolver`], and exposes the two produced operations:
//! catalog resolution and request composition.

use std::sync::Arc;
use std::time::Duration;

use modelgate_compose::{ComposedRequest, ToggleOverride, compose};
use modelgate_core::{CredentialAccessor, EndpointCategory, Notifier, PromptMode, ValidationError};
use modelgate_settings::ModelgateSettings;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::CatalogCache;
use crate::endpoints::EndpointRegistry;
use crate::errors::{CatalogError, CatalogResult};
use crate::fetcher::{CatalogSource, HttpCatalogFetcher};
use crate::orchestrator::{CatalogResolver, EscalationPolicy, Resolution};

/// Entry point for hosts.
pub struct CatalogService {
    settings: Arc<ModelgateSettings>,
    credentials: Arc<dyn CredentialAccessor>,
    cache: CatalogCache,
    allow_prompt: bool,
}

impl CatalogService {
    /// Build a service that fetches over HTTP.
    pub fn new(
        settings: Arc<ModelgateSettings>,
        credentials: Arc<dyn CredentialAccessor>,
        notifier: Arc<dyn Notifier>,
    ) -> CatalogResult<Self> {
        let fetcher = HttpCatalogFetcher::new(
            settings.catalog.client_id.clone(),
            Duration::from_millis(settings.catalog.request_timeout_ms),
        )?;
        Ok(Self::with_source(
            settings,
            credentials,
            notifier,
            Arc::new(fetcher),
        ))
    }

    /// Build a service around any [`CatalogSource`].
    pub fn with_source(
        settings: Arc<ModelgateSettings>,
        credentials: Arc<dyn CredentialAccessor>,
        notifier: Arc<dyn Notifier>,
        source: Arc<dyn CatalogSource>,
    ) -> Self {
        let resolver = CatalogResolver::new(
            source,
            EndpointRegistry::new(&settings.catalog.base_url),
            notifier,
        )
        .with_retry_policy(settings.retry.clone())
        .with_escalation(EscalationPolicy::from_setting(
            settings.catalog.escalate_on_validation_error,
        ));
        let cache = CatalogCache::new(
            Arc::new(resolver),
            Duration::from_millis(settings.catalog.cache_ttl_ms),
        );
        Self {
            settings,
            credentials,
            cache,
            allow_prompt: true,
        }
    }

    /// Whether the credential accessor may prompt interactively.
    #[must_use]
    pub fn allow_prompt(mut self, allow: bool) -> Self {
        self.allow_prompt = allow;
        self
    }

    /// The settings snapshot this service was built with.
    pub fn settings(&self) -> &ModelgateSettings {
        &self.settings
    }

    /// Resolve the catalog, starting at `category` or the configured default.
    pub async fn resolve_catalog(
        &self,
        category: Option<EndpointCategory>,
        cancel: &CancellationToken,
    ) -> CatalogResult<Arc<Resolution>> {
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }
        let preferred = category.unwrap_or(self.settings.catalog.preferred_category);
        let credential = self.credential().await?;
        self.cache.get_or_resolve(preferred, &credential, cancel).await
    }

    /// Compose a request for `base_id` from the configured toggles.
    pub fn compose_request(
        &self,
        base_id: &str,
        overrides: Option<&ToggleOverride>,
    ) -> Result<ComposedRequest, ValidationError> {
        compose(base_id, &self.settings.features, overrides)
    }

    /// Forget cached catalogs for `category`.
    pub fn invalidate(&self, category: EndpointCategory) {
        self.cache.invalidate(category);
    }

    async fn credential(&self) -> CatalogResult<String> {
        if let Some(token) = self.credentials.get(PromptMode::Silent).await {
            return Ok(token);
        }
        if self.allow_prompt {
            debug!("no stored credential, prompting");
            if let Some(token) = self.credentials.get(PromptMode::Interactive).await {
                return Ok(token);
            }
        }
        Err(CatalogError::MissingCredential)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::EndpointDescriptor;
    use crate::fetcher::FetchOutcome;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use modelgate_compose::{SearchMode, SearchOverride};
    use modelgate_core::{RecordingNotifier, StaticCredential};
    use parking_lot::Mutex;

    /// Source that records the category and credential of every call.
    #[derive(Default)]
    struct RecordingSource {
        calls: Mutex<Vec<(EndpointCategory, String)>>,
    }

    #[async_trait]
    impl CatalogSource for RecordingSource {
        async fn fetch(
            &self,
            endpoint: &EndpointDescriptor,
            credential: &str,
        ) -> CatalogResult<FetchOutcome> {
            self.calls
                .lock()
                .push((endpoint.category, credential.to_string()));
            Ok(FetchOutcome {
                descriptors: Vec::new(),
                degraded: Vec::new(),
            })
        }
    }

    /// Accessor that only answers interactive requests.
    struct PromptOnly {
        modes: Mutex<Vec<PromptMode>>,
    }

    #[async_trait]
    impl CredentialAccessor for PromptOnly {
        async fn get(&self, mode: PromptMode) -> Option<String> {
            self.modes.lock().push(mode);
            (mode == PromptMode::Interactive).then(|| "sk-prompted".to_string())
        }
    }

    fn service(
        credentials: Arc<dyn CredentialAccessor>,
        source: Arc<RecordingSource>,
    ) -> CatalogService {
        let mut settings = ModelgateSettings::default();
        settings.catalog.preferred_category = EndpointCategory::Subscription;
        CatalogService::with_source(
            Arc::new(settings),
            credentials,
            Arc::new(RecordingNotifier::new()),
            source,
        )
    }

    #[tokio::test]
    async fn uses_configured_category_by_default() {
        let source = Arc::new(RecordingSource::default());
        let svc = service(Arc::new(StaticCredential::new("sk-live")), source.clone());

        let resolution = svc
            .resolve_catalog(None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(resolution.origin, EndpointCategory::Subscription);
        assert_eq!(
            source.calls.lock().clone(),
            vec![(EndpointCategory::Subscription, "sk-live".to_string())]
        );
    }

    #[tokio::test]
    async fn explicit_category_overrides_setting() {
        let source = Arc::new(RecordingSource::default());
        let svc = service(Arc::new(StaticCredential::new("sk")), source.clone());
        let resolution = svc
            .resolve_catalog(Some(EndpointCategory::Premium), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(resolution.preferred, EndpointCategory::Premium);
    }

    #[tokio::test]
    async fn prompts_after_silent_miss() {
        let accessor = Arc::new(PromptOnly {
            modes: Mutex::new(Vec::new()),
        });
        let source = Arc::new(RecordingSource::default());
        let svc = service(accessor.clone(), source.clone());

        let _ = svc
            .resolve_catalog(None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            accessor.modes.lock().clone(),
            vec![PromptMode::Silent, PromptMode::Interactive]
        );
        assert_eq!(source.calls.lock()[0].1, "sk-prompted");
    }

    #[tokio::test]
    async fn missing_credential_without_prompt() {
        let accessor = Arc::new(PromptOnly {
            modes: Mutex::new(Vec::new()),
        });
        let source = Arc::new(RecordingSource::default());
        let svc = service(accessor.clone(), source.clone()).allow_prompt(false);

        let err = svc
            .resolve_catalog(None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_matches!(err, CatalogError::MissingCredential);
        assert_eq!(accessor.modes.lock().clone(), vec![PromptMode::Silent]);
        assert!(source.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn cancelled_before_credential_lookup() {
        let accessor = Arc::new(PromptOnly {
            modes: Mutex::new(Vec::new()),
        });
        let svc = service(accessor.clone(), Arc::new(RecordingSource::default()));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = svc.resolve_catalog(None, &cancel).await.unwrap_err();
        assert_matches!(err, CatalogError::Cancelled);
        assert!(accessor.modes.lock().is_empty());
    }

    #[test]
    fn compose_request_uses_settings_and_override() {
        let svc = service(
            Arc::new(StaticCredential::absent()),
            Arc::new(RecordingSource::default()),
        );
        assert_eq!(svc.compose_request("gpt-4o", None).unwrap().model(), "gpt-4o");

        let overrides = ToggleOverride {
            search: SearchOverride {
                enabled: Some(true),
                mode: Some(SearchMode::Deep),
            },
            ..ToggleOverride::default()
        };
        let composed = svc.compose_request("gpt-4o", Some(&overrides)).unwrap();
        assert_eq!(composed.model(), "gpt-4o:online/linkup-deep");
    }

    #[test]
    fn compose_request_rejects_blank_id() {
        let svc = service(
            Arc::new(StaticCredential::absent()),
            Arc::new(RecordingSource::default()),
        );
        assert_eq!(svc.compose_request("  ", None).unwrap_err().path, "baseId");
    }
}
