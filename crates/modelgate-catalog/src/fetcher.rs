//! # Catalog Fetcher
//!
//! One authenticated GET against one category's endpoint, followed by schema
//! validation and normalization of every entry.
//!
//! [`CatalogSource`] is the seam the orchestrator talks to; [`HttpCatalogFetcher`]
//! is the production implementation. Tests substitute scripted sources.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use modelgate_core::{EndpointCategory, ModelDescriptor, ValidationError};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

use crate::endpoints::EndpointDescriptor;
use crate::error_body;
use crate::errors::{CatalogError, CatalogResult};
use crate::normalize::{Degradation, normalize};
use crate::schema::validate_catalog;

/// Client-identifier header name.
pub const CLIENT_HEADER: &str = "x-client";

/// Descriptors from one successful fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchOutcome {
    /// Normalized descriptors, all stamped with the endpoint's category.
    pub descriptors: Vec<ModelDescriptor>,
    /// Entries kept in minimal form or dropped as duplicates.
    pub degraded: Vec<Degradation>,
}

/// Something that can fetch one endpoint's catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch and normalize the catalog at `endpoint` using `credential`.
    async fn fetch(
        &self,
        endpoint: &EndpointDescriptor,
        credential: &str,
    ) -> CatalogResult<FetchOutcome>;
}

/// HTTP catalog fetcher backed by `reqwest`.
pub struct HttpCatalogFetcher {
    client: reqwest::Client,
    client_id: String,
}

impl HttpCatalogFetcher {
    /// Create a fetcher with its own client and a per-request `timeout`.
    pub fn new(client_id: impl Into<String>, timeout: Duration) -> CatalogResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client_id, client))
    }

    /// Create a fetcher with a shared HTTP client.
    #[must_use]
    pub fn with_client(client_id: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            client_id: client_id.into(),
        }
    }

    fn build_headers(&self, credential: &str) -> CatalogResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let auth = HeaderValue::from_str(&format!("Bearer {credential}")).map_err(|_| {
            ValidationError::new("credential", "header-safe token", "invalid characters")
        })?;
        let _ = headers.insert(AUTHORIZATION, auth);
        let client = HeaderValue::from_str(&self.client_id).map_err(|_| {
            ValidationError::new(
                "catalog.clientId",
                "header-safe string",
                format!("{:?}", self.client_id),
            )
        })?;
        let _ = headers.insert(CLIENT_HEADER, client);
        Ok(headers)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogFetcher {
    async fn fetch(
        &self,
        endpoint: &EndpointDescriptor,
        credential: &str,
    ) -> CatalogResult<FetchOutcome> {
        let headers = self.build_headers(credential)?;

        debug!(category = %endpoint.category, url = %endpoint.url, "fetching catalog");

        let response = self
            .client
            .get(&endpoint.url)
            .query(&[("detailed", "true")])
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let excerpt = error_body::excerpt(&body);
            warn!(
                category = %endpoint.category,
                status = status.as_u16(),
                body = %excerpt,
                "catalog endpoint returned error status"
            );
            return Err(CatalogError::HttpStatus {
                status: status.as_u16(),
                body: excerpt,
            });
        }

        parse_catalog(&body, endpoint.category)
    }
}

/// Validate and normalize a catalog response body.
///
/// Duplicate ids keep their first occurrence; later ones are dropped and
/// reported as degradations.
pub fn parse_catalog(body: &str, category: EndpointCategory) -> CatalogResult<FetchOutcome> {
    let doc: Value = serde_json::from_str(body)
        .map_err(|e| ValidationError::new("$", "JSON document", format!("invalid JSON ({e})")))?;
    let entries = validate_catalog(&doc)?;
    if entries.is_empty() {
        return Err(CatalogError::EmptyCatalog { category });
    }

    let mut seen = HashSet::with_capacity(entries.len());
    let mut descriptors = Vec::with_capacity(entries.len());
    let mut degraded = Vec::new();

    for entry in entries {
        let normalized = normalize(entry, category);
        if !seen.insert(normalized.descriptor.id.clone()) {
            warn!(model_id = %normalized.descriptor.id, %category, "duplicate model id dropped");
            degraded.push(Degradation {
                model_id: normalized.descriptor.id,
                reason: "duplicate id".to_string(),
            });
            continue;
        }
        degraded.extend(normalized.degradation);
        descriptors.push(normalized.descriptor);
    }

    debug!(
        %category,
        models = descriptors.len(),
        degraded = degraded.len(),
        "catalog parsed"
    );

    Ok(FetchOutcome {
        descriptors,
        degraded,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
