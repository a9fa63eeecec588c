//! # Catalog Errors
//!
//! Failure taxonomy for catalog resolution.
//!
//! | Variant | Retried in category | Escalates to next category |
//! |---|---|---|
//! | [`CatalogError::Network`] | yes | yes |
//! | [`CatalogError::HttpStatus`] | yes | yes |
//! | [`CatalogError::Validation`] | no | per [`EscalationPolicy`] |
//! | [`CatalogError::EmptyCatalog`] | no | per [`EscalationPolicy`] |
//! | [`CatalogError::Cancelled`] | no | no |
//!
//! Only [`CatalogError::Aggregate`] and [`CatalogError::Cancelled`] leave the
//! fallback orchestrator; everything else is wrapped per category.
//!
//! [`EscalationPolicy`]: crate::orchestrator::EscalationPolicy

use std::fmt;

use modelgate_core::{EndpointCategory, ValidationError};

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while resolving a catalog.
#[derive(Clone, Debug, thiserror::Error)]
pub enum CatalogError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("network error: {message}")]
    Network {
        /// Error description.
        message: String,
    },

    /// Endpoint answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Truncated response body excerpt.
        body: String,
    },

    /// Response did not match the catalog schema.
    #[error("catalog validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Response was valid but listed no models.
    #[error("{category} catalog returned no models")]
    EmptyCatalog {
        /// Category whose catalog was empty.
        category: EndpointCategory,
    },

    /// Every category failed.
    #[error("{0}")]
    Aggregate(#[from] AggregateFetchError),

    /// The caller cancelled the resolution.
    #[error("catalog request cancelled")]
    Cancelled,

    /// The credential accessor returned nothing.
    #[error("no API credential available")]
    MissingCredential,
}

impl CatalogError {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::HttpStatus { .. })
    }

    /// Short stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::HttpStatus { .. } => "http_status",
            Self::Validation(_) => "validation",
            Self::EmptyCatalog { .. } => "empty_catalog",
            Self::Aggregate(_) => "aggregate",
            Self::Cancelled => "cancelled",
            Self::MissingCredential => "missing_credential",
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// One category's failure inside an [`AggregateFetchError`].
#[derive(Clone, Debug)]
pub struct CategoryFailure {
    /// Category that failed.
    pub category: EndpointCategory,
    /// Why it failed.
    pub error: Box<CatalogError>,
}

impl CategoryFailure {
    /// Record `error` for `category`.
    pub fn new(category: EndpointCategory, error: CatalogError) -> Self {
        Self {
            category,
            error: Box::new(error),
        }
    }
}

impl fmt::Display for CategoryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.error)
    }
}

/// Every category attempted during one resolution failed.
#[derive(Clone, Debug, thiserror::Error)]
pub struct AggregateFetchError {
    /// Failure of the preferred category, the root cause.
    pub preferred: CategoryFailure,
    /// Failures of the fallback categories, in the order they were tried.
    pub subsequent: Vec<CategoryFailure>,
}

impl AggregateFetchError {
    /// The preferred category's error.
    pub fn root_cause(&self) -> &CatalogError {
        &self.preferred.error
    }

    /// All failures, preferred first.
    pub fn failures(&self) -> impl Iterator<Item = &CategoryFailure> {
        std::iter::once(&self.preferred).chain(self.subsequent.iter())
    }
}

impl fmt::Display for AggregateFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "all catalog categories failed; {}", self.preferred)?;
        for failure in &self.subsequent {
            write!(f, "; then {failure}")?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
