//! Endpoint registry: one catalog URL per [`EndpointCategory`].
//!
//! Built from the configured base URL. The registry is fixed at construction
//! and lookups never fail, since every category has exactly one endpoint.

use modelgate_core::EndpointCategory;

/// Catalog endpoint for one category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointDescriptor {
    /// Category served by this endpoint.
    pub category: EndpointCategory,
    /// Absolute catalog URL, without query parameters.
    pub url: String,
    /// Label shown to users when this category is used.
    pub display_label: &'static str,
}

/// Fixed mapping from category to endpoint.
#[derive(Clone, Debug)]
pub struct EndpointRegistry {
    endpoints: [EndpointDescriptor; 3],
}

impl EndpointRegistry {
    /// Build the registry for `base_url` (scheme and host, trailing `/` ignored).
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim().trim_end_matches('/');
        let endpoint = |category| EndpointDescriptor {
            category,
            url: format!("{base}{}", path_for(category)),
            display_label: label_for(category),
        };
        Self {
            endpoints: EndpointCategory::ALL.map(endpoint),
        }
    }

    /// Endpoint for `category`.
    pub fn get(&self, category: EndpointCategory) -> &EndpointDescriptor {
        // `endpoints` is built from `EndpointCategory::ALL`, so the index is the
        // category's position in that array.
        &self.endpoints[index_of(category)]
    }

    /// All endpoints in fallback order.
    pub fn iter(&self) -> impl Iterator<Item = &EndpointDescriptor> {
        self.endpoints.iter()
    }

    /// Categories to try: `preferred` first, then the rest in registry order.
    pub fn fallback_order(&self, preferred: EndpointCategory) -> Vec<EndpointCategory> {
        std::iter::once(preferred)
            .chain(
                self.iter()
                    .map(|e| e.category)
                    .filter(|&category| category != preferred),
            )
            .collect()
    }
}

fn index_of(category: EndpointCategory) -> usize {
    match category {
        EndpointCategory::All => 0,
        EndpointCategory::Premium => 1,
        EndpointCategory::Subscription => 2,
    }
}

fn path_for(category: EndpointCategory) -> &'static str {
    match category {
        EndpointCategory::All => "/api/v1/models",
        EndpointCategory::Premium => "/api/paid/v1/models",
        EndpointCategory::Subscription => "/api/subscription/v1/models",
    }
}

fn label_for(category: EndpointCategory) -> &'static str {
    match category {
        EndpointCategory::All => "All models",
        EndpointCategory::Premium => "Premium models",
        EndpointCategory::Subscription => "Subscription models",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
