//! # Catalog Cache
//!
//! Single-flight, TTL-bounded cache in front of [`CatalogResolver`].
//!
//! Entries are keyed by preferred category and a SHA-256 fingerprint of the
//! credential, so raw tokens are never kept as map keys. Concurrent callers
//! with the same key share one in-flight resolution; each caller still
//! honours its own cancellation token, and a resolution nobody waits on any
//! more is dropped rather than left parked. Only successful resolutions are
//! stored. Failures leave the slot empty so the next call tries again.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use modelgate_core::EndpointCategory;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::{CatalogError, CatalogResult};
use crate::orchestrator::{CatalogResolver, Resolution};

type Flight = Shared<BoxFuture<'static, CatalogResult<Arc<Resolution>>>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    category: EndpointCategory,
    fingerprint: [u8; 32],
}

impl CacheKey {
    fn new(category: EndpointCategory, credential: &str) -> Self {
        Self {
            category,
            fingerprint: Sha256::digest(credential.as_bytes()).into(),
        }
    }
}

enum Claim {
    Hit(Arc<Resolution>),
    Wait { id: u64, flight: Flight, started: bool },
}

enum Slot {
    InFlight { id: u64, flight: Flight },
    Ready { resolution: Arc<Resolution>, stored_at: Instant },
}

struct Inner {
    resolver: Arc<CatalogResolver>,
    ttl: Duration,
    slots: Mutex<HashMap<CacheKey, Slot>>,
    next_id: AtomicU64,
}

impl Inner {
    /// Record the outcome of flight `id`, unless the slot was invalidated or
    /// replaced in the meantime.
    fn settle(&self, key: &CacheKey, id: u64, result: &CatalogResult<Arc<Resolution>>) {
        let mut slots = self.slots.lock();
        let current = matches!(
            slots.get(key),
            Some(Slot::InFlight { id: current, .. }) if *current == id
        );
        if !current {
            return;
        }
        match result {
            Ok(resolution) => {
                let _ = slots.insert(
                    *key,
                    Slot::Ready {
                        resolution: Arc::clone(resolution),
                        stored_at: Instant::now(),
                    },
                );
            }
            Err(_) => {
                let _ = slots.remove(key);
            }
        }
    }

    /// Drop flight `id` if the map holds the only remaining handle to it.
    fn abandon(&self, key: &CacheKey, id: u64) {
        let mut slots = self.slots.lock();
        let orphaned = matches!(
            slots.get(key),
            Some(Slot::InFlight { id: current, flight })
                if *current == id && flight.strong_count() == Some(1)
        );
        if orphaned {
            debug!(category = %key.category, "no callers left, dropping catalog resolution");
            let stale = slots.remove(key);
            drop(slots);
            drop(stale);
        }
    }
}

/// Single-flight catalog cache.
#[derive(Clone)]
pub struct CatalogCache {
    inner: Arc<Inner>,
}

impl CatalogCache {
    /// Cache results of `resolver` for `ttl`.
    pub fn new(resolver: Arc<CatalogResolver>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                resolver,
                ttl,
                slots: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Cached resolution for (`preferred`, `credential`), resolving on a miss.
    ///
    /// Callers served from a stored or shared resolution that fell back are
    /// told so through the resolver's notifier, same as the caller that ran
    /// it. When the last waiter on an in-flight resolution cancels, the
    /// resolution is dropped along with its pending request or backoff.
    pub async fn get_or_resolve(
        &self,
        preferred: EndpointCategory,
        credential: &str,
        cancel: &CancellationToken,
    ) -> CatalogResult<Arc<Resolution>> {
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }

        let key = CacheKey::new(preferred, credential);
        let (id, mut flight, started) = match self.claim(key, credential) {
            Claim::Hit(resolution) => {
                self.inner.resolver.announce_fallback(&resolution);
                return Ok(resolution);
            }
            Claim::Wait {
                id,
                flight,
                started,
            } => (id, flight, started),
        };

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            result = &mut flight => Some(result),
        };
        let Some(result) = outcome else {
            drop(flight);
            self.inner.abandon(&key, id);
            return Err(CatalogError::Cancelled);
        };

        if !started {
            if let Ok(resolution) = &result {
                self.inner.resolver.announce_fallback(resolution);
            }
        }
        result
    }

    fn claim(&self, key: CacheKey, credential: &str) -> Claim {
        let mut slots = self.inner.slots.lock();
        match slots.get(&key) {
            Some(Slot::Ready {
                resolution,
                stored_at,
            }) if stored_at.elapsed() < self.inner.ttl => {
                debug!(category = %key.category, "catalog cache hit");
                Claim::Hit(Arc::clone(resolution))
            }
            Some(Slot::InFlight { id, flight }) => {
                debug!(category = %key.category, "joining in-flight catalog resolution");
                Claim::Wait {
                    id: *id,
                    flight: flight.clone(),
                    started: false,
                }
            }
            _ => {
                debug!(category = %key.category, "starting catalog resolution");
                let (id, flight) = self.start_flight(key, credential);
                let _ = slots.insert(
                    key,
                    Slot::InFlight {
                        id,
                        flight: flight.clone(),
                    },
                );
                Claim::Wait {
                    id,
                    flight,
                    started: true,
                }
            }
        }
    }

    fn start_flight(&self, key: CacheKey, credential: &str) -> (u64, Flight) {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let credential = credential.to_string();
        let flight = async move {
            // Callers race their own tokens against the flight. The flight
            // ends early only by being dropped once nobody waits on it.
            let result = inner
                .resolver
                .resolve(key.category, &credential, &CancellationToken::new())
                .await
                .map(Arc::new);
            inner.settle(&key, id, &result);
            result
        }
        .boxed()
        .shared();
        (id, flight)
    }

    /// Drop every entry for `category`, whatever the credential.
    pub fn invalidate(&self, category: EndpointCategory) {
        self.inner
            .slots
            .lock()
            .retain(|key, _| key.category != category);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.inner.slots.lock().clear();
    }

    /// Number of stored or in-flight entries.
    pub fn len(&self) -> usize {
        self.inner.slots.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
