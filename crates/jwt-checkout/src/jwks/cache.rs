//! Key set cache keyed by `jku`
//!
//! Entries expire lazily: an expired entry stays in the map and is simply
//! reported as a miss until the next successful fetch overwrites it.

use dashmap::DashMap;
use jsonwebtoken::jwk::JwkSet;
use tokio::time::Instant;
use tracing::debug;

use super::KEY_SET_TTL;

/// Cached key set with its absolute expiry
#[derive(Debug, Clone)]
struct CachedKeySet {
    /// The JWK set
    keys: JwkSet,
    /// First instant at which this entry is no longer served
    expires_at: Instant,
}

impl CachedKeySet {
    /// Entry is usable only while its expiry is strictly in the future
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Concurrency-safe cache of fetched key sets
///
/// Build one per process and share it as `Arc<KeySetCache>` with every
/// [`JwksResolver`](crate::JwksResolver).
///
/// ```rust
/// use std::sync::Arc;
/// use jwt_checkout::jwks::KeySetCache;
///
/// let cache = Arc::new(KeySetCache::new());
/// assert!(cache.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct KeySetCache {
    entries: DashMap<String, CachedKeySet>,
}

impl KeySetCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Key set for `url` if an unexpired entry exists
    pub fn get(&self, url: &str) -> Option<JwkSet> {
        let entry = self.entries.get(url)?;
        if entry.is_fresh(Instant::now()) {
            debug!(jku = %url, "Using cached key set");
            Some(entry.keys.clone())
        } else {
            debug!(jku = %url, "Cached key set expired");
            None
        }
    }

    /// Store `keys` for `url`, replacing any previous entry
    pub fn insert(&self, url: &str, keys: JwkSet) {
        let expires_at = Instant::now() + KEY_SET_TTL;

        debug!(
            jku = %url,
            key_count = keys.keys.len(),
            ttl_secs = KEY_SET_TTL.as_secs(),
            "Caching key set"
        );

        self.entries
            .insert(url.to_string(), CachedKeySet { keys, expires_at });
    }

    /// Expiry of the entry for `url`, fresh or not
    pub fn expires_at(&self, url: &str) -> Option<Instant> {
        self.entries.get(url).map(|entry| entry.expires_at)
    }

    /// Number of entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has ever been cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
