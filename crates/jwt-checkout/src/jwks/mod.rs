//! Key set resolution for tokens verified without a shared secret
//!
//! - [`cache`] - `jku`-keyed cache with expiry checked on read
//! - [`fetcher`] - the fetch seam and its reqwest implementation
//! - [`resolver`] - header decoding, key lookup and signature verification

pub mod cache;
pub mod fetcher;
pub mod resolver;

pub use cache::KeySetCache;
pub use fetcher::{HttpKeySetFetcher, KeySetFetcher};
pub use resolver::JwksResolver;

use std::time::Duration;

/// Lifetime of a fetched key set (12 hours)
pub const KEY_SET_TTL: Duration = Duration::from_secs(12 * 60 * 60);
