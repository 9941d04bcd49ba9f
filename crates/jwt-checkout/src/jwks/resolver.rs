//! `jku`-driven asymmetric verification
//!
//! Resolution steps for a token without a shared secret:
//!
//! 1. Decode the header (unverified) and require both `kid` and `jku`
//! 2. Serve the key set for `jku` from the cache unless bypassed
//! 3. Otherwise fetch it and overwrite the cache entry
//! 4. Pick the first key whose `kid` matches exactly
//! 5. Verify with that key, restricted to signature verification, under the
//!    key's own `alg`
//!
//! # Security
//!
//! `jku` is taken from the unverified header and fetched as-is. There is no
//! allow-list, so a caller controlling the token controls which URL is
//! requested and which key set is trusted for that token. Deployments that
//! need pinning must check `jku` before handing tokens to this resolver.

use std::sync::Arc;

use jsonwebtoken::jwk::{
    AlgorithmParameters, CommonParameters, Jwk, JwkSet, KeyAlgorithm, KeyOperations, PublicKeyUse,
};
use jsonwebtoken::{Algorithm, DecodingKey, decode_header};
use tracing::{debug, warn};

use super::cache::KeySetCache;
use super::fetcher::KeySetFetcher;
use crate::error::VerifyFailure;
use crate::signature::verify_signature;

/// Resolves verification keys from the key set a token points at
///
/// # Example
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use jwt_checkout::{CheckoutConfig, JwksResolver};
/// # use jwt_checkout::jwks::{HttpKeySetFetcher, KeySetCache};
/// # tokio_test_block_on(async {
/// let config = CheckoutConfig::default();
/// let cache = Arc::new(KeySetCache::new());
/// let resolver = JwksResolver::new(HttpKeySetFetcher::new(&config)?, cache, 0);
///
/// let valid = resolver.verify("eyJ0eXAi...", false).await;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug)]
pub struct JwksResolver<F> {
    fetcher: F,
    cache: Arc<KeySetCache>,
    leeway_secs: u64,
}

impl<F: KeySetFetcher> JwksResolver<F> {
    /// Create a resolver around a shared cache
    pub fn new(fetcher: F, cache: Arc<KeySetCache>, leeway_secs: u64) -> Self {
        Self {
            fetcher,
            cache,
            leeway_secs,
        }
    }

    /// The shared key set cache
    pub fn cache(&self) -> &Arc<KeySetCache> {
        &self.cache
    }

    /// Whether `token` verifies against the key set its header names
    ///
    /// Every failure collapses to `false`; the reason is logged at debug.
    pub async fn verify(&self, token: &str, skip_cache: bool) -> bool {
        match self.try_verify(token, skip_cache).await {
            Ok(()) => true,
            Err(failure) => {
                debug!(reason = failure.kind(), error = %failure, "Key set verification failed");
                false
            }
        }
    }

    /// Like [`verify`](Self::verify) but reports why verification failed
    ///
    /// # Errors
    ///
    /// Any [`VerifyFailure`] other than [`VerifyFailure::PayloadDecode`].
    pub async fn try_verify(&self, token: &str, skip_cache: bool) -> Result<(), VerifyFailure> {
        let header =
            decode_header(token).map_err(|e| VerifyFailure::MalformedToken(e.to_string()))?;

        let key_id = header.kid.ok_or(VerifyFailure::MissingKeyId)?;
        let jku = header.jku.ok_or(VerifyFailure::MissingKeySetUrl)?;

        let keys = self.key_set(&jku, skip_cache).await?;

        let jwk = keys.find(&key_id).ok_or_else(|| {
            warn!(key_id = %key_id, jku = %jku, "Key ID not found in key set");
            VerifyFailure::KeyNotFound(key_id.clone())
        })?;

        let algorithm = key_algorithm(jwk)?;
        let decoding_key = DecodingKey::from_jwk(&verification_key(jwk)?).map_err(|e| {
            warn!(key_id = %key_id, error = %e, "Failed to build decoding key from JWK");
            VerifyFailure::UnsupportedKey(e.to_string())
        })?;

        verify_signature(token, &decoding_key, algorithm, self.leeway_secs)?;

        debug!(
            key_id = %key_id,
            jku = %jku,
            algorithm = ?algorithm,
            "Token verified against key set"
        );
        Ok(())
    }

    /// Cached key set for `jku`, or a fresh one stored in the cache
    async fn key_set(&self, jku: &str, skip_cache: bool) -> Result<JwkSet, VerifyFailure> {
        if !skip_cache && let Some(keys) = self.cache.get(jku) {
            return Ok(keys);
        }

        let keys = self.fetcher.fetch(jku).await?;
        self.cache.insert(jku, keys.clone());
        Ok(keys)
    }
}

/// Signing algorithm declared by the key, if it is one we verify with
fn key_algorithm(jwk: &Jwk) -> Result<Algorithm, VerifyFailure> {
    let declared = jwk
        .common
        .key_algorithm
        .ok_or_else(|| VerifyFailure::UnsupportedKey("key declares no alg".to_string()))?;

    let algorithm = match declared {
        KeyAlgorithm::ES256 => Algorithm::ES256,
        KeyAlgorithm::ES384 => Algorithm::ES384,
        KeyAlgorithm::RS256 => Algorithm::RS256,
        KeyAlgorithm::RS384 => Algorithm::RS384,
        KeyAlgorithm::RS512 => Algorithm::RS512,
        KeyAlgorithm::PS256 => Algorithm::PS256,
        KeyAlgorithm::PS384 => Algorithm::PS384,
        KeyAlgorithm::PS512 => Algorithm::PS512,
        other => {
            return Err(VerifyFailure::UnsupportedKey(format!(
                "alg {other:?} is not an asymmetric signature algorithm"
            )));
        }
    };

    Ok(algorithm)
}

/// Copy of the matched key carrying only what verification needs
///
/// Only EC and RSA keys are accepted; usage is pinned to signature
/// verification.
fn verification_key(jwk: &Jwk) -> Result<Jwk, VerifyFailure> {
    match &jwk.algorithm {
        AlgorithmParameters::EllipticCurve(_) | AlgorithmParameters::RSA(_) => {}
        _ => {
            return Err(VerifyFailure::UnsupportedKey(
                "only EC and RSA keys can verify".to_string(),
            ));
        }
    }

    Ok(Jwk {
        common: CommonParameters {
            public_key_use: Some(PublicKeyUse::Signature),
            key_operations: Some(vec![KeyOperations::Verify]),
            key_algorithm: jwk.common.key_algorithm,
            key_id: jwk.common.key_id.clone(),
            ..Default::default()
        },
        algorithm: jwk.algorithm.clone(),
    })
}
