//! Token verification
//!
//! [`TokenVerifier`] picks the verification path from the secret argument:
//! a shared secret means HMAC, no secret means the token's own `jku`/`kid`
//! are resolved through [`JwksResolver`]. Either way the payload is decoded
//! into the caller's type only after the signature checks out.

use std::sync::Arc;

use jsonwebtoken::DecodingKey;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::CheckoutConfig;
use crate::error::{ConfigError, VerifyFailure};
use crate::extract::Credentials;
use crate::jwks::{HttpKeySetFetcher, JwksResolver, KeySetCache, KeySetFetcher};
use crate::signature::{decode_payload, verify_signature};

/// Per-call verification options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Fetch the key set even if a fresh cached copy exists
    pub skip_cache: bool,
}

impl VerifyOptions {
    /// Options forcing a key set fetch
    pub fn skip_cache() -> Self {
        Self { skip_cache: true }
    }
}

/// Verifies tokens and decodes their payloads
///
/// # Example
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use jwt_checkout::{CheckoutConfig, Credentials, TokenVerifier};
/// # use jwt_checkout::jwks::KeySetCache;
/// # use serde::Deserialize;
/// #[derive(Deserialize)]
/// struct Session {
///     sub: String,
/// }
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let cache = Arc::new(KeySetCache::new());
/// let verifier = TokenVerifier::new(CheckoutConfig::default(), cache)?;
///
/// let credentials = Credentials::new(Some("Bearer eyJ0eXAi..."), None);
/// if let Some(session) = verifier.checkout::<Session>(credentials, Some("secret")).await {
///     println!("authenticated as {}", session.sub);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # });
/// ```
#[derive(Debug)]
pub struct TokenVerifier<F = HttpKeySetFetcher> {
    config: CheckoutConfig,
    resolver: JwksResolver<F>,
}

impl TokenVerifier<HttpKeySetFetcher> {
    /// Create a verifier that fetches key sets over HTTP
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: CheckoutConfig, cache: Arc<KeySetCache>) -> Result<Self, ConfigError> {
        config.validate()?;
        let fetcher = HttpKeySetFetcher::new(&config)?;
        Self::with_fetcher(config, fetcher, cache)
    }
}

impl<F: KeySetFetcher> TokenVerifier<F> {
    /// Create a verifier around a custom key set fetcher
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn with_fetcher(
        config: CheckoutConfig,
        fetcher: F,
        cache: Arc<KeySetCache>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let resolver = JwksResolver::new(fetcher, cache, config.clock_skew_leeway_secs);
        Ok(Self { config, resolver })
    }

    /// Active configuration
    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Resolver used when no secret is supplied
    pub fn resolver(&self) -> &JwksResolver<F> {
        &self.resolver
    }

    /// Verify `token` and return its payload, or `None` if it is not valid
    pub async fn verify<T: DeserializeOwned>(
        &self,
        token: &str,
        secret: Option<&str>,
    ) -> Option<T> {
        self.verify_with_options(token, secret, VerifyOptions::default())
            .await
    }

    /// [`verify`](Self::verify) with explicit options
    pub async fn verify_with_options<T: DeserializeOwned>(
        &self,
        token: &str,
        secret: Option<&str>,
        options: VerifyOptions,
    ) -> Option<T> {
        match self.try_verify(token, secret, options).await {
            Ok(payload) => Some(payload),
            Err(failure) => {
                debug!(
                    reason = failure.kind(),
                    error = %failure,
                    shared_secret = secret.is_some(),
                    "Token rejected"
                );
                None
            }
        }
    }

    /// Verify `token` and report why it was rejected
    ///
    /// # Errors
    ///
    /// Returns the [`VerifyFailure`] that stopped verification.
    pub async fn try_verify<T: DeserializeOwned>(
        &self,
        token: &str,
        secret: Option<&str>,
        options: VerifyOptions,
    ) -> Result<T, VerifyFailure> {
        match secret {
            Some(secret) => verify_signature(
                token,
                &DecodingKey::from_secret(secret.as_bytes()),
                self.config.symmetric_algorithm,
                self.config.clock_skew_leeway_secs,
            )?,
            None => self.resolver.try_verify(token, options.skip_cache).await?,
        }

        decode_payload(token)
    }

    /// Extract the request's token and verify it
    ///
    /// Returns `None` when the request carries no candidate token or the
    /// token does not verify.
    pub async fn checkout<T: DeserializeOwned>(
        &self,
        credentials: Credentials<'_>,
        secret: Option<&str>,
    ) -> Option<T> {
        let Some(token) = credentials.token() else {
            debug!("No bearer token or token cookie present");
            return None;
        };

        self.verify(token, secret).await
    }
}
