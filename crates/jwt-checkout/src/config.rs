//! Verifier configuration
//!
//! The key set TTL is intentionally absent: cached key sets always live for
//! [`KEY_SET_TTL`](crate::jwks::KEY_SET_TTL).

use std::time::Duration;

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for [`TokenVerifier`](crate::TokenVerifier)
///
/// # Example
///
/// ```rust
/// use jwt_checkout::CheckoutConfig;
/// use jsonwebtoken::Algorithm;
///
/// let config = CheckoutConfig::default()
///     .with_symmetric_algorithm(Algorithm::HS512)
///     .with_clock_skew_leeway_secs(30);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    /// HMAC algorithm used when a shared secret is supplied (default: HS256)
    pub symmetric_algorithm: Algorithm,

    /// Tolerance applied to `exp` and `nbf` checks (default: 0 seconds)
    pub clock_skew_leeway_secs: u64,

    /// Upper bound on a single key set fetch (default: 10 seconds)
    pub fetch_timeout_secs: u64,

    /// User agent sent to key set endpoints
    pub user_agent: String,

    /// Largest key set response body accepted, in bytes (default: 64 KiB)
    pub max_response_size: usize,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            symmetric_algorithm: Algorithm::HS256,
            clock_skew_leeway_secs: 0,
            fetch_timeout_secs: 10,
            user_agent: format!("jwt-checkout/{}", env!("CARGO_PKG_VERSION")),
            max_response_size: 64 * 1024, // 64 KiB
        }
    }
}

impl CheckoutConfig {
    /// Set the HMAC algorithm for shared-secret verification
    pub fn with_symmetric_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.symmetric_algorithm = algorithm;
        self
    }

    /// Set the clock skew tolerance for `exp`/`nbf`
    pub fn with_clock_skew_leeway_secs(mut self, secs: u64) -> Self {
        self.clock_skew_leeway_secs = secs;
        self
    }

    /// Set the key set fetch timeout
    pub fn with_fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = secs;
        self
    }

    /// Set the user agent for key set requests
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the key set response size limit
    pub fn with_max_response_size(mut self, bytes: usize) -> Self {
        self.max_response_size = bytes;
        self
    }

    /// Fetch timeout as a [`Duration`]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Check the configuration for values that can never verify anything
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the symmetric algorithm is not HS256/384/512,
    /// the fetch timeout is zero or the response size limit is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(
            self.symmetric_algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ConfigError::NonSymmetricAlgorithm(self.symmetric_algorithm));
        }

        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::ZeroFetchTimeout);
        }

        if self.max_response_size == 0 {
            return Err(ConfigError::ZeroResponseSize);
        }

        Ok(())
    }
}
