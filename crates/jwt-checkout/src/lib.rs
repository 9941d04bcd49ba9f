//! # jwt-checkout
//!
//! Extracts a JWT from an HTTP request and verifies it, either with a shared
//! secret or against the JSON Web Key Set named by the token's own `jku`
//! header.
//!
//! ## Architecture
//!
//! ```text
//! Authorization header / token cookie
//!              │
//!              ▼
//!     extract::extract_token ── Bearer header wins, else cookie
//!              │
//!              ▼
//!        TokenVerifier ── secret? ──► HMAC verification
//!              │ no secret
//!              ▼
//!        JwksResolver ── kid + jku from header
//!              │
//!              ├─► KeySetCache (12 h, checked on read)
//!              └─► KeySetFetcher (HTTP GET jku on miss)
//! ```
//!
//! - [`extract`] - candidate token selection
//! - [`verifier`] - the [`TokenVerifier`] entry point
//! - [`jwks`] - key set cache, fetcher and resolver
//! - [`config`] - [`CheckoutConfig`]
//! - [`error`] - [`VerifyFailure`] and [`ConfigError`]
//!
//! ## Failure model
//!
//! Public operations return `Option`/`bool`: callers learn only that a token
//! was rejected. The reason is available through the `try_*` variants and
//! is logged with `tracing` at debug level.
//!
//! ## Security
//!
//! The `jku` URL comes from the unverified token and is fetched without an
//! allow-list. See [`jwks::resolver`] before exposing the no-secret path to
//! untrusted tokens.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use jwt_checkout::{CheckoutConfig, Credentials, TokenVerifier};
//! use jwt_checkout::jwks::KeySetCache;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! // One cache per process, shared by every verifier
//! let cache = Arc::new(KeySetCache::new());
//! let verifier = TokenVerifier::new(CheckoutConfig::default(), cache)?;
//!
//! let credentials = Credentials::new(None, Some("eyJ0eXAi..."));
//! let claims: Option<serde_json::Value> = verifier.checkout(credentials, None).await;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod jwks;
mod signature;
pub mod verifier;

#[doc(inline)]
pub use config::CheckoutConfig;

#[doc(inline)]
pub use error::{ConfigError, VerifyFailure};

#[doc(inline)]
pub use extract::{Credentials, TOKEN_COOKIE, extract_token};

#[doc(inline)]
pub use jwks::{JwksResolver, KEY_SET_TTL};

#[doc(inline)]
pub use verifier::{TokenVerifier, VerifyOptions};
