//! Error types for token verification and configuration.
//!
//! Verification failures are deliberately opaque at the public boundary:
//! [`TokenVerifier::verify`](crate::TokenVerifier::verify) returns `None` and
//! [`JwksResolver::verify`](crate::JwksResolver::verify) returns `false`.
//! [`VerifyFailure`] is the tagged form used internally, by the `try_*`
//! operations, and in `tracing` diagnostics.

use thiserror::Error;

/// Why a token was not accepted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum VerifyFailure {
    /// Header, payload or signature segment could not be decoded
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Header has no `kid`, so no key can be selected from a key set
    #[error("Token header has no kid")]
    MissingKeyId,

    /// Header has no `jku`, so there is nowhere to fetch keys from
    #[error("Token header has no jku")]
    MissingKeySetUrl,

    /// Key set endpoint was unreachable or answered with an error status
    #[error("Key set fetch failed: {0}")]
    KeySetFetch(String),

    /// Key set endpoint answered with something that is not a key set
    #[error("Invalid key set: {0}")]
    KeySetParse(String),

    /// No key in the set carries the token's `kid`
    #[error("Key ID '{0}' not found in key set")]
    KeyNotFound(String),

    /// Matched key cannot be used for asymmetric signature verification
    #[error("Unsupported key: {0}")]
    UnsupportedKey(String),

    /// Signature does not match, or the header algorithm is not the key's
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Signature is fine but `exp`/`nbf` rule the token out
    #[error("Claims rejected: {0}")]
    ClaimsRejected(String),

    /// Payload is valid JSON but not of the requested shape
    #[error("Payload decode failed: {0}")]
    PayloadDecode(String),
}

impl VerifyFailure {
    /// Short stable name for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedToken(_) => "malformed_token",
            Self::MissingKeyId => "missing_kid",
            Self::MissingKeySetUrl => "missing_jku",
            Self::KeySetFetch(_) => "key_set_fetch",
            Self::KeySetParse(_) => "key_set_parse",
            Self::KeyNotFound(_) => "key_not_found",
            Self::UnsupportedKey(_) => "unsupported_key",
            Self::InvalidSignature(_) => "invalid_signature",
            Self::ClaimsRejected(_) => "claims_rejected",
            Self::PayloadDecode(_) => "payload_decode",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for VerifyFailure {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => {
                Self::ClaimsRejected(err.to_string())
            }
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                Self::InvalidSignature(err.to_string())
            }
            ErrorKind::InvalidKeyFormat | ErrorKind::InvalidEcdsaKey => {
                Self::UnsupportedKey(err.to_string())
            }
            _ => Self::MalformedToken(err.to_string()),
        }
    }
}

/// Configuration errors raised when building a verifier
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Shared-secret verification only accepts the HMAC family
    #[error("Symmetric algorithm must be HS256, HS384 or HS512, got {0:?}")]
    NonSymmetricAlgorithm(jsonwebtoken::Algorithm),

    /// A zero timeout would fail every fetch
    #[error("Key set fetch timeout must be greater than zero")]
    ZeroFetchTimeout,

    /// A zero size limit would reject every key set
    #[error("Key set response size limit must be greater than zero")]
    ZeroResponseSize,

    /// reqwest refused the client settings
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(String),
}
