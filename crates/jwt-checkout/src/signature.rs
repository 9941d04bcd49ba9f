//! Signature verification and payload decoding primitives
//!
//! Thin wrappers over `jsonwebtoken` shared by the shared-secret and JWKS
//! paths.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, get_current_timestamp};
use serde::de::DeserializeOwned;

use crate::error::VerifyFailure;

/// Validation rules: signature, `alg` pinned, `exp`/`nbf` checked if present
fn validation(algorithm: Algorithm, leeway_secs: u64) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.leeway = leeway_secs;
    validation.validate_nbf = true;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

/// Verify `token` with `key` under `algorithm`
///
/// The header's `alg` must equal `algorithm`. A token is expired once
/// `exp + leeway <= now`, so `exp == now` is already rejected.
pub(crate) fn verify_signature(
    token: &str,
    key: &DecodingKey,
    algorithm: Algorithm,
    leeway_secs: u64,
) -> Result<(), VerifyFailure> {
    let data = decode::<serde_json::Value>(token, key, &validation(algorithm, leeway_secs))?;

    // jsonwebtoken only rejects exp < now
    if let Some(exp) = data.claims.get("exp").and_then(serde_json::Value::as_f64)
        && exp + leeway_secs as f64 <= get_current_timestamp() as f64
    {
        return Err(VerifyFailure::ClaimsRejected(
            "ExpiredSignature".to_string(),
        ));
    }

    Ok(())
}

/// Decode the payload segment into `T` without checking anything
///
/// Only call this after [`verify_signature`] succeeded.
pub(crate) fn decode_payload<T: DeserializeOwned>(token: &str) -> Result<T, VerifyFailure> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => {
            return Err(VerifyFailure::MalformedToken(
                "expected three segments".to_string(),
            ));
        }
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| VerifyFailure::MalformedToken(format!("payload encoding: {e}")))?;

    serde_json::from_slice(&bytes).map_err(|e| VerifyFailure::PayloadDecode(e.to_string()))
}
