//! Common test utilities for integration tests
//!
//! Provides ES256 key material, token minting, and a wiremock-backed key set
//! endpoint.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use jwt_checkout::jwks::KeySetCache;
use jwt_checkout::{CheckoutConfig, TokenVerifier};
use p256::ecdsa::SigningKey;
use p256::pkcs8::EncodePrivateKey;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock key set endpoint
pub struct MockKeySetServer {
    pub server: MockServer,
    pub jwks_endpoint: String,
}

impl MockKeySetServer {
    /// Start a mock server exposing `/jwks`
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let jwks_endpoint = format!("{}/jwks", server.uri());

        Self {
            server,
            jwks_endpoint,
        }
    }

    /// Serve `keys` from `/jwks`, expecting exactly `expected_fetches` requests
    pub async fn mock_jwks(&self, keys: Vec<serde_json::Value>, expected_fetches: u64) {
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": keys })))
            .expect(expected_fetches)
            .mount(&self.server)
            .await;
    }

    /// Answer `/jwks` with an error status
    pub async fn mock_jwks_error(&self, status: u16, expected_fetches: u64) {
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(ResponseTemplate::new(status))
            .expect(expected_fetches)
            .mount(&self.server)
            .await;
    }

    /// Drop all mounted mocks
    pub async fn reset(&self) {
        self.server.reset().await;
    }
}

/// ES256 key pair with its public JWK coordinates
pub struct TestKey {
    der: Vec<u8>,
    x: String,
    y: String,
}

impl TestKey {
    /// Generate a fresh P-256 key
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::rngs::OsRng);
        let point = signing_key.verifying_key().to_encoded_point(false);

        Self {
            der: signing_key
                .to_pkcs8_der()
                .expect("Failed to encode private key")
                .as_bytes()
                .to_vec(),
            x: URL_SAFE_NO_PAD.encode(point.x().expect("uncompressed point has x")),
            y: URL_SAFE_NO_PAD.encode(point.y().expect("uncompressed point has y")),
        }
    }

    /// Public JWK for this key under `kid`
    pub fn jwk(&self, kid: &str) -> serde_json::Value {
        json!({
            "kty": "EC",
            "crv": "P-256",
            "x": self.x,
            "y": self.y,
            "kid": kid,
            "alg": "ES256",
            "use": "sig"
        })
    }

    /// Sign `claims` with ES256 and the given header fields
    pub fn sign(
        &self,
        claims: &serde_json::Value,
        kid: Option<&str>,
        jku: Option<&str>,
    ) -> String {
        let mut header = Header::new(Algorithm::ES256);
        header.typ = Some("JWT".to_string());
        header.kid = kid.map(str::to_string);
        header.jku = jku.map(str::to_string);

        encode(&header, claims, &EncodingKey::from_ec_der(&self.der))
            .expect("Failed to encode test JWT")
    }
}

/// Sign `claims` with HS256
pub fn sign_hs256(claims: &serde_json::Value, secret: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to encode test JWT")
}

/// Rewrite the payload's `sub` without re-signing
pub fn tamper_payload(token: &str) -> String {
    let mut segments: Vec<String> = token.split('.').map(str::to_string).collect();
    let claims = URL_SAFE_NO_PAD
        .decode(&segments[1])
        .expect("payload is base64url");
    let mut claims: serde_json::Value = serde_json::from_slice(&claims).expect("payload is JSON");
    claims["sub"] = json!("intruder");
    segments[1] = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
    segments.join(".")
}

/// Verifier over a fresh shared cache
pub fn http_verifier() -> (TokenVerifier, Arc<KeySetCache>) {
    let cache = Arc::new(KeySetCache::new());
    let verifier = TokenVerifier::new(CheckoutConfig::default(), Arc::clone(&cache))
        .expect("default config is valid");
    (verifier, cache)
}

/// Get current Unix timestamp
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}
