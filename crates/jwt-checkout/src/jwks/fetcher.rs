//! Key set fetching
//!
//! [`KeySetFetcher`] is the seam between the resolver and the network.
//! [`HttpKeySetFetcher`] is the production implementation.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use tracing::{error, info};

use crate::config::CheckoutConfig;
use crate::error::{ConfigError, VerifyFailure};

/// Source of key sets
#[async_trait]
pub trait KeySetFetcher: Send + Sync {
    /// Fetch and parse the key set published at `url`
    ///
    /// # Errors
    ///
    /// [`VerifyFailure::KeySetFetch`] when the endpoint cannot be reached,
    /// returns a non-success status or sends an oversized body, [`VerifyFailure::KeySetParse`] when the
    /// body is not a key set.
    async fn fetch(&self, url: &str) -> Result<JwkSet, VerifyFailure>;
}

#[async_trait]
impl<T: KeySetFetcher + ?Sized> KeySetFetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<JwkSet, VerifyFailure> {
        (**self).fetch(url).await
    }
}

/// Fetches key sets over HTTP(S) with reqwest
///
/// No scheme or host restriction is applied to `url`: whatever `jku` the
/// token names is requested. Bodies larger than
/// [`CheckoutConfig::max_response_size`] are refused.
#[derive(Debug, Clone)]
pub struct HttpKeySetFetcher {
    client: reqwest::Client,
    max_response_size: usize,
}

impl HttpKeySetFetcher {
    /// Build a fetcher honoring the configured timeout and user agent
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP client cannot be built.
    pub fn new(config: &CheckoutConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            max_response_size: config.max_response_size,
        })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client, max_response_size: usize) -> Self {
        Self {
            client,
            max_response_size,
        }
    }

    /// Read the body in chunks, giving up once it exceeds the size limit
    async fn read_body(
        &self,
        url: &str,
        mut response: reqwest::Response,
    ) -> Result<Vec<u8>, VerifyFailure> {
        if let Some(content_length) = response.content_length()
            && content_length > self.max_response_size as u64
        {
            error!(jku = %url, content_length, "Key set response too large");
            return Err(too_large(self.max_response_size));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            error!(jku = %url, error = %e, "Failed to read key set body");
            VerifyFailure::KeySetFetch(e.to_string())
        })? {
            if body.len() + chunk.len() > self.max_response_size {
                error!(jku = %url, "Key set response too large");
                return Err(too_large(self.max_response_size));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

fn too_large(limit: usize) -> VerifyFailure {
    VerifyFailure::KeySetFetch(format!("Response exceeds {limit} bytes"))
}

#[async_trait]
impl KeySetFetcher for HttpKeySetFetcher {
    async fn fetch(&self, url: &str) -> Result<JwkSet, VerifyFailure> {
        info!(jku = %url, "Fetching key set");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                error!(jku = %url, error = %e, "Failed to fetch key set");
                VerifyFailure::KeySetFetch(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(jku = %url, status = %status, "Key set endpoint returned error status");
            return Err(VerifyFailure::KeySetFetch(format!("HTTP {status}")));
        }

        let body = self.read_body(url, response).await?;

        let keys: JwkSet = serde_json::from_slice(&body).map_err(|e| {
            error!(jku = %url, error = %e, "Failed to parse key set JSON");
            VerifyFailure::KeySetParse(e.to_string())
        })?;

        info!(jku = %url, key_count = keys.keys.len(), "Fetched key set");
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpKeySetFetcher {
        HttpKeySetFetcher::new(&CheckoutConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_parses_key_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "keys": [{
                    "kty": "RSA",
                    "kid": "rsa-1",
                    "use": "sig",
                    "alg": "RS256",
                    "n": "xGOr-H7A-PWq5kN2rTm1vq0dW3bL",
                    "e": "AQAB"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let keys = fetcher().fetch(&format!("{}/jwks", server.uri())).await.unwrap();
        assert_eq!(keys.keys.len(), 1);
        assert!(keys.find("rsa-1").is_some());
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch(&format!("{}/jwks", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyFailure::KeySetFetch(_)));
    }

    #[tokio::test]
    async fn test_non_key_set_body_is_parse_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch(&format!("{}/jwks", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyFailure::KeySetParse(_)));
    }

    #[tokio::test]
    async fn test_oversized_body_is_fetch_failure() {
        let server = MockServer::start().await;
        let padding = "x".repeat(2048);
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "keys": [],
                "padding": padding,
            })))
            .mount(&server)
            .await;

        let config = CheckoutConfig::default().with_max_response_size(1024);
        let err = HttpKeySetFetcher::new(&config)
            .unwrap()
            .fetch(&format!("{}/jwks", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyFailure::KeySetFetch(_)));
    }

    #[tokio::test]
    async fn test_body_within_limit_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": [] })))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let keys = HttpKeySetFetcher::with_client(client, 64)
            .fetch(&format!("{}/jwks", server.uri()))
            .await
            .unwrap();
        assert!(keys.keys.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_fetch_failure() {
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let err = fetcher()
            .fetch("http://127.0.0.1:9/jwks")
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyFailure::KeySetFetch(_)));
    }
}
