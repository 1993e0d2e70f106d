// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

//! API Setu client for identity verification.
//!
//! Officers confirm a principal's identity before acting on
//! identity-sensitive requests (erasure of `identity`/`pii` categories).
//! The client authenticates with OAuth client credentials; the access
//! token is cached with a TTL so request bursts don't hammer the token
//! endpoint.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::RwLock;
use url::Url;

/// Default access-token cache TTL (5 minutes).
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(300);

/// Errors from the verification API.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("verification API request failed: {0}")]
    Http(String),
    #[error("verification API returned HTTP {0}")]
    Status(u16),
    #[error("verification API response malformed: {0}")]
    Malformed(String),
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Identity verification result for a principal.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct VerificationStatus {
    /// Whether the identity behind the DID is currently verified.
    pub verified: bool,
    /// Provider-side status label (e.g. "ACTIVE", "EXPIRED").
    #[serde(default)]
    pub status: Option<String>,
}

struct CachedToken {
    access_token: String,
    fetched_at: Instant,
    ttl: Duration,
}

/// API Setu client with cached client-credentials token.
#[derive(Clone)]
pub struct ApiSetuClient {
    base_url: Url,
    client_id: String,
    client_secret: String,
    token_ttl: Duration,
    token: Arc<RwLock<Option<CachedToken>>>,
    client: reqwest::Client,
}

impl ApiSetuClient {
    /// Create a new client.
    pub fn new(base_url: Url, client_id: &str, client_secret: &str) -> Self {
        Self {
            base_url,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            token_ttl: DEFAULT_TOKEN_TTL,
            token: Arc::new(RwLock::new(None)),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Create with custom token cache TTL.
    #[allow(dead_code)]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Get the configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Reachability probe used by the health endpoint.
    pub async fn ping(&self) -> Result<(), VerifyError> {
        let response = self
            .client
            .get(self.endpoint("health"))
            .send()
            .await
            .map_err(|e| VerifyError::Http(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(VerifyError::Status(response.status().as_u16()))
        }
    }

    /// Get a bearer token, fetching a fresh one if the cache is stale.
    async fn access_token(&self) -> Result<String, VerifyError> {
        {
            let token = self.token.read().await;
            if let Some(entry) = &*token {
                if entry.fetched_at.elapsed() < entry.ttl {
                    return Ok(entry.access_token.clone());
                }
            }
        }

        let fresh = self.fetch_token().await?;
        let access_token = fresh.access_token.clone();

        {
            let mut token = self.token.write().await;
            // Trust the provider's expiry when it is shorter than ours.
            let ttl = fresh
                .expires_in
                .map(Duration::from_secs)
                .map(|provider| provider.min(self.token_ttl))
                .unwrap_or(self.token_ttl);
            *token = Some(CachedToken {
                access_token: fresh.access_token,
                fetched_at: Instant::now(),
                ttl,
            });
        }

        Ok(access_token)
    }

    /// Fetch a client-credentials token from the provider.
    async fn fetch_token(&self) -> Result<TokenResponse, VerifyError> {
        let response = self
            .client
            .post(self.endpoint("oauth/token"))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| VerifyError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VerifyError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| VerifyError::Malformed(e.to_string()))
    }

    /// Check if a token is currently cached and valid.
    pub async fn is_cached(&self) -> bool {
        let token = self.token.read().await;
        if let Some(entry) = &*token {
            entry.fetched_at.elapsed() < entry.ttl
        } else {
            false
        }
    }

    /// Query the verification status of a decentralized identity.
    pub async fn verify_identity(&self, did: &str) -> Result<VerificationStatus, VerifyError> {
        let token = self.access_token().await?;

        let response = self
            .client
            .get(self.endpoint(&format!("identity/{did}/status")))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| VerifyError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VerifyError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| VerifyError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> ApiSetuClient {
        ApiSetuClient::new(
            Url::parse("https://apisetu.gov.in").unwrap(),
            "client-id",
            "client-secret",
        )
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = test_client();
        assert_eq!(client.endpoint("health"), "https://apisetu.gov.in/health");
        assert_eq!(
            client.endpoint("/oauth/token"),
            "https://apisetu.gov.in/oauth/token"
        );

        let trailing = ApiSetuClient::new(
            Url::parse("https://apisetu.gov.in/gw/").unwrap(),
            "id",
            "secret",
        );
        assert_eq!(trailing.endpoint("health"), "https://apisetu.gov.in/gw/health");
    }

    #[test]
    fn custom_token_ttl() {
        let client = test_client().with_token_ttl(Duration::from_secs(60));
        assert_eq!(client.token_ttl, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn token_cache_initially_empty() {
        let client = test_client();
        assert!(!client.is_cached().await);
    }

    #[test]
    fn verification_status_deserializes() {
        let status: VerificationStatus =
            serde_json::from_str(r#"{"verified": true, "status": "ACTIVE"}"#).unwrap();
        assert!(status.verified);
        assert_eq!(status.status.as_deref(), Some("ACTIVE"));

        let bare: VerificationStatus = serde_json::from_str(r#"{"verified": false}"#).unwrap();
        assert!(!bare.verified);
        assert!(bare.status.is_none());
    }
}
