//! Auth0 Management API authentication.
//!
//! Executes the OAuth2 client-credentials grant once at startup; the
//! resulting bearer token lives for the rest of the run. There is no
//! refresh path: a batch run is expected to finish well inside the token
//! lifetime.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::config::Auth0Config;
use crate::error::AuthError;

/// HTTP request timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
/// HTTP connection timeout.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Client for the tenant's token endpoint.
pub struct AuthClient {
    http_client: reqwest::Client,
    token_url: String,
    api_audience: String,
    client_id: String,
    client_secret: String,
}

impl AuthClient {
    /// Create a new auth client from configuration.
    pub fn new(config: &Auth0Config) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            token_url: config.token_url(),
            api_audience: config.api_audience(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    /// Fetch a Management API bearer token via the client-credentials grant.
    pub async fn fetch_access_token(&self) -> Result<String, AuthError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("audience", self.api_audience.as_str()),
        ];

        debug!("Requesting Management API token from {}", self.token_url);

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            // Log error details for debugging without exposing them upward
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!("Token request failed: HTTP {} - {}", status, error_body);
            return Err(AuthError::TokenRequestFailed(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        info!(
            "Obtained Management API token (expires in {}s)",
            token_response.expires_in
        );

        Ok(token_response.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_targets_tenant_endpoints() {
        let config = Auth0Config {
            domain: "example.eu.auth0.com".into(),
            client_id: "client".into(),
            client_secret: "secret".into(),
            connection: None,
        };

        let client = AuthClient::new(&config).unwrap();
        assert_eq!(client.token_url, "https://example.eu.auth0.com/oauth/token");
        assert_eq!(client.api_audience, "https://example.eu.auth0.com/api/v2/");
    }

    #[test]
    fn test_token_response_parsing() {
        let json = r#"{
            "access_token": "eyJz93a",
            "scope": "read:users update:users",
            "expires_in": 86400,
            "token_type": "Bearer"
        }"#;

        let parsed: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.access_token, "eyJz93a");
        assert_eq!(parsed.expires_in, 86400);
    }
}
