//! Auth0 Management API client for directory search and updates.

use std::time::Duration as StdDuration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use super::models::{RateBudget, SearchResult, User};
use super::Directory;
use crate::config::Auth0Config;
use crate::error::ApiError;

/// Fields requested from the search endpoint; keep in sync with `User`.
const USER_FIELDS: &str = "user_id,email,last_login,created_at,blocked";

/// HTTP request timeout.
const HTTP_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// HTTP connection timeout.
const HTTP_CONNECT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Auth0 Management API client.
///
/// Owns the bearer token and the HTTP session for the process lifetime; the
/// job issues one outstanding call at a time.
pub struct DirectoryClient {
    http_client: Client,
    base_url: String,
    access_token: String,
}

impl DirectoryClient {
    /// Create a new directory client for the configured tenant.
    pub fn new(config: &Auth0Config, access_token: String) -> Result<Self, ApiError> {
        let http_client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            http_client,
            base_url: config.api_base_url(),
            access_token,
        })
    }
}

/// Search endpoint payload when totals are requested.
#[derive(Debug, Deserialize)]
struct SearchPayload {
    users: Vec<User>,
    #[serde(default)]
    total: u64,
}

impl Directory for DirectoryClient {
    async fn search_users(
        &self,
        query: &str,
        sort: &str,
        per_page: u32,
    ) -> Result<SearchResult, ApiError> {
        let url = format!("{}/users", self.base_url);

        debug!("Searching users: {}", query);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("q", query),
                ("search_engine", "v3"),
                ("sort", sort),
                ("per_page", &per_page.to_string()),
                ("page", "0"),
                ("include_totals", "true"),
                ("fields", USER_FIELDS),
            ])
            .send()
            .await
            .map_err(ApiError::Network)?;

        let budget = RateBudget::from_headers(response.headers());
        let status = response.status();
        match status.as_u16() {
            200 => {
                let payload: SearchPayload = response
                    .json()
                    .await
                    .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

                debug!(
                    "Search returned {} of {} matching users",
                    payload.users.len(),
                    payload.total
                );

                Ok(SearchResult {
                    users: payload.users,
                    total: payload.total,
                    budget,
                })
            }
            401 => Err(ApiError::Unauthorized),
            403 => Err(ApiError::Forbidden),
            429 => Err(ApiError::RateLimited { budget }),
            _ => {
                let body = response.text().await.unwrap_or_default();
                error!(
                    "User search failed for query {}: HTTP {} - {}",
                    query, status, body
                );
                Err(ApiError::RequestFailed(format!("HTTP {}", status)))
            }
        }
    }

    async fn set_blocked(&self, user_id: &str, blocked: bool) -> Result<RateBudget, ApiError> {
        let url = format!("{}/users/{}", self.base_url, urlencoding::encode(user_id));
        let body = serde_json::json!({ "blocked": blocked });

        let response = self
            .http_client
            .patch(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::Network)?;

        let budget = RateBudget::from_headers(response.headers());
        let status = response.status();
        match status.as_u16() {
            200 => Ok(budget),
            401 => Err(ApiError::Unauthorized),
            403 => Err(ApiError::Forbidden),
            429 => Err(ApiError::RateLimited { budget }),
            _ => {
                let body = response.text().await.unwrap_or_default();
                error!(
                    "Blocked-flag update failed for {}: HTTP {} - {}",
                    user_id, status, body
                );
                Err(ApiError::RequestFailed(format!("HTTP {}", status)))
            }
        }
    }
}
