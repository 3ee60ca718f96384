//! Configuration loading and management.
//!
//! Loads configuration from the embedded config.toml with environment
//! variable overrides. Invalid or missing required settings abort startup.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

/// Embedded configuration file content.
const CONFIG_TOML: &str = include_str!("../config.toml");

/// Page-size ceiling imposed by the user search endpoint.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub auth0: Auth0Config,
    pub scan: ScanConfig,
}

/// Tenant and credential settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Auth0Config {
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
    /// Optional connection filter restricting the scan to one partition.
    #[serde(default)]
    pub connection: Option<String>,
}

/// Scan behavior settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Days without activity before an account is blocked.
    pub block_threshold_days: u32,
    /// Users fetched per search call.
    pub user_page_size: u32,
    /// Pause until quota reset when remaining calls drop below this floor.
    pub rate_limit_throttle: u32,
}

impl Config {
    /// Load configuration from embedded config.toml with environment
    /// variable overrides.
    pub fn load() -> Result<Self> {
        // Parse embedded config
        let mut config: Config =
            toml::from_str(CONFIG_TOML).context("Failed to parse embedded config.toml")?;

        // Apply environment variable overrides
        if let Ok(domain) = env::var("AUTH0_DOMAIN") {
            config.auth0.domain = domain;
        }

        if let Ok(client_id) = env::var("AUTH0_CLIENT_ID") {
            config.auth0.client_id = client_id;
        }

        if let Ok(client_secret) = env::var("AUTH0_CLIENT_SECRET") {
            config.auth0.client_secret = client_secret;
        }

        if let Ok(connection) = env::var("AUTH0_CONNECTION") {
            config.auth0.connection = Some(connection);
        }

        if let Ok(threshold) = env::var("BLOCK_THRESHOLD") {
            config.scan.block_threshold_days = threshold
                .parse()
                .context("BLOCK_THRESHOLD must be a non-negative integer number of days")?;
        }

        if let Ok(page_size) = env::var("USER_PAGE_SIZE") {
            config.scan.user_page_size = page_size
                .parse()
                .context("USER_PAGE_SIZE must be a positive integer")?;
        }

        if let Ok(floor) = env::var("RATE_LIMIT_THROTTLE") {
            config.scan.rate_limit_throttle = floor
                .parse()
                .context("RATE_LIMIT_THROTTLE must be a non-negative integer")?;
        }

        // An empty connection means "no filter"
        if config.auth0.connection.as_deref() == Some("") {
            config.auth0.connection = None;
        }

        // Validate required fields
        config.validate()?;

        Ok(config)
    }

    /// Validate that required configuration is present and in range.
    fn validate(&self) -> Result<()> {
        if self.auth0.domain.is_empty() {
            anyhow::bail!(
                "Auth0 domain not configured. Set AUTH0_DOMAIN environment variable \
                 or update config.toml"
            );
        }

        url::Url::parse(&format!("https://{}/", self.auth0.domain))
            .context("AUTH0_DOMAIN is not a valid host name")?;

        if self.auth0.client_id.is_empty() {
            anyhow::bail!(
                "Auth0 client_id not configured. Set AUTH0_CLIENT_ID environment variable \
                 or update config.toml"
            );
        }

        if self.auth0.client_secret.is_empty() {
            anyhow::bail!(
                "Auth0 client_secret not configured. Set AUTH0_CLIENT_SECRET environment \
                 variable or update config.toml"
            );
        }

        if self.scan.user_page_size == 0 || self.scan.user_page_size > MAX_PAGE_SIZE {
            anyhow::bail!(
                "USER_PAGE_SIZE must be between 1 and {}, got {}",
                MAX_PAGE_SIZE,
                self.scan.user_page_size
            );
        }

        Ok(())
    }
}

impl Auth0Config {
    /// Token endpoint for the client-credentials grant.
    pub fn token_url(&self) -> String {
        format!("https://{}/oauth/token", self.domain)
    }

    /// Management API audience required by the token endpoint.
    pub fn api_audience(&self) -> String {
        format!("https://{}/api/v2/", self.domain)
    }

    /// Management API base URL.
    pub fn api_base_url(&self) -> String {
        format!("https://{}/api/v2", self.domain)
    }
}
