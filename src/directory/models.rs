//! Data models for the Auth0 user directory.

use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::HeaderMap;
use serde::Deserialize;

/// A directory user, projected to the fields the scan needs.
///
/// Snapshots are transient: one page's worth lives in memory while it is
/// processed, then it is dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Unique identifier, e.g. "auth0|5f7c8ec7c33c6c004bbafe82".
    pub user_id: String,

    /// Email address. Diagnostic only, never used for control flow.
    #[serde(default)]
    pub email: Option<String>,

    /// Last recorded login. Absent for users that never logged in.
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// Whether the account is currently blocked.
    #[serde(default)]
    pub blocked: bool,
}

/// One page of search results plus the rate budget reported with it.
#[derive(Debug)]
pub struct SearchResult {
    /// Users on this page, in the requested sort order.
    pub users: Vec<User>,

    /// Total matches reported by the search index for the whole query.
    pub total: u64,

    /// Rate-limit metadata from the response headers.
    pub budget: RateBudget,
}

/// Rate-limit metadata attached to every Management API response.
///
/// Refreshed on every call and never cached past the immediately following
/// throttle decision.
#[derive(Debug, Clone, Copy)]
pub struct RateBudget {
    /// Quota ceiling for the current window.
    pub limit: u32,

    /// Calls left in the current window.
    pub remaining: u32,

    /// When the quota resets.
    pub reset_at: DateTime<Utc>,
}

impl RateBudget {
    /// Extract the budget from `x-ratelimit-*` response headers.
    ///
    /// Missing or unparsable headers degrade to values that neither
    /// throttle nor wait: remaining `u32::MAX`, reset now.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let limit = parse_header(headers, "x-ratelimit-limit").unwrap_or(0);
        let remaining = parse_header(headers, "x-ratelimit-remaining").unwrap_or(u32::MAX);
        let reset_at = parse_header::<i64>(headers, "x-ratelimit-reset")
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or_else(Utc::now);

        Self {
            limit,
            remaining,
            reset_at,
        }
    }
}

fn parse_header<T: FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}
