//! Error types for the a0sweep job.
//!
//! Uses `thiserror` for component errors; the application boundary in
//! `main` wraps them with `anyhow` context.

use thiserror::Error;

use crate::directory::RateBudget;

/// Authentication-related errors. Fatal at startup.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    TokenRequestFailed(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to parse token response: {0}")]
    InvalidResponse(String),
}

/// Management API errors.
///
/// Only `RateLimited` is recoverable, and only once per call site; every
/// other variant terminates the run.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unauthorized (401): token rejected by the Management API")]
    Unauthorized,

    #[error("forbidden (403): token lacks the required scopes")]
    Forbidden,

    #[error("rate limited (429): quota resets at {}", .budget.reset_at)]
    RateLimited { budget: RateBudget },

    #[error("failed to parse API response: {0}")]
    InvalidResponse(String),

    #[error("request failed: {0}")]
    RequestFailed(String),
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn test_rate_limited_display_carries_reset_time() {
        let err = ApiError::RateLimited {
            budget: RateBudget {
                limit: 10,
                remaining: 0,
                reset_at: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            },
        };

        let message = err.to_string();
        assert!(message.contains("429"));
        assert!(message.contains("2020-01-01"));
    }

    #[test]
    fn test_request_failed_display() {
        let err = ApiError::RequestFailed("HTTP 500".into());
        assert_eq!(err.to_string(), "request failed: HTTP 500");
    }
}
