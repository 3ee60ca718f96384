//! Auth0 user directory access.
//!
//! The `Directory` trait is the seam between the scan machinery and the
//! Management API; `DirectoryClient` is the production implementation and
//! the tests drive the scan against a scripted in-memory stand-in.

pub mod client;
pub mod models;

pub use client::DirectoryClient;
pub use models::{RateBudget, SearchResult, User};

use crate::error::ApiError;

/// Remote directory operations used by the scan.
///
/// Every call reports the rate budget the API attached to its response, so
/// the caller can decide whether to throttle before the next call.
#[allow(async_fn_in_trait)]
pub trait Directory {
    /// Search users with a v3 query expression, an ascending sort
    /// specification and a bounded page size.
    async fn search_users(
        &self,
        query: &str,
        sort: &str,
        per_page: u32,
    ) -> Result<SearchResult, ApiError>;

    /// Set a user's blocked flag.
    async fn set_blocked(&self, user_id: &str, blocked: bool) -> Result<RateBudget, ApiError>;
}

#[cfg(test)]
pub mod testing {
    //! Scripted `Directory` stand-in for scanner, executor and orchestrator
    //! tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::{Directory, RateBudget, SearchResult, User};
    use crate::error::ApiError;

    /// Budget that never triggers throttling or waiting.
    pub fn generous_budget() -> RateBudget {
        RateBudget {
            limit: 100,
            remaining: 99,
            reset_at: Utc::now() - Duration::seconds(1),
        }
    }

    /// Exhausted budget whose reset already passed, so waits are no-ops.
    pub fn exhausted_budget() -> RateBudget {
        RateBudget {
            limit: 100,
            remaining: 0,
            reset_at: Utc::now() - Duration::seconds(1),
        }
    }

    pub fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
    }

    pub fn test_user(
        id: &str,
        last_login: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> User {
        User {
            user_id: id.to_string(),
            email: None,
            last_login,
            created_at,
            blocked: false,
        }
    }

    /// Plays back scripted responses and records every call it receives.
    #[derive(Default)]
    pub struct ScriptedDirectory {
        search_results: Mutex<VecDeque<Result<SearchResult, ApiError>>>,
        update_results: Mutex<VecDeque<Result<RateBudget, ApiError>>>,
        queries: Mutex<Vec<String>>,
        updates: Mutex<Vec<(String, bool)>>,
    }

    impl ScriptedDirectory {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a successful page of users.
        pub fn push_page(&self, users: Vec<User>) {
            let total = users.len() as u64;
            self.push_search(Ok(SearchResult {
                users,
                total,
                budget: generous_budget(),
            }));
        }

        pub fn push_search(&self, result: Result<SearchResult, ApiError>) {
            self.search_results.lock().unwrap().push_back(result);
        }

        pub fn push_update(&self, result: Result<RateBudget, ApiError>) {
            self.update_results.lock().unwrap().push_back(result);
        }

        /// Queries issued so far, in order.
        pub fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }

        /// `(user_id, blocked)` updates issued so far, in order.
        pub fn updates(&self) -> Vec<(String, bool)> {
            self.updates.lock().unwrap().clone()
        }
    }

    impl Directory for ScriptedDirectory {
        async fn search_users(
            &self,
            query: &str,
            _sort: &str,
            _per_page: u32,
        ) -> Result<SearchResult, ApiError> {
            self.queries.lock().unwrap().push(query.to_string());
            self.search_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected search call: {query}"))
        }

        async fn set_blocked(
            &self,
            user_id: &str,
            blocked: bool,
        ) -> Result<RateBudget, ApiError> {
            self.updates
                .lock()
                .unwrap()
                .push((user_id.to_string(), blocked));
            self.update_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(generous_budget()))
        }
    }
}
