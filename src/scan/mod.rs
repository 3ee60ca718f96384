//! Inactive-user remediation scan.
//!
//! Composes the query builder, paged scanner, action executor and throttle
//! into the two block passes (users with a recorded login, then users that
//! never logged in), plus the bounded single-page undo mode.

pub mod executor;
pub mod query;
pub mod scanner;
pub mod throttle;

use tracing::{info, warn};

use crate::config::Config;
use crate::directory::Directory;
use crate::error::ApiError;

use executor::ActionExecutor;
use query::SearchCriteria;
use scanner::{PagedScanner, ScanParams};

/// Per-pass counts from a full block scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTotals {
    /// Users blocked by the last-activity pass.
    pub by_last_activity: u64,
    /// Users blocked by the never-active pass.
    pub never_active: u64,
}

impl ScanTotals {
    pub fn total(&self) -> u64 {
        self.by_last_activity + self.never_active
    }
}

/// Run both block passes and report per-pass and combined totals.
///
/// The passes enumerate disjoint sets (one requires a recorded login, the
/// other its absence), so their order does not affect the result.
pub async fn run_block_scan<D: Directory>(
    config: &Config,
    directory: &D,
) -> Result<ScanTotals, ApiError> {
    let params = ScanParams {
        threshold_days: config.scan.block_threshold_days,
        page_size: config.scan.user_page_size,
        throttle_floor: config.scan.rate_limit_throttle,
        connection: config.auth0.connection.as_deref(),
    };
    let executor = ActionExecutor::new(directory, params.throttle_floor);

    info!(
        "Scanning for users inactive longer than {} days",
        params.threshold_days
    );

    let by_last_activity = PagedScanner::new(directory, SearchCriteria::ByLastActivity, params)
        .run(&executor)
        .await?;
    info!("Blocked {} users by last activity", by_last_activity);

    let never_active =
        PagedScanner::new(directory, SearchCriteria::ByCreationForNeverActive, params)
            .run(&executor)
            .await?;
    info!("Blocked {} users that never logged in", never_active);

    let totals = ScanTotals {
        by_last_activity,
        never_active,
    };
    info!("Scan complete: {} users blocked in total", totals.total());

    Ok(totals)
}

/// Unblock one page of currently blocked users.
///
/// Bounded to a single page on purpose: this mode exists to reverse test
/// runs, not to enumerate the whole directory.
pub async fn undo_one_page<D: Directory>(config: &Config, directory: &D) -> Result<u64, ApiError> {
    let mut query = String::from("blocked:true");
    if let Some(connection) = config.auth0.connection.as_deref() {
        query.push_str(&format!(" AND identities.connection:\"{connection}\""));
    }

    let sort = SearchCriteria::ByCreationForNeverActive.sort_spec();
    let page_size = config.scan.user_page_size;

    let page = match directory.search_users(&query, &sort, page_size).await {
        Ok(result) => result,
        Err(ApiError::RateLimited { budget }) => {
            warn!("Search rejected by rate limit, waiting for quota reset");
            throttle::wait_until_reset(&budget).await;
            directory.search_users(&query, &sort, page_size).await?
        }
        Err(e) => return Err(e),
    };

    info!(
        "Unblocking {} of {} blocked users",
        page.users.len(),
        page.total
    );

    let executor = ActionExecutor::new(directory, config.scan.rate_limit_throttle);
    let mut processed = 0u64;
    for user in &page.users {
        executor.apply(user, false).await?;
        processed += 1;
    }

    Ok(processed)
}
