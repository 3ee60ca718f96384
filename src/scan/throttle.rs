//! Proactive throttling and reactive back-off from the reported rate budget.
//!
//! The whole strategy is a single deterministic wait until the reset time
//! the API reported. No jitter, no exponential growth: the server already
//! says when the quota returns.

use chrono::Utc;
use tracing::info;

use crate::directory::RateBudget;

/// True when remaining quota has dropped strictly below the configured floor.
pub fn should_throttle(remaining: u32, floor: u32) -> bool {
    remaining < floor
}

/// Sleep until the budget's reset time has passed.
///
/// A reset time at or before now is a zero-length wait.
pub async fn wait_until_reset(budget: &RateBudget) {
    let now = Utc::now();
    if budget.reset_at <= now {
        return;
    }

    let Ok(pause) = (budget.reset_at - now).to_std() else {
        return;
    };

    info!(
        "Rate budget low ({} of {} calls remaining), pausing {:?} until quota reset",
        budget.remaining, budget.limit, pause
    );

    tokio::time::sleep(pause).await;
}
