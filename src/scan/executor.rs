//! Per-entity application of the blocked flag.

use tracing::{info, warn};

use crate::directory::{Directory, User};
use crate::error::ApiError;

use super::throttle;

/// Applies blocked-flag updates with rate-limit handling.
///
/// A rate-limit rejection is waited out once, using the reset time attached
/// to the rejection, then the update is retried exactly once. After each
/// successful call the reported budget feeds the proactive throttle check,
/// so the next call never runs into an already-exhausted quota.
pub struct ActionExecutor<'a, D> {
    directory: &'a D,
    throttle_floor: u32,
}

impl<'a, D: Directory> ActionExecutor<'a, D> {
    pub fn new(directory: &'a D, throttle_floor: u32) -> Self {
        Self {
            directory,
            throttle_floor,
        }
    }

    /// Set the user's blocked flag.
    ///
    /// A second consecutive rate-limit rejection is surfaced to the caller;
    /// no other error is retried.
    pub async fn apply(&self, user: &User, blocked: bool) -> Result<(), ApiError> {
        info!(
            "Setting blocked={} for {} ({}) (last_login: {}, created_at: {})",
            blocked,
            user.user_id,
            user.email.as_deref().unwrap_or("no email"),
            user.last_login
                .map_or_else(|| "never".to_string(), |ts| ts.to_rfc3339()),
            user.created_at.to_rfc3339()
        );

        let budget = match self.directory.set_blocked(&user.user_id, blocked).await {
            Ok(budget) => budget,
            Err(ApiError::RateLimited { budget }) => {
                warn!(
                    "Update for {} rejected by rate limit, waiting for quota reset",
                    user.user_id
                );
                throttle::wait_until_reset(&budget).await;
                self.directory.set_blocked(&user.user_id, blocked).await?
            }
            Err(e) => return Err(e),
        };

        if throttle::should_throttle(budget.remaining, self.throttle_floor) {
            throttle::wait_until_reset(&budget).await;
        }

        Ok(())
    }
}
