//! Search-expression construction for the scan passes.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::directory::User;
use crate::error::ApiError;

/// Cursor value meaning "unbounded" on the first page of a scan.
pub const CURSOR_WILDCARD: &str = "*";

/// The two directory predicates a scan pass can enumerate.
///
/// A variant fixes both the sort field and the field the refinement cursor
/// is derived from; the pairing must not diverge or cursor refinement stops
/// being a lower bound on the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchCriteria {
    /// Users with a recorded login, ordered ascending by `last_login`.
    ByLastActivity,
    /// Users that never logged in, ordered ascending by `created_at`.
    ByCreationForNeverActive,
}

impl SearchCriteria {
    /// Field the pass orders by and derives its cursor from.
    pub fn ordering_field(self) -> &'static str {
        match self {
            Self::ByLastActivity => "last_login",
            Self::ByCreationForNeverActive => "created_at",
        }
    }

    /// Ascending sort specification for the search endpoint.
    pub fn sort_spec(self) -> String {
        format!("{}:1", self.ordering_field())
    }

    /// Refinement cursor derived from a user's ordering field.
    pub fn cursor_value(self, user: &User) -> Result<String, ApiError> {
        let ts = match self {
            Self::ByLastActivity => user.last_login.ok_or_else(|| {
                ApiError::InvalidResponse(format!(
                    "user {} matched a last_login query without a last_login value",
                    user.user_id
                ))
            })?,
            Self::ByCreationForNeverActive => user.created_at,
        };

        Ok(format_cursor(ts))
    }
}

/// Format a timestamp as an ISO-8601 millisecond-precision UTC cursor.
pub fn format_cursor(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build the search expression for one page of a scan pass.
///
/// The cutoff is `now` minus the threshold, truncated to day granularity.
/// `now` is a parameter so the result is fully determined by its inputs.
pub fn build_query(
    criteria: SearchCriteria,
    threshold_days: u32,
    cursor: &str,
    connection: Option<&str>,
    now: DateTime<Utc>,
) -> String {
    let cutoff = (now - Duration::days(i64::from(threshold_days))).format("%Y-%m-%d");

    // Range bounds: inclusive lower (cursor), exclusive upper (cutoff)
    let mut query = match criteria {
        SearchCriteria::ByLastActivity => {
            format!("last_login:[{cursor} TO {cutoff}}}")
        }
        SearchCriteria::ByCreationForNeverActive => {
            format!("(NOT _exists_:last_login) AND created_at:[{cursor} TO {cutoff}}}")
        }
    };

    query.push_str(" AND -blocked:true");

    if let Some(connection) = connection {
        query.push_str(&format!(" AND identities.connection:\"{connection}\""));
    }

    query
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 3, 15, 23, 59, 59).unwrap()
    }

    fn user_with_login(ts: DateTime<Utc>) -> User {
        User {
            user_id: "auth0|abc".into(),
            email: None,
            last_login: Some(ts),
            created_at: Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap(),
            blocked: false,
        }
    }

    #[test]
    fn test_build_is_deterministic_at_fixed_clock() {
        let a = build_query(SearchCriteria::ByLastActivity, 30, "*", None, fixed_now());
        let b = build_query(SearchCriteria::ByLastActivity, 30, "*", None, fixed_now());
        assert_eq!(a, b);
    }

    #[test]
    fn test_cutoff_truncated_to_day() {
        // 2020-03-15 23:59:59 minus 30 days is 2020-02-14; time of day is dropped
        let query = build_query(SearchCriteria::ByLastActivity, 30, "*", None, fixed_now());
        assert_eq!(query, "last_login:[* TO 2020-02-14} AND -blocked:true");
    }

    #[test]
    fn test_zero_threshold_cutoff_is_today() {
        let query = build_query(SearchCriteria::ByLastActivity, 0, "*", None, fixed_now());
        assert!(query.contains("TO 2020-03-15}"));
    }

    #[test]
    fn test_never_active_predicate() {
        let query = build_query(
            SearchCriteria::ByCreationForNeverActive,
            30,
            "*",
            None,
            fixed_now(),
        );
        assert_eq!(
            query,
            "(NOT _exists_:last_login) AND created_at:[* TO 2020-02-14} AND -blocked:true"
        );
    }

    #[test]
    fn test_connection_filter_appended() {
        let query = build_query(
            SearchCriteria::ByLastActivity,
            30,
            "*",
            Some("Username-Password-Authentication"),
            fixed_now(),
        );
        assert!(query.ends_with("AND identities.connection:\"Username-Password-Authentication\""));
    }

    #[test]
    fn test_cursor_format_millisecond_utc() {
        let ts = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap()
            + Duration::milliseconds(678);
        assert_eq!(format_cursor(ts), "2020-01-02T03:04:05.678Z");
    }

    #[test]
    fn test_cursor_round_trip_preserves_lower_bound() {
        let ts = Utc.with_ymd_and_hms(2020, 2, 1, 12, 30, 45).unwrap()
            + Duration::milliseconds(123);
        let user = user_with_login(ts);

        let cursor = SearchCriteria::ByLastActivity.cursor_value(&user).unwrap();
        let query = build_query(
            SearchCriteria::ByLastActivity,
            30,
            &cursor,
            None,
            fixed_now(),
        );

        assert!(query.starts_with("last_login:[2020-02-01T12:30:45.123Z TO "));
    }

    #[test]
    fn test_cursor_value_requires_ordering_field() {
        let mut user = user_with_login(fixed_now());
        user.last_login = None;

        let result = SearchCriteria::ByLastActivity.cursor_value(&user);
        assert!(result.is_err());

        // The never-active pass cursors on created_at, which is always present
        let cursor = SearchCriteria::ByCreationForNeverActive
            .cursor_value(&user)
            .unwrap();
        assert_eq!(cursor, "2019-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_sort_matches_ordering_field() {
        assert_eq!(SearchCriteria::ByLastActivity.sort_spec(), "last_login:1");
        assert_eq!(
            SearchCriteria::ByCreationForNeverActive.sort_spec(),
            "created_at:1"
        );
    }
}
