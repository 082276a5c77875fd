//! Date-filter validation and normalization.
//!
//! Callers may supply absolute calendar bounds, or one relative window
//! (`last N days/weeks/months`); this module resolves either family into a
//! canonical four-slot range and renders the GitHub search fragments for it.
//! Pure computation, no network or filesystem access.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;

/// Errors from contradictory or inverted date filters.
#[derive(Debug, Error)]
pub enum DateRangeError {
    /// More than one of the relative window options was supplied.
    #[error("Only one of last-days, last-weeks or last-months may be used")]
    ConflictingRelative,

    /// A relative window was combined with an absolute created bound.
    #[error("Relative date options cannot be combined with created-after/created-before")]
    RelativeWithAbsolute,

    /// A lower bound is later than its upper bound.
    #[error("Invalid {axis} range: 'after' date is later than 'before' date")]
    InvertedRange {
        /// Which axis is inverted: `created` or `updated`.
        axis: &'static str,
    },

    /// A relative window too large to represent as a timestamp.
    #[error("Relative window of {days} days is out of range")]
    WindowOutOfRange {
        /// Window size after conversion to days.
        days: i64,
    },
}

/// Raw date-filter inputs before resolution.
#[derive(Debug, Clone, Default)]
pub struct DateRangeArgs {
    /// Only issues created on or after this date.
    pub created_after: Option<NaiveDate>,
    /// Only issues created on or before this date.
    pub created_before: Option<NaiveDate>,
    /// Only issues updated on or after this date.
    pub updated_after: Option<NaiveDate>,
    /// Only issues updated on or before this date.
    pub updated_before: Option<NaiveDate>,
    /// Only issues created in the last N days.
    pub last_days: Option<u32>,
    /// Only issues created in the last N weeks.
    pub last_weeks: Option<u32>,
    /// Only issues created in the last N months (approximated as 30 days).
    pub last_months: Option<u32>,
}

impl DateRangeArgs {
    fn relative_count(&self) -> usize {
        [
            self.last_days.is_some(),
            self.last_weeks.is_some(),
            self.last_months.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    /// The relative window in days, if a relative option is present.
    ///
    /// Weeks and months are approximations (7 and 30 days), not
    /// calendar-exact arithmetic.
    fn relative_days(&self) -> Option<i64> {
        self.last_days
            .map(i64::from)
            .or_else(|| self.last_weeks.map(|w| i64::from(w) * 7))
            .or_else(|| self.last_months.map(|m| i64::from(m) * 30))
    }
}

/// Canonical resolved date range.
///
/// Each slot is either unset or a concrete UTC timestamp. Invariant:
/// within an axis, `after <= before` whenever both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Lower bound on creation time.
    pub created_after: Option<DateTime<Utc>>,
    /// Upper bound on creation time.
    pub created_before: Option<DateTime<Utc>>,
    /// Lower bound on update time.
    pub updated_after: Option<DateTime<Utc>>,
    /// Upper bound on update time.
    pub updated_before: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Returns true if no bound is set on either axis.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created_after.is_none()
            && self.created_before.is_none()
            && self.updated_after.is_none()
            && self.updated_before.is_none()
    }

    /// Renders the `created:` fragment of a GitHub search query, if any.
    #[must_use]
    pub fn created_query(&self) -> Option<String> {
        axis_query("created", self.created_after, self.created_before)
    }

    /// Renders the `updated:` fragment of a GitHub search query, if any.
    #[must_use]
    pub fn updated_query(&self) -> Option<String> {
        axis_query("updated", self.updated_after, self.updated_before)
    }
}

fn axis_query(
    axis: &str,
    after: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
) -> Option<String> {
    let fmt = |ts: DateTime<Utc>| ts.format("%Y-%m-%d").to_string();
    match (after, before) {
        (Some(a), Some(b)) => Some(format!("{axis}:{}..{}", fmt(a), fmt(b))),
        (Some(a), None) => Some(format!("{axis}:>={}", fmt(a))),
        (None, Some(b)) => Some(format!("{axis}:<={}", fmt(b))),
        (None, None) => None,
    }
}

/// Resolves raw date-filter inputs into a canonical [`DateRange`].
///
/// Resolution order:
/// 1. Reject multiple relative windows.
/// 2. Reject a relative window combined with any absolute `created` bound.
/// 3. A relative window becomes `created_after = now - window` with
///    `created_before` left unset.
/// 4. Reject any axis where `after > before`.
///
/// # Errors
///
/// Returns [`DateRangeError`] on any contradictory or inverted input.
pub fn resolve_date_range(args: &DateRangeArgs) -> Result<DateRange, DateRangeError> {
    resolve_date_range_at(args, Utc::now())
}

/// [`resolve_date_range`] pinned to a caller-supplied "now" so the relative
/// window arithmetic is deterministic under test.
pub fn resolve_date_range_at(
    args: &DateRangeArgs,
    now: DateTime<Utc>,
) -> Result<DateRange, DateRangeError> {
    if args.relative_count() > 1 {
        return Err(DateRangeError::ConflictingRelative);
    }

    let relative_days = args.relative_days();
    if relative_days.is_some() && (args.created_after.is_some() || args.created_before.is_some()) {
        return Err(DateRangeError::RelativeWithAbsolute);
    }

    let to_start = |date: NaiveDate| date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    let to_end = |date: NaiveDate| date.and_hms_opt(23, 59, 59).map(|dt| dt.and_utc());

    // Absurd windows would overflow the timestamp arithmetic, so both the
    // duration conversion and the subtraction are checked.
    let window_start = |days: i64| {
        Duration::try_days(days)
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or(DateRangeError::WindowOutOfRange { days })
    };

    let range = DateRange {
        created_after: match relative_days {
            Some(days) => Some(window_start(days)?),
            None => args.created_after.and_then(to_start),
        },
        created_before: args.created_before.and_then(to_end),
        updated_after: args.updated_after.and_then(to_start),
        updated_before: args.updated_before.and_then(to_end),
    };

    if let (Some(after), Some(before)) = (range.created_after, range.created_before) {
        if after > before {
            return Err(DateRangeError::InvertedRange { axis: "created" });
        }
    }
    if let (Some(after), Some(before)) = (range.updated_after, range.updated_before) {
        if after > before {
            return Err(DateRangeError::InvertedRange { axis: "updated" });
        }
    }

    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_args_resolve_to_empty_range() {
        let range = resolve_date_range(&DateRangeArgs::default()).unwrap();
        assert!(range.is_empty());
        assert!(range.created_query().is_none());
        assert!(range.updated_query().is_none());
    }

    #[test]
    fn absolute_bounds_resolve_in_order() {
        let args = DateRangeArgs {
            created_after: Some(date(2024, 1, 1)),
            created_before: Some(date(2024, 6, 30)),
            ..Default::default()
        };

        let range = resolve_date_range(&args).unwrap();
        assert!(range.created_after.unwrap() <= range.created_before.unwrap());
        assert_eq!(
            range.created_query().unwrap(),
            "created:2024-01-01..2024-06-30"
        );
    }

    #[test]
    fn multiple_relative_windows_are_rejected() {
        let args = DateRangeArgs {
            last_days: Some(7),
            last_weeks: Some(2),
            ..Default::default()
        };

        assert!(matches!(
            resolve_date_range(&args),
            Err(DateRangeError::ConflictingRelative)
        ));
    }

    #[test]
    fn every_relative_absolute_combination_is_rejected() {
        for relative in 0..3 {
            for absolute in 0..2 {
                let mut args = DateRangeArgs::default();
                match relative {
                    0 => args.last_days = Some(30),
                    1 => args.last_weeks = Some(4),
                    _ => args.last_months = Some(1),
                }
                match absolute {
                    0 => args.created_after = Some(date(2024, 1, 1)),
                    _ => args.created_before = Some(date(2024, 6, 1)),
                }

                assert!(
                    matches!(
                        resolve_date_range(&args),
                        Err(DateRangeError::RelativeWithAbsolute)
                    ),
                    "relative={relative} absolute={absolute} should be rejected"
                );
            }
        }
    }

    #[test]
    fn relative_window_sets_only_created_after() {
        let now = date(2024, 6, 30).and_hms_opt(12, 0, 0).unwrap().and_utc();
        let args = DateRangeArgs {
            last_weeks: Some(2),
            ..Default::default()
        };

        let range = resolve_date_range_at(&args, now).unwrap();
        assert_eq!(range.created_after.unwrap(), now - Duration::days(14));
        assert!(range.created_before.is_none());
    }

    #[test]
    fn months_approximate_thirty_days() {
        let now = date(2024, 6, 30).and_hms_opt(0, 0, 0).unwrap().and_utc();
        let args = DateRangeArgs {
            last_months: Some(2),
            ..Default::default()
        };

        let range = resolve_date_range_at(&args, now).unwrap();
        assert_eq!(range.created_after.unwrap(), now - Duration::days(60));
    }

    #[test]
    fn absurd_relative_window_is_rejected_not_panicking() {
        // u32::MAX months converts to ~1.3e11 days, past what a duration
        // can represent.
        let args = DateRangeArgs {
            last_months: Some(u32::MAX),
            ..Default::default()
        };

        assert!(matches!(
            resolve_date_range(&args),
            Err(DateRangeError::WindowOutOfRange { .. })
        ));
    }

    #[test]
    fn representable_window_past_the_calendar_is_rejected() {
        // 200 million days fits in a duration but not in a timestamp.
        let args = DateRangeArgs {
            last_days: Some(200_000_000),
            ..Default::default()
        };

        assert!(matches!(
            resolve_date_range(&args),
            Err(DateRangeError::WindowOutOfRange { .. })
        ));
    }

    #[test]
    fn inverted_created_range_is_rejected() {
        let args = DateRangeArgs {
            created_after: Some(date(2024, 6, 30)),
            created_before: Some(date(2024, 1, 1)),
            ..Default::default()
        };

        assert!(matches!(
            resolve_date_range(&args),
            Err(DateRangeError::InvertedRange { axis: "created" })
        ));
    }

    #[test]
    fn inverted_updated_range_is_rejected() {
        let args = DateRangeArgs {
            updated_after: Some(date(2024, 6, 30)),
            updated_before: Some(date(2024, 1, 1)),
            ..Default::default()
        };

        assert!(matches!(
            resolve_date_range(&args),
            Err(DateRangeError::InvertedRange { axis: "updated" })
        ));
    }

    #[test]
    fn same_day_bounds_are_valid() {
        let args = DateRangeArgs {
            updated_after: Some(date(2024, 3, 15)),
            updated_before: Some(date(2024, 3, 15)),
            ..Default::default()
        };

        let range = resolve_date_range(&args).unwrap();
        assert_eq!(
            range.updated_query().unwrap(),
            "updated:2024-03-15..2024-03-15"
        );
    }

    #[test]
    fn single_bound_renders_open_ended_query() {
        let args = DateRangeArgs {
            created_after: Some(date(2024, 1, 1)),
            updated_before: Some(date(2024, 2, 1)),
            ..Default::default()
        };

        let range = resolve_date_range(&args).unwrap();
        assert_eq!(range.created_query().unwrap(), "created:>=2024-01-01");
        assert_eq!(range.updated_query().unwrap(), "updated:<=2024-02-01");
    }
}
