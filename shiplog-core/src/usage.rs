//! Usage counting against stored resources.
//!
//! Pure read-counts, scoped to the owning user. "Today" is pinned to the
//! **UTC** calendar day: a day spans `[00:00:00, 24:00:00)` UTC regardless of
//! where the user posts from. One fixed reference timezone keeps the daily
//! cap and the streak tracker agreeing on which day an update belongs to.

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::{error::Result, profile::UserId, store::ProfileStore};

/// Returns the half-open UTC instant range covering a calendar day.
#[must_use]
pub fn utc_day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
    let end = day
        .checked_add_days(Days::new(1))
        .and_then(|next| next.and_hms_opt(0, 0, 0))
        .map_or(DateTime::<Utc>::MAX_UTC, |next| next.and_utc());
    (start, end)
}

/// Counts projects owned by the user.
///
/// # Errors
///
/// Propagates datastore failures.
pub async fn project_count<S: ProfileStore>(store: &S, user: &UserId) -> Result<u32> {
    store.project_count(user).await
}

/// Counts updates the user created on the given UTC calendar day.
///
/// # Errors
///
/// Propagates datastore failures.
pub async fn updates_on<S: ProfileStore>(
    store: &S,
    user: &UserId,
    day: NaiveDate,
) -> Result<u32> {
    let (start, end) = utc_day_bounds(day);
    store.update_count_between(user, start, end).await
}
