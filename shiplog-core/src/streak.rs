//! Daily streak tracking.
//!
//! A streak counts consecutive UTC calendar days containing at least one
//! qualifying activity (posting an update). The transition itself is a pure
//! function over [`StreakState`]; [`StreakTracker`] wraps it with the
//! load/persist cycle and must run exactly once per accepted activity event,
//! which is the caller's responsibility.
//!
//! The read-modify-write here is not atomic against concurrent submissions
//! from the same user; a true double-post race could double-increment. The
//! counter is cosmetic, so this is accepted.

use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::{
    error::{CoreError, Result},
    profile::{StreakState, UserId},
    store::ProfileStore,
};

/// Result of advancing a streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    /// State after the transition.
    pub state: StreakState,
    /// Whether the transition changed anything (and therefore needs a write).
    pub changed: bool,
}

/// Computes the streak state after an activity on `day`.
///
/// Branches:
/// - no prior activity: streak starts at 1
/// - same day as the last activity: unchanged (idempotent per day)
/// - exactly one day after: streak extends by 1
/// - more than one day after: streak resets to 1
/// - *earlier* than the last activity (clock skew, backdated post): treated
///   like a same-day repeat. History never shrinks a streak.
///
/// `longest` is raised to `current` whenever it would otherwise fall behind.
#[must_use]
pub fn advance(state: StreakState, day: NaiveDate) -> StreakUpdate {
    let current = match state.last_activity {
        None => 1,
        Some(last) if day <= last => {
            return StreakUpdate { state, changed: false };
        }
        Some(last) if (day - last).num_days() == 1 => state.current + 1,
        Some(_) => 1,
    };

    let next = StreakState {
        current,
        longest: state.longest.max(current),
        last_activity: Some(day),
    };
    StreakUpdate { state: next, changed: true }
}

/// Returns the milestone emoji shown next to a streak count.
#[must_use]
pub fn flair(streak: u32) -> &'static str {
    match streak {
        100.. => "\u{1f4af}",
        50..=99 => "\u{1f31f}",
        30..=49 => "\u{2b50}",
        14..=29 => "\u{1f525}\u{1f525}",
        7..=13 => "\u{1f525}",
        3..=6 => "\u{2728}",
        _ => "\u{1f331}",
    }
}

/// Loads, advances, and persists a user's streak for one activity event.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreakTracker;

impl StreakTracker {
    /// Records a qualifying activity on `day` and returns the resulting
    /// counters.
    ///
    /// Same-day repeats (and backdated days) return the stored state without
    /// performing a write.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownUser`] if no profile exists, or propagates
    /// datastore failures.
    #[instrument(skip(store), fields(user = %user, %day), level = "debug")]
    pub async fn record_activity<S: ProfileStore>(
        store: &S,
        user: &UserId,
        day: NaiveDate,
    ) -> Result<StreakState> {
        let profile = store
            .load_profile(user)
            .await?
            .ok_or_else(|| CoreError::UnknownUser(user.as_str().to_owned()))?;

        let update = advance(profile.streak, day);
        if update.changed {
            store.save_streak(user, &update.state).await?;
            debug!(
                current = update.state.current,
                longest = update.state.longest,
                "streak advanced"
            );
        } else {
            debug!("streak unchanged, no write");
        }
        Ok(update.state)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};
    use proptest::prelude::*;

    use super::*;
    use crate::{profile::Profile, store::MemoryStore};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state(current: u32, longest: u32, last: Option<NaiveDate>) -> StreakState {
        StreakState { current, longest, last_activity: last }
    }

    // ========================================================================
    // Pure Transition Tests
    // ========================================================================

    #[test]
    fn test_first_activity_starts_streak_at_one() {
        let update = advance(StreakState::default(), day(2024, 3, 10));
        assert!(update.changed);
        assert_eq!(update.state, state(1, 1, Some(day(2024, 3, 10))));
    }

    #[test]
    fn test_same_day_repeat_is_unchanged_no_write() {
        let before = state(4, 6, Some(day(2024, 3, 10)));
        let update = advance(before, day(2024, 3, 10));
        assert!(!update.changed);
        assert_eq!(update.state, before);
    }

    #[test]
    fn test_consecutive_day_extends_by_one() {
        let update = advance(state(4, 6, Some(day(2024, 3, 10))), day(2024, 3, 11));
        assert!(update.changed);
        assert_eq!(update.state, state(5, 6, Some(day(2024, 3, 11))));
    }

    #[test]
    fn test_gap_resets_to_one() {
        let update = advance(state(5, 6, Some(day(2024, 3, 10))), day(2024, 3, 15));
        assert!(update.changed);
        assert_eq!(update.state, state(1, 6, Some(day(2024, 3, 15))));
    }

    #[test]
    fn test_backdated_day_is_unchanged() {
        let before = state(5, 6, Some(day(2024, 3, 10)));
        let update = advance(before, day(2024, 3, 8));
        assert!(!update.changed);
        assert_eq!(update.state, before);
    }

    #[test]
    fn test_longest_raised_when_current_overtakes() {
        let update = advance(state(6, 6, Some(day(2024, 3, 10))), day(2024, 3, 11));
        assert_eq!(update.state.current, 7);
        assert_eq!(update.state.longest, 7);
    }

    #[test]
    fn test_month_boundary_counts_as_consecutive() {
        let update = advance(state(2, 2, Some(day(2024, 2, 29))), day(2024, 3, 1));
        assert_eq!(update.state.current, 3);
    }

    // ========================================================================
    // Tracker Tests
    // ========================================================================

    async fn seeded(streak: StreakState) -> (MemoryStore, UserId) {
        let store = MemoryStore::new();
        let user = UserId::new("u1").unwrap();
        let mut profile = Profile::new(user.clone(), "maker");
        profile.streak = streak;
        store.create_profile(&profile).await.unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn test_record_activity_first_ever() {
        let (store, user) = seeded(StreakState::default()).await;
        let result = StreakTracker::record_activity(&store, &user, day(2024, 3, 10))
            .await
            .unwrap();
        assert_eq!((result.current, result.longest), (1, 1));
    }

    #[tokio::test]
    async fn test_record_activity_twice_same_day_is_idempotent() {
        let (store, user) = seeded(StreakState::default()).await;
        let first = StreakTracker::record_activity(&store, &user, day(2024, 3, 10))
            .await
            .unwrap();
        let second = StreakTracker::record_activity(&store, &user, day(2024, 3, 10))
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_record_activity_persists() {
        let (store, user) = seeded(state(4, 6, Some(day(2024, 3, 10)))).await;
        StreakTracker::record_activity(&store, &user, day(2024, 3, 11))
            .await
            .unwrap();

        let stored = store.load_profile(&user).await.unwrap().unwrap().streak;
        assert_eq!(stored, state(5, 6, Some(day(2024, 3, 11))));
    }

    #[tokio::test]
    async fn test_record_activity_unknown_user_errors() {
        let store = MemoryStore::new();
        let result =
            StreakTracker::record_activity(&store, &UserId::new("ghost").unwrap(), day(2024, 3, 10))
                .await;
        assert!(matches!(result.unwrap_err(), CoreError::UnknownUser(_)));
    }

    // ========================================================================
    // Flair Tests
    // ========================================================================

    #[test]
    fn test_flair_thresholds() {
        assert_eq!(flair(0), "\u{1f331}");
        assert_eq!(flair(3), "\u{2728}");
        assert_eq!(flair(7), "\u{1f525}");
        assert_eq!(flair(14), "\u{1f525}\u{1f525}");
        assert_eq!(flair(30), "\u{2b50}");
        assert_eq!(flair(50), "\u{1f31f}");
        assert_eq!(flair(250), "\u{1f4af}");
    }

    // ========================================================================
    // Property Tests
    // ========================================================================

    fn arb_day() -> impl Strategy<Value = NaiveDate> {
        // A few years around the epoch of interest.
        (0u64..2000).prop_map(|offset| {
            day(2022, 1, 1).checked_add_days(Days::new(offset)).unwrap()
        })
    }

    fn arb_state() -> impl Strategy<Value = StreakState> {
        (0u32..500, 0u32..500, proptest::option::of(arb_day())).prop_map(
            |(current, extra, last)| StreakState {
                current,
                longest: current + extra,
                last_activity: last,
            },
        )
    }

    proptest! {
        #[test]
        fn prop_advance_is_idempotent(state in arb_state(), d in arb_day()) {
            let once = advance(state, d);
            let twice = advance(once.state, d);
            prop_assert_eq!(once.state, twice.state);
            prop_assert!(!twice.changed);
        }

        #[test]
        fn prop_longest_is_monotone_and_bounds_current(state in arb_state(), d in arb_day()) {
            let after = advance(state, d).state;
            prop_assert!(after.longest >= state.longest);
            prop_assert!(after.longest >= after.current);
        }

        #[test]
        fn prop_consecutive_day_increments_by_one(state in arb_state(), d in arb_day()) {
            let on_d = advance(state, d).state;
            let next = d.checked_add_days(Days::new(1)).unwrap();
            let after = advance(on_d, next).state;
            prop_assert_eq!(after.current, on_d.current + 1);
        }

        #[test]
        fn prop_gap_resets_to_one(state in arb_state(), d in arb_day(), gap in 2u64..400) {
            let on_d = advance(state, d).state;
            let later = d.checked_add_days(Days::new(gap)).unwrap();
            let after = advance(on_d, later).state;
            prop_assert_eq!(after.current, 1);
        }
    }
}
