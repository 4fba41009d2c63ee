//! Profile data model: identity, entitlement state, and streak state.
//!
//! These types mirror the columns the managed datastore keeps on a user's
//! profile row, plus the subscription-history row mirrored from billing
//! events.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Unique identifier for a user.
///
/// Wraps the identity provider's opaque id with type safety and input
/// validation, so a raw string from a request header can never flow into a
/// datastore query unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Creates a new user id after validation.
    ///
    /// # Errors
    ///
    /// Returns error if the id is empty, exceeds 64 characters, or contains
    /// invalid characters. Only alphanumeric characters, hyphens, and
    /// underscores are allowed.
    pub fn new<S: Into<String>>(id: S) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoreError::InvalidUserId("user id cannot be empty".into()));
        }
        if id.len() > 64 {
            return Err(CoreError::InvalidUserId("user id must be 64 characters or less".into()));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(CoreError::InvalidUserId(
                "user id can only contain alphanumeric characters, hyphens, and underscores"
                    .into(),
            ));
        }
        Ok(Self(id))
    }

    /// Returns the inner string reference.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Plan tier stored on the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    /// Free tier with capped project and update counts.
    Free,
    /// Paid tier with uncapped limits while effectively active.
    Paid,
}

/// Billing status stored on the profile.
///
/// Driven exclusively by the billing synchronizer (or direct administrative
/// action); never mutated by user-facing request handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Subscription is paid up and current.
    Active,
    /// A payment failed; the provider is retrying.
    PastDue,
    /// The subscription was canceled.
    Canceled,
    /// No live subscription (also the account-creation default).
    Inactive,
}

/// Entitlement fields of a profile row.
///
/// A paid tier only grants elevated limits while *effectively* active, see
/// [`EntitlementState::is_effectively_paid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitlementState {
    /// Stored plan tier.
    pub tier: PlanTier,
    /// Stored billing status.
    pub status: PlanStatus,
    /// If present and in the past, the paid plan no longer applies.
    pub end_date: Option<DateTime<Utc>>,
    /// Payment-processor customer reference, used only to correlate
    /// webhook events back to this user.
    pub customer_ref: Option<String>,
    /// Payment-processor subscription reference.
    pub subscription_ref: Option<String>,
}

impl Default for EntitlementState {
    /// The state written at account creation: free tier, no subscription.
    fn default() -> Self {
        Self {
            tier: PlanTier::Free,
            status: PlanStatus::Inactive,
            end_date: None,
            customer_ref: None,
            subscription_ref: None,
        }
    }
}

impl EntitlementState {
    /// Whether the stored plan grants paid limits at `now`.
    ///
    /// True only when the tier is paid, the status is active, and any end
    /// date lies in the future. A canceled-but-not-yet-ended subscription
    /// keeps its paid limits until the end date passes.
    #[must_use]
    pub fn is_effectively_paid(&self, now: DateTime<Utc>) -> bool {
        self.tier == PlanTier::Paid
            && self.status == PlanStatus::Active
            && self.end_date.is_none_or(|end| end > now)
    }
}

/// Streak fields of a profile row.
///
/// Invariant: `longest >= current` after any update performed through
/// [`crate::streak::StreakTracker`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive UTC calendar days with at least one qualifying activity.
    pub current: u32,
    /// Highest value `current` has ever reached.
    pub longest: u32,
    /// UTC calendar date of the most recent qualifying activity.
    pub last_activity: Option<NaiveDate>,
}

/// A user profile row as the core sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique user identifier.
    pub id: UserId,
    /// Public display handle.
    pub handle: String,
    /// Entitlement fields.
    pub entitlement: EntitlementState,
    /// Streak fields.
    pub streak: StreakState,
}

impl Profile {
    /// Creates a fresh profile with account-creation defaults.
    #[must_use]
    pub fn new(id: UserId, handle: impl Into<String>) -> Self {
        Self {
            id,
            handle: handle.into(),
            entitlement: EntitlementState::default(),
            streak: StreakState::default(),
        }
    }
}

/// Billing-history row mirrored from `subscription-updated` events.
///
/// Keyed by the processor's subscription reference and upserted on every
/// update, so replayed deliveries converge instead of appending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Owning user.
    pub user_id: UserId,
    /// Processor customer reference.
    pub customer_ref: String,
    /// Processor subscription reference (the upsert key).
    pub subscription_ref: String,
    /// Processor price reference, when the event carried one.
    pub price_ref: Option<String>,
    /// Status as mapped onto [`PlanStatus`].
    pub status: PlanStatus,
    /// Current billing period start.
    pub period_start: DateTime<Utc>,
    /// Current billing period end.
    pub period_end: DateTime<Utc>,
    /// Whether the subscription is set to lapse at period end.
    pub cancel_at_period_end: bool,
    /// When the subscription was canceled, if it was.
    pub canceled_at: Option<DateTime<Utc>>,
    /// Last time this row was written.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    // ========================================================================
    // UserId Tests
    // ========================================================================

    #[test]
    fn test_user_id_valid() {
        let id = UserId::new("user-123").unwrap();
        assert_eq!(id.as_str(), "user-123");
    }

    #[test]
    fn test_user_id_empty_rejected() {
        let result = UserId::new("");
        assert!(matches!(result.unwrap_err(), CoreError::InvalidUserId(_)));
    }

    #[test]
    fn test_user_id_too_long_rejected() {
        let result = UserId::new("a".repeat(65));
        assert!(matches!(result.unwrap_err(), CoreError::InvalidUserId(_)));
    }

    #[test]
    fn test_user_id_exactly_64_chars_accepted() {
        assert!(UserId::new("a".repeat(64)).is_ok());
    }

    #[test]
    fn test_user_id_rejects_special_chars() {
        assert!(UserId::new("user@example.com").is_err());
        assert!(UserId::new("user 42").is_err());
        assert!(UserId::new("../etc/passwd").is_err());
    }

    #[test]
    fn test_user_id_accepts_uuid_shape() {
        assert!(UserId::new("8f14e45f-ceea-467f-9575-6c3e9ad1a123").is_ok());
    }

    // ========================================================================
    // EntitlementState Tests
    // ========================================================================

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_default_state_is_free_inactive() {
        let state = EntitlementState::default();
        assert_eq!(state.tier, PlanTier::Free);
        assert_eq!(state.status, PlanStatus::Inactive);
        assert!(state.end_date.is_none());
        assert!(!state.is_effectively_paid(Utc::now()));
    }

    #[test]
    fn test_paid_active_no_end_date_is_effective() {
        let state = EntitlementState {
            tier: PlanTier::Paid,
            status: PlanStatus::Active,
            ..EntitlementState::default()
        };
        assert!(state.is_effectively_paid(ts(2024, 3, 10)));
    }

    #[test]
    fn test_paid_active_future_end_date_is_effective() {
        let state = EntitlementState {
            tier: PlanTier::Paid,
            status: PlanStatus::Active,
            end_date: Some(ts(2024, 6, 1)),
            ..EntitlementState::default()
        };
        assert!(state.is_effectively_paid(ts(2024, 3, 10)));
    }

    #[test]
    fn test_paid_active_past_end_date_is_not_effective() {
        let state = EntitlementState {
            tier: PlanTier::Paid,
            status: PlanStatus::Active,
            end_date: Some(ts(2024, 1, 1)),
            ..EntitlementState::default()
        };
        assert!(!state.is_effectively_paid(ts(2024, 3, 10)));
    }

    #[test]
    fn test_paid_past_due_is_not_effective() {
        let state = EntitlementState {
            tier: PlanTier::Paid,
            status: PlanStatus::PastDue,
            ..EntitlementState::default()
        };
        assert!(!state.is_effectively_paid(ts(2024, 3, 10)));
    }

    // ========================================================================
    // Serialization Tests
    // ========================================================================

    #[test]
    fn test_plan_tier_serialization() {
        assert_eq!(serde_json::to_string(&PlanTier::Paid).unwrap(), "\"paid\"");
        assert_eq!(serde_json::to_string(&PlanTier::Free).unwrap(), "\"free\"");
    }

    #[test]
    fn test_plan_status_serialization() {
        assert_eq!(serde_json::to_string(&PlanStatus::PastDue).unwrap(), "\"past_due\"");
        let parsed: PlanStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(parsed, PlanStatus::Inactive);
    }
}
