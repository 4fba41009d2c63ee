//! Persistence seam for profile, resource, and billing-history state.
//!
//! All persistent state lives in an external managed datastore. This module
//! abstracts the handful of record operations the domain components need, so
//! the rules layer stays independent of any particular backend. The bundled
//! [`MemoryStore`] backs the test suite and the reference server.

mod memory;

use chrono::{DateTime, Utc};

pub use memory::MemoryStore;

use crate::{
    error::Result,
    profile::{EntitlementState, Profile, StreakState, SubscriptionRecord, UserId},
};

/// Record operations required by the domain components.
///
/// Implementations map these onto the managed datastore's CRUD, equality
/// filtering, and count queries. All methods are point-in-time reads or
/// last-write-wins writes; no method takes or holds a lock, so check-then-act
/// sequences built on top of this trait are soft, not transactional.
pub trait ProfileStore: Send + Sync {
    /// Loads a profile by user id, or `None` when no row exists.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CoreError::Storage`] on backend failure.
    fn load_profile(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Option<Profile>>> + Send;

    /// Finds the profile whose stored customer reference matches, if any.
    ///
    /// This is how asynchronous billing events are correlated back to a
    /// local user.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CoreError::Storage`] on backend failure.
    fn find_by_customer(
        &self,
        customer_ref: &str,
    ) -> impl Future<Output = Result<Option<Profile>>> + Send;

    /// Creates a profile row. Overwrites any existing row with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CoreError::Storage`] on backend failure.
    fn create_profile(&self, profile: &Profile) -> impl Future<Output = Result<()>> + Send;

    /// Writes the entitlement fields of an existing profile.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CoreError::UnknownUser`] if no profile exists,
    /// or [`crate::error::CoreError::Storage`] on backend failure.
    fn save_entitlement(
        &self,
        user: &UserId,
        state: &EntitlementState,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Writes the streak fields of an existing profile.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CoreError::UnknownUser`] if no profile exists,
    /// or [`crate::error::CoreError::Storage`] on backend failure.
    fn save_streak(
        &self,
        user: &UserId,
        state: &StreakState,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Counts projects owned by the user.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CoreError::Storage`] on backend failure.
    fn project_count(&self, user: &UserId) -> impl Future<Output = Result<u32>> + Send;

    /// Counts updates owned by the user created within `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CoreError::Storage`] on backend failure.
    fn update_count_between(
        &self,
        user: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<u32>> + Send;

    /// Persists a new project record owned by the user.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CoreError::Storage`] on backend failure.
    fn insert_project(
        &self,
        user: &UserId,
        name: &str,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Persists a new update record owned by the user with the given
    /// creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CoreError::Storage`] on backend failure.
    fn insert_update(
        &self,
        user: &UserId,
        content: &str,
        posted_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Upserts the billing-history row keyed by its subscription reference.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CoreError::Storage`] on backend failure.
    fn upsert_subscription(
        &self,
        record: &SubscriptionRecord,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Marks the billing-history row canceled, if one exists.
    ///
    /// A missing row is a silent no-op; the provider may deliver a deletion
    /// for a subscription whose update events never reached us.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CoreError::Storage`] on backend failure.
    fn mark_subscription_canceled(
        &self,
        subscription_ref: &str,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;
}
