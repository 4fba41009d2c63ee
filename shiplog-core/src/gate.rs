//! The limit gate: allow/deny decisions for resource creation.
//!
//! Combines the entitlement resolver with the usage counters. Every decision
//! is a point-in-time check evaluated at the moment of the creation request,
//! not a reservation: two concurrent requests from the same user can both
//! observe "allowed" and exceed the nominal cap by one. That is an accepted
//! soft limit, not an invariant this module defends.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    entitlement::{EntitlementResolver, PlanCatalog},
    error::Result,
    profile::UserId,
    store::ProfileStore,
    usage,
};

/// Outcome of a limit check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitCheck {
    /// Whether the creation may proceed.
    pub allowed: bool,
    /// Human-readable denial reason, present only when denied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Count of existing resources at decision time.
    pub current: u32,
    /// The applicable cap, `None` meaning unlimited.
    pub limit: Option<u32>,
}

impl LimitCheck {
    fn allowed(current: u32, limit: Option<u32>) -> Self {
        Self { allowed: true, reason: None, current, limit }
    }

    fn denied(reason: String, current: u32, limit: u32) -> Self {
        Self { allowed: false, reason: Some(reason), current, limit: Some(limit) }
    }
}

/// Gate evaluated before creating projects or updates.
///
/// # Examples
///
/// ```
/// use shiplog_core::{
///     entitlement::PlanCatalog,
///     gate::LimitGate,
///     profile::{Profile, UserId},
///     store::{MemoryStore, ProfileStore},
/// };
///
/// # async fn example() -> shiplog_core::error::Result<()> {
/// let store = MemoryStore::new();
/// let user = UserId::new("user-1")?;
/// store.create_profile(&Profile::new(user.clone(), "maker")).await?;
///
/// let gate = LimitGate::new(PlanCatalog::default());
/// let check = gate.can_create_project(&store, &user, chrono::Utc::now()).await?;
/// assert!(check.allowed);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LimitGate {
    resolver: EntitlementResolver,
}

impl LimitGate {
    /// Creates a gate over an immutable plan catalog.
    #[must_use]
    pub fn new(catalog: PlanCatalog) -> Self {
        Self { resolver: EntitlementResolver::new(catalog) }
    }

    /// Decides whether the user may create another project right now.
    ///
    /// Unlimited plans skip the count query entirely.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CoreError::UnknownUser`] for an absent
    /// profile, or propagates datastore failures.
    #[instrument(skip(self, store), fields(user = %user), level = "debug")]
    pub async fn can_create_project<S: ProfileStore>(
        &self,
        store: &S,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<LimitCheck> {
        let entitlement = self.resolver.resolve(store, user, now).await?;

        let Some(limit) = entitlement.limits.max_projects else {
            return Ok(LimitCheck::allowed(0, None));
        };

        let current = usage::project_count(store, user).await?;
        debug!(current, limit, "project limit check");

        if current >= limit {
            return Ok(LimitCheck::denied(
                format!(
                    "Free accounts can have up to {limit} projects. Upgrade to unlock \
                     unlimited projects."
                ),
                current,
                limit,
            ));
        }
        Ok(LimitCheck::allowed(current, Some(limit)))
    }

    /// Decides whether the user may post another update today (UTC).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CoreError::UnknownUser`] for an absent
    /// profile, or propagates datastore failures.
    #[instrument(skip(self, store), fields(user = %user), level = "debug")]
    pub async fn can_create_update<S: ProfileStore>(
        &self,
        store: &S,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<LimitCheck> {
        let entitlement = self.resolver.resolve(store, user, now).await?;

        let Some(limit) = entitlement.limits.max_updates_per_day else {
            return Ok(LimitCheck::allowed(0, None));
        };

        let current = usage::updates_on(store, user, now.date_naive()).await?;
        debug!(current, limit, "daily update limit check");

        if current >= limit {
            return Ok(LimitCheck::denied(
                format!(
                    "Free accounts can post {limit} updates per day and you've reached \
                     today's limit. Upgrade to post without caps."
                ),
                current,
                limit,
            ));
        }
        Ok(LimitCheck::allowed(current, Some(limit)))
    }
}
