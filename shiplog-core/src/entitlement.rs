//! Plan limits and the entitlement resolver.
//!
//! The limit tables are immutable configuration, built once at process start
//! and injected into the resolver. Nothing in this module mutates state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{CoreError, Result},
    profile::{PlanTier, UserId},
    store::ProfileStore,
};

/// Numeric limits and feature flags attached to a plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    /// Maximum number of projects, `None` meaning unlimited.
    pub max_projects: Option<u32>,
    /// Maximum updates per UTC calendar day, `None` meaning unlimited.
    pub max_updates_per_day: Option<u32>,
    /// Maximum images attachable to a single update.
    pub max_images_per_update: u32,
    /// Whether AI insight features are available.
    pub ai_insights: bool,
    /// Whether the analytics dashboard is available.
    pub analytics: bool,
    /// Whether the profile shows a premium badge.
    pub premium_badge: bool,
}

/// The static per-tier limit tables.
///
/// [`PlanCatalog::default`] carries the production values; alternate catalogs
/// exist so tests can exercise boundary behavior without fixture users
/// holding dozens of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanCatalog {
    /// Limits applied to free-tier users.
    pub free: PlanLimits,
    /// Limits applied to effectively-paid users.
    pub paid: PlanLimits,
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self {
            free: PlanLimits {
                max_projects: Some(3),
                max_updates_per_day: Some(5),
                max_images_per_update: 1,
                ai_insights: false,
                analytics: false,
                premium_badge: false,
            },
            paid: PlanLimits {
                max_projects: None,
                max_updates_per_day: None,
                max_images_per_update: 5,
                ai_insights: true,
                analytics: true,
                premium_badge: true,
            },
        }
    }
}

impl PlanCatalog {
    /// Returns the limit set for a tier.
    #[must_use]
    pub fn limits_for(&self, tier: PlanTier) -> PlanLimits {
        match tier {
            PlanTier::Free => self.free,
            PlanTier::Paid => self.paid,
        }
    }
}

/// A user's resolved plan tier and limit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Entitlement {
    /// Effective tier after the active/end-date test.
    pub tier: PlanTier,
    /// Limit set for that tier.
    pub limits: PlanLimits,
}

/// Resolves a user's stored entitlement state into an effective tier and
/// limit set.
///
/// # Examples
///
/// ```
/// use shiplog_core::entitlement::{EntitlementResolver, PlanCatalog};
///
/// let resolver = EntitlementResolver::new(PlanCatalog::default());
/// assert_eq!(resolver.catalog().free.max_projects, Some(3));
/// ```
#[derive(Debug, Clone)]
pub struct EntitlementResolver {
    catalog: PlanCatalog,
}

impl EntitlementResolver {
    /// Creates a resolver over an immutable plan catalog.
    #[must_use]
    pub fn new(catalog: PlanCatalog) -> Self {
        Self { catalog }
    }

    /// Returns the injected catalog.
    #[must_use]
    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    /// Resolves the effective entitlement for a user at `now`.
    ///
    /// The stored tier only counts as paid while the status is active and
    /// any end date lies in the future; everything else resolves to the free
    /// limit set.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownUser`] if no profile exists. Callers must
    /// treat that as "not authenticated", not as "free tier".
    pub async fn resolve<S: ProfileStore>(
        &self,
        store: &S,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Entitlement> {
        let profile = store
            .load_profile(user)
            .await?
            .ok_or_else(|| CoreError::UnknownUser(user.as_str().to_owned()))?;

        let tier = if profile.entitlement.is_effectively_paid(now) {
            PlanTier::Paid
        } else {
            PlanTier::Free
        };

        Ok(Entitlement { tier, limits: self.catalog.limits_for(tier) })
    }
}
