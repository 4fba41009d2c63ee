//! The billing state synchronizer.
//!
//! Reacts to payment-lifecycle events by transitioning the entitlement
//! fields the resolver reads, and mirroring subscription history. Driven
//! entirely by the external event kind; there is no internal state machine.
//!
//! Two delivery realities shape this module:
//!
//! - The provider retries on non-2xx. A branch whose precondition fails
//!   (no matching local user, e.g. a race during onboarding) must therefore
//!   be a logged no-op, never an error.
//! - Deliveries can repeat. Every branch is an upsert, so replaying an event
//!   converges to the same stored state. Out-of-order delivery is *not*
//!   compensated for; last write wins, which is an accepted limitation.

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::{
    billing::event::BillingEvent,
    error::Result,
    profile::{PlanStatus, PlanTier, Profile, SubscriptionRecord},
    store::ProfileStore,
};

/// What applying an event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Entitlement state was written.
    Updated,
    /// The event referenced no local user; nothing was written.
    NoMatchingUser,
    /// The event kind is outside the handled set; nothing was written.
    Skipped,
}

/// Applies one payment-lifecycle event to stored entitlement state.
///
/// `now` is the processing time used for the deletion end date; injecting it
/// keeps the transitions deterministic under test.
///
/// # Errors
///
/// Propagates datastore failures only. Missing local records are
/// [`SyncOutcome::NoMatchingUser`], not errors.
#[instrument(skip(store, event), fields(kind = event.kind()), level = "info")]
pub async fn apply<S: ProfileStore>(
    store: &S,
    event: BillingEvent,
    now: DateTime<Utc>,
) -> Result<SyncOutcome> {
    match event {
        BillingEvent::CheckoutCompleted { user_id, customer_ref, subscription_ref } => {
            let Some(mut profile) = store.load_profile(&user_id).await? else {
                warn!(user = %user_id, "checkout completed for unknown user, skipping");
                return Ok(SyncOutcome::NoMatchingUser);
            };

            profile.entitlement.tier = PlanTier::Paid;
            profile.entitlement.status = PlanStatus::Active;
            // A fresh activation supersedes any end date left by an earlier
            // cancellation.
            profile.entitlement.end_date = None;
            profile.entitlement.customer_ref = Some(customer_ref);
            profile.entitlement.subscription_ref = Some(subscription_ref);
            store.save_entitlement(&profile.id, &profile.entitlement).await?;

            info!(user = %profile.id, "upgraded to paid");
            Ok(SyncOutcome::Updated)
        }

        BillingEvent::SubscriptionUpdated {
            customer_ref,
            subscription_ref,
            status,
            price_ref,
            period_start,
            period_end,
            cancel_at,
            cancel_at_period_end,
            canceled_at,
        } => {
            let Some(mut profile) = match_customer(store, &customer_ref).await? else {
                return Ok(SyncOutcome::NoMatchingUser);
            };

            let plan_status = status.as_plan_status();
            profile.entitlement.status = plan_status;
            profile.entitlement.end_date = cancel_at;
            store.save_entitlement(&profile.id, &profile.entitlement).await?;

            store
                .upsert_subscription(&SubscriptionRecord {
                    user_id: profile.id.clone(),
                    customer_ref,
                    subscription_ref,
                    price_ref,
                    status: plan_status,
                    period_start,
                    period_end,
                    cancel_at_period_end,
                    canceled_at,
                    updated_at: now,
                })
                .await?;

            info!(user = %profile.id, status = ?plan_status, "subscription updated");
            Ok(SyncOutcome::Updated)
        }

        BillingEvent::SubscriptionDeleted { customer_ref, subscription_ref } => {
            let Some(mut profile) = match_customer(store, &customer_ref).await? else {
                return Ok(SyncOutcome::NoMatchingUser);
            };

            profile.entitlement.tier = PlanTier::Free;
            profile.entitlement.status = PlanStatus::Inactive;
            profile.entitlement.end_date = Some(now);
            store.save_entitlement(&profile.id, &profile.entitlement).await?;
            store.mark_subscription_canceled(&subscription_ref, now).await?;

            info!(user = %profile.id, "downgraded to free");
            Ok(SyncOutcome::Updated)
        }

        BillingEvent::PaymentFailed { customer_ref } => {
            let Some(mut profile) = match_customer(store, &customer_ref).await? else {
                return Ok(SyncOutcome::NoMatchingUser);
            };

            profile.entitlement.status = PlanStatus::PastDue;
            store.save_entitlement(&profile.id, &profile.entitlement).await?;

            warn!(user = %profile.id, "payment failed, marked past due");
            Ok(SyncOutcome::Updated)
        }

        BillingEvent::Unrecognized => {
            info!("unhandled billing event kind, ignoring");
            Ok(SyncOutcome::Skipped)
        }
    }
}

async fn match_customer<S: ProfileStore>(
    store: &S,
    customer_ref: &str,
) -> Result<Option<Profile>> {
    let profile = store.find_by_customer(customer_ref).await?;
    if profile.is_none() {
        warn!(customer_ref, "billing event for unknown customer, skipping");
    }
    Ok(profile)
}
