//! Typed payment-lifecycle events.
//!
//! The payment processor delivers webhook payloads as loosely shaped JSON.
//! This module pins them down to a closed tagged union with a strongly typed
//! payload per kind, so the synchronizer dispatches by exhaustive matching
//! instead of untyped property access. Anything outside the closed set lands
//! in [`BillingEvent::Unrecognized`] and is logged, never an error: the
//! processor sends many event kinds this system does not care about.
//!
//! Signature verification happens before payloads reach this module and is
//! delegated to the processor's tooling; these types assume an authenticated
//! body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::{PlanStatus, UserId};

/// Subscription status vocabulary as the processor reports it.
///
/// Anything the processor adds later decodes as [`ProviderStatus::Other`]
/// and maps onto [`PlanStatus::Inactive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    /// Subscription is paid and current.
    Active,
    /// Latest payment failed; the processor is retrying.
    PastDue,
    /// Subscription was canceled.
    Canceled,
    /// Any status outside the vocabulary above.
    #[serde(other)]
    Other,
}

impl ProviderStatus {
    /// Maps the processor's status onto the locally stored [`PlanStatus`].
    #[must_use]
    pub fn as_plan_status(self) -> PlanStatus {
        match self {
            Self::Active => PlanStatus::Active,
            Self::PastDue => PlanStatus::PastDue,
            Self::Canceled => PlanStatus::Canceled,
            Self::Other => PlanStatus::Inactive,
        }
    }
}

/// A payment-lifecycle event, normalized from the processor's webhook body.
///
/// # Examples
///
/// ```
/// use shiplog_core::billing::BillingEvent;
///
/// let json = r#"{
///     "kind": "payment_failed",
///     "customer_ref": "cus_123"
/// }"#;
/// let event: BillingEvent = serde_json::from_str(json).unwrap();
/// assert!(matches!(event, BillingEvent::PaymentFailed { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BillingEvent {
    /// Checkout completed: the user bought the paid tier.
    ///
    /// The only event kind carrying an internal user reference; the checkout
    /// session is created with the user id in its metadata, and the
    /// processor echoes it back here.
    CheckoutCompleted {
        /// Internal user the checkout session was created for.
        user_id: UserId,
        /// Processor customer reference to store for later correlation.
        customer_ref: String,
        /// Processor subscription reference to store.
        subscription_ref: String,
    },

    /// The subscription changed: renewal, plan switch, scheduled
    /// cancellation, or status transition.
    SubscriptionUpdated {
        /// Processor customer reference for correlating to a local user.
        customer_ref: String,
        /// Processor subscription reference (billing-history upsert key).
        subscription_ref: String,
        /// Status after the change.
        status: ProviderStatus,
        /// Price the subscription currently bills.
        #[serde(default)]
        price_ref: Option<String>,
        /// Current billing period start.
        period_start: DateTime<Utc>,
        /// Current billing period end.
        period_end: DateTime<Utc>,
        /// When the subscription is scheduled to end, if a cancellation is
        /// pending. Becomes the profile's plan end date.
        #[serde(default)]
        cancel_at: Option<DateTime<Utc>>,
        /// Whether the subscription lapses at period end.
        #[serde(default)]
        cancel_at_period_end: bool,
        /// When cancellation was requested, if it was.
        #[serde(default)]
        canceled_at: Option<DateTime<Utc>>,
    },

    /// The subscription ended; the user drops back to the free tier.
    SubscriptionDeleted {
        /// Processor customer reference.
        customer_ref: String,
        /// Processor subscription reference.
        subscription_ref: String,
    },

    /// An invoice payment failed.
    PaymentFailed {
        /// Processor customer reference.
        customer_ref: String,
    },

    /// Any event kind outside the closed set. Logged and skipped.
    #[serde(other)]
    Unrecognized,
}

impl BillingEvent {
    /// Short kind label for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CheckoutCompleted { .. } => "checkout_completed",
            Self::SubscriptionUpdated { .. } => "subscription_updated",
            Self::SubscriptionDeleted { .. } => "subscription_deleted",
            Self::PaymentFailed { .. } => "payment_failed",
            Self::Unrecognized => "unrecognized",
        }
    }
}
