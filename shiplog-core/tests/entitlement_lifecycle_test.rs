//! End-to-end lifecycle test: a free user hits their caps, upgrades through
//! a checkout, loses the subscription again, and keeps a streak going
//! throughout. Exercises the gate, resolver, streak tracker, and billing
//! synchronizer together against the in-memory store.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use shiplog_core::{
    billing::{self, BillingEvent, ProviderStatus, SyncOutcome},
    entitlement::PlanCatalog,
    gate::LimitGate,
    profile::{PlanStatus, PlanTier, Profile, UserId},
    store::{MemoryStore, ProfileStore},
    streak::StreakTracker,
};

fn noon(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

async fn signup(store: &MemoryStore, id: &str) -> UserId {
    let user = UserId::new(id).unwrap();
    store.create_profile(&Profile::new(user.clone(), id)).await.unwrap();
    user
}

#[tokio::test]
async fn free_user_upgrade_and_churn_lifecycle() {
    let store = MemoryStore::new();
    let gate = LimitGate::new(PlanCatalog::default());
    let user = signup(&store, "maker-1").await;

    // Fill the free project quota.
    for name in ["cli", "blog", "saas"] {
        let check = gate.can_create_project(&store, &user, noon(1)).await.unwrap();
        assert!(check.allowed);
        store.insert_project(&user, name).await.unwrap();
    }
    let denied = gate.can_create_project(&store, &user, noon(1)).await.unwrap();
    assert!(!denied.allowed);
    assert_eq!((denied.current, denied.limit), (3, Some(3)));

    // Checkout completes; the webhook upgrades the account.
    let outcome = billing::apply(
        &store,
        BillingEvent::CheckoutCompleted {
            user_id: user.clone(),
            customer_ref: "cus_m1".to_owned(),
            subscription_ref: "sub_m1".to_owned(),
        },
        noon(2),
    )
    .await
    .unwrap();
    assert_eq!(outcome, SyncOutcome::Updated);

    // Paid users pass the gate regardless of count.
    let check = gate.can_create_project(&store, &user, noon(2)).await.unwrap();
    assert!(check.allowed);
    assert_eq!(check.limit, None);

    // The provider confirms the subscription; history is mirrored.
    billing::apply(
        &store,
        BillingEvent::SubscriptionUpdated {
            customer_ref: "cus_m1".to_owned(),
            subscription_ref: "sub_m1".to_owned(),
            status: ProviderStatus::Active,
            price_ref: Some("price_pro_monthly".to_owned()),
            period_start: noon(2),
            period_end: noon(31),
            cancel_at: None,
            cancel_at_period_end: false,
            canceled_at: None,
        },
        noon(2),
    )
    .await
    .unwrap();
    let record = store.subscription("sub_m1").await.unwrap();
    assert_eq!(record.status, PlanStatus::Active);

    // The subscription ends; the user drops back to free limits.
    billing::apply(
        &store,
        BillingEvent::SubscriptionDeleted {
            customer_ref: "cus_m1".to_owned(),
            subscription_ref: "sub_m1".to_owned(),
        },
        noon(20),
    )
    .await
    .unwrap();

    let profile = store.load_profile(&user).await.unwrap().unwrap();
    assert_eq!(profile.entitlement.tier, PlanTier::Free);
    assert_eq!(profile.entitlement.status, PlanStatus::Inactive);
    assert_eq!(profile.entitlement.end_date, Some(noon(20)));

    let denied_again = gate.can_create_project(&store, &user, noon(21)).await.unwrap();
    assert!(!denied_again.allowed);
}

#[tokio::test]
async fn daily_posting_builds_and_breaks_a_streak() {
    let store = MemoryStore::new();
    let gate = LimitGate::new(PlanCatalog::default());
    let user = signup(&store, "maker-2").await;

    // Three consecutive days of posting.
    for d in 1..=3 {
        let check = gate.can_create_update(&store, &user, noon(d)).await.unwrap();
        assert!(check.allowed);
        store.insert_update(&user, "progress", noon(d)).await.unwrap();
        let streak = StreakTracker::record_activity(&store, &user, day(d)).await.unwrap();
        assert_eq!(streak.current, d);
    }

    // A second post on day 3 changes nothing.
    store.insert_update(&user, "more progress", noon(3)).await.unwrap();
    let streak = StreakTracker::record_activity(&store, &user, day(3)).await.unwrap();
    assert_eq!((streak.current, streak.longest), (3, 3));

    // Four quiet days break the streak.
    let streak = StreakTracker::record_activity(&store, &user, day(8)).await.unwrap();
    assert_eq!((streak.current, streak.longest), (1, 3));
}

#[tokio::test]
async fn webhook_replay_converges() {
    let store = MemoryStore::new();
    let user = signup(&store, "maker-3").await;

    let checkout = BillingEvent::CheckoutCompleted {
        user_id: user.clone(),
        customer_ref: "cus_m3".to_owned(),
        subscription_ref: "sub_m3".to_owned(),
    };
    billing::apply(&store, checkout.clone(), noon(1)).await.unwrap();
    let first = store.load_profile(&user).await.unwrap().unwrap().entitlement;

    // The provider redelivers the same event.
    billing::apply(&store, checkout, noon(1)).await.unwrap();
    let second = store.load_profile(&user).await.unwrap().unwrap().entitlement;
    assert_eq!(first, second);

    // Events for customers we have never seen are silent no-ops.
    let outcome = billing::apply(
        &store,
        BillingEvent::PaymentFailed { customer_ref: "cus_stranger".to_owned() },
        noon(2),
    )
    .await
    .unwrap();
    assert_eq!(outcome, SyncOutcome::NoMatchingUser);
}
