//! Shiplog core: domain rules for a build-in-public platform.
//!
//! Shiplog lets makers create projects, post daily progress updates, and
//! subscribe to a paid tier through an external payment processor. This crate
//! holds the rules layer between the web handlers and the managed datastore:
//!
//! - **Entitlement resolution** ([`entitlement`]): a user's stored plan
//!   state resolved into an effective tier and limit set. Paid only counts
//!   while the subscription is active and not past its end date.
//! - **Usage counting** ([`usage`]): derived counts of owned projects and
//!   of updates posted within the current UTC calendar day.
//! - **The limit gate** ([`gate`]): allow/deny decisions for resource
//!   creation, with a human-readable denial reason. Point-in-time soft
//!   checks, not reservations.
//! - **Streak tracking** ([`streak`]): consecutive-day activity counters,
//!   idempotent per calendar day.
//! - **Billing synchronization** ([`billing`]): typed payment-lifecycle
//!   events applied to stored entitlement state with upsert semantics, so
//!   the provider's redeliveries converge instead of compounding.
//!
//! Persistent state lives behind the [`store::ProfileStore`] trait; the
//! bundled [`store::MemoryStore`] backs tests and the reference server.
//!
//! # Quick Start
//!
//! ```
//! use chrono::Utc;
//! use shiplog_core::{
//!     entitlement::PlanCatalog,
//!     gate::LimitGate,
//!     profile::{Profile, UserId},
//!     store::{MemoryStore, ProfileStore},
//!     streak::StreakTracker,
//! };
//!
//! # async fn example() -> shiplog_core::error::Result<()> {
//! let store = MemoryStore::new();
//! let user = UserId::new("maker-1")?;
//! store.create_profile(&Profile::new(user.clone(), "maker")).await?;
//!
//! let gate = LimitGate::new(PlanCatalog::default());
//! let now = Utc::now();
//!
//! let check = gate.can_create_update(&store, &user, now).await?;
//! assert!(check.allowed);
//!
//! store.insert_update(&user, "shipped the landing page", now).await?;
//! let streak = StreakTracker::record_activity(&store, &user, now.date_naive()).await?;
//! assert_eq!(streak.current, 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency Model
//!
//! Each inbound request is handled independently; the crate holds no shared
//! mutable state across invocations and takes no locks over the datastore.
//! The gate's check-then-create and the streak's read-modify-write are
//! documented soft spots: concurrent requests from one user can exceed a cap
//! by one or double-count a day. Both are cosmetic counters, not billing or
//! security invariants, and the races are accepted as-is.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod billing;
pub mod entitlement;
pub mod error;
pub mod gate;
pub mod profile;
pub mod store;
pub mod streak;
pub mod usage;

pub use error::{CoreError, Result};
pub use profile::{PlanStatus, PlanTier, Profile, UserId};
