//! Billing: typed payment-lifecycle events and the state synchronizer.

pub mod event;
pub mod sync;

pub use event::{BillingEvent, ProviderStatus};
pub use sync::{SyncOutcome, apply};
