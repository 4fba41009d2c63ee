//! Error types for the Shiplog core.
//!
//! All errors implement the standard [`std::error::Error`] trait via
//! [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Identity errors** ([`CoreError::UnknownUser`], [`CoreError::InvalidUserId`]):
//!   the caller's user reference is absent or malformed
//! - **Event errors** ([`CoreError::InvalidEvent`]): a billing event payload
//!   cannot be interpreted
//! - **Storage errors** ([`CoreError::Storage`]): the backing datastore failed
//!
//! # Examples
//!
//! ```
//! use shiplog_core::error::{CoreError, Result};
//!
//! fn require_handle(handle: &str) -> Result<&str> {
//!     if handle.is_empty() {
//!         return Err(CoreError::InvalidEvent("handle cannot be empty".to_owned()));
//!     }
//!     Ok(handle)
//! }
//! ```

use thiserror::Error;

/// Result type alias for core operations.
///
/// All fallible functions in this crate return this type. Results should be
/// handled by the caller, either checked, propagated with `?`, or explicitly
/// acknowledged where failure is impossible.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in the Shiplog core.
///
/// Every component fails fast and returns a typed error to its caller rather
/// than attempting recovery. The one documented exception is the billing
/// synchronizer's "no matching user" branch, which is a logged no-op and not
/// an error at all (the payment provider retries on non-2xx, so a missing
/// local record must never produce a hard failure).
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum CoreError {
    /// No profile exists for the given user id.
    ///
    /// Callers must treat this as "not authenticated", never as "free tier":
    /// resolving entitlements for a user the datastore has no record of is a
    /// session problem, not a plan-tier question.
    #[error("no profile found for user: {0}")]
    UnknownUser(String),

    /// User id failed validation.
    ///
    /// User ids must be non-empty, at most 64 characters, and contain only
    /// alphanumeric characters, hyphens, and underscores.
    ///
    /// # Examples
    ///
    /// ```
    /// use shiplog_core::error::CoreError;
    ///
    /// let err = CoreError::InvalidUserId("user@example.com".to_owned());
    /// assert!(err.to_string().contains("invalid user id"));
    /// ```
    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    /// A billing event payload could not be interpreted.
    ///
    /// The webhook layer rejects undecodable payloads before the synchronizer
    /// runs, so this surfaces only for payloads that decode but carry values
    /// the domain cannot accept.
    #[error("invalid billing event: {0}")]
    InvalidEvent(String),

    /// The backing datastore failed.
    ///
    /// Transient by nature; no automatic retry is performed anywhere in this
    /// crate. Surfaced to the caller as a generic failure.
    #[error("datastore failure: {0}")]
    Storage(String),
}
