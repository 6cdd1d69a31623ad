//! # Producer-facing protocol.
//!
//! [`Signals`] is what a producer calls, in this order:
//!
//! ```text
//! on_subscribe ──► ( on_next | on_error | on_complete )
//! ```
//!
//! `on_subscribe` exactly once and first; then at most one terminal signal.
//! Calls on one instance must be serialized by the producer.
//!
//! ## Return value
//! `Ok(())` means the subscriber absorbed the signal. `Err(failure)` is a failure
//! the subscriber refuses to absorb; the producer must let it propagate and must
//! not feed it back into `on_error`:
//! - fatal failures ([`Failure::is_fatal`]) are returned unchanged;
//! - bubbling failures ([`Failure::is_bubbling`]) wrap a callback error that could
//!   not be reported as a stream error;
//! - anything raised by the error or complete callback is returned unchanged.

use crate::error::Failure;
use crate::subscription::SubscriptionRef;

/// Protocol surface invoked by a producer.
pub trait Signals<T>: Send + Sync {
    /// Hands in the subscription.
    fn on_subscribe(&self, subscription: SubscriptionRef) -> Result<(), Failure>;

    /// Delivers one value.
    fn on_next(&self, value: T) -> Result<(), Failure>;

    /// Terminates the stream with an error.
    fn on_error(&self, error: Failure) -> Result<(), Failure>;

    /// Terminates the stream normally.
    fn on_complete(&self) -> Result<(), Failure>;
}
