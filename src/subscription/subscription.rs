//! # Subscription trait.
//!
//! A [`Subscription`] represents backpressure control over one producer. The
//! subscriber receives it once through `on_subscribe` and keeps a single
//! [`SubscriptionRef`] until it reaches a terminal state.
//!
//! ## Contract for implementors
//! - `request` and `cancel` must not block.
//! - `cancel` must be idempotent; the subscriber issues it at most once, but
//!   producers can race with their own teardown.
//! - Either method may synchronously call back into the subscriber
//!   (e.g. a synchronous producer emitting the value from inside `request`).

use std::sync::Arc;

use super::demand::Demand;

/// Demand and cancellation capability handed in by the producer.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use firstsub::{Demand, Subscription};
///
/// #[derive(Default)]
/// struct Flag(AtomicBool);
///
/// impl Subscription for Flag {
///     fn request(&self, _n: Demand) {}
///     fn cancel(&self) { self.0.store(true, Ordering::Release); }
/// }
///
/// let s = Flag::default();
/// s.cancel();
/// assert!(s.0.load(Ordering::Acquire));
/// ```
pub trait Subscription: Send + Sync {
    /// Asks the producer for up to `n` more values.
    fn request(&self, n: Demand);

    /// Asks the producer to stop emitting and release resources.
    fn cancel(&self);
}

/// Shared subscription handle.
pub type SubscriptionRef = Arc<dyn Subscription>;
