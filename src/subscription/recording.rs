//! # RecordingSubscription: in-memory subscription
//!
//! A [`Subscription`] that emits nothing and remembers every call made on it.
//! Use it in tests, or to drive a subscriber by hand.
//!
//! Recorded state:
//! - last requested [`Demand`] (`None` until the first `request`)
//! - number of `request` calls
//! - number of `cancel` calls

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::demand::Demand;
use super::subscription::Subscription;

/// Subscription that records requests and cancellations.
///
/// # Example
/// ```
/// use firstsub::{Demand, RecordingSubscription, Subscription};
///
/// let s = RecordingSubscription::new();
/// assert_eq!(s.requested(), None);
///
/// s.request(Demand::Unbounded);
/// s.cancel();
/// assert_eq!(s.requested(), Some(Demand::Unbounded));
/// assert!(s.is_cancelled());
/// assert_eq!(s.cancel_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RecordingSubscription {
    requested: Mutex<Option<Demand>>,
    requests: AtomicUsize,
    cancels: AtomicUsize,
}

impl RecordingSubscription {
    /// Creates a subscription with nothing recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the subscription behind a shared handle.
    #[must_use]
    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Last requested demand, `None` if `request` was never called.
    pub fn requested(&self) -> Option<Demand> {
        *self.requested.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of `request` calls.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Acquire)
    }

    /// Number of `cancel` calls.
    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::Acquire)
    }

    /// Returns `true` once `cancel` was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_count() > 0
    }
}

impl Subscription for RecordingSubscription {
    fn request(&self, n: Demand) {
        *self.requested.lock().unwrap_or_else(PoisonError::into_inner) = Some(n);
        self.requests.fetch_add(1, Ordering::AcqRel);
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::AcqRel);
    }
}
