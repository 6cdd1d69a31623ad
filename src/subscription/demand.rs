//! # Request demand.
//!
//! [`Demand`] is the argument of [`Subscription::request`](super::Subscription::request):
//! either a positive count or "unbounded".
//!
//! Following the reactive-streams convention, a count of `u64::MAX` is the same
//! as unbounded and is normalized to [`Demand::Unbounded`].

use std::fmt;
use std::num::NonZeroU64;

/// Positive request count or unbounded.
///
/// # Example
/// ```
/// use firstsub::Demand;
///
/// assert_eq!(Demand::new(0), None);
/// assert_eq!(Demand::new(32).map(Demand::as_u64), Some(32));
/// assert_eq!(Demand::new(u64::MAX), Some(Demand::Unbounded));
/// assert_eq!(Demand::Unbounded.as_u64(), u64::MAX);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Demand {
    /// At most this many values.
    Bounded(NonZeroU64),
    /// As many values as the producer can emit.
    Unbounded,
}

impl Demand {
    /// Builds a demand of `n` values; `None` for zero (an illegal request).
    #[inline]
    pub fn new(n: u64) -> Option<Self> {
        match n {
            u64::MAX => Some(Demand::Unbounded),
            n => NonZeroU64::new(n).map(Demand::Bounded),
        }
    }

    /// Returns the count, with `u64::MAX` standing for unbounded.
    #[inline]
    pub fn as_u64(self) -> u64 {
        match self {
            Demand::Bounded(n) => n.get(),
            Demand::Unbounded => u64::MAX,
        }
    }

    /// Returns `true` for [`Demand::Unbounded`].
    #[inline]
    pub fn is_unbounded(self) -> bool {
        matches!(self, Demand::Unbounded)
    }
}

impl From<NonZeroU64> for Demand {
    fn from(n: NonZeroU64) -> Self {
        match n.get() {
            u64::MAX => Demand::Unbounded,
            _ => Demand::Bounded(n),
        }
    }
}

impl fmt::Display for Demand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Demand::Bounded(n) => write!(f, "{n}"),
            Demand::Unbounded => f.write_str("unbounded"),
        }
    }
}
