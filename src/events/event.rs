//! # Lifecycle events emitted by subscribers.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Protocol events**: subscription handshake, demand, cancellation
//! - **Terminal events**: how the subscriber ended (value, error, completion,
//!   bubbling or fatal failure) and signals dropped after the end
//! - **Observer events**: problems inside the observer fan-out itself
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! subscriber name, the protocol signal involved, demand, and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use firstsub::{Demand, Event, EventKind, Signal};
//!
//! let ev = Event::new(EventKind::Requested)
//!     .with_subscriber("first-price")
//!     .with_signal(Signal::Subscribe)
//!     .with_demand(Demand::Unbounded);
//!
//! assert_eq!(ev.kind, EventKind::Requested);
//! assert_eq!(ev.subscriber.as_deref(), Some("first-price"));
//! assert_eq!(ev.demand, Some(Demand::Unbounded));
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::subscription::Demand;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of subscriber events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Protocol events ===
    /// Subscription received and stored.
    ///
    /// Sets:
    /// - `signal`: `Subscribe`
    Subscribed,

    /// A second subscription arrived; it was cancelled and ignored.
    ///
    /// Sets:
    /// - `signal`: `Subscribe`
    DuplicateSubscription,

    /// Default on-subscribe policy requested demand.
    ///
    /// Sets:
    /// - `signal`: `Subscribe`
    /// - `demand`: requested amount
    Requested,

    /// The stored subscription was cancelled.
    ///
    /// Sets:
    /// - `signal`: the protocol call that triggered cancellation
    Cancelled,

    // === Terminal events ===
    /// The value callback returned normally.
    ///
    /// Sets:
    /// - `signal`: `Next`
    ValueDelivered,

    /// An error is being handed to the error callback.
    ///
    /// Sets:
    /// - `signal`: `Subscribe` (failed subscribe handler) or `Error`
    /// - `reason`: error message
    ErrorDelivered,

    /// The complete callback is being invoked.
    ///
    /// Sets:
    /// - `signal`: `Complete`
    Completed,

    /// A normal callback error escaped as a bubbling failure.
    ///
    /// Sets:
    /// - `signal`: protocol call that raised it
    /// - `reason`: original error message
    Bubbled,

    /// A fatal callback error was handed back unchanged.
    ///
    /// Sets:
    /// - `signal`: protocol call that raised it
    /// - `reason`: error message
    FatalRethrown,

    /// A signal arrived after the subscriber terminated (or before it subscribed)
    /// and was dropped.
    ///
    /// Sets:
    /// - `signal`: dropped signal
    /// - `reason`: dropped error message (for `Error` only)
    SignalDropped,

    // === Observer events ===
    /// Observer panicked during event processing.
    ///
    /// Sets:
    /// - `subscriber`: observer name
    /// - `reason`: panic info/message
    ObserverPanicked,

    /// Observer dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subscriber`: observer name
    /// - `reason`: reason string (e.g., "full", "closed")
    ObserverOverflow,
}

/// Producer-facing protocol call an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// `on_subscribe`: the producer handed over its subscription.
    Subscribe,
    /// `on_next`: the producer emitted a value.
    Next,
    /// `on_error`: the producer failed.
    Error,
    /// `on_complete`: the producer finished without a value.
    Complete,
}

impl Signal {
    /// Returns the protocol method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Subscribe => "on_subscribe",
            Signal::Next => "on_next",
            Signal::Error => "on_error",
            Signal::Complete => "on_complete",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscriber event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the emitting subscriber (or observer), if configured.
    pub subscriber: Option<Arc<str>>,
    /// Protocol call the event refers to.
    pub signal: Option<Signal>,
    /// Requested demand.
    pub demand: Option<Demand>,
    /// Human-readable reason (error messages, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            subscriber: None,
            signal: None,
            demand: None,
            reason: None,
        }
    }

    /// Attaches the subscriber name.
    #[inline]
    pub fn with_subscriber(mut self, name: impl Into<Arc<str>>) -> Self {
        self.subscriber = Some(name.into());
        self
    }

    /// Attaches the protocol signal.
    #[inline]
    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Attaches a demand.
    #[inline]
    pub fn with_demand(mut self, demand: Demand) -> Self {
        self.demand = Some(demand);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates an observer overflow event.
    #[inline]
    pub fn observer_overflow(observer: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::ObserverOverflow)
            .with_subscriber(observer)
            .with_reason(format!("observer={observer} reason={reason}"))
    }

    /// Creates an observer panic event.
    #[inline]
    pub fn observer_panicked(observer: &'static str, info: String) -> Self {
        Event::new(EventKind::ObserverPanicked)
            .with_subscriber(observer)
            .with_reason(info)
    }

    /// Returns `true` for [`EventKind::ObserverOverflow`] events.
    #[inline]
    pub fn is_observer_overflow(&self) -> bool {
        matches!(self.kind, EventKind::ObserverOverflow)
    }

    /// Returns `true` for events describing how a subscriber ended.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::ValueDelivered
                | EventKind::ErrorDelivered
                | EventKind::Completed
                | EventKind::Bubbled
                | EventKind::FatalRethrown
        )
    }
}
