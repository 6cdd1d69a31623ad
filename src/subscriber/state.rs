//! Lifecycle tag of a subscriber.
//!
//! ```text
//! Unsubscribed ──on_subscribe──► Active ──on_next/on_error/on_complete──► Terminated
//!       │                          │
//!       └─────── (handler failed) ─┴──────────────────────────────────────► Terminated
//! ```
//!
//! Transitions are compare-and-swap, so each one happens at most once even if a
//! misbehaving producer races two signals.

use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a [`FirstSubscriber`](crate::FirstSubscriber).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum State {
    /// Waiting for `on_subscribe`.
    Unsubscribed = 0,
    /// Subscription stored; waiting for a terminal signal.
    Active = 1,
    /// Value, error or completion handled; everything else is dropped.
    Terminated = 2,
}

impl State {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => State::Unsubscribed,
            1 => State::Active,
            _ => State::Terminated,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            State::Unsubscribed => "unsubscribed",
            State::Active => "active",
            State::Terminated => "terminated",
        }
    }
}

/// Atomic cell holding a [`State`].
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(State::Unsubscribed as u8))
    }

    pub(crate) fn load(&self) -> State {
        State::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves `from` → `to`; returns `false` (and changes nothing) if the current state is not `from`.
    pub(crate) fn transition(&self, from: State, to: State) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Forces `Terminated`; returns the previous state.
    pub(crate) fn terminate(&self) -> State {
        State::from_u8(self.0.swap(State::Terminated as u8, Ordering::AcqRel))
    }
}
