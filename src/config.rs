//! # Subscriber configuration.
//!
//! Provides [`Config`] centralized settings for building subscribers.
//!
//! Config is used in two ways:
//! 1. **Default request policy**: what a subscriber without an on-subscribe
//!    handler requests from its subscription.
//! 2. **Event bus sizing**: `Bus::from_config(&config)`.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`Config::bus_capacity_clamped`]

use crate::subscription::Demand;

/// Settings shared by the subscribers of one application.
///
/// ## Field semantics
/// - `initial_request`: demand issued by the default on-subscribe policy
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Demand requested when no on-subscribe handler is supplied.
    ///
    /// The default is [`Demand::Unbounded`]: a subscriber without a custom flow
    /// control policy takes as much as the producer is willing to give.
    pub initial_request: Demand,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events observe
    /// `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `initial_request = Demand::Unbounded`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            initial_request: Demand::Unbounded,
            bus_capacity: 1024,
        }
    }
}
