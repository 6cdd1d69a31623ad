//! # Upstream subscription capability.
//!
//! The subscription is owned by the producer; the subscriber only holds a shared
//! handle to it and uses it to signal demand and cancellation.
//!
//! ## Contents
//! - [`Subscription`] the `request`/`cancel` capability
//! - [`SubscriptionRef`] shared handle (`Arc<dyn Subscription>`)
//! - [`Demand`] positive request count or unbounded
//! - [`RecordingSubscription`] in-memory implementation that records every call

mod demand;
mod recording;
mod subscription;

pub use demand::Demand;
pub use recording::RecordingSubscription;
pub use subscription::{Subscription, SubscriptionRef};
