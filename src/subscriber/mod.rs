//! # First-value subscriber core.
//!
//! This module provides the producer-facing protocol ([`Signals`]) and its
//! single-value implementation ([`FirstSubscriber`]).
//!
//! ## Contents
//! - [`Signals`] the four protocol calls a producer makes
//! - [`FirstSubscriber`] callback-driven consumer of at most one value
//! - [`FirstSubscriberBuilder`] assembles a subscriber with config, bus and name
//! - [`State`] explicit lifecycle tag (`Unsubscribed` → `Active` → `Terminated`)
//! - handler aliases ([`ValueHandler`], [`ErrorHandler`], [`CompleteHandler`], [`SubscribeHandler`])

mod builder;
mod first;
mod handlers;
mod signals;
mod state;

pub use builder::FirstSubscriberBuilder;
pub use first::FirstSubscriber;
pub use handlers::{CompleteHandler, ErrorHandler, SubscribeHandler, ValueHandler};
pub use signals::Signals;
pub use state::State;
