//! Subscriber events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/observe what subscribers do at each protocol call.
//!
//! ## Contents
//! - [`EventKind`], [`Event`], [`Signal`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `FirstSubscriber` (when built with a bus), `ObserverSet`
//!   workers (overflow/panic).
//! - **Consumers**: `ObserverSet` listener (fans out to observers), or any
//!   receiver from [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind, Signal};
