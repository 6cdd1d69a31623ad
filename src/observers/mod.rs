//! # Event observers for subscriber lifecycles.
//!
//! This module provides the [`Observe`] trait and the [`ObserverSet`] fan-out
//! that delivers [`Bus`](crate::Bus) events to observers.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   FirstSubscriber ── publish(Event) ──► Bus ──► ObserverSet listener
//!                                                      │
//!                                           ┌──────────┼──────────┐
//!                                           ▼          ▼          ▼
//!                                       LogWriter   Metrics    Custom
//! ```
//!
//! ## Implementing custom observers
//! ```no_run
//! use firstsub::{Observe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct BubbleCounter;
//!
//! #[async_trait]
//! impl Observe for BubbleCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::Bubbled {
//!             // increment counter
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod observer;
mod set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use observer::Observe;
pub use set::ObserverSet;
