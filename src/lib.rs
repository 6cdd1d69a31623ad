//! # firstsub
//!
//! **firstsub** is the consumer side of a single-value stream protocol.
//!
//! A producer hands a [`FirstSubscriber`] a subscription, the subscriber negotiates
//! demand, delivers at most one value to user callbacks, and classifies every
//! failure raised by those callbacks as either *normal* (reported through the
//! error callback) or *fatal* (never swallowed; handed back to the caller).
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐        on_subscribe / on_next / on_error / on_complete
//!     │   Producer   │ ─────────────────────────────────────────────┐
//!     └──────▲───────┘                                              ▼
//!            │ request / cancel                   ┌───────────────────────────────────┐
//!            │                                    │  FirstSubscriber (Signals impl)   │
//!     ┌──────┴───────┐                            │  - State (Unsubscribed/Active/    │
//!     │ Subscription │ ◄──────────────────────────│    Terminated, CAS transitions)   │
//!     └──────────────┘        single slot         │  - subscription slot (take once)  │
//!                                                 │  - user handlers                  │
//!                                                 └──────┬──────────────────┬─────────┘
//!                                                        │                  │
//!                                            classify::is_fatal       Bus (optional)
//!                                            Failure::bubble               │
//!                                                                          ▼
//!                                                                   ObserverSet
//!                                                              ┌─────────┼─────────┐
//!                                                              ▼         ▼         ▼
//!                                                          LogWriter  Metrics   Custom
//! ```
//!
//! ### Failure routing
//! ```text
//! handler            │ normal failure                 │ fatal failure
//! ───────────────────┼────────────────────────────────┼─────────────────────────────
//! on_subscribe       │ cancel, then on_error(failure) │ returned as-is, no cancel
//! on_value           │ cancel first, Err(bubbling)    │ cancel first, returned as-is
//! on_error/complete  │ returned as-is                 │ returned as-is
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Subscriber**    | Single-value consumer driven by user callbacks.              | [`FirstSubscriber`], [`Signals`]            |
//! | **Errors**        | Cloneable failures, fatal taxonomy, bubbling wrapper.        | [`Failure`], [`FatalError`], [`BubblingError`] |
//! | **Classification**| Centralized fatal/normal predicate.                          | [`is_fatal`], [`Severity`]                  |
//! | **Flow control**  | Subscription capability and demand.                          | [`Subscription`], [`Demand`]                |
//! | **Observability** | Lifecycle events and async observers.                        | [`Bus`], [`Event`], [`Observe`], [`ObserverSet`] |
//! | **Configuration** | Default request policy and bus sizing.                       | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use firstsub::{Failure, FirstSubscriber, RecordingSubscription, Signals};
//!
//! let sub = FirstSubscriber::<&str>::builder()
//!     .on_value(|v| {
//!         if v.is_empty() {
//!             return Err(Failure::msg("empty value"));
//!         }
//!         Ok(())
//!     })
//!     .on_error(|_| Ok(()))
//!     .on_complete(|| Ok(()))
//!     .build()
//!     .expect("all handlers supplied");
//!
//! let upstream = RecordingSubscription::arc();
//! sub.on_subscribe(upstream.clone()).expect("subscribed");
//!
//! // The value handler fails after the subscription was cancelled:
//! // the failure bubbles to the producer instead of reaching on_error.
//! let err = sub.on_next("").unwrap_err();
//! assert!(err.is_bubbling());
//! assert_eq!(err.unwrap_bubbling().to_string(), "empty value");
//! assert!(upstream.is_cancelled());
//! ```
mod bubbling;
mod classify;
mod config;
mod error;
mod events;
mod observers;
mod subscriber;
mod subscription;

// ---- Public re-exports ----

pub use bubbling::BubblingError;
pub use classify::{is_fatal, Severity};
pub use config::Config;
pub use error::{BuildError, FatalError, Failure};
pub use events::{Bus, Event, EventKind, Signal};
pub use observers::{Observe, ObserverSet};
pub use subscriber::{
    CompleteHandler, ErrorHandler, FirstSubscriber, FirstSubscriberBuilder, Signals, State,
    SubscribeHandler, ValueHandler,
};
pub use subscription::{Demand, RecordingSubscription, Subscription, SubscriptionRef};

// Optional: expose a simple built-in logger observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogWriter;
