use std::sync::Arc;

use super::first::FirstSubscriber;
use super::handlers::{CompleteHandler, ErrorHandler, SubscribeHandler, ValueHandler};
use crate::config::Config;
use crate::error::{BuildError, Failure};
use crate::events::Bus;
use crate::subscription::SubscriptionRef;

/// Builder for constructing a [`FirstSubscriber`] with optional features.
///
/// The value, error and complete handlers are mandatory; `build` fails
/// without them. The subscribe handler is optional.
///
/// # Example
/// ```
/// use firstsub::{Bus, Demand, FirstSubscriber, RecordingSubscription, Signals};
///
/// let bus = Bus::new(64);
/// let sub = FirstSubscriber::<String>::builder()
///     .on_value(|v| { println!("got {v}"); Ok(()) })
///     .on_error(|e| { eprintln!("failed: {e}"); Ok(()) })
///     .on_complete(|| Ok(()))
///     .on_subscribe(|s| { s.request(Demand::new(1).expect("non-zero")); Ok(()) })
///     .with_bus(bus)
///     .with_name("greeting")
///     .build()
///     .expect("all handlers supplied");
///
/// let upstream = RecordingSubscription::arc();
/// sub.on_subscribe(upstream.clone()).unwrap();
/// assert_eq!(upstream.requested(), Demand::new(1));
/// ```
pub struct FirstSubscriberBuilder<T> {
    on_value: Option<ValueHandler<T>>,
    on_error: Option<ErrorHandler>,
    on_complete: Option<CompleteHandler>,
    on_subscribe: Option<SubscribeHandler>,
    cfg: Config,
    bus: Option<Bus>,
    name: Option<Arc<str>>,
}

impl<T> FirstSubscriberBuilder<T> {
    /// Creates an empty builder with default [`Config`].
    pub fn new() -> Self {
        Self {
            on_value: None,
            on_error: None,
            on_complete: None,
            on_subscribe: None,
            cfg: Config::default(),
            bus: None,
            name: None,
        }
    }

    /// Sets the value handler.
    pub fn on_value<F>(mut self, f: F) -> Self
    where
        F: Fn(T) -> Result<(), Failure> + Send + Sync + 'static,
    {
        self.on_value = Some(Box::new(f));
        self
    }

    /// Sets the error handler.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(Failure) -> Result<(), Failure> + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Sets the completion handler.
    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<(), Failure> + Send + Sync + 'static,
    {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Sets the subscribe handler, replacing the default unbounded request.
    ///
    /// The handler owns flow control: if it never calls `request`, the producer
    /// may never emit.
    pub fn on_subscribe<F>(mut self, f: F) -> Self
    where
        F: Fn(&SubscriptionRef) -> Result<(), Failure> + Send + Sync + 'static,
    {
        self.on_subscribe = Some(Box::new(f));
        self
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Publishes lifecycle events to `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Names the subscriber in published events.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the subscriber.
    ///
    /// # Errors
    /// [`BuildError::MissingHandler`] if the value, error or complete handler is missing.
    pub fn build(self) -> Result<FirstSubscriber<T>, BuildError> {
        let on_value = self
            .on_value
            .ok_or(BuildError::MissingHandler { handler: "value" })?;
        let on_error = self
            .on_error
            .ok_or(BuildError::MissingHandler { handler: "error" })?;
        let on_complete = self
            .on_complete
            .ok_or(BuildError::MissingHandler { handler: "complete" })?;

        Ok(FirstSubscriber::from_parts(
            on_value,
            on_error,
            on_complete,
            self.on_subscribe,
            &self.cfg,
            self.bus,
            self.name,
        ))
    }
}

impl<T> Default for FirstSubscriberBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
