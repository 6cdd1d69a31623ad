//! # FirstSubscriber: single-value, callback-driven consumer.
//!
//! Receives a subscription from a producer, negotiates demand, delivers at most
//! one value to user callbacks and routes every callback failure by severity.
//!
//! ## Signal handling
//! ```text
//! on_subscribe(s)
//!   ├─► store s
//!   ├─ no handler ──► s.request(initial_request)
//!   └─ handler(s)
//!        ├─ Ok            ──► (handler issued its own request)
//!        ├─ Err(normal)   ──► s.cancel() ──► on_error(err)
//!        └─ Err(fatal)    ──► return Err(err)        (no cancel, no on_error)
//!
//! on_next(v)
//!   ├─► s.cancel()                                   (always, before the handler)
//!   └─ value_handler(v)
//!        ├─ Ok            ──► done
//!        ├─ Err(normal)   ──► return Err(BubblingError(err))
//!        └─ Err(fatal)    ──► return Err(err)
//!
//! on_error(e)     ──► error_handler(e)               (its Err returned as-is)
//! on_complete()   ──► complete_handler()             (its Err returned as-is)
//! ```
//!
//! ## Rules
//! - Cancellation is issued **at most once**: it takes the subscription out of its slot.
//! - Exactly one outcome per lifecycle: value delivered, error delivered,
//!   completion, bubbling failure or fatal failure.
//! - Signals arriving in the wrong state are dropped (and published as
//!   `SignalDropped`); a second subscription is cancelled.
//! - A failure that is already bubbling is treated like a fatal one: it is
//!   returned unchanged and never wrapped again.
//! - Panics inside handlers are not caught; they unwind through the protocol call.
//! - No lock is held while a handler or the subscription runs, so producers may
//!   call back into the subscriber from `request`/`cancel`.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::builder::FirstSubscriberBuilder;
use super::handlers::{CompleteHandler, ErrorHandler, SubscribeHandler, ValueHandler};
use super::signals::Signals;
use super::state::{State, StateCell};
use crate::config::Config;
use crate::error::Failure;
use crate::events::{Bus, Event, EventKind, Signal};
use crate::subscription::{Demand, SubscriptionRef};

/// Consumer of the first (and only) value of a stream.
///
/// Created once per subscription attempt; not reusable across producers.
///
/// # Example
/// ```
/// use std::sync::{Arc, Mutex};
/// use firstsub::{FirstSubscriber, RecordingSubscription, Signals};
///
/// let got = Arc::new(Mutex::new(None));
/// let sink = Arc::clone(&got);
///
/// let sub = FirstSubscriber::new(
///     move |v: u32| { *sink.lock().unwrap() = Some(v); Ok(()) },
///     |_err| Ok(()),
///     || Ok(()),
///     None,
/// );
///
/// let upstream = RecordingSubscription::arc();
/// sub.on_subscribe(upstream.clone()).unwrap();
/// sub.on_next(7).unwrap();
///
/// assert_eq!(*got.lock().unwrap(), Some(7));
/// assert!(upstream.is_cancelled());
/// ```
pub struct FirstSubscriber<T> {
    on_value: ValueHandler<T>,
    on_error: ErrorHandler,
    on_complete: CompleteHandler,
    on_subscribe: Option<SubscribeHandler>,

    subscription: Mutex<Option<SubscriptionRef>>,
    state: StateCell,

    initial_request: Demand,
    bus: Option<Bus>,
    name: Option<Arc<str>>,
}

impl<T> FirstSubscriber<T> {
    /// Creates a subscriber from the four callbacks with default [`Config`].
    ///
    /// Without an `on_subscribe` handler the subscriber requests
    /// [`Config::initial_request`] (unbounded) as soon as it is subscribed.
    pub fn new<V, E, C>(
        on_value: V,
        on_error: E,
        on_complete: C,
        on_subscribe: Option<SubscribeHandler>,
    ) -> Self
    where
        V: Fn(T) -> Result<(), Failure> + Send + Sync + 'static,
        E: Fn(Failure) -> Result<(), Failure> + Send + Sync + 'static,
        C: Fn() -> Result<(), Failure> + Send + Sync + 'static,
    {
        Self::from_parts(
            Box::new(on_value),
            Box::new(on_error),
            Box::new(on_complete),
            on_subscribe,
            &Config::default(),
            None,
            None,
        )
    }

    /// Returns a builder; see [`FirstSubscriberBuilder`].
    #[must_use]
    pub fn builder() -> FirstSubscriberBuilder<T> {
        FirstSubscriberBuilder::new()
    }

    pub(crate) fn from_parts(
        on_value: ValueHandler<T>,
        on_error: ErrorHandler,
        on_complete: CompleteHandler,
        on_subscribe: Option<SubscribeHandler>,
        cfg: &Config,
        bus: Option<Bus>,
        name: Option<Arc<str>>,
    ) -> Self {
        Self {
            on_value,
            on_error,
            on_complete,
            on_subscribe,
            subscription: Mutex::new(None),
            state: StateCell::new(),
            initial_request: cfg.initial_request,
            bus,
            name,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state.load()
    }

    /// Returns `true` once a terminal outcome was reached.
    pub fn is_terminated(&self) -> bool {
        self.state() == State::Terminated
    }

    /// Returns `true` while the subscription is still held.
    pub fn has_subscription(&self) -> bool {
        self.slot().is_some()
    }

    /// Name used in published events.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The slot holds no invariant a panic could break, so poisoning is ignored.
    fn slot(&self) -> MutexGuard<'_, Option<SubscriptionRef>> {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Cancels the stored subscription unless it was already taken.
    fn cancel_once(&self, signal: Signal) {
        let taken = self.slot().take();
        if let Some(subscription) = taken {
            subscription.cancel();
            self.publish(EventKind::Cancelled, |e| e.with_signal(signal));
        }
    }

    /// Drops the stored subscription without cancelling it.
    fn release(&self) {
        let _ = self.slot().take();
    }

    fn deliver_error(&self, signal: Signal, error: Failure) -> Result<(), Failure> {
        self.publish(EventKind::ErrorDelivered, |e| {
            e.with_signal(signal).with_reason(error.to_string())
        });
        (self.on_error)(error)
    }

    /// Publishes how a failure escapes and hands it back.
    fn escalate(&self, signal: Signal, failure: Failure) -> Failure {
        let kind = if failure.is_fatal() {
            EventKind::FatalRethrown
        } else {
            EventKind::Bubbled
        };
        self.publish(kind, |e| {
            e.with_signal(signal)
                .with_reason(failure.clone().unwrap_bubbling().to_string())
        });
        failure
    }

    fn publish(&self, kind: EventKind, decorate: impl FnOnce(Event) -> Event) {
        let Some(bus) = &self.bus else {
            return;
        };
        let mut ev = Event::new(kind);
        if let Some(name) = &self.name {
            ev = ev.with_subscriber(Arc::clone(name));
        }
        bus.publish(decorate(ev));
    }
}

impl<T> Signals<T> for FirstSubscriber<T> {
    fn on_subscribe(&self, subscription: SubscriptionRef) -> Result<(), Failure> {
        // State and slot change together so a racing terminal signal always
        // finds the subscription to cancel.
        let accepted = {
            let mut slot = self.slot();
            let accepted = self.state.transition(State::Unsubscribed, State::Active);
            if accepted {
                *slot = Some(Arc::clone(&subscription));
            }
            accepted
        };
        if !accepted {
            subscription.cancel();
            self.publish(EventKind::DuplicateSubscription, |e| {
                e.with_signal(Signal::Subscribe)
            });
            return Ok(());
        }
        self.publish(EventKind::Subscribed, |e| e.with_signal(Signal::Subscribe));

        let Some(handler) = &self.on_subscribe else {
            let demand = self.initial_request;
            self.publish(EventKind::Requested, |e| {
                e.with_signal(Signal::Subscribe).with_demand(demand)
            });
            subscription.request(demand);
            return Ok(());
        };

        match handler(&subscription) {
            Ok(()) => Ok(()),
            Err(failure) if failure.is_fatal() || failure.is_bubbling() => {
                // No cancel: the runtime may be unstable.
                self.state.terminate();
                self.release();
                Err(self.escalate(Signal::Subscribe, failure))
            }
            Err(failure) => {
                if !self.state.transition(State::Active, State::Terminated) {
                    // A terminal signal was already handled from inside the handler.
                    return Err(self.escalate(Signal::Subscribe, failure.bubble()));
                }
                self.cancel_once(Signal::Subscribe);
                self.deliver_error(Signal::Subscribe, failure)
            }
        }
    }

    fn on_next(&self, value: T) -> Result<(), Failure> {
        if !self.state.transition(State::Active, State::Terminated) {
            self.publish(EventKind::SignalDropped, |e| e.with_signal(Signal::Next));
            return Ok(());
        }
        self.cancel_once(Signal::Next);

        match (self.on_value)(value) {
            Ok(()) => {
                self.publish(EventKind::ValueDelivered, |e| e.with_signal(Signal::Next));
                Ok(())
            }
            Err(failure) if failure.is_fatal() => Err(self.escalate(Signal::Next, failure)),
            Err(failure) => Err(self.escalate(Signal::Next, failure.bubble())),
        }
    }

    fn on_error(&self, error: Failure) -> Result<(), Failure> {
        if !self.state.transition(State::Active, State::Terminated) {
            self.publish(EventKind::SignalDropped, |e| {
                e.with_signal(Signal::Error).with_reason(error.to_string())
            });
            return Ok(());
        }
        self.release();
        self.deliver_error(Signal::Error, error)
    }

    fn on_complete(&self) -> Result<(), Failure> {
        if !self.state.transition(State::Active, State::Terminated) {
            self.publish(EventKind::SignalDropped, |e| e.with_signal(Signal::Complete));
            return Ok(());
        }
        self.release();
        self.publish(EventKind::Completed, |e| e.with_signal(Signal::Complete));
        (self.on_complete)()
    }
}

impl<T> fmt::Debug for FirstSubscriber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirstSubscriber")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("has_subscription", &self.has_subscription())
            .field("custom_on_subscribe", &self.on_subscribe.is_some())
            .field("initial_request", &self.initial_request)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use thiserror::Error;

    use crate::bubbling::BubblingError;
    use crate::error::FatalError;
    use crate::subscription::{RecordingSubscription, Subscription};

    #[derive(Error, Debug)]
    #[error("illegal argument")]
    struct IllegalArgument;

    type Holder = Arc<Mutex<Option<Failure>>>;

    fn holder() -> Holder {
        Arc::new(Mutex::new(None))
    }

    fn record_into(holder: &Holder) -> impl Fn(Failure) -> Result<(), Failure> + Send + Sync + 'static {
        let holder = Arc::clone(holder);
        move |err| {
            *holder.lock().expect("lock") = Some(err);
            Ok(())
        }
    }

    fn held(holder: &Holder) -> Option<Failure> {
        holder.lock().expect("lock").clone()
    }

    fn failing_on_subscribe(raised: &Failure, errors: &Holder) -> FirstSubscriber<&'static str> {
        let raised = raised.clone();
        FirstSubscriber::builder()
            .on_value(|_| Ok(()))
            .on_error(record_into(errors))
            .on_complete(|| Ok(()))
            .on_subscribe(move |_| Err(raised.clone()))
            .build()
            .expect("all handlers supplied")
    }

    fn failing_on_value(raised: &Failure, errors: &Holder) -> FirstSubscriber<&'static str> {
        let raised = raised.clone();
        FirstSubscriber::new(
            move |_| Err(raised.clone()),
            record_into(errors),
            || Ok(()),
            None,
        )
    }

    #[test]
    fn test_subscribe_handler_error_is_routed_to_on_error() {
        let errors = holder();
        let raised = Failure::new(IllegalArgument);
        let sub = failing_on_subscribe(&raised, &errors);
        let upstream = RecordingSubscription::arc();

        assert!(sub.on_subscribe(upstream.clone()).is_ok());

        let got = held(&errors).expect("on_error called");
        assert!(got.is::<IllegalArgument>());
        assert!(got.ptr_eq(&raised));
        assert_eq!(upstream.cancel_count(), 1);
        assert_eq!(upstream.requested(), None);
        assert!(sub.is_terminated());
        assert!(!sub.has_subscription());
    }

    #[test]
    fn test_subscribe_handler_fatal_is_rethrown_without_cancel() {
        let errors = holder();
        let raised = Failure::new(FatalError::OutOfMemory {
            detail: "handler".into(),
        });
        let sub = failing_on_subscribe(&raised, &errors);
        let upstream = RecordingSubscription::arc();

        let err = sub
            .on_subscribe(upstream.clone())
            .expect_err("fatal must propagate");

        assert!(err.ptr_eq(&raised));
        assert!(matches!(
            err.downcast_ref::<FatalError>(),
            Some(FatalError::OutOfMemory { .. })
        ));
        assert!(held(&errors).is_none());
        assert!(!upstream.is_cancelled());
        assert_eq!(upstream.requested(), None);
        assert!(sub.is_terminated());
    }

    #[test]
    fn test_subscribe_handler_bubbling_is_rethrown_unchanged() {
        let errors = holder();
        let raised = Failure::msg("inner subscriber failed").bubble();
        let sub = failing_on_subscribe(&raised, &errors);
        let upstream = RecordingSubscription::arc();

        let err = sub
            .on_subscribe(upstream.clone())
            .expect_err("bubbling must propagate");

        assert!(err.ptr_eq(&raised));
        assert!(held(&errors).is_none());
        assert!(!upstream.is_cancelled());
    }

    #[test]
    fn test_subscribe_handler_requests_32() {
        let errors = holder();
        let seen: Arc<Mutex<Option<SubscriptionRef>>> = Arc::new(Mutex::new(None));
        let seen_in = Arc::clone(&seen);

        let sub: FirstSubscriber<&'static str> = FirstSubscriber::builder()
            .on_value(|_| Ok(()))
            .on_error(record_into(&errors))
            .on_complete(|| Ok(()))
            .on_subscribe(move |s| {
                *seen_in.lock().expect("lock") = Some(Arc::clone(s));
                s.request(Demand::new(32).expect("non-zero"));
                Ok(())
            })
            .build()
            .expect("all handlers supplied");

        let upstream = RecordingSubscription::arc();
        let as_dyn: SubscriptionRef = upstream.clone();
        sub.on_subscribe(upstream.clone()).expect("accepted");

        assert!(held(&errors).is_none());
        assert!(!upstream.is_cancelled());
        let consumed = seen.lock().expect("lock").clone().expect("handler ran");
        assert!(Arc::ptr_eq(&consumed, &as_dyn));
        assert_eq!(upstream.requested(), Demand::new(32));
        assert_eq!(upstream.request_count(), 1);
        assert_eq!(sub.state(), State::Active);
    }

    #[test]
    fn test_no_subscribe_handler_requests_unbounded() {
        let errors = holder();
        let sub: FirstSubscriber<&'static str> =
            FirstSubscriber::new(|_| Ok(()), record_into(&errors), || Ok(()), None);
        let upstream = RecordingSubscription::arc();

        sub.on_subscribe(upstream.clone()).expect("accepted");

        assert!(held(&errors).is_none());
        assert!(!upstream.is_cancelled());
        assert_eq!(upstream.requested(), Some(Demand::Unbounded));
        assert_eq!(upstream.requested().map(Demand::as_u64), Some(u64::MAX));
        assert_eq!(upstream.request_count(), 1);
    }

    #[test]
    fn test_configured_initial_request() {
        let sub: FirstSubscriber<u8> = FirstSubscriber::builder()
            .on_value(|_| Ok(()))
            .on_error(|_| Ok(()))
            .on_complete(|| Ok(()))
            .with_config(Config {
                initial_request: Demand::new(1).expect("non-zero"),
                ..Config::default()
            })
            .build()
            .expect("all handlers supplied");
        let upstream = RecordingSubscription::arc();

        sub.on_subscribe(upstream.clone()).expect("accepted");
        assert_eq!(upstream.requested(), Demand::new(1));
    }

    #[test]
    fn test_value_handler_error_bubbles_after_cancel() {
        let errors = holder();
        let raised = Failure::new(IllegalArgument);
        let upstream = RecordingSubscription::arc();
        let cancelled_first = Arc::new(AtomicBool::new(false));

        let sub: FirstSubscriber<&'static str> = {
            let raised = raised.clone();
            let upstream = Arc::clone(&upstream);
            let cancelled_first = Arc::clone(&cancelled_first);
            FirstSubscriber::new(
                move |_| {
                    cancelled_first.store(upstream.is_cancelled(), Ordering::SeqCst);
                    Err(raised.clone())
                },
                record_into(&errors),
                || Ok(()),
                None,
            )
        };
        sub.on_subscribe(upstream.clone()).expect("accepted");

        let err = sub.on_next("foo").expect_err("must bubble");

        assert!(err.is_bubbling());
        let bubbling = err.downcast_ref::<BubblingError>().expect("bubbling error");
        assert!(bubbling.cause().is::<IllegalArgument>());
        assert!(bubbling.cause().ptr_eq(&raised));
        assert!(err.unwrap_bubbling().ptr_eq(&raised));
        assert!(cancelled_first.load(Ordering::SeqCst));
        assert!(held(&errors).is_none());
        assert_eq!(upstream.cancel_count(), 1);
    }

    #[test]
    fn test_value_handler_fatal_is_rethrown_after_cancel() {
        let errors = holder();
        let raised = Failure::new(FatalError::OutOfMemory {
            detail: "value".into(),
        });
        let sub = failing_on_value(&raised, &errors);
        let upstream = RecordingSubscription::arc();
        sub.on_subscribe(upstream.clone()).expect("accepted");

        let err = sub.on_next("foo").expect_err("fatal must propagate");

        assert!(err.ptr_eq(&raised));
        assert!(!err.is_bubbling());
        assert!(held(&errors).is_none());
        assert_eq!(upstream.cancel_count(), 1);
    }

    #[test]
    fn test_value_handler_bubbling_is_not_rewrapped() {
        let errors = holder();
        let raised = Failure::msg("nested").bubble();
        let sub = failing_on_value(&raised, &errors);
        sub.on_subscribe(RecordingSubscription::arc())
            .expect("accepted");

        let err = sub.on_next("foo").expect_err("must bubble");
        assert!(err.ptr_eq(&raised));
    }

    #[test]
    fn test_value_delivered_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = Arc::clone(&calls);
        let sub: FirstSubscriber<u32> = FirstSubscriber::new(
            move |v| {
                assert_eq!(v, 1);
                calls_in.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            |_| Ok(()),
            || Ok(()),
            None,
        );
        let upstream = RecordingSubscription::arc();
        sub.on_subscribe(upstream.clone()).expect("accepted");

        sub.on_next(1).expect("delivered");
        sub.on_next(2).expect("dropped");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(upstream.cancel_count(), 1);
        assert!(sub.is_terminated());
        assert!(!sub.has_subscription());
    }

    #[test]
    fn test_on_error_delivers_without_cancel() {
        let errors = holder();
        let sub: FirstSubscriber<u32> =
            FirstSubscriber::new(|_| Ok(()), record_into(&errors), || Ok(()), None);
        let upstream = RecordingSubscription::arc();
        sub.on_subscribe(upstream.clone()).expect("accepted");

        let raised = Failure::msg("upstream failed");
        sub.on_error(raised.clone()).expect("delivered");

        assert!(held(&errors).expect("delivered").ptr_eq(&raised));
        assert!(!upstream.is_cancelled());
        assert!(!sub.has_subscription());

        *errors.lock().expect("lock") = None;
        sub.on_error(Failure::msg("late")).expect("dropped");
        sub.on_complete().expect("dropped");
        assert!(held(&errors).is_none());
    }

    #[test]
    fn test_terminal_handler_failures_propagate_raw() {
        let raised = Failure::new(IllegalArgument);
        let sub: FirstSubscriber<u32> = {
            let raised = raised.clone();
            FirstSubscriber::new(|_| Ok(()), move |_| Err(raised.clone()), || Ok(()), None)
        };
        sub.on_subscribe(RecordingSubscription::arc())
            .expect("accepted");
        let err = sub
            .on_error(Failure::msg("upstream"))
            .expect_err("handler failure propagates");
        assert!(err.ptr_eq(&raised));
        assert!(!err.is_bubbling());

        let sub: FirstSubscriber<u32> = {
            let raised = raised.clone();
            FirstSubscriber::new(|_| Ok(()), |_| Ok(()), move || Err(raised.clone()), None)
        };
        sub.on_subscribe(RecordingSubscription::arc())
            .expect("accepted");
        let err = sub.on_complete().expect_err("handler failure propagates");
        assert!(err.ptr_eq(&raised));
    }

    #[test]
    fn test_duplicate_subscription_is_cancelled() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let sub: FirstSubscriber<u32> = FirstSubscriber::builder()
            .on_value(|_| Ok(()))
            .on_error(|_| Ok(()))
            .on_complete(|| Ok(()))
            .with_bus(bus)
            .with_name("dup")
            .build()
            .expect("all handlers supplied");
        let first = RecordingSubscription::arc();
        let second = RecordingSubscription::arc();

        sub.on_subscribe(first.clone()).expect("accepted");
        sub.on_subscribe(second.clone()).expect("ignored");

        assert!(!first.is_cancelled());
        assert!(second.is_cancelled());
        assert_eq!(second.requested(), None);
        assert_eq!(sub.state(), State::Active);
        assert!(sub.has_subscription());

        let events: Vec<Event> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Subscribed,
                EventKind::Requested,
                EventKind::DuplicateSubscription,
            ]
        );
        assert_eq!(events[2].signal, Some(Signal::Subscribe));
        assert_eq!(events[2].subscriber.as_deref(), Some("dup"));
    }

    #[test]
    fn test_racing_value_always_cancels_the_subscription() {
        for _ in 0..200 {
            let sub: Arc<FirstSubscriber<u32>> = Arc::new(FirstSubscriber::new(
                |_| Ok(()),
                |_| Ok(()),
                || Ok(()),
                None,
            ));
            let upstream = RecordingSubscription::arc();
            let start = Arc::new(std::sync::Barrier::new(2));

            let subscriber = {
                let (sub, upstream, start) =
                    (Arc::clone(&sub), Arc::clone(&upstream), Arc::clone(&start));
                std::thread::spawn(move || {
                    start.wait();
                    sub.on_subscribe(upstream).expect("accepted");
                })
            };
            let producer = {
                let (sub, start) = (Arc::clone(&sub), Arc::clone(&start));
                std::thread::spawn(move || {
                    start.wait();
                    sub.on_next(7).expect("delivered or dropped");
                })
            };
            subscriber.join().expect("no panic");
            producer.join().expect("no panic");

            if sub.is_terminated() {
                assert_eq!(upstream.cancel_count(), 1);
                assert!(!sub.has_subscription());
            } else {
                assert_eq!(upstream.cancel_count(), 0);
                assert!(sub.has_subscription());
            }
        }
    }

    #[test]
    fn test_signals_before_subscribe_are_dropped() {
        let errors = holder();
        let sub: FirstSubscriber<u32> =
            FirstSubscriber::new(|_| Ok(()), record_into(&errors), || Ok(()), None);

        sub.on_next(1).expect("dropped");
        sub.on_error(Failure::msg("early")).expect("dropped");

        assert!(held(&errors).is_none());
        assert_eq!(sub.state(), State::Unsubscribed);
    }

    #[test]
    fn test_handler_panic_unwinds_through_on_next() {
        let sub: FirstSubscriber<u32> = FirstSubscriber::new(
            |_| panic!("handler bug"),
            |_| Ok(()),
            || Ok(()),
            None,
        );
        let upstream = RecordingSubscription::arc();
        sub.on_subscribe(upstream.clone()).expect("accepted");

        let res = catch_unwind(AssertUnwindSafe(|| sub.on_next(1)));
        assert!(res.is_err());
        assert_eq!(upstream.cancel_count(), 1);
    }

    /// Emits one value (then completes) synchronously from inside `request`.
    struct EmitOnRequest {
        target: Mutex<Option<Arc<dyn Signals<&'static str>>>>,
        cancels: AtomicUsize,
    }

    impl EmitOnRequest {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                target: Mutex::new(None),
                cancels: AtomicUsize::new(0),
            })
        }

        fn bind(&self, target: Arc<dyn Signals<&'static str>>) {
            *self.target.lock().expect("lock") = Some(target);
        }
    }

    impl Subscription for EmitOnRequest {
        fn request(&self, _n: Demand) {
            let target = self.target.lock().expect("lock").take();
            if let Some(target) = target {
                let _ = target.on_next("tick");
                let _ = target.on_complete();
            }
        }

        fn cancel(&self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_synchronous_producer_reenters_from_request() {
        let values = Arc::new(Mutex::new(Vec::new()));
        let completions = Arc::new(AtomicUsize::new(0));
        let sub = {
            let values = Arc::clone(&values);
            let completions = Arc::clone(&completions);
            Arc::new(FirstSubscriber::new(
                move |v: &'static str| {
                    values.lock().expect("lock").push(v);
                    Ok(())
                },
                |_| Ok(()),
                move || {
                    completions.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
                None,
            ))
        };
        let producer = EmitOnRequest::new();
        producer.bind(sub.clone());

        sub.on_subscribe(producer.clone()).expect("accepted");

        assert_eq!(*values.lock().expect("lock"), vec!["tick"]);
        assert_eq!(completions.load(Ordering::SeqCst), 0);
        assert_eq!(producer.cancels.load(Ordering::SeqCst), 1);
        assert!(sub.is_terminated());
    }

    #[test]
    fn test_subscribe_handler_failing_after_value_bubbles() {
        let errors = holder();
        let raised = Failure::new(IllegalArgument);
        let sub: Arc<FirstSubscriber<&'static str>> = {
            let raised = raised.clone();
            Arc::new(
                FirstSubscriber::builder()
                    .on_value(|_| Ok(()))
                    .on_error(record_into(&errors))
                    .on_complete(|| Ok(()))
                    .on_subscribe(move |s| {
                        s.request(Demand::Unbounded);
                        Err(raised.clone())
                    })
                    .build()
                    .expect("all handlers supplied"),
            )
        };
        let producer = EmitOnRequest::new();
        producer.bind(sub.clone());

        let err = sub
            .on_subscribe(producer.clone())
            .expect_err("late handler failure bubbles");

        assert!(err.unwrap_bubbling().ptr_eq(&raised));
        assert!(held(&errors).is_none());
        assert_eq!(producer.cancels.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_protocol_calls_from_another_thread() {
        let errors = holder();
        let raised = Failure::new(IllegalArgument);
        let sub = Arc::new(failing_on_value(&raised, &errors));
        let upstream = RecordingSubscription::arc();

        let worker = {
            let sub = Arc::clone(&sub);
            let upstream = Arc::clone(&upstream);
            std::thread::spawn(move || {
                sub.on_subscribe(upstream).expect("accepted");
                sub.on_next("foo")
            })
        };
        let err = worker
            .join()
            .expect("no panic")
            .expect_err("must bubble");

        assert!(err.unwrap_bubbling().ptr_eq(&raised));
        assert_eq!(upstream.cancel_count(), 1);
    }

    #[test]
    fn test_events_trace_the_bubbling_path() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let sub: FirstSubscriber<&'static str> = FirstSubscriber::builder()
            .on_value(|_| Err(IllegalArgument.into()))
            .on_error(|_| Ok(()))
            .on_complete(|| Ok(()))
            .with_bus(bus.clone())
            .with_name("first-price")
            .build()
            .expect("all handlers supplied");

        sub.on_subscribe(RecordingSubscription::arc())
            .expect("accepted");
        let _ = sub.on_next("foo");
        sub.on_complete().expect("dropped");

        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Subscribed,
                EventKind::Requested,
                EventKind::Cancelled,
                EventKind::Bubbled,
                EventKind::SignalDropped,
            ]
        );
        assert!(events
            .iter()
            .all(|e| e.subscriber.as_deref() == Some("first-price")));
        assert_eq!(events[1].demand, Some(Demand::Unbounded));
        assert_eq!(events[2].signal, Some(Signal::Next));
        assert_eq!(events[3].reason.as_deref(), Some("illegal argument"));
        assert_eq!(events[4].signal, Some(Signal::Complete));
    }

    #[test]
    fn test_events_for_fatal_subscribe_handler() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let sub: FirstSubscriber<u8> = FirstSubscriber::builder()
            .on_value(|_| Ok(()))
            .on_error(|_| Ok(()))
            .on_complete(|| Ok(()))
            .on_subscribe(|_| Err(FatalError::StackOverflow.into()))
            .with_bus(bus)
            .build()
            .expect("all handlers supplied");

        let _ = sub.on_subscribe(RecordingSubscription::arc());

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.kind)
            .collect();
        assert_eq!(kinds, vec![EventKind::Subscribed, EventKind::FatalRethrown]);
    }

    #[test]
    fn test_debug_output() {
        let sub: FirstSubscriber<u8> =
            FirstSubscriber::new(|_| Ok(()), |_| Ok(()), || Ok(()), None);
        let text = format!("{sub:?}");
        assert!(text.contains("Unsubscribed"));
        assert!(text.contains("has_subscription: false"));
    }
}
