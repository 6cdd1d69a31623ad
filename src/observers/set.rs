//! # Non-blocking event fan-out to multiple observers.
//!
//! Provides [`ObserverSet`], which listens on a [`Bus`] and distributes events to
//! multiple observers concurrently without blocking publishers.
//!
//! ## Architecture
//! ```text
//! Bus ──► listener ──► emit_arc(event)
//!                          │
//!                          ├──► [queue 1] ──► worker 1 ──► observer1.on_event()
//!                          │    (bounded)         └──────► panic → ObserverPanicked
//!                          ├──► [queue 2] ──► worker 2 ──► observer2.on_event()
//!                          └──► [queue N] ──► worker N ──► observerN.on_event()
//! ```
//!
//! ## Rules
//! - **No cross-observer ordering**: observer A may process event N while B processes N+5
//! - **Overflow**: event dropped for that observer only, `ObserverOverflow` published
//! - **Non-blocking**: the listener uses `try_send`
//! - **Isolation**: slow/panicking observer doesn't affect others
//! - **Per-observer FIFO**: each observer sees events in order
//!
//! ## Panic handling
//! Worker tasks use `catch_unwind` to isolate panics; a panic becomes an
//! `ObserverPanicked` event and the worker continues with the next event.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if an observer uses `Arc<Mutex<T>>` and panics while holding the lock.
//!
//! ## Shutdown
//! [`ObserverSet::shutdown`] stops the listener, forwards every event already
//! published to the bus, closes the queues and waits for workers to drain them.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event};
use crate::observers::Observe;

/// Per-observer channel metadata.
struct ObserverChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Queues shared between the set and its listener.
struct Fanout {
    channels: Vec<ObserverChannel>,
    bus: Bus,
}

impl Fanout {
    /// Pushes `event` into every observer queue.
    ///
    /// Overflow events are not re-published if they themselves overflow.
    fn emit_arc(&self, event: Arc<Event>) {
        let is_overflow_evt = event.is_observer_overflow();

        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if !is_overflow_evt {
                        self.bus
                            .publish(Event::observer_overflow(channel.name, "full"));
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    if !is_overflow_evt {
                        self.bus
                            .publish(Event::observer_overflow(channel.name, "closed"));
                    }
                }
            }
        }
    }
}

/// Fan-out coordinator for event observers attached to one [`Bus`].
///
/// Must be created inside a Tokio runtime (it spawns tasks).
pub struct ObserverSet {
    fanout: Arc<Fanout>,
    workers: Vec<JoinHandle<()>>,
    listener: JoinHandle<()>,
    token: CancellationToken,
}

impl ObserverSet {
    /// Spawns one worker per observer and a listener forwarding `bus` events to them.
    ///
    /// ### Notes
    /// - Only events published **after** this call are observed.
    /// - Minimum queue capacity is 1 (enforced).
    #[must_use]
    pub fn attach(bus: &Bus, observers: Vec<Arc<dyn Observe>>) -> Self {
        let mut channels = Vec::with_capacity(observers.len());
        let mut workers = Vec::with_capacity(observers.len());

        for obs in observers {
            let cap = obs.queue_capacity().max(1);
            let name = obs.name();
            let (tx, rx) = mpsc::channel::<Arc<Event>>(cap);

            workers.push(tokio::spawn(run_worker(obs, rx, bus.clone())));
            channels.push(ObserverChannel { name, sender: tx });
        }

        let fanout = Arc::new(Fanout {
            channels,
            bus: bus.clone(),
        });
        let token = CancellationToken::new();
        let listener = tokio::spawn(run_listener(
            bus.subscribe(),
            Arc::clone(&fanout),
            token.clone(),
        ));

        Self {
            fanout,
            workers,
            listener,
            token,
        }
    }

    /// Number of attached observers.
    pub fn len(&self) -> usize {
        self.fanout.channels.len()
    }

    /// Returns `true` if no observer is attached.
    pub fn is_empty(&self) -> bool {
        self.fanout.channels.is_empty()
    }

    /// Gracefully shuts down the listener and all observer workers.
    ///
    /// 1. Cancels the listener; it forwards events already on the bus and exits
    /// 2. Drops all queue senders (workers see channel closed)
    /// 3. Awaits all worker tasks to finish
    pub async fn shutdown(self) {
        self.token.cancel();
        let _ = self.listener.await;
        drop(self.fanout);

        for h in self.workers {
            let _ = h.await;
        }
    }
}

/// Forwards bus events into the observer queues until cancelled.
async fn run_listener(
    mut rx: broadcast::Receiver<Event>,
    fanout: Arc<Fanout>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            res = rx.recv() => match res {
                Ok(ev) => fanout.emit_arc(Arc::new(ev)),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return,
            },
        }
    }
    loop {
        match rx.try_recv() {
            Ok(ev) => fanout.emit_arc(Arc::new(ev)),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}

/// Drives one observer, converting panics into `ObserverPanicked` events.
async fn run_worker(obs: Arc<dyn Observe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let fut = obs.on_event(ev.as_ref());

        if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
            let info = {
                let any = &*panic_err;
                if let Some(msg) = any.downcast_ref::<&'static str>() {
                    (*msg).to_string()
                } else if let Some(msg) = any.downcast_ref::<String>() {
                    msg.clone()
                } else {
                    "unknown panic".to_string()
                }
            };
            bus.publish(Event::observer_panicked(obs.name(), info));
        }
    }
}
