//! # Example: first_value
//!
//! Demonstrates a toy synchronous producer driving [`FirstSubscriber`]s and a
//! custom observer printing their lifecycle events.
//!
//! Shows how to:
//! - Implement the [`Subscription`] trait for a producer.
//! - Build subscribers with and without an on-subscribe handler.
//! - Tell a bubbling failure from a fatal one on the producer side.
//! - Wire an [`Observe`] implementation through [`ObserverSet`].
//!
//! ## Flow
//! ```text
//! Producer::run(subscriber)
//!     ├─► subscriber.on_subscribe(subscription)
//!     │     └─► subscription.request(n) ──► subscriber.on_next(value)
//!     │                                        └─► subscription.cancel()
//!     └─► Err(bubbling | fatal) surfaces here
//!
//! FirstSubscriber ── publish(Event) ──► Bus ──► ObserverSet ──► Console.on_event()
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example first_value
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use firstsub::{
    Bus, Demand, Event, Failure, FatalError, FirstSubscriber, Observe, ObserverSet, Signals,
    Subscription,
};

/// Emits `value` on the first request unless cancelled before.
struct Producer {
    value: &'static str,
    target: Mutex<Option<Arc<dyn Signals<&'static str>>>>,
    cancelled: AtomicBool,
}

impl Producer {
    fn run(value: &'static str, target: Arc<dyn Signals<&'static str>>) -> Result<(), Failure> {
        let producer = Arc::new(Self {
            value,
            target: Mutex::new(Some(Arc::clone(&target))),
            cancelled: AtomicBool::new(false),
        });
        target.on_subscribe(producer.clone())?;
        producer.emit()
    }

    fn emit(&self) -> Result<(), Failure> {
        let target = self.target.lock().unwrap_or_else(|e| e.into_inner()).take();
        match target {
            Some(target) if !self.cancelled.load(Ordering::Acquire) => {
                target.on_next(self.value)?;
                target.on_complete()
            }
            _ => Ok(()),
        }
    }
}

impl Subscription for Producer {
    fn request(&self, n: Demand) {
        println!("[producer] request({n})");
    }

    fn cancel(&self) {
        println!("[producer] cancel");
        self.cancelled.store(true, Ordering::Release);
    }
}

/// Prints every event.
struct Console;

#[async_trait::async_trait]
impl Observe for Console {
    async fn on_event(&self, ev: &Event) {
        println!(
            "[event] #{} {:?} subscriber={} signal={} reason={}",
            ev.seq,
            ev.kind,
            ev.subscriber.as_deref().unwrap_or("-"),
            ev.signal.map(|s| s.as_str()).unwrap_or("-"),
            ev.reason.as_deref().unwrap_or("-"),
        );
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

fn report(label: &str, res: Result<(), Failure>) {
    match res {
        Ok(()) => println!("[{label}] ok"),
        Err(e) if e.is_bubbling() => {
            println!("[{label}] bubbled: {}", e.unwrap_bubbling())
        }
        Err(e) if e.is_fatal() => println!("[{label}] fatal: {e}"),
        Err(e) => println!("[{label}] handler failure: {e}"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bus = Bus::new(256);
    let observers = ObserverSet::attach(&bus, vec![Arc::new(Console)]);

    // 1) Happy path: default unbounded request, value delivered.
    let ok = FirstSubscriber::<&'static str>::builder()
        .on_value(|v| {
            println!("[ok] value={v}");
            Ok(())
        })
        .on_error(|e| {
            println!("[ok] error={e}");
            Ok(())
        })
        .on_complete(|| Ok(()))
        .with_bus(bus.clone())
        .with_name("ok")
        .build()?;
    report("ok", Producer::run("hello", Arc::new(ok)));

    // 2) Value handler fails: the failure bubbles to the producer.
    let bubbling = FirstSubscriber::<&'static str>::builder()
        .on_value(|v| Err(Failure::msg(format!("cannot parse {v:?}"))))
        .on_error(|_| Ok(()))
        .on_complete(|| Ok(()))
        .with_bus(bus.clone())
        .with_name("bubbling")
        .build()?;
    report("bubbling", Producer::run("n/a", Arc::new(bubbling)));

    // 3) Subscribe handler hits a fatal fault: no cancel, no on_error.
    let fatal = FirstSubscriber::<&'static str>::builder()
        .on_value(|_| Ok(()))
        .on_error(|_| Ok(()))
        .on_complete(|| Ok(()))
        .on_subscribe(|_| Err(FatalError::StackOverflow.into()))
        .with_bus(bus.clone())
        .with_name("fatal")
        .build()?;
    report("fatal", Producer::run("never", Arc::new(fatal)));

    observers.shutdown().await;
    Ok(())
}
