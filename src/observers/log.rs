//! # LogWriter: simple event printer
//!
//! A minimal observer that prints incoming [`Event`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [subscribed] subscriber="first-price"
//! [requested] subscriber="first-price" demand=unbounded
//! [cancelled] subscriber="first-price" signal=on_next
//! [bubbled] subscriber="first-price" signal=on_next err="illegal argument"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::observers::Observe;

/// Event writer observer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Observe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let who = e.subscriber.as_deref().unwrap_or("<unnamed>");
        let signal = e.signal.map(|s| s.as_str()).unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::Subscribed => println!("[subscribed] subscriber={who:?}"),
            EventKind::DuplicateSubscription => {
                println!("[duplicate-subscription] subscriber={who:?}")
            }
            EventKind::Requested => match e.demand {
                Some(demand) => println!("[requested] subscriber={who:?} demand={demand}"),
                None => println!("[requested] subscriber={who:?}"),
            },
            EventKind::Cancelled => println!("[cancelled] subscriber={who:?} signal={signal}"),
            EventKind::ValueDelivered => println!("[value] subscriber={who:?}"),
            EventKind::ErrorDelivered => {
                println!("[error] subscriber={who:?} signal={signal} err={reason:?}")
            }
            EventKind::Completed => println!("[completed] subscriber={who:?}"),
            EventKind::Bubbled => {
                println!("[bubbled] subscriber={who:?} signal={signal} err={reason:?}")
            }
            EventKind::FatalRethrown => {
                println!("[fatal] subscriber={who:?} signal={signal} err={reason:?}")
            }
            EventKind::SignalDropped => {
                println!("[dropped] subscriber={who:?} signal={signal} err={reason:?}")
            }
            EventKind::ObserverOverflow => {
                println!("[observer-overflow] observer={who} reason={reason}")
            }
            EventKind::ObserverPanicked => {
                println!("[observer-panicked] observer={who} info={reason}")
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
