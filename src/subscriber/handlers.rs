//! User callback types.
//!
//! Every handler returns `Result<(), Failure>`; an `Err` is what the handler
//! "raised". Handlers run synchronously on the thread making the protocol call,
//! so they must be `Send + Sync`.

use crate::error::Failure;
use crate::subscription::SubscriptionRef;

/// Receives the single value.
pub type ValueHandler<T> = Box<dyn Fn(T) -> Result<(), Failure> + Send + Sync>;

/// Receives a terminal error.
pub type ErrorHandler = Box<dyn Fn(Failure) -> Result<(), Failure> + Send + Sync>;

/// Runs on completion.
pub type CompleteHandler = Box<dyn Fn() -> Result<(), Failure> + Send + Sync>;

/// Receives the subscription; responsible for issuing `request`.
pub type SubscribeHandler = Box<dyn Fn(&SubscriptionRef) -> Result<(), Failure> + Send + Sync>;
