//! # Bubbling error wrapper.
//!
//! [`BubblingError`] marks a normal error that could not be delivered through the
//! error callback and must surface to whoever invoked the protocol method instead.
//! The canonical case is a value callback that fails after the subscription was
//! already cancelled: the stream delivered its value, so reporting the failure
//! as a stream error would be wrong.
//!
//! ## Rules
//! - The original error is kept as-is (type, message, `source()` chain); the
//!   wrapper never re-renders it into a string.
//! - `source()` returns the original error object, so generic error reporters
//!   walk straight into it.
//! - Wrappers never nest: [`Failure::bubble`] on a bubbling failure is a no-op.
//! - A caller that receives a bubbling failure must not call `on_error` again;
//!   the subscriber already ran its own error path.

use std::error::Error as StdError;
use std::fmt;

use crate::error::Failure;

/// Normal error escaping the subscriber to the protocol caller.
///
/// # Example
/// ```
/// use std::io;
/// use firstsub::{BubblingError, Failure};
///
/// let cause = Failure::new(io::Error::new(io::ErrorKind::Other, "handler failed"));
/// let bubbling = BubblingError::new(cause.clone());
///
/// assert!(bubbling.cause().ptr_eq(&cause));
/// assert!(bubbling.cause().is::<io::Error>());
/// assert_eq!(bubbling.to_string(), "error bubbled past a terminated subscriber: handler failed");
/// ```
#[derive(Debug, Clone)]
pub struct BubblingError {
    cause: Failure,
}

impl BubblingError {
    /// Wraps `cause`.
    pub fn new(cause: Failure) -> Self {
        Self { cause }
    }

    /// Borrows the original failure.
    #[inline]
    pub fn cause(&self) -> &Failure {
        &self.cause
    }

    /// Returns the original failure.
    #[inline]
    pub fn into_cause(self) -> Failure {
        self.cause
    }
}

impl fmt::Display for BubblingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error bubbled past a terminated subscriber: {}", self.cause)
    }
}

impl StdError for BubblingError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.cause.as_error())
    }
}
