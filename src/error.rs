//! Error types used by the subscriber core and its callbacks.
//!
//! This module defines:
//!
//! - [`Failure`]: the error value raised by callbacks and returned by protocol calls.
//! - [`FatalError`]: unrecoverable runtime faults that must never be swallowed.
//! - [`BuildError`]: errors raised while assembling a subscriber.
//!
//! Typed errors provide `as_label` for logging/metrics; [`Failure`] adds
//! classification helpers ([`Failure::is_fatal`], [`Failure::is_bubbling`]).

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::bubbling::BubblingError;
use crate::classify::{self, Severity};

/// # Error value raised by a callback.
///
/// A cheaply cloneable handle over a shared `dyn Error`. Cloning never copies the
/// wrapped error, so identity survives every hop through the subscriber:
/// the error handed to `on_error`, or carried inside a [`BubblingError`], is the
/// very instance the callback produced ([`Failure::ptr_eq`]).
///
/// Any `std::error::Error + Send + Sync + 'static` converts into a `Failure`,
/// so callbacks can use `?` directly.
///
/// # Example
/// ```
/// use firstsub::{FatalError, Failure};
///
/// let normal = Failure::msg("bad input");
/// assert!(!normal.is_fatal());
///
/// let fatal = Failure::new(FatalError::StackOverflow);
/// assert!(fatal.is_fatal());
/// assert!(fatal.is::<FatalError>());
/// ```
#[derive(Clone)]
pub struct Failure {
    inner: Arc<dyn StdError + Send + Sync + 'static>,
}

impl Failure {
    /// Wraps an error value.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(error),
        }
    }

    /// Wraps an already shared error without re-allocating it.
    pub fn from_arc(inner: Arc<dyn StdError + Send + Sync + 'static>) -> Self {
        Self { inner }
    }

    /// Converts a boxed error (the usual `Box<dyn Error>` returned by libraries).
    pub fn from_boxed(boxed: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        Self {
            inner: Arc::from(boxed),
        }
    }

    /// Builds a normal failure from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(Message(message.into()))
    }

    /// Returns `true` if the wrapped error is of type `E`.
    #[inline]
    pub fn is<E: StdError + 'static>(&self) -> bool {
        self.inner.is::<E>()
    }

    /// Borrows the wrapped error as `E`, if it has that type.
    #[inline]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    /// Borrows the wrapped error object.
    #[inline]
    pub fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.inner
    }

    /// Returns `true` if both handles point at the same error instance.
    #[inline]
    pub fn ptr_eq(&self, other: &Failure) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Classifies the wrapped error (see [`classify::is_fatal`]).
    #[inline]
    pub fn severity(&self) -> Severity {
        Severity::of(self.as_error())
    }

    /// Returns `true` if the wrapped error is fatal and must never be swallowed.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        classify::is_fatal(self.as_error())
    }

    /// Returns `true` if this failure is a [`BubblingError`].
    #[inline]
    pub fn is_bubbling(&self) -> bool {
        self.is::<BubblingError>()
    }

    /// Wraps this failure into a [`BubblingError`].
    ///
    /// A failure that is already bubbling is returned unchanged; wrappers never nest.
    pub fn bubble(self) -> Failure {
        if self.is_bubbling() {
            return self;
        }
        Failure::new(BubblingError::new(self))
    }

    /// Returns the original cause of a bubbling failure, or `self` otherwise.
    ///
    /// # Example
    /// ```
    /// use firstsub::Failure;
    ///
    /// let original = Failure::msg("boom");
    /// let bubbled = original.clone().bubble();
    /// assert!(bubbled.is_bubbling());
    /// assert!(bubbled.unwrap_bubbling().ptr_eq(&original));
    /// ```
    pub fn unwrap_bubbling(self) -> Failure {
        match self.downcast_ref::<BubblingError>() {
            Some(bubbling) => bubbling.cause().clone(),
            None => self,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        if self.is_bubbling() {
            "bubbling"
        } else {
            self.severity().as_label()
        }
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}

impl<E> From<E> for Failure
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Failure::new(error)
    }
}

/// Plain-message error behind [`Failure::msg`].
#[derive(Error, Debug)]
#[error("{0}")]
struct Message(String);

/// # Unrecoverable runtime faults.
///
/// Continuing normal protocol work after one of these is unsafe: the subscriber
/// neither cancels nor calls `on_error`, it hands the failure straight back to the
/// caller of the protocol method.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FatalError {
    /// Memory could not be allocated.
    #[error("out of memory: {detail}")]
    OutOfMemory {
        /// What was being allocated.
        detail: String,
    },

    /// Recursion or stack usage exceeded its limit.
    #[error("stack overflow")]
    StackOverflow,

    /// Non-local exit requested by the host runtime; must never be intercepted.
    #[error("thread death requested")]
    ThreadDeath,

    /// A required symbol, plugin or binding could not be resolved.
    #[error("linkage failure: {detail}")]
    Linkage {
        /// The unresolved item.
        detail: String,
    },

    /// Static or lazy initialization failed; dependent state is unusable.
    #[error("initialization failure: {detail}")]
    Initialization {
        /// What failed to initialize.
        detail: String,
    },

    /// Any other fault of the host runtime itself.
    #[error("internal runtime fault: {detail}")]
    InternalFault {
        /// Description of the fault.
        detail: String,
    },
}

impl FatalError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use firstsub::FatalError;
    ///
    /// assert_eq!(FatalError::StackOverflow.as_label(), "fatal_stack_overflow");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            FatalError::OutOfMemory { .. } => "fatal_out_of_memory",
            FatalError::StackOverflow => "fatal_stack_overflow",
            FatalError::ThreadDeath => "fatal_thread_death",
            FatalError::Linkage { .. } => "fatal_linkage",
            FatalError::Initialization { .. } => "fatal_initialization",
            FatalError::InternalFault { .. } => "fatal_internal_fault",
        }
    }
}

/// # Errors produced while building a subscriber.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    /// A mandatory handler (value, error or complete) was not supplied.
    #[error("missing mandatory `{handler}` handler")]
    MissingHandler {
        /// Name of the missing handler.
        handler: &'static str,
    },
}

impl BuildError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BuildError::MissingHandler { .. } => "build_missing_handler",
        }
    }
}
