//! # Fatal vs normal error classification.
//!
//! Every place that intercepts a callback error asks [`is_fatal`] before deciding
//! whether to report it through the error channel or hand it back untouched.
//!
//! ## Fatal set
//! - [`FatalError`] (all variants): memory/stack exhaustion, thread death,
//!   linkage and initialization faults, internal runtime faults.
//! - [`TryReserveError`]: an allocation failure surfaced as a value.
//!
//! Everything else is [`Severity::Normal`].
//!
//! ## Rules
//! - Only the outermost error is inspected. A normal error whose `source()`
//!   chain contains a fatal error stays normal.
//! - Pure: no side effects, never panics, same answer for the same instance.

use std::collections::TryReserveError;
use std::error::Error as StdError;

use crate::error::FatalError;

/// Two-tier error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Unrecoverable runtime fault; must propagate unchanged.
    Fatal,
    /// Application-level error; eligible for the error callback.
    Normal,
}

impl Severity {
    /// Classifies `err`.
    #[inline]
    pub fn of(err: &(dyn StdError + 'static)) -> Self {
        if is_fatal(err) {
            Severity::Fatal
        } else {
            Severity::Normal
        }
    }

    /// Returns `true` for [`Severity::Fatal`].
    #[inline]
    pub fn is_fatal(self) -> bool {
        matches!(self, Severity::Fatal)
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            Severity::Fatal => "fatal",
            Severity::Normal => "normal",
        }
    }
}

/// Returns `true` if `err` is an unrecoverable runtime fault.
///
/// # Example
/// ```
/// use std::io;
/// use firstsub::{is_fatal, FatalError};
///
/// assert!(is_fatal(&FatalError::OutOfMemory { detail: "buffer".into() }));
/// assert!(!is_fatal(&io::Error::new(io::ErrorKind::Other, "disk")));
/// ```
pub fn is_fatal(err: &(dyn StdError + 'static)) -> bool {
    err.is::<FatalError>() || err.is::<TryReserveError>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::io;

    #[derive(Debug)]
    struct Wrapped(FatalError);

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "wrapped")
        }
    }

    impl StdError for Wrapped {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_every_fatal_variant_is_fatal() {
        let all = [
            FatalError::OutOfMemory { detail: "x".into() },
            FatalError::StackOverflow,
            FatalError::ThreadDeath,
            FatalError::Linkage { detail: "x".into() },
            FatalError::Initialization { detail: "x".into() },
            FatalError::InternalFault { detail: "x".into() },
        ];
        for err in &all {
            assert!(is_fatal(err), "{err:?} should be fatal");
            assert_eq!(Severity::of(err), Severity::Fatal);
        }
    }

    #[test]
    fn test_try_reserve_error_is_fatal() {
        let err = Vec::<u64>::new()
            .try_reserve(usize::MAX)
            .expect_err("reserving usize::MAX elements must fail");
        assert!(is_fatal(&err));
    }

    #[test]
    fn test_application_errors_are_normal() {
        let io = io::Error::new(io::ErrorKind::InvalidInput, "bad");
        assert!(!is_fatal(&io));
        assert_eq!(Severity::of(&io), Severity::Normal);

        let parse = "x".parse::<u32>().expect_err("not a number");
        assert!(!is_fatal(&parse));
    }

    #[test]
    fn test_only_outermost_error_is_inspected() {
        let err = Wrapped(FatalError::StackOverflow);
        assert!(err.source().is_some());
        assert!(!is_fatal(&err));
    }

    #[test]
    fn test_classification_is_stable() {
        let fatal = FatalError::ThreadDeath;
        let normal = io::Error::new(io::ErrorKind::Other, "x");
        for _ in 0..3 {
            assert!(is_fatal(&fatal));
            assert!(!is_fatal(&normal));
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(Severity::Fatal.as_label(), "fatal");
        assert_eq!(Severity::Normal.as_label(), "normal");
        assert!(Severity::Fatal.is_fatal());
        assert!(!Severity::Normal.is_fatal());
    }
}
