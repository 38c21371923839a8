//! Error types for retry execution and policy construction.

use std::fmt;
use std::time::Duration;

/// Terminal outcome of an execution that did not produce a result.
///
/// The error returned by the unit of work is carried unchanged in
/// [`RetryError::Propagated`], so callers can still match on their own error
/// type. The engine itself only originates [`RetryError::Timeout`] and
/// [`RetryError::Interrupted`].
///
/// # Examples
///
/// ```rust
/// use easyretry::{Executor, FailureKind, RetryError, RetryPolicy};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Kind { Unavailable }
///
/// impl FailureKind for Kind {
///     fn parent(&self) -> Option<Self> { None }
/// }
///
/// let policy = RetryPolicy::<Kind>::builder().with_max_attempts(2).build().unwrap();
/// let executor = Executor::new(policy);
///
/// match executor.run(|| Err(Kind::Unavailable)) {
///     Err(RetryError::Propagated(kind)) => assert_eq!(kind, Kind::Unavailable),
///     other => panic!("unexpected outcome: {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The work failed and classification or the attempt budget ruled out
    /// another attempt. Holds the error from the last attempt.
    Propagated(E),
    /// The wall-clock budget was exceeded.
    Timeout(TimeoutError),
    /// A backoff pause was interrupted. Only returned by the interruptible
    /// entry points.
    Interrupted {
        /// Attempts made before the interruption.
        attempts: u32,
    },
}

impl<E> RetryError<E> {
    /// Extract the propagated error, if this is one.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Propagated(e) => Some(e),
            Self::Timeout(_) | Self::Interrupted { .. } => None,
        }
    }

    /// Get a reference to the propagated error, if this is one.
    pub fn propagated(&self) -> Option<&E> {
        match self {
            Self::Propagated(e) => Some(e),
            Self::Timeout(_) | Self::Interrupted { .. } => None,
        }
    }

    /// Returns true if the wall-clock budget was exceeded.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns true if a backoff pause was interrupted.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }

    /// Get the timeout details, if this is a timeout.
    pub fn timeout(&self) -> Option<&TimeoutError> {
        match self {
            Self::Timeout(t) => Some(t),
            Self::Propagated(_) | Self::Interrupted { .. } => None,
        }
    }
}

impl<E> From<TimeoutError> for RetryError<E> {
    fn from(err: TimeoutError) -> Self {
        Self::Timeout(err)
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Propagated(e) => write!(f, "{}", e),
            Self::Timeout(t) => write!(f, "{}", t),
            Self::Interrupted { attempts } => {
                write!(f, "interrupted during backoff after {} attempts", attempts)
            }
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Propagated(e) => Some(e),
            Self::Timeout(t) => Some(t),
            Self::Interrupted { .. } => None,
        }
    }
}

/// Error raised when the maximum wait time has been reached.
///
/// The budget is checked after every attempt that did not end the execution,
/// so a single slow attempt can overshoot it; `elapsed` records by how much.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutError {
    /// Attempts made before the budget ran out.
    pub attempts: u32,
    /// The configured maximum number of attempts.
    pub max_attempts: u32,
    /// The configured wall-clock budget.
    pub max_wait_time: Duration,
    /// Time elapsed since the first attempt began.
    pub elapsed: Duration,
}

impl TimeoutError {
    /// Create a new timeout error.
    pub fn new(
        attempts: u32,
        max_attempts: u32,
        max_wait_time: Duration,
        elapsed: Duration,
    ) -> Self {
        Self {
            attempts,
            max_attempts,
            max_wait_time,
            elapsed,
        }
    }
}

impl fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max wait time {:?} reached after {}/{} attempts ({:?} elapsed), ",
            self.max_wait_time, self.attempts, self.max_attempts, self.elapsed
        )?;
        f.write_str("retry will not be continued")
    }
}

impl std::error::Error for TimeoutError {}

/// Error returned when a policy is misconfigured.
///
/// Only produced by [`RetryPolicyBuilder::build`](crate::RetryPolicyBuilder::build).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError<K> {
    /// The same kinds appear in both the include and the exclude set.
    Conflict {
        /// The kinds present in both sets.
        kinds: Vec<K>,
    },
    /// `max_attempts` was set to zero.
    ZeroAttempts,
}

impl<K: fmt::Debug> fmt::Display for ConfigurationError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { kinds } => {
                write!(f, "{:?} are both included and excluded", kinds)
            }
            Self::ZeroAttempts => write!(f, "max attempts must be at least 1"),
        }
    }
}

impl<K: fmt::Debug> std::error::Error for ConfigurationError<K> {}
