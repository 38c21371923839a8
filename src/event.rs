//! Per-attempt diagnostic events.

use std::time::Duration;

/// Information about a finished attempt, passed to hooks.
///
/// Emitted once per attempt, after the executor has decided what to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryEvent<K> {
    /// Which attempt just finished (1-indexed).
    pub attempt: u32,
    /// The configured maximum number of attempts.
    pub max_attempts: u32,
    /// Total elapsed time since the first attempt began.
    pub elapsed: Duration,
    /// How the attempt ended.
    pub outcome: AttemptOutcome<K>,
    /// What the executor does next.
    pub decision: Decision,
}

/// How a single attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome<K> {
    /// The work produced a value that was accepted (or needed no acceptance).
    Accepted,
    /// The work produced a value that the acceptance predicate rejected.
    Rejected,
    /// The work failed with a failure of this kind.
    Failed {
        /// Kind of the failure.
        kind: K,
        /// Whether classification allows another attempt for this kind.
        retryable: bool,
    },
}

/// What the executor does after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Return the produced value to the caller.
    Return,
    /// Return the failure to the caller unchanged.
    Propagate,
    /// Stop because the wall-clock budget is exhausted.
    TimedOut,
    /// Make another attempt after pausing for `delay`.
    Retry {
        /// Backoff pause before the next attempt.
        delay: Duration,
    },
}

impl Decision {
    /// Returns true if this decision ends the execution.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Decision::Retry { .. })
    }
}
