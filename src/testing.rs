//! Testing utilities for code that retries.
//!
//! # Examples
//!
//! ```rust
//! use easyretry::testing::Flaky;
//! use easyretry::{Executor, FailureKind, RetryPolicy};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Kind { Busy }
//!
//! impl FailureKind for Kind {
//!     fn parent(&self) -> Option<Self> { None }
//! }
//!
//! // Fails twice, then succeeds with the call count.
//! let flaky = Flaky::new(2, Kind::Busy);
//! let executor = Executor::new(RetryPolicy::<Kind>::default());
//!
//! assert_eq!(executor.call(|| flaky.attempt()).unwrap(), Some(3));
//! assert_eq!(flaky.calls(), 3);
//! ```

use std::sync::atomic::{AtomicU32, Ordering};

/// A scripted unit of work that fails a fixed number of times.
///
/// Each call to [`attempt`](Flaky::attempt) is counted. The first `failures`
/// calls return a clone of the configured error; later calls return the
/// 1-indexed call number. The counter is atomic, so a `Flaky` can be shared
/// between threads.
#[derive(Debug)]
pub struct Flaky<E> {
    failures: u32,
    error: E,
    calls: AtomicU32,
}

impl<E: Clone> Flaky<E> {
    /// Fail the first `failures` calls with `error`.
    pub fn new(failures: u32, error: E) -> Self {
        Self {
            failures,
            error,
            calls: AtomicU32::new(0),
        }
    }

    /// Never succeed.
    pub fn always(error: E) -> Self {
        Self::new(u32::MAX, error)
    }

    /// Record a call and return its scripted outcome.
    pub fn attempt(&self) -> Result<u32, E> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        if call <= self.failures {
            Err(self.error.clone())
        } else {
            Ok(call)
        }
    }

    /// Record a call, discarding the value on success.
    pub fn run(&self) -> Result<(), E> {
        self.attempt().map(|_| ())
    }

    /// Number of calls so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fails_then_succeeds() {
        let flaky = Flaky::new(2, "busy");

        assert_eq!(flaky.attempt(), Err("busy"));
        assert_eq!(flaky.attempt(), Err("busy"));
        assert_eq!(flaky.attempt(), Ok(3));
        assert_eq!(flaky.run(), Ok(()));
        assert_eq!(flaky.calls(), 4);
    }

    #[test]
    fn test_always_fails() {
        let flaky = Flaky::always("down");
        for _ in 0..10 {
            assert_eq!(flaky.attempt(), Err("down"));
        }
        assert_eq!(flaky.calls(), 10);
    }

    #[test]
    fn test_zero_failures_succeeds_immediately() {
        let flaky = Flaky::new(0, "unused");
        assert_eq!(flaky.attempt(), Ok(1));
    }
}
