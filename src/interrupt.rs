//! Cancellation of backoff pauses.
//!
//! An [`Interrupt`] is a cloneable handle to a cancellation signal. Every
//! thread owns one, returned by [`Interrupt::current`], and an
//! [`Executor`](crate::Executor) always pauses on the handle of the thread that
//! called it. To cancel a call, hand a clone of that thread's handle to
//! whoever should be able to stop it.
//!
//! Raising the signal wakes a pause in progress immediately. A pause that
//! observes the signal consumes it, so one interruption ends at most one pause.
//! A signal raised while nothing is paused stays pending until the next pause
//! on the owning thread.
//!
//! ```rust
//! use easyretry::Interrupt;
//! use std::thread;
//! use std::time::Duration;
//!
//! let worker = thread::spawn(|| {
//!     let interrupt = Interrupt::current();
//!     interrupt.interrupt();
//!
//!     // The pending signal ends the pause right away and is cleared.
//!     assert!(interrupt.pause(Duration::from_secs(60)).is_err());
//!     assert!(!interrupt.is_interrupted());
//! });
//! worker.join().unwrap();
//! ```

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

thread_local! {
    static CURRENT: Interrupt = Interrupt::new();
}

/// Handle used to interrupt backoff pauses.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    inner: Arc<Signal>,
}

#[derive(Debug, Default)]
struct Signal {
    raised: Mutex<bool>,
    wake: Condvar,
}

impl Signal {
    fn lock(&self) -> MutexGuard<'_, bool> {
        // The flag stays valid after a panic on another thread.
        self.raised.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returned by [`Interrupt::pause`] when the pause was cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pause interrupted")
    }
}

impl std::error::Error for Interrupted {}

impl Interrupt {
    /// Create a handle with no pending signal, owned by no thread.
    pub fn new() -> Self {
        Self::default()
    }

    /// The calling thread's handle.
    ///
    /// Every call on the same thread returns a clone of the same handle.
    /// Retry executions started on this thread pause on it.
    ///
    /// ```rust
    /// use easyretry::Interrupt;
    /// use std::thread;
    ///
    /// let here = Interrupt::current();
    /// let there = thread::spawn(Interrupt::current).join().unwrap();
    ///
    /// there.interrupt();
    /// assert!(there.is_interrupted());
    /// assert!(!here.is_interrupted());
    /// ```
    pub fn current() -> Self {
        // Thread-local storage is gone only while the thread is being torn down.
        CURRENT.try_with(Interrupt::clone).unwrap_or_default()
    }

    /// Returns true if `self` and `other` are handles to the same signal.
    pub fn same_as(&self, other: &Interrupt) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Raise the signal and wake every pause currently waiting on it.
    pub fn interrupt(&self) {
        let mut raised = self.inner.lock();
        *raised = true;
        self.inner.wake.notify_all();
    }

    /// Returns true if a signal is pending.
    pub fn is_interrupted(&self) -> bool {
        *self.inner.lock()
    }

    /// Drop a pending signal without pausing.
    pub fn clear(&self) {
        *self.inner.lock() = false;
    }

    /// Block the current thread for `duration` unless interrupted first.
    ///
    /// # Errors
    ///
    /// Returns [`Interrupted`] if the signal was pending or raised during the
    /// pause. The signal is cleared in that case.
    pub fn pause(&self, duration: Duration) -> Result<(), Interrupted> {
        let guard = self.inner.lock();
        let (mut raised, _) = self
            .inner
            .wake
            .wait_timeout_while(guard, duration, |raised| !*raised)
            .unwrap_or_else(PoisonError::into_inner);

        if *raised {
            *raised = false;
            Err(Interrupted)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_pause_runs_full_duration() {
        let interrupt = Interrupt::new();
        let start = Instant::now();

        assert!(interrupt.pause(Duration::from_millis(20)).is_ok());
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_pending_signal_ends_pause_immediately() {
        let interrupt = Interrupt::new();
        interrupt.interrupt();
        assert!(interrupt.is_interrupted());

        let start = Instant::now();
        assert_eq!(interrupt.pause(Duration::from_secs(30)), Err(Interrupted));
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(!interrupt.is_interrupted());
    }

    #[test]
    fn test_signal_from_other_thread_wakes_pause() {
        let interrupt = Interrupt::new();
        let remote = interrupt.clone();

        let start = Instant::now();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.interrupt();
        });

        assert_eq!(interrupt.pause(Duration::from_secs(30)), Err(Interrupted));
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn test_current_is_stable_within_a_thread() {
        assert!(Interrupt::current().same_as(&Interrupt::current()));
        assert!(!Interrupt::current().same_as(&Interrupt::new()));
    }

    #[test]
    fn test_current_differs_between_threads() {
        let here = Interrupt::current();
        let there = thread::spawn(Interrupt::current).join().unwrap();

        assert!(!here.same_as(&there));
        there.interrupt();
        assert!(!here.is_interrupted());
    }

    #[test]
    fn test_clear_drops_pending_signal() {
        let interrupt = Interrupt::new();
        interrupt.interrupt();
        interrupt.clear();

        assert!(interrupt.pause(Duration::from_millis(1)).is_ok());
    }
}
