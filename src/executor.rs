//! The retry loop.
//!
//! An [`Executor`] drives a unit of work against a [`RetryPolicy`]. Work is
//! either an *action* (`FnMut() -> Result<(), E>`) or a *producer*
//! (`FnMut() -> Result<T, E>`), optionally paired with an acceptance predicate
//! that can reject a successfully produced value and ask for another attempt.
//!
//! Every entry point owns its own attempt counter and start instant, so one
//! executor can serve any number of concurrent calls.
//!
//! # Interruptible and non-interruptible calls
//!
//! The only place the loop blocks is the backoff pause between attempts. The
//! pause waits on the calling thread's [`Interrupt`] handle
//! ([`Interrupt::current`]). When that handle is raised during the pause:
//!
//! - `run`, `call` and `call_until` absorb the interruption, log a warning and
//!   return an absent result (`Ok(())` or `Ok(None)`);
//! - `run_interruptible`, `call_interruptible` and `call_until_interruptible`
//!   return [`RetryError::Interrupted`].
//!
//! # Example
//!
//! ```rust
//! use easyretry::{Executor, FailureKind, RetryPolicy};
//! use std::cell::Cell;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Kind { Unavailable }
//!
//! impl FailureKind for Kind {
//!     fn parent(&self) -> Option<Self> { None }
//! }
//!
//! let policy = RetryPolicy::<Kind>::builder().with_max_attempts(5).build().unwrap();
//! let executor = Executor::new(policy);
//!
//! let calls = Cell::new(0);
//! let value = executor
//!     .call_until(
//!         || {
//!             calls.set(calls.get() + 1);
//!             Ok::<_, Kind>(calls.get())
//!         },
//!         |n| *n == 2,
//!     )
//!     .unwrap();
//!
//! assert_eq!(value, Some(2));
//! assert_eq!(calls.get(), 2);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{RetryError, TimeoutError};
use crate::event::{AttemptOutcome, Decision, RetryEvent};
use crate::interrupt::Interrupt;
use crate::kind::{Failure, FailureKind};
use crate::policy::RetryPolicy;

type Hook<K> = Arc<dyn Fn(&RetryEvent<K>) + Send + Sync>;

/// Runs units of work under a [`RetryPolicy`].
///
/// Cloning an executor is cheap; clones share the policy and the hook. The
/// executor holds no cancellation state: each call pauses on the handle of the
/// thread that made it.
#[derive(Clone)]
pub struct Executor<K: FailureKind> {
    policy: Arc<RetryPolicy<K>>,
    hook: Option<Hook<K>>,
}

impl<K: FailureKind> fmt::Debug for Executor<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("policy", &self.policy)
            .field("hook", &self.hook.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl<K: FailureKind> From<RetryPolicy<K>> for Executor<K> {
    fn from(policy: RetryPolicy<K>) -> Self {
        Self::new(policy)
    }
}

impl<K: FailureKind> Executor<K> {
    /// Create an executor for `policy`.
    pub fn new(policy: RetryPolicy<K>) -> Self {
        Self {
            policy: Arc::new(policy),
            hook: None,
        }
    }

    /// The policy this executor applies.
    pub fn policy(&self) -> &RetryPolicy<K> {
        &self.policy
    }

    /// Observe every attempt.
    ///
    /// The hook is called synchronously after each attempt, once the next step
    /// is decided and before any backoff pause. It should not block.
    ///
    /// ```rust
    /// use easyretry::{Decision, Executor, FailureKind, RetryEvent, RetryPolicy};
    /// use std::sync::{Arc, Mutex};
    ///
    /// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// enum Kind { Busy }
    ///
    /// impl FailureKind for Kind {
    ///     fn parent(&self) -> Option<Self> { None }
    /// }
    ///
    /// let decisions = Arc::new(Mutex::new(Vec::new()));
    /// let seen = decisions.clone();
    ///
    /// let executor = Executor::new(RetryPolicy::<Kind>::default())
    ///     .with_hook(move |event: &RetryEvent<Kind>| {
    ///         seen.lock().unwrap().push(event.decision);
    ///     });
    ///
    /// let _ = executor.run(|| Err(Kind::Busy));
    ///
    /// let decisions = decisions.lock().unwrap();
    /// assert_eq!(decisions.len(), 3);
    /// assert_eq!(decisions[2], Decision::Propagate);
    /// ```
    pub fn with_hook<H>(mut self, hook: H) -> Self
    where
        H: Fn(&RetryEvent<K>) + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Run an action until it succeeds or the policy gives up.
    ///
    /// An interrupted backoff pause ends the execution with `Ok(())`.
    ///
    /// # Errors
    ///
    /// [`RetryError::Propagated`] with the action's last error, or
    /// [`RetryError::Timeout`].
    pub fn run<A, E>(&self, action: A) -> Result<(), RetryError<E>>
    where
        A: FnMut() -> Result<(), E>,
        E: Failure<Kind = K>,
    {
        absorb(self.execute(action, None)).map(|_| ())
    }

    /// Call a producer until it succeeds or the policy gives up.
    ///
    /// Returns `Ok(None)` only when a backoff pause was interrupted.
    ///
    /// # Errors
    ///
    /// [`RetryError::Propagated`] with the producer's last error, or
    /// [`RetryError::Timeout`].
    pub fn call<T, P, E>(&self, producer: P) -> Result<Option<T>, RetryError<E>>
    where
        P: FnMut() -> Result<T, E>,
        E: Failure<Kind = K>,
    {
        absorb(self.execute(producer, None))
    }

    /// Call a producer until it returns a value `accept` approves.
    ///
    /// If the last permitted attempt produces a rejected value, that value is
    /// returned anyway. Returns `Ok(None)` only when a backoff pause was
    /// interrupted.
    ///
    /// # Errors
    ///
    /// [`RetryError::Propagated`] with the producer's last error, or
    /// [`RetryError::Timeout`].
    pub fn call_until<T, P, A, E>(
        &self,
        producer: P,
        mut accept: A,
    ) -> Result<Option<T>, RetryError<E>>
    where
        P: FnMut() -> Result<T, E>,
        A: FnMut(&T) -> bool,
        E: Failure<Kind = K>,
    {
        absorb(self.execute(producer, Some(&mut accept)))
    }

    /// Like [`run`](Self::run), but an interrupted pause is an error.
    ///
    /// # Errors
    ///
    /// [`RetryError::Propagated`], [`RetryError::Timeout`] or
    /// [`RetryError::Interrupted`].
    pub fn run_interruptible<A, E>(&self, action: A) -> Result<(), RetryError<E>>
    where
        A: FnMut() -> Result<(), E>,
        E: Failure<Kind = K>,
    {
        self.execute(action, None)
    }

    /// Like [`call`](Self::call), but an interrupted pause is an error.
    ///
    /// # Errors
    ///
    /// [`RetryError::Propagated`], [`RetryError::Timeout`] or
    /// [`RetryError::Interrupted`].
    pub fn call_interruptible<T, P, E>(&self, producer: P) -> Result<T, RetryError<E>>
    where
        P: FnMut() -> Result<T, E>,
        E: Failure<Kind = K>,
    {
        self.execute(producer, None)
    }

    /// Like [`call_until`](Self::call_until), but an interrupted pause is an
    /// error.
    ///
    /// # Errors
    ///
    /// [`RetryError::Propagated`], [`RetryError::Timeout`] or
    /// [`RetryError::Interrupted`].
    pub fn call_until_interruptible<T, P, A, E>(
        &self,
        producer: P,
        mut accept: A,
    ) -> Result<T, RetryError<E>>
    where
        P: FnMut() -> Result<T, E>,
        A: FnMut(&T) -> bool,
        E: Failure<Kind = K>,
    {
        self.execute(producer, Some(&mut accept))
    }

    fn execute<T, P, E>(
        &self,
        mut work: P,
        mut accept: Option<&mut dyn FnMut(&T) -> bool>,
    ) -> Result<T, RetryError<E>>
    where
        P: FnMut() -> Result<T, E>,
        E: Failure<Kind = K>,
    {
        let max_attempts = self.policy.max_attempts();
        let _span = tracing::debug_span!("retry", max_attempts).entered();

        let start = Instant::now();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let last = attempt >= max_attempts;
            tracing::debug!(attempt, max_attempts, "attempt");

            let (outcome, rejected) = match work() {
                Ok(value) => {
                    let accepted = match accept.as_deref_mut() {
                        Some(accept) => accept(&value),
                        None => true,
                    };
                    if accepted {
                        tracing::debug!(attempt, max_attempts, "work finished");
                        self.emit(
                            attempt,
                            start.elapsed(),
                            AttemptOutcome::Accepted,
                            Decision::Return,
                        );
                        return Ok(value);
                    }
                    tracing::debug!(
                        attempt,
                        max_attempts,
                        "result rejected, retry will be continued"
                    );
                    (AttemptOutcome::Rejected, Some(value))
                }
                Err(error) => {
                    let kind = error.kind();
                    let retryable = self.policy.should_retry(kind);
                    let outcome = AttemptOutcome::Failed { kind, retryable };
                    if last || !retryable {
                        tracing::error!(
                            attempt,
                            max_attempts,
                            ?kind,
                            retryable,
                            "attempt failed, giving up"
                        );
                        self.emit(attempt, start.elapsed(), outcome, Decision::Propagate);
                        return Err(RetryError::Propagated(error));
                    }
                    tracing::warn!(attempt, max_attempts, ?kind, "attempt failed");
                    (outcome, None)
                }
            };

            let elapsed = start.elapsed();
            if let Some(limit) = self.policy.max_wait_time() {
                if elapsed >= limit {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        ?elapsed,
                        ?limit,
                        "max wait time reached"
                    );
                    self.emit(attempt, elapsed, outcome, Decision::TimedOut);
                    return Err(TimeoutError::new(attempt, max_attempts, limit, elapsed).into());
                }
            }

            // Only a rejected value can reach the final attempt's end.
            if let Some(value) = rejected.filter(|_| last) {
                tracing::debug!(
                    attempt,
                    max_attempts,
                    "attempts exhausted, returning last result"
                );
                self.emit(attempt, elapsed, outcome, Decision::Return);
                return Ok(value);
            }

            let delay = self.policy.backoff();
            self.emit(attempt, elapsed, outcome, Decision::Retry { delay });
            if !delay.is_zero() {
                tracing::debug!(?delay, "backoff");
                if Interrupt::current().pause(delay).is_err() {
                    tracing::debug!(attempt, "backoff interrupted");
                    return Err(RetryError::Interrupted { attempts: attempt });
                }
            }
        }
    }

    fn emit(
        &self,
        attempt: u32,
        elapsed: Duration,
        outcome: AttemptOutcome<K>,
        decision: Decision,
    ) {
        if let Some(hook) = &self.hook {
            hook(&RetryEvent {
                attempt,
                max_attempts: self.policy.max_attempts(),
                elapsed,
                outcome,
                decision,
            });
        }
    }
}

fn absorb<T, E>(result: Result<T, RetryError<E>>) -> Result<Option<T>, RetryError<E>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(RetryError::Interrupted { attempts }) => {
            tracing::warn!(attempts, "ignoring interruption during backoff");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
