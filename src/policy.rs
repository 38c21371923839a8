//! Retry policy types and configuration.

use std::collections::HashSet;
use std::time::Duration;

use crate::classify::should_retry;
use crate::error::ConfigurationError;
use crate::kind::FailureKind;

/// Default number of attempts, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// A retry policy describing which failures are retried and how often.
///
/// Policies are pure data: they describe retry behavior but don't execute it.
/// They are built once through [`RetryPolicyBuilder`], validated at that point,
/// and never change afterwards, so a single policy can back any number of
/// executions on any number of threads.
///
/// # Examples
///
/// ```rust
/// use easyretry::{FailureKind, RetryPolicy};
/// use std::time::Duration;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Kind { Any, Io }
///
/// impl FailureKind for Kind {
///     fn parent(&self) -> Option<Self> {
///         match self {
///             Kind::Any => None,
///             Kind::Io => Some(Kind::Any),
///         }
///     }
/// }
///
/// let policy = RetryPolicy::builder()
///     .include([Kind::Io])
///     .with_max_attempts(5)
///     .with_backoff(Duration::from_millis(200))
///     .build()
///     .unwrap();
///
/// assert_eq!(policy.max_attempts(), 5);
/// assert_eq!(policy.max_wait_time(), None);
/// assert!(policy.should_retry(Kind::Io));
/// assert!(!policy.should_retry(Kind::Any));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy<K: FailureKind> {
    include: HashSet<K>,
    exclude: HashSet<K>,
    max_attempts: u32,
    max_wait_time: Option<Duration>,
    backoff: Duration,
}

impl<K: FailureKind> RetryPolicy<K> {
    /// Start building a policy with default settings.
    pub fn builder() -> RetryPolicyBuilder<K> {
        RetryPolicyBuilder::new()
    }

    /// Kinds whose failures (including descendants) permit a retry.
    pub fn include(&self) -> &HashSet<K> {
        &self.include
    }

    /// Kinds whose failures (including descendants) are propagated immediately.
    pub fn exclude(&self) -> &HashSet<K> {
        &self.exclude
    }

    /// Maximum number of attempts, including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wall-clock budget measured from the start of the first attempt.
    ///
    /// `None` means unbounded.
    pub fn max_wait_time(&self) -> Option<Duration> {
        self.max_wait_time
    }

    /// Pause between attempts. Zero means no pause.
    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Classify a failure kind against this policy's filters.
    pub fn should_retry(&self, kind: K) -> bool {
        should_retry(kind, &self.include, &self.exclude)
    }
}

impl<K: FailureKind> Default for RetryPolicy<K> {
    /// Three attempts, no filters, no pause, no time limit.
    fn default() -> Self {
        Self {
            include: HashSet::new(),
            exclude: HashSet::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_wait_time: None,
            backoff: Duration::ZERO,
        }
    }
}

/// Builder for [`RetryPolicy`].
///
/// With the `serde` feature the builder can be deserialized from configuration;
/// every field is optional and durations are given in milliseconds:
///
/// ```json
/// { "include": ["Io"], "max_attempts": 5, "max_wait_time": 3000, "backoff": 200 }
/// ```
///
/// Deserialized configuration is validated by the same [`build`](Self::build).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        default,
        bound(
            serialize = "K: serde::Serialize",
            deserialize = "K: FailureKind + serde::Deserialize<'de>"
        )
    )
)]
pub struct RetryPolicyBuilder<K: FailureKind> {
    include: HashSet<K>,
    exclude: HashSet<K>,
    max_attempts: u32,
    #[cfg_attr(feature = "serde", serde(with = "crate::millis"))]
    max_wait_time: Duration,
    #[cfg_attr(feature = "serde", serde(with = "crate::millis"))]
    backoff: Duration,
}

impl<K: FailureKind> RetryPolicyBuilder<K> {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            include: HashSet::new(),
            exclude: HashSet::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_wait_time: Duration::ZERO,
            backoff: Duration::ZERO,
        }
    }

    /// Retry failures of these kinds and their descendants.
    ///
    /// Accumulates across calls.
    pub fn include<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        self.include.extend(kinds);
        self
    }

    /// Retry failures of this kind and its descendants.
    pub fn include_kind(mut self, kind: K) -> Self {
        self.include.insert(kind);
        self
    }

    /// Never retry failures of these kinds and their descendants.
    ///
    /// Accumulates across calls.
    pub fn exclude<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        self.exclude.extend(kinds);
        self
    }

    /// Never retry failures of this kind and its descendants.
    pub fn exclude_kind(mut self, kind: K) -> Self {
        self.exclude.insert(kind);
        self
    }

    /// Set the maximum number of attempts, including the first one.
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the wall-clock budget. Zero means unbounded.
    pub fn with_max_wait_time(mut self, d: Duration) -> Self {
        self.max_wait_time = d;
        self
    }

    /// Set the pause between attempts. Zero means no pause.
    pub fn with_backoff(mut self, d: Duration) -> Self {
        self.backoff = d;
        self
    }

    /// Validate the configuration and freeze it into a [`RetryPolicy`].
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::Conflict`] if a kind is both included and excluded.
    /// - [`ConfigurationError::ZeroAttempts`] if `max_attempts` is zero.
    pub fn build(self) -> Result<RetryPolicy<K>, ConfigurationError<K>> {
        let conflicts: Vec<K> = self.include.intersection(&self.exclude).copied().collect();
        if !conflicts.is_empty() {
            return Err(ConfigurationError::Conflict { kinds: conflicts });
        }
        if self.max_attempts == 0 {
            return Err(ConfigurationError::ZeroAttempts);
        }

        Ok(RetryPolicy {
            include: self.include,
            exclude: self.exclude,
            max_attempts: self.max_attempts,
            max_wait_time: (!self.max_wait_time.is_zero()).then_some(self.max_wait_time),
            backoff: self.backoff,
        })
    }
}

impl<K: FailureKind> Default for RetryPolicyBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}
