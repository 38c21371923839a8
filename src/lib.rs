//! # easyretry
//!
//! Synchronous retry execution for fallible work.
//!
//! A [`RetryPolicy`] describes *which* failures are worth another attempt and
//! *how much* retrying is allowed; an [`Executor`] applies it to a closure:
//!
//! - **Classification**: failures are filtered by [`FailureKind`], a hierarchy
//!   of kinds. Include and exclude sets may name ancestors; the nearest match
//!   wins.
//! - **Acceptance**: a predicate can reject a successfully produced value and
//!   ask for another attempt.
//! - **Budget**: maximum attempts, maximum wall-clock time, and a fixed pause
//!   between attempts.
//!
//! ## Quick Example
//!
//! ```rust
//! use easyretry::{Executor, FailureKind, RetryError, RetryPolicy};
//! use std::time::Duration;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Kind {
//!     Any,
//!     Network,
//!     Refused,
//!     InvalidInput,
//! }
//!
//! impl FailureKind for Kind {
//!     fn parent(&self) -> Option<Self> {
//!         match self {
//!             Kind::Any => None,
//!             Kind::Network | Kind::InvalidInput => Some(Kind::Any),
//!             Kind::Refused => Some(Kind::Network),
//!         }
//!     }
//! }
//!
//! let policy = RetryPolicy::builder()
//!     .include([Kind::Network])
//!     .with_max_attempts(4)
//!     .with_backoff(Duration::from_millis(1))
//!     .build()
//!     .unwrap();
//! let executor = Executor::new(policy);
//!
//! // `Refused` is a `Network` failure, so it is retried.
//! let mut calls = 0;
//! let value = executor.call(|| {
//!     calls += 1;
//!     if calls < 3 { Err(Kind::Refused) } else { Ok(calls) }
//! });
//! assert_eq!(value, Ok(Some(3)));
//!
//! // `InvalidInput` is not included, so it is returned on the first attempt.
//! let result = executor.run(|| Err(Kind::InvalidInput));
//! assert_eq!(result, Err(RetryError::Propagated(Kind::InvalidInput)));
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod classify;
pub mod error;
pub mod event;
pub mod executor;
pub mod interrupt;
pub mod kind;
#[cfg(feature = "serde")]
mod millis;
pub mod policy;
pub mod testing;

// Re-exports
pub use classify::should_retry;
pub use error::{ConfigurationError, RetryError, TimeoutError};
pub use event::{AttemptOutcome, Decision, RetryEvent};
pub use executor::Executor;
pub use interrupt::{Interrupt, Interrupted};
pub use kind::{Failure, FailureKind, Lineage};
pub use policy::{RetryPolicy, RetryPolicyBuilder, DEFAULT_MAX_ATTEMPTS};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{ConfigurationError, RetryError, TimeoutError};
    pub use crate::executor::Executor;
    pub use crate::interrupt::Interrupt;
    pub use crate::kind::{Failure, FailureKind};
    pub use crate::policy::{RetryPolicy, RetryPolicyBuilder};
}
