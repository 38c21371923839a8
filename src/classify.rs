//! Failure classification.
//!
//! Decides whether a failure of a given kind permits another attempt, based on
//! the include and exclude sets of a policy. Both sets may name ancestors of the
//! failing kind, so membership is tested against the whole lineage.
//!
//! | include   | exclude   | rule                                                      |
//! |-----------|-----------|-----------------------------------------------------------|
//! | empty     | empty     | always retry                                              |
//! | non-empty | empty     | retry iff the kind is-a member of include                 |
//! | empty     | non-empty | retry unless the kind is-a member of exclude              |
//! | non-empty | non-empty | nearest ancestor wins, exclude checked first at each level |
//!
//! When both sets are configured and no level of the lineage matches either set,
//! the failure is not retried.

use std::collections::HashSet;

use crate::kind::FailureKind;

/// Returns true if a failure of `kind` should be retried.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashSet;
/// use easyretry::{should_retry, FailureKind};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Kind { Any, Io, Timeout }
///
/// impl FailureKind for Kind {
///     fn parent(&self) -> Option<Self> {
///         match self {
///             Kind::Any => None,
///             Kind::Io => Some(Kind::Any),
///             Kind::Timeout => Some(Kind::Io),
///         }
///     }
/// }
///
/// let include = HashSet::from([Kind::Any]);
/// let exclude = HashSet::from([Kind::Timeout]);
///
/// // The exclude entry is closer to `Timeout` than the include entry.
/// assert!(!should_retry(Kind::Timeout, &include, &exclude));
/// assert!(should_retry(Kind::Io, &include, &exclude));
/// ```
pub fn should_retry<K: FailureKind>(kind: K, include: &HashSet<K>, exclude: &HashSet<K>) -> bool {
    match (include.is_empty(), exclude.is_empty()) {
        (true, true) => true,
        (false, true) => match kind.lineage().find(|k| include.contains(k)) {
            Some(matched) => {
                tracing::debug!(?kind, ?matched, "included, retry");
                true
            }
            None => {
                tracing::debug!(?kind, "not included, no retry");
                false
            }
        },
        (true, false) => match kind.lineage().find(|k| exclude.contains(k)) {
            Some(matched) => {
                tracing::debug!(?kind, ?matched, "excluded, no retry");
                false
            }
            None => true,
        },
        (false, false) => nearest_match(kind, include, exclude),
    }
}

fn nearest_match<K: FailureKind>(kind: K, include: &HashSet<K>, exclude: &HashSet<K>) -> bool {
    for level in kind.lineage() {
        if exclude.contains(&level) {
            tracing::debug!(?kind, matched = ?level, "excluded, no retry");
            return false;
        }
        if include.contains(&level) {
            tracing::debug!(?kind, matched = ?level, "included, retry");
            return true;
        }
    }
    tracing::debug!(?kind, "neither included nor excluded, no retry");
    false
}
