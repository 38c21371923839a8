//! Failure kinds and their hierarchy.
//!
//! A retry policy filters failures by *kind* rather than by value. Kinds form a
//! hierarchy: every kind may name a parent, and a filter configured for a parent
//! also applies to all of its descendants. There is no runtime reflection
//! involved; each kind declares its own lineage through [`FailureKind::parent`].
//!
//! # Example
//!
//! ```rust
//! use easyretry::{Failure, FailureKind};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Kind {
//!     Any,
//!     Io,
//!     ConnectionReset,
//!     Parse,
//! }
//!
//! impl FailureKind for Kind {
//!     fn parent(&self) -> Option<Self> {
//!         match self {
//!             Kind::Any => None,
//!             Kind::Io | Kind::Parse => Some(Kind::Any),
//!             Kind::ConnectionReset => Some(Kind::Io),
//!         }
//!     }
//! }
//!
//! assert!(Kind::ConnectionReset.is_a(Kind::Io));
//! assert!(Kind::ConnectionReset.is_a(Kind::Any));
//! assert!(!Kind::Parse.is_a(Kind::Io));
//!
//! let lineage: Vec<_> = Kind::ConnectionReset.lineage().collect();
//! assert_eq!(lineage, vec![Kind::ConnectionReset, Kind::Io, Kind::Any]);
//!
//! // A kind is a failure of itself, so it can be returned directly as an error.
//! assert_eq!(Kind::Parse.kind(), Kind::Parse);
//! ```

use std::fmt::Debug;
use std::hash::Hash;
use std::iter::FusedIterator;

/// A node in a failure hierarchy.
///
/// Implementors are usually small fieldless enums. The hierarchy must be
/// acyclic: following [`parent`](FailureKind::parent) from any kind has to reach
/// a root (a kind whose parent is `None`).
pub trait FailureKind: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// The direct ancestor of this kind, or `None` for a root.
    fn parent(&self) -> Option<Self>;

    /// Iterate over this kind and its ancestors, nearest first.
    fn lineage(self) -> Lineage<Self> {
        Lineage { next: Some(self) }
    }

    /// Returns true if `ancestor` is this kind or one of its ancestors.
    fn is_a(self, ancestor: Self) -> bool {
        self.lineage().any(|kind| kind == ancestor)
    }
}

/// An error that can be classified by a retry policy.
///
/// Every error returned by a unit of work must report its kind so the executor
/// can decide whether another attempt is allowed.
///
/// ```rust
/// use easyretry::{Failure, FailureKind};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Kind {
///     Transient,
/// }
///
/// impl FailureKind for Kind {
///     fn parent(&self) -> Option<Self> {
///         None
///     }
/// }
///
/// #[derive(Debug)]
/// struct FetchError {
///     status: u16,
/// }
///
/// impl Failure for FetchError {
///     type Kind = Kind;
///
///     fn kind(&self) -> Kind {
///         Kind::Transient
///     }
/// }
///
/// assert_eq!(FetchError { status: 503 }.kind(), Kind::Transient);
/// ```
pub trait Failure {
    /// The hierarchy this failure belongs to.
    type Kind: FailureKind;

    /// The concrete kind of this failure.
    fn kind(&self) -> Self::Kind;
}

impl<K: FailureKind> Failure for K {
    type Kind = K;

    fn kind(&self) -> K {
        *self
    }
}

/// Iterator over a kind and its ancestors.
///
/// Created by [`FailureKind::lineage`].
#[derive(Debug, Clone)]
pub struct Lineage<K> {
    next: Option<K>,
}

impl<K: FailureKind> Iterator for Lineage<K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

impl<K: FailureKind> FusedIterator for Lineage<K> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Root,
        Middle,
        Leaf,
        Sibling,
    }

    impl FailureKind for Kind {
        fn parent(&self) -> Option<Self> {
            match self {
                Kind::Root => None,
                Kind::Middle | Kind::Sibling => Some(Kind::Root),
                Kind::Leaf => Some(Kind::Middle),
            }
        }
    }

    #[test]
    fn test_lineage_walks_to_root() {
        let lineage: Vec<_> = Kind::Leaf.lineage().collect();
        assert_eq!(lineage, vec![Kind::Leaf, Kind::Middle, Kind::Root]);
    }

    #[test]
    fn test_lineage_of_root_is_itself() {
        let lineage: Vec<_> = Kind::Root.lineage().collect();
        assert_eq!(lineage, vec![Kind::Root]);
    }

    #[test]
    fn test_lineage_is_fused() {
        let mut lineage = Kind::Root.lineage();
        assert_eq!(lineage.next(), Some(Kind::Root));
        assert_eq!(lineage.next(), None);
        assert_eq!(lineage.next(), None);
    }

    #[test]
    fn test_is_a() {
        assert!(Kind::Leaf.is_a(Kind::Leaf));
        assert!(Kind::Leaf.is_a(Kind::Middle));
        assert!(Kind::Leaf.is_a(Kind::Root));
        assert!(!Kind::Leaf.is_a(Kind::Sibling));
        assert!(!Kind::Middle.is_a(Kind::Leaf));
    }

    #[test]
    fn test_kind_is_its_own_failure() {
        assert_eq!(Kind::Sibling.kind(), Kind::Sibling);
    }
}
