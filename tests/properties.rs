//! Property-based tests for classification and the attempt budget.

use easyretry::testing::Flaky;
use easyretry::{should_retry, ConfigurationError, Executor, FailureKind, RetryError, RetryPolicy};
use proptest::prelude::*;
use std::collections::HashSet;

// Root <- A <- {A1, A2}
// Root <- B <- B1 <- B11
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    Root,
    A,
    A1,
    A2,
    B,
    B1,
    B11,
}

const ALL: [Kind; 7] = [Kind::Root, Kind::A, Kind::A1, Kind::A2, Kind::B, Kind::B1, Kind::B11];

impl FailureKind for Kind {
    fn parent(&self) -> Option<Self> {
        match self {
            Kind::Root => None,
            Kind::A | Kind::B => Some(Kind::Root),
            Kind::A1 | Kind::A2 => Some(Kind::A),
            Kind::B1 => Some(Kind::B),
            Kind::B11 => Some(Kind::B1),
        }
    }
}

fn kind() -> impl Strategy<Value = Kind> {
    prop::sample::select(ALL.to_vec())
}

fn kinds() -> impl Strategy<Value = HashSet<Kind>> {
    prop::collection::hash_set(kind(), 0..4)
}

/// Nearest level of `kind`'s lineage present in `set`, 0 being the kind itself.
fn depth_of_match(kind: Kind, set: &HashSet<Kind>) -> Option<usize> {
    kind.lineage().position(|k| set.contains(&k))
}

proptest! {
    #[test]
    fn prop_no_filters_always_retry(k in kind()) {
        prop_assert!(should_retry(k, &HashSet::new(), &HashSet::new()));
    }

    #[test]
    fn prop_include_only_matches_lineage(k in kind(), include in kinds()) {
        prop_assume!(!include.is_empty());
        let expected = include.iter().any(|i| k.is_a(*i));
        prop_assert_eq!(should_retry(k, &include, &HashSet::new()), expected);
    }

    #[test]
    fn prop_exclude_only_matches_lineage(k in kind(), exclude in kinds()) {
        prop_assume!(!exclude.is_empty());
        let expected = !exclude.iter().any(|e| k.is_a(*e));
        prop_assert_eq!(should_retry(k, &HashSet::new(), &exclude), expected);
    }

    #[test]
    fn prop_nearest_match_wins(k in kind(), include in kinds(), exclude in kinds()) {
        let exclude: HashSet<Kind> = exclude.difference(&include).copied().collect();
        prop_assume!(!include.is_empty() && !exclude.is_empty());

        let expected = match (depth_of_match(k, &include), depth_of_match(k, &exclude)) {
            (Some(i), Some(e)) => i < e,
            (Some(_), None) => true,
            (None, _) => false,
        };
        prop_assert_eq!(should_retry(k, &include, &exclude), expected);
    }

    #[test]
    fn prop_overlap_never_builds(include in kinds(), exclude in kinds()) {
        let overlap: HashSet<Kind> = include.intersection(&exclude).copied().collect();
        let result = RetryPolicy::builder()
            .include(include.iter().copied())
            .exclude(exclude.iter().copied())
            .build();

        if overlap.is_empty() {
            prop_assert!(result.is_ok());
        } else {
            match result {
                Err(ConfigurationError::Conflict { kinds }) => {
                    let reported: HashSet<Kind> = kinds.into_iter().collect();
                    prop_assert_eq!(reported, overlap);
                }
                other => prop_assert!(false, "expected a conflict, got {:?}", other),
            }
        }
    }

    #[test]
    fn prop_attempts_never_exceed_budget(max_attempts in 1u32..8, failures in 0u32..12) {
        let executor = Executor::new(
            RetryPolicy::<Kind>::builder().with_max_attempts(max_attempts).build().unwrap(),
        );
        let flaky = Flaky::new(failures, Kind::B11);
        let result = executor.call(|| flaky.attempt());

        prop_assert!(flaky.calls() <= max_attempts);
        if failures < max_attempts {
            prop_assert_eq!(result, Ok(Some(failures + 1)));
        } else {
            prop_assert_eq!(result, Err(RetryError::Propagated(Kind::B11)));
            prop_assert_eq!(flaky.calls(), max_attempts);
        }
    }

    #[test]
    fn prop_rejecting_everything_returns_last_value(max_attempts in 1u32..8) {
        let executor = Executor::new(
            RetryPolicy::<Kind>::builder().with_max_attempts(max_attempts).build().unwrap(),
        );
        let flaky = Flaky::new(0, Kind::Root);
        let result = executor.call_until(|| flaky.attempt(), |_| false);

        prop_assert_eq!(result, Ok(Some(max_attempts)));
    }
}
