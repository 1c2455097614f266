// crates/tracker-logic/tests/proptest_dnf.rs
// ============================================================================
// Module: DNF Property-Based Tests
// Description: Property tests for normalization and reduction invariants.
// Purpose: Check shape, idempotence, and truth-table equivalence on small trees.
// ============================================================================

//! Property-based tests for normalizer and reducer invariants.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use proptest::prelude::*;
use tracker_logic::CompileLimits;
use tracker_logic::Expr;
use tracker_logic::is_dnf;
use tracker_logic::normalize;
use tracker_logic::parse_requirement;
use tracker_logic::reduce;

/// Atom names used by generated trees.
const ATOMS: [&str; 4] = ["A", "B", "C", "D"];

/// Group-count atoms over [`GROUP`].
const GROUP_ATOMS: [&str; 4] = ["@G:0", "@G:1", "@G:2", "@G:3"];

/// Name of the single item group.
const GROUP: &str = "G";

/// Members of [`GROUP`].
const GROUP_MEMBERS: [&str; 3] = ["A", "B", "C"];

/// Generates small AND/OR trees over `atoms`, each node holding at least
/// `min_children` children.
fn tree_strategy(atoms: Vec<&'static str>, min_children: usize) -> impl Strategy<Value = Expr> {
    let leaf = prop::sample::select(atoms).prop_map(Expr::primitive);
    leaf.prop_recursive(4, 24, 3, move |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), min_children .. 4).prop_map(Expr::and),
            prop::collection::vec(inner, min_children .. 4).prop_map(Expr::or),
        ]
    })
}

/// Generates small AND/OR trees over [`ATOMS`].
fn expr_strategy() -> impl Strategy<Value = Expr> {
    tree_strategy(ATOMS.to_vec(), 0)
}

/// Plain atoms followed by group-count atoms.
fn grouped_atoms() -> Vec<&'static str> {
    ATOMS.iter().chain(GROUP_ATOMS.iter()).copied().collect()
}

/// Generates trees mixing plain atoms with group counts over [`GROUP`].
fn grouped_expr_strategy() -> impl Strategy<Value = Expr> {
    tree_strategy(grouped_atoms(), 0)
}

/// Generates grouped trees whose AND/OR nodes all have children, the shapes
/// that render to parseable requirement text.
fn non_empty_expr_strategy() -> impl Strategy<Value = Expr> {
    tree_strategy(grouped_atoms(), 1)
}

/// Item groups known to the reducer in grouped properties.
fn group_map() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([(
        GROUP.to_string(),
        GROUP_MEMBERS.iter().map(|member| (*member).to_string()).collect(),
    )])
}

/// Limits roomy enough for any generated tree.
fn limits() -> CompileLimits {
    CompileLimits {
        max_clauses: 1 << 16,
        ..CompileLimits::default()
    }
}

/// Evaluates `expr` with exactly the atoms in `truth` set.
///
/// A `@G:n` atom holds when at least `n` members of [`GROUP`] are set.
fn eval(expr: &Expr, truth: &BTreeSet<&str>) -> bool {
    match expr {
        Expr::Primitive(value) => match value.strip_prefix("@G:") {
            Some(count) => {
                let owned = GROUP_MEMBERS.iter().filter(|member| truth.contains(*member)).count();
                count.parse::<usize>().is_ok_and(|count| owned >= count)
            }
            None => truth.contains(value.as_str()),
        },
        Expr::And(children) => children.iter().all(|child| eval(child, truth)),
        Expr::Or(children) => children.iter().any(|child| eval(child, truth)),
    }
}

/// Every assignment of [`ATOMS`].
fn assignments() -> Vec<BTreeSet<&'static str>> {
    (0u8 .. 16)
        .map(|mask| {
            ATOMS
                .iter()
                .enumerate()
                .filter(|(index, _)| mask & (1 << index) != 0)
                .map(|(_, atom)| *atom)
                .collect()
        })
        .collect()
}

/// Canonical literal sets of a strict-DNF tree.
///
/// Repeated counts of [`GROUP`] in one clause keep only the largest, matching
/// how the reducer collapses them.
fn clause_sets(dnf: &Expr) -> Vec<BTreeSet<String>> {
    dnf.dnf_clauses("test")
        .unwrap_or_default()
        .into_iter()
        .map(|clause| {
            let largest = clause.iter().filter(|value| value.starts_with("@G:")).max().copied();
            clause
                .into_iter()
                .filter(|value| !value.starts_with("@G:") || Some(*value) == largest)
                .map(str::to_string)
                .collect()
        })
        .collect()
}

proptest! {
    #[test]
    fn normalize_produces_strict_dnf(expr in expr_strategy()) {
        let normalized = normalize(&expr, &limits()).unwrap();
        prop_assert!(is_dnf(&normalized));
    }

    #[test]
    fn normalize_is_idempotent(expr in expr_strategy()) {
        let limits = limits();
        let once = normalize(&expr, &limits).unwrap();
        let twice = normalize(&once, &limits).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalize_preserves_truth_table(expr in expr_strategy()) {
        let normalized = normalize(&expr, &limits()).unwrap();
        for truth in assignments() {
            prop_assert_eq!(eval(&expr, &truth), eval(&normalized, &truth));
        }
    }

    #[test]
    fn reduce_never_grows_and_never_invents(expr in expr_strategy()) {
        let groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let normalized = normalize(&expr, &limits()).unwrap();
        let reduced = reduce(&normalized, &groups).unwrap();
        let before = clause_sets(&normalized);
        let after = clause_sets(&reduced);
        prop_assert!(after.len() <= before.len());
        for clause in &after {
            prop_assert!(before.contains(clause));
        }
        for truth in assignments() {
            prop_assert_eq!(eval(&normalized, &truth), eval(&reduced, &truth));
        }
    }

    #[test]
    fn reduce_with_group_counts_stays_equivalent(expr in grouped_expr_strategy()) {
        let groups = group_map();
        let normalized = normalize(&expr, &limits()).unwrap();
        let reduced = reduce(&normalized, &groups).unwrap();
        let before = clause_sets(&normalized);
        let after = clause_sets(&reduced);
        prop_assert!(after.len() <= before.len());
        for clause in &after {
            prop_assert!(before.contains(clause));
        }
        for truth in assignments() {
            prop_assert_eq!(eval(&normalized, &truth), eval(&reduced, &truth));
        }
    }

    #[test]
    fn rendered_trees_parse_back_equivalently(expr in non_empty_expr_strategy()) {
        let rendered = expr.to_string();
        let parsed = parse_requirement(&rendered, &CompileLimits::default());
        prop_assert!(parsed.is_ok(), "{} failed to parse: {:?}", rendered, parsed);
        let parsed = parsed.unwrap();
        for truth in assignments() {
            prop_assert_eq!(eval(&expr, &truth), eval(&parsed, &truth));
        }
    }
}
