// crates/tracker-logic/tests/emit.rs
// ============================================================================
// Test Module: Rule Emitter
// Coverage: Rule strings, item codes, group helper calls, and hook detection.
// ============================================================================
//! ## Overview
//! Integration tests for serializing reduced DNF trees into rule strings.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use std::collections::BTreeMap;

use support::TestResult;
use support::ensure;
use tracker_logic::BUILT_IN_FUNCTIONS;
use tracker_logic::CompileLimits;
use tracker_logic::CustomHooks;
use tracker_logic::Expr;
use tracker_logic::LogicError;
use tracker_logic::RuleEmitter;
use tracker_logic::convenience::compile_rules;
use tracker_logic::to_snake_case;

// ============================================================================
// SECTION: Rule Strings
// ============================================================================

/// Tests one rule per clause with primitives joined by commas.
#[test]
fn emits_one_rule_per_clause() -> TestResult {
    let dnf = Expr::from_clauses([vec!["Hookshot", "Iron Boots"], vec!["Bombs"]]);
    let emitted = RuleEmitter::new().emit(&dnf)?;
    ensure(
        emitted.rules == vec!["hookshot, iron_boots".to_string(), "bombs".to_string()],
        format!("unexpected rules {:?}", emitted.rules),
    )?;
    ensure(emitted.hooks.is_empty(), "no hooks expected")
}

/// Tests the always-true clause emits an empty rule.
#[test]
fn always_true_emits_empty_rule() -> TestResult {
    let emitted = RuleEmitter::new().emit(&Expr::always())?;
    ensure(emitted.rules == vec![String::new()], format!("unexpected {:?}", emitted.rules))?;
    let never = RuleEmitter::new().emit(&Expr::never())?;
    ensure(never.rules.is_empty(), "never-true tree emits no rules")
}

/// Tests group counts call the runtime helper.
#[test]
fn group_count_emits_helper_call() -> TestResult {
    let dnf = Expr::from_clauses([vec!["@Keys:2", "Lamp"]]);
    let emitted = RuleEmitter::new().emit(&dnf)?;
    ensure(
        emitted.rules == vec!["$has_count_from_group|Keys|2, lamp".to_string()],
        format!("unexpected rules {:?}", emitted.rules),
    )?;
    ensure(emitted.hooks.is_empty(), "helper is not a custom hook")
}

/// Tests group counts tolerate whitespace around the count.
#[test]
fn group_count_trims_count() -> TestResult {
    let groups = BTreeMap::from([(
        "Keys".to_string(),
        vec!["Small Key".to_string(), "Big Key".to_string()],
    )]);
    let emitted = compile_rules("|@Keys: 2 | and |Lamp|", &groups, &CompileLimits::default())?;
    ensure(
        emitted.rules == vec!["$has_count_from_group|Keys|2, lamp".to_string()],
        format!("unexpected rules {:?}", emitted.rules),
    )
}

/// Tests non-DNF trees are rejected.
#[test]
fn non_dnf_is_rejected() -> TestResult {
    let result = RuleEmitter::new().emit(&Expr::and(vec![Expr::primitive("A")]));
    ensure(
        matches!(
            result,
            Err(LogicError::NotDnf {
                operation: "emit"
            })
        ),
        format!("expected not-dnf error, got {result:?}"),
    )
}

// ============================================================================
// SECTION: Functions and Hooks
// ============================================================================

/// Tests built-in functions pass through without being reported.
#[test]
fn built_in_functions_are_not_hooks() -> TestResult {
    let emitter = RuleEmitter::new();
    for name in BUILT_IN_FUNCTIONS {
        ensure(emitter.is_built_in(name), format!("{name} should be built in"))?;
    }
    let dnf = Expr::from_clauses([vec!["$ItemValue|damage|5", "$OptOne|Goal"]]);
    let emitted = emitter.emit(&dnf)?;
    ensure(
        emitted.rules == vec!["$ItemValue|damage|5, $OptOne|Goal".to_string()],
        format!("unexpected rules {:?}", emitted.rules),
    )?;
    ensure(emitted.hooks.is_empty(), format!("unexpected hooks {:?}", emitted.hooks))
}

/// Tests custom functions are collected with their arity.
#[test]
fn custom_functions_are_collected() -> TestResult {
    let dnf = Expr::from_clauses([vec!["$canFly"], vec!["$canReach|Ledge|High", "Rope"]]);
    let emitted = RuleEmitter::new().emit(&dnf)?;
    let expected = BTreeMap::from([("canFly".to_string(), 0), ("canReach".to_string(), 2)]);
    ensure(emitted.hooks == expected, format!("unexpected hooks {:?}", emitted.hooks))?;
    ensure(
        emitted.rules == vec!["$canFly".to_string(), "$canReach|Ledge|High, rope".to_string()],
        format!("unexpected rules {:?}", emitted.rules),
    )
}

/// Tests hooks already recorded keep their first arity.
#[test]
fn first_seen_arity_wins() -> TestResult {
    let emitter = RuleEmitter::new();
    let mut hooks = CustomHooks::new();
    emitter.emit_into(&Expr::from_clauses([vec!["$canReach|Ledge"]]), &mut hooks)?;
    emitter.emit_into(&Expr::from_clauses([vec!["$canReach|Ledge|High"]]), &mut hooks)?;
    ensure(hooks.get("canReach") == Some(&1), format!("unexpected hooks {hooks:?}"))
}

/// Tests the full pipeline from a requirement string.
#[test]
fn compile_rules_runs_every_stage() -> TestResult {
    let groups = BTreeMap::from([(
        "Keys".to_string(),
        vec!["Small Key".to_string(), "Big Key".to_string()],
    )]);
    let emitted = compile_rules(
        "|Lamp| and (|@Keys:1| or |Small Key|) and {canFly}",
        &groups,
        &CompileLimits::default(),
    )?;
    ensure(
        emitted.rules == vec!["$canFly, $has_count_from_group|Keys|1, lamp".to_string()],
        format!("unexpected rules {:?}", emitted.rules),
    )?;
    ensure(emitted.hooks.contains_key("canFly"), "canFly should be a hook")
}

// ============================================================================
// SECTION: Item Codes
// ============================================================================

/// Tests item names become runtime item codes.
#[test]
fn snake_case_item_codes() -> TestResult {
    ensure(to_snake_case("Iron Boots") == "iron_boots", "spaces")?;
    ensure(to_snake_case("Link's \"Bow\"") == "links_bow", "quotes")?;
    ensure(to_snake_case("Fire/Ice\\Rod") == "fire_ice_rod", "slashes")?;
    ensure(to_snake_case("already_snake") == "already_snake", "unchanged")
}
