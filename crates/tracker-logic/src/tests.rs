// crates/tracker-logic/src/tests.rs
// ============================================================================
// Module: Tracker Logic Test Lint Configuration
// Description: Shared test-only lint relaxations for tracker-logic unit tests.
// Purpose: Allow panic-based assertions and debug output in tests.
// Dependencies: tracker-logic
// ============================================================================

//! ## Overview
//! Provides test-only lint relaxations and a handful of unit tests for
//! crate-private helpers that integration tests cannot reach.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

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

use crate::tokenizer::Token;
use crate::tokenizer::tokenize_range;

// ============================================================================
// SECTION: Range Tokenization
// ============================================================================

/// Tokens inside a sub-range keep offsets into the full string.
#[test]
fn tokenize_range_reports_absolute_offsets() {
    let rule = "(|A| or |B|)";
    let tokens = tokenize_range(rule, 1, rule.len() - 1).unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0].token, Token::Literal("A"));
    assert_eq!(tokens[0].position, 1);
    assert_eq!(tokens[1].token, Token::Or);
    assert_eq!(tokens[1].position, 5);
    assert_eq!(tokens[2].position, 8);
}
