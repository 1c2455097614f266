// crates/tracker-logic/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared result helpers for tracker-logic integration tests.
// ============================================================================
//! ## Overview
//! Result-based assertions shared by the compiler stage tests.

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

use std::error::Error;
use std::fmt;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across tracker-logic integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Assertion failure carrying a readable message.
#[derive(Debug)]
struct AssertionFailed {
    /// What went wrong.
    message: String,
}

impl fmt::Display for AssertionFailed {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for AssertionFailed {}

/// Returns an error when a test condition fails.
///
/// # Errors
/// Returns an assertion failure when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition {
        Ok(())
    } else {
        Err(Box::new(AssertionFailed {
            message: message.into(),
        }))
    }
}
