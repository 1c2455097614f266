// crates/tracker-logic/src/limits.rs
// ============================================================================
// Module: Compile Limits
// Description: Hard bounds for parsing, normalization, and path enumeration.
// Purpose: Fail with a descriptive error instead of exhausting stack or memory.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! DNF expansion and simple-path enumeration are exponential in the worst
//! case. [`CompileLimits`] caps every recursive or combinatorial stage so
//! hostile or accidental inputs stop early with a [`LogicError`].
//!
//! [`LogicError`]: crate::LogicError

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default maximum requirement string size in bytes.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 64 * 1024;
/// Default maximum parenthesis nesting in a requirement string.
pub const DEFAULT_MAX_NESTING: usize = 32;
/// Default maximum expression tree depth accepted by the normalizer.
pub const DEFAULT_MAX_TREE_DEPTH: usize = 128;
/// Default maximum clause count produced by DNF expansion.
pub const DEFAULT_MAX_CLAUSES: usize = 4096;
/// Default maximum number of simple paths enumerated per region.
pub const DEFAULT_MAX_PATHS: usize = 4096;
/// Default maximum region visits spent searching for paths to one region.
pub const DEFAULT_MAX_PATH_STEPS: usize = 1 << 20;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Resource bounds applied by every compilation stage.
///
/// # Invariants
/// - No invariants are enforced here; the config crate validates ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileLimits {
    /// Maximum requirement string size in bytes.
    pub max_input_bytes: usize,
    /// Maximum parenthesis nesting depth.
    pub max_nesting: usize,
    /// Maximum expression tree depth.
    pub max_tree_depth: usize,
    /// Maximum DNF clause count.
    pub max_clauses: usize,
    /// Maximum simple paths per target region.
    pub max_paths: usize,
    /// Maximum region visits during path enumeration for one target.
    pub max_path_steps: usize,
}

impl Default for CompileLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_nesting: DEFAULT_MAX_NESTING,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
            max_clauses: DEFAULT_MAX_CLAUSES,
            max_paths: DEFAULT_MAX_PATHS,
            max_path_steps: DEFAULT_MAX_PATH_STEPS,
        }
    }
}
