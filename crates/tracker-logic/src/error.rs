// crates/tracker-logic/src/error.rs
// ============================================================================
// Module: Logic Compiler Errors
// Description: Structured diagnostics for requirement compilation failures.
// Purpose: Give every fatal parse or precondition failure a precise location.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every failure in the compiler is fatal for the requirement string being
//! compiled. Variants carry the byte offset, offending text, or violated
//! precondition so authors can fix the source data directly.

use thiserror::Error;

// ============================================================================
// SECTION: Error Type
// ============================================================================

/// Errors produced while tokenizing, parsing, normalizing, reducing, or
/// emitting requirement logic.
///
/// # Invariants
/// - Byte offsets always refer to the top-level requirement string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogicError {
    // ========================================================================
    // SECTION: Input Errors
    // ========================================================================
    /// Input was empty or contained only whitespace.
    #[error("requirement is empty")]
    EmptyInput,

    /// Input exceeded the configured size limit.
    #[error("requirement exceeds size limit: {actual_bytes} bytes (max {max_bytes})")]
    InputTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual input length in bytes.
        actual_bytes: usize,
    },

    // ========================================================================
    // SECTION: Syntax Errors
    // ========================================================================
    /// A `(` had no matching `)`.
    #[error("mismatched parenthesis starting at index {position} for rule `{rule}`")]
    UnbalancedParenthesis {
        /// Byte offset of the opening parenthesis.
        position: usize,
        /// Requirement string being tokenized.
        rule: String,
    },

    /// A `|` literal was never closed.
    #[error("mismatched pipes starting at index {position} for rule `{rule}`")]
    UnterminatedPipe {
        /// Byte offset of the opening pipe.
        position: usize,
        /// Requirement string being tokenized.
        rule: String,
    },

    /// A `{` function call was never closed.
    #[error("mismatched braces starting at index {position} for rule `{rule}`")]
    UnterminatedBrace {
        /// Byte offset of the opening brace.
        position: usize,
        /// Requirement string being tokenized.
        rule: String,
    },

    /// Bare text that is neither `and` nor `or`.
    #[error("unrecognized logic syntax at index {position} of rule `{rule}`")]
    UnrecognizedSyntax {
        /// Byte offset of the unrecognized text.
        position: usize,
        /// Requirement string being tokenized.
        rule: String,
    },

    /// Function call with an opening `(` but no closing `)`.
    #[error("malformed function call `{token}` at index {position}")]
    MalformedFunction {
        /// Raw function token without braces.
        token: String,
        /// Byte offset of the opening brace.
        position: usize,
    },

    /// A built-in function was given the wrong number of parameters.
    #[error("{function} takes exactly {expected} parameters, found {found}: `{params}`")]
    FunctionArity {
        /// Function name.
        function: String,
        /// Required parameter count.
        expected: usize,
        /// Parameters actually supplied.
        found: usize,
        /// Raw parameter text.
        params: String,
    },

    /// Two operands appeared next to each other with no operator.
    #[error("found two operands with no operator at index {position}")]
    MissingOperator {
        /// Byte offset of the second operand.
        position: usize,
    },

    /// An operator had nothing on one of its sides.
    #[error("operator `{operator}` is missing an operand near index {position}")]
    EmptyOperand {
        /// Operator keyword.
        operator: &'static str,
        /// Byte offset of the operator next to the empty operand.
        position: usize,
    },

    /// A `( )` group with nothing inside.
    #[error("empty group at index {position}")]
    EmptyGroup {
        /// Byte offset of the opening parenthesis.
        position: usize,
    },

    // ========================================================================
    // SECTION: Resource Limits
    // ========================================================================
    /// Parenthesized groups or tree levels nested beyond the configured limit.
    #[error("nesting exceeds limit: depth {actual_depth} (max {max_depth})")]
    NestingTooDeep {
        /// Maximum allowed depth.
        max_depth: usize,
        /// Depth reached when the limit tripped.
        actual_depth: usize,
    },

    /// DNF expansion produced more clauses than allowed.
    #[error("DNF expansion exceeds clause limit of {max_clauses}")]
    ClauseLimitExceeded {
        /// Maximum allowed clause count.
        max_clauses: usize,
    },

    /// Region path enumeration produced more paths than allowed.
    #[error("path enumeration to region `{region}` exceeds limit of {max_paths}")]
    PathLimitExceeded {
        /// Target region.
        region: String,
        /// Maximum allowed path count.
        max_paths: usize,
    },

    /// Region path enumeration visited more regions than allowed.
    #[error("path search to region `{region}` exceeds step limit of {max_steps}")]
    PathSearchExceeded {
        /// Target region.
        region: String,
        /// Maximum allowed region visits.
        max_steps: usize,
    },

    // ========================================================================
    // SECTION: Precondition Errors
    // ========================================================================
    /// A DNF-only operation received a tree that is not in strict DNF.
    #[error("{operation} works with logic in strict DNF form only")]
    NotDnf {
        /// Operation that rejected the tree.
        operation: &'static str,
    },

    /// A `@group:count` primitive had a non-numeric count.
    #[error("invalid group count primitive `{primitive}`")]
    InvalidGroupCount {
        /// Offending primitive value.
        primitive: String,
    },

    /// A group-count primitive referenced a group absent from the membership map.
    #[error("unknown item group `{group}`")]
    UnknownGroup {
        /// Group name.
        group: String,
    },

    // ========================================================================
    // SECTION: Region Errors
    // ========================================================================
    /// A region id was referenced but never declared.
    #[error("unknown region `{region}`")]
    UnknownRegion {
        /// Region id.
        region: String,
    },

    /// A declared region used the reserved start id.
    #[error("region id `{region}` is reserved")]
    ReservedRegion {
        /// Region id.
        region: String,
    },

    /// A region's requirement string failed to compile.
    #[error("requirement for region `{region}` is invalid: {source}")]
    RegionRequirement {
        /// Region id.
        region: String,
        /// Underlying failure.
        #[source]
        source: Box<LogicError>,
    },

    /// A location's requirement string failed to compile.
    #[error("requirement for location `{location}` is invalid: {source}")]
    LocationRequirement {
        /// Location name.
        location: String,
        /// Underlying failure.
        #[source]
        source: Box<LogicError>,
    },
}

impl LogicError {
    /// Wraps an error with the region whose requirement produced it.
    pub fn in_region(region: impl Into<String>, source: Self) -> Self {
        Self::RegionRequirement {
            region: region.into(),
            source: Box::new(source),
        }
    }

    /// Wraps an error with the location whose requirement produced it.
    pub fn in_location(location: impl Into<String>, source: Self) -> Self {
        Self::LocationRequirement {
            location: location.into(),
            source: Box::new(source),
        }
    }
}

// ============================================================================
// SECTION: Result Alias
// ============================================================================

/// Convenient Result type for logic compilation.
pub type LogicResult<T> = Result<T, LogicError>;
