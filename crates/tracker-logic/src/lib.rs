// crates/tracker-logic/src/lib.rs
// ============================================================================
// Module: Tracker Logic Root
// Description: Public API surface for the requirement compiler.
// Purpose: Wire together compiler stages, re-exports, and convenience entry points.
// Dependencies: crate::{dnf, emit, error, expr, limits, locations, parser, reduce, regions, sink,
//              tokenizer}
// ============================================================================

//! ## Overview
//! Compiles author-facing requirement strings into tracker access rules:
//! tokenize, parse, normalize to strict DNF, drop subsumed clauses, and emit
//! one rule string per clause. Region reachability folds per-region
//! requirements along every path into a single access expression, and the
//! world compiler runs the whole pipeline over regions and locations.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod dnf;
pub mod emit;
pub mod error;
pub mod expr;
pub mod limits;
pub mod locations;
pub mod parser;
pub mod reduce;
pub mod regions;
pub mod sink;
pub mod tokenizer;

#[cfg(test)]
mod tests;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use dnf::is_dnf;
pub use dnf::normalize;
pub use emit::BUILT_IN_FUNCTIONS;
pub use emit::CustomHooks;
pub use emit::EmittedRules;
pub use emit::RuleEmitter;
pub use emit::to_snake_case;
pub use error::LogicError;
pub use error::LogicResult;
pub use expr::Expr;
pub use expr::PrimitiveKind;
pub use limits::CompileLimits;
pub use locations::CategoryOptions;
pub use locations::CompiledLocation;
pub use locations::CompiledRegion;
pub use locations::CompiledWorld;
pub use locations::Location;
pub use locations::WorldCompiler;
pub use parser::parse_requirement;
pub use reduce::GroupMembership;
pub use reduce::reduce;
pub use regions::Region;
pub use regions::RegionAnalysis;
pub use regions::RegionGraph;
pub use regions::START_REGION;
pub use sink::CompileEvent;
pub use sink::CompileSink;
pub use sink::HookEvent;
pub use sink::NoopCompileSink;
pub use tokenizer::SpannedToken;
pub use tokenizer::Token;
pub use tokenizer::tokenize;

// ============================================================================
// SECTION: Convenience Pipeline
// ============================================================================

/// Single-call entry points for compiling one requirement string.
pub mod convenience {
    use super::CompileLimits;
    use super::EmittedRules;
    use super::Expr;
    use super::GroupMembership;
    use super::LogicResult;
    use super::RuleEmitter;
    use super::normalize;
    use super::parse_requirement;
    use super::reduce;

    /// Parses, normalizes, and reduces a requirement string.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage.
    pub fn compile_requirement<G>(
        rule: &str,
        groups: &G,
        limits: &CompileLimits,
    ) -> LogicResult<Expr>
    where
        G: GroupMembership + ?Sized,
    {
        let parsed = parse_requirement(rule, limits)?;
        let normalized = normalize(&parsed, limits)?;
        reduce(&normalized, groups)
    }

    /// Compiles a requirement string all the way to rule strings.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage.
    pub fn compile_rules<G>(
        rule: &str,
        groups: &G,
        limits: &CompileLimits,
    ) -> LogicResult<EmittedRules>
    where
        G: GroupMembership + ?Sized,
    {
        RuleEmitter::new().emit(&compile_requirement(rule, groups, limits)?)
    }
}
