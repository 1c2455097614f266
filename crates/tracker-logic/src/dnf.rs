// crates/tracker-logic/src/dnf.rs
// ============================================================================
// Module: DNF Normalizer
// Description: Rewrites arbitrary AND/OR trees into strict disjunctive normal form.
// Purpose: Give the reducer and emitter a single flat OR-of-ANDs shape.
// Dependencies: crate::{error, expr, limits}
// ============================================================================

//! ## Overview
//! Normalization works bottom-up on clause lists. A primitive is one clause
//! with one literal, an `Or` concatenates its children's clauses, and an `And`
//! distributes over its children by taking the cartesian product of their
//! clause lists. Nested `And`s flatten for free, since a single-clause child
//! only extends every clause.
//!
//! Clause order follows distribution order, so `A and (B or C)` becomes
//! `Or[And[A, B], And[A, C]]`. Primitives are opaque: no literal is merged or
//! dropped here; that is the reducer's job.
//!
//! Expansion is exponential in the number of `Or`s nested under `And`s; the
//! clause count and tree depth are capped by [`CompileLimits`].

use crate::error::LogicError;
use crate::error::LogicResult;
use crate::expr::Expr;
use crate::limits::CompileLimits;

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Returns true when `expr` is in strict DNF.
#[must_use]
pub fn is_dnf(expr: &Expr) -> bool {
    expr.is_dnf()
}

/// Converts `expr` into an equivalent strict-DNF tree.
///
/// Trees already in strict DNF are returned unchanged, which makes the
/// operation idempotent.
///
/// # Errors
///
/// Returns [`LogicError::NestingTooDeep`] when the tree is deeper than
/// [`CompileLimits::max_tree_depth`] and [`LogicError::ClauseLimitExceeded`]
/// when expansion would exceed [`CompileLimits::max_clauses`].
pub fn normalize(expr: &Expr, limits: &CompileLimits) -> LogicResult<Expr> {
    if expr.is_dnf() {
        return Ok(expr.clone());
    }
    let clauses = Normalizer {
        limits,
    }
    .clauses(expr, 0)?;
    Ok(Expr::from_clauses(clauses))
}

// ============================================================================
// SECTION: Normalizer
// ============================================================================

/// Conjunction of borrowed primitive values.
type Clause<'e> = Vec<&'e str>;

/// Bottom-up clause expander.
struct Normalizer<'l> {
    /// Resource limits.
    limits: &'l CompileLimits,
}

impl Normalizer<'_> {
    /// Expands `expr` into its DNF clause list.
    fn clauses<'e>(&self, expr: &'e Expr, depth: usize) -> LogicResult<Vec<Clause<'e>>> {
        if depth > self.limits.max_tree_depth {
            return Err(LogicError::NestingTooDeep {
                max_depth: self.limits.max_tree_depth,
                actual_depth: depth,
            });
        }
        match expr {
            Expr::Primitive(value) => Ok(vec![vec![value.as_str()]]),
            Expr::Or(children) => {
                let mut clauses = Vec::new();
                for child in children {
                    clauses.extend(self.clauses(child, depth + 1)?);
                    self.check_count(clauses.len())?;
                }
                Ok(clauses)
            }
            Expr::And(children) => {
                let mut clauses = vec![Clause::new()];
                for child in children {
                    let alternatives = self.clauses(child, depth + 1)?;
                    clauses = self.distribute(&clauses, &alternatives)?;
                }
                Ok(clauses)
            }
        }
    }

    /// Distributes every clause in `left` over every clause in `right`.
    fn distribute<'e>(
        &self,
        left: &[Clause<'e>],
        right: &[Clause<'e>],
    ) -> LogicResult<Vec<Clause<'e>>> {
        let count = left.len().checked_mul(right.len()).ok_or(LogicError::ClauseLimitExceeded {
            max_clauses: self.limits.max_clauses,
        })?;
        self.check_count(count)?;
        let mut product = Vec::with_capacity(count);
        for prefix in left {
            for suffix in right {
                let mut clause = Vec::with_capacity(prefix.len() + suffix.len());
                clause.extend_from_slice(prefix);
                clause.extend_from_slice(suffix);
                product.push(clause);
            }
        }
        Ok(product)
    }

    /// Fails when `count` exceeds the clause limit.
    fn check_count(&self, count: usize) -> LogicResult<()> {
        if count > self.limits.max_clauses {
            return Err(LogicError::ClauseLimitExceeded {
                max_clauses: self.limits.max_clauses,
            });
        }
        Ok(())
    }
}
