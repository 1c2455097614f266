// crates/tracker-logic/src/expr.rs
// ============================================================================
// Module: Expression Tree
// Description: Closed AND/OR/Primitive tree and its strict-DNF predicate.
// Purpose: Shared representation flowing from parser to emitter.
// Dependencies: serde, smallvec
// ============================================================================

//! ## Overview
//! [`Expr`] is the only tree shape in the compiler. Parsers build arbitrary
//! AND/OR nestings; the normalizer rewrites them into strict DNF, which the
//! reducer and emitter require. Primitive values stay opaque strings at the
//! tree level and are interpreted through [`PrimitiveKind`] downstream.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;

use crate::error::LogicError;
use crate::error::LogicResult;
use crate::tokenizer::ITEM_VALUE_FUNCTION;
use crate::tokenizer::YAML_COMPARE_FUNCTION;

// ============================================================================
// SECTION: Primitive Prefixes
// ============================================================================

/// Prefix marking a `@group:count` primitive.
pub const GROUP_COUNT_PREFIX: char = '@';
/// Prefix marking a `$name|arg|...` function primitive.
pub const FUNCTION_PREFIX: char = '$';
/// Separator between function name and arguments.
pub const FUNCTION_ARG_SEPARATOR: char = '|';

// ============================================================================
// SECTION: Expression
// ============================================================================

/// Requirement expression tree.
///
/// Empty `And` is trivially satisfied; empty `Or` is never satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    /// All children must hold.
    And(SmallVec<[Box<Self>; 4]>),
    /// At least one child must hold.
    Or(SmallVec<[Box<Self>; 4]>),
    /// Atomic requirement value (literal, group count, or function call).
    Primitive(String),
}

impl Expr {
    /// Creates a conjunction of the given children.
    #[must_use]
    pub fn and(children: Vec<Self>) -> Self {
        Self::And(children.into_iter().map(Box::new).collect())
    }

    /// Creates a disjunction of the given children.
    #[must_use]
    pub fn or(children: Vec<Self>) -> Self {
        Self::Or(children.into_iter().map(Box::new).collect())
    }

    /// Creates a primitive leaf.
    pub fn primitive(value: impl Into<String>) -> Self {
        Self::Primitive(value.into())
    }

    /// Strict-DNF tree that is always satisfied: `Or[And[]]`.
    #[must_use]
    pub fn always() -> Self {
        Self::or(vec![Self::and(Vec::new())])
    }

    /// Strict-DNF tree that is never satisfied: `Or[]`.
    #[must_use]
    pub fn never() -> Self {
        Self::or(Vec::new())
    }

    /// Builds a strict-DNF tree from clause lists.
    pub fn from_clauses<I, C, S>(clauses: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Or(
            clauses
                .into_iter()
                .map(|clause| {
                    Box::new(Self::And(
                        clause.into_iter().map(|value| Box::new(Self::primitive(value))).collect(),
                    ))
                })
                .collect(),
        )
    }

    /// Returns true when the tree is in strict DNF: an `Or` of `And`s of
    /// primitives, with no other nesting.
    #[must_use]
    pub fn is_dnf(&self) -> bool {
        let Self::Or(clauses) = self else {
            return false;
        };
        clauses.iter().all(|clause| match clause.as_ref() {
            Self::And(literals) => {
                literals.iter().all(|literal| matches!(literal.as_ref(), Self::Primitive(_)))
            }
            Self::Or(_) | Self::Primitive(_) => false,
        })
    }

    /// Returns the primitive values of each clause of a strict-DNF tree.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::NotDnf`] naming `operation` when the tree is not
    /// in strict DNF.
    pub fn dnf_clauses(&self, operation: &'static str) -> LogicResult<Vec<Vec<&str>>> {
        let not_dnf = || LogicError::NotDnf {
            operation,
        };
        let Self::Or(clauses) = self else {
            return Err(not_dnf());
        };
        let mut out = Vec::with_capacity(clauses.len());
        for clause in clauses {
            let Self::And(literals) = clause.as_ref() else {
                return Err(not_dnf());
            };
            let mut values = Vec::with_capacity(literals.len());
            for literal in literals {
                match literal.as_ref() {
                    Self::Primitive(value) => values.push(value.as_str()),
                    Self::And(_) | Self::Or(_) => return Err(not_dnf()),
                }
            }
            out.push(values);
        }
        Ok(out)
    }
}

/// Renders the tree in requirement syntax.
///
/// Function primitives render as `{Name(args)}` calls, so any tree the parser
/// produced parses back to the same tree. Two shapes do not round-trip: empty
/// `And`/`Or` nodes render as `()`, and call arguments containing the
/// argument delimiter of their function split differently on the way back.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (keyword, children) = match self {
            Self::Primitive(value) => return write_primitive(f, value),
            Self::And(children) => (" and ", children),
            Self::Or(children) => (" or ", children),
        };
        f.write_str("(")?;
        for (index, child) in children.iter().enumerate() {
            if index > 0 {
                f.write_str(keyword)?;
            }
            write!(f, "{child}")?;
        }
        f.write_str(")")
    }
}

/// Writes one primitive as a pipe literal or a brace call.
fn write_primitive(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    let Some(call) = value.strip_prefix(FUNCTION_PREFIX) else {
        return write!(f, "|{value}|");
    };
    let mut parts = call.split(FUNCTION_ARG_SEPARATOR);
    let name = parts.next().unwrap_or(call);
    let args: Vec<&str> = parts.collect();
    if args.is_empty() {
        return write!(f, "{{{name}}}");
    }
    let delimiter = match name {
        ITEM_VALUE_FUNCTION => ":",
        YAML_COMPARE_FUNCTION => " ",
        _ => ", ",
    };
    write!(f, "{{{name}({})}}", args.join(delimiter))
}

// ============================================================================
// SECTION: Primitive Interpretation
// ============================================================================

/// Structural view of a primitive value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind<'a> {
    /// Item or requirement identifier.
    Literal(&'a str),
    /// Own at least `count` distinct items from `group`.
    GroupCount {
        /// Item group name.
        group: &'a str,
        /// Minimum distinct members required.
        count: u32,
    },
    /// Call to a named predicate.
    Function {
        /// Function name.
        name: &'a str,
        /// Number of pipe-delimited arguments.
        arity: usize,
    },
}

impl<'a> PrimitiveKind<'a> {
    /// Classifies a primitive value by its prefix.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::InvalidGroupCount`] when a `@` primitive lacks a
    /// `:` separator or its count is not an unsigned integer.
    pub fn classify(value: &'a str) -> LogicResult<Self> {
        if let Some(rest) = value.strip_prefix(GROUP_COUNT_PREFIX) {
            let invalid = || LogicError::InvalidGroupCount {
                primitive: value.to_string(),
            };
            let (group, count) = rest.split_once(':').ok_or_else(invalid)?;
            let count = count.trim().parse::<u32>().map_err(|_| invalid())?;
            return Ok(Self::GroupCount {
                group,
                count,
            });
        }
        if let Some(rest) = value.strip_prefix(FUNCTION_PREFIX) {
            let name = rest.split(FUNCTION_ARG_SEPARATOR).next().unwrap_or(rest);
            return Ok(Self::Function {
                name,
                arity: rest.matches(FUNCTION_ARG_SEPARATOR).count(),
            });
        }
        Ok(Self::Literal(value))
    }
}

/// Formats a group-count primitive value.
#[must_use]
pub fn group_count_primitive(group: &str, count: u32) -> String {
    format!("{GROUP_COUNT_PREFIX}{group}:{count}")
}
