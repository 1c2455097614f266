// crates/tracker-logic/src/emit.rs
// ============================================================================
// Module: Rule Emitter
// Description: Serializes reduced DNF trees into tracker access-rule strings.
// Purpose: Final stage of the requirement compiler.
// Dependencies: serde, crate::{error, expr}
// ============================================================================

//! ## Overview
//! Each AND-clause becomes one rule string whose primitives are joined by
//! `", "`. Plain literals become snake-case item codes, group counts become a
//! call to the runtime's group helper, and function primitives pass through
//! unchanged. Function names outside the built-in set are collected as custom
//! hooks so the caller can stub them out.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::LogicResult;
use crate::expr::Expr;
use crate::expr::FUNCTION_ARG_SEPARATOR;
use crate::expr::FUNCTION_PREFIX;
use crate::expr::PrimitiveKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Functions the runtime implements natively.
pub const BUILT_IN_FUNCTIONS: [&str; 6] =
    ["ItemValue", "OptOne", "OptAll", "YamlEnabled", "YamlDisabled", "YamlCompare"];

/// Runtime helper that checks a minimum count of items from a group.
pub const GROUP_COUNT_HELPER: &str = "has_count_from_group";

/// Separator between primitives inside one rule string.
pub const RULE_SEPARATOR: &str = ", ";

/// Operation name reported when emitting a non-DNF tree.
const EMIT_OPERATION: &str = "emit";

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// Custom hook function name to argument count.
pub type CustomHooks = BTreeMap<String, usize>;

/// Rule strings for one tree plus the custom hooks it references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmittedRules {
    /// One rule string per AND-clause, in clause order.
    pub rules: Vec<String>,
    /// Custom hooks first seen in this tree.
    pub hooks: CustomHooks,
}

// ============================================================================
// SECTION: Emitter
// ============================================================================

/// Serializes strict-DNF trees into rule strings.
#[derive(Debug, Clone)]
pub struct RuleEmitter {
    /// Function names that are never reported as hooks.
    built_ins: BTreeSet<&'static str>,
}

impl Default for RuleEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEmitter {
    /// Creates an emitter that knows [`BUILT_IN_FUNCTIONS`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            built_ins: BUILT_IN_FUNCTIONS.into_iter().collect(),
        }
    }

    /// Returns true when `name` is a built-in runtime function.
    #[must_use]
    pub fn is_built_in(&self, name: &str) -> bool {
        self.built_ins.contains(name)
    }

    /// Emits rule strings for `dnf` and the custom hooks it references.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::NotDnf`] for non-DNF input and
    /// [`LogicError::InvalidGroupCount`] for malformed `@` primitives.
    ///
    /// [`LogicError::NotDnf`]: crate::LogicError::NotDnf
    /// [`LogicError::InvalidGroupCount`]: crate::LogicError::InvalidGroupCount
    pub fn emit(&self, dnf: &Expr) -> LogicResult<EmittedRules> {
        let mut hooks = CustomHooks::new();
        let rules = self.emit_into(dnf, &mut hooks)?;
        Ok(EmittedRules {
            rules,
            hooks,
        })
    }

    /// Emits rule strings for `dnf`, recording custom hooks into `hooks`.
    ///
    /// Hooks already present in `hooks` keep their recorded arity.
    ///
    /// # Errors
    ///
    /// Same as [`RuleEmitter::emit`].
    pub fn emit_into(&self, dnf: &Expr, hooks: &mut CustomHooks) -> LogicResult<Vec<String>> {
        let clauses = dnf.dnf_clauses(EMIT_OPERATION)?;
        let mut rules = Vec::with_capacity(clauses.len());
        for clause in clauses {
            let mut parts = Vec::with_capacity(clause.len());
            for value in clause {
                parts.push(self.emit_primitive(value, hooks)?);
            }
            rules.push(parts.join(RULE_SEPARATOR));
        }
        Ok(rules)
    }

    /// Renders one primitive value.
    fn emit_primitive(&self, value: &str, hooks: &mut CustomHooks) -> LogicResult<String> {
        Ok(match PrimitiveKind::classify(value)? {
            PrimitiveKind::Literal(literal) => to_snake_case(literal),
            PrimitiveKind::GroupCount {
                group,
                count,
            } => {
                let sep = FUNCTION_ARG_SEPARATOR;
                format!("{FUNCTION_PREFIX}{GROUP_COUNT_HELPER}{sep}{group}{sep}{count}")
            }
            PrimitiveKind::Function {
                name,
                arity,
            } => {
                if !self.is_built_in(name) && !hooks.contains_key(name) {
                    hooks.insert(name.to_string(), arity);
                }
                value.to_string()
            }
        })
    }
}

// ============================================================================
// SECTION: Item Codes
// ============================================================================

/// Converts an item or requirement name into the runtime's item code.
///
/// Lowercases, drops quotes, and replaces spaces and slashes with `_`.
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    name.to_lowercase().replace(['\'', '"'], "").replace([' ', '\\', '/'], "_")
}
