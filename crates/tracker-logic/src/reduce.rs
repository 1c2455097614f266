// crates/tracker-logic/src/reduce.rs
// ============================================================================
// Module: Clause Reducer
// Description: Removes DNF clauses subsumed by a more general clause.
// Purpose: Keep only the weakest surviving alternatives of a requirement.
// Dependencies: crate::{error, expr}
// ============================================================================

//! ## Overview
//! In an OR of AND-clauses, a clause that implies another clause adds
//! nothing. The reducer drops such clauses using two kinds of reasoning:
//!
//! - plain literals: `{A}` generalizes `{A, B}`;
//! - group counts: `{@Keys:2}` generalizes any clause that itself asks for at
//!   least two keys, either through its own `@Keys:n` with `n >= 2` or by
//!   naming two distinct members of `Keys` as plain literals.
//!
//! Function primitives take part as plain literals.
//!
//! Plain literals that also count toward a group are not discounted when the
//! same clause carries its own group count for that group; no double-count
//! correction is applied.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::hash::BuildHasher;

use crate::error::LogicError;
use crate::error::LogicResult;
use crate::expr::Expr;
use crate::expr::PrimitiveKind;
use crate::expr::group_count_primitive;

// ============================================================================
// SECTION: Group Membership
// ============================================================================

/// Resolves an item group name to its members in declaration order.
///
/// Implemented for `HashMap` and `BTreeMap` keyed by group name so callers can
/// pass whatever map they loaded their item data into.
pub trait GroupMembership {
    /// Returns the members of `group`, or `None` if the group is unknown.
    fn members(&self, group: &str) -> Option<&[String]>;
}

impl<S: BuildHasher> GroupMembership for HashMap<String, Vec<String>, S> {
    fn members(&self, group: &str) -> Option<&[String]> {
        self.get(group).map(Vec::as_slice)
    }
}

impl GroupMembership for BTreeMap<String, Vec<String>> {
    fn members(&self, group: &str) -> Option<&[String]> {
        self.get(group).map(Vec::as_slice)
    }
}

impl<G: GroupMembership + ?Sized> GroupMembership for &G {
    fn members(&self, group: &str) -> Option<&[String]> {
        (**self).members(group)
    }
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Operation name reported when [`reduce`] receives a non-DNF tree.
const REDUCE_OPERATION: &str = "reduce";

/// Removes subsumed clauses from a strict-DNF tree.
///
/// Within each clause, duplicate plain literals collapse and repeated
/// `@group:n` primitives keep the largest `n`. Clauses are then visited from
/// fewest to most literals (stable), and a clause is kept unless an
/// already-kept clause generalizes it. Each kept clause is rebuilt with its
/// literals sorted lexicographically.
///
/// # Errors
///
/// Returns [`LogicError::NotDnf`] for non-DNF input,
/// [`LogicError::InvalidGroupCount`] for malformed `@` primitives, and
/// [`LogicError::UnknownGroup`] when a group-count comparison needs the
/// members of a group that `groups` does not know.
pub fn reduce<G>(dnf: &Expr, groups: &G) -> LogicResult<Expr>
where
    G: GroupMembership + ?Sized,
{
    let mut clauses = dnf
        .dnf_clauses(REDUCE_OPERATION)?
        .into_iter()
        .map(|clause| CanonicalClause::from_values(&clause))
        .collect::<LogicResult<Vec<_>>>()?;
    clauses.sort_by_key(CanonicalClause::size);

    let mut kept: Vec<CanonicalClause<'_>> = Vec::with_capacity(clauses.len());
    for candidate in clauses {
        let mut redundant = false;
        for general in &kept {
            if general.generalizes(&candidate, groups)? {
                redundant = true;
                break;
            }
        }
        if !redundant {
            kept.push(candidate);
        }
    }

    Ok(Expr::from_clauses(kept.iter().map(CanonicalClause::to_sorted_values)))
}

// ============================================================================
// SECTION: Canonical Clauses
// ============================================================================

/// AND-clause split into a plain-literal set and per-group minimum counts.
#[derive(Debug)]
struct CanonicalClause<'e> {
    /// Plain literals, including function primitives.
    literals: BTreeSet<&'e str>,
    /// Group name to the largest count required in this clause.
    groups: BTreeMap<&'e str, u32>,
}

impl<'e> CanonicalClause<'e> {
    /// Canonicalizes the primitive values of one clause.
    fn from_values(values: &[&'e str]) -> LogicResult<Self> {
        let mut literals = BTreeSet::new();
        let mut groups: BTreeMap<&'e str, u32> = BTreeMap::new();
        for &value in values {
            match PrimitiveKind::classify(value)? {
                PrimitiveKind::GroupCount {
                    group,
                    count,
                } => {
                    let entry = groups.entry(group).or_insert(count);
                    *entry = (*entry).max(count);
                }
                PrimitiveKind::Literal(_)
                | PrimitiveKind::Function {
                    ..
                } => {
                    literals.insert(value);
                }
            }
        }
        Ok(Self {
            literals,
            groups,
        })
    }

    /// Total literal count used for generality ordering.
    fn size(&self) -> usize {
        self.literals.len() + self.groups.len()
    }

    /// Returns true when `self` is implied by `candidate`, making `candidate`
    /// redundant next to `self` in an OR.
    fn generalizes<G>(&self, candidate: &Self, groups: &G) -> LogicResult<bool>
    where
        G: GroupMembership + ?Sized,
    {
        if !self.literals.is_subset(&candidate.literals) {
            return Ok(false);
        }
        let mut all_groups_satisfied = true;
        for (group, &required) in &self.groups {
            if !candidate.satisfies_group(group, required, groups)? {
                all_groups_satisfied = false;
                break;
            }
        }
        Ok(all_groups_satisfied)
    }

    /// Returns true when this clause guarantees `required` members of `group`.
    fn satisfies_group<G>(&self, group: &str, required: u32, groups: &G) -> LogicResult<bool>
    where
        G: GroupMembership + ?Sized,
    {
        if required == 0 || self.groups.get(group).is_some_and(|&count| count >= required) {
            return Ok(true);
        }
        let members = groups.members(group).ok_or_else(|| LogicError::UnknownGroup {
            group: group.to_string(),
        })?;
        let named = self
            .literals
            .iter()
            .filter(|literal| members.iter().any(|member| member.as_str() == **literal))
            .count();
        Ok(u32::try_from(named).map_or(true, |named| named >= required))
    }

    /// Plain literals and group counts, sorted lexicographically.
    fn to_sorted_values(&self) -> Vec<String> {
        let mut values: Vec<String> = self
            .literals
            .iter()
            .map(|literal| (*literal).to_string())
            .chain(self.groups.iter().map(|(group, count)| group_count_primitive(group, *count)))
            .collect();
        values.sort();
        values
    }
}
