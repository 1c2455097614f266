// crates/tracker-logic/src/regions.rs
// ============================================================================
// Module: Region Reachability
// Description: Simple-path enumeration and composite access expressions.
// Purpose: Fold per-region requirements along every path into one rule.
// Dependencies: serde, crate::{dnf, error, expr, limits, parser, reduce}
// ============================================================================

//! ## Overview
//! A region is reachable along a path when every region on that path is
//! enterable, so each simple path contributes the AND of its regions'
//! requirements, and the region's access expression is the OR over all paths,
//! normalized and reduced.
//!
//! A synthetic [`START_REGION`] node has edges to every starting region, or to
//! every region when none is flagged. Enumeration is exponential in graph
//! connectivity. The walk only enters regions that can still reach the
//! target, and is bounded by [`CompileLimits::max_paths`] and
//! [`CompileLimits::max_path_steps`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::VecDeque;

use serde::Deserialize;
use serde::Serialize;

use crate::dnf::normalize;
use crate::error::LogicError;
use crate::error::LogicResult;
use crate::expr::Expr;
use crate::limits::CompileLimits;
use crate::parser::parse_requirement;
use crate::reduce::GroupMembership;
use crate::reduce::reduce;

// ============================================================================
// SECTION: Region Data
// ============================================================================

/// Id of the synthetic start node.
pub const START_REGION: &str = "__start__";

/// One region as declared by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Regions reachable directly from this one.
    #[serde(default)]
    pub connects_to: Vec<String>,
    /// Raw requirement string for entering this region.
    #[serde(default)]
    pub requires: Option<String>,
    /// Whether the start node connects to this region.
    #[serde(default)]
    pub starting: bool,
}

impl Region {
    /// Returns the requirement string when it has any content.
    fn requirement(&self) -> Option<&str> {
        self.requires.as_deref().filter(|rule| !rule.trim().is_empty())
    }
}

/// Result of analyzing one target region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionAnalysis {
    /// Number of simple paths from the start node.
    pub paths: usize,
    /// Clause count after normalization, before reduction.
    pub normalized_clauses: usize,
    /// Reduced strict-DNF access expression.
    pub expression: Expr,
}

// ============================================================================
// SECTION: Region Graph
// ============================================================================

/// Read-only region connectivity graph.
///
/// # Invariants
/// - Every neighbor id names a declared region.
/// - [`START_REGION`] is never a declared region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionGraph {
    /// Region ids in declaration order.
    order: Vec<String>,
    /// Region data by id.
    regions: BTreeMap<String, Region>,
    /// Outgoing edges of the start node.
    start_edges: Vec<String>,
}

impl RegionGraph {
    /// Builds a graph from regions in declaration order.
    ///
    /// A region declared twice keeps its first position and its last data.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::ReservedRegion`] when a region uses
    /// [`START_REGION`] as its id, and [`LogicError::UnknownRegion`] when a
    /// neighbor list names an undeclared region.
    pub fn new<I>(regions: I) -> LogicResult<Self>
    where
        I: IntoIterator<Item = (String, Region)>,
    {
        let mut order = Vec::new();
        let mut by_id = BTreeMap::new();
        for (id, region) in regions {
            if id == START_REGION {
                return Err(LogicError::ReservedRegion {
                    region: id,
                });
            }
            if by_id.insert(id.clone(), region).is_none() {
                order.push(id);
            }
        }
        for region in by_id.values() {
            if let Some(missing) = region.connects_to.iter().find(|next| !by_id.contains_key(*next))
            {
                return Err(LogicError::UnknownRegion {
                    region: missing.clone(),
                });
            }
        }

        let starting: Vec<String> =
            order.iter().filter(|id| by_id.get(*id).is_some_and(|r| r.starting)).cloned().collect();
        let start_edges = if starting.is_empty() { order.clone() } else { starting };

        Ok(Self {
            order,
            regions: by_id,
            start_edges,
        })
    }

    /// Returns the declared region with `id`.
    #[must_use]
    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.get(id)
    }

    /// Returns declared region ids in declaration order.
    pub fn region_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    /// Returns the outgoing edges of `id`, including the start node's.
    #[must_use]
    pub fn neighbors(&self, id: &str) -> &[String] {
        if id == START_REGION {
            return &self.start_edges;
        }
        match self.regions.get(id) {
            Some(region) => region.connects_to.as_slice(),
            None => &[],
        }
    }

    /// Returns true when `id` is the start node or a declared region.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        id == START_REGION || self.regions.contains_key(id)
    }

    /// Enumerates every simple path from [`START_REGION`] to `target`.
    ///
    /// Each path starts with [`START_REGION`] and ends with `target`; no
    /// region appears twice in a path. Paths stop at the target.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::UnknownRegion`] for an undeclared target,
    /// [`LogicError::PathLimitExceeded`] when more than
    /// [`CompileLimits::max_paths`] paths exist, and
    /// [`LogicError::PathSearchExceeded`] when the walk visits more than
    /// [`CompileLimits::max_path_steps`] regions.
    pub fn simple_paths(
        &self,
        target: &str,
        limits: &CompileLimits,
    ) -> LogicResult<Vec<Vec<&str>>> {
        if !self.contains(target) {
            return Err(LogicError::UnknownRegion {
                region: target.to_string(),
            });
        }
        let reaches_target = self.regions_reaching(target);
        if !reaches_target.contains(START_REGION) {
            return Ok(Vec::new());
        }
        let mut walk = PathWalk {
            graph: self,
            target,
            reaches_target,
            max_paths: limits.max_paths,
            max_steps: limits.max_path_steps,
            steps_left: limits.max_path_steps,
            path: vec![START_REGION],
            visited: BTreeSet::from([START_REGION]),
            paths: Vec::new(),
        };
        walk.visit(START_REGION)?;
        Ok(walk.paths)
    }

    /// Returns every node, start node included, with a route to `target`.
    fn regions_reaching<'g>(&'g self, target: &str) -> BTreeSet<&'g str> {
        let mut incoming: BTreeMap<&str, Vec<&'g str>> = BTreeMap::new();
        let sources = self
            .order
            .iter()
            .map(|id| (id.as_str(), self.neighbors(id)))
            .chain(std::iter::once((START_REGION, self.start_edges.as_slice())));
        for (from, edges) in sources {
            for next in edges {
                incoming.entry(next.as_str()).or_default().push(from);
            }
        }

        let mut reached = BTreeSet::new();
        let mut queue = VecDeque::new();
        let start = if target == START_REGION {
            Some(START_REGION)
        } else {
            self.regions.get_key_value(target).map(|(id, _)| id.as_str())
        };
        if let Some(start) = start {
            reached.insert(start);
            queue.push_back(start);
        }
        while let Some(current) = queue.pop_front() {
            for &previous in incoming.get(current).map_or(&[][..], Vec::as_slice) {
                if reached.insert(previous) {
                    queue.push_back(previous);
                }
            }
        }
        reached
    }

    /// Combines region requirements along `paths` into one unnormalized tree.
    ///
    /// Each path becomes an AND of its non-start regions' parsed requirements;
    /// regions without a requirement contribute nothing, so a path with none
    /// becomes an empty (always true) AND.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::RegionRequirement`] when a region requirement
    /// fails to parse.
    pub fn paths_expression(
        &self,
        paths: &[Vec<&str>],
        limits: &CompileLimits,
    ) -> LogicResult<Expr> {
        let mut parsed: BTreeMap<&str, Option<Expr>> = BTreeMap::new();
        let mut alternatives = Vec::with_capacity(paths.len());
        for path in paths {
            let mut operands = Vec::new();
            for &id in path.iter().filter(|&&id| id != START_REGION) {
                if !parsed.contains_key(id) {
                    let expr = self.parse_region(id, limits)?;
                    parsed.insert(id, expr);
                }
                if let Some(Some(expr)) = parsed.get(id) {
                    operands.push(expr.clone());
                }
            }
            alternatives.push(Expr::and(operands));
        }
        Ok(Expr::or(alternatives))
    }

    /// Builds the reduced access expression for `target`.
    ///
    /// # Errors
    ///
    /// Returns any error from path enumeration, region parsing,
    /// normalization, or reduction.
    pub fn access_expression<G>(
        &self,
        target: &str,
        groups: &G,
        limits: &CompileLimits,
    ) -> LogicResult<Expr>
    where
        G: GroupMembership + ?Sized,
    {
        self.analyze(target, groups, limits).map(|analysis| analysis.expression)
    }

    /// Builds the reduced access expression for `target` together with path
    /// and clause statistics.
    ///
    /// # Errors
    ///
    /// Same as [`RegionGraph::access_expression`].
    pub fn analyze<G>(
        &self,
        target: &str,
        groups: &G,
        limits: &CompileLimits,
    ) -> LogicResult<RegionAnalysis>
    where
        G: GroupMembership + ?Sized,
    {
        let paths = self.simple_paths(target, limits)?;
        let combined = self.paths_expression(&paths, limits)?;
        let normalized = normalize(&combined, limits)?;
        let normalized_clauses = match &normalized {
            Expr::Or(clauses) => clauses.len(),
            Expr::And(_) | Expr::Primitive(_) => 0,
        };
        let expression = reduce(&normalized, groups)?;
        Ok(RegionAnalysis {
            paths: paths.len(),
            normalized_clauses,
            expression,
        })
    }

    /// Parses the requirement of region `id`, if it has one.
    fn parse_region(&self, id: &str, limits: &CompileLimits) -> LogicResult<Option<Expr>> {
        let Some(rule) = self.regions.get(id).and_then(Region::requirement) else {
            return Ok(None);
        };
        parse_requirement(rule, limits).map(Some).map_err(|err| LogicError::in_region(id, err))
    }
}

// ============================================================================
// SECTION: Path Walk
// ============================================================================

/// Depth-first simple-path enumeration state.
struct PathWalk<'g, 't> {
    /// Graph being walked.
    graph: &'g RegionGraph,
    /// Destination region.
    target: &'t str,
    /// Nodes with a route to the target.
    reaches_target: BTreeSet<&'g str>,
    /// Maximum number of paths to collect.
    max_paths: usize,
    /// Maximum region visits for the whole walk.
    max_steps: usize,
    /// Region visits remaining before the search gives up.
    steps_left: usize,
    /// Current path from the start node.
    path: Vec<&'g str>,
    /// Regions on the current path.
    visited: BTreeSet<&'g str>,
    /// Completed paths.
    paths: Vec<Vec<&'g str>>,
}

impl<'g> PathWalk<'g, '_> {
    /// Extends the current path from `current`.
    fn visit(&mut self, current: &'g str) -> LogicResult<()> {
        if self.steps_left == 0 {
            return Err(LogicError::PathSearchExceeded {
                region: self.target.to_string(),
                max_steps: self.max_steps,
            });
        }
        self.steps_left -= 1;
        if current == self.target {
            if self.paths.len() == self.max_paths {
                return Err(LogicError::PathLimitExceeded {
                    region: self.target.to_string(),
                    max_paths: self.max_paths,
                });
            }
            self.paths.push(self.path.clone());
            return Ok(());
        }
        let graph = self.graph;
        for next in graph.neighbors(current) {
            let next = next.as_str();
            if !self.reaches_target.contains(next) || !self.visited.insert(next) {
                continue;
            }
            self.path.push(next);
            let outcome = self.visit(next);
            self.path.pop();
            self.visited.remove(next);
            outcome?;
        }
        Ok(())
    }
}
