// crates/tracker-logic/src/locations.rs
// ============================================================================
// Module: World Compiler
// Description: Compiles region and location requirements into tracker rules.
// Purpose: Drive the full pipeline over caller-supplied world data.
// Dependencies: serde, crate::{dnf, emit, error, expr, limits, parser, reduce, regions, sink}
// ============================================================================

//! ## Overview
//! [`WorldCompiler`] ties the stages together for a whole world:
//!
//! - each region that holds locations gets access rules from the
//!   reachability analysis;
//! - each location gets access rules from its own requirement and visibility
//!   rules from its categories' option lists;
//! - custom hooks are accumulated across everything compiled.
//!
//! Locations with no region belong to [`START_REGION`]. Regions appear in the
//! order their first location appears.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::dnf::normalize;
use crate::emit::CustomHooks;
use crate::emit::RuleEmitter;
use crate::error::LogicError;
use crate::error::LogicResult;
use crate::expr::Expr;
use crate::limits::CompileLimits;
use crate::parser::parse_requirement;
use crate::reduce::GroupMembership;
use crate::reduce::reduce;
use crate::regions::RegionGraph;
use crate::regions::START_REGION;
use crate::sink::CompileEvent;
use crate::sink::CompileSink;
use crate::sink::HookEvent;
use crate::sink::NoopCompileSink;

// ============================================================================
// SECTION: Input Types
// ============================================================================

/// Category name to the option rules that make its locations visible.
pub type CategoryOptions = BTreeMap<String, Vec<String>>;

/// One location as declared by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Location name.
    pub name: String,
    /// Region holding the location; [`START_REGION`] when absent.
    #[serde(default)]
    pub region: Option<String>,
    /// Raw requirement string.
    #[serde(default)]
    pub requires: Option<String>,
    /// Category tags.
    #[serde(default, alias = "category")]
    pub categories: Vec<String>,
}

impl Location {
    /// Region id this location belongs to.
    #[must_use]
    pub fn region_id(&self) -> &str {
        self.region.as_deref().unwrap_or(START_REGION)
    }
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// Compiled rules for one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledLocation {
    /// Location name.
    pub name: String,
    /// Region holding the location.
    pub region: String,
    /// Access rules, absent when the location has no requirement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_rules: Option<Vec<String>>,
    /// Visibility rules gathered from the location's categories.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub visibility_rules: Vec<String>,
}

/// Compiled rules for one region and its locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledRegion {
    /// Region id.
    pub name: String,
    /// Access rules for reaching the region.
    pub access_rules: Vec<String>,
    /// Locations in declaration order.
    pub locations: Vec<CompiledLocation>,
}

/// Compiled rules for a whole world.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompiledWorld {
    /// Regions in order of first location.
    pub regions: Vec<CompiledRegion>,
    /// Custom hooks referenced anywhere in the world.
    pub hooks: CustomHooks,
}

// ============================================================================
// SECTION: World Compiler
// ============================================================================

/// Sink used when the caller does not supply one.
static NOOP_SINK: NoopCompileSink = NoopCompileSink;

/// Compiles regions and locations against one region graph and group map.
pub struct WorldCompiler<'w, G: ?Sized> {
    /// Region connectivity.
    graph: &'w RegionGraph,
    /// Item group membership.
    groups: &'w G,
    /// Category visibility options.
    category_options: Option<&'w CategoryOptions>,
    /// Resource limits.
    limits: CompileLimits,
    /// Rule emitter.
    emitter: RuleEmitter,
    /// Event destination.
    sink: &'w dyn CompileSink,
}

impl<'w, G> WorldCompiler<'w, G>
where
    G: GroupMembership + ?Sized,
{
    /// Creates a compiler with default limits, no category options, and a
    /// no-op sink.
    #[must_use]
    pub fn new(graph: &'w RegionGraph, groups: &'w G) -> Self {
        Self {
            graph,
            groups,
            category_options: None,
            limits: CompileLimits::default(),
            emitter: RuleEmitter::new(),
            sink: &NOOP_SINK,
        }
    }

    /// Replaces the resource limits.
    #[must_use]
    pub fn with_limits(mut self, limits: CompileLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the category visibility options.
    #[must_use]
    pub fn with_category_options(mut self, options: &'w CategoryOptions) -> Self {
        self.category_options = Some(options);
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_sink(mut self, sink: &'w dyn CompileSink) -> Self {
        self.sink = sink;
        self
    }

    /// Compiles every location and the regions holding them.
    ///
    /// # Errors
    ///
    /// Returns the first region or location failure.
    pub fn compile(&self, locations: &[Location]) -> LogicResult<CompiledWorld> {
        let mut region_order: Vec<&str> = Vec::new();
        let mut by_region: BTreeMap<&str, Vec<&Location>> = BTreeMap::new();
        for location in locations {
            let region = location.region_id();
            by_region
                .entry(region)
                .or_insert_with(|| {
                    region_order.push(region);
                    Vec::new()
                })
                .push(location);
        }

        let mut world = CompiledWorld::default();
        for region in region_order {
            let access_rules = self.compile_region(region, &mut world.hooks)?;
            let mut compiled = Vec::new();
            for location in by_region.get(region).into_iter().flatten() {
                compiled.push(self.compile_location(location, &mut world.hooks)?);
            }
            world.regions.push(CompiledRegion {
                name: region.to_string(),
                access_rules,
                locations: compiled,
            });
        }
        Ok(world)
    }

    /// Compiles the access rules for one region.
    ///
    /// # Errors
    ///
    /// Returns any path enumeration, parse, normalization, reduction, or
    /// emission failure.
    pub fn compile_region(
        &self,
        region: &str,
        hooks: &mut CustomHooks,
    ) -> LogicResult<Vec<String>> {
        let analysis = self.graph.analyze(region, self.groups, &self.limits)?;
        let rules = self.emit_tracking(&analysis.expression, region, hooks)?;
        self.sink.record(&CompileEvent::region(
            region,
            analysis.paths,
            analysis.normalized_clauses,
            rules.len(),
        ));
        Ok(rules)
    }

    /// Compiles the access and visibility rules for one location.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::LocationRequirement`] wrapping any failure in the
    /// location's requirement.
    pub fn compile_location(
        &self,
        location: &Location,
        hooks: &mut CustomHooks,
    ) -> LogicResult<CompiledLocation> {
        let region = location.region_id();
        let requirement = location.requires.as_deref().filter(|rule| !rule.trim().is_empty());
        let access_rules = match requirement {
            Some(rule) => {
                let (normalized_clauses, reduced) = self
                    .compile_rule(rule)
                    .map_err(|err| LogicError::in_location(&location.name, err))?;
                let rules = self
                    .emit_tracking(&reduced, &location.name, hooks)
                    .map_err(|err| LogicError::in_location(&location.name, err))?;
                self.sink.record(&CompileEvent::location(
                    &location.name,
                    region,
                    normalized_clauses,
                    rules.len(),
                ));
                Some(rules)
            }
            None => None,
        };
        Ok(CompiledLocation {
            name: location.name.clone(),
            region: region.to_string(),
            access_rules,
            visibility_rules: self.visibility_rules(location),
        })
    }

    /// Parses, normalizes, and reduces one requirement string.
    fn compile_rule(&self, rule: &str) -> LogicResult<(usize, Expr)> {
        let parsed = parse_requirement(rule, &self.limits)?;
        let normalized = normalize(&parsed, &self.limits)?;
        let normalized_clauses = match &normalized {
            Expr::Or(clauses) => clauses.len(),
            Expr::And(_) | Expr::Primitive(_) => 0,
        };
        Ok((normalized_clauses, reduce(&normalized, self.groups)?))
    }

    /// Emits rules and reports hooks not already in `hooks`.
    fn emit_tracking(
        &self,
        dnf: &Expr,
        subject: &str,
        hooks: &mut CustomHooks,
    ) -> LogicResult<Vec<String>> {
        let known: BTreeSet<String> = hooks.keys().cloned().collect();
        let rules = self.emitter.emit_into(dnf, hooks)?;
        for (name, arity) in hooks.iter().filter(|(name, _)| !known.contains(*name)) {
            self.sink.record_hook(&HookEvent::new(name, *arity, subject));
        }
        Ok(rules)
    }

    /// Visibility rules from every category option list, in category order.
    fn visibility_rules(&self, location: &Location) -> Vec<String> {
        let Some(options) = self.category_options else {
            return Vec::new();
        };
        location
            .categories
            .iter()
            .filter_map(|category| options.get(category))
            .flatten()
            .cloned()
            .collect()
    }
}
