// crates/tracker-logic/tests/locations.rs
// ============================================================================
// Test Module: World Compiler
// Coverage: Region grouping, location rules, visibility, hooks, and events.
// ============================================================================
//! ## Overview
//! Integration tests for compiling regions and locations into tracker rules.

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

mod support;

use std::collections::BTreeMap;
use std::sync::Mutex;

use support::TestResult;
use support::ensure;
use tracker_logic::CategoryOptions;
use tracker_logic::CompileEvent;
use tracker_logic::CompileSink;
use tracker_logic::CustomHooks;
use tracker_logic::HookEvent;
use tracker_logic::Location;
use tracker_logic::LogicError;
use tracker_logic::Region;
use tracker_logic::RegionGraph;
use tracker_logic::START_REGION;
use tracker_logic::WorldCompiler;

/// Sink that keeps every event in memory.
#[derive(Default)]
struct RecordingSink {
    /// Compile events in arrival order.
    events: Mutex<Vec<CompileEvent>>,
    /// Hook events in arrival order.
    hooks: Mutex<Vec<HookEvent>>,
}

impl CompileSink for RecordingSink {
    fn record(&self, event: &CompileEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn record_hook(&self, event: &HookEvent) {
        if let Ok(mut hooks) = self.hooks.lock() {
            hooks.push(event.clone());
        }
    }
}

/// Two-region world: a free field leading to a cave that needs a lamp.
fn world_graph() -> TestResult<RegionGraph> {
    Ok(RegionGraph::new([
        (
            "Field".to_string(),
            Region {
                connects_to: vec!["Cave".to_string()],
                requires: None,
                starting: true,
            },
        ),
        (
            "Cave".to_string(),
            Region {
                connects_to: Vec::new(),
                requires: Some("|Lamp| or {canSeeInDark}".to_string()),
                starting: false,
            },
        ),
    ])?)
}

/// Item groups for the world.
fn groups() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([(
        "Keys".to_string(),
        vec!["Small Key".to_string(), "Big Key".to_string()],
    )])
}

/// Builds a location.
fn location(
    name: &str,
    region: Option<&str>,
    requires: Option<&str>,
    categories: &[&str],
) -> Location {
    Location {
        name: name.to_string(),
        region: region.map(str::to_string),
        requires: requires.map(str::to_string),
        categories: categories.iter().map(|category| (*category).to_string()).collect(),
    }
}

// ============================================================================
// SECTION: World Compilation
// ============================================================================

/// Tests regions appear in first-location order with their rules.
#[test]
fn compiles_world_grouped_by_region() -> TestResult {
    let graph = world_graph()?;
    let groups = groups();
    let options: CategoryOptions =
        BTreeMap::from([("Chests".to_string(), vec!["$OptOne|Chests".to_string()])]);
    let locations = vec![
        location("Cave Chest", Some("Cave"), Some("|Small Key| and |Big Key|"), &["Chests"]),
        location("Field Sign", Some("Field"), None, &[]),
        location("Cave Altar", Some("Cave"), Some("|@Keys:2| or |Small Key| and |Big Key|"), &[]),
        location("Gift", None, Some("{canTalk(Elder)}"), &["Chests", "Unknown"]),
    ];
    let world =
        WorldCompiler::new(&graph, &groups).with_category_options(&options).compile(&locations)?;

    let names: Vec<&str> = world.regions.iter().map(|region| region.name.as_str()).collect();
    ensure(names == ["Cave", "Field", START_REGION], format!("unexpected order {names:?}"))?;

    let cave = &world.regions[0];
    ensure(
        cave.access_rules == vec!["lamp".to_string(), "$canSeeInDark".to_string()],
        format!("unexpected cave rules {:?}", cave.access_rules),
    )?;
    ensure(cave.locations.len() == 2, "cave holds two locations")?;
    ensure(
        cave.locations[0].access_rules == Some(vec!["big_key, small_key".to_string()]),
        format!("unexpected chest rules {:?}", cave.locations[0].access_rules),
    )?;
    ensure(
        cave.locations[0].visibility_rules == vec!["$OptOne|Chests".to_string()],
        "chest visibility from category",
    )?;
    ensure(
        cave.locations[1].access_rules
            == Some(vec!["$has_count_from_group|Keys|2".to_string()]),
        format!("unexpected altar rules {:?}", cave.locations[1].access_rules),
    )?;

    let field = &world.regions[1];
    ensure(field.access_rules == vec![String::new()], "field is always reachable")?;
    ensure(field.locations[0].access_rules.is_none(), "sign has no requirement")?;

    let start = &world.regions[2];
    ensure(start.access_rules == vec![String::new()], "start is always reachable")?;
    ensure(start.locations[0].region == START_REGION, "gift defaults to start")?;

    let expected_hooks = CustomHooks::from([
        ("canSeeInDark".to_string(), 0),
        ("canTalk".to_string(), 1),
    ]);
    ensure(world.hooks == expected_hooks, format!("unexpected hooks {:?}", world.hooks))
}

/// Tests compiled output serializes without empty optional fields.
#[test]
fn compiled_world_serializes_to_json() -> TestResult {
    let graph = world_graph()?;
    let groups = groups();
    let locations = vec![location("Field Sign", Some("Field"), None, &[])];
    let world = WorldCompiler::new(&graph, &groups).compile(&locations)?;
    let json = serde_json::to_value(&world)?;
    let sign = &json["regions"][0]["locations"][0];
    ensure(sign["name"] == "Field Sign", format!("unexpected json {json}"))?;
    ensure(sign.get("access_rules").is_none(), "absent access rules are skipped")?;
    ensure(sign.get("visibility_rules").is_none(), "empty visibility rules are skipped")
}

/// Tests locations deserialize with the singular category alias.
#[test]
fn location_accepts_category_alias() -> TestResult {
    let parsed: Location = serde_json::from_str(
        r#"{"name": "Chest", "region": "Cave", "category": ["Chests"]}"#,
    )?;
    ensure(parsed.categories == vec!["Chests".to_string()], "alias maps to categories")?;
    ensure(parsed.requires.is_none(), "requires defaults to none")
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tests location failures name the location.
#[test]
fn location_failure_names_location() -> TestResult {
    let graph = world_graph()?;
    let groups = groups();
    let locations = vec![location("Broken", Some("Field"), Some("|A| |B|"), &[])];
    let result = WorldCompiler::new(&graph, &groups).compile(&locations);
    ensure(
        matches!(
            &result,
            Err(LogicError::LocationRequirement { location, .. }) if location == "Broken"
        ),
        format!("expected location error, got {result:?}"),
    )
}

/// Tests locations in undeclared regions are rejected.
#[test]
fn location_in_unknown_region_is_rejected() -> TestResult {
    let graph = world_graph()?;
    let groups = groups();
    let locations = vec![location("Lost", Some("Nowhere"), None, &[])];
    let result = WorldCompiler::new(&graph, &groups).compile(&locations);
    ensure(
        matches!(result, Err(LogicError::UnknownRegion { .. })),
        format!("expected unknown region, got {result:?}"),
    )
}

// ============================================================================
// SECTION: Events
// ============================================================================

/// Tests the sink sees one event per region and location plus new hooks.
#[test]
fn sink_records_compile_and_hook_events() -> TestResult {
    let graph = world_graph()?;
    let groups = groups();
    let sink = RecordingSink::default();
    let locations = vec![
        location("Cave Chest", Some("Cave"), Some("|Lamp| and {canSeeInDark}"), &[]),
        location("Cave Shelf", Some("Cave"), None, &[]),
    ];
    WorldCompiler::new(&graph, &groups).with_sink(&sink).compile(&locations)?;

    let events = sink.events.lock().map_err(|_| "events lock poisoned")?;
    let subjects: Vec<&str> = events.iter().map(|event| event.subject.as_str()).collect();
    ensure(subjects == ["Cave", "Cave Chest"], format!("unexpected events {subjects:?}"))?;
    ensure(events[0].paths == Some(1), "region event carries path count")?;
    ensure(events[1].region == "Cave", "location event carries its region")?;

    let hooks = sink.hooks.lock().map_err(|_| "hooks lock poisoned")?;
    ensure(hooks.len() == 1, format!("hook reported once, got {}", hooks.len()))?;
    ensure(
        hooks[0].name == "canSeeInDark" && hooks[0].first_seen_in == "Cave",
        "hook first seen in the region",
    )
}
