// crates/tracker-logic/src/sink.rs
// ============================================================================
// Module: Compile Events
// Description: Structured events emitted while compiling regions and locations.
// Purpose: Report compilation progress without a hard logging dependency.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The world compiler records one [`CompileEvent`] per compiled region or
//! location and one [`HookEvent`] per newly detected custom hook. Sinks decide
//! where events go; this crate only ships [`NoopCompileSink`]. Stderr and file
//! sinks are built from configuration by `tracker-logic-config`.

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Event label for a compiled region.
pub const REGION_COMPILED_EVENT: &str = "region_compiled";
/// Event label for a compiled location.
pub const LOCATION_COMPILED_EVENT: &str = "location_compiled";
/// Event label for a newly detected custom hook.
pub const HOOK_DETECTED_EVENT: &str = "custom_hook_detected";

/// Compilation summary for one region or location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Region id or location name.
    pub subject: String,
    /// Region the subject belongs to.
    pub region: String,
    /// Simple paths enumerated (regions only).
    pub paths: Option<usize>,
    /// Clause count after normalization.
    pub clauses_normalized: usize,
    /// Clause count after reduction.
    pub clauses_reduced: usize,
}

impl CompileEvent {
    /// Builds a region event.
    #[must_use]
    pub fn region(
        region: &str,
        paths: usize,
        clauses_normalized: usize,
        clauses_reduced: usize,
    ) -> Self {
        Self {
            event: REGION_COMPILED_EVENT,
            timestamp_ms: now_ms(),
            subject: region.to_string(),
            region: region.to_string(),
            paths: Some(paths),
            clauses_normalized,
            clauses_reduced,
        }
    }

    /// Builds a location event.
    #[must_use]
    pub fn location(
        location: &str,
        region: &str,
        clauses_normalized: usize,
        clauses_reduced: usize,
    ) -> Self {
        Self {
            event: LOCATION_COMPILED_EVENT,
            timestamp_ms: now_ms(),
            subject: location.to_string(),
            region: region.to_string(),
            paths: None,
            clauses_normalized,
            clauses_reduced,
        }
    }
}

/// A custom hook function seen for the first time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Hook function name.
    pub name: String,
    /// Argument count.
    pub arity: usize,
    /// Region id or location name where the hook first appeared.
    pub first_seen_in: String,
}

impl HookEvent {
    /// Builds a hook event.
    #[must_use]
    pub fn new(name: &str, arity: usize, first_seen_in: &str) -> Self {
        Self {
            event: HOOK_DETECTED_EVENT,
            timestamp_ms: now_ms(),
            name: name.to_string(),
            arity,
            first_seen_in: first_seen_in.to_string(),
        }
    }
}

/// Milliseconds since the Unix epoch, or zero if the clock is before it.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis())
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for compile events.
pub trait CompileSink: Send + Sync {
    /// Record a region or location compile event.
    fn record(&self, event: &CompileEvent);

    /// Record a custom hook detection event.
    fn record_hook(&self, _event: &HookEvent) {}
}

/// No-op compile sink.
pub struct NoopCompileSink;

impl CompileSink for NoopCompileSink {
    fn record(&self, _event: &CompileEvent) {}

    fn record_hook(&self, _event: &HookEvent) {}
}
