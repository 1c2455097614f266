// crates/tracker-logic-config/src/lib.rs
// ============================================================================
// Module: Tracker Logic Config Library
// Description: Canonical config model, validation, and compile sink construction.
// Purpose: Single source of truth for tracker-logic.toml semantics.
// Dependencies: serde, serde_json, toml, tracker-logic
// ============================================================================

//! ## Overview
//! `tracker-logic-config` loads compiler resource limits and logging settings
//! from a TOML file, validates them fail-closed against hard caps, and builds
//! the configured [`tracker_logic::CompileSink`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod sink;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use sink::FileCompileSink;
pub use sink::StderrCompileSink;
