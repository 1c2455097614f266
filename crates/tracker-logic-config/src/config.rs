// crates/tracker-logic-config/src/config.rs
// ============================================================================
// Module: Tracker Logic Configuration
// Description: Configuration loading and validation for the logic compiler.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml, tracker-logic
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file resolved from an explicit path,
//! then the `TRACKER_LOGIC_CONFIG` environment variable, then
//! `tracker-logic.toml` in the working directory. Unknown keys, oversized
//! files, and limits beyond the hard caps are rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracker_logic::CompileLimits;
use tracker_logic::CompileSink;
use tracker_logic::NoopCompileSink;
use tracker_logic::limits::DEFAULT_MAX_CLAUSES;
use tracker_logic::limits::DEFAULT_MAX_INPUT_BYTES;
use tracker_logic::limits::DEFAULT_MAX_NESTING;
use tracker_logic::limits::DEFAULT_MAX_PATHS;
use tracker_logic::limits::DEFAULT_MAX_PATH_STEPS;
use tracker_logic::limits::DEFAULT_MAX_TREE_DEPTH;

use crate::sink::FileCompileSink;
use crate::sink::StderrCompileSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "tracker-logic.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "TRACKER_LOGIC_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 64 * 1024;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;

/// Hard cap for `limits.max_input_bytes`.
pub const MAX_INPUT_BYTES_CAP: usize = 1024 * 1024;
/// Hard cap for `limits.max_nesting`.
pub const MAX_NESTING_CAP: usize = 256;
/// Hard cap for `limits.max_tree_depth`.
pub const MAX_TREE_DEPTH_CAP: usize = 1024;
/// Hard cap for `limits.max_clauses`.
pub const MAX_CLAUSES_CAP: usize = 1 << 20;
/// Hard cap for `limits.max_paths`.
pub const MAX_PATHS_CAP: usize = 1 << 20;
/// Hard cap for `limits.max_path_steps`.
pub const MAX_PATH_STEPS_CAP: usize = 1 << 28;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Tracker logic configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackerLogicConfig {
    /// Compiler resource limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Compile event logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TrackerLogicConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        self.logging.validate()
    }

    /// Returns the compiler limits described by this configuration.
    #[must_use]
    pub const fn compile_limits(&self) -> CompileLimits {
        self.limits.to_compile_limits()
    }

    /// Builds the configured compile sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file sink cannot be opened and
    /// [`ConfigError::Invalid`] when a file sink has no path.
    pub fn build_sink(&self) -> Result<Box<dyn CompileSink>, ConfigError> {
        match self.logging.sink {
            SinkKind::None => Ok(Box::new(NoopCompileSink)),
            SinkKind::Stderr => Ok(Box::new(StderrCompileSink)),
            SinkKind::File => {
                let path = self.logging.path.as_deref().ok_or_else(|| {
                    ConfigError::Invalid("logging.path is required for sink=file".to_string())
                })?;
                let sink = FileCompileSink::new(path)
                    .map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Box::new(sink))
            }
        }
    }
}

// ============================================================================
// SECTION: Limits
// ============================================================================

/// `[limits]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum requirement string size in bytes.
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,
    /// Maximum parenthesis nesting depth.
    #[serde(default = "default_max_nesting")]
    pub max_nesting: usize,
    /// Maximum expression tree depth.
    #[serde(default = "default_max_tree_depth")]
    pub max_tree_depth: usize,
    /// Maximum DNF clause count.
    #[serde(default = "default_max_clauses")]
    pub max_clauses: usize,
    /// Maximum simple paths per target region.
    #[serde(default = "default_max_paths")]
    pub max_paths: usize,
    /// Maximum region visits during path enumeration for one target.
    #[serde(default = "default_max_path_steps")]
    pub max_path_steps: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
            max_nesting: default_max_nesting(),
            max_tree_depth: default_max_tree_depth(),
            max_clauses: default_max_clauses(),
            max_paths: default_max_paths(),
            max_path_steps: default_max_path_steps(),
        }
    }
}

impl LimitsConfig {
    /// Validates every limit against its hard cap.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero or over-cap limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_limit("limits.max_input_bytes", self.max_input_bytes, MAX_INPUT_BYTES_CAP)?;
        check_limit("limits.max_nesting", self.max_nesting, MAX_NESTING_CAP)?;
        check_limit("limits.max_tree_depth", self.max_tree_depth, MAX_TREE_DEPTH_CAP)?;
        check_limit("limits.max_clauses", self.max_clauses, MAX_CLAUSES_CAP)?;
        check_limit("limits.max_paths", self.max_paths, MAX_PATHS_CAP)?;
        check_limit("limits.max_path_steps", self.max_path_steps, MAX_PATH_STEPS_CAP)
    }

    /// Converts to the compiler's limit type.
    #[must_use]
    pub const fn to_compile_limits(&self) -> CompileLimits {
        CompileLimits {
            max_input_bytes: self.max_input_bytes,
            max_nesting: self.max_nesting,
            max_tree_depth: self.max_tree_depth,
            max_clauses: self.max_clauses,
            max_paths: self.max_paths,
            max_path_steps: self.max_path_steps,
        }
    }
}

/// Default for `limits.max_input_bytes`.
const fn default_max_input_bytes() -> usize {
    DEFAULT_MAX_INPUT_BYTES
}

/// Default for `limits.max_nesting`.
const fn default_max_nesting() -> usize {
    DEFAULT_MAX_NESTING
}

/// Default for `limits.max_tree_depth`.
const fn default_max_tree_depth() -> usize {
    DEFAULT_MAX_TREE_DEPTH
}

/// Default for `limits.max_clauses`.
const fn default_max_clauses() -> usize {
    DEFAULT_MAX_CLAUSES
}

/// Default for `limits.max_paths`.
const fn default_max_paths() -> usize {
    DEFAULT_MAX_PATHS
}

/// Default for `limits.max_path_steps`.
const fn default_max_path_steps() -> usize {
    DEFAULT_MAX_PATH_STEPS
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Compile event destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Discard events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `logging.path`.
    File,
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Event destination.
    #[serde(default)]
    pub sink: SinkKind,
    /// Log file path for `sink = "file"`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LoggingConfig {
    /// Validates sink and path consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the file sink has no usable path
    /// or another sink sets one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (SinkKind::File, None) => {
                Err(ConfigError::Invalid("logging.path is required for sink=file".to_string()))
            }
            (SinkKind::File, Some(path)) => validate_path(path),
            (SinkKind::None | SinkKind::Stderr, Some(_)) => Err(ConfigError::Invalid(
                "logging.path is only allowed for sink=file".to_string(),
            )),
            (SinkKind::None | SinkKind::Stderr, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration or opening a log file.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from an explicit path or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates a path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid("path must be non-empty".to_string()));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("path component too long".to_string()));
        }
    }
    Ok(())
}

/// Rejects a zero limit or one above `cap`.
fn check_limit(field: &str, value: usize, cap: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid(format!("{field} must be greater than zero")));
    }
    if value > cap {
        return Err(ConfigError::Invalid(format!("{field} exceeds hard cap of {cap}")));
    }
    Ok(())
}
