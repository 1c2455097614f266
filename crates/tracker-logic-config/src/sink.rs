// crates/tracker-logic-config/src/sink.rs
// ============================================================================
// Module: Compile Event Sinks
// Description: Stderr and file sinks for tracker-logic compile events.
// Purpose: Emit JSON-lines compile logs selected by configuration.
// Dependencies: serde, serde_json, tracker-logic
// ============================================================================

//! ## Overview
//! Each sink writes one JSON object per event. Serialization or write failures
//! are dropped so logging never aborts a compile.

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;
use tracker_logic::CompileEvent;
use tracker_logic::CompileSink;
use tracker_logic::HookEvent;

// ============================================================================
// SECTION: Stderr Sink
// ============================================================================

/// Compile sink that logs JSON lines to stderr.
pub struct StderrCompileSink;

impl CompileSink for StderrCompileSink {
    fn record(&self, event: &CompileEvent) {
        write_line(&mut io::stderr(), event);
    }

    fn record_hook(&self, event: &HookEvent) {
        write_line(&mut io::stderr(), event);
    }
}

// ============================================================================
// SECTION: File Sink
// ============================================================================

/// Compile sink that appends JSON lines to a file.
pub struct FileCompileSink {
    /// File handle guarded for concurrent writes.
    file: Mutex<File>,
}

impl FileCompileSink {
    /// Opens a file-backed compile sink, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one event under the file lock.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(mut file) = self.file.lock() {
            write_line(&mut *file, event);
        }
    }
}

impl CompileSink for FileCompileSink {
    fn record(&self, event: &CompileEvent) {
        self.append(event);
    }

    fn record_hook(&self, event: &HookEvent) {
        self.append(event);
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes `event` as one JSON line, ignoring failures.
fn write_line<W: Write, T: Serialize>(writer: &mut W, event: &T) {
    if let Ok(payload) = serde_json::to_string(event) {
        let _ = writeln!(writer, "{payload}");
    }
}
