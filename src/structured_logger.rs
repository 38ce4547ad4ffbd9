//! Injected logging side channel for engine components.
//!
//! Components never log through a global. They receive an
//! `Arc<dyn EngineLogger>` at construction and report what they did through
//! it. Three sinks are provided:
//!
//! - [`StructuredLogger`]: machine-parseable JSONL with monotonic sequence
//!   numbers, microsecond UTC timestamps and a run ID for correlation
//! - [`TracingLogger`]: forwards entries to `tracing`
//! - [`NullLogger`]: discards everything

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Sink for structured engine log entries.
pub trait EngineLogger: Send + Sync {
    /// Records one entry. Must never fail the caller.
    fn log(&self, component: &str, event: Value);
}

/// Returns a logger that discards everything.
pub fn null_logger() -> Arc<dyn EngineLogger> {
    Arc::new(NullLogger)
}

/// Discards all entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl EngineLogger for NullLogger {
    fn log(&self, _component: &str, _event: Value) {}
}

/// Forwards entries to the `tracing` subscriber installed by the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl EngineLogger for TracingLogger {
    fn log(&self, component: &str, event: Value) {
        tracing::info!(target: "workflow_engine", component, event = %event);
    }
}

/// Structured JSONL logger for debugging and event reconstruction.
pub struct StructuredLogger {
    run_id: String,
    seq: AtomicU64,
    log_file: Mutex<File>,
    log_path: PathBuf,
}

/// A single log entry in JSONL format.
#[derive(Serialize, serde::Deserialize)]
pub struct LogEntry {
    /// Monotonic sequence number (unique per logger)
    pub seq: u64,
    /// ISO 8601 timestamp with microseconds
    pub ts: String,
    /// Identifies one process run
    pub run_id: String,
    /// Component that emitted the log
    pub component: String,
    /// Structured event data
    pub event: Value,
}

impl StructuredLogger {
    /// Creates a logger appending to `<logs_dir>/engine.jsonl`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The logs directory cannot be created
    /// - The log file cannot be opened
    pub fn new(run_id: &str, logs_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(logs_dir)?;
        let log_path = logs_dir.join("engine.jsonl");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        Ok(Self {
            run_id: run_id.to_string(),
            seq: AtomicU64::new(0),
            log_file: Mutex::new(file),
            log_path,
        })
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns the path to the log file.
    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}

impl EngineLogger for StructuredLogger {
    fn log(&self, component: &str, event: Value) {
        let entry = LogEntry {
            seq: self.next_seq(),
            ts: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            run_id: self.run_id.clone(),
            component: component.to_string(),
            event,
        };

        if let Ok(mut file) = self.log_file.lock() {
            if let Ok(line) = serde_json::to_string(&entry) {
                let _ = writeln!(file, "{}", line);
                let _ = file.flush();
            }
        }
    }
}

/// Keeps entries in memory so tests can assert on them.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<(String, Value)>>,
}

#[cfg(test)]
impl RecordingLogger {
    /// Returns every entry logged by `component`, in order.
    pub fn events_for(&self, component: &str) -> Vec<Value> {
        self.entries
            .lock()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(c, _)| c == component)
                    .map(|(_, e)| e.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the `type` field of every entry logged by `component`.
    pub fn types_for(&self, component: &str) -> Vec<String> {
        self.events_for(component)
            .iter()
            .filter_map(|e| e.get("type").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
impl EngineLogger for RecordingLogger {
    fn log(&self, component: &str, event: Value) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((component.to_string(), event));
        }
    }
}

#[cfg(test)]
#[path = "tests/structured_logger_tests.rs"]
mod tests;
