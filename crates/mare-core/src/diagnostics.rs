//! Trace sinks for transform execution
//!
//! Diagnostics are observational only. A sink receives one record per chain
//! step plus whatever detail individual transforms report, and nothing it
//! does can change the value a chain returns.

use serde::Serialize;
use std::fmt;
use std::sync::Mutex;

/// Tracing target used by [`TracingDiagnostics`]
pub const TRACE_TARGET: &str = "mare::transform";

/// One structured trace record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceRecord {
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl TraceRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Append a named field
    pub fn field(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.fields.push((name.into(), value.to_string()));
        self
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        for (name, value) in &self.fields {
            write!(f, " {}={}", name, value)?;
        }
        Ok(())
    }
}

/// Fire-and-forget sink for trace records
pub trait Diagnostics: Send + Sync {
    /// Receive one record
    fn trace(&self, record: &TraceRecord);

    /// Whether records should be built at all
    fn enabled(&self) -> bool {
        true
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn trace(&self, _record: &TraceRecord) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// Sink that forwards records to `tracing` at DEBUG level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn trace(&self, record: &TraceRecord) {
        tracing::debug!(target: TRACE_TARGET, "{}", record);
    }

    fn enabled(&self) -> bool {
        tracing::enabled!(target: TRACE_TARGET, tracing::Level::DEBUG)
    }
}

/// Sink that keeps every record in memory
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    records: Mutex<Vec<TraceRecord>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records received so far
    pub fn records(&self) -> Vec<TraceRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Drop all recorded entries
    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn trace(&self, record: &TraceRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}
