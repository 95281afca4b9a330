//! Per-invocation execution context
//!
//! An [`ExecutionContext`] lives for exactly one chain evaluation. It lends the
//! boundary collaborators to the transforms that need them and tags trace
//! records with the step currently running.

use crate::diagnostics::{Diagnostics, TraceRecord};
use crate::lookup::ExternalLookup;

/// Collaborators and step bookkeeping for one chain evaluation
#[derive(Default)]
pub struct ExecutionContext<'a> {
    lookup: Option<&'a dyn ExternalLookup>,
    diagnostics: Option<&'a dyn Diagnostics>,
    position: usize,
    variant: &'static str,
}

impl<'a> ExecutionContext<'a> {
    /// Context with no collaborators
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the entry lookup used by lookup-style transforms
    pub fn with_lookup(mut self, lookup: &'a dyn ExternalLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Attach a trace sink
    pub fn with_diagnostics(mut self, diagnostics: &'a dyn Diagnostics) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn lookup(&self) -> Option<&'a dyn ExternalLookup> {
        self.lookup
    }

    /// Whether trace records will be delivered anywhere
    pub fn is_tracing(&self) -> bool {
        self.diagnostics.is_some_and(|d| d.enabled())
    }

    /// Position of the step currently being evaluated
    pub fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn enter_step(&mut self, position: usize, variant: &'static str) {
        self.position = position;
        self.variant = variant;
    }

    /// Emit a trace record; `build` only runs when a sink is listening
    pub fn trace<F>(&self, build: F)
    where
        F: FnOnce() -> TraceRecord,
    {
        if let Some(diagnostics) = self.diagnostics.filter(|d| d.enabled()) {
            let record = build()
                .field("position", self.position)
                .field("variant", self.variant);
            diagnostics.trace(&record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;

    #[test]
    fn test_trace_is_tagged_with_step() {
        let sink = RecordingDiagnostics::new();
        let mut ctx = ExecutionContext::new().with_diagnostics(&sink);
        ctx.enter_step(3, "Trim");
        ctx.trace(|| TraceRecord::new("hello"));
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("position"), Some("3"));
        assert_eq!(records[0].get("variant"), Some("Trim"));
    }

    #[test]
    fn test_trace_builder_not_called_without_sink() {
        let ctx = ExecutionContext::new();
        let mut called = false;
        ctx.trace(|| {
            called = true;
            TraceRecord::new("never")
        });
        assert!(!called);
        assert!(!ctx.is_tracing());
    }
}
