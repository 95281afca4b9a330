//! Pipeline entry point for hosts
//!
//! A [`PipelineInvoker`] owns the host collaborators and evaluates chains with
//! a fresh [`ExecutionContext`] per call. One invoker can be shared across
//! threads; chains are read-only during evaluation.

use crate::config::ChainConfig;
use crate::context::ExecutionContext;
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::error::Result;
use crate::lookup::ExternalLookup;
use crate::transform::TransformChain;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Evaluates chains against raw values
#[derive(Clone)]
pub struct PipelineInvoker {
    lookup: Option<Arc<dyn ExternalLookup>>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Default for PipelineInvoker {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineInvoker {
    /// Invoker without a lookup, tracing through `tracing`
    pub fn new() -> Self {
        Self {
            lookup: None,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    pub fn with_lookup(mut self, lookup: Arc<dyn ExternalLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Replace the trace sink
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Evaluate a chain once; no retries
    pub fn run(&self, chain: &TransformChain, raw: Value) -> Result<Value> {
        let span = tracing::debug_span!(
            "run_chain",
            chain = chain.name().unwrap_or("<unnamed>"),
            steps = chain.len()
        );
        let _guard = span.enter();

        let mut ctx = ExecutionContext::new().with_diagnostics(self.diagnostics.as_ref());
        if let Some(lookup) = &self.lookup {
            ctx = ctx.with_lookup(lookup.as_ref());
        }

        let result = chain.apply(raw, &mut ctx);
        if let Err(e) = &result {
            tracing::debug!(error = %e, kind = %e.kind(), "chain evaluation failed");
        }
        result
    }

    /// Build a chain from configuration and evaluate it
    pub fn run_config(&self, config: &ChainConfig, raw: Value) -> Result<Value> {
        let chain = config.build()?;
        self.run(&chain, raw)
    }
}

impl fmt::Debug for PipelineInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineInvoker")
            .field("lookup", &self.lookup.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;
    use crate::lookup::{InMemoryDirectory, StaticEntry};
    use crate::transform::{Transform, TransformDescriptor};

    #[test]
    fn test_invoker_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PipelineInvoker>();
        assert_send_sync::<TransformChain>();
    }

    #[test]
    fn test_run_with_lookup_and_trace() {
        let directory = InMemoryDirectory::new(vec![StaticEntry::new()
            .with_attribute("uid", "ada")
            .with_attribute("mail", "Ada@Example.com")]);
        let sink = Arc::new(RecordingDiagnostics::new());
        let invoker = PipelineInvoker::new()
            .with_lookup(Arc::new(directory))
            .with_diagnostics(sink.clone());

        let config = ChainConfig::new(vec![
            TransformDescriptor::new("LookupMVValue")
                .with("LookupAttributeName", "uid")
                .with("ExtractValueFromAttribute", "mail"),
            TransformDescriptor::new("ToLower"),
        ]);
        let out = invoker.run_config(&config, Value::string("ada")).unwrap();
        assert_eq!(out, Value::string("ada@example.com"));

        let steps: Vec<_> = sink
            .records()
            .into_iter()
            .filter(|r| r.message == "step")
            .collect();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].get("variant"), Some("LookupMVValue"));
    }

    #[test]
    fn test_trace_sink_does_not_change_results() {
        let chain = TransformChain::new(vec![Transform::Trim, Transform::ToUpper]);
        let quiet = PipelineInvoker::new().with_diagnostics(Arc::new(crate::NullDiagnostics));
        let loud = PipelineInvoker::new().with_diagnostics(Arc::new(RecordingDiagnostics::new()));
        let input = Value::string("  mixed Case ");
        assert_eq!(
            quiet.run(&chain, input.clone()).unwrap(),
            loud.run(&chain, input).unwrap()
        );
    }
}
