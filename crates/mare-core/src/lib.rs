//! MARE Core - attribute value transformation for identity synchronization
//!
//! This crate evaluates the value transforms attached to attribute flow rules:
//! a closed catalog of string, date, identity, bit-flag, lookup and
//! multi-value conversions, composed into ordered chains.
//!
//! # Main Components
//!
//! - **Values**: [`Value`] and [`Scalar`], plus raw-format decoders in [`coercion`]
//! - **Transforms**: the catalog, its configuration factory and chains in [`transform`]
//! - **Collaborators**: [`ExternalLookup`] for entry lookups, [`Diagnostics`] for traces
//! - **Entry point**: [`PipelineInvoker::run`]
//! - **Error Handling**: [`Error`] and the [`ErrorKind`] taxonomy, using `thiserror` and `anyhow`
//!
//! # Example
//!
//! ```
//! use mare_core::{ConfigDocument, PipelineInvoker, Value};
//!
//! fn example() -> mare_core::Result<()> {
//!     let doc = ConfigDocument::from_json_str(
//!         r#"{"transforms": [{"type": "Trim"}, {"type": "ToLower"}]}"#,
//!     )?;
//!     let chain = doc.select(None)?.build()?;
//!     let out = PipelineInvoker::new().run(&chain, Value::string("  Ada@Example.COM "))?;
//!     assert_eq!(out, Value::string("ada@example.com"));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod coercion;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod invoker;
pub mod lookup;
pub mod transform;
pub mod value;

// Re-export main types for convenience
pub use config::{ChainConfig, ConfigDocument, PipelineConfig};
pub use context::ExecutionContext;
pub use diagnostics::{
    Diagnostics, NullDiagnostics, RecordingDiagnostics, TraceRecord, TracingDiagnostics,
};
pub use error::{Error, ErrorKind, Result};
pub use invoker::PipelineInvoker;
pub use lookup::{Connector, Entry, ExternalLookup, InMemoryDirectory, StaticEntry};
pub use transform::{
    ChainBuilder, Transform, TransformChain, TransformDescriptor, TransformError, TransformKind,
};
pub use value::{Scalar, Value, ValueCollection};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Evaluate a chain configuration once with no lookup and `tracing` diagnostics
pub fn run(config: &ChainConfig, raw: Value) -> Result<Value> {
    PipelineInvoker::new().run_config(config, raw)
}
