//! Attribute value transforms
//!
//! This module holds the closed catalog of value transforms used by attribute
//! flow rules, the configuration factory that builds them, and the chains that
//! apply them in order.
//!
//! # Module Organization
//!
//! - [`types`] - The transform enum, catalog introspection and step errors
//! - [`descriptor`] - Serialized steps and the validating factory
//! - [`chain`] - Ordered evaluation of a list of transforms
//! - [`builder`] - Fluent builder API for assembling chains
//! - `catalog` - Dispatch from each variant to its implementation
//! - `text`, `dates`, `identity`, `bits`, `lookup`, `multivalue` - Variant families
//!
//! # Examples
//!
//! ```
//! use mare_core::{ChainBuilder, ExecutionContext, Transform, TransformDescriptor, Value};
//!
//! let chain = ChainBuilder::new()
//!     .step(Transform::ToUpper)
//!     .step(Transform::Trim)
//!     .descriptor(
//!         TransformDescriptor::new("Substring")
//!             .with("StartIndex", 0)
//!             .with("Length", 3),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mut ctx = ExecutionContext::new();
//! let out = chain.apply(Value::string(" abcdef "), &mut ctx).unwrap();
//! assert_eq!(out, Value::string("ABC"));
//! ```
//!
//! Copyright (c) 2025 MARE Team
//! Licensed under the Apache-2.0 license

// Core types and error definitions
pub mod types;

// Configuration factory
pub mod descriptor;

// Chain evaluation
pub mod chain;

// Chain builder API
pub mod builder;

// Date pattern handling, public for hosts that reuse the format language
pub mod dates;

mod bits;
mod catalog;
mod identity;
mod lookup;
mod multivalue;
mod text;


pub use builder::ChainBuilder;
pub use chain::TransformChain;
pub use dates::{DateInput, DatePattern};
pub use descriptor::TransformDescriptor;
pub use types::{
    DateType, Extraction, ParameterSpec, ParameterType, SidType, Transform, TransformError,
    TransformKind, DN_EXTRACTION_MARKER,
};
