//! Ordered transform chains
//!
//! A chain threads one value through its steps left to right. The first step
//! that fails aborts the evaluation; the error names the step's position,
//! variant and parameters. An empty chain returns its input unchanged.
//!
//! Copyright (c) 2025 MARE Team
//! Licensed under the Apache-2.0 license

use super::descriptor::TransformDescriptor;
use super::types::Transform;
use crate::config::ChainConfig;
use crate::context::ExecutionContext;
use crate::diagnostics::TraceRecord;
use crate::error::{Error, Result};
use crate::value::Value;

/// An immutable, validated sequence of transforms
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformChain {
    name: Option<String>,
    steps: Vec<Transform>,
}

impl TransformChain {
    /// Create an unnamed chain
    pub fn new(steps: Vec<Transform>) -> Self {
        Self { name: None, steps }
    }

    /// Create a named chain
    pub fn named(name: impl Into<String>, steps: Vec<Transform>) -> Self {
        Self {
            name: Some(name.into()),
            steps,
        }
    }

    /// Build an unnamed chain from serialized steps, failing on the first invalid one
    pub fn from_descriptors<'d, I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'d TransformDescriptor>,
    {
        let steps = descriptors
            .into_iter()
            .enumerate()
            .map(|(position, descriptor)| {
                Transform::from_descriptor(descriptor).map_err(|e| e.at_position(position))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(steps))
    }

    /// Build a chain from its configuration document
    pub fn from_config(config: &ChainConfig) -> Result<Self> {
        let mut chain = Self::from_descriptors(&config.transforms)?;
        chain.name = config.name.clone();
        Ok(chain)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn steps(&self) -> &[Transform] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Evaluate the chain against one value
    ///
    /// Emits one `step` trace record per step carrying the value before and
    /// after it, when the context has a listening sink. The failing step's
    /// record carries the error instead of `after`.
    pub fn apply(&self, value: Value, ctx: &mut ExecutionContext<'_>) -> Result<Value> {
        let mut current = value;

        for (position, step) in self.steps.iter().enumerate() {
            ctx.enter_step(position, step.name());
            let before = ctx.is_tracing().then(|| current.to_string());

            current = match step.convert(current, ctx) {
                Ok(converted) => converted,
                Err(source) => {
                    if let Some(before) = before {
                        ctx.trace(|| {
                            TraceRecord::new("step")
                                .field("before", before)
                                .field("error", &source)
                        });
                    }
                    return Err(Error::Transform {
                        position,
                        variant: step.name().to_string(),
                        parameters: step.describe_parameters(),
                        source,
                    });
                }
            };

            if let Some(before) = before {
                ctx.trace(|| {
                    TraceRecord::new("step")
                        .field("before", before)
                        .field("after", &current)
                });
            }
        }

        Ok(current)
    }
}
