//! Builder for creating transform chains
//!
//! This module provides a fluent builder API for assembling chains from typed
//! transforms and serialized descriptors. Descriptors are validated when the
//! chain is built.
//!
//! Copyright (c) 2025 MARE Team
//! Licensed under the Apache-2.0 license

use super::chain::TransformChain;
use super::descriptor::TransformDescriptor;
use super::types::Transform;
use crate::error::Result;

enum Step {
    Ready(Transform),
    Pending(TransformDescriptor),
}

/// Builder for creating transform chains
#[derive(Default)]
pub struct ChainBuilder {
    name: Option<String>,
    steps: Vec<Step>,
}

impl ChainBuilder {
    /// Create a new, empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chain name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a typed transform
    pub fn step(mut self, transform: Transform) -> Self {
        self.steps.push(Step::Ready(transform));
        self
    }

    /// Append several typed transforms
    pub fn steps<I>(mut self, transforms: I) -> Self
    where
        I: IntoIterator<Item = Transform>,
    {
        self.steps.extend(transforms.into_iter().map(Step::Ready));
        self
    }

    /// Append a serialized step, validated in [`build`](Self::build)
    pub fn descriptor(mut self, descriptor: TransformDescriptor) -> Self {
        self.steps.push(Step::Pending(descriptor));
        self
    }

    /// Build the chain
    pub fn build(self) -> Result<TransformChain> {
        let steps = self
            .steps
            .into_iter()
            .enumerate()
            .map(|(position, step)| match step {
                Step::Ready(transform) => Ok(transform),
                Step::Pending(descriptor) => {
                    Transform::from_descriptor(&descriptor).map_err(|e| e.at_position(position))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(match self.name {
            Some(name) => TransformChain::named(name, steps),
            None => TransformChain::new(steps),
        })
    }
}
