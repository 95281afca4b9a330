//! Chain configuration documents
//!
//! A document holds either one chain:
//!
//! ```json
//! {"name": "displayName", "transforms": [{"type": "Trim"}]}
//! ```
//!
//! or several named chains under `chains`. Both shapes deserialize from JSON
//! or YAML through serde. The shape is chosen by the presence of a `chains`
//! key, and unknown keys are rejected in both.

use crate::error::{Error, Result};
use crate::transform::{TransformChain, TransformDescriptor};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Configuration of one chain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub transforms: Vec<TransformDescriptor>,
}

impl ChainConfig {
    pub fn new(transforms: Vec<TransformDescriptor>) -> Self {
        Self {
            name: None,
            transforms,
        }
    }

    /// Set the chain name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parse a single-chain JSON document
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validate and build the chain
    pub fn build(&self) -> Result<TransformChain> {
        TransformChain::from_config(self)
    }
}

/// Several named chains in one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub chains: Vec<ChainConfig>,
}

impl PipelineConfig {
    /// Find a chain by name
    pub fn chain(&self, name: &str) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.name.as_deref() == Some(name))
    }

    /// Build every chain, failing on the first invalid one
    pub fn build(&self) -> Result<Vec<TransformChain>> {
        self.chains.iter().map(ChainConfig::build).collect()
    }
}

/// Either configuration shape
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigDocument {
    Pipeline(PipelineConfig),
    Chain(ChainConfig),
}

impl<'de> Deserialize<'de> for ConfigDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        let is_pipeline = json.as_object().map_or(false, |o| o.contains_key("chains"));
        if is_pipeline {
            serde_json::from_value(json)
                .map(ConfigDocument::Pipeline)
                .map_err(de::Error::custom)
        } else {
            serde_json::from_value(json)
                .map(ConfigDocument::Chain)
                .map_err(de::Error::custom)
        }
    }
}

impl ConfigDocument {
    /// Parse a JSON document of either shape
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The chain configurations the document holds, in document order
    pub fn chains(&self) -> Vec<&ChainConfig> {
        match self {
            ConfigDocument::Pipeline(pipeline) => pipeline.chains.iter().collect(),
            ConfigDocument::Chain(chain) => vec![chain],
        }
    }

    /// Select one chain
    ///
    /// With a name, the chain of that name. Without one, the only chain of
    /// the document.
    pub fn select(&self, name: Option<&str>) -> Result<&ChainConfig> {
        let chains = self.chains();
        match name {
            Some(name) => chains
                .into_iter()
                .find(|c| c.name.as_deref() == Some(name))
                .ok_or_else(|| Error::config(format!("no chain named '{}'", name))),
            None => match chains.as_slice() {
                [only] => Ok(only),
                [] => Err(Error::config("document contains no chains")),
                _ => Err(Error::config(format!(
                    "document contains {} chains; select one by name",
                    chains.len()
                ))),
            },
        }
    }
}
