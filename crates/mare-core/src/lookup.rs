//! External entry lookup boundary
//!
//! `LookupMVValue` resolves values against a store of entries the host owns.
//! The core only sees the [`ExternalLookup`] and [`Entry`] traits; the
//! [`InMemoryDirectory`] here is a reference collaborator for tests and the
//! command-line harness.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A linkage between an entry and one connected system's copy of it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    /// Distinguished-name-like identifier in the connected system
    pub distinguished_name: String,
}

impl Connector {
    pub fn new(distinguished_name: impl Into<String>) -> Self {
        Self {
            distinguished_name: distinguished_name.into(),
        }
    }
}

/// An entry returned by an [`ExternalLookup`]
pub trait Entry: fmt::Debug + Send + Sync {
    /// Value of a named attribute, `None` when the attribute is not present
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Connectors under a named system, `None` when the entry has no link to it
    fn connectors(&self, system: &str) -> Option<Vec<Connector>>;
}

/// Host-provided search over entries
///
/// Calls are blocking. A "no match" outcome is an empty list, never an error;
/// errors mean the store could not be searched.
pub trait ExternalLookup: Send + Sync {
    fn find_entries(
        &self,
        attribute: &str,
        value: &str,
        max_results: usize,
    ) -> anyhow::Result<Vec<Box<dyn Entry>>>;
}

/// Entry backed by plain maps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticEntry {
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    /// Connectors keyed by connected system name
    #[serde(default)]
    pub connectors: BTreeMap<String, Vec<Connector>>,
}

impl StaticEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a connector under a system
    pub fn with_connector(mut self, system: impl Into<String>, distinguished_name: impl Into<String>) -> Self {
        self.connectors
            .entry(system.into())
            .or_default()
            .push(Connector::new(distinguished_name));
        self
    }

    fn matches(&self, attribute: &str, value: &str) -> bool {
        match self.attributes.get(attribute) {
            Some(Value::Scalar(scalar)) => scalar.text() == value,
            Some(Value::MultiValue(values)) => values.iter().any(|v| v.text() == value),
            Some(Value::Collection(collection)) => {
                collection.string_values().iter().any(|v| v == value)
            }
            Some(Value::Absent) | None => false,
        }
    }
}

impl Entry for StaticEntry {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes
            .get(name)
            .filter(|value| !value.is_absent())
            .cloned()
    }

    fn connectors(&self, system: &str) -> Option<Vec<Connector>> {
        self.connectors.get(system).cloned()
    }
}

/// In-memory [`ExternalLookup`] over a fixed list of entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryDirectory {
    #[serde(default)]
    pub entries: Vec<StaticEntry>,
}

impl InMemoryDirectory {
    pub fn new(entries: Vec<StaticEntry>) -> Self {
        Self { entries }
    }

    /// Load a directory from JSON text
    pub fn from_json_str(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ExternalLookup for InMemoryDirectory {
    fn find_entries(
        &self,
        attribute: &str,
        value: &str,
        max_results: usize,
    ) -> anyhow::Result<Vec<Box<dyn Entry>>> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.matches(attribute, value))
            .take(max_results)
            .map(|entry| Box::new(entry.clone()) as Box<dyn Entry>)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::new(vec![
            StaticEntry::new()
                .with_attribute("employeeID", "1001")
                .with_attribute("displayName", "Ada Lovelace")
                .with_connector("AD", "CN=Ada,OU=Staff,DC=corp,DC=example"),
            StaticEntry::new()
                .with_attribute("employeeID", "1002")
                .with_attribute("proxyAddresses", Value::strings(["smtp:a@x", "smtp:b@x"])),
        ])
    }

    #[test]
    fn test_find_by_scalar_attribute() {
        let found = directory().find_entries("employeeID", "1001", 1).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].attribute("displayName"), Some(Value::string("Ada Lovelace")));
        let connectors = found[0].connectors("AD").unwrap();
        assert_eq!(connectors[0].distinguished_name, "CN=Ada,OU=Staff,DC=corp,DC=example");
    }

    #[test]
    fn test_find_by_multi_valued_attribute() {
        let found = directory().find_entries("proxyAddresses", "smtp:b@x", 5).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].attribute("employeeID"), Some(Value::string("1002")));
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(directory().find_entries("employeeID", "9999", 1).unwrap().is_empty());
    }

    #[test]
    fn test_max_results_is_respected() {
        let mut dir = directory();
        dir.entries.push(StaticEntry::new().with_attribute("employeeID", "1001"));
        assert_eq!(dir.find_entries("employeeID", "1001", 1).unwrap().len(), 1);
        assert_eq!(dir.find_entries("employeeID", "1001", 10).unwrap().len(), 2);
    }

    #[test]
    fn test_load_from_json() {
        let dir = InMemoryDirectory::from_json_str(
            r#"{"entries": [{"attributes": {"uid": "x"}, "connectors": {"AD": [{"distinguished_name": "CN=x"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.entries[0].connectors("AD").unwrap().len(), 1);
    }
}
