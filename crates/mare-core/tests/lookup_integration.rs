//! Integration tests for `LookupMVValue` against host lookups

use mare_core::{
    ChainConfig, Connector, Entry, ErrorKind, ExternalLookup, InMemoryDirectory, PipelineInvoker,
    StaticEntry, Value,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

fn lookup_chain(extract: &str, system: Option<&str>) -> ChainConfig {
    let mut step = json!({
        "type": "LookupMVValue",
        "LookupAttributeName": "employeeID",
        "ExtractValueFromAttribute": extract,
    });
    if let Some(system) = system {
        step["MAName"] = json!(system);
    }
    serde_json::from_value(json!({ "transforms": [step] })).unwrap()
}

fn directory() -> InMemoryDirectory {
    InMemoryDirectory::from_json_str(
        &json!({
            "entries": [
                {
                    "attributes": {"employeeID": "1001", "department": "Research"},
                    "connectors": {"Fabrikam AD": [{"distinguished_name": "CN=Ada,OU=R,DC=fabrikam,DC=com"}]}
                },
                {
                    "attributes": {"employeeID": "1002"},
                    "connectors": {"Fabrikam AD": []}
                }
            ]
        })
        .to_string(),
    )
    .unwrap()
}

/// Lookup that counts calls and records the requested result limit
#[derive(Default)]
struct CountingLookup {
    calls: AtomicUsize,
    last_max_results: AtomicUsize,
}

impl ExternalLookup for CountingLookup {
    fn find_entries(
        &self,
        _attribute: &str,
        value: &str,
        max_results: usize,
    ) -> anyhow::Result<Vec<Box<dyn Entry>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_max_results.store(max_results, Ordering::SeqCst);
        Ok(vec![Box::new(StaticEntry::new().with_attribute("echo", value))])
    }
}

/// Entry with a custom connector layout
#[derive(Debug)]
struct TwoSystems;

impl Entry for TwoSystems {
    fn attribute(&self, _name: &str) -> Option<Value> {
        None
    }

    fn connectors(&self, system: &str) -> Option<Vec<Connector>> {
        match system {
            "HR" => Some(vec![Connector::new("uid=7,ou=hr")]),
            _ => None,
        }
    }
}

struct FixedLookup;

impl ExternalLookup for FixedLookup {
    fn find_entries(&self, _: &str, _: &str, _: usize) -> anyhow::Result<Vec<Box<dyn Entry>>> {
        Ok(vec![Box::new(TwoSystems)])
    }
}

struct BrokenLookup;

impl ExternalLookup for BrokenLookup {
    fn find_entries(&self, _: &str, _: &str, _: usize) -> anyhow::Result<Vec<Box<dyn Entry>>> {
        Err(anyhow::anyhow!("metaverse unavailable"))
    }
}

#[test]
fn test_attribute_extraction() {
    let invoker = PipelineInvoker::new().with_lookup(Arc::new(directory()));
    let config = lookup_chain("department", None);
    assert_eq!(
        invoker.run_config(&config, Value::string("1001")).unwrap(),
        Value::string("Research")
    );
    assert_eq!(invoker.run_config(&config, Value::string("1002")).unwrap(), Value::Absent);
    assert_eq!(invoker.run_config(&config, Value::string("4040")).unwrap(), Value::Absent);
}

#[test]
fn test_dn_extraction() {
    let invoker = PipelineInvoker::new().with_lookup(Arc::new(directory()));
    let config = lookup_chain("[DN]", Some("Fabrikam AD"));
    assert_eq!(
        invoker.run_config(&config, Value::string("1001")).unwrap(),
        Value::string("CN=Ada,OU=R,DC=fabrikam,DC=com")
    );
    // zero connectors
    assert_eq!(invoker.run_config(&config, Value::string("1002")).unwrap(), Value::Absent);
}

#[test]
fn test_custom_entry_implementation() {
    let invoker = PipelineInvoker::new().with_lookup(Arc::new(FixedLookup));
    let hr = lookup_chain("[DN]", Some("HR"));
    let other = lookup_chain("[DN]", Some("Payroll"));
    assert_eq!(
        invoker.run_config(&hr, Value::string("x")).unwrap(),
        Value::string("uid=7,ou=hr")
    );
    assert_eq!(invoker.run_config(&other, Value::string("x")).unwrap(), Value::Absent);
}

#[test]
fn test_single_entry_is_requested_and_absent_skips_lookup() {
    let lookup = Arc::new(CountingLookup::default());
    let invoker = PipelineInvoker::new().with_lookup(lookup.clone());
    let config = lookup_chain("echo", None);

    assert_eq!(invoker.run_config(&config, Value::string("v")).unwrap(), Value::string("v"));
    assert_eq!(lookup.last_max_results.load(Ordering::SeqCst), 1);

    assert_eq!(invoker.run_config(&config, Value::Absent).unwrap(), Value::Absent);
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_collaborator_error_is_lookup_failure() {
    let invoker = PipelineInvoker::new().with_lookup(Arc::new(BrokenLookup));
    let err = invoker
        .run_config(&lookup_chain("department", None), Value::string("1001"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LookupFailure);
    assert!(err.to_string().contains("LookupMVValue"));
}

#[test]
fn test_concurrent_invocations_share_one_chain() {
    let invoker = Arc::new(PipelineInvoker::new().with_lookup(Arc::new(CountingLookup::default())));
    let chain = Arc::new(
        serde_json::from_value::<ChainConfig>(json!({
            "transforms": [
                {"type": "LookupMVValue", "LookupAttributeName": "id", "ExtractValueFromAttribute": "echo"},
                {"type": "PadLeft", "TotalWidth": 5, "PaddingChar": "0"}
            ]
        }))
        .unwrap()
        .build()
        .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let invoker = Arc::clone(&invoker);
            let chain = Arc::clone(&chain);
            thread::spawn(move || invoker.run(&chain, Value::string(i.to_string())).unwrap())
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Value::string(format!("{:0>5}", i)));
    }
}
