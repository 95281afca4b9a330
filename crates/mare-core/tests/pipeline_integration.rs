//! End-to-end tests for chain evaluation through the public API
//!
//! These tests build chains from JSON configuration and run them through the
//! pipeline invoker the way a synchronization host would.

use mare_core::{
    ChainConfig, ConfigDocument, ErrorKind, PipelineInvoker, RecordingDiagnostics, Scalar, Value,
};
use serde_json::json;
use std::sync::Arc;

fn chain(transforms: serde_json::Value) -> ChainConfig {
    serde_json::from_value(json!({ "transforms": transforms })).expect("valid chain config")
}

fn run(transforms: serde_json::Value, input: Value) -> mare_core::Result<Value> {
    PipelineInvoker::new().run_config(&chain(transforms), input)
}

#[test]
fn test_upper_trim_substring_chain() {
    let out = run(
        json!([
            {"type": "ToUpper"},
            {"type": "Trim"},
            {"type": "Substring", "StartIndex": 0, "Length": 3}
        ]),
        Value::string(" abcdef "),
    )
    .unwrap();
    assert_eq!(out, Value::string("ABC"));
}

#[test]
fn test_file_time_to_date() {
    let out = run(
        json!([{"type": "FormatDate", "DateType": "FileTimeUTC", "ToFormat": "yyyy-MM-dd"}]),
        Value::string("132223104000000000"),
    )
    .unwrap();
    assert_eq!(out, Value::string("2020-01-01"));
}

#[test]
fn test_bit_flags() {
    let is_set = run(json!([{"type": "IsBitSet", "BitPosition": 3}]), Value::string("8")).unwrap();
    let is_not_set = run(json!([{"type": "IsBitNotSet", "BitPosition": 3}]), Value::string("8")).unwrap();
    assert_eq!(is_set, Value::string("True"));
    assert_eq!(is_not_set, Value::string("False"));

    let set = run(
        json!([{"type": "SetBit", "BitPosition": 0, "Value": true}]),
        Value::string("0"),
    )
    .unwrap();
    let clear = run(
        json!([{"type": "SetBit", "BitPosition": 0, "Value": false}]),
        Value::string("1"),
    )
    .unwrap();
    assert_eq!(set, Value::string("1"));
    assert_eq!(clear, Value::string("0"));

    let err = run(
        json!([{"type": "SetBit", "BitPosition": 32, "Value": true}]),
        Value::string("0"),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
}

#[test]
fn test_remove_matching_values() {
    let out = run(
        json!([{"type": "MultiValueRemoveIfNotMatch", "Pattern": "^admin"}]),
        Value::strings(["admin1", "user1", "admin2"]),
    )
    .unwrap();
    assert_eq!(out, Value::strings(["user1"]));
}

#[test]
fn test_remove_then_concatenate() {
    let out = run(
        json!([
            {"type": "MultiValueRemoveIfNotMatch", "Pattern": "^x500:"},
            {"type": "MultiValueConcatenate", "Separator": ";"}
        ]),
        Value::strings(["smtp:ada@example.com", "X500:/o=Contoso", "sip:ada@example.com"]),
    )
    .unwrap();
    assert_eq!(out, Value::string("smtp:ada@example.com;sip:ada@example.com"));
}

#[test]
fn test_regex_select_fails_whatever_the_input() {
    for input in [Value::Absent, Value::string(""), Value::string("abc")] {
        let err = run(json!([{"type": "RegexSelect"}]), input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
    }
}

#[test]
fn test_failure_aborts_chain_and_names_step() {
    let err = run(
        json!([
            {"type": "Trim"},
            {"type": "IsBitSet", "BitPosition": 2},
            {"type": "ToUpper"}
        ]),
        Value::string(" not a number "),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(err.position(), Some(1));
    let message = err.to_string();
    assert!(message.contains("IsBitSet"), "{}", message);
}

#[test]
fn test_configuration_errors_fail_before_evaluation() {
    let sink = Arc::new(RecordingDiagnostics::new());
    let invoker = PipelineInvoker::new().with_diagnostics(sink.clone());
    let config = chain(json!([
        {"type": "ToUpper"},
        {"type": "RegexIsMatch", "Pattern": "[unclosed"}
    ]));
    let err = invoker.run_config(&config, Value::string("x")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(err.position(), Some(1));
    assert!(sink.records().is_empty());
}

#[test]
fn test_absent_flows_through_whole_chain() {
    let out = run(
        json!([
            {"type": "Trim"},
            {"type": "PadLeft", "TotalWidth": 8, "PaddingChar": "0"},
            {"type": "FormatDate", "DateType": "BestGuess"},
            {"type": "Base64ToGUID"}
        ]),
        Value::Absent,
    )
    .unwrap();
    assert_eq!(out, Value::Absent);
}

#[test]
fn test_absent_becomes_false_value_in_regex_is_match() {
    let out = run(
        json!([
            {"type": "RegexIsMatch", "Pattern": ".", "TrueValue": "yes", "FalseValue": "no"},
            {"type": "ToUpper"}
        ]),
        Value::Absent,
    )
    .unwrap();
    assert_eq!(out, Value::string("NO"));
}

#[test]
fn test_base64_guid_then_text() {
    let out = run(
        json!([{"type": "Base64ToGUID"}, {"type": "ToUpper"}]),
        Value::string("AAECAwQFBgcICQoLDA0ODw=="),
    )
    .unwrap();
    assert_eq!(out, Value::string("03020100-0504-0706-0809-0A0B0C0D0E0F"));
}

#[test]
fn test_multi_document_selects_by_name() {
    let doc = ConfigDocument::from_json_str(
        &json!({
            "chains": [
                {"name": "sAMAccountName", "transforms": [{"type": "ToLower"}, {"type": "Substring", "StartIndex": 0, "Length": 20}]},
                {"name": "employeeNumber", "transforms": [{"type": "PadLeft", "TotalWidth": 6, "PaddingChar": "0"}]}
            ]
        })
        .to_string(),
    )
    .unwrap();
    let config = doc.select(Some("employeeNumber")).unwrap();
    let out = PipelineInvoker::new()
        .run_config(config, Value::Scalar(Scalar::Integer(42)))
        .unwrap();
    assert_eq!(out, Value::string("000042"));
}

#[test]
fn test_top_level_run() {
    let config = chain(json!([{"type": "Replace", "OldValue": " ", "NewValue": "."}]));
    assert_eq!(
        mare_core::run(&config, Value::string("Ada King")).unwrap(),
        Value::string("Ada.King")
    );
}
