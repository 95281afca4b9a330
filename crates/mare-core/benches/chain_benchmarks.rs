//! Benchmarks for chain construction and evaluation
//!
//! Copyright (c) 2025 MARE Team
//! Licensed under the Apache-2.0 license

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mare_core::{
    ChainConfig, ExecutionContext, InMemoryDirectory, NullDiagnostics, PipelineInvoker,
    StaticEntry, TransformChain, Value,
};
use serde_json::json;
use std::sync::Arc;

fn string_chain() -> ChainConfig {
    serde_json::from_value(json!({
        "name": "displayName",
        "transforms": [
            {"type": "Trim"},
            {"type": "ToUpper"},
            {"type": "RegexReplace", "Pattern": "\\s+", "Replacement": " "},
            {"type": "Substring", "StartIndex": 0, "Length": 64},
            {"type": "PadRight", "TotalWidth": 64, "PaddingChar": "."}
        ]
    }))
    .unwrap()
}

fn date_chain() -> ChainConfig {
    serde_json::from_value(json!({
        "transforms": [
            {"type": "FormatDate", "DateType": "FileTimeUTC", "ToFormat": "yyyy-MM-dd'T'HH:mm:ss.fffK"}
        ]
    }))
    .unwrap()
}

fn bench_construction(c: &mut Criterion) {
    let config = string_chain();
    c.bench_function("build_string_chain", |b| {
        b.iter(|| TransformChain::from_config(black_box(&config)).unwrap())
    });
}

fn bench_string_chain(c: &mut Criterion) {
    let chain = string_chain().build().unwrap();
    let invoker = PipelineInvoker::new().with_diagnostics(Arc::new(NullDiagnostics));
    let mut group = c.benchmark_group("string_chain");

    for len in [8usize, 64, 512] {
        let input = format!("  {}  ", "lorem  ipsum ".repeat(len / 8));
        group.bench_with_input(BenchmarkId::from_parameter(len), &input, |b, input| {
            b.iter(|| invoker.run(&chain, black_box(Value::string(input.clone()))).unwrap())
        });
    }
    group.finish();
}

fn bench_date_chain(c: &mut Criterion) {
    let chain = date_chain().build().unwrap();
    c.bench_function("file_time_format", |b| {
        b.iter(|| {
            let mut ctx = ExecutionContext::new();
            chain
                .apply(black_box(Value::string("132223104000000000")), &mut ctx)
                .unwrap()
        })
    });
}

fn bench_multi_value(c: &mut Criterion) {
    let chain: TransformChain = serde_json::from_value::<ChainConfig>(json!({
        "transforms": [
            {"type": "MultiValueRemoveIfNotMatch", "Pattern": "^x500:"},
            {"type": "MultiValueConcatenate", "Separator": ";"}
        ]
    }))
    .unwrap()
    .build()
    .unwrap();
    let values: Vec<String> = (0..100)
        .map(|i| {
            if i % 4 == 0 {
                format!("X500:/o=Org/cn={}", i)
            } else {
                format!("smtp:user{}@example.com", i)
            }
        })
        .collect();

    c.bench_function("proxy_addresses_100", |b| {
        b.iter(|| {
            let mut ctx = ExecutionContext::new();
            chain.apply(black_box(Value::strings(values.iter().cloned())), &mut ctx).unwrap()
        })
    });
}

fn bench_lookup(c: &mut Criterion) {
    let entries = (0..1000)
        .map(|i| {
            StaticEntry::new()
                .with_attribute("employeeID", format!("{:05}", i))
                .with_attribute("mail", format!("user{}@example.com", i))
        })
        .collect();
    let invoker = PipelineInvoker::new()
        .with_lookup(Arc::new(InMemoryDirectory::new(entries)))
        .with_diagnostics(Arc::new(NullDiagnostics));
    let chain = serde_json::from_value::<ChainConfig>(json!({
        "transforms": [{"type": "LookupMVValue", "LookupAttributeName": "employeeID", "ExtractValueFromAttribute": "mail"}]
    }))
    .unwrap()
    .build()
    .unwrap();

    c.bench_function("lookup_in_1000_entries", |b| {
        b.iter(|| invoker.run(&chain, black_box(Value::string("00500"))).unwrap())
    });
}

criterion_group!(
    benches,
    bench_construction,
    bench_string_chain,
    bench_date_chain,
    bench_multi_value,
    bench_lookup
);
criterion_main!(benches);
