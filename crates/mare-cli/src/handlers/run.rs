//! Run command handler

use super::{load_directory, load_document};
use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use mare_core::{PipelineInvoker, RecordingDiagnostics, TraceRecord, Value};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Machine-readable result of one evaluation
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    chain: Option<&'a str>,
    input: &'a Value,
    output: &'a Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    trace: Vec<TraceRecord>,
}

/// Handle the run command
#[instrument(skip(config, output), fields(file = %args.chain_file.display(), chain = ?args.chain))]
pub fn handle_run(args: RunArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {

    let document = load_document(&args.chain_file)?;
    let chain = document.select(args.chain.as_deref())?.build()?;
    let input = input_value(&args)?;
    info!(steps = chain.len(), input = %input, "Evaluating chain");

    let mut invoker = PipelineInvoker::new();
    if let Some(path) = args.directory.as_ref().or(config.directory.as_ref()) {
        invoker = invoker.with_lookup(Arc::new(load_directory(path)?));
    }
    let recorder = args.trace.then(|| Arc::new(RecordingDiagnostics::new()));
    if let Some(recorder) = &recorder {
        invoker = invoker.with_diagnostics(recorder.clone());
    }

    output.info(&format!(
        "Running chain '{}' ({} step(s))",
        chain.name().unwrap_or("<unnamed>"),
        chain.len()
    ))?;

    let result = invoker.run(&chain, input.clone());
    let trace = recorder.map(|r| r.records()).unwrap_or_default();

    let value = match result {
        Ok(value) => value,
        Err(e) => {
            // The steps that ran before the failure are still worth showing
            if !trace.is_empty() {
                write_trace(output, &trace)?;
            }
            return Err(e.into());
        }
    };

    if output.is_human() {
        if output.verbosity() > 0 {
            output.info(&format!("Input: {}", input))?;
        }
        output.section("Result")?;
        write_value(output, &value)?;
        if !trace.is_empty() {
            write_trace(output, &trace)?;
        }
    } else {
        output.data(&RunReport {
            chain: chain.name(),
            input: &input,
            output: &value,
            trace,
        })?;
    }

    Ok(())
}

/// Build the input value from the command-line flags
fn input_value(args: &RunArgs) -> Result<Value> {
    if args.absent {
        return Ok(Value::Absent);
    }
    match args.values.as_slice() {
        [] if args.multi => Ok(Value::strings(Vec::<String>::new())),
        [] => Err(Error::invalid_args("provide at least one --value, or --absent")),
        [single] if !args.multi => Ok(Value::string(single.clone())),
        many => Ok(Value::strings(many.iter().cloned())),
    }
}

fn write_value(output: &mut OutputWriter, value: &Value) -> Result<()> {
    match value {
        Value::MultiValue(values) => {
            for v in values {
                output.writeln(&v.to_string())?;
            }
            Ok(())
        }
        other => output.writeln(&other.to_string()),
    }
}

fn write_trace(output: &mut OutputWriter, trace: &[TraceRecord]) -> Result<()> {
    output.section("Trace")?;
    for record in trace {
        output.writeln(&record.to_string())?;
    }
    Ok(())
}
