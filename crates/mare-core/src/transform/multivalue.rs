//! Multi-valued transforms
//!
//! Both transforms coerce their input with [`to_multi_value`] and report each
//! element they visit to the execution context's trace sink.
//!
//! Copyright (c) 2025 MARE Team
//! Licensed under the Apache-2.0 license

use super::types::TransformError;
use crate::coercion::to_multi_value;
use crate::context::ExecutionContext;
use crate::diagnostics::TraceRecord;
use crate::value::Value;
use regex::Regex;

/// Join every element with `separator`
///
/// An empty sequence joins to the empty string.
pub(super) fn concatenate(
    value: Value,
    separator: &str,
    ctx: &ExecutionContext<'_>,
) -> Result<Value, TransformError> {
    if value.is_absent() {
        return Ok(value);
    }
    let values = to_multi_value(value)?;
    let mut parts = Vec::with_capacity(values.len());
    for scalar in &values {
        let text = scalar.text();
        ctx.trace(|| TraceRecord::new("source-value").field("value", &text));
        parts.push(text);
    }
    Ok(Value::string(parts.join(separator)))
}

/// Drop every element matching `pattern`, keeping the rest in order
pub(super) fn remove_if_match(
    value: Value,
    pattern: &Regex,
    ctx: &ExecutionContext<'_>,
) -> Result<Value, TransformError> {
    if value.is_absent() {
        return Ok(value);
    }
    let values = to_multi_value(value)?;
    let kept = values
        .into_iter()
        .filter(|scalar| {
            let text = scalar.text();
            let matched = pattern.is_match(&text);
            ctx.trace(|| {
                TraceRecord::new(if matched { "removing-value" } else { "keeping-value" })
                    .field("value", &text)
            });
            !matched
        })
        .collect();
    Ok(Value::MultiValue(kept))
}
