//! `LookupMVValue`: resolve a value through the host's entry store
//!
//! Copyright (c) 2025 MARE Team
//! Licensed under the Apache-2.0 license

use super::text::scalar_text;
use super::types::{Extraction, TransformError};
use crate::context::ExecutionContext;
use crate::diagnostics::TraceRecord;
use crate::value::Value;

/// At most this many entries are requested per lookup
const MAX_RESULTS: usize = 1;

pub(super) fn lookup_mv_value(
    value: Value,
    lookup_attribute_name: &str,
    extraction: &Extraction,
    ctx: &ExecutionContext<'_>,
) -> Result<Value, TransformError> {
    if value.is_absent() {
        return Ok(value);
    }
    let key = scalar_text(&value)?.unwrap_or_default().into_owned();

    let lookup = ctx.lookup().ok_or_else(|| TransformError::LookupFailure {
        attribute: lookup_attribute_name.to_string(),
        value: key.clone(),
        source: anyhow::anyhow!("no entry lookup is attached to the execution context"),
    })?;

    let entries = lookup
        .find_entries(lookup_attribute_name, &key, MAX_RESULTS)
        .map_err(|source| TransformError::LookupFailure {
            attribute: lookup_attribute_name.to_string(),
            value: key.clone(),
            source,
        })?;

    let Some(entry) = entries.into_iter().next() else {
        ctx.trace(|| {
            TraceRecord::new("lookup-no-match")
                .field("attribute", lookup_attribute_name)
                .field("value", &key)
        });
        return Ok(Value::Absent);
    };

    let resolved = match extraction {
        Extraction::DistinguishedName { system } => {
            let connectors = entry.connectors(system).unwrap_or_default();
            ctx.trace(|| {
                TraceRecord::new("lookup-connectors")
                    .field("system", system)
                    .field("count", connectors.len())
            });
            match connectors.as_slice() {
                [single] => Value::string(single.distinguished_name.clone()),
                _ => Value::Absent,
            }
        }
        Extraction::Attribute(name) => entry.attribute(name).unwrap_or_default(),
    };
    Ok(resolved)
}
