//! String-family transforms
//!
//! Case and whitespace normalization, literal and regex replacement, padding,
//! substring extraction and regex matching. Everything here counts characters,
//! never bytes.
//!
//! Copyright (c) 2025 MARE Team
//! Licensed under the Apache-2.0 license

use super::types::TransformError;
use crate::value::Value;
use regex::Regex;
use std::borrow::Cow;
use std::iter;

/// Error for a multi-valued input reaching a single-value transform
pub(super) fn expect_single(value: &Value) -> TransformError {
    TransformError::TypeMismatch {
        expected: "single value".to_string(),
        actual: value.type_name().to_string(),
    }
}

/// Text of a single value; `None` for absent
pub(super) fn scalar_text(value: &Value) -> Result<Option<Cow<'_, str>>, TransformError> {
    match value {
        Value::Absent => Ok(None),
        Value::Scalar(scalar) => Ok(Some(scalar.text())),
        other => Err(expect_single(other)),
    }
}

/// Apply `f` to the text of a single value
///
/// Absent values and empty strings are returned unchanged.
pub(super) fn map_text<F>(value: Value, f: F) -> Result<Value, TransformError>
where
    F: FnOnce(&str) -> String,
{
    let mapped = match scalar_text(&value)? {
        Some(text) if !text.is_empty() => Some(f(&text)),
        _ => None,
    };
    Ok(mapped.map_or(value, Value::string))
}

/// Upper-case one character at a time, keeping characters whose mapping
/// would expand to several (`ß` stays `ß`)
pub(super) fn to_upper(text: &str) -> String {
    text.chars().map(|c| single_char(c.to_uppercase(), c)).collect()
}

/// Lower-case one character at a time
pub(super) fn to_lower(text: &str) -> String {
    text.chars().map(|c| single_char(c.to_lowercase(), c)).collect()
}

fn single_char<I: ExactSizeIterator<Item = char>>(mut mapped: I, original: char) -> char {
    match (mapped.len(), mapped.next()) {
        (1, Some(c)) => c,
        _ => original,
    }
}

pub(super) fn pad_left(text: &str, total_width: usize, padding: char) -> String {
    let len = text.chars().count();
    if len >= total_width {
        return text.to_string();
    }
    iter::repeat(padding)
        .take(total_width - len)
        .chain(text.chars())
        .collect()
}

pub(super) fn pad_right(text: &str, total_width: usize, padding: char) -> String {
    let len = text.chars().count();
    if len >= total_width {
        return text.to_string();
    }
    text.chars()
        .chain(iter::repeat(padding).take(total_width - len))
        .collect()
}

/// Up to `length` characters starting at `start_index`
///
/// A start at or past the end yields the empty string; a length running past
/// the end is clamped.
pub(super) fn substring(value: Value, start_index: usize, length: usize) -> Result<Value, TransformError> {
    if value.is_absent() {
        return Ok(value);
    }
    let result = scalar_text(&value)?
        .map(|text| text.chars().skip(start_index).take(length).collect::<String>())
        .unwrap_or_default();
    Ok(Value::string(result))
}

/// `true_value` when `pattern` matches, `false_value` otherwise
///
/// An absent input counts as not matching.
pub(super) fn regex_is_match(
    value: &Value,
    pattern: &Regex,
    true_value: &str,
    false_value: &str,
) -> Result<Value, TransformError> {
    let matched = match scalar_text(value)? {
        None => false,
        Some(text) => pattern.is_match(&text),
    };
    Ok(Value::string(if matched { true_value } else { false_value }))
}
