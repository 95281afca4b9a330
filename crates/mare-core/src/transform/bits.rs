//! Bit flag transforms
//!
//! `IsBitSet` and `IsBitNotSet` read the input as a 64-bit integer; `SetBit`
//! reads and writes a 32-bit integer. Bit positions are checked against the
//! width being operated on.
//!
//! Copyright (c) 2025 MARE Team
//! Licensed under the Apache-2.0 license

use super::text::scalar_text;
use super::types::TransformError;
use crate::coercion::{parse_int32, parse_integer};
use crate::value::{Scalar, Value};

fn check_position(bit_position: i64, width: u32) -> Result<u32, TransformError> {
    u32::try_from(bit_position)
        .ok()
        .filter(|p| *p < width)
        .ok_or_else(|| TransformError::Range {
            parameter: "BitPosition".to_string(),
            value: bit_position,
            range: format!("[0, {}]", width - 1),
        })
}

/// Test one bit, rendering `True`/`False`; `expect_set` selects which answer is "True"
pub(super) fn is_bit(value: Value, bit_position: i64, expect_set: bool) -> Result<Value, TransformError> {
    if value.is_absent() {
        return Ok(value);
    }
    let number = match &value {
        Value::Scalar(Scalar::Integer(n)) => *n,
        _ => parse_integer(&scalar_text(&value)?.unwrap_or_default())?,
    };
    let position = check_position(bit_position, i64::BITS)?;
    let set = number & (1i64 << position) != 0;
    Ok(Value::string(Scalar::Boolean(set == expect_set).to_string()))
}

/// Set or clear one bit of a 32-bit integer
pub(super) fn set_bit(value: Value, bit_position: i64, on: bool) -> Result<Value, TransformError> {
    if value.is_absent() {
        return Ok(value);
    }
    let text = scalar_text(&value)?.unwrap_or_default();
    let number = parse_int32(&text)?;
    let position = check_position(bit_position, i32::BITS)?;
    let mask = 1i32 << position;
    let result = if on { number | mask } else { number & !mask };
    Ok(Value::string(result.to_string()))
}
