//! Transform dispatch
//!
//! Maps every catalog variant to its implementation. The match is exhaustive,
//! so a new variant cannot be added without deciding how it converts.
//!
//! Copyright (c) 2025 MARE Team
//! Licensed under the Apache-2.0 license

use super::text::{map_text, pad_left, pad_right, regex_is_match, substring, to_lower, to_upper};
use super::types::{Transform, TransformError};
use super::{bits, dates, identity, lookup, multivalue};
use crate::context::ExecutionContext;
use crate::value::Value;

impl Transform {
    /// Convert one value
    ///
    /// Pure apart from trace output and, for `LookupMVValue`, the blocking
    /// call into the context's entry lookup.
    pub fn convert(&self, value: Value, ctx: &ExecutionContext<'_>) -> Result<Value, TransformError> {
        match self {
            Transform::ToUpper => map_text(value, to_upper),
            Transform::ToLower => map_text(value, to_lower),
            Transform::Trim => map_text(value, |s| s.trim().to_string()),
            Transform::TrimStart => map_text(value, |s| s.trim_start().to_string()),
            Transform::TrimEnd => map_text(value, |s| s.trim_end().to_string()),
            Transform::Replace { old_value, new_value } => {
                map_text(value, |s| s.replace(old_value.as_str(), new_value))
            }
            Transform::PadLeft { total_width, padding_char } => {
                map_text(value, |s| pad_left(s, *total_width, *padding_char))
            }
            Transform::PadRight { total_width, padding_char } => {
                map_text(value, |s| pad_right(s, *total_width, *padding_char))
            }
            Transform::Substring { start_index, length } => substring(value, *start_index, *length),
            Transform::RegexReplace { pattern, replacement } => map_text(value, |s| {
                pattern.replace_all(s, replacement.as_str()).into_owned()
            }),
            Transform::RegexIsMatch { pattern, true_value, false_value } => {
                regex_is_match(&value, pattern, true_value, false_value)
            }
            Transform::RegexSelect => Err(TransformError::NotImplemented {
                variant: self.name().to_string(),
            }),
            Transform::FormatDate { input, to_format } => dates::format_date(value, input, to_format),
            Transform::Base64ToGuid => identity::base64_to_guid(value),
            Transform::SidToString { sid_type } => identity::sid_to_string(value, *sid_type),
            Transform::IsBitSet { bit_position } => bits::is_bit(value, *bit_position, true),
            Transform::IsBitNotSet { bit_position } => bits::is_bit(value, *bit_position, false),
            Transform::SetBit { bit_position, value: on } => bits::set_bit(value, *bit_position, *on),
            Transform::LookupMvValue { lookup_attribute_name, extraction } => {
                lookup::lookup_mv_value(value, lookup_attribute_name, extraction, ctx)
            }
            Transform::MultiValueConcatenate { separator } => {
                multivalue::concatenate(value, separator, ctx)
            }
            Transform::MultiValueRemoveIfNotMatch { pattern } => {
                multivalue::remove_if_match(value, pattern, ctx)
            }
        }
    }
}
