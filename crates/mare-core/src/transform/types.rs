//! Core types for the transform catalog
//!
//! This module defines the closed set of transform variants, their parameter
//! schemas and the per-step error type.
//!
//! Copyright (c) 2025 MARE Team
//! Licensed under the Apache-2.0 license

use super::dates::{DateInput, DatePattern};
use crate::error::ErrorKind;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised by a single transform step
#[derive(Error, Debug)]
pub enum TransformError {
    /// The value has a representation the transform cannot handle
    #[error("Type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// The scalar content is malformed for the transform
    #[error("Format error: {message} (input: '{input}')")]
    Format { message: String, input: String },

    /// A parameter lies outside its valid domain
    #[error("Range error: {parameter} = {value} is outside {range}")]
    Range {
        parameter: String,
        value: i64,
        range: String,
    },

    /// A reserved catalog entry was invoked
    #[error("Transform '{variant}' is not implemented")]
    NotImplemented { variant: String },

    /// The external lookup collaborator failed; distinct from "no match"
    #[error("Lookup of {attribute} = '{value}' failed: {source}")]
    LookupFailure {
        attribute: String,
        value: String,
        #[source]
        source: anyhow::Error,
    },
}

impl TransformError {
    /// Create a format error for the given input
    pub fn format(message: impl Into<String>, input: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
            input: input.into(),
        }
    }

    /// The taxonomy bucket this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::Format { .. } => ErrorKind::Format,
            Self::Range { .. } => ErrorKind::Range,
            Self::NotImplemented { .. } => ErrorKind::NotImplemented,
            Self::LookupFailure { .. } => ErrorKind::LookupFailure,
        }
    }
}

/// How `FormatDate` interprets its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateType {
    /// Free-form, locale-invariant parse
    BestGuess,
    /// Exact parse with the configured `FromFormat`
    DateTime,
    /// 64-bit Windows file time in UTC
    FileTimeUtc,
}

impl FromStr for DateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BestGuess" => Ok(DateType::BestGuess),
            "DateTime" => Ok(DateType::DateTime),
            "FileTimeUTC" => Ok(DateType::FileTimeUtc),
            other => Err(format!(
                "unknown DateType '{}', expected BestGuess, DateTime or FileTimeUTC",
                other
            )),
        }
    }
}

impl fmt::Display for DateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateType::BestGuess => write!(f, "BestGuess"),
            DateType::DateTime => write!(f, "DateTime"),
            DateType::FileTimeUtc => write!(f, "FileTimeUTC"),
        }
    }
}

/// Which rendering of a security identifier `SIDToString` produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidType {
    AccountSid,
    AccountDomainSid,
}

impl FromStr for SidType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AccountSid" => Ok(SidType::AccountSid),
            "AccountDomainSid" => Ok(SidType::AccountDomainSid),
            other => Err(format!(
                "unknown SIDType '{}', expected AccountSid or AccountDomainSid",
                other
            )),
        }
    }
}

impl fmt::Display for SidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SidType::AccountSid => write!(f, "AccountSid"),
            SidType::AccountDomainSid => write!(f, "AccountDomainSid"),
        }
    }
}

/// What `LookupMVValue` extracts from the matched entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The distinguished name of the single connector under a system (`[DN]`)
    DistinguishedName { system: String },
    /// The value of a named attribute
    Attribute(String),
}

/// Marker used in configuration to request distinguished-name extraction
pub const DN_EXTRACTION_MARKER: &str = "[DN]";

/// A configured, validated transform
///
/// Instances are immutable once built and safe to share between threads.
#[derive(Debug, Clone)]
pub enum Transform {
    ToUpper,
    ToLower,
    Trim,
    TrimStart,
    TrimEnd,
    Replace {
        old_value: String,
        new_value: String,
    },
    PadLeft {
        total_width: usize,
        padding_char: char,
    },
    PadRight {
        total_width: usize,
        padding_char: char,
    },
    Substring {
        start_index: usize,
        length: usize,
    },
    RegexReplace {
        pattern: Regex,
        replacement: String,
    },
    RegexIsMatch {
        /// Compiled case-insensitive
        pattern: Regex,
        true_value: String,
        false_value: String,
    },
    RegexSelect,
    FormatDate {
        input: DateInput,
        to_format: DatePattern,
    },
    Base64ToGuid,
    SidToString {
        sid_type: SidType,
    },
    IsBitSet {
        bit_position: i64,
    },
    IsBitNotSet {
        bit_position: i64,
    },
    SetBit {
        bit_position: i64,
        value: bool,
    },
    LookupMvValue {
        lookup_attribute_name: String,
        extraction: Extraction,
    },
    MultiValueConcatenate {
        separator: String,
    },
    MultiValueRemoveIfNotMatch {
        /// Compiled case-insensitive
        pattern: Regex,
    },
}

impl Transform {
    /// The catalog entry this transform belongs to
    pub fn kind(&self) -> TransformKind {
        match self {
            Transform::ToUpper => TransformKind::ToUpper,
            Transform::ToLower => TransformKind::ToLower,
            Transform::Trim => TransformKind::Trim,
            Transform::TrimStart => TransformKind::TrimStart,
            Transform::TrimEnd => TransformKind::TrimEnd,
            Transform::Replace { .. } => TransformKind::Replace,
            Transform::PadLeft { .. } => TransformKind::PadLeft,
            Transform::PadRight { .. } => TransformKind::PadRight,
            Transform::Substring { .. } => TransformKind::Substring,
            Transform::RegexReplace { .. } => TransformKind::RegexReplace,
            Transform::RegexIsMatch { .. } => TransformKind::RegexIsMatch,
            Transform::RegexSelect => TransformKind::RegexSelect,
            Transform::FormatDate { .. } => TransformKind::FormatDate,
            Transform::Base64ToGuid => TransformKind::Base64ToGuid,
            Transform::SidToString { .. } => TransformKind::SidToString,
            Transform::IsBitSet { .. } => TransformKind::IsBitSet,
            Transform::IsBitNotSet { .. } => TransformKind::IsBitNotSet,
            Transform::SetBit { .. } => TransformKind::SetBit,
            Transform::LookupMvValue { .. } => TransformKind::LookupMvValue,
            Transform::MultiValueConcatenate { .. } => TransformKind::MultiValueConcatenate,
            Transform::MultiValueRemoveIfNotMatch { .. } => {
                TransformKind::MultiValueRemoveIfNotMatch
            }
        }
    }

    /// Configuration name of this transform
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Human-readable rendering of the configured parameters
    pub fn describe_parameters(&self) -> String {
        match self {
            Transform::ToUpper
            | Transform::ToLower
            | Transform::Trim
            | Transform::TrimStart
            | Transform::TrimEnd
            | Transform::RegexSelect
            | Transform::Base64ToGuid => String::new(),
            Transform::Replace { old_value, new_value } => {
                format!("OldValue={:?}, NewValue={:?}", old_value, new_value)
            }
            Transform::PadLeft { total_width, padding_char }
            | Transform::PadRight { total_width, padding_char } => {
                format!("TotalWidth={}, PaddingChar={:?}", total_width, padding_char)
            }
            Transform::Substring { start_index, length } => {
                format!("StartIndex={}, Length={}", start_index, length)
            }
            Transform::RegexReplace { pattern, replacement } => {
                format!("Pattern={:?}, Replacement={:?}", pattern.as_str(), replacement)
            }
            Transform::RegexIsMatch { pattern, true_value, false_value } => format!(
                "Pattern={:?}, TrueValue={:?}, FalseValue={:?}",
                pattern.as_str(),
                true_value,
                false_value
            ),
            Transform::FormatDate { input, to_format } => format!(
                "DateType={}, FromFormat={:?}, ToFormat={:?}",
                input.date_type(),
                input.from_format().map(DatePattern::source).unwrap_or(""),
                to_format.source()
            ),
            Transform::SidToString { sid_type } => format!("SIDType={}", sid_type),
            Transform::IsBitSet { bit_position } | Transform::IsBitNotSet { bit_position } => {
                format!("BitPosition={}", bit_position)
            }
            Transform::SetBit { bit_position, value } => {
                format!("BitPosition={}, Value={}", bit_position, value)
            }
            Transform::LookupMvValue { lookup_attribute_name, extraction } => match extraction {
                Extraction::DistinguishedName { system } => format!(
                    "LookupAttributeName={:?}, ExtractValueFromAttribute=\"[DN]\", MAName={:?}",
                    lookup_attribute_name, system
                ),
                Extraction::Attribute(attribute) => format!(
                    "LookupAttributeName={:?}, ExtractValueFromAttribute={:?}",
                    lookup_attribute_name, attribute
                ),
            },
            Transform::MultiValueConcatenate { separator } => format!("Separator={:?}", separator),
            Transform::MultiValueRemoveIfNotMatch { pattern } => {
                format!("Pattern={:?}", pattern.as_str())
            }
        }
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        // Compiled patterns compare by their source text
        self.kind() == other.kind() && self.describe_parameters() == other.describe_parameters()
    }
}

/// Value type of a configuration parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    String,
    Integer,
    Boolean,
    /// One of a fixed set of names
    Choice(&'static [&'static str]),
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterType::String => write!(f, "string"),
            ParameterType::Integer => write!(f, "integer"),
            ParameterType::Boolean => write!(f, "boolean"),
            ParameterType::Choice(options) => write!(f, "one of {}", options.join("|")),
        }
    }
}

/// Schema entry for one configuration parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub kind: ParameterType,
    pub required: bool,
    pub description: &'static str,
}

const fn param(
    name: &'static str,
    kind: ParameterType,
    required: bool,
    description: &'static str,
) -> ParameterSpec {
    ParameterSpec {
        name,
        kind,
        required,
        description,
    }
}

const DATE_TYPES: &[&str] = &["BestGuess", "DateTime", "FileTimeUTC"];
const SID_TYPES: &[&str] = &["AccountSid", "AccountDomainSid"];

/// The closed catalog of transform variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    ToUpper,
    ToLower,
    Trim,
    TrimStart,
    TrimEnd,
    Replace,
    PadLeft,
    PadRight,
    Substring,
    RegexReplace,
    RegexIsMatch,
    RegexSelect,
    FormatDate,
    Base64ToGuid,
    SidToString,
    IsBitSet,
    IsBitNotSet,
    SetBit,
    LookupMvValue,
    MultiValueConcatenate,
    MultiValueRemoveIfNotMatch,
}

impl TransformKind {
    /// Every catalog entry, in catalog order
    pub const ALL: [TransformKind; 21] = [
        TransformKind::ToUpper,
        TransformKind::ToLower,
        TransformKind::Trim,
        TransformKind::TrimStart,
        TransformKind::TrimEnd,
        TransformKind::Replace,
        TransformKind::PadLeft,
        TransformKind::PadRight,
        TransformKind::Substring,
        TransformKind::RegexReplace,
        TransformKind::RegexIsMatch,
        TransformKind::RegexSelect,
        TransformKind::FormatDate,
        TransformKind::Base64ToGuid,
        TransformKind::SidToString,
        TransformKind::IsBitSet,
        TransformKind::IsBitNotSet,
        TransformKind::SetBit,
        TransformKind::LookupMvValue,
        TransformKind::MultiValueConcatenate,
        TransformKind::MultiValueRemoveIfNotMatch,
    ];

    /// Name used in configuration documents
    pub fn name(self) -> &'static str {
        match self {
            TransformKind::ToUpper => "ToUpper",
            TransformKind::ToLower => "ToLower",
            TransformKind::Trim => "Trim",
            TransformKind::TrimStart => "TrimStart",
            TransformKind::TrimEnd => "TrimEnd",
            TransformKind::Replace => "Replace",
            TransformKind::PadLeft => "PadLeft",
            TransformKind::PadRight => "PadRight",
            TransformKind::Substring => "Substring",
            TransformKind::RegexReplace => "RegexReplace",
            TransformKind::RegexIsMatch => "RegexIsMatch",
            TransformKind::RegexSelect => "RegexSelect",
            TransformKind::FormatDate => "FormatDate",
            TransformKind::Base64ToGuid => "Base64ToGUID",
            TransformKind::SidToString => "SIDToString",
            TransformKind::IsBitSet => "IsBitSet",
            TransformKind::IsBitNotSet => "IsBitNotSet",
            TransformKind::SetBit => "SetBit",
            TransformKind::LookupMvValue => "LookupMVValue",
            TransformKind::MultiValueConcatenate => "MultiValueConcatenate",
            TransformKind::MultiValueRemoveIfNotMatch => "MultiValueRemoveIfNotMatch",
        }
    }

    /// Parameter schema of this catalog entry
    pub fn parameters(self) -> &'static [ParameterSpec] {
        match self {
            TransformKind::ToUpper
            | TransformKind::ToLower
            | TransformKind::Trim
            | TransformKind::TrimStart
            | TransformKind::TrimEnd
            | TransformKind::RegexSelect
            | TransformKind::Base64ToGuid => &[],
            TransformKind::Replace => REPLACE_PARAMS,
            TransformKind::PadLeft | TransformKind::PadRight => PAD_PARAMS,
            TransformKind::Substring => SUBSTRING_PARAMS,
            TransformKind::RegexReplace => REGEX_REPLACE_PARAMS,
            TransformKind::RegexIsMatch => REGEX_IS_MATCH_PARAMS,
            TransformKind::FormatDate => FORMAT_DATE_PARAMS,
            TransformKind::SidToString => SID_TO_STRING_PARAMS,
            TransformKind::IsBitSet | TransformKind::IsBitNotSet => IS_BIT_PARAMS,
            TransformKind::SetBit => SET_BIT_PARAMS,
            TransformKind::LookupMvValue => LOOKUP_PARAMS,
            TransformKind::MultiValueConcatenate => CONCATENATE_PARAMS,
            TransformKind::MultiValueRemoveIfNotMatch => REMOVE_IF_NOT_MATCH_PARAMS,
        }
    }
}

const STR: ParameterType = ParameterType::String;
const INT: ParameterType = ParameterType::Integer;
const BOOL: ParameterType = ParameterType::Boolean;

const REPLACE_PARAMS: &[ParameterSpec] = &[
    param("OldValue", STR, true, "literal text to replace; must not be empty"),
    param("NewValue", STR, false, "replacement text"),
];

const PAD_PARAMS: &[ParameterSpec] = &[
    param("TotalWidth", INT, true, "width to pad to, in characters"),
    param("PaddingChar", STR, false, "padding character, first char used (default ' ')"),
];

const SUBSTRING_PARAMS: &[ParameterSpec] = &[
    param("StartIndex", INT, true, "zero-based start character"),
    param("Length", INT, true, "maximum number of characters"),
];

const REGEX_REPLACE_PARAMS: &[ParameterSpec] = &[
    param("Pattern", STR, true, "regular expression"),
    param("Replacement", STR, false, "replacement with $1 / ${name} references"),
];

const REGEX_IS_MATCH_PARAMS: &[ParameterSpec] = &[
    param("Pattern", STR, true, "regular expression, matched case-insensitively"),
    param("TrueValue", STR, false, "result when the pattern matches"),
    param("FalseValue", STR, false, "result when it does not, or input is absent"),
];

const FORMAT_DATE_PARAMS: &[ParameterSpec] = &[
    param("DateType", ParameterType::Choice(DATE_TYPES), true, "how the input is interpreted"),
    param("FromFormat", STR, false, "exact input format, required for DateTime"),
    param("ToFormat", STR, false, "output format (default MM/dd/yyyy HH:mm:ss)"),
];

const SID_TO_STRING_PARAMS: &[ParameterSpec] = &[param(
    "SIDType",
    ParameterType::Choice(SID_TYPES),
    true,
    "account SID or its domain SID",
)];

const IS_BIT_PARAMS: &[ParameterSpec] =
    &[param("BitPosition", INT, true, "zero-based bit to test, 0..=63")];

const SET_BIT_PARAMS: &[ParameterSpec] = &[
    param("BitPosition", INT, true, "zero-based bit to change, 0..=31"),
    param("Value", BOOL, false, "set (true) or clear (false) the bit"),
];

const LOOKUP_PARAMS: &[ParameterSpec] = &[
    param("LookupAttributeName", STR, true, "attribute matched against the input"),
    param("ExtractValueFromAttribute", STR, true, "attribute to return, or [DN]"),
    param("MAName", STR, false, "connected system, required with [DN]"),
];

const CONCATENATE_PARAMS: &[ParameterSpec] =
    &[param("Separator", STR, false, "text placed between values")];

const REMOVE_IF_NOT_MATCH_PARAMS: &[ParameterSpec] = &[param(
    "Pattern",
    STR,
    true,
    "values matching this pattern (case-insensitive) are dropped",
)];

impl FromStr for TransformKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransformKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown transform type '{}'", s))
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
