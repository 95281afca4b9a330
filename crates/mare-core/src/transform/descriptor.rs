//! Declarative transform configuration
//!
//! A [`TransformDescriptor`] is the serialized form of one chain step: a
//! variant tag plus parameters keyed by their configuration names. Turning a
//! descriptor into a [`Transform`] validates every parameter and compiles
//! every pattern, so a chain that builds cannot fail on configuration later.
//!
//! Copyright (c) 2025 MARE Team
//! Licensed under the Apache-2.0 license

use super::dates::{DateInput, DatePattern, DEFAULT_OUTPUT_FORMAT};
use super::types::{DateType, Extraction, SidType, Transform, TransformKind, DN_EXTRACTION_MARKER};
use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Serialized form of one chain step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformDescriptor {
    /// Catalog name, matched case-sensitively
    #[serde(rename = "type")]
    pub variant: String,
    /// Parameters keyed by their configuration names
    #[serde(flatten)]
    pub parameters: BTreeMap<String, Json>,
}

impl TransformDescriptor {
    pub fn new(variant: impl Into<String>) -> Self {
        Self {
            variant: variant.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Set a parameter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Json>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

/// Typed reads over a descriptor's parameters
struct Params<'a> {
    kind: TransformKind,
    parameters: &'a BTreeMap<String, Json>,
}

impl<'a> Params<'a> {
    fn error(&self, message: impl Into<String>) -> Error {
        Error::Configuration {
            message: message.into(),
            position: None,
            variant: Some(self.kind.name().to_string()),
        }
    }

    fn raw(&self, name: &str) -> Option<&'a Json> {
        self.parameters.get(name).filter(|v| !v.is_null())
    }

    fn warn_unknown(&self) {
        let known = self.kind.parameters();
        for name in self.parameters.keys() {
            if !known.iter().any(|spec| spec.name == name) {
                log::warn!(
                    "Ignoring unknown parameter '{}' for transform '{}'",
                    name,
                    self.kind
                );
            }
        }
    }

    fn string(&self, name: &str) -> Result<Option<String>> {
        match self.raw(name) {
            None => Ok(None),
            Some(Json::String(s)) => Ok(Some(s.clone())),
            Some(Json::Number(n)) => Ok(Some(n.to_string())),
            Some(Json::Bool(b)) => Ok(Some(b.to_string())),
            Some(other) => Err(self.error(format!(
                "parameter '{}' must be a string, found {}",
                name, other
            ))),
        }
    }

    fn string_or_empty(&self, name: &str) -> Result<String> {
        Ok(self.string(name)?.unwrap_or_default())
    }

    fn required_string(&self, name: &str) -> Result<String> {
        self.string(name)?
            .ok_or_else(|| self.error(format!("missing required parameter '{}'", name)))
    }

    fn required_integer(&self, name: &str) -> Result<i64> {
        let Some(raw) = self.raw(name) else {
            return Err(self.error(format!("missing required parameter '{}'", name)));
        };
        let parsed = match raw {
            Json::Number(n) => n.as_i64(),
            Json::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| {
            self.error(format!("parameter '{}' must be an integer, found {}", name, raw))
        })
    }

    fn non_negative(&self, name: &str) -> Result<usize> {
        let value = self.required_integer(name)?;
        usize::try_from(value)
            .map_err(|_| self.error(format!("parameter '{}' must not be negative, found {}", name, value)))
    }

    fn boolean(&self, name: &str) -> Result<Option<bool>> {
        match self.raw(name) {
            None => Ok(None),
            Some(Json::Bool(b)) => Ok(Some(*b)),
            Some(Json::String(s)) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(Json::String(s)) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(other) => Err(self.error(format!(
                "parameter '{}' must be a boolean, found {}",
                name, other
            ))),
        }
    }

    fn choice<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr<Err = String>,
    {
        let raw = self.required_string(name)?;
        raw.parse().map_err(|message: String| self.error(message))
    }

    fn regex(&self, name: &str, case_insensitive: bool) -> Result<Regex> {
        let pattern = self.required_string(name)?;
        RegexBuilder::new(&pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| self.error(format!("invalid pattern in '{}': {}", name, e)))
    }

    fn date_pattern(&self, name: &str, source: &str) -> Result<DatePattern> {
        DatePattern::parse(source).map_err(|message| self.error(format!("{}: {}", name, message)))
    }

    fn padding_char(&self) -> Result<char> {
        Ok(self
            .string("PaddingChar")?
            .and_then(|s| s.chars().next())
            .unwrap_or(' '))
    }
}

impl Transform {
    /// Build and validate a transform from its serialized form
    ///
    /// Unknown variant tags, missing or mistyped required parameters and
    /// invalid patterns are configuration errors. Unknown parameter names are
    /// ignored with a warning.
    pub fn from_descriptor(descriptor: &TransformDescriptor) -> Result<Transform> {
        let kind: TransformKind = descriptor
            .variant
            .parse()
            .map_err(|message: String| Error::config(message))?;
        let params = Params {
            kind,
            parameters: &descriptor.parameters,
        };
        params.warn_unknown();

        let transform = match kind {
            TransformKind::ToUpper => Transform::ToUpper,
            TransformKind::ToLower => Transform::ToLower,
            TransformKind::Trim => Transform::Trim,
            TransformKind::TrimStart => Transform::TrimStart,
            TransformKind::TrimEnd => Transform::TrimEnd,
            TransformKind::Replace => {
                let old_value = params.required_string("OldValue")?;
                if old_value.is_empty() {
                    return Err(params.error("parameter 'OldValue' must not be empty"));
                }
                Transform::Replace {
                    old_value,
                    new_value: params.string_or_empty("NewValue")?,
                }
            }
            TransformKind::PadLeft => Transform::PadLeft {
                total_width: params.non_negative("TotalWidth")?,
                padding_char: params.padding_char()?,
            },
            TransformKind::PadRight => Transform::PadRight {
                total_width: params.non_negative("TotalWidth")?,
                padding_char: params.padding_char()?,
            },
            TransformKind::Substring => Transform::Substring {
                start_index: params.non_negative("StartIndex")?,
                length: params.non_negative("Length")?,
            },
            TransformKind::RegexReplace => Transform::RegexReplace {
                pattern: params.regex("Pattern", false)?,
                replacement: params.string_or_empty("Replacement")?,
            },
            TransformKind::RegexIsMatch => Transform::RegexIsMatch {
                pattern: params.regex("Pattern", true)?,
                true_value: params.string_or_empty("TrueValue")?,
                false_value: params.string_or_empty("FalseValue")?,
            },
            TransformKind::RegexSelect => Transform::RegexSelect,
            TransformKind::FormatDate => {
                let input = match params.choice::<DateType>("DateType")? {
                    DateType::BestGuess => DateInput::BestGuess,
                    DateType::FileTimeUtc => DateInput::FileTimeUtc,
                    DateType::DateTime => {
                        let source = params.string("FromFormat")?.filter(|s| !s.is_empty()).ok_or_else(
                            || params.error("parameter 'FromFormat' is required when DateType is DateTime"),
                        )?;
                        let pattern = params.date_pattern("FromFormat", &source)?;
                        pattern
                            .check_parseable()
                            .map_err(|message| params.error(format!("FromFormat: {}", message)))?;
                        DateInput::Exact(pattern)
                    }
                };
                let to_format = params
                    .string("ToFormat")?
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_OUTPUT_FORMAT.to_string());
                Transform::FormatDate {
                    input,
                    to_format: params.date_pattern("ToFormat", &to_format)?,
                }
            }
            TransformKind::Base64ToGuid => Transform::Base64ToGuid,
            TransformKind::SidToString => Transform::SidToString {
                sid_type: params.choice::<SidType>("SIDType")?,
            },
            TransformKind::IsBitSet => Transform::IsBitSet {
                bit_position: params.required_integer("BitPosition")?,
            },
            TransformKind::IsBitNotSet => Transform::IsBitNotSet {
                bit_position: params.required_integer("BitPosition")?,
            },
            TransformKind::SetBit => Transform::SetBit {
                bit_position: params.required_integer("BitPosition")?,
                value: params.boolean("Value")?.unwrap_or(false),
            },
            TransformKind::LookupMvValue => {
                let lookup_attribute_name = params.required_string("LookupAttributeName")?;
                let extract = params.required_string("ExtractValueFromAttribute")?;
                let extraction = if extract == DN_EXTRACTION_MARKER {
                    let system = params.string("MAName")?.filter(|s| !s.is_empty()).ok_or_else(|| {
                        params.error("parameter 'MAName' is required when extracting [DN]")
                    })?;
                    Extraction::DistinguishedName { system }
                } else {
                    Extraction::Attribute(extract)
                };
                Transform::LookupMvValue {
                    lookup_attribute_name,
                    extraction,
                }
            }
            TransformKind::MultiValueConcatenate => Transform::MultiValueConcatenate {
                separator: params.string_or_empty("Separator")?,
            },
            TransformKind::MultiValueRemoveIfNotMatch => Transform::MultiValueRemoveIfNotMatch {
                pattern: params.regex("Pattern", true)?,
            },
        };

        Ok(transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_descriptor_json_shape() {
        let descriptor: TransformDescriptor =
            serde_json::from_value(json!({"type": "PadLeft", "TotalWidth": 5, "PaddingChar": "0"}))
                .unwrap();
        assert_eq!(descriptor.variant, "PadLeft");
        assert_eq!(
            Transform::from_descriptor(&descriptor).unwrap(),
            Transform::PadLeft {
                total_width: 5,
                padding_char: '0'
            }
        );
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let descriptor = TransformDescriptor::new("Substring")
            .with("StartIndex", "1")
            .with("Length", 2);
        assert!(Transform::from_descriptor(&descriptor).is_ok());
    }

    #[test]
    fn test_padding_char_defaults_to_space() {
        let descriptor = TransformDescriptor::new("PadRight").with("TotalWidth", 3).with("PaddingChar", "");
        match Transform::from_descriptor(&descriptor).unwrap() {
            Transform::PadRight { padding_char, .. } => assert_eq!(padding_char, ' '),
            other => panic!("unexpected transform {:?}", other),
        }
    }

    #[test]
    fn test_configuration_failures() {
        let cases = vec![
            TransformDescriptor::new("Frobnicate"),
            TransformDescriptor::new("Replace"),
            TransformDescriptor::new("Replace").with("OldValue", ""),
            TransformDescriptor::new("PadLeft").with("TotalWidth", -1),
            TransformDescriptor::new("PadLeft").with("TotalWidth", "wide"),
            TransformDescriptor::new("RegexReplace").with("Pattern", "(unclosed"),
            TransformDescriptor::new("FormatDate").with("DateType", "Sometime"),
            TransformDescriptor::new("FormatDate").with("DateType", "DateTime"),
            TransformDescriptor::new("FormatDate")
                .with("DateType", "BestGuess")
                .with("ToFormat", "yyyy 'open"),
            TransformDescriptor::new("SIDToString"),
            TransformDescriptor::new("SetBit").with("BitPosition", 1).with("Value", "maybe"),
            TransformDescriptor::new("LookupMVValue")
                .with("LookupAttributeName", "uid")
                .with("ExtractValueFromAttribute", "[DN]"),
        ];
        for descriptor in cases {
            let err = Transform::from_descriptor(&descriptor).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config, "{:?}", descriptor);
        }
    }

    #[test]
    fn test_unknown_parameters_are_ignored() {
        let descriptor = TransformDescriptor::new("Trim").with("Colour", "blue");
        assert_eq!(Transform::from_descriptor(&descriptor).unwrap(), Transform::Trim);
    }

    #[test]
    fn test_bit_positions_are_checked_when_evaluated() {
        let descriptor = TransformDescriptor::new("SetBit").with("BitPosition", 32);
        assert!(Transform::from_descriptor(&descriptor).is_ok());
    }
}
