//! Value coercion and raw format decoding
//!
//! Conversions between the scalar and multi-valued representations, and
//! decoders for the raw stored forms directory attributes arrive in: base64
//! binary, GUID byte layout, binary security identifiers, integer text and
//! Windows file times.

use crate::transform::TransformError;
use crate::value::{Scalar, Value};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Seconds between 1601-01-01 and 1970-01-01
const FILE_TIME_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;
const FILE_TIME_TICKS_PER_SEC: i64 = 10_000_000;

/// Maximum number of sub-authorities in a security identifier
const SID_MAX_SUB_AUTHORITIES: usize = 15;

/// Coerce a value into an ordered list of scalars
///
/// Multi-values are returned as they are. Host collections are converted
/// element by element to string scalars, preserving order. Anything else is a
/// type mismatch.
pub fn to_multi_value(value: Value) -> Result<Vec<Scalar>, TransformError> {
    match value {
        Value::MultiValue(values) => Ok(values),
        Value::Collection(collection) => Ok(collection
            .string_values()
            .into_iter()
            .map(Scalar::String)
            .collect()),
        other => Err(TransformError::TypeMismatch {
            expected: "multi-value".to_string(),
            actual: other.type_name().to_string(),
        }),
    }
}

/// Decode standard base64, ignoring surrounding whitespace
pub fn decode_base64_to_bytes(input: &str) -> Result<Vec<u8>, TransformError> {
    STANDARD
        .decode(input.trim())
        .map_err(|e| TransformError::format(format!("invalid base64: {}", e), input))
}

/// Decode base64 text holding the 16-byte mixed-endian GUID layout
pub fn decode_base64_to_guid(input: &str) -> Result<Uuid, TransformError> {
    let bytes = decode_base64_to_bytes(input)?;
    let raw: [u8; 16] = bytes.as_slice().try_into().map_err(|_| {
        TransformError::format(
            format!("a GUID needs 16 bytes, found {}", bytes.len()),
            input,
        )
    })?;
    Ok(Uuid::from_bytes_le(raw))
}

/// Encode a GUID in its mixed-endian byte layout as base64
pub fn encode_guid_to_base64(guid: &Uuid) -> String {
    STANDARD.encode(guid.to_bytes_le())
}

/// A binary security identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityIdentifier {
    pub revision: u8,
    /// 48-bit identifier authority
    pub authority: u64,
    pub sub_authorities: Vec<u32>,
}

impl SecurityIdentifier {
    /// The account domain part of an account SID (`S-1-5-21-a-b-c`)
    ///
    /// Returns `None` when the identifier does not belong to an account domain.
    pub fn account_domain_sid(&self) -> Option<SecurityIdentifier> {
        if self.authority != 5
            || self.sub_authorities.len() < 4
            || self.sub_authorities[0] != 21
        {
            return None;
        }
        Some(SecurityIdentifier {
            revision: self.revision,
            authority: self.authority,
            sub_authorities: self.sub_authorities[..4].to_vec(),
        })
    }
}

impl fmt::Display for SecurityIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}-", self.revision)?;
        if self.authority >= 1u64 << 32 {
            write!(f, "0x{:012X}", self.authority)?;
        } else {
            write!(f, "{}", self.authority)?;
        }
        for sub in &self.sub_authorities {
            write!(f, "-{}", sub)?;
        }
        Ok(())
    }
}

/// Parse the binary form of a security identifier
///
/// Layout: revision (1 byte), sub-authority count (1 byte), big-endian
/// identifier authority (6 bytes), then little-endian 32-bit sub-authorities.
pub fn parse_sid(bytes: &[u8]) -> Result<SecurityIdentifier, TransformError> {
    let hex = || bytes.iter().map(|b| format!("{:02X}", b)).collect::<String>();

    if bytes.len() < 8 {
        return Err(TransformError::format(
            format!("SID needs at least 8 bytes, found {}", bytes.len()),
            hex(),
        ));
    }
    let revision = bytes[0];
    if revision != 1 {
        return Err(TransformError::format(
            format!("unsupported SID revision {}", revision),
            hex(),
        ));
    }
    let count = bytes[1] as usize;
    if count > SID_MAX_SUB_AUTHORITIES {
        return Err(TransformError::format(
            format!("SID declares {} sub-authorities, at most {} allowed", count, SID_MAX_SUB_AUTHORITIES),
            hex(),
        ));
    }
    let expected = 8 + count * 4;
    if bytes.len() != expected {
        return Err(TransformError::format(
            format!("SID with {} sub-authorities needs {} bytes, found {}", count, expected, bytes.len()),
            hex(),
        ));
    }

    let authority = bytes[2..8]
        .iter()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
    let sub_authorities = bytes[8..]
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok(SecurityIdentifier {
        revision,
        authority,
        sub_authorities,
    })
}

/// Parse a 64-bit integer literal with optional sign and surrounding whitespace
pub fn parse_integer(input: &str) -> Result<i64, TransformError> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|e| TransformError::format(format!("not a 64-bit integer: {}", e), input))
}

/// Parse a 32-bit integer literal with optional sign and surrounding whitespace
pub fn parse_int32(input: &str) -> Result<i32, TransformError> {
    input
        .trim()
        .parse::<i32>()
        .map_err(|e| TransformError::format(format!("not a 32-bit integer: {}", e), input))
}

/// Convert a Windows file time (100-ns ticks since 1601-01-01 UTC)
pub fn file_time_to_datetime(ticks: i64) -> Result<DateTime<Utc>, TransformError> {
    if ticks < 0 {
        return Err(TransformError::format(
            "file time cannot be negative",
            ticks.to_string(),
        ));
    }
    let secs = ticks / FILE_TIME_TICKS_PER_SEC - FILE_TIME_EPOCH_OFFSET_SECS;
    let nanos = (ticks % FILE_TIME_TICKS_PER_SEC) as u32 * 100;
    DateTime::from_timestamp(secs, nanos).ok_or_else(|| {
        TransformError::format("file time is outside the supported range", ticks.to_string())
    })
}
