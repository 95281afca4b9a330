//! Directory identity decoders: `Base64ToGUID` and `SIDToString`
//!
//! Copyright (c) 2025 MARE Team
//! Licensed under the Apache-2.0 license

use super::text::scalar_text;
use super::types::{SidType, TransformError};
use crate::coercion::{decode_base64_to_bytes, decode_base64_to_guid, parse_sid};
use crate::value::{Scalar, Value};

/// Decode a base64 GUID; values that already are GUIDs pass through
pub(super) fn base64_to_guid(value: Value) -> Result<Value, TransformError> {
    if matches!(value, Value::Absent | Value::Scalar(Scalar::Guid(_))) {
        return Ok(value);
    }
    let guid = decode_base64_to_guid(&scalar_text(&value)?.unwrap_or_default())?;
    Ok(Value::Scalar(Scalar::Guid(guid)))
}

/// Decode a base64 binary SID into its string form
pub(super) fn sid_to_string(value: Value, sid_type: SidType) -> Result<Value, TransformError> {
    if value.is_absent() {
        return Ok(value);
    }
    let text = scalar_text(&value)?.unwrap_or_default();
    let sid = parse_sid(&decode_base64_to_bytes(&text)?)?;
    let rendered = match sid_type {
        SidType::AccountSid => sid.to_string(),
        SidType::AccountDomainSid => sid
            .account_domain_sid()
            .ok_or_else(|| {
                TransformError::format(
                    format!("{} is not an account SID", sid),
                    text.as_ref(),
                )
            })?
            .to_string(),
    };
    Ok(Value::string(rendered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    #[test]
    fn test_guid_input_passes_through() {
        let guid = Value::Scalar(Scalar::Guid(uuid::Uuid::nil()));
        assert_eq!(base64_to_guid(guid.clone()).unwrap(), guid);
    }

    #[test]
    fn test_builtin_sid_has_no_domain() {
        // S-1-5-32-544
        let bytes = [1u8, 2, 0, 0, 0, 0, 0, 5, 32, 0, 0, 0, 0x20, 2, 0, 0];
        let encoded = Value::string(STANDARD.encode(bytes));
        assert_eq!(
            sid_to_string(encoded.clone(), SidType::AccountSid).unwrap(),
            Value::string("S-1-5-32-544")
        );
        let err = sid_to_string(encoded, SidType::AccountDomainSid).unwrap_err();
        assert!(matches!(err, TransformError::Format { .. }));
    }
}
