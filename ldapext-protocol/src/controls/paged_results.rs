//! Simple paged results control (RFC 2696)
//!
//! ```text
//! realSearchControlValue ::= SEQUENCE {
//!         size            INTEGER (0..maxInt),
//!         cookie          OCTET STRING }
//! ```
//!
//! The same OID serves the request (requested page size) and the response
//! (estimated total), so one type covers both.

use crate::decoded::{require_json_value, require_value, ControlType, DecodedControl};
use crate::error::{LdapError, LdapResult};
use crate::json::fields::{JsonFields, JsonObject};
use ldapext_asn1::ber::{BerDecoder, BerElement, BerTag};
use serde_json::{Map, Value};

const JSON_SIZE: &str = "size";
const JSON_COOKIE: &str = "cookie";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimplePagedResultsControl {
    size: i32,
    cookie: Vec<u8>,
    criticality: bool,
}

impl SimplePagedResultsControl {
    /// # Error Handling
    /// Returns a usage error if `size` is negative.
    pub fn new(size: i32, cookie: impl Into<Vec<u8>>, criticality: bool) -> LdapResult<Self> {
        if size < 0 {
            return Err(LdapError::Usage(format!(
                "Paged results size must not be negative, got {}",
                size
            )));
        }
        Ok(Self {
            size,
            cookie: cookie.into(),
            criticality,
        })
    }

    /// First request of a paged search: no cookie
    pub fn first_page(size: i32, criticality: bool) -> LdapResult<Self> {
        Self::new(size, Vec::new(), criticality)
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn cookie(&self) -> &[u8] {
        &self.cookie
    }

    /// True when the server signalled the last page
    pub fn is_last_page(&self) -> bool {
        self.cookie.is_empty()
    }

    fn check_decoded_size(size: i64) -> LdapResult<i32> {
        match i32::try_from(size) {
            Ok(size) if size >= 0 => Ok(size),
            _ => Err(LdapError::Decoding(format!(
                "Paged results size {} is out of range",
                size
            ))),
        }
    }
}

impl ControlType for SimplePagedResultsControl {
    const OID: &'static str = "1.2.840.113556.1.4.319";
    const NAME: &'static str = "Simple Paged Results";

    fn criticality(&self) -> bool {
        self.criticality
    }

    fn encode_value(&self) -> Option<Vec<u8>> {
        let value = BerElement::sequence(&[
            BerElement::integer(i64::from(self.size)),
            BerElement::octet_string(self.cookie.clone()),
        ]);
        Some(value.encode())
    }

    fn decode_value(criticality: bool, value: Option<&[u8]>) -> LdapResult<Self> {
        let value = require_value(Self::NAME, value)?;
        let element = BerElement::decode(value)?;
        element.expect_tag(BerTag::SEQUENCE)?;

        let mut decoder = BerDecoder::new(element.value());
        let size = Self::check_decoded_size(decoder.decode_integer()?)?;
        let cookie = decoder.decode_octet_string()?;
        decoder.expect_end()?;

        Ok(Self {
            size,
            cookie,
            criticality,
        })
    }

    fn value_json(&self) -> Option<Map<String, Value>> {
        let mut object = JsonObject::new().int(JSON_SIZE, i64::from(self.size));
        if !self.cookie.is_empty() {
            object = object.base64(JSON_COOKIE, &self.cookie);
        }
        Some(object.build())
    }

    fn decode_value_json(
        criticality: bool,
        value: Option<&Map<String, Value>>,
        strict: bool,
    ) -> LdapResult<Self> {
        let value = require_json_value(Self::NAME, value)?;
        let mut fields = JsonFields::new(value, Self::NAME);
        let size = Self::check_decoded_size(fields.required_i64(JSON_SIZE)?)?;
        let cookie = fields.optional_base64(JSON_COOKIE)?.unwrap_or_default();
        fields.finish(strict)?;

        Ok(Self {
            size,
            cookie,
            criticality,
        })
    }

    fn from_decoded(decoded: DecodedControl) -> Option<Self> {
        match decoded {
            DecodedControl::SimplePagedResults(control) => Some(control),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixtures() -> Vec<SimplePagedResultsControl> {
        vec![
            SimplePagedResultsControl::first_page(0, false).unwrap(),
            SimplePagedResultsControl::new(100, b"cookie".to_vec(), true).unwrap(),
            SimplePagedResultsControl::new(i32::MAX, vec![0x00, 0xFF], false).unwrap(),
        ]
    }

    #[test]
    fn test_binary_round_trip() {
        for control in fixtures() {
            let generic = control.to_control();
            assert_eq!(generic.oid(), SimplePagedResultsControl::OID);
            assert_eq!(SimplePagedResultsControl::decode(&generic).unwrap(), control);
        }
    }

    #[test]
    fn test_json_round_trip() {
        for control in fixtures() {
            let json = control.value_json();
            let decoded = SimplePagedResultsControl::decode_value_json(
                control.criticality(),
                json.as_ref(),
                true,
            )
            .unwrap();
            assert_eq!(decoded, control);
        }
    }

    #[test]
    fn test_encoding_layout() {
        let control = SimplePagedResultsControl::new(5, b"ab".to_vec(), false).unwrap();
        assert_eq!(
            control.encode_value().unwrap(),
            vec![0x30, 0x07, 0x02, 0x01, 0x05, 0x04, 0x02, b'a', b'b']
        );
    }

    #[test]
    fn test_negative_size() {
        assert!(SimplePagedResultsControl::new(-1, Vec::new(), false)
            .unwrap_err()
            .is_usage_error());

        let value = [0x30, 0x05, 0x02, 0x01, 0xFF, 0x04, 0x00];
        let err = SimplePagedResultsControl::decode_value(false, Some(&value)).unwrap_err();
        assert!(err.is_decoding_error());
    }

    #[test]
    fn test_malformed_values() {
        assert!(SimplePagedResultsControl::decode_value(false, None).is_err());
        assert!(SimplePagedResultsControl::decode_value(false, Some(&[0x04, 0x00])).is_err());
        // Trailing element after the cookie
        let value = [0x30, 0x07, 0x02, 0x01, 0x05, 0x04, 0x00, 0x05, 0x00];
        assert!(SimplePagedResultsControl::decode_value(false, Some(&value)).is_err());
    }

    #[test]
    fn test_json_value_shape() {
        let control = SimplePagedResultsControl::new(10, vec![1, 2, 3], false).unwrap();
        let json = Value::Object(control.value_json().unwrap());
        assert_eq!(json, json!({"size": 10, "cookie": "AQID"}));
    }
}
