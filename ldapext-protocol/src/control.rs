//! Generic control envelope
//!
//! # Wire Format (RFC 4511 §4.1.11)
//!
//! ```text
//! Controls ::= SEQUENCE OF control Control
//!
//! Control ::= SEQUENCE {
//!      controlType             LDAPOID,
//!      criticality             BOOLEAN DEFAULT FALSE,
//!      controlValue            OCTET STRING OPTIONAL }
//! ```
//!
//! Inside an LDAPMessage the list is wrapped as `[0] Controls` (tag `0xA0`).

use crate::error::{LdapError, LdapResult};
use ldapext_asn1::ber::{BerDecoder, BerElement, BerTag};
use ldapext_core::oid::{check_decoded_oid, check_oid};
use std::fmt;

/// Context tag wrapping the control list inside an LDAPMessage
pub const CONTROLS_TAG: BerTag = BerTag::context_specific(true, 0);

/// An LDAP control in its generic form
///
/// Immutable once built. Equality and hashing cover the OID, the
/// criticality and the raw value bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Control {
    oid: String,
    criticality: bool,
    value: Option<Vec<u8>>,
}

impl Control {
    /// Create a control
    ///
    /// # Error Handling
    /// Returns a usage error if `oid` is empty or not dotted-decimal.
    pub fn new(oid: impl Into<String>, criticality: bool, value: Option<Vec<u8>>) -> LdapResult<Self> {
        let oid = oid.into();
        check_oid(&oid)?;
        Ok(Self::from_parts(oid, criticality, value))
    }

    /// Build without validating the OID; used for the constant OIDs of
    /// typed controls and for OIDs a registry already validated.
    pub(crate) fn from_parts(oid: impl Into<String>, criticality: bool, value: Option<Vec<u8>>) -> Self {
        Self {
            oid: oid.into(),
            criticality,
            value,
        }
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    pub fn criticality(&self) -> bool {
        self.criticality
    }

    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Encode as a `Control` SEQUENCE
    ///
    /// Criticality is omitted when false (DEFAULT FALSE).
    pub fn encode(&self) -> BerElement {
        let mut elements = Vec::with_capacity(3);
        elements.push(BerElement::utf8(&self.oid));
        if self.criticality {
            elements.push(BerElement::boolean(true));
        }
        if let Some(ref value) = self.value {
            elements.push(BerElement::octet_string(value.clone()));
        }
        BerElement::sequence(&elements)
    }

    /// Decode a `Control` SEQUENCE
    ///
    /// An explicit FALSE criticality is accepted even though DER would omit it.
    pub fn decode(element: &BerElement) -> LdapResult<Self> {
        element.expect_tag(BerTag::SEQUENCE)?;
        let mut decoder = BerDecoder::new(element.value());

        let oid = decoder.decode_utf8_string()?;
        check_decoded_oid(&oid)?;

        let criticality = match decoder.peek_tag()? {
            Some(tag) if tag == BerTag::BOOLEAN => decoder.decode_boolean()?,
            _ => false,
        };

        let value = match decoder.peek_tag()? {
            Some(tag) if tag == BerTag::OCTET_STRING => Some(decoder.decode_octet_string()?),
            Some(tag) => {
                return Err(LdapError::Decoding(format!(
                    "Unexpected element {} in control {}",
                    tag, oid
                )));
            }
            None => None,
        };

        decoder.expect_end()?;
        Ok(Self::from_parts(oid, criticality, value))
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Control(oid={}, isCritical={}", self.oid, self.criticality)?;
        if let Some(ref value) = self.value {
            write!(f, ", valueLength={}", value.len())?;
        }
        write!(f, ")")
    }
}

/// Encode a control list as `[0] SEQUENCE OF Control`
pub fn encode_controls(controls: &[Control]) -> Vec<u8> {
    let elements: Vec<BerElement> = controls.iter().map(Control::encode).collect();
    BerElement::sequence(&elements).with_tag(CONTROLS_TAG).encode()
}

/// Decode a `[0] SEQUENCE OF Control` element
///
/// Order is preserved and duplicates are kept: several controls may
/// legitimately share an OID.
pub fn decode_controls(data: &[u8]) -> LdapResult<Vec<Control>> {
    let element = BerElement::decode(data)?;
    element.expect_tag(CONTROLS_TAG)?;
    element.elements()?.iter().map(Control::decode).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_encoding_layout() {
        let control = Control::new("1.2.3", true, Some(b"ab".to_vec())).unwrap();
        assert_eq!(
            control.encode().encode(),
            vec![
                0x30, 0x0E, 0x04, 0x05, b'1', b'.', b'2', b'.', b'3', 0x01, 0x01, 0xFF, 0x04,
                0x02, b'a', b'b'
            ]
        );
    }

    #[test]
    fn test_non_critical_omits_boolean() {
        let control = Control::new("1.2.3", false, None).unwrap();
        assert_eq!(
            control.encode().encode(),
            vec![0x30, 0x07, 0x04, 0x05, b'1', b'.', b'2', b'.', b'3']
        );
    }

    #[test]
    fn test_round_trip_preserves_value_bytes() {
        for control in [
            Control::new("1.3.6.1.4.1.99999.1", false, None).unwrap(),
            Control::new("1.3.6.1.4.1.99999.1", true, Some(Vec::new())).unwrap(),
            Control::new("1.3.6.1.4.1.99999.1", false, Some(vec![0x00, 0xFF, 0x80])).unwrap(),
        ] {
            let decoded = Control::decode(&control.encode()).unwrap();
            assert_eq!(decoded, control);
        }
    }

    #[test]
    fn test_explicit_false_criticality_accepted() {
        let data = [0x30, 0x0A, 0x04, 0x05, b'1', b'.', b'2', b'.', b'3', 0x01, 0x01, 0x00];
        let control = Control::decode(&BerElement::decode(&data).unwrap()).unwrap();
        assert!(!control.criticality());
        assert!(control.value().is_none());
    }

    #[test]
    fn test_decode_rejects_bad_oid_and_extra_elements() {
        let bad_oid = BerElement::sequence(&[BerElement::utf8("")]);
        assert!(Control::decode(&bad_oid).unwrap_err().is_decoding_error());

        let extra = BerElement::sequence(&[
            BerElement::utf8("1.2.3"),
            BerElement::octet_string(vec![1]),
            BerElement::octet_string(vec![2]),
        ]);
        assert!(Control::decode(&extra).is_err());

        let not_sequence = BerElement::utf8("1.2.3");
        assert!(Control::decode(&not_sequence).is_err());
    }

    #[test]
    fn test_new_rejects_bad_oid() {
        assert!(Control::new("", false, None).unwrap_err().is_usage_error());
        assert!(Control::new("not-an-oid", false, None).unwrap_err().is_usage_error());
    }

    #[test]
    fn test_controls_list_round_trip() {
        let controls = vec![
            Control::new("1.2.3", false, None).unwrap(),
            Control::new("1.2.3", true, Some(vec![7])).unwrap(),
            Control::new("1.2.4", false, Some(Vec::new())).unwrap(),
        ];
        let encoded = encode_controls(&controls);
        assert_eq!(encoded[0], 0xA0);
        assert_eq!(decode_controls(&encoded).unwrap(), controls);
        assert!(decode_controls(&encoded[..encoded.len() - 1]).is_err());
    }

    #[test]
    fn test_display() {
        let control = Control::new("1.2.3", true, Some(vec![1, 2])).unwrap();
        assert_eq!(control.to_string(), "Control(oid=1.2.3, isCritical=true, valueLength=2)");
    }
}
