//! BER encoder for ASN.1 structures
//!
//! # Usage Example
//!
//! ```rust
//! use ldapext_asn1::ber::BerEncoder;
//!
//! let mut fields = BerEncoder::new();
//! fields.encode_integer(10).unwrap();
//! fields.encode_octet_string(b"").unwrap();
//!
//! let mut encoder = BerEncoder::new();
//! encoder.encode_sequence(fields.as_bytes()).unwrap();
//! assert_eq!(encoder.into_bytes(), vec![0x30, 0x05, 0x02, 0x01, 0x0A, 0x04, 0x00]);
//! ```

use crate::ber::element::BerElement;
use crate::ber::types::{BerLength, BerTag};
use crate::error::{LdapError, LdapResult};

/// BER encoder for ASN.1 structures
///
/// Appends TLV triplets to an internal `Vec<u8>`. Constructed values are
/// built bottom-up: encode the members into a separate encoder, then wrap
/// its bytes with [`encode_sequence`](Self::encode_sequence) or a
/// context-specific tag.
///
/// # Error Handling
///
/// Encoding fails only when a value is longer than four length octets
/// can describe.
#[derive(Debug, Default)]
pub struct BerEncoder {
    buffer: Vec<u8>,
}

impl BerEncoder {
    /// Create a new BER encoder
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Create a new BER encoder with initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Encode a TLV (Tag-Length-Value) triplet
    ///
    /// This is the fundamental BER encoding operation. All other encoding
    /// methods go through it.
    pub fn encode_tlv(&mut self, tag: &BerTag, value: &[u8]) -> LdapResult<()> {
        if value.len() > u32::MAX as usize {
            return Err(LdapError::Encoding(format!(
                "Value of {} bytes exceeds the maximum BER length",
                value.len()
            )));
        }

        self.buffer.extend_from_slice(&tag.encode());
        self.buffer.extend_from_slice(&BerLength::new(value.len()).encode());
        self.buffer.extend_from_slice(value);

        Ok(())
    }

    /// Encode a BOOLEAN
    ///
    /// TRUE is written as `0xFF`, the DER form every LDAP server accepts.
    pub fn encode_boolean(&mut self, value: bool) -> LdapResult<()> {
        self.encode_boolean_with_tag(&BerTag::BOOLEAN, value)
    }

    /// Encode a BOOLEAN under an implicit tag
    pub fn encode_boolean_with_tag(&mut self, tag: &BerTag, value: bool) -> LdapResult<()> {
        let byte = if value { 0xFF } else { 0x00 };
        self.encode_tlv(tag, &[byte])
    }

    /// Encode an INTEGER
    ///
    /// The value is written in minimal two's complement form: 127 is one
    /// byte (`0x7F`), 128 is two (`0x00 0x80`), -1 is one (`0xFF`).
    pub fn encode_integer(&mut self, value: i64) -> LdapResult<()> {
        self.encode_integer_with_tag(&BerTag::INTEGER, value)
    }

    /// Encode an INTEGER under an implicit tag
    pub fn encode_integer_with_tag(&mut self, tag: &BerTag, value: i64) -> LdapResult<()> {
        let bytes = encode_integer_value(value);
        self.encode_tlv(tag, &bytes)
    }

    /// Encode an ENUMERATED
    pub fn encode_enumerated(&mut self, value: i64) -> LdapResult<()> {
        self.encode_integer_with_tag(&BerTag::ENUMERATED, value)
    }

    /// Encode a NULL
    pub fn encode_null(&mut self) -> LdapResult<()> {
        self.encode_tlv(&BerTag::NULL, &[])
    }

    /// Encode an OCTET STRING
    pub fn encode_octet_string(&mut self, value: &[u8]) -> LdapResult<()> {
        self.encode_tlv(&BerTag::OCTET_STRING, value)
    }

    /// Encode a SEQUENCE from already-encoded member TLVs
    pub fn encode_sequence(&mut self, elements: &[u8]) -> LdapResult<()> {
        self.encode_tlv(&BerTag::SEQUENCE, elements)
    }

    /// Encode a SET (or SET OF) from already-encoded member TLVs
    pub fn encode_set(&mut self, elements: &[u8]) -> LdapResult<()> {
        self.encode_tlv(&BerTag::SET, elements)
    }

    /// Encode a context-specific tag
    pub fn encode_context_specific(
        &mut self,
        tag_number: u32,
        value: &[u8],
        constructed: bool,
    ) -> LdapResult<()> {
        let tag = BerTag::context_specific(constructed, tag_number);
        self.encode_tlv(&tag, value)
    }

    /// Encode an application tag
    ///
    /// LDAP protocol operations use application tags, e.g. ExtendedRequest
    /// is `[APPLICATION 23]`.
    pub fn encode_application(
        &mut self,
        tag_number: u32,
        value: &[u8],
        constructed: bool,
    ) -> LdapResult<()> {
        let tag = BerTag::application(constructed, tag_number);
        self.encode_tlv(&tag, value)
    }

    /// Append an already-built element
    pub fn encode_element(&mut self, element: &BerElement) -> LdapResult<()> {
        self.encode_tlv(&element.tag(), element.value())
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get a reference to the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the encoder buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Minimal two's complement, big-endian
pub(crate) fn encode_integer_value(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    // Drop leading bytes that only repeat the sign of the next byte
    while start < bytes.len() - 1 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}
