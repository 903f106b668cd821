//! Owned BER element tree

use crate::ber::decoder::{
    decode_boolean_value, decode_integer_value, decode_utf8_value, BerDecoder,
};
use crate::ber::encoder::encode_integer_value;
use crate::ber::types::{BerLength, BerTag};
use crate::error::{LdapError, LdapResult};

/// A single BER element: a tag plus its raw content bytes
///
/// The length is implied by `value.len()`. Constructed elements keep their
/// members encoded in `value`; [`elements`](Self::elements) decodes them
/// one level at a time, which is what recursive decoders want.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BerElement {
    tag: BerTag,
    value: Vec<u8>,
}

impl BerElement {
    pub fn new(tag: BerTag, value: Vec<u8>) -> Self {
        Self { tag, value }
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(BerTag::BOOLEAN, vec![if value { 0xFF } else { 0x00 }])
    }

    pub fn integer(value: i64) -> Self {
        Self::new(BerTag::INTEGER, encode_integer_value(value))
    }

    pub fn enumerated(value: i64) -> Self {
        Self::new(BerTag::ENUMERATED, encode_integer_value(value))
    }

    pub fn null() -> Self {
        Self::new(BerTag::NULL, Vec::new())
    }

    pub fn octet_string(value: impl Into<Vec<u8>>) -> Self {
        Self::new(BerTag::OCTET_STRING, value.into())
    }

    pub fn utf8(value: &str) -> Self {
        Self::octet_string(value.as_bytes())
    }

    /// Constructed SEQUENCE holding `elements` in order
    pub fn sequence(elements: &[BerElement]) -> Self {
        Self::new(BerTag::SEQUENCE, concat_elements(elements))
    }

    /// Constructed SET holding `elements` in the given order
    pub fn set(elements: &[BerElement]) -> Self {
        Self::new(BerTag::SET, concat_elements(elements))
    }

    /// Same content under a different (implicit) tag
    pub fn with_tag(self, tag: BerTag) -> Self {
        Self::new(tag, self.value)
    }

    pub fn tag(&self) -> BerTag {
        self.tag
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    /// Encode this element as a complete TLV
    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = self.tag.encode();
        buffer.extend_from_slice(&BerLength::new(self.value.len()).encode());
        buffer.extend_from_slice(&self.value);
        buffer
    }

    /// Decode exactly one element that spans the whole buffer
    ///
    /// Trailing bytes after the element are a decoding error: the declared
    /// length must account for every byte supplied.
    pub fn decode(data: &[u8]) -> LdapResult<Self> {
        let mut decoder = BerDecoder::new(data);
        let element = decoder.decode_element()?;
        decoder.expect_end()?;
        Ok(element)
    }

    /// Fail unless this element carries `expected`
    pub fn expect_tag(&self, expected: BerTag) -> LdapResult<&Self> {
        if self.tag != expected {
            return Err(LdapError::Decoding(format!(
                "Expected tag {}, got {}",
                expected, self.tag
            )));
        }
        Ok(self)
    }

    pub fn as_bool(&self) -> LdapResult<bool> {
        decode_boolean_value(&self.value)
    }

    pub fn as_integer(&self) -> LdapResult<i64> {
        decode_integer_value(&self.value)
    }

    /// INTEGER content that must fit in 32 bits (LDAP's `0 .. maxInt` style fields)
    pub fn as_i32(&self) -> LdapResult<i32> {
        let value = self.as_integer()?;
        i32::try_from(value)
            .map_err(|_| LdapError::Decoding(format!("Integer {} does not fit in 32 bits", value)))
    }

    pub fn as_null(&self) -> LdapResult<()> {
        if !self.value.is_empty() {
            return Err(LdapError::Decoding(format!(
                "NULL element has {} content bytes",
                self.value.len()
            )));
        }
        Ok(())
    }

    /// Content as UTF-8 text
    pub fn as_string(&self) -> LdapResult<String> {
        decode_utf8_value(&self.value)
    }

    /// Decode the members of a constructed element
    ///
    /// The primitive/constructed bit is checked so a primitive OCTET
    /// STRING is never mistaken for a SEQUENCE with a coincidental layout.
    pub fn elements(&self) -> LdapResult<Vec<BerElement>> {
        if !self.tag.is_constructed() {
            return Err(LdapError::Decoding(format!(
                "Element {} is not constructed",
                self.tag
            )));
        }
        BerDecoder::new(&self.value).decode_all_elements()
    }
}

fn concat_elements(elements: &[BerElement]) -> Vec<u8> {
    let mut buffer = Vec::new();
    for element in elements {
        buffer.extend_from_slice(&element.encode());
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_structure() {
        let seq = BerElement::sequence(&[BerElement::utf8("eb-id"), BerElement::boolean(true)]);
        let encoded = seq.encode();
        assert_eq!(encoded[0], 0x30);
        assert_eq!(encoded[1] as usize, encoded.len() - 2);

        let decoded = BerElement::decode(&encoded).unwrap();
        let members = decoded.elements().unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].as_string().unwrap(), "eb-id");
        assert!(members[1].as_bool().unwrap());
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut encoded = BerElement::null().encode();
        encoded.push(0x00);
        assert!(BerElement::decode(&encoded).unwrap_err().is_decoding_error());
    }

    #[test]
    fn test_primitive_has_no_members() {
        let element = BerElement::octet_string(vec![0x02, 0x01, 0x00]);
        assert!(element.elements().is_err());
    }

    #[test]
    fn test_nested_truncation_is_error() {
        // SEQUENCE claims 4 content bytes, inner OCTET STRING claims 5
        let data = [0x30, 0x04, 0x04, 0x05, b'a', b'b'];
        let element = BerElement::decode(&data).unwrap();
        assert!(element.elements().is_err());
    }

    #[test]
    fn test_with_tag_and_as_i32() {
        let element = BerElement::integer(-1).with_tag(BerTag::from_byte(0x80));
        assert_eq!(element.encode(), vec![0x80, 0x01, 0xFF]);
        assert_eq!(element.as_i32().unwrap(), -1);
        assert!(BerElement::integer(i64::from(i32::MAX) + 1).as_i32().is_err());
    }

    #[test]
    fn test_expect_tag() {
        let element = BerElement::null();
        assert!(element.expect_tag(BerTag::NULL).is_ok());
        assert!(element.expect_tag(BerTag::SEQUENCE).is_err());
    }
}
