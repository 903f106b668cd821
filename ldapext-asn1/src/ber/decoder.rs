//! BER decoder for ASN.1 structures
//!
//! # Usage Example
//!
//! ```rust
//! use ldapext_asn1::ber::BerDecoder;
//!
//! let data = [0x30, 0x05, 0x02, 0x01, 0x0A, 0x04, 0x00];
//! let mut outer = BerDecoder::new(&data);
//! let mut fields = BerDecoder::new(outer.decode_sequence().unwrap());
//! assert_eq!(fields.decode_integer().unwrap(), 10);
//! assert!(fields.decode_octet_string().unwrap().is_empty());
//! fields.expect_end().unwrap();
//! ```

use crate::ber::element::BerElement;
use crate::ber::types::{BerLength, BerTag};
use crate::error::{LdapError, LdapResult};

/// BER decoder for ASN.1 structures
///
/// Reads TLV triplets sequentially from a borrowed buffer. Every read is
/// bounds-checked: a truncated tag, length or value is reported as a
/// decoding error and never panics.
pub struct BerDecoder<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> BerDecoder<'a> {
    /// Create a new BER decoder
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Get current position in buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get remaining bytes
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Check if there is more data to decode
    pub fn has_remaining(&self) -> bool {
        self.position < self.buffer.len()
    }

    /// Fail if any bytes are left unread
    pub fn expect_end(&self) -> LdapResult<()> {
        if self.has_remaining() {
            return Err(LdapError::Decoding(format!(
                "{} unexpected trailing bytes",
                self.remaining()
            )));
        }
        Ok(())
    }

    /// Read multiple bytes from the buffer
    fn read_bytes(&mut self, count: usize) -> LdapResult<&'a [u8]> {
        let end = self
            .position
            .checked_add(count)
            .filter(|end| *end <= self.buffer.len())
            .ok_or_else(|| {
                LdapError::Decoding(format!(
                    "Buffer exhausted: need {} bytes, have {}",
                    count,
                    self.remaining()
                ))
            })?;
        let start = self.position;
        self.position = end;
        Ok(&self.buffer[start..end])
    }

    /// Look at the next tag without consuming anything
    ///
    /// Returns `None` at the end of the buffer.
    pub fn peek_tag(&self) -> LdapResult<Option<BerTag>> {
        if !self.has_remaining() {
            return Ok(None);
        }
        let (tag, _) = BerTag::decode(&self.buffer[self.position..])?;
        Ok(Some(tag))
    }

    /// Decode a TLV (Tag-Length-Value) triplet
    ///
    /// # Returns
    /// Returns `Ok((tag, value_bytes, total_bytes_consumed))` if successful.
    ///
    /// On error the position is left where it was.
    pub fn decode_tlv(&mut self) -> LdapResult<(BerTag, &'a [u8], usize)> {
        let start_pos = self.position;
        let result = self.decode_tlv_inner();
        if result.is_err() {
            self.position = start_pos;
        }
        result.map(|(tag, value)| (tag, value, self.position - start_pos))
    }

    fn decode_tlv_inner(&mut self) -> LdapResult<(BerTag, &'a [u8])> {
        let rest = self.buffer.get(self.position..).unwrap_or_default();
        let (tag, tag_bytes) = BerTag::decode(rest)?;
        self.position += tag_bytes;

        let rest = self.buffer.get(self.position..).unwrap_or_default();
        let (length, length_bytes) = BerLength::decode(rest)?;
        self.position += length_bytes;

        let value = self.read_bytes(length.value())?;
        Ok((tag, value))
    }

    /// Decode a TLV and check its tag
    pub fn decode_expected(&mut self, expected: &BerTag) -> LdapResult<&'a [u8]> {
        let start_pos = self.position;
        let (tag, value, _) = self.decode_tlv()?;
        if tag != *expected {
            self.position = start_pos;
            return Err(LdapError::Decoding(format!(
                "Expected tag {}, got {}",
                expected, tag
            )));
        }
        Ok(value)
    }

    /// Decode the next TLV as an owned element
    pub fn decode_element(&mut self) -> LdapResult<BerElement> {
        let (tag, value, _) = self.decode_tlv()?;
        Ok(BerElement::new(tag, value.to_vec()))
    }

    /// Decode all remaining TLVs as owned elements
    pub fn decode_all_elements(&mut self) -> LdapResult<Vec<BerElement>> {
        let mut elements = Vec::new();
        while self.has_remaining() {
            elements.push(self.decode_element()?);
        }
        Ok(elements)
    }

    /// Decode a BOOLEAN
    pub fn decode_boolean(&mut self) -> LdapResult<bool> {
        let value = self.decode_expected(&BerTag::BOOLEAN)?;
        decode_boolean_value(value)
    }

    /// Decode a BOOLEAN under an implicit tag
    pub fn decode_boolean_with_tag(&mut self, tag: &BerTag) -> LdapResult<bool> {
        let value = self.decode_expected(tag)?;
        decode_boolean_value(value)
    }

    /// Decode an INTEGER
    ///
    /// Values wider than eight octets are rejected.
    pub fn decode_integer(&mut self) -> LdapResult<i64> {
        let value = self.decode_expected(&BerTag::INTEGER)?;
        decode_integer_value(value)
    }

    /// Decode an INTEGER under an implicit tag
    pub fn decode_integer_with_tag(&mut self, tag: &BerTag) -> LdapResult<i64> {
        let value = self.decode_expected(tag)?;
        decode_integer_value(value)
    }

    /// Decode an ENUMERATED
    pub fn decode_enumerated(&mut self) -> LdapResult<i64> {
        let value = self.decode_expected(&BerTag::ENUMERATED)?;
        decode_integer_value(value)
    }

    /// Decode a NULL
    pub fn decode_null(&mut self) -> LdapResult<()> {
        let value = self.decode_expected(&BerTag::NULL)?;
        if !value.is_empty() {
            return Err(LdapError::Decoding(format!(
                "NULL element has {} content bytes",
                value.len()
            )));
        }
        Ok(())
    }

    /// Decode an OCTET STRING
    pub fn decode_octet_string(&mut self) -> LdapResult<Vec<u8>> {
        let value = self.decode_expected(&BerTag::OCTET_STRING)?;
        Ok(value.to_vec())
    }

    /// Decode an OCTET STRING holding UTF-8 text (LDAPString, LDAPDN, LDAPOID)
    pub fn decode_utf8_string(&mut self) -> LdapResult<String> {
        let value = self.decode_expected(&BerTag::OCTET_STRING)?;
        decode_utf8_value(value)
    }

    /// Decode a SEQUENCE, returning the concatenated member TLVs
    pub fn decode_sequence(&mut self) -> LdapResult<&'a [u8]> {
        self.decode_expected(&BerTag::SEQUENCE)
    }

    /// Decode a SET, returning the concatenated member TLVs
    pub fn decode_set(&mut self) -> LdapResult<&'a [u8]> {
        self.decode_expected(&BerTag::SET)
    }

    /// Decode a context-specific tag
    pub fn decode_context_specific(
        &mut self,
        expected_tag_number: u32,
        constructed: bool,
    ) -> LdapResult<&'a [u8]> {
        self.decode_expected(&BerTag::context_specific(constructed, expected_tag_number))
    }

    /// Decode an application tag
    pub fn decode_application(
        &mut self,
        expected_tag_number: u32,
        constructed: bool,
    ) -> LdapResult<&'a [u8]> {
        self.decode_expected(&BerTag::application(constructed, expected_tag_number))
    }

    /// Decode the next TLV only if it carries `tag`
    pub fn decode_optional(&mut self, tag: &BerTag) -> LdapResult<Option<&'a [u8]>> {
        match self.peek_tag()? {
            Some(next) if next == *tag => self.decode_expected(tag).map(Some),
            _ => Ok(None),
        }
    }

    /// Decode an OCTET STRING holding UTF-8 text under an implicit tag
    pub fn decode_utf8_string_with_tag(&mut self, tag: &BerTag) -> LdapResult<String> {
        let value = self.decode_expected(tag)?;
        decode_utf8_value(value)
    }

    /// Optional BOOLEAN under an implicit tag
    pub fn decode_optional_boolean(&mut self, tag: &BerTag) -> LdapResult<Option<bool>> {
        self.decode_optional(tag)?
            .map(decode_boolean_value)
            .transpose()
    }

    /// Optional INTEGER under an implicit tag
    pub fn decode_optional_integer(&mut self, tag: &BerTag) -> LdapResult<Option<i64>> {
        self.decode_optional(tag)?
            .map(decode_integer_value)
            .transpose()
    }

    /// Optional UTF-8 OCTET STRING under an implicit tag
    pub fn decode_optional_utf8_string(&mut self, tag: &BerTag) -> LdapResult<Option<String>> {
        self.decode_optional(tag)?
            .map(decode_utf8_value)
            .transpose()
    }

    /// Skip a TLV (useful for skipping unrecognised extension fields)
    ///
    /// # Returns
    /// Returns the number of bytes skipped.
    pub fn skip_tlv(&mut self) -> LdapResult<usize> {
        let (_, _, bytes_consumed) = self.decode_tlv()?;
        Ok(bytes_consumed)
    }
}

pub(crate) fn decode_boolean_value(bytes: &[u8]) -> LdapResult<bool> {
    match bytes {
        [byte] => Ok(*byte != 0x00),
        _ => Err(LdapError::Decoding(format!(
            "BOOLEAN must have exactly one content byte, got {}",
            bytes.len()
        ))),
    }
}

/// Converts big-endian two's complement bytes to i64
pub(crate) fn decode_integer_value(bytes: &[u8]) -> LdapResult<i64> {
    if bytes.is_empty() {
        return Err(LdapError::Decoding("Empty integer encoding".to_string()));
    }

    if bytes.len() > 8 {
        return Err(LdapError::Decoding(format!(
            "Integer too large: {} bytes (max 8)",
            bytes.len()
        )));
    }

    // Seed with the sign so that shifting in the remaining bytes sign-extends
    let seed: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
    Ok(bytes
        .iter()
        .fold(seed, |acc, &byte| (acc << 8) | byte as i64))
}

pub(crate) fn decode_utf8_value(bytes: &[u8]) -> LdapResult<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| LdapError::Decoding(format!("Value is not valid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::encoder::BerEncoder;

    #[test]
    fn test_decode_integer() {
        for value in [0i64, 1, -1, 127, 128, -128, -129, 12345, i32::MAX as i64, i64::MIN] {
            let mut encoder = BerEncoder::new();
            encoder.encode_integer(value).unwrap();
            let encoded = encoder.into_bytes();

            let mut decoder = BerDecoder::new(&encoded);
            assert_eq!(decoder.decode_integer().unwrap(), value);
            assert!(!decoder.has_remaining());
        }
    }

    #[test]
    fn test_decode_integer_rejects_bad_lengths() {
        let mut decoder = BerDecoder::new(&[0x02, 0x00]);
        assert!(decoder.decode_integer().is_err());

        let mut decoder = BerDecoder::new(&[0x02, 0x09, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert!(decoder.decode_integer().is_err());
    }

    #[test]
    fn test_decode_boolean() {
        let mut decoder = BerDecoder::new(&[0x01, 0x01, 0xFF, 0x01, 0x01, 0x01, 0x01, 0x01, 0x00]);
        assert!(decoder.decode_boolean().unwrap());
        assert!(decoder.decode_boolean().unwrap());
        assert!(!decoder.decode_boolean().unwrap());

        let mut decoder = BerDecoder::new(&[0x01, 0x02, 0xFF, 0xFF]);
        assert!(decoder.decode_boolean().unwrap_err().is_decoding_error());
    }

    #[test]
    fn test_decode_octet_string() {
        let mut encoder = BerEncoder::new();
        encoder.encode_octet_string(b"Hello").unwrap();
        let encoded = encoder.into_bytes();

        let mut decoder = BerDecoder::new(&encoded);
        assert_eq!(decoder.decode_octet_string().unwrap(), b"Hello");
    }

    #[test]
    fn test_decode_utf8_string_rejects_invalid() {
        let mut decoder = BerDecoder::new(&[0x04, 0x02, 0xC3, 0x28]);
        assert!(decoder.decode_utf8_string().unwrap_err().is_decoding_error());
    }

    #[test]
    fn test_truncated_value() {
        // Declares five bytes, carries three
        let mut decoder = BerDecoder::new(&[0x04, 0x05, b'a', b'b', b'c']);
        assert!(decoder.decode_octet_string().is_err());
        assert_eq!(decoder.position(), 0);
    }

    #[test]
    fn test_truncated_length() {
        let mut decoder = BerDecoder::new(&[0x04]);
        assert!(decoder.decode_tlv().is_err());
        let mut decoder = BerDecoder::new(&[0x04, 0x82, 0x01]);
        assert!(decoder.decode_tlv().is_err());
    }

    #[test]
    fn test_tag_mismatch() {
        let mut decoder = BerDecoder::new(&[0x04, 0x00]);
        let err = decoder.decode_integer().unwrap_err();
        assert!(err.is_decoding_error());
        // Still readable with the right type
        assert!(decoder.decode_octet_string().unwrap().is_empty());
    }

    #[test]
    fn test_decode_optional() {
        let data = [0x80, 0x01, 0x41, 0x04, 0x00];
        let mut decoder = BerDecoder::new(&data);
        assert!(decoder
            .decode_optional(&BerTag::context_specific(false, 1))
            .unwrap()
            .is_none());
        assert_eq!(
            decoder
                .decode_optional(&BerTag::context_specific(false, 0))
                .unwrap(),
            Some(&b"A"[..])
        );
        assert!(decoder.decode_octet_string().unwrap().is_empty());
        assert!(decoder.peek_tag().unwrap().is_none());
        decoder.expect_end().unwrap();
    }

    #[test]
    fn test_decode_null() {
        let mut decoder = BerDecoder::new(&[0x05, 0x00]);
        decoder.decode_null().unwrap();
        let mut decoder = BerDecoder::new(&[0x05, 0x01, 0x00]);
        assert!(decoder.decode_null().is_err());
    }

    #[test]
    fn test_decode_optional_typed() {
        // [0] TRUE, [1] INTEGER 300, [2] "cn"
        let data = [0x80, 0x01, 0xFF, 0x81, 0x02, 0x01, 0x2C, 0x82, 0x02, b'c', b'n'];
        let mut decoder = BerDecoder::new(&data);
        let tag = |n| BerTag::context_specific(false, n);
        assert_eq!(decoder.decode_optional_boolean(&tag(0)).unwrap(), Some(true));
        assert_eq!(decoder.decode_optional_boolean(&tag(0)).unwrap(), None);
        assert_eq!(decoder.decode_optional_integer(&tag(1)).unwrap(), Some(300));
        assert_eq!(
            decoder.decode_optional_utf8_string(&tag(2)).unwrap(),
            Some("cn".to_string())
        );
        decoder.expect_end().unwrap();

        let mut decoder = BerDecoder::new(&[0x80, 0x02, 0xFF, 0x00]);
        assert!(decoder.decode_optional_boolean(&tag(0)).is_err());
    }
}
