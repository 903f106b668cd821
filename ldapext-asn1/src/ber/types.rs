//! BER encoding types (Tag, Length, etc.)

use crate::error::{LdapError, LdapResult};
use std::fmt;

/// Universal tag numbers used by LDAP
pub mod universal {
    pub const BOOLEAN: u32 = 1;
    pub const INTEGER: u32 = 2;
    pub const OCTET_STRING: u32 = 4;
    pub const NULL: u32 = 5;
    pub const ENUMERATED: u32 = 10;
    pub const SEQUENCE: u32 = 16;
    pub const SET: u32 = 17;
}

/// BER Tag Class
///
/// ASN.1 defines four tag classes:
/// - **Universal**: Standard ASN.1 types (INTEGER, OCTET STRING, etc.)
/// - **Application**: Application-specific types (LDAP protocol ops)
/// - **Context-specific**: Context-dependent types (used in SEQUENCE/CHOICE)
/// - **Private**: Private/implementation-specific types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BerTagClass {
    /// Universal class (00)
    Universal = 0,
    /// Application class (01)
    Application = 1,
    /// Context-specific class (10)
    ContextSpecific = 2,
    /// Private class (11)
    Private = 3,
}

impl BerTagClass {
    /// Get tag class from bits (bits 7-6 of tag byte)
    pub fn from_bits(bits: u8) -> Self {
        match (bits >> 6) & 0x03 {
            0 => BerTagClass::Universal,
            1 => BerTagClass::Application,
            2 => BerTagClass::ContextSpecific,
            _ => BerTagClass::Private,
        }
    }

    /// Convert tag class to bits (for encoding)
    pub fn to_bits(self) -> u8 {
        (self as u8) << 6
    }
}

/// BER Tag
///
/// A BER tag identifies the type of an ASN.1 value. It consists of:
/// - **Class**: Universal, Application, Context-specific, or Private
/// - **Constructed/Primitive**: Whether the value contains nested TLVs
/// - **Tag Number**: 0-30 in the short form, anything larger in the extended form
///
/// # Encoding Format
///
/// Short form (tag number 0-30):
/// ```text
/// Bits: 8 7 6 5 4 3 2 1
///       C C P T T T T T
/// ```
///
/// Extended form (tag number > 30):
/// ```text
/// First byte:  C C P 1 1 1 1 1  (all tag bits set to 1)
/// Following bytes: 1 T T T T T T T  (continuation bytes, last byte has bit 7 = 0)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BerTag {
    class: BerTagClass,
    constructed: bool,
    number: u32,
}

impl BerTag {
    pub const BOOLEAN: BerTag = BerTag::new(BerTagClass::Universal, false, universal::BOOLEAN);
    pub const INTEGER: BerTag = BerTag::new(BerTagClass::Universal, false, universal::INTEGER);
    pub const OCTET_STRING: BerTag =
        BerTag::new(BerTagClass::Universal, false, universal::OCTET_STRING);
    pub const NULL: BerTag = BerTag::new(BerTagClass::Universal, false, universal::NULL);
    pub const ENUMERATED: BerTag =
        BerTag::new(BerTagClass::Universal, false, universal::ENUMERATED);
    pub const SEQUENCE: BerTag = BerTag::new(BerTagClass::Universal, true, universal::SEQUENCE);
    pub const SET: BerTag = BerTag::new(BerTagClass::Universal, true, universal::SET);

    /// Create a new BER tag
    pub const fn new(class: BerTagClass, constructed: bool, number: u32) -> Self {
        Self {
            class,
            constructed,
            number,
        }
    }

    /// Create a Universal class tag
    pub const fn universal(constructed: bool, number: u32) -> Self {
        Self::new(BerTagClass::Universal, constructed, number)
    }

    /// Create an Application class tag
    pub const fn application(constructed: bool, number: u32) -> Self {
        Self::new(BerTagClass::Application, constructed, number)
    }

    /// Create a Context-specific class tag
    pub const fn context_specific(constructed: bool, number: u32) -> Self {
        Self::new(BerTagClass::ContextSpecific, constructed, number)
    }

    /// Create a Private class tag
    pub const fn private(constructed: bool, number: u32) -> Self {
        Self::new(BerTagClass::Private, constructed, number)
    }

    /// Build a tag from its single-byte identifier (e.g. `0xA0`)
    ///
    /// Only meaningful for tag numbers 0-30; the low five bits are taken
    /// as the number verbatim.
    pub const fn from_byte(byte: u8) -> Self {
        let class = match (byte >> 6) & 0x03 {
            0 => BerTagClass::Universal,
            1 => BerTagClass::Application,
            2 => BerTagClass::ContextSpecific,
            _ => BerTagClass::Private,
        };
        Self::new(class, (byte & 0x20) != 0, (byte & 0x1F) as u32)
    }

    /// Get tag class
    pub fn class(&self) -> BerTagClass {
        self.class
    }

    /// Check if tag is constructed
    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    /// Get tag number
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Same class and number, with the given constructed flag
    pub fn with_constructed(self, constructed: bool) -> Self {
        Self::new(self.class, constructed, self.number)
    }

    /// Encode tag to bytes
    ///
    /// - If tag number <= 30: short form (1 byte)
    /// - If tag number > 30: extended form (base-128 continuation bytes)
    pub fn encode(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(1);

        let class_bits = self.class.to_bits();
        let constructed_bit = if self.constructed { 0x20 } else { 0x00 };

        if self.number <= 30 {
            result.push(class_bits | constructed_bit | (self.number as u8 & 0x1F));
        } else {
            result.push(class_bits | constructed_bit | 0x1F);

            let mut remaining = self.number;
            let mut bytes = Vec::new();
            while remaining > 0 {
                bytes.push((remaining & 0x7F) as u8);
                remaining >>= 7;
            }

            // Most significant group first, continuation bit on all but the last
            let last = bytes.len() - 1;
            for (i, &byte) in bytes.iter().rev().enumerate() {
                if i < last {
                    result.push(byte | 0x80);
                } else {
                    result.push(byte);
                }
            }
        }

        result
    }

    /// Decode tag from bytes
    ///
    /// # Returns
    /// Returns `Ok((BerTag, bytes_consumed))` if successful
    ///
    /// # Error Handling
    /// Returns a decoding error if:
    /// - Buffer is empty or ends inside an extended tag
    /// - The extended tag number does not fit in 32 bits
    pub fn decode(data: &[u8]) -> LdapResult<(Self, usize)> {
        let Some(&first_byte) = data.first() else {
            return Err(LdapError::Decoding(
                "Buffer exhausted while reading tag".to_string(),
            ));
        };

        let class = BerTagClass::from_bits(first_byte);
        let constructed = (first_byte & 0x20) != 0;
        let tag_bits = first_byte & 0x1F;

        if tag_bits < 31 {
            return Ok((Self::new(class, constructed, tag_bits as u32), 1));
        }

        let mut tag_number = 0u32;
        let mut pos = 1;
        loop {
            let Some(&byte) = data.get(pos) else {
                return Err(LdapError::Decoding(
                    "Incomplete extended tag encoding".to_string(),
                ));
            };
            pos += 1;

            if tag_number > (u32::MAX >> 7) {
                return Err(LdapError::Decoding(
                    "Tag number too large for 32 bits".to_string(),
                ));
            }
            tag_number = (tag_number << 7) | (byte & 0x7F) as u32;

            if byte & 0x80 == 0 {
                break;
            }
        }

        Ok((Self::new(class, constructed, tag_number), pos))
    }
}

impl fmt::Display for BerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = match self.class {
            BerTagClass::Universal => "UNIVERSAL",
            BerTagClass::Application => "APPLICATION",
            BerTagClass::ContextSpecific => "CONTEXT",
            BerTagClass::Private => "PRIVATE",
        };
        let form = if self.constructed { "constructed" } else { "primitive" };
        write!(f, "[{} {}] {}", class, self.number, form)
    }
}

/// BER Length encoding
///
/// - **Short form**: For lengths 0-127 (1 byte)
/// - **Long form**: For lengths > 127, a length-of-length byte with bit 7
///   set followed by the big-endian length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BerLength {
    /// Short form: length 0-127
    Short(u8),
    /// Long form: length > 127, encoded with length-of-length
    Long(usize),
}

impl BerLength {
    /// Maximum number of length octets accepted in the long form
    pub const MAX_LENGTH_OCTETS: usize = 4;

    /// Create a new BER length, choosing the short form when possible
    pub fn new(length: usize) -> Self {
        if length < 128 {
            BerLength::Short(length as u8)
        } else {
            BerLength::Long(length)
        }
    }

    /// Get the length value
    pub fn value(&self) -> usize {
        match self {
            BerLength::Short(l) => *l as usize,
            BerLength::Long(l) => *l,
        }
    }

    /// Encode length to bytes
    pub fn encode(&self) -> Vec<u8> {
        match self {
            BerLength::Short(length) => vec![*length],
            BerLength::Long(length) => {
                let mut num_bytes = 0;
                let mut temp = *length;
                while temp > 0 {
                    num_bytes += 1;
                    temp >>= 8;
                }
                if num_bytes == 0 {
                    num_bytes = 1;
                }

                let mut result = Vec::with_capacity(1 + num_bytes);
                result.push(0x80 | (num_bytes as u8));
                for i in (0..num_bytes).rev() {
                    result.push(((*length >> (i * 8)) & 0xFF) as u8);
                }
                result
            }
        }
    }

    /// Decode length from bytes
    ///
    /// # Returns
    /// Returns `Ok((BerLength, bytes_consumed))` if successful
    ///
    /// # Error Handling
    /// Returns a decoding error if:
    /// - Buffer is too short
    /// - Indefinite length form is used
    /// - More than four length octets are declared
    pub fn decode(data: &[u8]) -> LdapResult<(Self, usize)> {
        let Some(&first_byte) = data.first() else {
            return Err(LdapError::Decoding(
                "Buffer exhausted while reading length".to_string(),
            ));
        };

        if (first_byte & 0x80) == 0 {
            return Ok((BerLength::Short(first_byte & 0x7F), 1));
        }

        let num_bytes = (first_byte & 0x7F) as usize;
        if num_bytes == 0 {
            return Err(LdapError::Decoding(
                "Indefinite length encoding not supported".to_string(),
            ));
        }
        if num_bytes > Self::MAX_LENGTH_OCTETS {
            return Err(LdapError::Decoding(format!(
                "Length encoding too large: {} bytes (max {})",
                num_bytes,
                Self::MAX_LENGTH_OCTETS
            )));
        }
        if data.len() < 1 + num_bytes {
            return Err(LdapError::Decoding(format!(
                "Buffer too short for long form length: need {} bytes, got {}",
                1 + num_bytes,
                data.len()
            )));
        }

        let length = data[1..=num_bytes]
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | b as usize);

        Ok((BerLength::Long(length), 1 + num_bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ber_tag_short_form() {
        let tag = BerTag::INTEGER;
        let encoded = tag.encode();
        assert_eq!(encoded, vec![0x02]);
    }

    #[test]
    fn test_ber_tag_constructed() {
        let tag = BerTag::application(true, 24); // ExtendedResponse
        assert_eq!(tag.encode(), vec![0x78]);
        assert_eq!(BerTag::from_byte(0x78), tag);
    }

    #[test]
    fn test_ber_tag_decode() {
        let (tag, consumed) = BerTag::decode(&[0xA3]).unwrap();
        assert_eq!(consumed, 1);
        assert_eq!(tag.class(), BerTagClass::ContextSpecific);
        assert!(tag.is_constructed());
        assert_eq!(tag.number(), 3);
    }

    #[test]
    fn test_ber_tag_extended_form() {
        let tag = BerTag::context_specific(false, 201);
        let encoded = tag.encode();
        assert_eq!(encoded, vec![0x9F, 0x81, 0x49]);
        let (decoded, consumed) = BerTag::decode(&encoded).unwrap();
        assert_eq!(decoded, tag);
        assert_eq!(consumed, 3);
    }

    #[test]
    fn test_ber_tag_truncated_extended_form() {
        assert!(BerTag::decode(&[0x9F]).unwrap_err().is_decoding_error());
        assert!(BerTag::decode(&[0x9F, 0x81]).unwrap_err().is_decoding_error());
        assert!(BerTag::decode(&[]).unwrap_err().is_decoding_error());
    }

    #[test]
    fn test_ber_tag_overflow() {
        let data = [0x1F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        assert!(BerTag::decode(&data).is_err());
    }

    #[test]
    fn test_ber_length_short() {
        assert_eq!(BerLength::new(100).encode(), vec![100]);
        assert_eq!(BerLength::new(127).encode(), vec![127]);
    }

    #[test]
    fn test_ber_length_long() {
        assert_eq!(BerLength::new(128).encode(), vec![0x81, 0x80]);
        assert_eq!(BerLength::new(1000).encode(), vec![0x82, 0x03, 0xE8]);
    }

    #[test]
    fn test_ber_length_decode() {
        let (length, consumed) = BerLength::decode(&[0x82, 0x03, 0xE8]).unwrap();
        assert_eq!(consumed, 3);
        assert_eq!(length.value(), 1000);
    }

    #[test]
    fn test_ber_length_rejects_bad_forms() {
        assert!(BerLength::decode(&[0x80]).is_err());
        assert!(BerLength::decode(&[0x85, 1, 2, 3, 4, 5]).is_err());
        assert!(BerLength::decode(&[0x82, 0x01]).is_err());
        assert!(BerLength::decode(&[]).is_err());
    }
}
