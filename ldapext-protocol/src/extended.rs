//! Generic extended operation envelopes (RFC 4511 §4.12)
//!
//! ```text
//! ExtendedRequest ::= [APPLICATION 23] SEQUENCE {
//!      requestName      [0] LDAPOID,
//!      requestValue     [1] OCTET STRING OPTIONAL }
//!
//! ExtendedResponse ::= [APPLICATION 24] SEQUENCE {
//!      COMPONENTS OF LDAPResult,
//!      responseName     [10] LDAPOID OPTIONAL,
//!      responseValue    [11] OCTET STRING OPTIONAL }
//!
//! LDAPResult ::= SEQUENCE {
//!      resultCode         ENUMERATED,
//!      matchedDN          LDAPDN,
//!      diagnosticMessage  LDAPString,
//!      referral           [3] Referral OPTIONAL }
//! ```
//!
//! Controls travel outside the protocol op in the enclosing LDAPMessage,
//! so they are carried here but encoded separately with
//! [`encode_controls`](crate::control::encode_controls).

use crate::control::Control;
use crate::error::{LdapError, LdapResult};
use ldapext_asn1::ber::{BerDecoder, BerElement, BerTag};
use ldapext_core::oid::{check_decoded_oid, check_oid};
use ldapext_core::ResultCode;
use std::fmt;

pub const EXTENDED_REQUEST_TAG: BerTag = BerTag::application(true, 23);
pub const EXTENDED_RESULT_TAG: BerTag = BerTag::application(true, 24);

const TAG_REQUEST_NAME: BerTag = BerTag::context_specific(false, 0);
const TAG_REQUEST_VALUE: BerTag = BerTag::context_specific(false, 1);
const TAG_REFERRAL: BerTag = BerTag::context_specific(true, 3);
const TAG_RESPONSE_NAME: BerTag = BerTag::context_specific(false, 10);
const TAG_RESPONSE_VALUE: BerTag = BerTag::context_specific(false, 11);

/// An extended request in its generic form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtendedRequest {
    oid: Option<String>,
    value: Option<Vec<u8>>,
    controls: Vec<Control>,
}

impl ExtendedRequest {
    /// # Error Handling
    /// Returns a usage error if `oid` is not dotted-decimal.
    pub fn new(oid: impl Into<String>, value: Option<Vec<u8>>) -> LdapResult<Self> {
        let oid = oid.into();
        check_oid(&oid)?;
        Ok(Self::from_parts(Some(oid), value))
    }

    pub(crate) fn from_parts(oid: Option<String>, value: Option<Vec<u8>>) -> Self {
        Self {
            oid,
            value,
            controls: Vec::new(),
        }
    }

    pub fn with_controls(mut self, controls: Vec<Control>) -> Self {
        self.controls = controls;
        self
    }

    /// Request OID; absent only on malformed requests
    pub fn oid(&self) -> Option<&str> {
        self.oid.as_deref()
    }

    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn encode(&self) -> BerElement {
        let mut elements = Vec::with_capacity(2);
        if let Some(ref oid) = self.oid {
            elements.push(BerElement::utf8(oid).with_tag(TAG_REQUEST_NAME));
        }
        if let Some(ref value) = self.value {
            elements.push(BerElement::octet_string(value.clone()).with_tag(TAG_REQUEST_VALUE));
        }
        BerElement::sequence(&elements).with_tag(EXTENDED_REQUEST_TAG)
    }

    /// Decode the protocol op; attach controls with [`with_controls`](Self::with_controls)
    pub fn decode(element: &BerElement) -> LdapResult<Self> {
        element.expect_tag(EXTENDED_REQUEST_TAG)?;
        let mut decoder = BerDecoder::new(element.value());

        let oid = decoder.decode_optional_utf8_string(&TAG_REQUEST_NAME)?;
        if let Some(ref oid) = oid {
            check_decoded_oid(oid)?;
        }
        let value = decoder.decode_optional(&TAG_REQUEST_VALUE)?.map(<[u8]>::to_vec);
        decoder.expect_end()?;

        Ok(Self::from_parts(oid, value))
    }
}

impl fmt::Display for ExtendedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtendedRequest(oid={}", self.oid.as_deref().unwrap_or("<none>"))?;
        if let Some(ref value) = self.value {
            write!(f, ", valueLength={}", value.len())?;
        }
        if !self.controls.is_empty() {
            write!(f, ", controls={}", self.controls.len())?;
        }
        write!(f, ")")
    }
}

/// An extended result in its generic form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtendedResult {
    result_code: ResultCode,
    matched_dn: Option<String>,
    diagnostic_message: Option<String>,
    referrals: Vec<String>,
    oid: Option<String>,
    value: Option<Vec<u8>>,
    controls: Vec<Control>,
}

impl ExtendedResult {
    pub fn new(result_code: ResultCode) -> Self {
        Self {
            result_code,
            matched_dn: None,
            diagnostic_message: None,
            referrals: Vec::new(),
            oid: None,
            value: None,
            controls: Vec::new(),
        }
    }

    pub fn with_matched_dn(mut self, matched_dn: impl Into<String>) -> Self {
        self.matched_dn = Some(matched_dn.into());
        self
    }

    pub fn with_diagnostic_message(mut self, message: impl Into<String>) -> Self {
        self.diagnostic_message = Some(message.into());
        self
    }

    pub fn with_referrals(mut self, referrals: Vec<String>) -> Self {
        self.referrals = referrals;
        self
    }

    /// # Error Handling
    /// Returns a usage error if `oid` is not dotted-decimal.
    pub fn with_oid(mut self, oid: impl Into<String>) -> LdapResult<Self> {
        let oid = oid.into();
        check_oid(&oid)?;
        self.oid = Some(oid);
        Ok(self)
    }

    pub fn with_value(mut self, value: Vec<u8>) -> Self {
        self.value = Some(value);
        self
    }

    pub(crate) fn with_optional_value(mut self, value: Option<Vec<u8>>) -> Self {
        self.value = value;
        self
    }

    pub fn with_controls(mut self, controls: Vec<Control>) -> Self {
        self.controls = controls;
        self
    }

    pub fn result_code(&self) -> ResultCode {
        self.result_code
    }

    pub fn matched_dn(&self) -> Option<&str> {
        self.matched_dn.as_deref()
    }

    pub fn diagnostic_message(&self) -> Option<&str> {
        self.diagnostic_message.as_deref()
    }

    pub fn referrals(&self) -> &[String] {
        &self.referrals
    }

    /// Response OID, which most operations leave out
    pub fn oid(&self) -> Option<&str> {
        self.oid.as_deref()
    }

    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn encode(&self) -> BerElement {
        let mut elements = vec![
            BerElement::enumerated(i64::from(self.result_code.value())),
            BerElement::utf8(self.matched_dn.as_deref().unwrap_or_default()),
            BerElement::utf8(self.diagnostic_message.as_deref().unwrap_or_default()),
        ];
        if !self.referrals.is_empty() {
            let urls: Vec<BerElement> = self.referrals.iter().map(|url| BerElement::utf8(url)).collect();
            elements.push(BerElement::sequence(&urls).with_tag(TAG_REFERRAL));
        }
        if let Some(ref oid) = self.oid {
            elements.push(BerElement::utf8(oid).with_tag(TAG_RESPONSE_NAME));
        }
        if let Some(ref value) = self.value {
            elements.push(BerElement::octet_string(value.clone()).with_tag(TAG_RESPONSE_VALUE));
        }
        BerElement::sequence(&elements).with_tag(EXTENDED_RESULT_TAG)
    }

    /// Decode the protocol op
    ///
    /// An empty matched DN or diagnostic message decodes to `None`.
    pub fn decode(element: &BerElement) -> LdapResult<Self> {
        element.expect_tag(EXTENDED_RESULT_TAG)?;
        let mut decoder = BerDecoder::new(element.value());

        let code = decoder.decode_enumerated()?;
        let code = i32::try_from(code)
            .map_err(|_| LdapError::Decoding(format!("Result code {} is out of range", code)))?;
        let matched_dn = non_empty(decoder.decode_utf8_string()?);
        let diagnostic_message = non_empty(decoder.decode_utf8_string()?);

        let mut referrals = Vec::new();
        if let Some(urls) = decoder.decode_optional(&TAG_REFERRAL)? {
            let mut urls = BerDecoder::new(urls);
            while urls.has_remaining() {
                referrals.push(urls.decode_utf8_string()?);
            }
        }

        let oid = decoder.decode_optional_utf8_string(&TAG_RESPONSE_NAME)?;
        if let Some(ref oid) = oid {
            check_decoded_oid(oid)?;
        }
        let value = decoder.decode_optional(&TAG_RESPONSE_VALUE)?.map(<[u8]>::to_vec);
        decoder.expect_end()?;

        Ok(Self {
            result_code: ResultCode::new(code),
            matched_dn,
            diagnostic_message,
            referrals,
            oid,
            value,
            controls: Vec::new(),
        })
    }
}

impl fmt::Display for ExtendedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtendedResult(resultCode={}", self.result_code)?;
        if let Some(ref dn) = self.matched_dn {
            write!(f, ", matchedDN='{}'", dn)?;
        }
        if let Some(ref message) = self.diagnostic_message {
            write!(f, ", diagnosticMessage='{}'", message)?;
        }
        if !self.referrals.is_empty() {
            write!(f, ", referrals={:?}", self.referrals)?;
        }
        if let Some(ref oid) = self.oid {
            write!(f, ", oid={}", oid)?;
        }
        if let Some(ref value) = self.value {
            write!(f, ", valueLength={}", value.len())?;
        }
        write!(f, ")")
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_layout() {
        let request = ExtendedRequest::new("1.2.3", Some(vec![0x01])).unwrap();
        assert_eq!(
            request.encode().encode(),
            vec![0x77, 0x0A, 0x80, 0x05, b'1', b'.', b'2', b'.', b'3', 0x81, 0x01, 0x01]
        );
    }

    #[test]
    fn test_request_round_trip() {
        for request in [
            ExtendedRequest::new("1.3.6.1.4.1.4203.1.11.3", None).unwrap(),
            ExtendedRequest::new("1.3.6.1.4.1.99999.5", Some(Vec::new())).unwrap(),
            ExtendedRequest::from_parts(None, None),
        ] {
            assert_eq!(ExtendedRequest::decode(&request.encode()).unwrap(), request);
        }
    }

    #[test]
    fn test_request_rejects_bad_oid() {
        assert!(ExtendedRequest::new("x", None).unwrap_err().is_usage_error());
        let element = BerElement::sequence(&[BerElement::utf8("x").with_tag(TAG_REQUEST_NAME)])
            .with_tag(EXTENDED_REQUEST_TAG);
        assert!(ExtendedRequest::decode(&element).unwrap_err().is_decoding_error());
    }

    #[test]
    fn test_result_round_trip() {
        let result = ExtendedResult::new(ResultCode::REFERRAL)
            .with_matched_dn("dc=example,dc=com")
            .with_diagnostic_message("try elsewhere")
            .with_referrals(vec!["ldap://a.example.com/".to_string()])
            .with_oid("1.3.6.1.4.1.99999.9")
            .unwrap()
            .with_value(vec![1, 2, 3]);
        assert_eq!(ExtendedResult::decode(&result.encode()).unwrap(), result);

        let minimal = ExtendedResult::new(ResultCode::SUCCESS);
        assert_eq!(ExtendedResult::decode(&minimal.encode()).unwrap(), minimal);
    }

    #[test]
    fn test_result_minimal_layout() {
        let result = ExtendedResult::new(ResultCode::SUCCESS);
        assert_eq!(
            result.encode().encode(),
            vec![0x78, 0x07, 0x0A, 0x01, 0x00, 0x04, 0x00, 0x04, 0x00]
        );
    }

    #[test]
    fn test_unknown_result_code_survives() {
        let result = ExtendedResult::new(ResultCode::new(4242));
        let decoded = ExtendedResult::decode(&result.encode()).unwrap();
        assert_eq!(decoded.result_code().value(), 4242);
    }

    #[test]
    fn test_result_rejects_truncation() {
        let mut encoded = ExtendedResult::new(ResultCode::SUCCESS)
            .with_value(vec![9; 4])
            .encode()
            .encode();
        encoded.truncate(encoded.len() - 1);
        assert!(BerElement::decode(&encoded).is_err());
    }

    #[test]
    fn test_display() {
        let request = ExtendedRequest::new("1.2.3", Some(vec![1, 2])).unwrap();
        assert_eq!(request.to_string(), "ExtendedRequest(oid=1.2.3, valueLength=2)");
        let result = ExtendedResult::new(ResultCode::SUCCESS);
        assert_eq!(result.to_string(), "ExtendedResult(resultCode=0 (success))");
    }
}
