//! Password modify extended operation (RFC 3062)
//!
//! ```text
//! PasswdModifyRequestValue ::= SEQUENCE {
//!      userIdentity    [0]  OCTET STRING OPTIONAL
//!      oldPasswd       [1]  OCTET STRING OPTIONAL
//!      newPasswd       [2]  OCTET STRING OPTIONAL }
//!
//! PasswdModifyResponseValue ::= SEQUENCE {
//!      genPasswd       [0]     OCTET STRING OPTIONAL }
//! ```
//!
//! Passwords are octet strings, not text, so they stay as bytes.

use crate::control::Control;
use crate::error::LdapResult;
use crate::extended::{ExtendedRequest, ExtendedResult};
use crate::extended_ops::{ExtendedRequestType, ExtendedResultType};
use ldapext_asn1::ber::{BerDecoder, BerElement, BerTag};
use ldapext_core::ResultCode;
use std::fmt;

const TAG_USER_IDENTITY: BerTag = BerTag::context_specific(false, 0);
const TAG_OLD_PASSWORD: BerTag = BerTag::context_specific(false, 1);
const TAG_NEW_PASSWORD: BerTag = BerTag::context_specific(false, 2);
const TAG_GENERATED_PASSWORD: BerTag = BerTag::context_specific(false, 0);

#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct PasswordModifyExtendedRequest {
    user_identity: Option<String>,
    old_password: Option<Vec<u8>>,
    new_password: Option<Vec<u8>>,
    controls: Vec<Control>,
}

impl PasswordModifyExtendedRequest {
    /// Request with every field left to the server (change own password to
    /// a generated one)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_identity(mut self, user_identity: impl Into<String>) -> Self {
        self.user_identity = Some(user_identity.into());
        self
    }

    pub fn with_old_password(mut self, password: impl Into<Vec<u8>>) -> Self {
        self.old_password = Some(password.into());
        self
    }

    pub fn with_new_password(mut self, password: impl Into<Vec<u8>>) -> Self {
        self.new_password = Some(password.into());
        self
    }

    pub fn with_controls(mut self, controls: Vec<Control>) -> Self {
        self.controls = controls;
        self
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn user_identity(&self) -> Option<&str> {
        self.user_identity.as_deref()
    }

    pub fn old_password(&self) -> Option<&[u8]> {
        self.old_password.as_deref()
    }

    pub fn new_password(&self) -> Option<&[u8]> {
        self.new_password.as_deref()
    }

    fn is_empty(&self) -> bool {
        self.user_identity.is_none() && self.old_password.is_none() && self.new_password.is_none()
    }
}

impl fmt::Debug for PasswordModifyExtendedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordModifyExtendedRequest")
            .field("user_identity", &self.user_identity)
            .field("old_password", &self.old_password.as_ref().map(|_| "<redacted>"))
            .field("new_password", &self.new_password.as_ref().map(|_| "<redacted>"))
            .field("controls", &self.controls)
            .finish()
    }
}

impl ExtendedRequestType for PasswordModifyExtendedRequest {
    const OID: &'static str = "1.3.6.1.4.1.4203.1.11.1";
    const NAME: &'static str = "Password Modify Request";

    fn decode_request(request: &ExtendedRequest) -> LdapResult<Self> {
        let controls = request.controls().to_vec();
        let Some(value) = request.value() else {
            return Ok(Self::new().with_controls(controls));
        };
        let element = BerElement::decode(value)?;
        element.expect_tag(BerTag::SEQUENCE)?;

        let mut decoder = BerDecoder::new(element.value());
        let user_identity = decoder.decode_optional_utf8_string(&TAG_USER_IDENTITY)?;
        let old_password = decoder.decode_optional(&TAG_OLD_PASSWORD)?.map(<[u8]>::to_vec);
        let new_password = decoder.decode_optional(&TAG_NEW_PASSWORD)?.map(<[u8]>::to_vec);
        decoder.expect_end()?;

        Ok(Self {
            user_identity,
            old_password,
            new_password,
            controls,
        })
    }

    fn to_extended_request(&self) -> ExtendedRequest {
        let value = if self.is_empty() {
            None
        } else {
            let mut elements = Vec::with_capacity(3);
            if let Some(ref identity) = self.user_identity {
                elements.push(BerElement::utf8(identity).with_tag(TAG_USER_IDENTITY));
            }
            if let Some(ref password) = self.old_password {
                elements.push(BerElement::octet_string(password.clone()).with_tag(TAG_OLD_PASSWORD));
            }
            if let Some(ref password) = self.new_password {
                elements.push(BerElement::octet_string(password.clone()).with_tag(TAG_NEW_PASSWORD));
            }
            Some(BerElement::sequence(&elements).encode())
        };
        ExtendedRequest::from_parts(Some(Self::OID.to_string()), value)
            .with_controls(self.controls.clone())
    }
}

/// Result of a password modify request
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PasswordModifyExtendedResult {
    base: ExtendedResult,
    generated_password: Option<Vec<u8>>,
}

impl PasswordModifyExtendedResult {
    pub fn new(result_code: ResultCode, generated_password: Option<Vec<u8>>) -> Self {
        Self {
            base: ExtendedResult::new(result_code),
            generated_password,
        }
    }

    pub fn result(&self) -> &ExtendedResult {
        &self.base
    }

    /// Password chosen by the server, when the request left it open
    pub fn generated_password(&self) -> Option<&[u8]> {
        self.generated_password.as_deref()
    }
}

impl fmt::Debug for PasswordModifyExtendedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordModifyExtendedResult")
            .field("base", &self.base)
            .field(
                "generated_password",
                &self.generated_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl ExtendedResultType for PasswordModifyExtendedResult {
    const REQUEST_OID: &'static str = PasswordModifyExtendedRequest::OID;
    const NAME: &'static str = "Password Modify Result";

    fn decode(result: &ExtendedResult) -> LdapResult<Self> {
        let generated_password = match result.value() {
            None => None,
            Some(value) => {
                let element = BerElement::decode(value)?;
                element.expect_tag(BerTag::SEQUENCE)?;
                let mut decoder = BerDecoder::new(element.value());
                let password = decoder
                    .decode_optional(&TAG_GENERATED_PASSWORD)?
                    .map(<[u8]>::to_vec);
                decoder.expect_end()?;
                password
            }
        };
        Ok(Self {
            base: result.clone().with_optional_value(None),
            generated_password,
        })
    }

    fn to_extended_result(&self) -> ExtendedResult {
        let value = self.generated_password.as_ref().map(|password| {
            BerElement::sequence(&[
                BerElement::octet_string(password.clone()).with_tag(TAG_GENERATED_PASSWORD)
            ])
            .encode()
        });
        self.base.clone().with_optional_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requests() -> Vec<PasswordModifyExtendedRequest> {
        vec![
            PasswordModifyExtendedRequest::new(),
            PasswordModifyExtendedRequest::new().with_new_password(b"s3cret".to_vec()),
            PasswordModifyExtendedRequest::new()
                .with_user_identity("u:jdoe")
                .with_old_password(b"old".to_vec())
                .with_new_password(b"new".to_vec()),
        ]
    }

    #[test]
    fn test_request_round_trip() {
        for request in requests() {
            let generic = request.to_extended_request();
            let wire = ExtendedRequest::decode(&generic.encode()).unwrap();
            assert_eq!(PasswordModifyExtendedRequest::decode(&wire).unwrap(), request);
        }
    }

    #[test]
    fn test_request_keeps_controls() {
        let controls = vec![
            Control::new("1.3.6.1.4.1.99999.3", false, None).unwrap(),
            Control::new("1.3.6.1.4.1.99999.4", true, Some(vec![7, 7])).unwrap(),
        ];
        for request in requests() {
            let generic = request.clone().with_controls(controls.clone()).to_extended_request();
            assert_eq!(generic.controls(), &controls[..]);

            let decoded = PasswordModifyExtendedRequest::decode(&generic).unwrap();
            assert_eq!(decoded.controls(), &controls[..]);
            assert_eq!(decoded.to_extended_request(), generic);
        }
    }

    #[test]
    fn test_empty_request_has_no_value() {
        let generic = PasswordModifyExtendedRequest::new().to_extended_request();
        assert!(!generic.has_value());
    }

    #[test]
    fn test_request_layout() {
        let request = PasswordModifyExtendedRequest::new().with_new_password(b"pw".to_vec());
        assert_eq!(
            request.to_extended_request().value(),
            Some(&[0x30, 0x04, 0x82, 0x02, b'p', b'w'][..])
        );
    }

    #[test]
    fn test_request_rejects_out_of_order_fields() {
        // [2] before [0]
        let value = vec![0x30, 0x06, 0x82, 0x01, b'n', 0x80, 0x01, b'u'];
        let generic = ExtendedRequest::new(PasswordModifyExtendedRequest::OID, Some(value)).unwrap();
        assert!(PasswordModifyExtendedRequest::decode(&generic).is_err());
    }

    #[test]
    fn test_result_round_trip() {
        for result in [
            PasswordModifyExtendedResult::new(ResultCode::SUCCESS, None),
            PasswordModifyExtendedResult::new(ResultCode::SUCCESS, Some(b"generated".to_vec())),
            PasswordModifyExtendedResult::new(ResultCode::new(19), None),
        ] {
            let generic = result.to_extended_result();
            let wire = ExtendedResult::decode(&generic.encode()).unwrap();
            assert_eq!(PasswordModifyExtendedResult::decode(&wire).unwrap(), result);
        }
    }

    #[test]
    fn test_result_with_empty_sequence() {
        let generic = ExtendedResult::new(ResultCode::SUCCESS).with_value(vec![0x30, 0x00]);
        let result = PasswordModifyExtendedResult::decode(&generic).unwrap();
        assert!(result.generated_password().is_none());
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let request = PasswordModifyExtendedRequest::new().with_new_password(b"hunter2".to_vec());
        let debug = format!("{:?}", request);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
