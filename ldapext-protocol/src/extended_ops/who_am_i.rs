//! Who Am I extended operation (RFC 4532)
//!
//! The request has no value. A successful result carries the raw authzId
//! as its value; an empty value means anonymous.

use crate::control::Control;
use crate::error::{LdapError, LdapResult};
use crate::extended::{ExtendedRequest, ExtendedResult};
use crate::extended_ops::{ExtendedRequestType, ExtendedResultType};
use ldapext_core::ResultCode;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct WhoAmIExtendedRequest {
    controls: Vec<Control>,
}

impl WhoAmIExtendedRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_controls(mut self, controls: Vec<Control>) -> Self {
        self.controls = controls;
        self
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }
}

impl ExtendedRequestType for WhoAmIExtendedRequest {
    const OID: &'static str = "1.3.6.1.4.1.4203.1.11.3";
    const NAME: &'static str = "Who Am I Request";

    fn decode_request(request: &ExtendedRequest) -> LdapResult<Self> {
        if request.has_value() {
            return Err(LdapError::Decoding(format!(
                "{} must not have a value",
                Self::NAME
            )));
        }
        Ok(Self {
            controls: request.controls().to_vec(),
        })
    }

    fn to_extended_request(&self) -> ExtendedRequest {
        ExtendedRequest::from_parts(Some(Self::OID.to_string()), None)
            .with_controls(self.controls.clone())
    }
}

/// Result of a Who Am I request
///
/// The generic result is kept without its value; the value is exposed as
/// [`authorization_id`](Self::authorization_id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WhoAmIExtendedResult {
    base: ExtendedResult,
    authorization_id: Option<String>,
}

impl WhoAmIExtendedResult {
    pub fn new(result_code: ResultCode, authorization_id: Option<String>) -> Self {
        Self {
            base: ExtendedResult::new(result_code),
            authorization_id,
        }
    }

    /// Result metadata (code, matched DN, diagnostic message, referrals)
    pub fn result(&self) -> &ExtendedResult {
        &self.base
    }

    pub fn authorization_id(&self) -> Option<&str> {
        self.authorization_id.as_deref()
    }
}

impl ExtendedResultType for WhoAmIExtendedResult {
    const REQUEST_OID: &'static str = WhoAmIExtendedRequest::OID;
    const NAME: &'static str = "Who Am I Result";

    fn decode(result: &ExtendedResult) -> LdapResult<Self> {
        let authorization_id = result
            .value()
            .map(|value| {
                String::from_utf8(value.to_vec()).map_err(|_| {
                    LdapError::Decoding(format!("{} value is not valid UTF-8", Self::NAME))
                })
            })
            .transpose()?;
        Ok(Self {
            base: result.clone().with_optional_value(None),
            authorization_id,
        })
    }

    fn to_extended_result(&self) -> ExtendedResult {
        self.base
            .clone()
            .with_optional_value(self.authorization_id.as_ref().map(|id| id.as_bytes().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request() {
        let request = WhoAmIExtendedRequest::new().to_extended_request();
        assert_eq!(request.oid(), Some(WhoAmIExtendedRequest::OID));
        assert!(!request.has_value());
        assert_eq!(
            WhoAmIExtendedRequest::decode(&request).unwrap(),
            WhoAmIExtendedRequest::new()
        );

        let with_value = ExtendedRequest::new(WhoAmIExtendedRequest::OID, Some(vec![])).unwrap();
        assert!(WhoAmIExtendedRequest::decode(&with_value).is_err());

        let other = ExtendedRequest::new("1.2.3", None).unwrap();
        assert!(WhoAmIExtendedRequest::decode(&other).is_err());
    }

    #[test]
    fn test_request_keeps_controls() {
        let controls = vec![Control::new("1.3.6.1.4.1.99999.3", true, Some(vec![1])).unwrap()];
        let generic = ExtendedRequest::new(WhoAmIExtendedRequest::OID, None)
            .unwrap()
            .with_controls(controls.clone());

        let registry = crate::registry::ControlRegistry::with_builtins();
        let request = registry.decode_extended_request(&generic).unwrap();
        let crate::extended_ops::DecodedExtendedRequest::WhoAmI(request) = request else {
            panic!("expected who am i request");
        };
        assert_eq!(request.controls(), &controls[..]);
        assert_eq!(request.to_extended_request(), generic);
    }

    #[test]
    fn test_result_round_trip() {
        for result in [
            WhoAmIExtendedResult::new(ResultCode::SUCCESS, Some("u:jdoe".to_string())),
            WhoAmIExtendedResult::new(ResultCode::SUCCESS, Some(String::new())),
            WhoAmIExtendedResult::new(ResultCode::new(53), None),
        ] {
            let generic = result.to_extended_result();
            let wire = ExtendedResult::decode(&generic.encode()).unwrap();
            assert_eq!(WhoAmIExtendedResult::decode(&wire).unwrap(), result);
        }
    }

    #[test]
    fn test_result_keeps_metadata() {
        let generic = ExtendedResult::new(ResultCode::SUCCESS)
            .with_diagnostic_message("ok")
            .with_value(b"dn:cn=admin".to_vec());
        let result = WhoAmIExtendedResult::decode(&generic).unwrap();
        assert_eq!(result.result().diagnostic_message(), Some("ok"));
        assert!(!result.result().has_value());
        assert_eq!(result.to_extended_result(), generic);
    }

    #[test]
    fn test_result_rejects_invalid_utf8() {
        let generic = ExtendedResult::new(ResultCode::SUCCESS).with_value(vec![0xFF, 0xFE]);
        assert!(WhoAmIExtendedResult::decode(&generic).unwrap_err().is_decoding_error());
    }
}
