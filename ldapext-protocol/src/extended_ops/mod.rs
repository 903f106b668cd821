//! Typed extended operations
//!
//! | Operation | OID |
//! |-----------|-----|
//! | Who Am I (RFC 4532) | 1.3.6.1.4.1.4203.1.11.3 |
//! | Password modify (RFC 3062) | 1.3.6.1.4.1.4203.1.11.1 |
//!
//! Results are registered under the OID of the request they answer,
//! since most servers send no response name.

pub mod password_modify;
pub mod who_am_i;

pub use password_modify::{PasswordModifyExtendedRequest, PasswordModifyExtendedResult};
pub use who_am_i::{WhoAmIExtendedRequest, WhoAmIExtendedResult};

use crate::error::{LdapError, LdapResult};
use crate::extended::{ExtendedRequest, ExtendedResult};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An extended request type with a fixed OID
pub trait ExtendedRequestType: Sized + Clone + Into<DecodedExtendedRequest> {
    const OID: &'static str;
    const NAME: &'static str;

    /// Decode from a generic request whose OID is already known to match
    fn decode_request(request: &ExtendedRequest) -> LdapResult<Self>;

    fn to_extended_request(&self) -> ExtendedRequest;

    /// Decode a generic request, checking its OID first
    fn decode(request: &ExtendedRequest) -> LdapResult<Self> {
        if request.oid() != Some(Self::OID) {
            return Err(LdapError::Decoding(format!(
                "Extended request OID {:?} does not match {} ({})",
                request.oid(),
                Self::OID,
                Self::NAME
            )));
        }
        Self::decode_request(request)
    }
}

/// An extended result type, keyed by the OID of its request
pub trait ExtendedResultType: Sized + Clone + Into<DecodedExtendedResult> {
    const REQUEST_OID: &'static str;
    const NAME: &'static str;

    fn decode(result: &ExtendedResult) -> LdapResult<Self>;

    fn to_extended_result(&self) -> ExtendedResult;
}

/// An extended request decoded by an application-registered decoder
pub trait CustomExtendedRequest: fmt::Debug + Send + Sync {
    fn to_extended_request(&self) -> ExtendedRequest;

    fn as_any(&self) -> &dyn Any;
}

/// An extended result decoded by an application-registered decoder
pub trait CustomExtendedResult: fmt::Debug + Send + Sync {
    fn to_extended_result(&self) -> ExtendedResult;

    fn as_any(&self) -> &dyn Any;
}

/// An extended request after registry dispatch
#[derive(Debug, Clone)]
pub enum DecodedExtendedRequest {
    WhoAmI(WhoAmIExtendedRequest),
    PasswordModify(PasswordModifyExtendedRequest),
    Custom(Arc<dyn CustomExtendedRequest>),
    Generic(ExtendedRequest),
}

impl DecodedExtendedRequest {
    pub fn to_extended_request(&self) -> ExtendedRequest {
        match self {
            DecodedExtendedRequest::WhoAmI(r) => r.to_extended_request(),
            DecodedExtendedRequest::PasswordModify(r) => r.to_extended_request(),
            DecodedExtendedRequest::Custom(r) => r.to_extended_request(),
            DecodedExtendedRequest::Generic(r) => r.clone(),
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, DecodedExtendedRequest::Generic(_))
    }
}

impl PartialEq for DecodedExtendedRequest {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DecodedExtendedRequest::WhoAmI(a), DecodedExtendedRequest::WhoAmI(b)) => a == b,
            (
                DecodedExtendedRequest::PasswordModify(a),
                DecodedExtendedRequest::PasswordModify(b),
            ) => a == b,
            (DecodedExtendedRequest::Custom(a), DecodedExtendedRequest::Custom(b)) => {
                a.to_extended_request() == b.to_extended_request()
            }
            (DecodedExtendedRequest::Generic(a), DecodedExtendedRequest::Generic(b)) => a == b,
            _ => false,
        }
    }
}

impl From<WhoAmIExtendedRequest> for DecodedExtendedRequest {
    fn from(request: WhoAmIExtendedRequest) -> Self {
        DecodedExtendedRequest::WhoAmI(request)
    }
}

impl From<PasswordModifyExtendedRequest> for DecodedExtendedRequest {
    fn from(request: PasswordModifyExtendedRequest) -> Self {
        DecodedExtendedRequest::PasswordModify(request)
    }
}

/// An extended result after registry dispatch
#[derive(Debug, Clone)]
pub enum DecodedExtendedResult {
    WhoAmI(WhoAmIExtendedResult),
    PasswordModify(PasswordModifyExtendedResult),
    Custom(Arc<dyn CustomExtendedResult>),
    Generic(ExtendedResult),
}

impl DecodedExtendedResult {
    pub fn to_extended_result(&self) -> ExtendedResult {
        match self {
            DecodedExtendedResult::WhoAmI(r) => r.to_extended_result(),
            DecodedExtendedResult::PasswordModify(r) => r.to_extended_result(),
            DecodedExtendedResult::Custom(r) => r.to_extended_result(),
            DecodedExtendedResult::Generic(r) => r.clone(),
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, DecodedExtendedResult::Generic(_))
    }
}

impl PartialEq for DecodedExtendedResult {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DecodedExtendedResult::WhoAmI(a), DecodedExtendedResult::WhoAmI(b)) => a == b,
            (
                DecodedExtendedResult::PasswordModify(a),
                DecodedExtendedResult::PasswordModify(b),
            ) => a == b,
            (DecodedExtendedResult::Custom(a), DecodedExtendedResult::Custom(b)) => {
                a.to_extended_result() == b.to_extended_result()
            }
            (DecodedExtendedResult::Generic(a), DecodedExtendedResult::Generic(b)) => a == b,
            _ => false,
        }
    }
}

impl From<WhoAmIExtendedResult> for DecodedExtendedResult {
    fn from(result: WhoAmIExtendedResult) -> Self {
        DecodedExtendedResult::WhoAmI(result)
    }
}

impl From<PasswordModifyExtendedResult> for DecodedExtendedResult {
    fn from(result: PasswordModifyExtendedResult) -> Self {
        DecodedExtendedResult::PasswordModify(result)
    }
}

/// Registry adapter for typed requests
pub(crate) fn decode_typed_request<T: ExtendedRequestType>(
    request: &ExtendedRequest,
) -> LdapResult<DecodedExtendedRequest> {
    T::decode(request).map(Into::into)
}

/// Registry adapter for typed results
pub(crate) fn decode_typed_result<T: ExtendedResultType>(
    result: &ExtendedResult,
) -> LdapResult<DecodedExtendedResult> {
    T::decode(result).map(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ControlRegistry;
    use ldapext_core::ResultCode;

    #[test]
    fn test_registry_dispatch() {
        let registry = ControlRegistry::with_builtins();

        let request = WhoAmIExtendedRequest::new().to_extended_request();
        let decoded = registry.decode_extended_request(&request).unwrap();
        assert!(matches!(decoded, DecodedExtendedRequest::WhoAmI(_)));
        assert_eq!(decoded.to_extended_request(), request);

        let result = ExtendedResult::new(ResultCode::SUCCESS).with_value(b"dn:cn=admin".to_vec());
        let decoded = registry
            .decode_extended_result(WhoAmIExtendedRequest::OID, &result)
            .unwrap();
        let DecodedExtendedResult::WhoAmI(who) = decoded else {
            panic!("expected who am i result");
        };
        assert_eq!(who.authorization_id(), Some("dn:cn=admin"));
    }

    #[test]
    fn test_unknown_oid_stays_generic() {
        let registry = ControlRegistry::with_builtins();

        let request = ExtendedRequest::new("1.3.6.1.4.1.99999.3", Some(vec![0xDE, 0xAD])).unwrap();
        let decoded = registry.decode_extended_request(&request).unwrap();
        assert_eq!(decoded, DecodedExtendedRequest::Generic(request));

        let result = ExtendedResult::new(ResultCode::SUCCESS).with_value(vec![0xBE, 0xEF]);
        let decoded = registry
            .decode_extended_result("1.3.6.1.4.1.99999.3", &result)
            .unwrap();
        assert!(decoded.is_generic());
        assert_eq!(decoded.to_extended_result(), result);
    }

    #[test]
    fn test_request_without_oid_stays_generic() {
        let registry = ControlRegistry::with_builtins();
        let request = ExtendedRequest::from_parts(None, None);
        assert!(registry.decode_extended_request(&request).unwrap().is_generic());
    }

    #[test]
    fn test_malformed_registered_request_is_error() {
        let registry = ControlRegistry::with_builtins();
        let request = ExtendedRequest::new(PasswordModifyExtendedRequest::OID, Some(vec![0x04, 0x00]))
            .unwrap();
        let err = registry.decode_extended_request(&request).unwrap_err();
        assert!(err.is_decoding_error());
    }
}
