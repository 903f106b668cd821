//! Authorization identity request and response controls (RFC 3829)
//!
//! The request has no value. The response value is the raw authzId
//! (`dn:...`, `u:...` or empty for anonymous), not BER-wrapped.

use crate::decoded::{
    expect_no_json_value, expect_no_value, require_json_value, require_value, ControlType,
    DecodedControl,
};
use crate::error::{LdapError, LdapResult};
use crate::json::fields::{JsonFields, JsonObject};
use serde_json::{Map, Value};

pub(crate) const JSON_AUTHORIZATION_ID: &str = "authorization-id";

/// Raw control value as UTF-8 text
pub(crate) fn decode_authorization_id(name: &str, value: &[u8]) -> LdapResult<String> {
    String::from_utf8(value.to_vec()).map_err(|_| {
        LdapError::Decoding(format!("{} value is not a valid UTF-8 string", name))
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthorizationIdentityRequestControl {
    criticality: bool,
}

impl AuthorizationIdentityRequestControl {
    pub fn new(criticality: bool) -> Self {
        Self { criticality }
    }
}

impl ControlType for AuthorizationIdentityRequestControl {
    const OID: &'static str = "2.16.840.1.113730.3.4.16";
    const NAME: &'static str = "Authorization Identity Request";

    fn criticality(&self) -> bool {
        self.criticality
    }

    fn encode_value(&self) -> Option<Vec<u8>> {
        None
    }

    fn decode_value(criticality: bool, value: Option<&[u8]>) -> LdapResult<Self> {
        expect_no_value(Self::NAME, value)?;
        Ok(Self::new(criticality))
    }

    fn value_json(&self) -> Option<Map<String, Value>> {
        None
    }

    fn decode_value_json(
        criticality: bool,
        value: Option<&Map<String, Value>>,
        _strict: bool,
    ) -> LdapResult<Self> {
        expect_no_json_value(Self::NAME, value)?;
        Ok(Self::new(criticality))
    }

    fn from_decoded(decoded: DecodedControl) -> Option<Self> {
        match decoded {
            DecodedControl::AuthorizationIdentityRequest(control) => Some(control),
            _ => None,
        }
    }
}

/// Identity the server bound the connection to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthorizationIdentityResponseControl {
    authorization_id: String,
    criticality: bool,
}

impl AuthorizationIdentityResponseControl {
    /// Non-critical response
    pub fn new(authorization_id: impl Into<String>) -> Self {
        Self {
            authorization_id: authorization_id.into(),
            criticality: false,
        }
    }

    pub fn with_criticality(mut self, criticality: bool) -> Self {
        self.criticality = criticality;
        self
    }

    /// Empty for an anonymous identity
    pub fn authorization_id(&self) -> &str {
        &self.authorization_id
    }
}

impl ControlType for AuthorizationIdentityResponseControl {
    const OID: &'static str = "2.16.840.1.113730.3.4.15";
    const NAME: &'static str = "Authorization Identity Response";

    fn criticality(&self) -> bool {
        self.criticality
    }

    fn encode_value(&self) -> Option<Vec<u8>> {
        Some(self.authorization_id.as_bytes().to_vec())
    }

    fn decode_value(criticality: bool, value: Option<&[u8]>) -> LdapResult<Self> {
        let value = require_value(Self::NAME, value)?;
        Ok(Self::new(decode_authorization_id(Self::NAME, value)?).with_criticality(criticality))
    }

    fn value_json(&self) -> Option<Map<String, Value>> {
        Some(
            JsonObject::new()
                .str(JSON_AUTHORIZATION_ID, &self.authorization_id)
                .build(),
        )
    }

    fn decode_value_json(
        criticality: bool,
        value: Option<&Map<String, Value>>,
        strict: bool,
    ) -> LdapResult<Self> {
        let value = require_json_value(Self::NAME, value)?;
        let mut fields = JsonFields::new(value, Self::NAME);
        let authorization_id = fields.required_str(JSON_AUTHORIZATION_ID)?;
        fields.finish(strict)?;
        Ok(Self::new(authorization_id).with_criticality(criticality))
    }

    fn from_decoded(decoded: DecodedControl) -> Option<Self> {
        match decoded {
            DecodedControl::AuthorizationIdentityResponse(control) => Some(control),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn responses() -> Vec<AuthorizationIdentityResponseControl> {
        vec![
            AuthorizationIdentityResponseControl::new(""),
            AuthorizationIdentityResponseControl::new("dn:uid=jdoe,ou=People,dc=example,dc=com"),
            AuthorizationIdentityResponseControl::new("u:jdoé"),
        ]
    }

    #[test]
    fn test_response_round_trip() {
        for control in responses() {
            let generic = control.to_control();
            assert_eq!(
                AuthorizationIdentityResponseControl::decode(&generic).unwrap(),
                control
            );
            let json = control.value_json();
            assert_eq!(
                AuthorizationIdentityResponseControl::decode_value_json(false, json.as_ref(), true)
                    .unwrap(),
                control
            );
        }
    }

    #[test]
    fn test_critical_response_keeps_criticality() {
        let registry = crate::registry::ControlRegistry::with_builtins();
        let decoded = registry
            .decode_control(AuthorizationIdentityResponseControl::OID, true, Some(b"u:x"))
            .unwrap();
        assert!(decoded.criticality());
        assert!(decoded.to_control().criticality());

        for control in responses() {
            let control = control.with_criticality(true);
            assert_eq!(
                AuthorizationIdentityResponseControl::decode(&control.to_control()).unwrap(),
                control
            );
            let json = control.value_json();
            assert_eq!(
                AuthorizationIdentityResponseControl::decode_value_json(true, json.as_ref(), true)
                    .unwrap(),
                control
            );
        }
    }

    #[test]
    fn test_response_requires_utf8_value() {
        let err = AuthorizationIdentityResponseControl::decode_value(false, Some(&[0xC3, 0x28]))
            .unwrap_err();
        assert!(err.is_decoding_error());
        assert!(AuthorizationIdentityResponseControl::decode_value(false, None).is_err());
    }

    #[test]
    fn test_response_json_strictness() {
        let object = json!({"authorization-id": "u:a", "note": 1});
        let Value::Object(object) = object else {
            unreachable!()
        };
        assert!(
            AuthorizationIdentityResponseControl::decode_value_json(false, Some(&object), true)
                .is_err()
        );
        assert_eq!(
            AuthorizationIdentityResponseControl::decode_value_json(false, Some(&object), false)
                .unwrap()
                .authorization_id(),
            "u:a"
        );
    }

    #[test]
    fn test_request_has_no_value() {
        let control = AuthorizationIdentityRequestControl::new(true);
        assert!(control.encode_value().is_none());
        assert!(AuthorizationIdentityRequestControl::decode_value(true, Some(b"x")).is_err());
    }
}
