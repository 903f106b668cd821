//! Proxied authorization v2 request control (RFC 4370)
//!
//! The value is the raw authzId of the identity to act as. RFC 4370
//! requires the control to be critical.

use crate::controls::authorization_identity::{decode_authorization_id, JSON_AUTHORIZATION_ID};
use crate::decoded::{require_json_value, require_value, ControlType, DecodedControl};
use crate::error::{LdapError, LdapResult};
use crate::json::fields::{JsonFields, JsonObject};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxiedAuthorizationV2RequestControl {
    authorization_id: String,
}

impl ProxiedAuthorizationV2RequestControl {
    pub fn new(authorization_id: impl Into<String>) -> Self {
        Self {
            authorization_id: authorization_id.into(),
        }
    }

    pub fn authorization_id(&self) -> &str {
        &self.authorization_id
    }

    fn check_criticality(criticality: bool) -> LdapResult<()> {
        if !criticality {
            return Err(LdapError::Decoding(format!(
                "{} control must be critical",
                Self::NAME
            )));
        }
        Ok(())
    }
}

impl ControlType for ProxiedAuthorizationV2RequestControl {
    const OID: &'static str = "2.16.840.1.113730.3.4.18";
    const NAME: &'static str = "Proxied Authorization V2 Request";

    fn criticality(&self) -> bool {
        true
    }

    fn encode_value(&self) -> Option<Vec<u8>> {
        Some(self.authorization_id.as_bytes().to_vec())
    }

    fn decode_value(criticality: bool, value: Option<&[u8]>) -> LdapResult<Self> {
        Self::check_criticality(criticality)?;
        let value = require_value(Self::NAME, value)?;
        Ok(Self::new(decode_authorization_id(Self::NAME, value)?))
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
        Self::check_criticality(criticality)?;
        let value = require_json_value(Self::NAME, value)?;
        let mut fields = JsonFields::new(value, Self::NAME);
        let authorization_id = fields.required_str(JSON_AUTHORIZATION_ID)?;
        fields.finish(strict)?;
        Ok(Self::new(authorization_id))
    }

    fn from_decoded(decoded: DecodedControl) -> Option<Self> {
        match decoded {
            DecodedControl::ProxiedAuthorizationV2(control) => Some(control),
            _ => None,
        }
    }
}
