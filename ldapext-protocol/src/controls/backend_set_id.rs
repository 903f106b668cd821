//! Get backend set ID request and response controls
//!
//! Used with an entry-balancing proxy to learn which backend set served
//! an operation.
//!
//! ```text
//! GetBackendSetIDValue ::= SEQUENCE {
//!      entryBalancingRequestProcessorID     OCTET STRING,
//!      backendSetIDs                        SET SIZE (1..MAX) OF OCTET STRING }
//! ```

use crate::decoded::{
    expect_no_json_value, expect_no_value, require_json_value, require_value, ControlType,
    DecodedControl,
};
use crate::error::{LdapError, LdapResult};
use crate::json::fields::{JsonFields, JsonObject};
use ldapext_asn1::ber::{BerDecoder, BerElement, BerTag};
use serde_json::{Map, Value};

const JSON_PROCESSOR_ID: &str = "entry-balancing-request-processor-id";
const JSON_BACKEND_SET_IDS: &str = "backend-set-ids";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GetBackendSetIdRequestControl {
    criticality: bool,
}

impl GetBackendSetIdRequestControl {
    pub fn new(criticality: bool) -> Self {
        Self { criticality }
    }
}

impl ControlType for GetBackendSetIdRequestControl {
    const OID: &'static str = "1.3.6.1.4.1.30221.2.5.33";
    const NAME: &'static str = "Get Backend Set ID Request";

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
            DecodedControl::GetBackendSetIdRequest(control) => Some(control),
            _ => None,
        }
    }
}

/// Entry-balancing processor ID plus the backend sets that handled the
/// operation (at least one)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GetBackendSetIdResponseControl {
    processor_id: String,
    backend_set_ids: Vec<String>,
    criticality: bool,
}

impl GetBackendSetIdResponseControl {
    /// Non-critical response
    ///
    /// # Error Handling
    /// Returns a usage error if `backend_set_ids` is empty.
    pub fn new(
        processor_id: impl Into<String>,
        backend_set_ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> LdapResult<Self> {
        let backend_set_ids: Vec<String> = backend_set_ids.into_iter().map(Into::into).collect();
        if backend_set_ids.is_empty() {
            return Err(LdapError::Usage(
                "At least one backend set ID is required".to_string(),
            ));
        }
        Ok(Self {
            processor_id: processor_id.into(),
            backend_set_ids,
            criticality: false,
        })
    }

    pub fn with_criticality(mut self, criticality: bool) -> Self {
        self.criticality = criticality;
        self
    }

    pub fn processor_id(&self) -> &str {
        &self.processor_id
    }

    pub fn backend_set_ids(&self) -> &[String] {
        &self.backend_set_ids
    }

    fn from_decoded_parts(
        criticality: bool,
        processor_id: String,
        backend_set_ids: Vec<String>,
    ) -> LdapResult<Self> {
        if backend_set_ids.is_empty() {
            return Err(LdapError::Decoding(format!(
                "{} value has no backend set IDs",
                Self::NAME
            )));
        }
        Ok(Self {
            processor_id,
            backend_set_ids,
            criticality,
        })
    }
}

impl ControlType for GetBackendSetIdResponseControl {
    const OID: &'static str = "1.3.6.1.4.1.30221.2.5.34";
    const NAME: &'static str = "Get Backend Set ID Response";

    fn criticality(&self) -> bool {
        self.criticality
    }

    fn encode_value(&self) -> Option<Vec<u8>> {
        let ids: Vec<BerElement> = self
            .backend_set_ids
            .iter()
            .map(|id| BerElement::utf8(id))
            .collect();
        let value = BerElement::sequence(&[
            BerElement::utf8(&self.processor_id),
            BerElement::set(&ids),
        ]);
        Some(value.encode())
    }

    fn decode_value(criticality: bool, value: Option<&[u8]>) -> LdapResult<Self> {
        let value = require_value(Self::NAME, value)?;
        let element = BerElement::decode(value)?;
        element.expect_tag(BerTag::SEQUENCE)?;

        let mut decoder = BerDecoder::new(element.value());
        let processor_id = decoder.decode_utf8_string()?;
        let mut ids = BerDecoder::new(decoder.decode_set()?);
        decoder.expect_end()?;

        let mut backend_set_ids = Vec::new();
        while ids.has_remaining() {
            backend_set_ids.push(ids.decode_utf8_string()?);
        }

        Self::from_decoded_parts(criticality, processor_id, backend_set_ids)
    }

    fn value_json(&self) -> Option<Map<String, Value>> {
        Some(
            JsonObject::new()
                .str(JSON_PROCESSOR_ID, &self.processor_id)
                .strings(JSON_BACKEND_SET_IDS, &self.backend_set_ids)
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
        let processor_id = fields.required_str(JSON_PROCESSOR_ID)?;
        let backend_set_ids = fields.string_array(JSON_BACKEND_SET_IDS, true)?;
        fields.finish(strict)?;

        Self::from_decoded_parts(criticality, processor_id, backend_set_ids)
    }

    fn from_decoded(decoded: DecodedControl) -> Option<Self> {
        match decoded {
            DecodedControl::GetBackendSetIdResponse(control) => Some(control),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixtures() -> Vec<GetBackendSetIdResponseControl> {
        vec![
            GetBackendSetIdResponseControl::new("eb-id", ["bs-id"]).unwrap(),
            GetBackendSetIdResponseControl::new("", ["a", "b", "c"]).unwrap(),
        ]
    }

    #[test]
    fn test_decode_single_backend_set() {
        // SEQUENCE { "eb-id", SET { "bs-id" } }
        let value = [
            0x30, 0x10, 0x04, 0x05, b'e', b'b', b'-', b'i', b'd', 0x31, 0x07, 0x04, 0x05, b'b',
            b's', b'-', b'i', b'd',
        ];
        let control = GetBackendSetIdResponseControl::decode_value(false, Some(&value)).unwrap();
        assert_eq!(control.processor_id(), "eb-id");
        assert_eq!(control.backend_set_ids(), ["bs-id".to_string()]);
        assert_eq!(control.encode_value().unwrap(), value.to_vec());
    }

    #[test]
    fn test_value_not_a_sequence() {
        let value = BerElement::utf8("eb-id").encode();
        let err = GetBackendSetIdResponseControl::decode_value(false, Some(&value)).unwrap_err();
        assert!(err.is_decoding_error());
    }

    #[test]
    fn test_round_trips() {
        for control in fixtures() {
            assert_eq!(
                GetBackendSetIdResponseControl::decode(&control.to_control()).unwrap(),
                control
            );
            let json = control.value_json();
            assert_eq!(
                GetBackendSetIdResponseControl::decode_value_json(false, json.as_ref(), true)
                    .unwrap(),
                control
            );
        }
    }

    #[test]
    fn test_critical_response_round_trip() {
        for control in fixtures() {
            let control = control.with_criticality(true);
            let decoded = GetBackendSetIdResponseControl::decode(&control.to_control()).unwrap();
            assert!(decoded.criticality());
            assert_eq!(decoded, control);

            let json = control.value_json();
            assert_eq!(
                GetBackendSetIdResponseControl::decode_value_json(true, json.as_ref(), true)
                    .unwrap(),
                control
            );
        }
    }

    #[test]
    fn test_empty_set_rejected() {
        let empty: [&str; 0] = [];
        assert!(GetBackendSetIdResponseControl::new("eb-id", empty)
            .unwrap_err()
            .is_usage_error());

        let value = BerElement::sequence(&[BerElement::utf8("eb-id"), BerElement::set(&[])]).encode();
        let err = GetBackendSetIdResponseControl::decode_value(false, Some(&value)).unwrap_err();
        assert!(err.is_decoding_error());

        let Value::Object(object) = json!({
            "entry-balancing-request-processor-id": "eb-id",
            "backend-set-ids": []
        }) else {
            unreachable!()
        };
        assert!(
            GetBackendSetIdResponseControl::decode_value_json(false, Some(&object), true).is_err()
        );
    }

    #[test]
    fn test_json_shape() {
        let control = GetBackendSetIdResponseControl::new("eb-id", ["bs-id"]).unwrap();
        assert_eq!(
            Value::Object(control.value_json().unwrap()),
            json!({
                "entry-balancing-request-processor-id": "eb-id",
                "backend-set-ids": ["bs-id"]
            })
        );
    }
}
