//! Intermediate client request control
//!
//! Lets an application acting on behalf of other clients describe the
//! chain of clients behind a request. Each hop wraps the one downstream
//! of it, so the value is recursive.
//!
//! ```text
//! IntermediateClientRequest ::= SEQUENCE {
//!      downstreamRequest       [0] IntermediateClientRequest OPTIONAL,
//!      downstreamClientAddress [1] OCTET STRING OPTIONAL,
//!      downstreamClientSecure  [2] BOOLEAN DEFAULT FALSE,
//!      clientIdentity          [3] authzId OPTIONAL,
//!      clientName              [4] OCTET STRING OPTIONAL,
//!      clientSessionID         [5] OCTET STRING OPTIONAL,
//!      clientRequestID         [6] OCTET STRING OPTIONAL }
//! ```

use crate::decoded::{require_json_value, require_value, ControlType, DecodedControl};
use crate::error::{LdapError, LdapResult};
use crate::json::fields::{JsonFields, JsonObject};
use crate::registry::CodecConfig;
use ldapext_asn1::ber::{BerDecoder, BerElement, BerTag};
use serde_json::{Map, Value};

const TAG_DOWNSTREAM_REQUEST: BerTag = BerTag::context_specific(true, 0);
const TAG_DOWNSTREAM_ADDRESS: BerTag = BerTag::context_specific(false, 1);
const TAG_DOWNSTREAM_SECURE: BerTag = BerTag::context_specific(false, 2);
const TAG_CLIENT_IDENTITY: BerTag = BerTag::context_specific(false, 3);
const TAG_CLIENT_NAME: BerTag = BerTag::context_specific(false, 4);
const TAG_SESSION_ID: BerTag = BerTag::context_specific(false, 5);
const TAG_REQUEST_ID: BerTag = BerTag::context_specific(false, 6);

const JSON_DOWNSTREAM_REQUEST: &str = "downstream-request";
const JSON_DOWNSTREAM_ADDRESS: &str = "downstream-client-address";
const JSON_DOWNSTREAM_SECURE: &str = "downstream-client-secure";
const JSON_CLIENT_IDENTITY: &str = "client-identity";
const JSON_CLIENT_NAME: &str = "client-name";
const JSON_SESSION_ID: &str = "client-session-id";
const JSON_REQUEST_ID: &str = "client-request-id";

const CONTEXT: &str = "Intermediate client request";

fn push_utf8(elements: &mut Vec<BerElement>, tag: BerTag, value: &Option<String>) {
    if let Some(value) = value {
        elements.push(BerElement::utf8(value).with_tag(tag));
    }
}

/// One hop of the client chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct IntermediateClientRequestValue {
    downstream_request: Option<Box<IntermediateClientRequestValue>>,
    downstream_client_address: Option<String>,
    downstream_client_secure: bool,
    client_identity: Option<String>,
    client_name: Option<String>,
    client_session_id: Option<String>,
    client_request_id: Option<String>,
}

impl IntermediateClientRequestValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_downstream_request(mut self, downstream: IntermediateClientRequestValue) -> Self {
        self.downstream_request = Some(Box::new(downstream));
        self
    }

    pub fn with_downstream_client_address(mut self, address: impl Into<String>) -> Self {
        self.downstream_client_address = Some(address.into());
        self
    }

    pub fn with_downstream_client_secure(mut self, secure: bool) -> Self {
        self.downstream_client_secure = secure;
        self
    }

    pub fn with_client_identity(mut self, identity: impl Into<String>) -> Self {
        self.client_identity = Some(identity.into());
        self
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    pub fn with_client_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.client_session_id = Some(session_id.into());
        self
    }

    pub fn with_client_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.client_request_id = Some(request_id.into());
        self
    }

    /// The hop between this client and the end user, if any
    pub fn downstream_request(&self) -> Option<&IntermediateClientRequestValue> {
        self.downstream_request.as_deref()
    }

    pub fn downstream_client_address(&self) -> Option<&str> {
        self.downstream_client_address.as_deref()
    }

    /// Whether the downstream client connected securely; `false` both when
    /// the wire says so and when it says nothing
    pub fn downstream_client_secure(&self) -> bool {
        self.downstream_client_secure
    }

    pub fn client_identity(&self) -> Option<&str> {
        self.client_identity.as_deref()
    }

    pub fn client_name(&self) -> Option<&str> {
        self.client_name.as_deref()
    }

    pub fn client_session_id(&self) -> Option<&str> {
        self.client_session_id.as_deref()
    }

    pub fn client_request_id(&self) -> Option<&str> {
        self.client_request_id.as_deref()
    }

    /// Number of hops including this one
    pub fn depth(&self) -> usize {
        1 + self
            .downstream_request
            .as_ref()
            .map_or(0, |downstream| downstream.depth())
    }

    /// Content of the SEQUENCE, without its tag
    fn encode_members(&self) -> Vec<BerElement> {
        let mut elements = Vec::new();
        if let Some(ref downstream) = self.downstream_request {
            elements.push(
                BerElement::sequence(&downstream.encode_members()).with_tag(TAG_DOWNSTREAM_REQUEST),
            );
        }
        push_utf8(&mut elements, TAG_DOWNSTREAM_ADDRESS, &self.downstream_client_address);
        if self.downstream_client_secure {
            elements.push(BerElement::boolean(true).with_tag(TAG_DOWNSTREAM_SECURE));
        }
        push_utf8(&mut elements, TAG_CLIENT_IDENTITY, &self.client_identity);
        push_utf8(&mut elements, TAG_CLIENT_NAME, &self.client_name);
        push_utf8(&mut elements, TAG_SESSION_ID, &self.client_session_id);
        push_utf8(&mut elements, TAG_REQUEST_ID, &self.client_request_id);
        elements
    }

    pub fn encode(&self) -> BerElement {
        BerElement::sequence(&self.encode_members())
    }

    /// Decode under the default limits
    pub fn decode(element: &BerElement) -> LdapResult<Self> {
        Self::decode_with(element, &CodecConfig::default())
    }

    pub fn decode_with(element: &BerElement, config: &CodecConfig) -> LdapResult<Self> {
        element.expect_tag(BerTag::SEQUENCE)?;
        Self::decode_members(element.value(), config, 1)
    }

    fn decode_members(content: &[u8], config: &CodecConfig, depth: usize) -> LdapResult<Self> {
        config.check_depth(depth, CONTEXT)?;
        let mut decoder = BerDecoder::new(content);

        let downstream_request = match decoder.decode_optional(&TAG_DOWNSTREAM_REQUEST)? {
            Some(nested) => Some(Box::new(Self::decode_members(nested, config, depth + 1)?)),
            None => None,
        };
        let value = Self {
            downstream_request,
            downstream_client_address: decoder.decode_optional_utf8_string(&TAG_DOWNSTREAM_ADDRESS)?,
            downstream_client_secure: decoder
                .decode_optional_boolean(&TAG_DOWNSTREAM_SECURE)?
                .unwrap_or(false),
            client_identity: decoder.decode_optional_utf8_string(&TAG_CLIENT_IDENTITY)?,
            client_name: decoder.decode_optional_utf8_string(&TAG_CLIENT_NAME)?,
            client_session_id: decoder.decode_optional_utf8_string(&TAG_SESSION_ID)?,
            client_request_id: decoder.decode_optional_utf8_string(&TAG_REQUEST_ID)?,
        };

        if let Some(tag) = decoder.peek_tag()? {
            return Err(LdapError::Decoding(format!(
                "Unexpected element {} in {}",
                tag, CONTEXT
            )));
        }
        Ok(value)
    }

    pub fn to_json(&self) -> Map<String, Value> {
        let mut object = JsonObject::new();
        if let Some(ref downstream) = self.downstream_request {
            object = object.object(JSON_DOWNSTREAM_REQUEST, downstream.to_json());
        }
        object
            .opt_str(JSON_DOWNSTREAM_ADDRESS, self.downstream_client_address.as_deref())
            .bool(JSON_DOWNSTREAM_SECURE, self.downstream_client_secure)
            .opt_str(JSON_CLIENT_IDENTITY, self.client_identity.as_deref())
            .opt_str(JSON_CLIENT_NAME, self.client_name.as_deref())
            .opt_str(JSON_SESSION_ID, self.client_session_id.as_deref())
            .opt_str(JSON_REQUEST_ID, self.client_request_id.as_deref())
            .build()
    }

    pub fn from_json(object: &Map<String, Value>, strict: bool) -> LdapResult<Self> {
        Self::from_json_with(object, strict, &CodecConfig::default())
    }

    pub fn from_json_with(
        object: &Map<String, Value>,
        strict: bool,
        config: &CodecConfig,
    ) -> LdapResult<Self> {
        Self::from_json_at(object, strict, config, 1)
    }

    fn from_json_at(
        object: &Map<String, Value>,
        strict: bool,
        config: &CodecConfig,
        depth: usize,
    ) -> LdapResult<Self> {
        config.check_depth(depth, CONTEXT)?;
        let mut fields = JsonFields::new(object, CONTEXT);
        let downstream = fields.optional_object(JSON_DOWNSTREAM_REQUEST)?;
        let downstream_client_address = fields.optional_str(JSON_DOWNSTREAM_ADDRESS)?;
        let downstream_client_secure = fields.optional_bool(JSON_DOWNSTREAM_SECURE)?.unwrap_or(false);
        let client_identity = fields.optional_str(JSON_CLIENT_IDENTITY)?;
        let client_name = fields.optional_str(JSON_CLIENT_NAME)?;
        let client_session_id = fields.optional_str(JSON_SESSION_ID)?;
        let client_request_id = fields.optional_str(JSON_REQUEST_ID)?;
        fields.finish(strict)?;

        let downstream_request = match downstream {
            Some(nested) => Some(Box::new(Self::from_json_at(nested, strict, config, depth + 1)?)),
            None => None,
        };

        Ok(Self {
            downstream_request,
            downstream_client_address,
            downstream_client_secure,
            client_identity,
            client_name,
            client_session_id,
            client_request_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntermediateClientRequestControl {
    value: IntermediateClientRequestValue,
    criticality: bool,
}

impl IntermediateClientRequestControl {
    pub fn new(value: IntermediateClientRequestValue, criticality: bool) -> Self {
        Self { value, criticality }
    }

    pub fn value(&self) -> &IntermediateClientRequestValue {
        &self.value
    }
}

impl ControlType for IntermediateClientRequestControl {
    const OID: &'static str = "1.3.6.1.4.1.30221.2.5.2";
    const NAME: &'static str = "Intermediate Client Request";

    fn criticality(&self) -> bool {
        self.criticality
    }

    fn encode_value(&self) -> Option<Vec<u8>> {
        Some(self.value.encode().encode())
    }

    fn decode_value(criticality: bool, value: Option<&[u8]>) -> LdapResult<Self> {
        Self::decode_value_with(criticality, value, &CodecConfig::default())
    }

    fn decode_value_with(
        criticality: bool,
        value: Option<&[u8]>,
        config: &CodecConfig,
    ) -> LdapResult<Self> {
        let value = require_value(Self::NAME, value)?;
        let element = BerElement::decode(value)?;
        Ok(Self::new(
            IntermediateClientRequestValue::decode_with(&element, config)?,
            criticality,
        ))
    }

    fn value_json(&self) -> Option<Map<String, Value>> {
        Some(self.value.to_json())
    }

    fn decode_value_json(
        criticality: bool,
        value: Option<&Map<String, Value>>,
        strict: bool,
    ) -> LdapResult<Self> {
        Self::decode_value_json_with(criticality, value, strict, &CodecConfig::default())
    }

    fn decode_value_json_with(
        criticality: bool,
        value: Option<&Map<String, Value>>,
        strict: bool,
        config: &CodecConfig,
    ) -> LdapResult<Self> {
        let value = require_json_value(Self::NAME, value)?;
        Ok(Self::new(
            IntermediateClientRequestValue::from_json_with(value, strict, config)?,
            criticality,
        ))
    }

    fn from_decoded(decoded: DecodedControl) -> Option<Self> {
        match decoded {
            DecodedControl::IntermediateClientRequest(control) => Some(control),
            _ => None,
        }
    }
}
