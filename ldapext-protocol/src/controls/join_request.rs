//! Join request control
//!
//! Asks the server to return, with each search result entry, the entries
//! related to it by a [`JoinRule`].
//!
//! ```text
//! JoinRequestValue ::= SEQUENCE {
//!      joinRule            JoinRule,
//!      joinBaseDN          CHOICE {
//!           useSearchBaseDN      [0] NULL,
//!           useSourceEntryDN     [1] NULL,
//!           useCustomBaseDN      [2] LDAPDN },
//!      scope               [0] ENUMERATED OPTIONAL,
//!      derefAliases        [1] ENUMERATED OPTIONAL,
//!      sizeLimit           [2] INTEGER (0..maxInt) OPTIONAL,
//!      filter              [3] Filter OPTIONAL,
//!      attributes          [4] AttributeSelection OPTIONAL,
//!      requireMatch        [5] BOOLEAN DEFAULT FALSE,
//!      nestedJoin          [6] JoinRequestValue OPTIONAL }
//! ```
//!
//! The filter is kept as its encoded element and never interpreted. It is
//! wrapped explicitly in `[3]`.

use crate::controls::join_rule::JoinRule;
use crate::decoded::{require_json_value, require_value, ControlType, DecodedControl};
use crate::error::{LdapError, LdapResult};
use crate::json::fields::{decode_base64, JsonFields, JsonObject};
use crate::registry::CodecConfig;
use ldapext_asn1::ber::{BerDecoder, BerElement, BerTag};
use serde_json::{Map, Value};

const TAG_BASE_SEARCH: BerTag = BerTag::context_specific(false, 0);
const TAG_BASE_SOURCE_ENTRY: BerTag = BerTag::context_specific(false, 1);
const TAG_BASE_CUSTOM: BerTag = BerTag::context_specific(false, 2);

const TAG_SCOPE: BerTag = BerTag::context_specific(false, 0);
const TAG_DEREF: BerTag = BerTag::context_specific(false, 1);
const TAG_SIZE_LIMIT: BerTag = BerTag::context_specific(false, 2);
const TAG_FILTER: BerTag = BerTag::context_specific(true, 3);
const TAG_ATTRIBUTES: BerTag = BerTag::context_specific(true, 4);
const TAG_REQUIRE_MATCH: BerTag = BerTag::context_specific(false, 5);
const TAG_NESTED_JOIN: BerTag = BerTag::context_specific(true, 6);

const JSON_JOIN_RULE: &str = "join-rule";
const JSON_BASE_DN_TYPE: &str = "base-dn-type";
const JSON_BASE_DN: &str = "base-dn";
const JSON_SCOPE: &str = "scope";
const JSON_DEREF: &str = "alias-dereferencing-behavior";
const JSON_SIZE_LIMIT: &str = "size-limit";
const JSON_FILTER: &str = "filter-ber-base64";
const JSON_ATTRIBUTES: &str = "attributes";
const JSON_REQUIRE_MATCH: &str = "require-match";
const JSON_NESTED_JOIN: &str = "nested-join";

const CONTEXT: &str = "Join request value";

/// Base DN for the joined-entry search
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JoinBaseDn {
    UseSearchBaseDn,
    UseSourceEntryDn,
    UseCustomBaseDn(String),
}

impl JoinBaseDn {
    fn type_name(&self) -> &'static str {
        match self {
            JoinBaseDn::UseSearchBaseDn => "use-search-base-dn",
            JoinBaseDn::UseSourceEntryDn => "use-source-entry-dn",
            JoinBaseDn::UseCustomBaseDn(_) => "use-custom-base-dn",
        }
    }

    fn encode(&self) -> BerElement {
        match self {
            JoinBaseDn::UseSearchBaseDn => BerElement::null().with_tag(TAG_BASE_SEARCH),
            JoinBaseDn::UseSourceEntryDn => BerElement::null().with_tag(TAG_BASE_SOURCE_ENTRY),
            JoinBaseDn::UseCustomBaseDn(dn) => BerElement::utf8(dn).with_tag(TAG_BASE_CUSTOM),
        }
    }

    fn decode(element: &BerElement) -> LdapResult<Self> {
        let tag = element.tag();
        if tag == TAG_BASE_SEARCH {
            element.as_null()?;
            Ok(JoinBaseDn::UseSearchBaseDn)
        } else if tag == TAG_BASE_SOURCE_ENTRY {
            element.as_null()?;
            Ok(JoinBaseDn::UseSourceEntryDn)
        } else if tag == TAG_BASE_CUSTOM {
            Ok(JoinBaseDn::UseCustomBaseDn(element.as_string()?))
        } else {
            Err(LdapError::Decoding(format!(
                "Unknown join base DN element {}",
                tag
            )))
        }
    }
}

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:literal, $json:literal;)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant = $value,)*
        }

        impl $name {
            pub fn value(self) -> i64 {
                self as i64
            }

            pub fn from_value(value: i64) -> LdapResult<Self> {
                match value {
                    $($value => Ok($name::$variant),)*
                    _ => Err(LdapError::Decoding(format!(
                        "Invalid {} value {}",
                        stringify!($name),
                        value
                    ))),
                }
            }

            pub fn json_name(self) -> &'static str {
                match self {
                    $($name::$variant => $json,)*
                }
            }

            pub fn from_json_name(name: &str) -> LdapResult<Self> {
                match name {
                    $($json => Ok($name::$variant),)*
                    _ => Err(LdapError::Decoding(format!(
                        "Invalid {} name '{}'",
                        stringify!($name),
                        name
                    ))),
                }
            }
        }
    };
}

wire_enum! {
    /// Search scope (RFC 4511 plus subordinate subtree)
    SearchScope {
        BaseObject = 0, "baseObject";
        SingleLevel = 1, "singleLevel";
        WholeSubtree = 2, "wholeSubtree";
        SubordinateSubtree = 3, "subordinateSubtree";
    }
}

wire_enum! {
    /// Alias dereferencing policy (RFC 4511)
    DereferencePolicy {
        Never = 0, "neverDerefAliases";
        InSearching = 1, "derefInSearching";
        FindingBaseObject = 2, "derefFindingBaseObj";
        Always = 3, "derefAlways";
    }
}

/// Parameters of one join, optionally chaining a further join
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinRequestValue {
    join_rule: JoinRule,
    base_dn: JoinBaseDn,
    scope: Option<SearchScope>,
    deref_policy: Option<DereferencePolicy>,
    size_limit: Option<i32>,
    filter: Option<BerElement>,
    attributes: Vec<String>,
    require_match: bool,
    nested_join: Option<Box<JoinRequestValue>>,
}

impl JoinRequestValue {
    pub fn new(join_rule: JoinRule, base_dn: JoinBaseDn) -> Self {
        Self {
            join_rule,
            base_dn,
            scope: None,
            deref_policy: None,
            size_limit: None,
            filter: None,
            attributes: Vec::new(),
            require_match: false,
            nested_join: None,
        }
    }

    pub fn with_scope(mut self, scope: SearchScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_deref_policy(mut self, policy: DereferencePolicy) -> Self {
        self.deref_policy = Some(policy);
        self
    }

    /// # Error Handling
    /// Returns a usage error if `size_limit` is negative.
    pub fn with_size_limit(mut self, size_limit: i32) -> LdapResult<Self> {
        if size_limit < 0 {
            return Err(LdapError::Usage(format!(
                "Join size limit must not be negative, got {}",
                size_limit
            )));
        }
        self.size_limit = Some(size_limit);
        Ok(self)
    }

    /// Encoded filter element, carried as-is
    pub fn with_filter(mut self, filter: BerElement) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_require_match(mut self, require_match: bool) -> Self {
        self.require_match = require_match;
        self
    }

    pub fn with_nested_join(mut self, nested: JoinRequestValue) -> Self {
        self.nested_join = Some(Box::new(nested));
        self
    }

    pub fn join_rule(&self) -> &JoinRule {
        &self.join_rule
    }

    pub fn base_dn(&self) -> &JoinBaseDn {
        &self.base_dn
    }

    pub fn scope(&self) -> Option<SearchScope> {
        self.scope
    }

    pub fn deref_policy(&self) -> Option<DereferencePolicy> {
        self.deref_policy
    }

    pub fn size_limit(&self) -> Option<i32> {
        self.size_limit
    }

    pub fn filter(&self) -> Option<&BerElement> {
        self.filter.as_ref()
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn require_match(&self) -> bool {
        self.require_match
    }

    pub fn nested_join(&self) -> Option<&JoinRequestValue> {
        self.nested_join.as_deref()
    }

    fn encode_members(&self) -> Vec<BerElement> {
        let mut elements = vec![self.join_rule.encode(), self.base_dn.encode()];
        if let Some(scope) = self.scope {
            elements.push(BerElement::enumerated(scope.value()).with_tag(TAG_SCOPE));
        }
        if let Some(policy) = self.deref_policy {
            elements.push(BerElement::enumerated(policy.value()).with_tag(TAG_DEREF));
        }
        if let Some(size_limit) = self.size_limit {
            elements.push(BerElement::integer(i64::from(size_limit)).with_tag(TAG_SIZE_LIMIT));
        }
        if let Some(ref filter) = self.filter {
            elements.push(BerElement::new(TAG_FILTER, filter.encode()));
        }
        if !self.attributes.is_empty() {
            let attributes: Vec<BerElement> =
                self.attributes.iter().map(|a| BerElement::utf8(a)).collect();
            elements.push(BerElement::sequence(&attributes).with_tag(TAG_ATTRIBUTES));
        }
        if self.require_match {
            elements.push(BerElement::boolean(true).with_tag(TAG_REQUIRE_MATCH));
        }
        if let Some(ref nested) = self.nested_join {
            elements.push(BerElement::sequence(&nested.encode_members()).with_tag(TAG_NESTED_JOIN));
        }
        elements
    }

    pub fn encode(&self) -> BerElement {
        BerElement::sequence(&self.encode_members())
    }

    /// Decode under the default limits
    pub fn decode(element: &BerElement) -> LdapResult<Self> {
        Self::decode_with(element, &CodecConfig::default())
    }

    /// Decode, holding nested joins and each join rule to `config`
    pub fn decode_with(element: &BerElement, config: &CodecConfig) -> LdapResult<Self> {
        element.expect_tag(BerTag::SEQUENCE)?;
        Self::decode_members(element.value(), config, 1)
    }

    fn decode_members(content: &[u8], config: &CodecConfig, depth: usize) -> LdapResult<Self> {
        config.check_depth(depth, CONTEXT)?;
        let mut decoder = BerDecoder::new(content);

        let join_rule = JoinRule::decode_with(&decoder.decode_element()?, config)?;
        let base_dn = JoinBaseDn::decode(&decoder.decode_element()?)?;
        let mut value = Self::new(join_rule, base_dn);

        if let Some(scope) = decoder.decode_optional(&TAG_SCOPE)? {
            value.scope = Some(SearchScope::from_value(enumerated(scope)?)?);
        }
        if let Some(policy) = decoder.decode_optional(&TAG_DEREF)? {
            value.deref_policy = Some(DereferencePolicy::from_value(enumerated(policy)?)?);
        }
        if let Some(size_limit) = decoder.decode_optional_integer(&TAG_SIZE_LIMIT)? {
            value.size_limit = Some(match i32::try_from(size_limit) {
                Ok(limit) if limit >= 0 => limit,
                _ => {
                    return Err(LdapError::Decoding(format!(
                        "Join size limit {} is out of range",
                        size_limit
                    )));
                }
            });
        }
        if let Some(filter) = decoder.decode_optional(&TAG_FILTER)? {
            value.filter = Some(BerElement::decode(filter)?);
        }
        if let Some(attributes) = decoder.decode_optional(&TAG_ATTRIBUTES)? {
            let mut attributes = BerDecoder::new(attributes);
            while attributes.has_remaining() {
                value.attributes.push(attributes.decode_utf8_string()?);
            }
        }
        value.require_match = decoder
            .decode_optional_boolean(&TAG_REQUIRE_MATCH)?
            .unwrap_or(false);
        if let Some(nested) = decoder.decode_optional(&TAG_NESTED_JOIN)? {
            value.nested_join = Some(Box::new(Self::decode_members(nested, config, depth + 1)?));
        }

        if let Some(tag) = decoder.peek_tag()? {
            return Err(LdapError::Decoding(format!(
                "Unexpected element {} in {}",
                tag, CONTEXT
            )));
        }
        Ok(value)
    }

    pub fn to_json(&self) -> Map<String, Value> {
        let mut object = JsonObject::new()
            .object(JSON_JOIN_RULE, self.join_rule.to_json())
            .str(JSON_BASE_DN_TYPE, self.base_dn.type_name());
        if let JoinBaseDn::UseCustomBaseDn(ref dn) = self.base_dn {
            object = object.str(JSON_BASE_DN, dn);
        }
        if let Some(scope) = self.scope {
            object = object.str(JSON_SCOPE, scope.json_name());
        }
        if let Some(policy) = self.deref_policy {
            object = object.str(JSON_DEREF, policy.json_name());
        }
        object = object.opt_int(JSON_SIZE_LIMIT, self.size_limit.map(i64::from));
        if let Some(ref filter) = self.filter {
            object = object.base64(JSON_FILTER, &filter.encode());
        }
        if !self.attributes.is_empty() {
            object = object.strings(JSON_ATTRIBUTES, &self.attributes);
        }
        object = object.bool(JSON_REQUIRE_MATCH, self.require_match);
        if let Some(ref nested) = self.nested_join {
            object = object.object(JSON_NESTED_JOIN, nested.to_json());
        }
        object.build()
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
        let join_rule =
            JoinRule::from_json_with(fields.required_object(JSON_JOIN_RULE)?, strict, config)?;

        let base_dn_type = fields.required_str(JSON_BASE_DN_TYPE)?;
        let base_dn = match base_dn_type.as_str() {
            "use-search-base-dn" => JoinBaseDn::UseSearchBaseDn,
            "use-source-entry-dn" => JoinBaseDn::UseSourceEntryDn,
            "use-custom-base-dn" => JoinBaseDn::UseCustomBaseDn(fields.required_str(JSON_BASE_DN)?),
            other => {
                return Err(LdapError::Decoding(format!(
                    "Unknown join base DN type '{}'",
                    other
                )));
            }
        };

        let mut value = Self::new(join_rule, base_dn);
        value.scope = fields
            .optional_str(JSON_SCOPE)?
            .map(|name| SearchScope::from_json_name(&name))
            .transpose()?;
        value.deref_policy = fields
            .optional_str(JSON_DEREF)?
            .map(|name| DereferencePolicy::from_json_name(&name))
            .transpose()?;
        value.size_limit = match fields.optional_i32(JSON_SIZE_LIMIT)? {
            Some(limit) if limit < 0 => {
                return Err(LdapError::Decoding(format!(
                    "Join size limit {} is out of range",
                    limit
                )));
            }
            limit => limit,
        };
        if let Some(filter) = fields.optional_str(JSON_FILTER)? {
            value.filter = Some(BerElement::decode(&decode_base64(&filter)?)?);
        }
        value.attributes = fields.string_array(JSON_ATTRIBUTES, false)?;
        value.require_match = fields.optional_bool(JSON_REQUIRE_MATCH)?.unwrap_or(false);
        let nested = fields.optional_object(JSON_NESTED_JOIN)?;
        fields.finish(strict)?;

        if let Some(nested) = nested {
            value.nested_join = Some(Box::new(Self::from_json_at(nested, strict, config, depth + 1)?));
        }
        Ok(value)
    }
}

fn enumerated(content: &[u8]) -> LdapResult<i64> {
    BerElement::new(BerTag::ENUMERATED, content.to_vec()).as_integer()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinRequestControl {
    value: JoinRequestValue,
    criticality: bool,
}

impl JoinRequestControl {
    pub fn new(value: JoinRequestValue, criticality: bool) -> Self {
        Self { value, criticality }
    }

    pub fn value(&self) -> &JoinRequestValue {
        &self.value
    }
}

impl ControlType for JoinRequestControl {
    const OID: &'static str = "1.3.6.1.4.1.30221.2.5.9";
    const NAME: &'static str = "Join Request";

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
        Ok(Self::new(JoinRequestValue::decode_with(&element, config)?, criticality))
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
            JoinRequestValue::from_json_with(value, strict, config)?,
            criticality,
        ))
    }

    fn from_decoded(decoded: DecodedControl) -> Option<Self> {
        match decoded {
            DecodedControl::JoinRequest(control) => Some(control),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DEFAULT_MAX_NESTING_DEPTH;
    use serde_json::json;

    fn fixtures() -> Vec<JoinRequestValue> {
        let rule = JoinRule::and(vec![
            JoinRule::equality("uid", "memberUid", false),
            JoinRule::dn("manager"),
        ])
        .unwrap();
        vec![
            JoinRequestValue::new(JoinRule::dn("manager"), JoinBaseDn::UseSearchBaseDn),
            JoinRequestValue::new(JoinRule::reverse_dn("member"), JoinBaseDn::UseSourceEntryDn)
                .with_require_match(true),
            JoinRequestValue::new(
                rule,
                JoinBaseDn::UseCustomBaseDn("ou=Groups,dc=example,dc=com".to_string()),
            )
            .with_scope(SearchScope::WholeSubtree)
            .with_deref_policy(DereferencePolicy::FindingBaseObject)
            .with_size_limit(0)
            .unwrap()
            .with_filter(present_filter("objectClass"))
            .with_attributes(["cn", "member"])
            .with_nested_join(
                JoinRequestValue::new(JoinRule::dn("owner"), JoinBaseDn::UseSearchBaseDn)
                    .with_scope(SearchScope::BaseObject),
            ),
        ]
    }

    /// `(attr=*)`
    fn present_filter(attribute: &str) -> BerElement {
        BerElement::utf8(attribute).with_tag(BerTag::context_specific(false, 7))
    }

    fn nested(depth: usize) -> JoinRequestValue {
        let mut value = JoinRequestValue::new(JoinRule::dn("manager"), JoinBaseDn::UseSearchBaseDn);
        for _ in 1..depth {
            value = JoinRequestValue::new(JoinRule::dn("manager"), JoinBaseDn::UseSearchBaseDn)
                .with_nested_join(value);
        }
        value
    }

    #[test]
    fn test_binary_round_trip() {
        for value in fixtures() {
            let control = JoinRequestControl::new(value, true);
            assert_eq!(JoinRequestControl::decode(&control.to_control()).unwrap(), control);
        }
    }

    #[test]
    fn test_json_round_trip() {
        for value in fixtures() {
            let control = JoinRequestControl::new(value, false);
            let json = control.value_json();
            assert_eq!(
                JoinRequestControl::decode_value_json(false, json.as_ref(), true).unwrap(),
                control
            );
        }
    }

    #[test]
    fn test_minimal_layout() {
        let value = JoinRequestValue::new(JoinRule::dn("a"), JoinBaseDn::UseSourceEntryDn);
        assert_eq!(
            value.encode().encode(),
            vec![0x30, 0x05, 0x82, 0x01, b'a', 0x81, 0x00]
        );
    }

    #[test]
    fn test_size_limit_validation() {
        let value = JoinRequestValue::new(JoinRule::dn("a"), JoinBaseDn::UseSearchBaseDn);
        assert!(value.with_size_limit(-1).unwrap_err().is_usage_error());

        // size limit [2] INTEGER -1
        let data = [0x30, 0x08, 0x82, 0x01, b'a', 0x80, 0x00, 0x82, 0x01, 0xFF];
        let err = JoinRequestControl::decode_value(false, Some(&data)).unwrap_err();
        assert!(err.is_decoding_error());
    }

    #[test]
    fn test_invalid_enumerations() {
        // scope [0] ENUMERATED 9
        let data = [0x30, 0x08, 0x82, 0x01, b'a', 0x80, 0x00, 0x80, 0x01, 0x09];
        assert!(JoinRequestControl::decode_value(false, Some(&data)).is_err());

        let Value::Object(object) = json!({
            "join-rule": {"type": "dn", "source-attribute": "a"},
            "base-dn-type": "use-search-base-dn",
            "scope": "everywhere"
        }) else {
            unreachable!()
        };
        assert!(JoinRequestValue::from_json(&object, false).is_err());
    }

    #[test]
    fn test_custom_base_dn_requires_dn() {
        let Value::Object(object) = json!({
            "join-rule": {"type": "dn", "source-attribute": "a"},
            "base-dn-type": "use-custom-base-dn"
        }) else {
            unreachable!()
        };
        assert!(JoinRequestValue::from_json(&object, true).unwrap_err().is_decoding_error());
    }

    #[test]
    fn test_nested_join_depth_limit() {
        let at_limit = nested(DEFAULT_MAX_NESTING_DEPTH);
        assert_eq!(JoinRequestValue::decode(&at_limit.encode()).unwrap(), at_limit);

        let too_deep = nested(DEFAULT_MAX_NESTING_DEPTH + 1);
        assert!(JoinRequestValue::decode(&too_deep.encode()).is_err());
        assert!(JoinRequestValue::from_json(&too_deep.to_json(), false).is_err());
    }

    #[test]
    fn test_rule_depth_follows_config() {
        let config = CodecConfig {
            max_nesting_depth: 2,
        };
        let rule = JoinRule::and(vec![JoinRule::and(vec![JoinRule::dn("a")]).unwrap()]).unwrap();
        let value = JoinRequestValue::new(rule, JoinBaseDn::UseSearchBaseDn);
        assert!(JoinRequestValue::decode(&value.encode()).is_ok());
        assert!(JoinRequestValue::decode_with(&value.encode(), &config)
            .unwrap_err()
            .is_decoding_error());

        let control = JoinRequestControl::new(value, false);
        let json = control.value_json();
        assert!(JoinRequestControl::decode_value_json_with(false, json.as_ref(), true, &config)
            .unwrap_err()
            .is_decoding_error());
    }

    #[test]
    fn test_json_shape() {
        let value = JoinRequestValue::new(JoinRule::dn("manager"), JoinBaseDn::UseSearchBaseDn)
            .with_scope(SearchScope::SingleLevel);
        assert_eq!(
            Value::Object(value.to_json()),
            json!({
                "join-rule": {"type": "dn", "source-attribute": "manager"},
                "base-dn-type": "use-search-base-dn",
                "scope": "singleLevel",
                "require-match": false
            })
        );
    }

    #[test]
    fn test_filter_is_wrapped_explicitly() {
        let value = JoinRequestValue::new(JoinRule::dn("a"), JoinBaseDn::UseSearchBaseDn)
            .with_filter(present_filter("cn"));
        assert_eq!(
            value.encode().encode(),
            vec![0x30, 0x0B, 0x82, 0x01, b'a', 0x80, 0x00, 0xA3, 0x04, 0x87, 0x02, b'c', b'n']
        );
        let decoded = JoinRequestValue::decode(&value.encode()).unwrap();
        assert_eq!(decoded.filter(), Some(&present_filter("cn")));
    }
}
