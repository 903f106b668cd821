//! Join rules for the join request control
//!
//! ```text
//! JoinRule ::= CHOICE {
//!      and               [0] SET OF JoinRule,
//!      or                [1] SET OF JoinRule,
//!      dnJoin            [2] AttributeDescription,
//!      equalityJoin      [3] JoinRuleAssertion,
//!      containsJoin      [4] JoinRuleAssertion,
//!      reverseDNJoin     [5] AttributeDescription }
//!
//! JoinRuleAssertion ::= SEQUENCE {
//!      sourceAttribute   AttributeDescription,
//!      targetAttribute   AttributeDescription,
//!      matchAll          BOOLEAN DEFAULT FALSE }
//! ```
//!
//! `and`/`or` nest arbitrarily, so both codecs recurse and stop at the
//! configured nesting depth.

use crate::error::{LdapError, LdapResult};
use crate::json::fields::{JsonFields, JsonObject};
use crate::registry::CodecConfig;
use ldapext_asn1::ber::{BerDecoder, BerElement, BerTag};
use serde_json::{Map, Value};
use std::fmt;

const TAG_AND: BerTag = BerTag::context_specific(true, 0);
const TAG_OR: BerTag = BerTag::context_specific(true, 1);
const TAG_DN: BerTag = BerTag::context_specific(false, 2);
const TAG_EQUALITY: BerTag = BerTag::context_specific(true, 3);
const TAG_CONTAINS: BerTag = BerTag::context_specific(true, 4);
const TAG_REVERSE_DN: BerTag = BerTag::context_specific(false, 5);

const JSON_TYPE: &str = "type";
const JSON_RULES: &str = "rules";
const JSON_SOURCE_ATTRIBUTE: &str = "source-attribute";
const JSON_TARGET_ATTRIBUTE: &str = "target-attribute";
const JSON_MATCH_ALL: &str = "match-all";

const TYPE_AND: &str = "and";
const TYPE_OR: &str = "or";
const TYPE_DN: &str = "dn";
const TYPE_REVERSE_DN: &str = "reverse-dn";
const TYPE_EQUALITY: &str = "equality";
const TYPE_CONTAINS: &str = "contains";

const CONTEXT: &str = "Join rule";

/// Children of an `and`/`or` rule, in order
///
/// Built through [`JoinRules::new`], which refuses an empty list. The
/// binary decoder accepts an empty list from the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinRules(Vec<JoinRule>);

impl JoinRules {
    /// # Error Handling
    /// Returns a usage error if `rules` is empty.
    pub fn new(rules: Vec<JoinRule>) -> LdapResult<Self> {
        if rules.is_empty() {
            return Err(LdapError::Usage(
                "An AND or OR join rule needs at least one component".to_string(),
            ));
        }
        Ok(Self(rules))
    }

    fn from_wire(rules: Vec<JoinRule>) -> Self {
        Self(rules)
    }

    pub fn as_slice(&self) -> &[JoinRule] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JoinRule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<JoinRule> {
        self.0
    }
}

impl<'a> IntoIterator for &'a JoinRules {
    type Item = &'a JoinRule;
    type IntoIter = std::slice::Iter<'a, JoinRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// How source entries are matched to joined entries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JoinRule {
    /// Every component must match
    And(JoinRules),
    /// At least one component must match
    Or(JoinRules),
    /// Source attribute holds DNs of the joined entries
    Dn { source_attribute: String },
    /// Joined entries hold the source entry DN in `target_attribute`
    ReverseDn { target_attribute: String },
    Equality {
        source_attribute: String,
        target_attribute: String,
        match_all: bool,
    },
    Contains {
        source_attribute: String,
        target_attribute: String,
        match_all: bool,
    },
}

impl JoinRule {
    pub fn and(rules: Vec<JoinRule>) -> LdapResult<Self> {
        JoinRules::new(rules).map(JoinRule::And)
    }

    pub fn or(rules: Vec<JoinRule>) -> LdapResult<Self> {
        JoinRules::new(rules).map(JoinRule::Or)
    }

    pub fn dn(source_attribute: impl Into<String>) -> Self {
        JoinRule::Dn {
            source_attribute: source_attribute.into(),
        }
    }

    pub fn reverse_dn(target_attribute: impl Into<String>) -> Self {
        JoinRule::ReverseDn {
            target_attribute: target_attribute.into(),
        }
    }

    pub fn equality(
        source_attribute: impl Into<String>,
        target_attribute: impl Into<String>,
        match_all: bool,
    ) -> Self {
        JoinRule::Equality {
            source_attribute: source_attribute.into(),
            target_attribute: target_attribute.into(),
            match_all,
        }
    }

    pub fn contains(
        source_attribute: impl Into<String>,
        target_attribute: impl Into<String>,
        match_all: bool,
    ) -> Self {
        JoinRule::Contains {
            source_attribute: source_attribute.into(),
            target_attribute: target_attribute.into(),
            match_all,
        }
    }

    /// JSON `type` discriminator
    pub fn type_name(&self) -> &'static str {
        match self {
            JoinRule::And(_) => TYPE_AND,
            JoinRule::Or(_) => TYPE_OR,
            JoinRule::Dn { .. } => TYPE_DN,
            JoinRule::ReverseDn { .. } => TYPE_REVERSE_DN,
            JoinRule::Equality { .. } => TYPE_EQUALITY,
            JoinRule::Contains { .. } => TYPE_CONTAINS,
        }
    }

    /// Components of an `and`/`or` rule; empty for leaf rules
    pub fn components(&self) -> &[JoinRule] {
        match self {
            JoinRule::And(rules) | JoinRule::Or(rules) => rules.as_slice(),
            _ => &[],
        }
    }

    pub fn encode(&self) -> BerElement {
        match self {
            JoinRule::And(rules) => encode_set(rules).with_tag(TAG_AND),
            JoinRule::Or(rules) => encode_set(rules).with_tag(TAG_OR),
            JoinRule::Dn { source_attribute } => BerElement::utf8(source_attribute).with_tag(TAG_DN),
            JoinRule::ReverseDn { target_attribute } => {
                BerElement::utf8(target_attribute).with_tag(TAG_REVERSE_DN)
            }
            JoinRule::Equality {
                source_attribute,
                target_attribute,
                match_all,
            } => encode_assertion(source_attribute, target_attribute, *match_all)
                .with_tag(TAG_EQUALITY),
            JoinRule::Contains {
                source_attribute,
                target_attribute,
                match_all,
            } => encode_assertion(source_attribute, target_attribute, *match_all)
                .with_tag(TAG_CONTAINS),
        }
    }

    /// Decode under the default limits
    pub fn decode(element: &BerElement) -> LdapResult<Self> {
        Self::decode_with(element, &CodecConfig::default())
    }

    pub fn decode_with(element: &BerElement, config: &CodecConfig) -> LdapResult<Self> {
        Self::decode_at(element, config, 1)
    }

    fn decode_at(element: &BerElement, config: &CodecConfig, depth: usize) -> LdapResult<Self> {
        config.check_depth(depth, CONTEXT)?;
        let tag = element.tag();
        if tag == TAG_AND || tag == TAG_OR {
            let rules = element
                .elements()?
                .iter()
                .map(|child| Self::decode_at(child, config, depth + 1))
                .collect::<LdapResult<Vec<_>>>()?;
            let rules = JoinRules::from_wire(rules);
            Ok(if tag == TAG_AND {
                JoinRule::And(rules)
            } else {
                JoinRule::Or(rules)
            })
        } else if tag == TAG_DN {
            Ok(JoinRule::Dn {
                source_attribute: element.as_string()?,
            })
        } else if tag == TAG_REVERSE_DN {
            Ok(JoinRule::ReverseDn {
                target_attribute: element.as_string()?,
            })
        } else if tag == TAG_EQUALITY || tag == TAG_CONTAINS {
            let (source_attribute, target_attribute, match_all) = decode_assertion(element.value())?;
            Ok(if tag == TAG_EQUALITY {
                JoinRule::Equality {
                    source_attribute,
                    target_attribute,
                    match_all,
                }
            } else {
                JoinRule::Contains {
                    source_attribute,
                    target_attribute,
                    match_all,
                }
            })
        } else {
            Err(LdapError::Decoding(format!(
                "Unknown join rule element {}",
                tag
            )))
        }
    }

    pub fn to_json(&self) -> Map<String, Value> {
        let object = JsonObject::new().str(JSON_TYPE, self.type_name());
        match self {
            JoinRule::And(rules) | JoinRule::Or(rules) => object
                .objects(JSON_RULES, rules.iter().map(JoinRule::to_json).collect())
                .build(),
            JoinRule::Dn { source_attribute } => {
                object.str(JSON_SOURCE_ATTRIBUTE, source_attribute).build()
            }
            JoinRule::ReverseDn { target_attribute } => {
                object.str(JSON_TARGET_ATTRIBUTE, target_attribute).build()
            }
            JoinRule::Equality {
                source_attribute,
                target_attribute,
                match_all,
            }
            | JoinRule::Contains {
                source_attribute,
                target_attribute,
                match_all,
            } => object
                .str(JSON_SOURCE_ATTRIBUTE, source_attribute)
                .str(JSON_TARGET_ATTRIBUTE, target_attribute)
                .bool(JSON_MATCH_ALL, *match_all)
                .build(),
        }
    }

    /// Decode the JSON form
    ///
    /// Unlike the binary decoder, an empty `rules` array is rejected.
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
        let rule_type = fields.required_str(JSON_TYPE)?;

        let rule = match rule_type.as_str() {
            TYPE_AND | TYPE_OR => {
                let children = fields.object_array(JSON_RULES, true)?;
                if children.is_empty() {
                    return Err(LdapError::Decoding(format!(
                        "{} of type '{}' has an empty '{}' array",
                        CONTEXT, rule_type, JSON_RULES
                    )));
                }
                let rules = children
                    .into_iter()
                    .map(|child| Self::from_json_at(child, strict, config, depth + 1))
                    .collect::<LdapResult<Vec<_>>>()?;
                let rules = JoinRules::from_wire(rules);
                if rule_type == TYPE_AND {
                    JoinRule::And(rules)
                } else {
                    JoinRule::Or(rules)
                }
            }
            TYPE_DN => JoinRule::Dn {
                source_attribute: fields.required_str(JSON_SOURCE_ATTRIBUTE)?,
            },
            TYPE_REVERSE_DN => JoinRule::ReverseDn {
                target_attribute: fields.required_str(JSON_TARGET_ATTRIBUTE)?,
            },
            TYPE_EQUALITY | TYPE_CONTAINS => {
                let source_attribute = fields.required_str(JSON_SOURCE_ATTRIBUTE)?;
                let target_attribute = fields.required_str(JSON_TARGET_ATTRIBUTE)?;
                let match_all = fields.optional_bool(JSON_MATCH_ALL)?.unwrap_or(false);
                if rule_type == TYPE_EQUALITY {
                    JoinRule::Equality {
                        source_attribute,
                        target_attribute,
                        match_all,
                    }
                } else {
                    JoinRule::Contains {
                        source_attribute,
                        target_attribute,
                        match_all,
                    }
                }
            }
            other => {
                return Err(LdapError::Decoding(format!(
                    "Unknown join rule type '{}'",
                    other
                )));
            }
        };

        fields.finish(strict)?;
        Ok(rule)
    }
}

impl fmt::Display for JoinRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinRule::And(rules) | JoinRule::Or(rules) => {
                write!(f, "{}(", self.type_name())?;
                for (i, rule) in rules.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", rule)?;
                }
                write!(f, ")")
            }
            JoinRule::Dn { source_attribute } => write!(f, "dn({})", source_attribute),
            JoinRule::ReverseDn { target_attribute } => write!(f, "reverse-dn({})", target_attribute),
            JoinRule::Equality {
                source_attribute,
                target_attribute,
                match_all,
            }
            | JoinRule::Contains {
                source_attribute,
                target_attribute,
                match_all,
            } => write!(
                f,
                "{}({}, {}, matchAll={})",
                self.type_name(),
                source_attribute,
                target_attribute,
                match_all
            ),
        }
    }
}

fn encode_set(rules: &JoinRules) -> BerElement {
    let elements: Vec<BerElement> = rules.iter().map(JoinRule::encode).collect();
    BerElement::set(&elements)
}

fn encode_assertion(source: &str, target: &str, match_all: bool) -> BerElement {
    let mut elements = vec![BerElement::utf8(source), BerElement::utf8(target)];
    if match_all {
        elements.push(BerElement::boolean(true));
    }
    BerElement::sequence(&elements)
}

fn decode_assertion(content: &[u8]) -> LdapResult<(String, String, bool)> {
    let mut decoder = BerDecoder::new(content);
    let source = decoder.decode_utf8_string()?;
    let target = decoder.decode_utf8_string()?;
    let match_all = decoder
        .decode_optional_boolean(&BerTag::BOOLEAN)?
        .unwrap_or(false);
    decoder.expect_end()?;
    Ok((source, target, match_all))
}
