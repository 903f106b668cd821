//! Account usable request and response controls
//!
//! ```text
//! ACCOUNT_USABLE_RESPONSE ::= CHOICE {
//!      is_available           [0] INTEGER, -- Seconds before expiration --
//!      is_not_available       [1] MORE_INFO }
//!
//! MORE_INFO ::= SEQUENCE {
//!      inactive               [0] BOOLEAN DEFAULT FALSE,
//!      reset                  [1] BOOLEAN DEFAULT FALSE,
//!      expired                [2] BOOLEAN DEFAULT FALSE,
//!      remainingGrace         [3] INTEGER OPTIONAL,
//!      secondsBeforeUnlock    [4] INTEGER OPTIONAL }
//! ```

use crate::decoded::{
    expect_no_json_value, expect_no_value, require_json_value, require_value, ControlType,
    DecodedControl,
};
use crate::error::{LdapError, LdapResult};
use crate::json::fields::{JsonFields, JsonObject};
use crate::registry::CodecConfig;
use ldapext_asn1::ber::{BerDecoder, BerElement, BerTag};
use serde_json::{Map, Value};

const OID: &str = "1.3.6.1.4.1.42.2.27.9.5.8";

const TAG_AVAILABLE: BerTag = BerTag::context_specific(false, 0);
const TAG_NOT_AVAILABLE: BerTag = BerTag::context_specific(true, 1);
const TAG_INACTIVE: BerTag = BerTag::context_specific(false, 0);
const TAG_RESET: BerTag = BerTag::context_specific(false, 1);
const TAG_EXPIRED: BerTag = BerTag::context_specific(false, 2);
const TAG_REMAINING_GRACE: BerTag = BerTag::context_specific(false, 3);
const TAG_SECONDS_BEFORE_UNLOCK: BerTag = BerTag::context_specific(false, 4);

const JSON_USABLE: &str = "account-is-usable";
const JSON_SECONDS_UNTIL_EXPIRATION: &str = "seconds-until-password-expiration";
const JSON_INACTIVE: &str = "account-is-inactive";
const JSON_MUST_CHANGE: &str = "must-change-password";
const JSON_EXPIRED: &str = "password-is-expired";
const JSON_REMAINING_GRACE: &str = "remaining-grace-logins";
const JSON_SECONDS_UNTIL_UNLOCK: &str = "seconds-until-account-unlock";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountUsableRequestControl {
    criticality: bool,
}

impl AccountUsableRequestControl {
    pub fn new(criticality: bool) -> Self {
        Self { criticality }
    }
}

impl ControlType for AccountUsableRequestControl {
    const OID: &'static str = OID;
    const NAME: &'static str = "Account Usable Request";

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
            DecodedControl::AccountUsableRequest(control) => Some(control),
            _ => None,
        }
    }
}

/// Account state reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccountUsability {
    Usable {
        /// `None` when the password does not expire
        seconds_until_password_expiration: Option<i32>,
    },
    Unusable {
        inactive: bool,
        must_change_password: bool,
        password_expired: bool,
        remaining_grace_logins: Option<i32>,
        seconds_until_unlock: Option<i32>,
    },
}

impl AccountUsability {
    pub fn is_usable(&self) -> bool {
        matches!(self, AccountUsability::Usable { .. })
    }
}

/// Response control with the same OID as the request
///
/// Both share one registry entry, so decoding picks the response form
/// whenever a value is present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountUsableResponseControl {
    usability: AccountUsability,
    criticality: bool,
}

impl AccountUsableResponseControl {
    /// Non-critical response
    ///
    /// A negative expiration is the wire's "never expires" marker and is
    /// stored as `None`.
    pub fn new(usability: AccountUsability) -> Self {
        let usability = match usability {
            AccountUsability::Usable {
                seconds_until_password_expiration,
            } => AccountUsability::Usable {
                seconds_until_password_expiration: seconds_until_password_expiration
                    .filter(|seconds| *seconds >= 0),
            },
            unusable => unusable,
        };
        Self {
            usability,
            criticality: false,
        }
    }

    pub fn usable(seconds_until_password_expiration: Option<i32>) -> Self {
        Self::new(AccountUsability::Usable {
            seconds_until_password_expiration,
        })
    }

    pub fn with_criticality(mut self, criticality: bool) -> Self {
        self.criticality = criticality;
        self
    }

    pub fn usability(&self) -> &AccountUsability {
        &self.usability
    }

    pub fn is_usable(&self) -> bool {
        self.usability.is_usable()
    }
}

fn to_i32(value: i64, field: &str) -> LdapResult<i32> {
    i32::try_from(value).map_err(|_| {
        LdapError::Decoding(format!("Account usable {} {} is out of range", field, value))
    })
}

impl ControlType for AccountUsableResponseControl {
    const OID: &'static str = OID;
    const NAME: &'static str = "Account Usable Response";

    fn criticality(&self) -> bool {
        self.criticality
    }

    fn encode_value(&self) -> Option<Vec<u8>> {
        let element = match &self.usability {
            AccountUsability::Usable {
                seconds_until_password_expiration,
            } => BerElement::integer(i64::from(seconds_until_password_expiration.unwrap_or(-1)))
                .with_tag(TAG_AVAILABLE),
            AccountUsability::Unusable {
                inactive,
                must_change_password,
                password_expired,
                remaining_grace_logins,
                seconds_until_unlock,
            } => {
                let mut elements = Vec::new();
                for (flag, tag) in [
                    (*inactive, TAG_INACTIVE),
                    (*must_change_password, TAG_RESET),
                    (*password_expired, TAG_EXPIRED),
                ] {
                    if flag {
                        elements.push(BerElement::boolean(true).with_tag(tag));
                    }
                }
                if let Some(grace) = remaining_grace_logins {
                    elements.push(BerElement::integer(i64::from(*grace)).with_tag(TAG_REMAINING_GRACE));
                }
                if let Some(unlock) = seconds_until_unlock {
                    elements.push(
                        BerElement::integer(i64::from(*unlock)).with_tag(TAG_SECONDS_BEFORE_UNLOCK),
                    );
                }
                BerElement::sequence(&elements).with_tag(TAG_NOT_AVAILABLE)
            }
        };
        Some(element.encode())
    }

    fn decode_value(criticality: bool, value: Option<&[u8]>) -> LdapResult<Self> {
        let value = require_value(Self::NAME, value)?;
        let element = BerElement::decode(value)?;

        let usability = if element.tag() == TAG_AVAILABLE {
            let seconds = to_i32(element.as_integer()?, "seconds until expiration")?;
            AccountUsability::Usable {
                seconds_until_password_expiration: Some(seconds),
            }
        } else if element.tag() == TAG_NOT_AVAILABLE {
            let mut decoder = BerDecoder::new(element.value());
            let inactive = decoder.decode_optional_boolean(&TAG_INACTIVE)?.unwrap_or(false);
            let must_change_password = decoder.decode_optional_boolean(&TAG_RESET)?.unwrap_or(false);
            let password_expired = decoder.decode_optional_boolean(&TAG_EXPIRED)?.unwrap_or(false);
            let remaining_grace_logins = decoder
                .decode_optional_integer(&TAG_REMAINING_GRACE)?
                .map(|v| to_i32(v, "remaining grace logins"))
                .transpose()?;
            let seconds_until_unlock = decoder
                .decode_optional_integer(&TAG_SECONDS_BEFORE_UNLOCK)?
                .map(|v| to_i32(v, "seconds before unlock"))
                .transpose()?;
            decoder.expect_end()?;
            AccountUsability::Unusable {
                inactive,
                must_change_password,
                password_expired,
                remaining_grace_logins,
                seconds_until_unlock,
            }
        } else {
            return Err(LdapError::Decoding(format!(
                "Unexpected account usable response element {}",
                element.tag()
            )));
        };

        Ok(Self::new(usability).with_criticality(criticality))
    }

    fn value_json(&self) -> Option<Map<String, Value>> {
        let object = match &self.usability {
            AccountUsability::Usable {
                seconds_until_password_expiration,
            } => JsonObject::new().bool(JSON_USABLE, true).opt_int(
                JSON_SECONDS_UNTIL_EXPIRATION,
                seconds_until_password_expiration.map(i64::from),
            ),
            AccountUsability::Unusable {
                inactive,
                must_change_password,
                password_expired,
                remaining_grace_logins,
                seconds_until_unlock,
            } => JsonObject::new()
                .bool(JSON_USABLE, false)
                .bool(JSON_INACTIVE, *inactive)
                .bool(JSON_MUST_CHANGE, *must_change_password)
                .bool(JSON_EXPIRED, *password_expired)
                .opt_int(JSON_REMAINING_GRACE, remaining_grace_logins.map(i64::from))
                .opt_int(JSON_SECONDS_UNTIL_UNLOCK, seconds_until_unlock.map(i64::from)),
        };
        Some(object.build())
    }

    fn decode_value_json(
        criticality: bool,
        value: Option<&Map<String, Value>>,
        strict: bool,
    ) -> LdapResult<Self> {
        let value = require_json_value(Self::NAME, value)?;
        let mut fields = JsonFields::new(value, Self::NAME);
        let usable = fields.required_bool(JSON_USABLE)?;
        let seconds_until_expiration = fields.optional_i32(JSON_SECONDS_UNTIL_EXPIRATION)?;
        let inactive = fields.optional_bool(JSON_INACTIVE)?;
        let must_change_password = fields.optional_bool(JSON_MUST_CHANGE)?;
        let password_expired = fields.optional_bool(JSON_EXPIRED)?;
        let remaining_grace_logins = fields.optional_i32(JSON_REMAINING_GRACE)?;
        let seconds_until_unlock = fields.optional_i32(JSON_SECONDS_UNTIL_UNLOCK)?;
        fields.finish(strict)?;

        let usability = if usable {
            let unusable_field_present = inactive.is_some()
                || must_change_password.is_some()
                || password_expired.is_some()
                || remaining_grace_logins.is_some()
                || seconds_until_unlock.is_some();
            if unusable_field_present {
                return Err(LdapError::Decoding(format!(
                    "{} reports a usable account but carries unusable-account fields",
                    Self::NAME
                )));
            }
            AccountUsability::Usable {
                seconds_until_password_expiration: seconds_until_expiration,
            }
        } else {
            if seconds_until_expiration.is_some() {
                return Err(LdapError::Decoding(format!(
                    "{} reports an unusable account but carries '{}'",
                    Self::NAME,
                    JSON_SECONDS_UNTIL_EXPIRATION
                )));
            }
            AccountUsability::Unusable {
                inactive: inactive.unwrap_or(false),
                must_change_password: must_change_password.unwrap_or(false),
                password_expired: password_expired.unwrap_or(false),
                remaining_grace_logins,
                seconds_until_unlock,
            }
        };

        Ok(Self::new(usability).with_criticality(criticality))
    }

    fn from_decoded(decoded: DecodedControl) -> Option<Self> {
        match decoded {
            DecodedControl::AccountUsableResponse(control) => Some(control),
            _ => None,
        }
    }
}

/// Registry decoder for the shared OID: no value means request
pub(crate) fn decode_account_usable(
    criticality: bool,
    value: Option<&[u8]>,
    _config: &CodecConfig,
) -> LdapResult<DecodedControl> {
    match value {
        None => AccountUsableRequestControl::decode_value(criticality, None).map(Into::into),
        Some(_) => AccountUsableResponseControl::decode_value(criticality, value).map(Into::into),
    }
}

/// JSON counterpart of [`decode_account_usable`]
pub(crate) fn decode_account_usable_json(
    criticality: bool,
    value: Option<&Map<String, Value>>,
    strict: bool,
    _config: &CodecConfig,
) -> LdapResult<DecodedControl> {
    match value {
        None => AccountUsableRequestControl::decode_value_json(criticality, None, strict)
            .map(Into::into),
        Some(_) => AccountUsableResponseControl::decode_value_json(criticality, value, strict)
            .map(Into::into),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixtures() -> Vec<AccountUsableResponseControl> {
        vec![
            AccountUsableResponseControl::usable(None),
            AccountUsableResponseControl::usable(Some(0)),
            AccountUsableResponseControl::usable(Some(86_400)),
            AccountUsableResponseControl::new(AccountUsability::Unusable {
                inactive: false,
                must_change_password: false,
                password_expired: false,
                remaining_grace_logins: None,
                seconds_until_unlock: None,
            }),
            AccountUsableResponseControl::new(AccountUsability::Unusable {
                inactive: true,
                must_change_password: true,
                password_expired: true,
                remaining_grace_logins: Some(3),
                seconds_until_unlock: Some(600),
            }),
        ]
    }

    #[test]
    fn test_binary_round_trip() {
        for control in fixtures() {
            let generic = control.to_control();
            assert_eq!(AccountUsableResponseControl::decode(&generic).unwrap(), control);
        }
    }

    #[test]
    fn test_json_round_trip() {
        for control in fixtures() {
            let json = control.value_json();
            assert_eq!(
                AccountUsableResponseControl::decode_value_json(false, json.as_ref(), true)
                    .unwrap(),
                control
            );
        }
    }

    #[test]
    fn test_no_expiration_sentinel() {
        let control = AccountUsableResponseControl::usable(None);
        assert_eq!(control.encode_value().unwrap(), vec![0x80, 0x01, 0xFF]);
    }

    #[test]
    fn test_unusable_layout() {
        let control = AccountUsableResponseControl::new(AccountUsability::Unusable {
            inactive: true,
            must_change_password: false,
            password_expired: false,
            remaining_grace_logins: Some(2),
            seconds_until_unlock: None,
        });
        assert_eq!(
            control.encode_value().unwrap(),
            vec![0xA1, 0x06, 0x80, 0x01, 0xFF, 0x83, 0x01, 0x02]
        );
    }

    #[test]
    fn test_unexpected_choice_is_error() {
        let err = AccountUsableResponseControl::decode_value(false, Some(&[0x82, 0x00]))
            .unwrap_err();
        assert!(err.is_decoding_error());
    }

    #[test]
    fn test_contradictory_json_is_error() {
        let Value::Object(object) = json!({"account-is-usable": true, "account-is-inactive": true})
        else {
            unreachable!()
        };
        assert!(
            AccountUsableResponseControl::decode_value_json(false, Some(&object), false).is_err()
        );
    }

    #[test]
    fn test_shared_oid_dispatch() {
        let config = CodecConfig::default();
        let request = decode_account_usable(false, None, &config).unwrap();
        assert!(matches!(request, DecodedControl::AccountUsableRequest(_)));

        let value = AccountUsableResponseControl::usable(Some(5)).encode_value();
        let response = decode_account_usable(true, value.as_deref(), &config).unwrap();
        assert!(matches!(response, DecodedControl::AccountUsableResponse(_)));
        assert!(response.criticality());
    }

    #[test]
    fn test_critical_response_round_trip() {
        for control in fixtures() {
            let control = control.with_criticality(true);
            let generic = control.to_control();
            assert!(generic.criticality());
            assert_eq!(AccountUsableResponseControl::decode(&generic).unwrap(), control);

            let json = control.value_json();
            let decoded =
                AccountUsableResponseControl::decode_value_json(true, json.as_ref(), true).unwrap();
            assert_eq!(decoded, control);
        }
    }

    #[test]
    fn test_negative_expiration_means_none() {
        let control = AccountUsableResponseControl::usable(Some(-5));
        assert_eq!(control, AccountUsableResponseControl::usable(None));
        assert_eq!(control.encode_value().unwrap(), vec![0x80, 0x01, 0xFF]);
        assert_eq!(AccountUsableResponseControl::decode(&control.to_control()).unwrap(), control);

        let direct = AccountUsableResponseControl::new(AccountUsability::Usable {
            seconds_until_password_expiration: Some(-30),
        });
        assert_eq!(direct, control);

        // [0] INTEGER -5 from the wire
        let decoded = AccountUsableResponseControl::decode_value(false, Some(&[0x80, 0x01, 0xFB]))
            .unwrap();
        assert_eq!(decoded, control);

        let Value::Object(object) = json!({
            "account-is-usable": true,
            "seconds-until-password-expiration": -5
        }) else {
            unreachable!()
        };
        let decoded =
            AccountUsableResponseControl::decode_value_json(false, Some(&object), true).unwrap();
        assert_eq!(decoded, control);
    }
}
