//! JSON object form of a control
//!
//! ```text
//! { "oid": string, "control-name": string, "criticality": bool,
//!   "value-base64"?: string, "value-json"?: object }
//! ```

use crate::error::{LdapError, LdapResult};
use crate::json::fields::{encode_base64, JsonFields};
use ldapext_core::oid::check_decoded_oid;
use serde_json::{Map, Value};

pub const JSON_OID: &str = "oid";
pub const JSON_CONTROL_NAME: &str = "control-name";
pub const JSON_CRITICALITY: &str = "criticality";
pub const JSON_VALUE_BASE64: &str = "value-base64";
pub const JSON_VALUE_JSON: &str = "value-json";

/// The value of a JSON control: raw bytes or a type-specific object
#[derive(Debug, Clone, PartialEq)]
pub enum ControlJsonValue {
    Base64(Vec<u8>),
    Json(Map<String, Value>),
}

/// One control as a JSON object
#[derive(Debug, Clone, PartialEq)]
pub struct ControlJsonForm {
    pub oid: String,
    /// Informational only, ignored on decode
    pub control_name: Option<String>,
    pub criticality: bool,
    pub value: Option<ControlJsonValue>,
}

impl ControlJsonForm {
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert(JSON_OID.to_string(), Value::String(self.oid.clone()));
        if let Some(ref name) = self.control_name {
            object.insert(JSON_CONTROL_NAME.to_string(), Value::String(name.clone()));
        }
        object.insert(JSON_CRITICALITY.to_string(), Value::Bool(self.criticality));
        match self.value {
            Some(ControlJsonValue::Base64(ref bytes)) => {
                object.insert(JSON_VALUE_BASE64.to_string(), Value::String(encode_base64(bytes)));
            }
            Some(ControlJsonValue::Json(ref value)) => {
                object.insert(JSON_VALUE_JSON.to_string(), Value::Object(value.clone()));
            }
            None => {}
        }
        Value::Object(object)
    }

    /// Parse the control object
    ///
    /// # Error Handling
    /// Returns a decoding error if `json` is not an object, a required
    /// member is missing or mistyped, both value members are present, or
    /// (with `strict`) the object has a member this form does not define.
    pub fn from_json(json: &Value, strict: bool) -> LdapResult<Self> {
        let object = json
            .as_object()
            .ok_or_else(|| LdapError::Decoding("JSON control must be an object".to_string()))?;

        let mut fields = JsonFields::new(object, "JSON control");
        let oid = fields.required_str(JSON_OID)?;
        check_decoded_oid(&oid)?;
        let control_name = fields.optional_str(JSON_CONTROL_NAME)?;
        let criticality = fields.required_bool(JSON_CRITICALITY)?;
        let base64 = fields.optional_base64(JSON_VALUE_BASE64)?;
        let json_value = fields.optional_object(JSON_VALUE_JSON)?;
        fields.finish(strict)?;

        let value = match (base64, json_value) {
            (Some(_), Some(_)) => {
                return Err(LdapError::Decoding(format!(
                    "JSON control {} has both '{}' and '{}'",
                    oid, JSON_VALUE_BASE64, JSON_VALUE_JSON
                )));
            }
            (Some(bytes), None) => Some(ControlJsonValue::Base64(bytes)),
            (None, Some(object)) => Some(ControlJsonValue::Json(object.clone())),
            (None, None) => None,
        };

        Ok(Self {
            oid,
            control_name,
            criticality,
            value,
        })
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }

    pub fn from_json_str(text: &str, strict: bool) -> LdapResult<Self> {
        let json: Value = serde_json::from_str(text)?;
        Self::from_json(&json, strict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_json_omits_absent_value() {
        let form = ControlJsonForm {
            oid: "1.2.3.4".to_string(),
            control_name: Some("Test".to_string()),
            criticality: true,
            value: None,
        };
        assert_eq!(
            form.to_json(),
            json!({"oid": "1.2.3.4", "control-name": "Test", "criticality": true})
        );
    }

    #[test]
    fn test_parse_base64_value() {
        let form = ControlJsonForm::from_json(
            &json!({"oid": "1.2.3.4", "criticality": false, "value-base64": "AQID"}),
            true,
        )
        .unwrap();
        assert_eq!(form.value, Some(ControlJsonValue::Base64(vec![1, 2, 3])));
        assert!(form.control_name.is_none());

        let text = form.to_json_string();
        assert_eq!(ControlJsonForm::from_json_str(&text, true).unwrap(), form);
    }

    #[test]
    fn test_both_value_members_rejected() {
        let json = json!({
            "oid": "1.2.3.4",
            "criticality": false,
            "value-base64": "AQID",
            "value-json": {},
        });
        assert!(ControlJsonForm::from_json(&json, false).unwrap_err().is_decoding_error());
    }

    #[test]
    fn test_malformed_members() {
        for json in [
            json!([]),
            json!({"criticality": false}),
            json!({"oid": "1.2.3.4"}),
            json!({"oid": "not-an-oid", "criticality": false}),
            json!({"oid": "1.2.3.4", "criticality": "yes"}),
            json!({"oid": "1.2.3.4", "criticality": false, "value-base64": "@@@"}),
            json!({"oid": "1.2.3.4", "criticality": false, "value-json": "text"}),
        ] {
            assert!(
                ControlJsonForm::from_json(&json, false).unwrap_err().is_decoding_error(),
                "{}",
                json
            );
        }
        assert!(ControlJsonForm::from_json_str("{", false).unwrap_err().is_decoding_error());
    }

    #[test]
    fn test_unrecognized_top_level_member() {
        let json = json!({"oid": "1.2.3.4", "criticality": false, "extra": 1});
        assert!(ControlJsonForm::from_json(&json, true).is_err());
        let form = ControlJsonForm::from_json(&json, false).unwrap();
        assert_eq!(form.oid, "1.2.3.4");
    }
}
