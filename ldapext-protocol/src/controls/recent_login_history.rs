//! Get recent login history request and response controls
//!
//! The response value is the UTF-8 text of a JSON object, the same object
//! that appears as `value-json` in the JSON control form:
//!
//! ```json
//! {
//!   "successful-attempts": [
//!     { "successful": true, "timestamp": 1700000000000,
//!       "authentication-method": "simple", "client-ip-address": "10.0.0.1" }
//!   ],
//!   "failed-attempts": [
//!     { "successful": false, "timestamp": 1700000001000,
//!       "authentication-method": "simple", "failure-reason": "invalid-credentials",
//!       "additional-attempt-count": 2 }
//!   ]
//! }
//! ```
//!
//! The binary value is parsed leniently; unknown members are ignored so a
//! newer server can add fields.

use crate::decoded::{
    expect_no_json_value, expect_no_value, require_json_value, require_value, ControlType,
    DecodedControl,
};
use crate::error::{LdapError, LdapResult};
use crate::json::fields::{JsonFields, JsonObject};
use serde_json::{Map, Value};

const JSON_SUCCESSFUL_ATTEMPTS: &str = "successful-attempts";
const JSON_FAILED_ATTEMPTS: &str = "failed-attempts";
const JSON_SUCCESSFUL: &str = "successful";
const JSON_TIMESTAMP: &str = "timestamp";
const JSON_AUTHENTICATION_METHOD: &str = "authentication-method";
const JSON_CLIENT_IP_ADDRESS: &str = "client-ip-address";
const JSON_FAILURE_REASON: &str = "failure-reason";
const JSON_ADDITIONAL_ATTEMPT_COUNT: &str = "additional-attempt-count";

const ATTEMPT_CONTEXT: &str = "Recent login history attempt";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GetRecentLoginHistoryRequestControl {
    criticality: bool,
}

impl GetRecentLoginHistoryRequestControl {
    pub fn new(criticality: bool) -> Self {
        Self { criticality }
    }
}

impl ControlType for GetRecentLoginHistoryRequestControl {
    const OID: &'static str = "1.3.6.1.4.1.30221.2.5.61";
    const NAME: &'static str = "Get Recent Login History Request";

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
            DecodedControl::GetRecentLoginHistoryRequest(control) => Some(control),
            _ => None,
        }
    }
}

/// One authentication attempt (or a run of identical ones)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecentLoginHistoryAttempt {
    successful: bool,
    timestamp: i64,
    authentication_method: String,
    client_ip_address: Option<String>,
    failure_reason: Option<String>,
    additional_attempt_count: Option<i64>,
}

impl RecentLoginHistoryAttempt {
    /// `timestamp` is in milliseconds since the Unix epoch
    pub fn successful(
        timestamp: i64,
        authentication_method: impl Into<String>,
        client_ip_address: Option<String>,
        additional_attempt_count: Option<i64>,
    ) -> Self {
        Self {
            successful: true,
            timestamp,
            authentication_method: authentication_method.into(),
            client_ip_address,
            failure_reason: None,
            additional_attempt_count,
        }
    }

    pub fn failed(
        timestamp: i64,
        authentication_method: impl Into<String>,
        client_ip_address: Option<String>,
        failure_reason: impl Into<String>,
        additional_attempt_count: Option<i64>,
    ) -> Self {
        Self {
            successful: false,
            timestamp,
            authentication_method: authentication_method.into(),
            client_ip_address,
            failure_reason: Some(failure_reason.into()),
            additional_attempt_count,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.successful
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn authentication_method(&self) -> &str {
        &self.authentication_method
    }

    pub fn client_ip_address(&self) -> Option<&str> {
        self.client_ip_address.as_deref()
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn additional_attempt_count(&self) -> Option<i64> {
        self.additional_attempt_count
    }

    pub fn to_json(&self) -> Map<String, Value> {
        JsonObject::new()
            .bool(JSON_SUCCESSFUL, self.successful)
            .int(JSON_TIMESTAMP, self.timestamp)
            .str(JSON_AUTHENTICATION_METHOD, &self.authentication_method)
            .opt_str(JSON_CLIENT_IP_ADDRESS, self.client_ip_address.as_deref())
            .opt_str(JSON_FAILURE_REASON, self.failure_reason.as_deref())
            .opt_int(JSON_ADDITIONAL_ATTEMPT_COUNT, self.additional_attempt_count)
            .build()
    }

    pub fn from_json(object: &Map<String, Value>, strict: bool) -> LdapResult<Self> {
        let mut fields = JsonFields::new(object, ATTEMPT_CONTEXT);
        let successful = fields.required_bool(JSON_SUCCESSFUL)?;
        let timestamp = fields.required_i64(JSON_TIMESTAMP)?;
        let authentication_method = fields.required_str(JSON_AUTHENTICATION_METHOD)?;
        let client_ip_address = fields.optional_str(JSON_CLIENT_IP_ADDRESS)?;
        let failure_reason = fields.optional_str(JSON_FAILURE_REASON)?;
        let additional_attempt_count = fields.optional_i64(JSON_ADDITIONAL_ATTEMPT_COUNT)?;
        fields.finish(strict)?;

        match (successful, &failure_reason) {
            (true, Some(_)) => {
                return Err(LdapError::Decoding(format!(
                    "{} is successful but has a failure reason",
                    ATTEMPT_CONTEXT
                )));
            }
            (false, None) => {
                return Err(LdapError::Decoding(format!(
                    "{} is failed but has no failure reason",
                    ATTEMPT_CONTEXT
                )));
            }
            _ => {}
        }

        Ok(Self {
            successful,
            timestamp,
            authentication_method,
            client_ip_address,
            failure_reason,
            additional_attempt_count,
        })
    }
}

/// Successful and failed attempts, each list in server order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RecentLoginHistory {
    successful_attempts: Vec<RecentLoginHistoryAttempt>,
    failed_attempts: Vec<RecentLoginHistoryAttempt>,
}

impl RecentLoginHistory {
    /// # Error Handling
    /// Returns a usage error if an attempt sits in the wrong list.
    pub fn new(
        successful_attempts: Vec<RecentLoginHistoryAttempt>,
        failed_attempts: Vec<RecentLoginHistoryAttempt>,
    ) -> LdapResult<Self> {
        if successful_attempts.iter().any(|a| !a.is_successful())
            || failed_attempts.iter().any(RecentLoginHistoryAttempt::is_successful)
        {
            return Err(LdapError::Usage(
                "Login history attempt placed in the wrong list".to_string(),
            ));
        }
        Ok(Self {
            successful_attempts,
            failed_attempts,
        })
    }

    pub fn successful_attempts(&self) -> &[RecentLoginHistoryAttempt] {
        &self.successful_attempts
    }

    pub fn failed_attempts(&self) -> &[RecentLoginHistoryAttempt] {
        &self.failed_attempts
    }

    pub fn is_empty(&self) -> bool {
        self.successful_attempts.is_empty() && self.failed_attempts.is_empty()
    }

    pub fn to_json(&self) -> Map<String, Value> {
        let mut object = JsonObject::new();
        if !self.successful_attempts.is_empty() {
            object = object.objects(
                JSON_SUCCESSFUL_ATTEMPTS,
                self.successful_attempts.iter().map(RecentLoginHistoryAttempt::to_json).collect(),
            );
        }
        if !self.failed_attempts.is_empty() {
            object = object.objects(
                JSON_FAILED_ATTEMPTS,
                self.failed_attempts.iter().map(RecentLoginHistoryAttempt::to_json).collect(),
            );
        }
        object.build()
    }

    pub fn from_json(object: &Map<String, Value>, strict: bool) -> LdapResult<Self> {
        let mut fields = JsonFields::new(object, "Recent login history");
        let successful = fields.object_array(JSON_SUCCESSFUL_ATTEMPTS, false)?;
        let failed = fields.object_array(JSON_FAILED_ATTEMPTS, false)?;
        fields.finish(strict)?;

        let successful_attempts = successful
            .into_iter()
            .map(|a| RecentLoginHistoryAttempt::from_json(a, strict))
            .collect::<LdapResult<Vec<_>>>()?;
        let failed_attempts = failed
            .into_iter()
            .map(|a| RecentLoginHistoryAttempt::from_json(a, strict))
            .collect::<LdapResult<Vec<_>>>()?;

        Self::new(successful_attempts, failed_attempts)
            .map_err(|e| LdapError::Decoding(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GetRecentLoginHistoryResponseControl {
    history: RecentLoginHistory,
    criticality: bool,
}

impl GetRecentLoginHistoryResponseControl {
    /// Non-critical response
    pub fn new(history: RecentLoginHistory) -> Self {
        Self {
            history,
            criticality: false,
        }
    }

    pub fn with_criticality(mut self, criticality: bool) -> Self {
        self.criticality = criticality;
        self
    }

    pub fn history(&self) -> &RecentLoginHistory {
        &self.history
    }
}

impl ControlType for GetRecentLoginHistoryResponseControl {
    const OID: &'static str = "1.3.6.1.4.1.30221.2.5.62";
    const NAME: &'static str = "Get Recent Login History Response";

    fn criticality(&self) -> bool {
        self.criticality
    }

    fn encode_value(&self) -> Option<Vec<u8>> {
        Some(Value::Object(self.history.to_json()).to_string().into_bytes())
    }

    fn decode_value(criticality: bool, value: Option<&[u8]>) -> LdapResult<Self> {
        let value = require_value(Self::NAME, value)?;
        let text = std::str::from_utf8(value).map_err(|_| {
            LdapError::Decoding(format!("{} value is not valid UTF-8", Self::NAME))
        })?;
        let parsed: Value = serde_json::from_str(text)?;
        let object = parsed.as_object().ok_or_else(|| {
            LdapError::Decoding(format!("{} value is not a JSON object", Self::NAME))
        })?;
        Ok(Self::new(RecentLoginHistory::from_json(object, false)?).with_criticality(criticality))
    }

    fn value_json(&self) -> Option<Map<String, Value>> {
        Some(self.history.to_json())
    }

    fn decode_value_json(
        criticality: bool,
        value: Option<&Map<String, Value>>,
        strict: bool,
    ) -> LdapResult<Self> {
        let value = require_json_value(Self::NAME, value)?;
        Ok(Self::new(RecentLoginHistory::from_json(value, strict)?).with_criticality(criticality))
    }

    fn from_decoded(decoded: DecodedControl) -> Option<Self> {
        match decoded {
            DecodedControl::GetRecentLoginHistoryResponse(control) => Some(control),
            _ => None,
        }
    }
}
