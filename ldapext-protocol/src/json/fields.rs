//! Field access over a JSON object with unrecognized-key tracking

use crate::error::{LdapError, LdapResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Number, Value};

/// Reader over one JSON object
///
/// Every accessor records its key as recognized. [`finish`](Self::finish)
/// then rejects any other key when `strict` is set. A `null` member is
/// treated as absent.
pub(crate) struct JsonFields<'a> {
    object: &'a Map<String, Value>,
    context: &'a str,
    recognized: Vec<&'static str>,
}

impl<'a> JsonFields<'a> {
    pub(crate) fn new(object: &'a Map<String, Value>, context: &'a str) -> Self {
        Self {
            object,
            context,
            recognized: Vec::new(),
        }
    }

    fn get(&mut self, key: &'static str) -> Option<&'a Value> {
        self.recognized.push(key);
        match self.object.get(key) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    fn missing(&self, key: &str) -> LdapError {
        LdapError::Decoding(format!("{} is missing required field '{}'", self.context, key))
    }

    fn wrong_type(&self, key: &str, expected: &str) -> LdapError {
        LdapError::Decoding(format!(
            "{} field '{}' must be {}",
            self.context, key, expected
        ))
    }

    pub(crate) fn optional_str(&mut self, key: &'static str) -> LdapResult<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.wrong_type(key, "a string")),
        }
    }

    pub(crate) fn required_str(&mut self, key: &'static str) -> LdapResult<String> {
        self.optional_str(key)?.ok_or_else(|| self.missing(key))
    }

    pub(crate) fn optional_bool(&mut self, key: &'static str) -> LdapResult<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(self.wrong_type(key, "a boolean")),
        }
    }

    pub(crate) fn required_bool(&mut self, key: &'static str) -> LdapResult<bool> {
        self.optional_bool(key)?.ok_or_else(|| self.missing(key))
    }

    pub(crate) fn optional_i64(&mut self, key: &'static str) -> LdapResult<Option<i64>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.wrong_type(key, "an integer")),
            Some(_) => Err(self.wrong_type(key, "an integer")),
        }
    }

    pub(crate) fn required_i64(&mut self, key: &'static str) -> LdapResult<i64> {
        self.optional_i64(key)?.ok_or_else(|| self.missing(key))
    }

    pub(crate) fn optional_i32(&mut self, key: &'static str) -> LdapResult<Option<i32>> {
        match self.optional_i64(key)? {
            None => Ok(None),
            Some(n) => i32::try_from(n)
                .map(Some)
                .map_err(|_| self.wrong_type(key, "a 32-bit integer")),
        }
    }

    pub(crate) fn required_i32(&mut self, key: &'static str) -> LdapResult<i32> {
        self.optional_i32(key)?.ok_or_else(|| self.missing(key))
    }

    /// Base64 text decoded to bytes
    pub(crate) fn optional_base64(&mut self, key: &'static str) -> LdapResult<Option<Vec<u8>>> {
        match self.optional_str(key)? {
            None => Ok(None),
            Some(text) => decode_base64(&text)
                .map(Some)
                .map_err(|_| self.wrong_type(key, "valid base64")),
        }
    }

    pub(crate) fn optional_object(
        &mut self,
        key: &'static str,
    ) -> LdapResult<Option<&'a Map<String, Value>>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Object(object)) => Ok(Some(object)),
            Some(_) => Err(self.wrong_type(key, "an object")),
        }
    }

    pub(crate) fn required_object(&mut self, key: &'static str) -> LdapResult<&'a Map<String, Value>> {
        self.optional_object(key)?.ok_or_else(|| self.missing(key))
    }

    pub(crate) fn optional_array(&mut self, key: &'static str) -> LdapResult<Option<&'a [Value]>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items.as_slice())),
            Some(_) => Err(self.wrong_type(key, "an array")),
        }
    }

    pub(crate) fn required_array(&mut self, key: &'static str) -> LdapResult<&'a [Value]> {
        self.optional_array(key)?.ok_or_else(|| self.missing(key))
    }

    /// Array whose members must all be objects
    pub(crate) fn object_array(
        &mut self,
        key: &'static str,
        required: bool,
    ) -> LdapResult<Vec<&'a Map<String, Value>>> {
        let items = match self.optional_array(key)? {
            Some(items) => items,
            None if required => return Err(self.missing(key)),
            None => return Ok(Vec::new()),
        };
        items
            .iter()
            .map(|item| {
                item.as_object()
                    .ok_or_else(|| self.wrong_type(key, "an array of objects"))
            })
            .collect()
    }

    /// Array whose members must all be strings
    pub(crate) fn string_array(
        &mut self,
        key: &'static str,
        required: bool,
    ) -> LdapResult<Vec<String>> {
        let items = match self.optional_array(key)? {
            Some(items) => items,
            None if required => return Err(self.missing(key)),
            None => return Ok(Vec::new()),
        };
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.wrong_type(key, "an array of strings"))
            })
            .collect()
    }

    /// Reject unrecognized keys in strict mode
    pub(crate) fn finish(self, strict: bool) -> LdapResult<()> {
        if !strict {
            return Ok(());
        }
        match self
            .object
            .keys()
            .find(|key| !self.recognized.contains(&key.as_str()))
        {
            Some(key) => Err(LdapError::Decoding(format!(
                "{} has unrecognized field '{}'",
                self.context, key
            ))),
            None => Ok(()),
        }
    }
}

/// Builder for the JSON object of one value, skipping absent members
#[derive(Debug, Default)]
pub(crate) struct JsonObject {
    object: Map<String, Value>,
}

impl JsonObject {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn str(mut self, key: &str, value: &str) -> Self {
        self.object.insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    pub(crate) fn opt_str(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.str(key, value),
            None => self,
        }
    }

    pub(crate) fn bool(mut self, key: &str, value: bool) -> Self {
        self.object.insert(key.to_string(), Value::Bool(value));
        self
    }

    pub(crate) fn opt_bool(self, key: &str, value: Option<bool>) -> Self {
        match value {
            Some(value) => self.bool(key, value),
            None => self,
        }
    }

    pub(crate) fn int(mut self, key: &str, value: i64) -> Self {
        self.object.insert(key.to_string(), Value::Number(Number::from(value)));
        self
    }

    pub(crate) fn opt_int(self, key: &str, value: Option<i64>) -> Self {
        match value {
            Some(value) => self.int(key, value),
            None => self,
        }
    }

    pub(crate) fn base64(self, key: &str, value: &[u8]) -> Self {
        self.str(key, &encode_base64(value))
    }

    pub(crate) fn value(mut self, key: &str, value: Value) -> Self {
        self.object.insert(key.to_string(), value);
        self
    }

    pub(crate) fn object(self, key: &str, value: Map<String, Value>) -> Self {
        self.value(key, Value::Object(value))
    }

    pub(crate) fn strings(self, key: &str, values: &[String]) -> Self {
        let items = values.iter().cloned().map(Value::String).collect();
        self.value(key, Value::Array(items))
    }

    pub(crate) fn objects(self, key: &str, values: Vec<Map<String, Value>>) -> Self {
        let items = values.into_iter().map(Value::Object).collect();
        self.value(key, Value::Array(items))
    }

    pub(crate) fn build(self) -> Map<String, Value> {
        self.object
    }
}

pub(crate) fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub(crate) fn decode_base64(text: &str) -> LdapResult<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|e| LdapError::Decoding(format!("Invalid base64 value: {}", e)))
}
