//! JSON representation of controls
//!
//! A control becomes a [`ControlJsonForm`]. Its value is written as
//! `value-json` when a JSON codec is registered for the OID, otherwise as
//! `value-base64` holding the raw binary value. Decoding accepts either
//! member; `value-base64` goes through the binary registry and
//! `value-json` through the JSON registry.
//!
//! # Usage Example
//!
//! ```rust
//! use ldapext_protocol::controls::SimplePagedResultsControl;
//! use ldapext_protocol::json::{decode_control_json_value, encode_control_json};
//! use ldapext_protocol::DecodedControl;
//!
//! let control = DecodedControl::from(SimplePagedResultsControl::first_page(100, false).unwrap());
//! let json = encode_control_json(&control).to_json();
//! assert_eq!(decode_control_json_value(&json, true).unwrap(), control);
//! ```

pub(crate) mod fields;
pub mod form;
pub mod registry;

pub use form::{ControlJsonForm, ControlJsonValue};
pub use registry::{JsonDecodeFn, JsonRegistry, JsonRegistryBuilder};

use crate::decoded::DecodedControl;
use crate::error::LdapResult;
use crate::registry as binary;
use serde_json::Value;
use std::borrow::Cow;

/// Encode a control, generic or typed, as its JSON form
///
/// A generic control under a registered OID is decoded first so its value
/// can be written as `value-json`; if that decode fails the raw bytes are
/// written as `value-base64` instead.
pub fn encode_control_json(control: &DecodedControl) -> ControlJsonForm {
    let control = specialize(control);
    let generic = control.to_control();
    let oid = generic.oid().to_string();

    let control_name = control
        .name()
        .or_else(|| binary::global().control_name(&oid))
        .unwrap_or(oid.as_str())
        .to_string();

    let value = generic.value().map(|bytes| {
        let json = if registry::global().contains(&oid) {
            control.value_json()
        } else {
            None
        };
        match json {
            Some(object) => ControlJsonValue::Json(object),
            None => ControlJsonValue::Base64(bytes.to_vec()),
        }
    });

    ControlJsonForm {
        oid,
        control_name: Some(control_name),
        criticality: generic.criticality(),
        value,
    }
}

fn specialize(control: &DecodedControl) -> Cow<'_, DecodedControl> {
    let DecodedControl::Generic(generic) = control else {
        return Cow::Borrowed(control);
    };
    if !binary::global().controls().contains(generic.oid()) {
        return Cow::Borrowed(control);
    }
    match binary::decode(generic) {
        Ok(decoded) => Cow::Owned(decoded),
        Err(e) => {
            log::debug!(
                "Control {} does not decode ({}), writing raw value",
                generic.oid(),
                e
            );
            Cow::Borrowed(control)
        }
    }
}

/// Decode a control from its JSON form
///
/// `value-base64` is the raw binary value and is specialized through the
/// binary registry, so an unknown OID still yields a generic control.
/// `value-json` requires a JSON decoder for the OID. A control with no
/// value goes to the JSON decoder when one is registered and to the
/// binary registry otherwise.
pub fn decode_control_json(form: &ControlJsonForm, strict: bool) -> LdapResult<DecodedControl> {
    let json_registry = registry::global();
    match form.value {
        Some(ControlJsonValue::Base64(ref bytes)) => {
            binary::decode_control(&form.oid, form.criticality, Some(bytes))
        }
        Some(ControlJsonValue::Json(ref object)) => {
            json_registry.decode_control(&form.oid, form.criticality, Some(object), strict)
        }
        None if json_registry.contains(&form.oid) => {
            json_registry.decode_control(&form.oid, form.criticality, None, strict)
        }
        None => binary::decode_control(&form.oid, form.criticality, None),
    }
}

/// Parse and decode a JSON control object
pub fn decode_control_json_value(json: &Value, strict: bool) -> LdapResult<DecodedControl> {
    decode_control_json(&ControlJsonForm::from_json(json, strict)?, strict)
}
