//! Typed control values and the tagged union returned by the registries

use crate::control::Control;
use crate::controls::{
    AccountUsableRequestControl, AccountUsableResponseControl,
    AuthorizationIdentityRequestControl, AuthorizationIdentityResponseControl,
    GetBackendSetIdRequestControl, GetBackendSetIdResponseControl,
    GetRecentLoginHistoryRequestControl, GetRecentLoginHistoryResponseControl,
    IntermediateClientRequestControl, JoinRequestControl, ManageDsaItRequestControl,
    ProxiedAuthorizationV2RequestControl, SimplePagedResultsControl,
};
use crate::error::{LdapError, LdapResult};
use crate::registry::CodecConfig;
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A control type with a fixed OID and both a binary and a JSON codec
///
/// Both encodings of one type live in the same module so they are tested
/// against the same fixtures.
pub trait ControlType: Sized + Clone + Into<DecodedControl> {
    /// Control OID
    const OID: &'static str;
    /// Human-readable name, emitted as `control-name` in JSON
    const NAME: &'static str;

    fn criticality(&self) -> bool;

    /// Raw control value, or `None` when the control carries no value
    fn encode_value(&self) -> Option<Vec<u8>>;

    /// Decode from the generic parts of a control with this OID
    ///
    /// Implementations validate the value against their own grammar and
    /// never accept malformed input silently.
    fn decode_value(criticality: bool, value: Option<&[u8]>) -> LdapResult<Self>;

    /// [`decode_value`](Self::decode_value) under the limits of a
    /// particular registry
    ///
    /// Only recursive types use the config; the others keep this default.
    fn decode_value_with(
        criticality: bool,
        value: Option<&[u8]>,
        _config: &CodecConfig,
    ) -> LdapResult<Self> {
        Self::decode_value(criticality, value)
    }

    /// JSON form of the value, or `None` when the control carries no value
    fn value_json(&self) -> Option<Map<String, Value>>;

    /// Decode from the `criticality` and `value-json` of a JSON control
    ///
    /// In `strict` mode unrecognized fields are an error; otherwise they
    /// are ignored.
    fn decode_value_json(
        criticality: bool,
        value: Option<&Map<String, Value>>,
        strict: bool,
    ) -> LdapResult<Self>;

    /// [`decode_value_json`](Self::decode_value_json) under the limits of
    /// a particular registry
    fn decode_value_json_with(
        criticality: bool,
        value: Option<&Map<String, Value>>,
        strict: bool,
        _config: &CodecConfig,
    ) -> LdapResult<Self> {
        Self::decode_value_json(criticality, value, strict)
    }

    /// Take the matching variant out of a decoded control
    fn from_decoded(decoded: DecodedControl) -> Option<Self>;

    fn to_control(&self) -> Control {
        Control::from_parts(Self::OID, self.criticality(), self.encode_value())
    }

    /// Decode a generic control, checking its OID first
    fn decode(control: &Control) -> LdapResult<Self> {
        if control.oid() != Self::OID {
            return Err(LdapError::Decoding(format!(
                "Control OID {} does not match {} ({})",
                control.oid(),
                Self::OID,
                Self::NAME
            )));
        }
        Self::decode_value(control.criticality(), control.value())
    }
}

/// A control decoded by an application-registered decoder
///
/// Applications downcast through [`as_any`](Self::as_any) to reach their
/// concrete type.
pub trait CustomControl: fmt::Debug + Send + Sync {
    fn oid(&self) -> &str;

    fn name(&self) -> &str {
        self.oid()
    }

    fn criticality(&self) -> bool;

    fn encode_value(&self) -> Option<Vec<u8>>;

    /// JSON form of the value; `None` makes the JSON codec fall back to base64
    fn value_json(&self) -> Option<Map<String, Value>> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

macro_rules! decoded_controls {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// A control after registry dispatch
        ///
        /// Built-in types get their own variant; application types arrive
        /// as [`DecodedControl::Custom`]; anything the registry does not
        /// know stays [`DecodedControl::Generic`] with its bytes untouched.
        #[derive(Debug, Clone)]
        pub enum DecodedControl {
            $($variant($ty),)*
            Custom(Arc<dyn CustomControl>),
            Generic(Control),
        }

        impl DecodedControl {
            pub fn oid(&self) -> &str {
                match self {
                    $(DecodedControl::$variant(_) => <$ty as ControlType>::OID,)*
                    DecodedControl::Custom(c) => c.oid(),
                    DecodedControl::Generic(c) => c.oid(),
                }
            }

            pub fn criticality(&self) -> bool {
                match self {
                    $(DecodedControl::$variant(c) => c.criticality(),)*
                    DecodedControl::Custom(c) => c.criticality(),
                    DecodedControl::Generic(c) => c.criticality(),
                }
            }

            /// Name from the type, or `None` for a generic control
            pub fn name(&self) -> Option<&str> {
                match self {
                    $(DecodedControl::$variant(_) => Some(<$ty as ControlType>::NAME),)*
                    DecodedControl::Custom(c) => Some(c.name()),
                    DecodedControl::Generic(_) => None,
                }
            }

            /// Back to the generic envelope
            pub fn to_control(&self) -> Control {
                match self {
                    $(DecodedControl::$variant(c) => c.to_control(),)*
                    DecodedControl::Custom(c) => {
                        Control::from_parts(c.oid(), c.criticality(), c.encode_value())
                    }
                    DecodedControl::Generic(c) => c.clone(),
                }
            }

            /// JSON form of the value, if the type has one
            pub fn value_json(&self) -> Option<Map<String, Value>> {
                match self {
                    $(DecodedControl::$variant(c) => c.value_json(),)*
                    DecodedControl::Custom(c) => c.value_json(),
                    DecodedControl::Generic(_) => None,
                }
            }
        }

        impl PartialEq for DecodedControl {
            fn eq(&self, other: &Self) -> bool {
                match (self, other) {
                    $((DecodedControl::$variant(a), DecodedControl::$variant(b)) => a == b,)*
                    (DecodedControl::Custom(a), DecodedControl::Custom(b)) => {
                        a.oid() == b.oid()
                            && a.criticality() == b.criticality()
                            && a.encode_value() == b.encode_value()
                    }
                    (DecodedControl::Generic(a), DecodedControl::Generic(b)) => a == b,
                    _ => false,
                }
            }
        }

        $(
            impl From<$ty> for DecodedControl {
                fn from(control: $ty) -> Self {
                    DecodedControl::$variant(control)
                }
            }
        )*
    };
}

decoded_controls! {
    SimplePagedResults(SimplePagedResultsControl),
    ManageDsaIt(ManageDsaItRequestControl),
    AuthorizationIdentityRequest(AuthorizationIdentityRequestControl),
    AuthorizationIdentityResponse(AuthorizationIdentityResponseControl),
    ProxiedAuthorizationV2(ProxiedAuthorizationV2RequestControl),
    AccountUsableRequest(AccountUsableRequestControl),
    AccountUsableResponse(AccountUsableResponseControl),
    GetBackendSetIdRequest(GetBackendSetIdRequestControl),
    GetBackendSetIdResponse(GetBackendSetIdResponseControl),
    GetRecentLoginHistoryRequest(GetRecentLoginHistoryRequestControl),
    GetRecentLoginHistoryResponse(GetRecentLoginHistoryResponseControl),
    IntermediateClientRequest(IntermediateClientRequestControl),
    JoinRequest(JoinRequestControl),
}

impl DecodedControl {
    pub fn is_generic(&self) -> bool {
        matches!(self, DecodedControl::Generic(_))
    }
}

impl From<Control> for DecodedControl {
    fn from(control: Control) -> Self {
        DecodedControl::Generic(control)
    }
}

/// Registry adapter: decode a generic control into its typed variant
pub(crate) fn decode_typed<T: ControlType>(
    criticality: bool,
    value: Option<&[u8]>,
    config: &CodecConfig,
) -> LdapResult<DecodedControl> {
    T::decode_value_with(criticality, value, config).map(Into::into)
}

/// Registry adapter: decode a JSON control into its typed variant
pub(crate) fn decode_typed_json<T: ControlType>(
    criticality: bool,
    value: Option<&Map<String, Value>>,
    strict: bool,
    config: &CodecConfig,
) -> LdapResult<DecodedControl> {
    T::decode_value_json_with(criticality, value, strict, config).map(Into::into)
}

/// Shared check for controls that never carry a value
pub(crate) fn expect_no_value(name: &str, value: Option<&[u8]>) -> LdapResult<()> {
    if value.is_some() {
        return Err(LdapError::Decoding(format!("{} control must not have a value", name)));
    }
    Ok(())
}

/// Shared check for controls that always carry a value
pub(crate) fn require_value<'a>(name: &str, value: Option<&'a [u8]>) -> LdapResult<&'a [u8]> {
    value.ok_or_else(|| LdapError::Decoding(format!("{} control must have a value", name)))
}

/// JSON counterpart of [`expect_no_value`]
pub(crate) fn expect_no_json_value(
    name: &str,
    value: Option<&Map<String, Value>>,
) -> LdapResult<()> {
    if value.is_some() {
        return Err(LdapError::Decoding(format!(
            "{} control must not have a value-json field",
            name
        )));
    }
    Ok(())
}

/// JSON counterpart of [`require_value`]
pub(crate) fn require_json_value<'a>(
    name: &str,
    value: Option<&'a Map<String, Value>>,
) -> LdapResult<&'a Map<String, Value>> {
    value.ok_or_else(|| {
        LdapError::Decoding(format!("{} control must have a value-json field", name))
    })
}
