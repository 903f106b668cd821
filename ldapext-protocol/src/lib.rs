//! LDAP controls and extended operations
//!
//! This crate provides the protocol-extension layer of the SDK:
//!
//! - [`Control`], [`ExtendedRequest`] and [`ExtendedResult`] envelopes with
//!   their BER encodings
//! - process-wide OID-keyed decoder registries ([`registry`]) that turn a
//!   generic envelope into a typed value, falling back to the generic
//!   envelope for OIDs they do not know
//! - lookups over control lists ([`lookup`])
//! - a representative set of typed controls ([`controls`]) and extended
//!   operations ([`extended_ops`]), each carrying its binary and JSON codec
//! - the JSON control representation ([`json`])
//!
//! Nothing here performs I/O; every operation is a pure function over
//! in-memory buffers.

pub use ldapext_core::error;

pub mod control;
pub mod controls;
pub mod decoded;
pub mod extended;
pub mod extended_ops;
pub mod json;
pub mod lookup;
pub mod registry;

pub use control::{decode_controls, encode_controls, Control};
pub use decoded::{ControlType, CustomControl, DecodedControl};
pub use error::{LdapError, LdapResult};
pub use extended::{ExtendedRequest, ExtendedResult};
pub use extended_ops::{
    DecodedExtendedRequest, DecodedExtendedResult, ExtendedRequestType, ExtendedResultType,
};
pub use json::{
    decode_control_json, decode_control_json_value, encode_control_json, ControlJsonForm,
    ControlJsonValue,
};
pub use lookup::{find_all_controls, find_all_typed_controls, find_control, find_typed_control};
pub use registry::{
    decode_control, decode_extended_request, decode_extended_result, CodecConfig, ControlRegistry,
    RegistryBuilder,
};
