//! ldapext - LDAP controls and extended operations
//!
//! Encodes and decodes the extension values carried by LDAP messages:
//! request and response controls, extended requests and results, and their
//! JSON form. Transport, message framing and sessions live elsewhere; this
//! library only turns bytes and JSON into typed values and back.
//!
//! # Architecture
//!
//! - `ldapext-core`: error type, result codes, OID validation
//! - `ldapext-asn1`: BER encoding/decoding
//! - `ldapext-protocol`: envelopes, decoder registries, typed controls and
//!   extended operations, JSON codec
//!
//! # Usage
//!
//! ```rust
//! use ldapext::controls::SimplePagedResultsControl;
//! use ldapext::{decode_controls, encode_controls, find_typed_control, ControlType};
//!
//! let page = SimplePagedResultsControl::first_page(500, false).unwrap();
//! let bytes = encode_controls(&[page.to_control()]);
//!
//! let controls = decode_controls(&bytes).unwrap();
//! let found = find_typed_control::<SimplePagedResultsControl, _>(&controls).unwrap();
//! assert_eq!(found, Some(page));
//! ```

pub use ldapext_core::{LdapError, LdapResult, ResultCode};
pub use ldapext_protocol::{
    decode_control, decode_controls, encode_controls, find_all_controls, find_all_typed_controls,
    find_control, find_typed_control, Control, ControlType, CustomControl, DecodedControl,
    DecodedExtendedRequest, DecodedExtendedResult, ExtendedRequest, ExtendedRequestType,
    ExtendedResult, ExtendedResultType,
};

pub use ldapext_protocol::{controls, extended_ops, json, lookup, registry};

/// BER codec
pub mod ber {
    pub use ldapext_asn1::ber::*;
}

/// OID validation
pub mod oid {
    pub use ldapext_core::oid::*;
}
