//! ASN.1 processing module for LDAP protocol extension values
//!
//! This crate provides the subset of BER (ITU-T X.690) used by LDAP
//! controls and extended operations: definite-length TLVs, universal
//! BOOLEAN / INTEGER / ENUMERATED / NULL / OCTET STRING / SEQUENCE / SET,
//! and context-specific or application tags.

pub use ldapext_core::error;

pub mod ber;

pub use error::{LdapError, LdapResult};
pub use ber::{BerDecoder, BerElement, BerEncoder, BerLength, BerTag, BerTagClass};
