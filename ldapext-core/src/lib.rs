//! Core types and utilities for LDAP protocol extension values
//!
//! This crate provides the error type, result codes and OID helpers
//! shared by the BER codec and the control/extended-operation layer.

pub mod error;
pub mod oid;
pub mod result_code;

pub use error::{LdapError, LdapResult};
pub use oid::{check_decoded_oid, check_oid, is_numeric_oid};
pub use result_code::ResultCode;
