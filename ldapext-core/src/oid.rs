use crate::error::{LdapError, LdapResult};
use once_cell::sync::Lazy;
use regex::Regex;

static NUMERIC_OID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)+$").expect("numeric OID pattern is valid"));

/// Check whether `oid` is a dotted-decimal object identifier
///
/// At least two arcs are required and every arc must be all digits.
/// Leading zeros are tolerated because some servers emit them.
pub fn is_numeric_oid(oid: &str) -> bool {
    NUMERIC_OID.is_match(oid)
}

/// Validate an OID that came from untrusted input
pub fn check_decoded_oid(oid: &str) -> LdapResult<()> {
    if oid.is_empty() {
        return Err(LdapError::Decoding("Empty OID".to_string()));
    }
    if !is_numeric_oid(oid) {
        return Err(LdapError::Decoding(format!(
            "OID '{}' is not a dotted-decimal object identifier",
            oid
        )));
    }
    Ok(())
}

/// Validate an OID supplied by the local application
pub fn check_oid(oid: &str) -> LdapResult<()> {
    if oid.is_empty() {
        return Err(LdapError::Usage("OID must not be empty".to_string()));
    }
    if !is_numeric_oid(oid) {
        return Err(LdapError::Usage(format!(
            "OID '{}' is not a dotted-decimal object identifier",
            oid
        )));
    }
    Ok(())
}
