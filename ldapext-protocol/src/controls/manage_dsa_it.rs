//! ManageDsaIT request control (RFC 3296)

use crate::decoded::{expect_no_json_value, expect_no_value, ControlType, DecodedControl};
use crate::error::LdapResult;
use serde_json::{Map, Value};

/// Asks the server to treat referral objects as ordinary entries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManageDsaItRequestControl {
    criticality: bool,
}

impl ManageDsaItRequestControl {
    pub fn new(criticality: bool) -> Self {
        Self { criticality }
    }
}

impl Default for ManageDsaItRequestControl {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ControlType for ManageDsaItRequestControl {
    const OID: &'static str = "2.16.840.1.113730.3.4.2";
    const NAME: &'static str = "ManageDsaIT Request";

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
            DecodedControl::ManageDsaIt(control) => Some(control),
            _ => None,
        }
    }
}
