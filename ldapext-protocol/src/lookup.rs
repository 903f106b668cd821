//! Lookups over control lists
//!
//! Every lookup treats a missing control as `Ok(None)` (or an empty list)
//! and a present but malformed control as a decoding error. Generic
//! entries are decoded on the call, through the process-wide registry.

use crate::control::Control;
use crate::decoded::{ControlType, DecodedControl};
use crate::error::LdapResult;
use crate::registry;

/// An element of a control list
pub trait ControlEntry {
    fn entry_oid(&self) -> &str;

    /// Decode the entry, or pass it through if it is already typed
    fn to_decoded(&self) -> LdapResult<DecodedControl>;

    /// Decode the entry as `T`, whose OID is already known to match
    fn to_typed<T: ControlType>(&self) -> LdapResult<T>;
}

impl ControlEntry for Control {
    fn entry_oid(&self) -> &str {
        self.oid()
    }

    fn to_decoded(&self) -> LdapResult<DecodedControl> {
        registry::decode(self)
    }

    fn to_typed<T: ControlType>(&self) -> LdapResult<T> {
        T::decode(self)
    }
}

impl ControlEntry for DecodedControl {
    fn entry_oid(&self) -> &str {
        self.oid()
    }

    fn to_decoded(&self) -> LdapResult<DecodedControl> {
        match self {
            DecodedControl::Generic(control) => registry::decode(control),
            decoded => Ok(decoded.clone()),
        }
    }

    fn to_typed<T: ControlType>(&self) -> LdapResult<T> {
        match T::from_decoded(self.clone()) {
            Some(typed) => Ok(typed),
            None => T::decode(&self.to_control()),
        }
    }
}

/// First control in `controls` with the given OID
pub fn find_control<E: ControlEntry>(oid: &str, controls: &[E]) -> LdapResult<Option<DecodedControl>> {
    controls
        .iter()
        .find(|entry| entry.entry_oid() == oid)
        .map(ControlEntry::to_decoded)
        .transpose()
}

/// Every control in `controls` with the given OID, in list order
pub fn find_all_controls<E: ControlEntry>(oid: &str, controls: &[E]) -> LdapResult<Vec<DecodedControl>> {
    controls
        .iter()
        .filter(|entry| entry.entry_oid() == oid)
        .map(ControlEntry::to_decoded)
        .collect()
}

/// First control of type `T` in `controls`
///
/// # Usage Example
///
/// ```rust
/// use ldapext_protocol::controls::ManageDsaItRequestControl;
/// use ldapext_protocol::{find_typed_control, Control, ControlType};
///
/// let controls = vec![ManageDsaItRequestControl::new(true).to_control()];
/// let found = find_typed_control::<ManageDsaItRequestControl, _>(&controls).unwrap();
/// assert!(found.unwrap().criticality());
/// ```
pub fn find_typed_control<T: ControlType, E: ControlEntry>(controls: &[E]) -> LdapResult<Option<T>> {
    controls
        .iter()
        .find(|entry| entry.entry_oid() == T::OID)
        .map(|entry| entry.to_typed::<T>())
        .transpose()
}

/// Every control of type `T` in `controls`, in list order
pub fn find_all_typed_controls<T: ControlType, E: ControlEntry>(controls: &[E]) -> LdapResult<Vec<T>> {
    controls
        .iter()
        .filter(|entry| entry.entry_oid() == T::OID)
        .map(|entry| entry.to_typed::<T>())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{
        AuthorizationIdentityResponseControl, ManageDsaItRequestControl, SimplePagedResultsControl,
    };

    const UNKNOWN_OID: &str = "1.3.6.1.4.1.99999.5";

    fn controls() -> Vec<Control> {
        vec![
            ManageDsaItRequestControl::new(false).to_control(),
            SimplePagedResultsControl::new(100, b"c1".to_vec(), false)
                .unwrap()
                .to_control(),
            Control::new(UNKNOWN_OID, true, Some(vec![1, 2, 3])).unwrap(),
            SimplePagedResultsControl::new(50, Vec::new(), true)
                .unwrap()
                .to_control(),
        ]
    }

    fn malformed_identity() -> Control {
        Control::new(AuthorizationIdentityResponseControl::OID, false, Some(vec![0xC3, 0x28])).unwrap()
    }

    #[test]
    fn test_find_control() {
        let found = find_control(ManageDsaItRequestControl::OID, &controls()).unwrap();
        assert!(matches!(found, Some(DecodedControl::ManageDsaIt(_))));

        let found = find_control(UNKNOWN_OID, &controls()).unwrap().unwrap();
        assert!(found.is_generic());
        assert_eq!(found.to_control(), controls()[2]);

        assert!(find_control("1.2.3.4", &controls()).unwrap().is_none());
    }

    #[test]
    fn test_find_all_keeps_order() {
        let found = find_all_typed_controls::<SimplePagedResultsControl, _>(&controls()).unwrap();
        let sizes: Vec<i32> = found.iter().map(SimplePagedResultsControl::size).collect();
        assert_eq!(sizes, vec![100, 50]);

        let found = find_all_controls(SimplePagedResultsControl::OID, &controls()).unwrap();
        assert_eq!(found.len(), 2);

        assert!(find_all_controls("1.2.3.4", &controls()).unwrap().is_empty());
    }

    #[test]
    fn test_find_over_decoded_list() {
        let decoded: Vec<DecodedControl> = controls()
            .iter()
            .map(|c| registry::decode(c).unwrap())
            .collect();
        let found = find_typed_control::<SimplePagedResultsControl, _>(&decoded)
            .unwrap()
            .unwrap();
        assert_eq!(found.size(), 100);

        // generic entries are decoded on lookup
        let generic = vec![DecodedControl::Generic(controls()[0].clone())];
        let found = find_control(ManageDsaItRequestControl::OID, &generic).unwrap();
        assert!(matches!(found, Some(DecodedControl::ManageDsaIt(_))));
    }

    #[test]
    fn test_malformed_match_is_error_in_every_style() {
        let mut list = controls();
        list.push(malformed_identity());
        let oid = AuthorizationIdentityResponseControl::OID;

        assert!(find_control(oid, &list).unwrap_err().is_decoding_error());
        assert!(find_all_controls(oid, &list).unwrap_err().is_decoding_error());
        assert!(find_typed_control::<AuthorizationIdentityResponseControl, _>(&list)
            .unwrap_err()
            .is_decoding_error());
        assert!(find_all_typed_controls::<AuthorizationIdentityResponseControl, _>(&list)
            .unwrap_err()
            .is_decoding_error());

        let generic = vec![DecodedControl::Generic(malformed_identity())];
        assert!(find_control(oid, &generic).unwrap_err().is_decoding_error());
        assert!(find_all_typed_controls::<AuthorizationIdentityResponseControl, _>(&generic)
            .unwrap_err()
            .is_decoding_error());
    }

    #[test]
    fn test_absence_is_never_an_error() {
        let list = vec![malformed_identity()];
        assert!(find_control(ManageDsaItRequestControl::OID, &list).unwrap().is_none());
        assert!(find_typed_control::<ManageDsaItRequestControl, _>(&list).unwrap().is_none());
        assert!(find_all_typed_controls::<ManageDsaItRequestControl, _>(&list)
            .unwrap()
            .is_empty());
        let empty: Vec<Control> = Vec::new();
        assert!(find_all_controls(ManageDsaItRequestControl::OID, &empty).unwrap().is_empty());
    }
}
