//! OID-keyed decoder registries
//!
//! A [`ControlRegistry`] maps OIDs to decode functions for controls,
//! extended requests and extended results. One registry is fixed for the
//! whole process: it is either installed explicitly with [`install`]
//! before first use, or built from the built-in set the first time
//! [`global`] is called. After that it is read-only, so decoding from any
//! number of threads needs no locking.
//!
//! Each registry carries its own [`CodecConfig`] and hands it to the
//! decoders it dispatches to. Typed decoders called directly, such as
//! `JoinRule::decode`, use the default limits and never initialise the
//! process-wide registry.
//!
//! # Usage Example
//!
//! ```rust
//! use ldapext_protocol::registry::{self, RegistryBuilder};
//!
//! let registry = RegistryBuilder::new()
//!     .with_builtins()
//!     .max_nesting_depth(16)
//!     .build();
//! // Installing fails once the global registry has been used
//! let _ = registry::install(registry);
//! ```
//!
//! # Unknown OIDs
//!
//! An OID with no registered decoder is not an error. The caller gets the
//! generic envelope back with its bytes untouched, so a server advertising
//! a newer extension never breaks an older client.

use crate::control::Control;
use crate::controls::account_usable::decode_account_usable;
use crate::controls::{
    AccountUsableRequestControl, AuthorizationIdentityRequestControl,
    AuthorizationIdentityResponseControl,
    GetBackendSetIdRequestControl, GetBackendSetIdResponseControl,
    GetRecentLoginHistoryRequestControl, GetRecentLoginHistoryResponseControl,
    IntermediateClientRequestControl, JoinRequestControl, ManageDsaItRequestControl,
    ProxiedAuthorizationV2RequestControl, SimplePagedResultsControl,
};
use crate::decoded::{decode_typed, ControlType, DecodedControl};
use crate::error::{LdapError, LdapResult};
use crate::extended::{ExtendedRequest, ExtendedResult};
use crate::extended_ops::{
    decode_typed_request, decode_typed_result, DecodedExtendedRequest, DecodedExtendedResult,
    ExtendedRequestType, ExtendedResultType, PasswordModifyExtendedRequest,
    PasswordModifyExtendedResult, WhoAmIExtendedRequest, WhoAmIExtendedResult,
};
use ldapext_core::oid::check_oid;
use once_cell::sync::OnceCell;
use std::collections::HashMap;

/// Default bound on recursive values (join rules, nested joins, chained
/// client requests)
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 32;

/// Decode function for a control value, given the limits of the
/// registry doing the decode
pub type ControlDecodeFn =
    fn(criticality: bool, value: Option<&[u8]>, config: &CodecConfig) -> LdapResult<DecodedControl>;

/// Decode function for an extended request
pub type ExtendedRequestDecodeFn = fn(&ExtendedRequest) -> LdapResult<DecodedExtendedRequest>;

/// Decode function for an extended result, keyed by the request OID
pub type ExtendedResultDecodeFn = fn(&ExtendedResult) -> LdapResult<DecodedExtendedResult>;

/// Codec limits applied by every recursive decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Deepest nesting accepted when decoding recursive values
    pub max_nesting_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl CodecConfig {
    /// Fail with a decoding error once `depth` exceeds the configured limit
    ///
    /// The outermost value is depth 1.
    pub fn check_depth(&self, depth: usize, what: &str) -> LdapResult<()> {
        if depth > self.max_nesting_depth {
            return Err(LdapError::Decoding(format!(
                "{} nesting depth exceeds the limit of {}",
                what, self.max_nesting_depth
            )));
        }
        Ok(())
    }
}

/// Registry entry: a human-readable name plus a decoder
#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry<F> {
    pub name: &'static str,
    pub decode: F,
}

/// Table from OID string to entry
///
/// Entries are only ever added while building; nothing is removed.
#[derive(Debug, Clone)]
pub struct OidRegistry<F> {
    entries: HashMap<String, RegistryEntry<F>>,
}

impl<F: Copy> OidRegistry<F> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add or replace the entry for `oid`
    pub(crate) fn insert(&mut self, oid: &str, name: &'static str, decode: F) {
        self.entries.insert(oid.to_string(), RegistryEntry { name, decode });
    }

    pub fn get(&self, oid: &str) -> Option<&RegistryEntry<F>> {
        self.entries.get(oid)
    }

    pub fn contains(&self, oid: &str) -> bool {
        self.entries.contains_key(oid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered OIDs, sorted
    pub fn oids(&self) -> Vec<&str> {
        let mut oids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        oids.sort_unstable();
        oids
    }
}

impl<F: Copy> Default for OidRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Binary decoder tables plus codec limits
#[derive(Debug, Clone, Default)]
pub struct ControlRegistry {
    controls: OidRegistry<ControlDecodeFn>,
    extended_requests: OidRegistry<ExtendedRequestDecodeFn>,
    extended_results: OidRegistry<ExtendedResultDecodeFn>,
    config: CodecConfig,
}

impl ControlRegistry {
    /// Registry holding every built-in decoder with default limits
    pub fn with_builtins() -> Self {
        RegistryBuilder::new().with_builtins().build()
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn controls(&self) -> &OidRegistry<ControlDecodeFn> {
        &self.controls
    }

    pub fn extended_requests(&self) -> &OidRegistry<ExtendedRequestDecodeFn> {
        &self.extended_requests
    }

    pub fn extended_results(&self) -> &OidRegistry<ExtendedResultDecodeFn> {
        &self.extended_results
    }

    /// Name registered for a control OID
    pub fn control_name(&self, oid: &str) -> Option<&'static str> {
        self.controls.get(oid).map(|entry| entry.name)
    }

    /// Decode a control from its parts
    ///
    /// A registered OID is decoded by its decoder, whose errors are
    /// returned as-is. An unregistered OID yields
    /// [`DecodedControl::Generic`] holding exactly the given parts.
    pub fn decode_control(
        &self,
        oid: &str,
        criticality: bool,
        value: Option<&[u8]>,
    ) -> LdapResult<DecodedControl> {
        match self.controls.get(oid) {
            Some(entry) => {
                log::trace!("Decoding control {} as {}", oid, entry.name);
                (entry.decode)(criticality, value, &self.config)
            }
            None => {
                log::debug!("No decoder registered for control {}, keeping generic form", oid);
                Control::new(oid, criticality, value.map(<[u8]>::to_vec))
                    .map(DecodedControl::Generic)
                    .map_err(|e| LdapError::Decoding(e.to_string()))
            }
        }
    }

    /// Decode an extended request through its registered decoder
    pub fn decode_extended_request(
        &self,
        request: &ExtendedRequest,
    ) -> LdapResult<DecodedExtendedRequest> {
        let entry = request.oid().and_then(|oid| self.extended_requests.get(oid));
        match entry {
            Some(entry) => {
                log::trace!("Decoding extended request as {}", entry.name);
                (entry.decode)(request)
            }
            None => {
                log::debug!(
                    "No decoder registered for extended request {:?}, keeping generic form",
                    request.oid()
                );
                Ok(DecodedExtendedRequest::Generic(request.clone()))
            }
        }
    }

    /// Decode an extended result through the decoder registered for the
    /// OID of the request it answers
    pub fn decode_extended_result(
        &self,
        request_oid: &str,
        result: &ExtendedResult,
    ) -> LdapResult<DecodedExtendedResult> {
        match self.extended_results.get(request_oid) {
            Some(entry) => {
                log::trace!("Decoding extended result as {}", entry.name);
                (entry.decode)(result)
            }
            None => {
                log::debug!(
                    "No decoder registered for extended result of {}, keeping generic form",
                    request_oid
                );
                Ok(DecodedExtendedResult::Generic(result.clone()))
            }
        }
    }
}

/// Builder for [`ControlRegistry`]
///
/// Starts empty; call [`with_builtins`](Self::with_builtins) for the
/// built-in set, then add application decoders.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    registry: ControlRegistry,
    error: Option<String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every built-in control and extended operation decoder
    pub fn with_builtins(self) -> Self {
        self.control::<SimplePagedResultsControl>()
            .control::<ManageDsaItRequestControl>()
            .control::<AuthorizationIdentityRequestControl>()
            .control::<AuthorizationIdentityResponseControl>()
            .control::<ProxiedAuthorizationV2RequestControl>()
            .register_control(
                AccountUsableRequestControl::OID,
                "Account Usable",
                decode_account_usable,
            )
            .control::<GetBackendSetIdRequestControl>()
            .control::<GetBackendSetIdResponseControl>()
            .control::<GetRecentLoginHistoryRequestControl>()
            .control::<GetRecentLoginHistoryResponseControl>()
            .control::<IntermediateClientRequestControl>()
            .control::<JoinRequestControl>()
            .extended_request::<WhoAmIExtendedRequest>()
            .extended_request::<PasswordModifyExtendedRequest>()
            .extended_result::<WhoAmIExtendedResult>()
            .extended_result::<PasswordModifyExtendedResult>()
    }

    /// Register a built-in style typed control
    pub fn control<T: ControlType>(mut self) -> Self {
        self.registry
            .controls
            .insert(T::OID, T::NAME, decode_typed::<T> as ControlDecodeFn);
        self
    }

    /// Register an application decoder for `oid`
    ///
    /// An invalid OID is reported by [`try_build`](Self::try_build).
    pub fn register_control(mut self, oid: &str, name: &'static str, decode: ControlDecodeFn) -> Self {
        match check_oid(oid) {
            Ok(()) => self.registry.controls.insert(oid, name, decode),
            Err(e) => self.record_error(e),
        }
        self
    }

    pub fn extended_request<T: ExtendedRequestType>(mut self) -> Self {
        self.registry.extended_requests.insert(
            T::OID,
            T::NAME,
            decode_typed_request::<T> as ExtendedRequestDecodeFn,
        );
        self
    }

    pub fn register_extended_request(
        mut self,
        oid: &str,
        name: &'static str,
        decode: ExtendedRequestDecodeFn,
    ) -> Self {
        match check_oid(oid) {
            Ok(()) => self.registry.extended_requests.insert(oid, name, decode),
            Err(e) => self.record_error(e),
        }
        self
    }

    pub fn extended_result<T: ExtendedResultType>(mut self) -> Self {
        self.registry.extended_results.insert(
            T::REQUEST_OID,
            T::NAME,
            decode_typed_result::<T> as ExtendedResultDecodeFn,
        );
        self
    }

    pub fn register_extended_result(
        mut self,
        request_oid: &str,
        name: &'static str,
        decode: ExtendedResultDecodeFn,
    ) -> Self {
        match check_oid(request_oid) {
            Ok(()) => self.registry.extended_results.insert(request_oid, name, decode),
            Err(e) => self.record_error(e),
        }
        self
    }

    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.registry.config.max_nesting_depth = depth;
        self
    }

    pub fn config(mut self, config: CodecConfig) -> Self {
        self.registry.config = config;
        self
    }

    fn record_error(&mut self, error: LdapError) {
        if self.error.is_none() {
            self.error = Some(error.to_string());
        }
    }

    /// Build, reporting the first invalid registration as a usage error
    pub fn try_build(self) -> LdapResult<ControlRegistry> {
        if let Some(message) = self.error {
            return Err(LdapError::Usage(message));
        }
        if self.registry.config.max_nesting_depth == 0 {
            return Err(LdapError::Usage(
                "max_nesting_depth must be at least 1".to_string(),
            ));
        }
        Ok(self.registry)
    }

    /// Build, dropping any invalid registrations
    pub fn build(self) -> ControlRegistry {
        if let Some(ref message) = self.error {
            log::warn!("Ignoring invalid registry entry: {}", message);
        }
        let mut registry = self.registry;
        if registry.config.max_nesting_depth == 0 {
            registry.config.max_nesting_depth = DEFAULT_MAX_NESTING_DEPTH;
        }
        registry
    }
}

static GLOBAL: OnceCell<ControlRegistry> = OnceCell::new();

/// Fix the process-wide registry
///
/// # Error Handling
/// Returns a usage error if a registry was already installed or the
/// built-in one was already initialised by a decode call.
pub fn install(registry: ControlRegistry) -> LdapResult<()> {
    GLOBAL.set(registry).map_err(|_| {
        log::warn!("Control registry already initialised, install ignored");
        LdapError::Usage("Control registry is already initialised".to_string())
    })
}

/// The process-wide registry, built from the built-in set on first use
pub fn global() -> &'static ControlRegistry {
    GLOBAL.get_or_init(ControlRegistry::with_builtins)
}

/// Decode a control through the process-wide registry
pub fn decode_control(
    oid: &str,
    criticality: bool,
    value: Option<&[u8]>,
) -> LdapResult<DecodedControl> {
    global().decode_control(oid, criticality, value)
}

/// Decode a generic control through the process-wide registry
pub fn decode(control: &Control) -> LdapResult<DecodedControl> {
    global().decode_control(control.oid(), control.criticality(), control.value())
}

pub fn decode_extended_request(request: &ExtendedRequest) -> LdapResult<DecodedExtendedRequest> {
    global().decode_extended_request(request)
}

pub fn decode_extended_result(
    request_oid: &str,
    result: &ExtendedResult,
) -> LdapResult<DecodedExtendedResult> {
    global().decode_extended_result(request_oid, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::backend_set_id::GetBackendSetIdResponseControl;
    use crate::controls::{IntermediateClientRequestValue, JoinBaseDn, JoinRequestValue, JoinRule};
    use crate::decoded::CustomControl;
    use std::any::Any;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Opaque {
        criticality: bool,
        value: Vec<u8>,
    }

    impl CustomControl for Opaque {
        fn oid(&self) -> &str {
            "1.3.6.1.4.1.99999.42"
        }
        fn criticality(&self) -> bool {
            self.criticality
        }
        fn encode_value(&self) -> Option<Vec<u8>> {
            Some(self.value.clone())
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn decode_opaque(
        criticality: bool,
        value: Option<&[u8]>,
        _config: &CodecConfig,
    ) -> LdapResult<DecodedControl> {
        let value = value.ok_or_else(|| LdapError::Decoding("missing value".to_string()))?;
        Ok(DecodedControl::Custom(Arc::new(Opaque {
            criticality,
            value: value.to_vec(),
        })))
    }

    #[test]
    fn test_unknown_oid_falls_back_to_generic() {
        let registry = ControlRegistry::with_builtins();
        let value = [0x30, 0x03, 0x02, 0x01, 0x05];
        let decoded = registry
            .decode_control("1.3.6.1.4.1.99999.1", true, Some(&value))
            .unwrap();
        let DecodedControl::Generic(control) = decoded else {
            panic!("expected generic control");
        };
        assert_eq!(control.oid(), "1.3.6.1.4.1.99999.1");
        assert!(control.criticality());
        assert_eq!(control.value(), Some(&value[..]));
    }

    #[test]
    fn test_registered_oid_errors_are_not_swallowed() {
        let registry = ControlRegistry::with_builtins();
        let result = registry.decode_control(
            GetBackendSetIdResponseControl::OID,
            false,
            Some(&[0x04, 0x00]),
        );
        assert!(result.unwrap_err().is_decoding_error());
    }

    #[test]
    fn test_application_registration() {
        let registry = RegistryBuilder::new()
            .with_builtins()
            .register_control("1.3.6.1.4.1.99999.42", "opaque", decode_opaque)
            .try_build()
            .unwrap();
        assert_eq!(registry.control_name("1.3.6.1.4.1.99999.42"), Some("opaque"));

        let decoded = registry
            .decode_control("1.3.6.1.4.1.99999.42", true, Some(b"xyz"))
            .unwrap();
        let DecodedControl::Custom(custom) = decoded else {
            panic!("expected custom control");
        };
        let opaque = custom.as_any().downcast_ref::<Opaque>().unwrap();
        assert_eq!(opaque.value, b"xyz");
        assert!(opaque.criticality);
    }

    #[test]
    fn test_invalid_registration_is_usage_error() {
        let result = RegistryBuilder::new()
            .register_control("not an oid", "bad", decode_opaque)
            .try_build();
        assert!(result.unwrap_err().is_usage_error());

        let result = RegistryBuilder::new().max_nesting_depth(0).try_build();
        assert!(result.unwrap_err().is_usage_error());
    }

    #[test]
    fn test_empty_registry_keeps_everything_generic() {
        let registry = RegistryBuilder::new().build();
        assert!(registry.controls().is_empty());
        let decoded = registry
            .decode_control(ManageDsaItRequestControl::OID, false, Some(b"junk"))
            .unwrap();
        assert!(decoded.is_generic());
    }

    #[test]
    fn test_builtin_oids_registered() {
        let registry = ControlRegistry::with_builtins();
        assert_eq!(registry.controls().len(), 12);
        assert!(registry.controls().contains(JoinRequestControl::OID));
        assert!(registry.extended_requests().contains(WhoAmIExtendedRequest::OID));
        assert!(registry.extended_results().contains(PasswordModifyExtendedRequest::OID));
    }

    #[test]
    fn test_install_after_first_use_is_rejected() {
        let _ = global();
        let err = install(ControlRegistry::with_builtins()).unwrap_err();
        assert!(err.is_usage_error());
    }

    #[test]
    fn test_depth_check() {
        let registry = RegistryBuilder::new().max_nesting_depth(2).build();
        assert!(registry.config().check_depth(2, "test").is_ok());
        assert!(registry.config().check_depth(3, "test").unwrap_err().is_decoding_error());
    }

    #[test]
    fn test_local_registry_applies_its_own_depth_limit() {
        let rule = JoinRule::and(vec![
            JoinRule::and(vec![JoinRule::and(vec![JoinRule::dn("manager")]).unwrap()]).unwrap(),
        ])
        .unwrap();
        let value = JoinRequestControl::new(
            JoinRequestValue::new(rule, JoinBaseDn::UseSearchBaseDn),
            false,
        )
        .encode_value();

        let shallow = RegistryBuilder::new().with_builtins().max_nesting_depth(2).build();
        let err = shallow
            .decode_control(JoinRequestControl::OID, false, value.as_deref())
            .unwrap_err();
        assert!(err.is_decoding_error());

        let roomy = RegistryBuilder::new().with_builtins().max_nesting_depth(4).build();
        let decoded = roomy
            .decode_control(JoinRequestControl::OID, false, value.as_deref())
            .unwrap();
        assert!(matches!(decoded, DecodedControl::JoinRequest(_)));

        let chain = IntermediateClientRequestValue::new().with_downstream_request(
            IntermediateClientRequestValue::new()
                .with_downstream_request(IntermediateClientRequestValue::new()),
        );
        let value = IntermediateClientRequestControl::new(chain, false).encode_value();
        let err = shallow
            .decode_control(IntermediateClientRequestControl::OID, false, value.as_deref())
            .unwrap_err();
        assert!(err.is_decoding_error());
        assert!(roomy
            .decode_control(IntermediateClientRequestControl::OID, false, value.as_deref())
            .is_ok());
    }
}
