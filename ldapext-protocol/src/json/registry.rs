//! OID-keyed registry of `value-json` decoders
//!
//! Mirrors the binary [`ControlRegistry`](crate::registry::ControlRegistry):
//! built once, installed or initialised from the built-in set on first
//! use, read-only afterwards.

use crate::controls::account_usable::decode_account_usable_json;
use crate::controls::{
    AccountUsableRequestControl, AuthorizationIdentityRequestControl,
    AuthorizationIdentityResponseControl, GetBackendSetIdRequestControl,
    GetBackendSetIdResponseControl, GetRecentLoginHistoryRequestControl,
    GetRecentLoginHistoryResponseControl, IntermediateClientRequestControl, JoinRequestControl,
    ManageDsaItRequestControl, ProxiedAuthorizationV2RequestControl, SimplePagedResultsControl,
};
use crate::decoded::{decode_typed_json, ControlType, DecodedControl};
use crate::error::{LdapError, LdapResult};
use crate::registry::{CodecConfig, OidRegistry, DEFAULT_MAX_NESTING_DEPTH};
use ldapext_core::oid::check_oid;
use once_cell::sync::OnceCell;
use serde_json::{Map, Value};

/// Decode function for a JSON control: criticality, `value-json`, strict,
/// and the limits of the registry doing the decode
pub type JsonDecodeFn = fn(
    criticality: bool,
    value: Option<&Map<String, Value>>,
    strict: bool,
    config: &CodecConfig,
) -> LdapResult<DecodedControl>;

#[derive(Debug, Clone, Default)]
pub struct JsonRegistry {
    controls: OidRegistry<JsonDecodeFn>,
    config: CodecConfig,
}

impl JsonRegistry {
    pub fn with_builtins() -> Self {
        JsonRegistryBuilder::new().with_builtins().build()
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn controls(&self) -> &OidRegistry<JsonDecodeFn> {
        &self.controls
    }

    pub fn contains(&self, oid: &str) -> bool {
        self.controls.contains(oid)
    }

    /// Decode a control through the JSON decoder registered for `oid`
    ///
    /// # Error Handling
    /// Returns a decoding error if no decoder is registered: without one
    /// the binary value cannot be recovered from `value-json`.
    pub fn decode_control(
        &self,
        oid: &str,
        criticality: bool,
        value: Option<&Map<String, Value>>,
        strict: bool,
    ) -> LdapResult<DecodedControl> {
        let entry = self.controls.get(oid).ok_or_else(|| {
            LdapError::Decoding(format!("No JSON decoder registered for control {}", oid))
        })?;
        log::trace!("Decoding JSON control {} as {}", oid, entry.name);
        (entry.decode)(criticality, value, strict, &self.config)
    }
}

/// Builder for [`JsonRegistry`]
#[derive(Debug, Clone, Default)]
pub struct JsonRegistryBuilder {
    registry: JsonRegistry,
    error: Option<String>,
}

impl JsonRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins(self) -> Self {
        self.control::<SimplePagedResultsControl>()
            .control::<ManageDsaItRequestControl>()
            .control::<AuthorizationIdentityRequestControl>()
            .control::<AuthorizationIdentityResponseControl>()
            .control::<ProxiedAuthorizationV2RequestControl>()
            .register_control(
                AccountUsableRequestControl::OID,
                "Account Usable",
                decode_account_usable_json,
            )
            .control::<GetBackendSetIdRequestControl>()
            .control::<GetBackendSetIdResponseControl>()
            .control::<GetRecentLoginHistoryRequestControl>()
            .control::<GetRecentLoginHistoryResponseControl>()
            .control::<IntermediateClientRequestControl>()
            .control::<JoinRequestControl>()
    }

    pub fn control<T: ControlType>(mut self) -> Self {
        self.registry
            .controls
            .insert(T::OID, T::NAME, decode_typed_json::<T> as JsonDecodeFn);
        self
    }

    pub fn register_control(mut self, oid: &str, name: &'static str, decode: JsonDecodeFn) -> Self {
        match check_oid(oid) {
            Ok(()) => self.registry.controls.insert(oid, name, decode),
            Err(e) => {
                if self.error.is_none() {
                    self.error = Some(e.to_string());
                }
            }
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

    pub fn try_build(self) -> LdapResult<JsonRegistry> {
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

    pub fn build(self) -> JsonRegistry {
        if let Some(ref message) = self.error {
            log::warn!("Ignoring invalid JSON registry entry: {}", message);
        }
        let mut registry = self.registry;
        if registry.config.max_nesting_depth == 0 {
            registry.config.max_nesting_depth = DEFAULT_MAX_NESTING_DEPTH;
        }
        registry
    }
}

static GLOBAL: OnceCell<JsonRegistry> = OnceCell::new();

/// Fix the process-wide JSON registry
///
/// # Error Handling
/// Returns a usage error once the registry is already initialised.
pub fn install(registry: JsonRegistry) -> LdapResult<()> {
    GLOBAL.set(registry).map_err(|_| {
        log::warn!("JSON control registry already initialised, install ignored");
        LdapError::Usage("JSON control registry is already initialised".to_string())
    })
}

pub fn global() -> &'static JsonRegistry {
    GLOBAL.get_or_init(JsonRegistry::with_builtins)
}
