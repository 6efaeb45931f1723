//! Configuration structures for ptrauth-core.
//!
//! This module defines the explicit configuration object the code generator
//! threads into every resolution call: one signing schema per pointer
//! category, tagged with the target it was derived for.
//!
//! The crate itself does not read environment variables or compiler flags.
//! The caller builds a [`CodegenConfig`] once per target before code
//! generation starts and shares it read-only afterwards.

use crate::errors::{PtrAuthError, PtrAuthResult};
use crate::schema::{AuthenticationMode, KeyId, PointerAuthSchema};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Global configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct CodegenConfig {
    /// Target triple the schemas were derived for. Informational only.
    pub target_triple: String,
    pub pointer_auth: PointerAuthOptions,
}

impl CodegenConfig {
    pub fn new(target_triple: impl Into<String>, pointer_auth: PointerAuthOptions) -> Self {
        Self {
            target_triple: target_triple.into(),
            pointer_auth,
        }
    }

    /// Decode a configuration from JSON and validate it.
    #[cfg(feature = "serde")]
    pub fn from_json_str(s: &str) -> PtrAuthResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| {
            PtrAuthError::serialization(format!("failed to decode codegen config: {e}"))
        })?;
        validate_config(&cfg)?;
        Ok(cfg)
    }
}

/// Signing schemas, one per authenticated pointer category.
///
/// Only `function_pointers` is resolved by this crate. The remaining
/// categories are carried for the surrounding code generator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct PointerAuthOptions {
    pub function_pointers: PointerAuthSchema,
    pub cxx_vtable_pointers: PointerAuthSchema,
    pub cxx_virtual_function_pointers: PointerAuthSchema,
    pub objc_method_list_function_pointers: PointerAuthSchema,
    pub block_invocation_function_pointers: PointerAuthSchema,
}

impl PointerAuthOptions {
    /// Every category disabled.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// The arm64e defaults: code pointers signed with the IA key.
    pub fn arm64e() -> Self {
        let code = PointerAuthSchema::new(KeyId::ASIA, AuthenticationMode::SignAndAuthenticate);
        Self {
            function_pointers: code,
            cxx_vtable_pointers: PointerAuthSchema::new(
                KeyId::ASDA,
                AuthenticationMode::SignAndAuthenticate,
            )
            .with_address_discrimination(true),
            cxx_virtual_function_pointers: code.with_address_discrimination(true),
            objc_method_list_function_pointers: code.with_address_discrimination(true),
            block_invocation_function_pointers: code.with_address_discrimination(true),
        }
    }

    /// Categories in a fixed order, keyed by their stable name.
    pub fn categories(&self) -> [(&'static str, &PointerAuthSchema); 5] {
        [
            ("function-pointers", &self.function_pointers),
            ("cxx-vtable-pointers", &self.cxx_vtable_pointers),
            ("cxx-virtual-function-pointers", &self.cxx_virtual_function_pointers),
            (
                "objc-method-list-function-pointers",
                &self.objc_method_list_function_pointers,
            ),
            (
                "block-invocation-function-pointers",
                &self.block_invocation_function_pointers,
            ),
        ]
    }
}

/// Validate a full configuration object.
///
/// This rejects configurations the resolver would otherwise trip over at
/// code generation time, so a broken target description fails at load.
pub fn validate_config(cfg: &CodegenConfig) -> PtrAuthResult<()> {
    for (name, schema) in cfg.pointer_auth.categories() {
        if schema.enabled && schema.key > KeyId::MAX {
            return Err(PtrAuthError::invalid_argument(format!(
                "{name}: key {} is out of range",
                schema.key
            )));
        }
    }

    let fp = &cfg.pointer_auth.function_pointers;
    if fp.enabled && fp.is_address_discriminated() {
        return Err(PtrAuthError::invalid_argument(
            "function-pointers: address discrimination is not supported",
        ));
    }

    if fp.enabled && fp.has_other_discrimination() {
        return Err(PtrAuthError::invalid_argument(format!(
            "function-pointers: {} discrimination is not supported",
            fp.other_discrimination.as_str()
        )));
    }

    Ok(())
}
