//! Schema resolution.
//!
//! Maps a semantic pointer category to a [`PointerAuthInfo`] by consulting the
//! target's [`PointerAuthOptions`]. Resolution performs no I/O and keeps no
//! state: the same options and type always resolve to the same descriptor.

use crate::config::PointerAuthOptions;
use crate::descriptor::{PointerAuthDescriptor, PointerAuthInfo};
use crate::errors::{ContractKind, PtrAuthError, PtrAuthResult};
use crate::types::SemanticType;

/// Resolve the signing descriptor for a pointer to the given function type.
///
/// The function-pointer schema may not request address discrimination (a
/// function pointer constant has no storage address at signing time) nor any
/// other discrimination. Either is reported as
/// [`ContractKind::InvalidCategoryUsage`].
///
/// `function_type` is carried for logging only; every function type shares
/// the same descriptor under the current ABI.
pub fn function_pointer_auth_info(
    options: &PointerAuthOptions,
    function_type: &SemanticType,
) -> PtrAuthResult<PointerAuthInfo> {
    let schema = &options.function_pointers;
    if !schema.is_enabled() {
        tracing::trace!(%function_type, "function pointer signing disabled");
        return Ok(PointerAuthInfo::Disabled);
    }

    if schema.is_address_discriminated() {
        return Err(PtrAuthError::contract(
            ContractKind::InvalidCategoryUsage,
            "function pointers cannot use address-specific discrimination",
        ));
    }

    if schema.has_other_discrimination() {
        return Err(PtrAuthError::contract(
            ContractKind::InvalidCategoryUsage,
            format!(
                "function pointers don't support {} discrimination",
                schema.other_discrimination.as_str()
            ),
        ));
    }

    tracing::trace!(
        %function_type,
        key = schema.key.as_u8(),
        mode = schema.mode.as_str(),
        "resolved function pointer schema"
    );

    Ok(PointerAuthInfo::Enabled(PointerAuthDescriptor {
        key: schema.key,
        mode: schema.mode,
        is_isa_pointer: false,
        authenticates_null: false,
        discriminator: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AuthenticationMode, DiscriminationKind, KeyId, PointerAuthSchema};
    use assert_matches::assert_matches;

    fn int_fn() -> SemanticType {
        SemanticType::function(SemanticType::int(), vec![])
    }

    fn with_fp(schema: PointerAuthSchema) -> PointerAuthOptions {
        PointerAuthOptions {
            function_pointers: schema,
            ..PointerAuthOptions::default()
        }
    }

    #[test]
    fn disabled_schema_resolves_to_disabled() {
        let info = function_pointer_auth_info(&PointerAuthOptions::disabled(), &int_fn()).unwrap();
        assert_eq!(info, PointerAuthInfo::Disabled);
        assert!(!info.is_enabled());
    }

    #[test]
    fn disabled_schema_ignores_discrimination_flags() {
        let opts = with_fp(
            PointerAuthSchema::disabled()
                .with_address_discrimination(true)
                .with_other_discrimination(DiscriminationKind::Type),
        );
        assert_eq!(
            function_pointer_auth_info(&opts, &int_fn()).unwrap(),
            PointerAuthInfo::Disabled
        );
    }

    #[test]
    fn enabled_schema_copies_key_and_mode() {
        let opts = with_fp(PointerAuthSchema::new(
            KeyId(7),
            AuthenticationMode::SignAndAuthenticate,
        ));
        let info = function_pointer_auth_info(&opts, &int_fn()).unwrap();
        assert_eq!(
            info,
            PointerAuthInfo::Enabled(PointerAuthDescriptor {
                key: KeyId(7),
                mode: AuthenticationMode::SignAndAuthenticate,
                is_isa_pointer: false,
                authenticates_null: false,
                discriminator: None,
            })
        );
    }

    #[test]
    fn other_categories_do_not_leak_in() {
        let opts = PointerAuthOptions {
            cxx_vtable_pointers: PointerAuthSchema::new(KeyId::ASDA, AuthenticationMode::SignOnly)
                .with_address_discrimination(true),
            ..PointerAuthOptions::default()
        };
        assert_eq!(
            function_pointer_auth_info(&opts, &int_fn()).unwrap(),
            PointerAuthInfo::Disabled
        );
    }

    #[test]
    fn address_discrimination_is_a_contract_violation() {
        let opts = with_fp(
            PointerAuthSchema::new(KeyId::ASIA, AuthenticationMode::SignAndAuthenticate)
                .with_address_discrimination(true),
        );
        let err = function_pointer_auth_info(&opts, &int_fn()).unwrap_err();
        assert_matches!(
            err,
            PtrAuthError::ContractViolation {
                kind: ContractKind::InvalidCategoryUsage,
                ..
            }
        );
    }

    #[test]
    fn other_discrimination_is_a_contract_violation() {
        for kind in [
            DiscriminationKind::Type,
            DiscriminationKind::Decl,
            DiscriminationKind::Constant(42),
        ] {
            let opts = with_fp(
                PointerAuthSchema::new(KeyId::ASIA, AuthenticationMode::SignAndAuthenticate)
                    .with_other_discrimination(kind),
            );
            let err = function_pointer_auth_info(&opts, &int_fn()).unwrap_err();
            assert_eq!(err.contract_kind(), Some(ContractKind::InvalidCategoryUsage));
            assert!(err.to_string().contains(kind.as_str()));
        }
    }
}
