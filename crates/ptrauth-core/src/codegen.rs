//! Type-directed entry points for function-pointer constants.
//!
//! [`CodeGenModule`] is the per-target view the code generator holds while
//! emitting constants. It borrows the immutable [`CodegenConfig`] and the
//! symbol collaborator that knows how to name a function, and answers one
//! question: what constant stands for this function pointer once the ABI's
//! signing rules are applied?
//!
//! The split between "what value denotes this function" (the
//! [`FunctionPointerSource`]) and "how that value is signed"
//! ([`CodeGenModule::function_pointer_for_type`]) lets any raw pointer of a
//! function type be signed the same way, however it was obtained.

use crate::config::CodegenConfig;
use crate::descriptor::PointerAuthInfo;
use crate::errors::{ContractKind, PtrAuthError, PtrAuthResult};
use crate::ir::{Constant, IrType};
use crate::resolver::function_pointer_auth_info;
use crate::schema::KeyId;
use crate::signed::sign_constant_pointer;
use crate::types::{FunctionDecl, SemanticType};

/// Produces the raw, unsigned constant for a function declaration.
///
/// Implementations may emit a direct symbol reference, an alias or a thunk.
/// None of that concerns signing.
pub trait FunctionPointerSource: Send + Sync {
    fn raw_function_pointer(
        &self,
        decl: &FunctionDecl,
        representation: Option<IrType>,
    ) -> PtrAuthResult<Constant>;
}

/// Names each function by its own symbol.
///
/// A representation type in another address space is reached through an
/// `addrspacecast`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectSymbolSource;

impl FunctionPointerSource for DirectSymbolSource {
    fn raw_function_pointer(
        &self,
        decl: &FunctionDecl,
        representation: Option<IrType>,
    ) -> PtrAuthResult<Constant> {
        let sym = Constant::global(decl.name.as_str());
        match representation {
            None | Some(IrType::Ptr { addr_space: 0 }) => Ok(sym),
            Some(IrType::Ptr { addr_space }) => Ok(Constant::addrspacecast(sym, addr_space)),
            Some(other) => Err(PtrAuthError::contract(
                ContractKind::InvalidOperandType,
                format!("function {} cannot be represented as {other}", decl.name),
            )),
        }
    }
}

/// Per-target code generation context for pointer-authenticated constants.
#[derive(Clone, Copy)]
pub struct CodeGenModule<'a> {
    config: &'a CodegenConfig,
    symbols: &'a dyn FunctionPointerSource,
}

impl<'a> CodeGenModule<'a> {
    /// The configuration is taken as-is; run
    /// [`crate::config::validate_config`] when loading it to reject broken
    /// schemas before code generation starts.
    pub fn new(config: &'a CodegenConfig, symbols: &'a dyn FunctionPointerSource) -> Self {
        tracing::debug!(
            target_triple = %config.target_triple,
            function_pointers = config.pointer_auth.function_pointers.enabled,
            "pointer-auth codegen module created"
        );
        Self { config, symbols }
    }

    pub fn config(&self) -> &'a CodegenConfig {
        self.config
    }

    /// Resolve the signing descriptor for a pointer to `function_type`.
    pub fn function_pointer_auth_info(
        &self,
        function_type: &SemanticType,
    ) -> PtrAuthResult<PointerAuthInfo> {
        function_pointer_auth_info(&self.config.pointer_auth, function_type)
    }

    /// Build a signed pointer constant. See [`sign_constant_pointer`].
    pub fn constant_signed_pointer(
        &self,
        pointer: &Constant,
        key: KeyId,
        storage_address: Option<&Constant>,
        other_discriminator: Option<&Constant>,
    ) -> PtrAuthResult<Constant> {
        sign_constant_pointer(pointer, key, storage_address, other_discriminator)
    }

    /// Sign `pointer` with the ABI rules for `function_type`, if any apply.
    ///
    /// `function_type` must be a function, function reference or function
    /// pointer type. When function pointers are not signed the pointer is
    /// returned unchanged.
    pub fn function_pointer_for_type(
        &self,
        pointer: Constant,
        function_type: &SemanticType,
    ) -> PtrAuthResult<Constant> {
        self.function_pointer_for_type_with_decl(pointer, function_type, None)
    }

    /// Like [`Self::function_pointer_for_type`], remembering the declaration
    /// the pointer was produced for.
    pub fn function_pointer_for_type_with_decl(
        &self,
        pointer: Constant,
        function_type: &SemanticType,
        decl: Option<&FunctionDecl>,
    ) -> PtrAuthResult<Constant> {
        if !function_type.is_function_like() {
            return Err(PtrAuthError::contract(
                ContractKind::InvalidInputType,
                format!(
                    "expected a function, function reference or function pointer type, \
                     got {function_type}"
                ),
            ));
        }

        match self.function_pointer_auth_info(function_type)? {
            PointerAuthInfo::Disabled => Ok(pointer),
            PointerAuthInfo::Enabled(auth) => {
                tracing::trace!(
                    decl = decl.map(|d| d.name.as_str()),
                    %function_type,
                    "signing function pointer"
                );
                self.constant_signed_pointer(&pointer, auth.key, None, auth.discriminator.as_ref())
            }
        }
    }

    /// The (possibly signed) constant for `decl` at `representation`.
    pub fn function_pointer_for_declaration(
        &self,
        decl: &FunctionDecl,
        representation: Option<IrType>,
    ) -> PtrAuthResult<Constant> {
        let raw = self.symbols.raw_function_pointer(decl, representation)?;
        self.function_pointer_for_type_with_decl(raw, &decl.semantic_type, Some(decl))
    }
}

/// Free-function form of [`CodeGenModule::constant_signed_pointer`].
pub fn constant_signed_pointer(
    module: &CodeGenModule<'_>,
    pointer: &Constant,
    key: KeyId,
    storage_address: Option<&Constant>,
    other_discriminator: Option<&Constant>,
) -> PtrAuthResult<Constant> {
    module.constant_signed_pointer(pointer, key, storage_address, other_discriminator)
}
