//! ptrauth-core
//!
//! Pointer-authentication support for a compiler's constant emission:
//! - Signing schemas: per-target policy for each pointer category
//! - Schema resolution for function pointers
//! - Signed pointer constants with canonical, link-stable fields
//! - Type-directed entry points that sign (or pass through) function pointers
//!
//! Everything here is a pure function over an immutable [`config::CodegenConfig`]
//! and its arguments, and is safe to call from many threads at once.

pub mod codegen;
pub mod config;
pub mod descriptor;
pub mod errors;
#[cfg(feature = "fingerprint")]
pub mod fingerprint;
pub mod ir;
pub mod resolver;
pub mod schema;
pub mod signed;
pub mod types;

pub use crate::errors::{ContractKind, PtrAuthError, PtrAuthResult};

/// Domain separation labels.
/// These must remain stable across versions.
pub mod domain {
    pub const SIGNED_CONSTANT: &str = "ptrauth.v1.signed-constant";
}

/// Convenience re-exports.
pub mod prelude {
    pub use crate::codegen::{
        constant_signed_pointer, CodeGenModule, DirectSymbolSource, FunctionPointerSource,
    };
    pub use crate::config::{validate_config, CodegenConfig, PointerAuthOptions};
    pub use crate::descriptor::{PointerAuthDescriptor, PointerAuthInfo};
    pub use crate::ir::{CastKind, Constant, IrType};
    pub use crate::resolver::function_pointer_auth_info;
    pub use crate::schema::{AuthenticationMode, DiscriminationKind, KeyId, PointerAuthSchema};
    pub use crate::signed::{sign_constant_pointer, SignedPointerConstant};
    pub use crate::types::{FunctionDecl, FunctionType, SemanticType};
    pub use crate::{ContractKind, PtrAuthError, PtrAuthResult};
}
