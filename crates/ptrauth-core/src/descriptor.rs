//! Resolved pointer-authentication descriptors.

use crate::ir::Constant;
use crate::schema::{AuthenticationMode, KeyId};

/// How one pointer at one use site must be signed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PointerAuthDescriptor {
    pub key: KeyId,
    pub mode: AuthenticationMode,
    pub is_isa_pointer: bool,
    pub authenticates_null: bool,
    /// Extra integer salt folded into the signature, if the category has one.
    pub discriminator: Option<Constant>,
}

/// The result of schema resolution.
///
/// `Disabled` means no authentication applies and the pointer is used as-is.
/// Callers match on the variant rather than testing for an empty descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PointerAuthInfo {
    Disabled,
    Enabled(PointerAuthDescriptor),
}

impl PointerAuthInfo {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    pub fn descriptor(&self) -> Option<&PointerAuthDescriptor> {
        match self {
            Self::Enabled(d) => Some(d),
            Self::Disabled => None,
        }
    }
}
