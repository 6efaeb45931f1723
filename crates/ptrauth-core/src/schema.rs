//! Signing schemas.
//!
//! A [`PointerAuthSchema`] is the per-target policy for one pointer category:
//! whether pointers of that category are signed, with which key, and which
//! discriminators are folded into the signature.
//!
//! Schemas are plain data. They are built once from target configuration and
//! never mutated during code generation.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Hardware key identifier.
///
/// The numbering is ABI-defined. For AArch64 the four signing keys are
/// exposed as associated constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct KeyId(pub u8);

impl KeyId {
    /// Instruction key A.
    pub const ASIA: KeyId = KeyId(0);
    /// Instruction key B.
    pub const ASIB: KeyId = KeyId(1);
    /// Data key A.
    pub const ASDA: KeyId = KeyId(2);
    /// Data key B.
    pub const ASDB: KeyId = KeyId(3);

    /// Highest key id defined by the AArch64 ABI.
    pub const MAX: KeyId = KeyId::ASDB;

    pub fn as_u8(&self) -> u8 {
        self.0
    }

    pub fn name(&self) -> Option<&'static str> {
        match self.0 {
            0 => Some("ia"),
            1 => Some("ib"),
            2 => Some("da"),
            3 => Some("db"),
            _ => None,
        }
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How pointers produced under a schema are treated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "kebab-case"))]
pub enum AuthenticationMode {
    /// Pointers carry a live signature and are authenticated before use.
    SignAndAuthenticate,
    /// Pointers are signed but never authenticated.
    SignOnly,
    /// Signatures are stripped rather than checked.
    StripOnly,
}

impl AuthenticationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignAndAuthenticate => "sign-and-authenticate",
            Self::SignOnly => "sign-only",
            Self::StripOnly => "strip-only",
        }
    }
}

/// Additional (non-address) discriminator source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "kind", content = "value", rename_all = "kebab-case")
)]
pub enum DiscriminationKind {
    None,
    /// Derived from the pointee type.
    Type,
    /// Derived from the declaration.
    Decl,
    /// A fixed 16-bit constant.
    Constant(u16),
}

impl DiscriminationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Type => "type",
            Self::Decl => "decl",
            Self::Constant(_) => "constant",
        }
    }
}

/// Signing policy for one pointer category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct PointerAuthSchema {
    pub enabled: bool,
    pub key: KeyId,
    pub mode: AuthenticationMode,
    pub address_discrimination: bool,
    pub other_discrimination: DiscriminationKind,
}

impl Default for PointerAuthSchema {
    fn default() -> Self {
        Self::disabled()
    }
}

impl PointerAuthSchema {
    /// A schema under which nothing is signed.
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            key: KeyId::ASIA,
            mode: AuthenticationMode::SignAndAuthenticate,
            address_discrimination: false,
            other_discrimination: DiscriminationKind::None,
        }
    }

    /// An enabled schema with no address or other discrimination.
    pub const fn new(key: KeyId, mode: AuthenticationMode) -> Self {
        Self {
            enabled: true,
            key,
            mode,
            address_discrimination: false,
            other_discrimination: DiscriminationKind::None,
        }
    }

    pub const fn with_address_discrimination(mut self, on: bool) -> Self {
        self.address_discrimination = on;
        self
    }

    pub const fn with_other_discrimination(mut self, kind: DiscriminationKind) -> Self {
        self.other_discrimination = kind;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_address_discriminated(&self) -> bool {
        self.address_discrimination
    }

    pub fn has_other_discrimination(&self) -> bool {
        self.other_discrimination != DiscriminationKind::None
    }
}
