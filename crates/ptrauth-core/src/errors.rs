//! Error types for ptrauth-core.
//!
//! Two families of failure exist:
//! - configuration errors (`InvalidArgument`, `Serialization`) raised while a
//!   caller builds or loads a [`crate::config::CodegenConfig`]
//! - contract violations raised while resolving or signing. These mean an
//!   upstream collaborator handed us something it must never hand us; the
//!   caller is expected to abort code generation, not retry.
//!
//! A disabled signing schema is never an error.

use std::fmt;

/// Result alias used across the crate.
pub type PtrAuthResult<T> = Result<T, PtrAuthError>;

/// The kind of internal contract that was broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    /// A signing schema requested discrimination its category cannot carry.
    InvalidCategoryUsage,
    /// An entry point was called with a type outside its domain.
    InvalidInputType,
    /// A constant operand has the wrong IR type (e.g. a non-pointer storage address).
    InvalidOperandType,
}

impl ContractKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCategoryUsage => "invalid-category-usage",
            Self::InvalidInputType => "invalid-input-type",
            Self::InvalidOperandType => "invalid-operand-type",
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for ptrauth-core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PtrAuthError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("contract violation ({kind}): {message}")]
    ContractViolation { kind: ContractKind, message: String },
}

impl PtrAuthError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Build a contract violation and log it.
    ///
    /// Every contract violation is a defect somewhere upstream, so it is
    /// always logged at `error` level at the point it is raised.
    pub fn contract(kind: ContractKind, msg: impl Into<String>) -> Self {
        let message = msg.into();
        tracing::error!(kind = kind.as_str(), %message, "pointer-auth contract violation");
        Self::ContractViolation { kind, message }
    }

    /// True for the unrecoverable-defect variant.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ContractViolation { .. })
    }

    /// The broken contract, if this is a contract violation.
    pub fn contract_kind(&self) -> Option<ContractKind> {
        match self {
            Self::ContractViolation { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
