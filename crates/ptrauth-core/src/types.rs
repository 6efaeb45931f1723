//! Source-level (semantic) types.
//!
//! This is the slice of the front-end type system the resolver needs: enough
//! to classify a type as a function, a reference to a function, or a pointer
//! to a function. Everything else is opaque.

use std::fmt;
use std::sync::Arc;

/// A function signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub result: SemanticType,
    pub params: Vec<SemanticType>,
    pub variadic: bool,
}

impl FunctionType {
    pub fn new(result: SemanticType, params: Vec<SemanticType>) -> Self {
        Self {
            result,
            params,
            variadic: false,
        }
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }
}

/// A semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SemanticType {
    Void,
    /// A builtin integer type of the given width.
    Int(u32),
    /// A named record (struct/class/union).
    Record(String),
    Function(Arc<FunctionType>),
    Pointer(Arc<SemanticType>),
    LValueReference(Arc<SemanticType>),
    RValueReference(Arc<SemanticType>),
}

impl SemanticType {
    pub fn int() -> Self {
        Self::Int(32)
    }

    pub fn function(result: SemanticType, params: Vec<SemanticType>) -> Self {
        Self::Function(Arc::new(FunctionType::new(result, params)))
    }

    pub fn pointer_to(self) -> Self {
        Self::Pointer(Arc::new(self))
    }

    pub fn lvalue_reference_to(self) -> Self {
        Self::LValueReference(Arc::new(self))
    }

    pub fn rvalue_reference_to(self) -> Self {
        Self::RValueReference(Arc::new(self))
    }

    pub fn is_function_type(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    pub fn is_function_pointer_type(&self) -> bool {
        matches!(self, Self::Pointer(p) if p.is_function_type())
    }

    pub fn is_function_reference_type(&self) -> bool {
        match self {
            Self::LValueReference(p) | Self::RValueReference(p) => p.is_function_type(),
            _ => false,
        }
    }

    /// True for the three shapes a function-pointer entry point accepts.
    pub fn is_function_like(&self) -> bool {
        self.is_function_type()
            || self.is_function_reference_type()
            || self.is_function_pointer_type()
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Int(bits) => write!(f, "i{bits}"),
            Self::Record(name) => write!(f, "struct {name}"),
            Self::Function(ft) => {
                write!(f, "{}(", ft.result)?;
                for (i, p) in ft.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{p}")?;
                }
                if ft.variadic {
                    f.write_str(if ft.params.is_empty() { "..." } else { ", ..." })?;
                }
                f.write_str(")")
            }
            Self::Pointer(p) => write!(f, "{p}*"),
            Self::LValueReference(p) => write!(f, "{p}&"),
            Self::RValueReference(p) => write!(f, "{p}&&"),
        }
    }
}

/// A function declaration as seen by the code generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionDecl {
    pub name: String,
    pub semantic_type: SemanticType,
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
        }
    }
}
