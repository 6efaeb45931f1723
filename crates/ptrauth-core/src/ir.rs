//! IR constants.
//!
//! The minimal constant-expression model the builder operates on. It mirrors
//! the shapes a backend constant pool exposes: integers, null pointers,
//! symbol references, cast expressions and signed-pointer expressions.
//!
//! Constants are immutable values with structural equality and hashing, so a
//! pool can intern them by value. Children are held behind `Arc`, which keeps
//! cloning cheap and lets constants cross threads.

use std::fmt;
use std::sync::Arc;

use crate::signed::SignedPointerConstant;

/// An IR type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrType {
    /// An opaque pointer in the given address space.
    Ptr { addr_space: u32 },
    /// An integer of the given bit width.
    Int(u32),
}

impl IrType {
    /// The unqualified pointer type (address space 0).
    pub const PTR: IrType = IrType::Ptr { addr_space: 0 };
    pub const I32: IrType = IrType::Int(32);
    pub const I64: IrType = IrType::Int(64);

    pub fn is_pointer(&self) -> bool {
        matches!(self, Self::Ptr { .. })
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ptr { addr_space: 0 } => f.write_str("ptr"),
            Self::Ptr { addr_space } => write!(f, "ptr addrspace({addr_space})"),
            Self::Int(bits) => write!(f, "i{bits}"),
        }
    }
}

/// Cast expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastKind {
    BitCast,
    AddrSpaceCast,
    PtrToInt,
    IntToPtr,
}

impl CastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BitCast => "bitcast",
            Self::AddrSpaceCast => "addrspacecast",
            Self::PtrToInt => "ptrtoint",
            Self::IntToPtr => "inttoptr",
        }
    }

    /// Casts that leave the pointed-to address unchanged.
    pub fn is_pointer_cast(&self) -> bool {
        matches!(self, Self::BitCast | Self::AddrSpaceCast)
    }
}

/// A constant value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    /// The null value of a pointer type.
    Null(IrType),
    /// An integer constant. `value` holds the low `bits` bits; widths above
    /// 64 bits keep only the low 64.
    Int { bits: u32, value: u64 },
    /// A reference to a global symbol (function, variable, alias).
    Global { name: Arc<str>, addr_space: u32 },
    Cast {
        kind: CastKind,
        operand: Arc<Constant>,
        to: IrType,
    },
    /// Byte-offset address computation from a base pointer.
    Gep {
        base: Arc<Constant>,
        indices: Vec<i64>,
    },
    /// A pointer carrying a signature.
    SignedPtr(Arc<SignedPointerConstant>),
}

impl Constant {
    pub fn null_ptr() -> Self {
        Self::Null(IrType::PTR)
    }

    /// Integer constant of width `bits`, with `value` truncated to that width.
    ///
    /// Values are stored in 64 bits, so an integer wider than 64 bits can only
    /// carry its low 64 bits. Discriminators and keys never need more.
    pub fn int(bits: u32, value: u64) -> Self {
        let mask = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
        Self::Int {
            bits,
            value: value & mask,
        }
    }

    pub fn i32(value: u32) -> Self {
        Self::int(32, u64::from(value))
    }

    pub fn i64(value: u64) -> Self {
        Self::int(64, value)
    }

    pub fn global(name: impl Into<Arc<str>>) -> Self {
        Self::Global {
            name: name.into(),
            addr_space: 0,
        }
    }

    pub fn cast(kind: CastKind, operand: Constant, to: IrType) -> Self {
        Self::Cast {
            kind,
            operand: Arc::new(operand),
            to,
        }
    }

    pub fn bitcast(operand: Constant, to: IrType) -> Self {
        Self::cast(CastKind::BitCast, operand, to)
    }

    pub fn addrspacecast(operand: Constant, addr_space: u32) -> Self {
        Self::cast(CastKind::AddrSpaceCast, operand, IrType::Ptr { addr_space })
    }

    pub fn gep(base: Constant, indices: Vec<i64>) -> Self {
        Self::Gep {
            base: Arc::new(base),
            indices,
        }
    }

    pub fn ty(&self) -> IrType {
        match self {
            Self::Null(t) => *t,
            Self::Int { bits, .. } => IrType::Int(*bits),
            Self::Global { addr_space, .. } => IrType::Ptr {
                addr_space: *addr_space,
            },
            Self::Cast { to, .. } => *to,
            Self::Gep { base, .. } => base.ty(),
            Self::SignedPtr(s) => s.base_pointer().ty(),
        }
    }

    pub fn is_null_value(&self) -> bool {
        matches!(self, Self::Null(_) | Self::Int { value: 0, .. })
    }

    pub fn as_int(&self) -> Option<(u32, u64)> {
        match self {
            Self::Int { bits, value } => Some((*bits, *value)),
            _ => None,
        }
    }

    pub fn as_signed_ptr(&self) -> Option<&SignedPointerConstant> {
        match self {
            Self::SignedPtr(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Strip casts that do not change the pointed-to address.
    ///
    /// Removes pointer-to-pointer bitcasts, address-space casts and GEPs whose
    /// indices are all zero, repeatedly. Integer/pointer conversions and casts
    /// whose source or result is not a pointer stop the walk.
    pub fn strip_pointer_casts(&self) -> &Constant {
        let mut cur = self;
        loop {
            match cur {
                Self::Cast { kind, operand, to }
                    if kind.is_pointer_cast() && operand.ty().is_pointer() && to.is_pointer() =>
                {
                    cur = operand.as_ref();
                }
                Self::Gep { base, indices } if indices.iter().all(|i| *i == 0) => {
                    cur = base.as_ref();
                }
                _ => return cur,
            }
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.ty())?;
        match self {
            Self::Null(_) => f.write_str("null"),
            Self::Int { bits, value } => {
                // Print as signed, the way textual IR does.
                let shift = 64 - (*bits).clamp(1, 64);
                let signed = ((*value << shift) as i64) >> shift;
                write!(f, "{signed}")
            }
            Self::Global { name, .. } => write!(f, "@{name}"),
            Self::Cast { kind, operand, to } => {
                write!(f, "{} ({operand} to {to})", kind.as_str())
            }
            Self::Gep { base, indices } => {
                write!(f, "getelementptr (i8, {base}")?;
                for i in indices {
                    write!(f, ", i64 {i}")?;
                }
                f.write_str(")")
            }
            Self::SignedPtr(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_nested_pointer_casts() {
        let f = Constant::global("f");
        let wrapped = Constant::bitcast(
            Constant::gep(Constant::addrspacecast(f.clone(), 1), vec![0, 0]),
            IrType::PTR,
        );
        assert_eq!(wrapped.strip_pointer_casts(), &f);
    }

    #[test]
    fn strip_stops_at_semantic_casts() {
        let f = Constant::global("f");
        let round_trip = Constant::cast(
            CastKind::IntToPtr,
            Constant::cast(CastKind::PtrToInt, f, IrType::I64),
            IrType::PTR,
        );
        assert_eq!(round_trip.strip_pointer_casts(), &round_trip);

        let offset = Constant::gep(Constant::global("g"), vec![8]);
        assert_eq!(offset.strip_pointer_casts(), &offset);

        let to_int = Constant::bitcast(Constant::global("f"), IrType::I64);
        assert_eq!(to_int.strip_pointer_casts(), &to_int);
    }

    #[test]
    fn int_is_masked_to_width() {
        assert_eq!(Constant::int(8, 0x1ff).as_int(), Some((8, 0xff)));
        assert_eq!(Constant::i64(u64::MAX).as_int(), Some((64, u64::MAX)));
        assert_eq!(Constant::int(128, u64::MAX).as_int(), Some((128, u64::MAX)));
    }

    #[test]
    fn types() {
        assert_eq!(Constant::null_ptr().ty(), IrType::PTR);
        assert_eq!(
            Constant::addrspacecast(Constant::global("f"), 3).ty(),
            IrType::Ptr { addr_space: 3 }
        );
        assert_eq!(Constant::i32(7).ty(), IrType::I32);
    }

    #[test]
    fn display() {
        assert_eq!(Constant::global("f").to_string(), "ptr @f");
        assert_eq!(Constant::i64(u64::MAX).to_string(), "i64 -1");
        assert_eq!(
            Constant::addrspacecast(Constant::global("f"), 1).to_string(),
            "ptr addrspace(1) addrspacecast (ptr @f to ptr addrspace(1))"
        );
    }
}
