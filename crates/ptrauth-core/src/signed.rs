//! Signed pointer constants.
//!
//! A [`SignedPointerConstant`] is a compile-time pointer that already carries
//! its signature. The backend lowers it to the target relocation that asks
//! the loader (or the static linker) to sign the address.
//!
//! Two signed constants are equal iff their base pointer, key, integer
//! discriminator and address discriminator are equal. Translation units
//! depend on this to deduplicate identical constants at link time, so every
//! field is canonical: the base pointer has its casts stripped and absent
//! discriminators are replaced by fixed defaults.

use std::fmt;
use std::sync::Arc;

use crate::errors::{ContractKind, PtrAuthError, PtrAuthResult};
use crate::ir::{Constant, IrType};
use crate::schema::KeyId;

/// A pointer constant with its signing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignedPointerConstant {
    base_pointer: Constant,
    key: KeyId,
    integer_discriminator: Constant,
    address_discriminator: Constant,
}

impl SignedPointerConstant {
    pub fn base_pointer(&self) -> &Constant {
        &self.base_pointer
    }

    pub fn key(&self) -> KeyId {
        self.key
    }

    /// Always an `i64` integer constant.
    pub fn integer_discriminator(&self) -> &Constant {
        &self.integer_discriminator
    }

    /// Always an unqualified pointer constant; `ptr null` when unbound.
    pub fn address_discriminator(&self) -> &Constant {
        &self.address_discriminator
    }

    pub fn integer_discriminator_value(&self) -> u64 {
        self.integer_discriminator
            .as_int()
            .map(|(_, v)| v)
            .unwrap_or_default()
    }

    pub fn has_address_discriminator(&self) -> bool {
        !self.address_discriminator.is_null_value()
    }
}

impl fmt::Display for SignedPointerConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ptrauth ({}, {}, {}, {})",
            self.base_pointer,
            Constant::i32(u32::from(self.key.as_u8())),
            self.integer_discriminator,
            self.address_discriminator
        )
    }
}

/// Build a signed pointer constant.
///
/// `pointer` is canonicalized with [`Constant::strip_pointer_casts`], so any
/// chain of bitcasts, address-space casts and zero GEPs signs the same way as
/// the bare pointer. The stripped base must be pointer typed.
///
/// `storage_address` binds the signature to the location the pointer is
/// stored at and must be an unqualified pointer constant. When absent the
/// address discriminator is `ptr null`.
///
/// `other_discriminator` must be an `i64` integer constant. When absent the
/// integer discriminator is `i64 0`.
pub fn sign_constant_pointer(
    pointer: &Constant,
    key: KeyId,
    storage_address: Option<&Constant>,
    other_discriminator: Option<&Constant>,
) -> PtrAuthResult<Constant> {
    let address_discriminator = match storage_address {
        Some(addr) => {
            if addr.ty() != IrType::PTR {
                return Err(PtrAuthError::contract(
                    ContractKind::InvalidOperandType,
                    format!("storage address must have type ptr, got {}", addr.ty()),
                ));
            }
            addr.clone()
        }
        None => Constant::null_ptr(),
    };

    let integer_discriminator = match other_discriminator {
        Some(disc @ Constant::Int { bits: 64, .. }) => disc.clone(),
        Some(other) => {
            return Err(PtrAuthError::contract(
                ContractKind::InvalidOperandType,
                format!("discriminator must be an i64 integer constant, got {other}"),
            ));
        }
        None => Constant::i64(0),
    };

    let base_pointer = pointer.strip_pointer_casts().clone();
    if !base_pointer.ty().is_pointer() {
        return Err(PtrAuthError::contract(
            ContractKind::InvalidOperandType,
            format!("only pointer constants can be signed, got {base_pointer}"),
        ));
    }

    tracing::debug!(
        pointer = %base_pointer,
        key = key.as_u8(),
        discriminator = %integer_discriminator,
        address = %address_discriminator,
        "building signed pointer constant"
    );

    Ok(Constant::SignedPtr(Arc::new(SignedPointerConstant {
        base_pointer,
        key,
        integer_discriminator,
        address_discriminator,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::CastKind;
    use assert_matches::assert_matches;

    fn signed(c: Constant) -> SignedPointerConstant {
        c.as_signed_ptr().cloned().expect("expected a signed pointer")
    }

    #[test]
    fn defaults_are_substituted() {
        let c = sign_constant_pointer(&Constant::global("f"), KeyId::ASIA, None, None).unwrap();
        let s = signed(c);
        assert_eq!(s.base_pointer(), &Constant::global("f"));
        assert_eq!(s.key(), KeyId::ASIA);
        assert_eq!(s.integer_discriminator(), &Constant::i64(0));
        assert_eq!(s.address_discriminator(), &Constant::null_ptr());
        assert!(!s.has_address_discriminator());
    }

    #[test]
    fn explicit_discriminators_are_kept() {
        let slot = Constant::gep(Constant::global("vtable"), vec![16]);
        let disc = Constant::i64(0xbeef);
        let s = signed(
            sign_constant_pointer(&Constant::global("f"), KeyId::ASDA, Some(&slot), Some(&disc))
                .unwrap(),
        );
        assert_eq!(s.address_discriminator(), &slot);
        assert_eq!(s.integer_discriminator(), &disc);
        assert_eq!(s.integer_discriminator_value(), 0xbeef);
        assert!(s.has_address_discriminator());
    }

    #[test]
    fn casts_are_stripped() {
        let f = Constant::global("f");
        let cast = Constant::bitcast(Constant::addrspacecast(f.clone(), 1), IrType::PTR);
        assert_eq!(
            sign_constant_pointer(&cast, KeyId::ASIB, None, None).unwrap(),
            sign_constant_pointer(&f, KeyId::ASIB, None, None).unwrap()
        );
    }

    #[test]
    fn int_to_ptr_is_not_stripped() {
        let p = Constant::cast(CastKind::IntToPtr, Constant::i64(0x1000), IrType::PTR);
        let s = signed(sign_constant_pointer(&p, KeyId::ASIA, None, None).unwrap());
        assert_eq!(s.base_pointer(), &p);
    }

    #[test]
    fn storage_address_must_be_unqualified_pointer() {
        let f = Constant::global("f");
        let err = sign_constant_pointer(&f, KeyId::ASIA, Some(&Constant::i64(8)), None)
            .unwrap_err();
        assert_matches!(
            err,
            PtrAuthError::ContractViolation {
                kind: ContractKind::InvalidOperandType,
                ..
            }
        );

        let far = Constant::addrspacecast(Constant::global("slot"), 2);
        assert!(sign_constant_pointer(&f, KeyId::ASIA, Some(&far), None).is_err());
    }

    #[test]
    fn discriminator_must_be_i64() {
        for bad in [Constant::i32(1), Constant::null_ptr(), Constant::global("g")] {
            let err = sign_constant_pointer(&Constant::global("f"), KeyId::ASIA, None, Some(&bad))
                .unwrap_err();
            assert_eq!(err.contract_kind(), Some(ContractKind::InvalidOperandType));
        }
    }

    #[test]
    fn base_must_be_pointer() {
        let casted_away = Constant::bitcast(Constant::global("f"), IrType::I64);
        for bad in [Constant::i64(0x1234), Constant::i32(0), casted_away] {
            let err = sign_constant_pointer(&bad, KeyId::ASIA, None, None).unwrap_err();
            assert_eq!(err.contract_kind(), Some(ContractKind::InvalidOperandType));
        }
    }

    #[test]
    fn display() {
        let c = sign_constant_pointer(&Constant::global("f"), KeyId::ASIA, None, None).unwrap();
        assert_eq!(c.to_string(), "ptr ptrauth (ptr @f, i32 0, i64 0, ptr null)");
    }
}
