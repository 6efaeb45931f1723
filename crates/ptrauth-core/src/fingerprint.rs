//! Stable fingerprints for signed pointer constants.
//!
//! A fingerprint is a domain-separated SHA-256 digest of a constant's
//! canonical textual form. Two translation units that build the same signed
//! constant produce the same fingerprint, so it can name the constant in a
//! link-once section or key a cross-unit dedup table.
//!
//! The textual form is the `Display` rendering of [`Constant`], which prints
//! every field of a signed constant explicitly (including defaulted
//! discriminators). Changing that rendering changes every fingerprint.

use sha2::{Digest, Sha256};

use crate::errors::{ContractKind, PtrAuthError, PtrAuthResult};
use crate::ir::Constant;
use crate::signed::SignedPointerConstant;

/// Hash raw bytes under a domain label.
pub fn hash_with_domain(domain: &str, bytes: &[u8]) -> [u8; 32] {
    let mut h = Sha256::new();
    h.update(domain.as_bytes());
    h.update([0u8]);
    h.update(bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&h.finalize());
    out
}

/// Fingerprint a signed pointer constant.
pub fn fingerprint_signed(signed: &SignedPointerConstant) -> [u8; 32] {
    hash_with_domain(crate::domain::SIGNED_CONSTANT, signed.to_string().as_bytes())
}

/// Lowercase hex fingerprint of a constant that must be a signed pointer.
pub fn fingerprint_hex(constant: &Constant) -> PtrAuthResult<String> {
    let signed = constant.as_signed_ptr().ok_or_else(|| {
        PtrAuthError::contract(
            ContractKind::InvalidOperandType,
            format!("only signed pointer constants have fingerprints, got {constant}"),
        )
    })?;
    Ok(hex::encode(fingerprint_signed(signed)))
}
