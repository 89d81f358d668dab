//! # Commitments, Salts, and Owner Secrets
//!
//! A commitment is `Poseidon(COMMIT, fields.., salt)`: hiding because the
//! salt is uniform and single-use, binding because Poseidon is collision
//! resistant. The selective-reveal circuit re-derives the same value
//! in-circuit, so the native helper here is the reference the public
//! signal is checked against.
//!
//! Salts and owner secrets are 32 bytes of caller-supplied CSPRNG output,
//! zeroized on drop. They reach the field representation only at the
//! moment of hashing.

use ark_bn254::Fr;
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use zap_core::field::field_from_bytes;

use crate::error::CryptoError;
use crate::poseidon::{self, domain, hash_with_domain};

/// Single-use commitment randomness. Keep private unless deliberately
/// opening the commitment.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Salt([u8; 32]);

impl Salt {
    /// Draw a fresh salt from a cryptographically secure RNG.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Reconstruct a salt from stored bytes (e.g. when re-opening a
    /// commitment made earlier).
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The salt's field representation, as absorbed by the hash.
    pub fn as_field(&self) -> Fr {
        field_from_bytes(&self.0)
    }

    /// Raw bytes, for persistence by the commitment owner.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Salt(..)")
    }
}

/// A long-lived secret identifying an address owner across relocations.
/// Never serialized, never a public signal; the version circuit proves
/// knowledge of it without disclosure.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct OwnerSecret([u8; 32]);

impl OwnerSecret {
    /// Draw a fresh owner secret from a cryptographically secure RNG.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Reconstruct from stored bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The secret's field representation.
    pub fn as_field(&self) -> Fr {
        field_from_bytes(&self.0)
    }
}

impl std::fmt::Debug for OwnerSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OwnerSecret(..)")
    }
}

/// Commit to an ordered field list under a salt.
///
/// Fails with [`CryptoError::ArityExceeded`] when `fields.len() + 1`
/// exceeds the hash arity — checked before any absorption.
pub fn commit(fields: &[Fr], salt: &Salt) -> Result<Fr, CryptoError> {
    let mut inputs = Vec::with_capacity(fields.len() + 1);
    inputs.extend_from_slice(fields);
    inputs.push(salt.as_field());
    hash_with_domain(domain::COMMIT, &inputs)
}

/// Commitment to a PID digest under an owner secret, as used by the
/// version circuit on both sides of a relocation.
pub fn pid_commitment(pid_digest: &Fr, secret: &OwnerSecret) -> Fr {
    poseidon::domain_hash(domain::COMMIT, &[*pid_digest, secret.as_field()])
}

/// The linking value `Poseidon(LINK, secret, nonce)` that ties an old and
/// a new address commitment to the same owner.
pub fn link_tag(secret: &OwnerSecret, nonce: &Fr) -> Fr {
    poseidon::domain_hash(domain::LINK, &[secret.as_field(), *nonce])
}

/// The locker access token `Poseidon(ACCESS, locker, facility, nonce)`
/// checked by a facility terminal against a single-use grant.
pub fn locker_access_commitment(locker: &Fr, facility: &Fr, nonce: &Fr) -> Fr {
    poseidon::domain_hash(domain::ACCESS, &[*locker, *facility, *nonce])
}
