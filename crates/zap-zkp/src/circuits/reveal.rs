//! # Selective-Reveal Circuit
//!
//! Proves that chosen fields of a committed record equal publicly
//! declared values, while the remaining fields stay hidden behind the
//! commitment.
//!
//! Public inputs (allocation order):
//! 1. `commitment` — `H(COMMIT, fields.., salt)` as previously published.
//! 2. `reveal_mask` — packed reveal bits, LSB = slot 0.
//! 3..10. `revealed` — one value per slot; the field's value where the
//!    mask bit is set, zero where concealed.
//!
//! Witness (private): the full field list and the salt.
//!
//! Concealed slots are genuinely unconstrained in the public view — the
//! circuit forces their *public* signal to zero, so nothing about the
//! hidden value leaks through signal choice, while the private field
//! remains bound only by the commitment.

use ark_bn254::Fr;
use ark_ff::Zero;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use zap_crypto::{commit, Salt};

use crate::error::ZkpError;
use crate::gadgets::poseidon_hash_var;
use zap_crypto::poseidon::domain;

/// Number of field slots in a committed record. Part of the circuit
/// shape.
pub const FIELD_SLOTS: usize = 8;

/// Selective-disclosure constraint system. `None` witnesses produce the
/// blank circuit used for key generation.
#[derive(Debug, Clone, Default)]
pub struct SelectiveRevealCircuit {
    // -- Public inputs --
    /// Previously published commitment (public).
    pub commitment: Option<Fr>,
    /// Packed reveal bits, LSB = slot 0 (public).
    pub reveal_mask: Option<Fr>,
    /// Declared values, zero where concealed (public).
    pub revealed: Option<Vec<Fr>>,

    // -- Witness (private inputs) --
    /// The full committed field list.
    pub fields: Option<Vec<Fr>>,
    /// Commitment randomness.
    pub salt: Option<Fr>,
}

impl SelectiveRevealCircuit {
    /// The blank circuit for key generation.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Build a filled circuit revealing `reveal_indices` of `fields`.
    ///
    /// Rejects a field list of the wrong arity and out-of-range indices
    /// before witness construction. Duplicate indices are harmless.
    pub fn new(fields: Vec<Fr>, salt: &Salt, reveal_indices: &[usize]) -> Result<Self, ZkpError> {
        if fields.len() != FIELD_SLOTS {
            return Err(ZkpError::MalformedInput(format!(
                "selective reveal requires exactly {FIELD_SLOTS} fields, got {}",
                fields.len()
            )));
        }
        let mask_bits = pack_mask(reveal_indices)?;
        let revealed: Vec<Fr> = fields
            .iter()
            .enumerate()
            .map(|(slot, value)| {
                if mask_bits & (1u64 << slot) != 0 {
                    *value
                } else {
                    Fr::zero()
                }
            })
            .collect();

        Ok(Self {
            commitment: Some(commit(&fields, salt)?),
            reveal_mask: Some(Fr::from(mask_bits)),
            revealed: Some(revealed),
            fields: Some(fields),
            salt: Some(salt.as_field()),
        })
    }

    /// Public signals in allocation order:
    /// `[commitment, reveal_mask, revealed[0..FIELD_SLOTS]]`.
    pub fn public_inputs(&self) -> Result<Vec<Fr>, ZkpError> {
        match (self.commitment, self.reveal_mask, self.revealed.as_ref()) {
            (Some(commitment), Some(mask), Some(revealed)) => {
                let mut signals = Vec::with_capacity(2 + FIELD_SLOTS);
                signals.push(commitment);
                signals.push(mask);
                signals.extend_from_slice(revealed);
                Ok(signals)
            }
            _ => Err(ZkpError::MalformedInput(
                "blank selective-reveal circuit has no public inputs".to_string(),
            )),
        }
    }
}

/// Pack reveal indices into the mask's bit representation.
pub fn pack_mask(reveal_indices: &[usize]) -> Result<u64, ZkpError> {
    let mut mask = 0u64;
    for &index in reveal_indices {
        if index >= FIELD_SLOTS {
            return Err(ZkpError::MalformedInput(format!(
                "reveal index {index} out of range (slots 0..{FIELD_SLOTS})"
            )));
        }
        mask |= 1u64 << index;
    }
    Ok(mask)
}

impl ConstraintSynthesizer<Fr> for SelectiveRevealCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let commitment = FpVar::new_input(cs.clone(), || {
            self.commitment.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let reveal_mask = FpVar::new_input(cs.clone(), || {
            self.reveal_mask.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let mut revealed = Vec::with_capacity(FIELD_SLOTS);
        for slot in 0..FIELD_SLOTS {
            revealed.push(FpVar::new_input(cs.clone(), || {
                self.revealed
                    .as_ref()
                    .and_then(|v| v.get(slot).copied())
                    .ok_or(SynthesisError::AssignmentMissing)
            })?);
        }

        let mut fields = Vec::with_capacity(FIELD_SLOTS);
        for slot in 0..FIELD_SLOTS {
            fields.push(FpVar::new_witness(cs.clone(), || {
                self.fields
                    .as_ref()
                    .and_then(|v| v.get(slot).copied())
                    .ok_or(SynthesisError::AssignmentMissing)
            })?);
        }
        let salt = FpVar::new_witness(cs.clone(), || {
            self.salt.ok_or(SynthesisError::AssignmentMissing)
        })?;

        // The mask is a small bitfield: decompose and pin everything
        // above the slot range to zero.
        let mask_bits = reveal_mask.to_bits_le()?;
        for bit in mask_bits.iter().skip(FIELD_SLOTS) {
            bit.enforce_equal(&Boolean::constant(false))?;
        }

        // Commitment over the full field list and salt.
        let mut commit_inputs = fields.clone();
        commit_inputs.push(salt);
        let computed = poseidon_hash_var(cs, domain::COMMIT, &commit_inputs)?;
        computed.enforce_equal(&commitment)?;

        // Per slot: revealed equals the field where the bit is set, and
        // zero where it is not.
        for ((field, declared), bit) in fields.iter().zip(&revealed).zip(&mask_bits) {
            field.conditional_enforce_equal(declared, bit)?;
            declared.conditional_enforce_equal(&FpVar::zero(), &bit.not())?;
        }

        Ok(())
    }
}
