//! # Structure Circuit
//!
//! Proves that a private identifier is a well-formed hierarchy: the
//! country matches a public country code, the declared depth is within
//! bounds, and exactly the first `depth` component slots are populated.
//!
//! Public inputs (allocation order):
//! 1. `country` — digest of the country component.
//! 2. `declared_depth` — number of hierarchy levels.
//! 3. `commitment` — `H(COMMIT, components.., depth, salt)`, binding the
//!    full component list and the declared depth.
//!
//! Witness (private):
//! - `components` — per-component digests, zero-padded to
//!   [`MAX_COMPONENTS`] slots.
//! - `lengths` — per-component byte lengths, zero-padded likewise.
//! - `salt` — commitment randomness.
//!
//! The "populated iff below depth" rule is enforced per slot as a
//! strict-less-than comparison against the declared depth combined with a
//! zero-check — affine throughout, no conditional synthesis.

use core::cmp::Ordering;

use ark_bn254::Fr;
use ark_ff::Zero;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use zap_core::pid::{Pid, MAX_PID_DEPTH, MIN_PID_DEPTH};
use zap_crypto::poseidon::{domain, hash_with_domain};
use zap_crypto::Salt;

use crate::error::ZkpError;
use crate::gadgets::poseidon_hash_var;

/// Component slots in the circuit. Matches the PID depth cap; both are
/// part of the circuit shape.
pub const MAX_COMPONENTS: usize = MAX_PID_DEPTH;

/// Hierarchy-validity constraint system. `None` witnesses produce the
/// blank circuit used for key generation.
#[derive(Debug, Clone, Default)]
pub struct StructureCircuit {
    // -- Public inputs --
    /// Digest of the country component (public).
    pub country: Option<Fr>,
    /// Declared hierarchy depth (public).
    pub declared_depth: Option<Fr>,
    /// Binding commitment over components, depth, and salt (public).
    pub commitment: Option<Fr>,

    // -- Witness (private inputs) --
    /// Component digests, zero-padded to [`MAX_COMPONENTS`].
    pub components: Option<Vec<Fr>>,
    /// Component byte lengths, zero-padded to [`MAX_COMPONENTS`].
    pub lengths: Option<Vec<Fr>>,
    /// Commitment randomness.
    pub salt: Option<Fr>,
}

impl StructureCircuit {
    /// The blank circuit for key generation.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Build a filled circuit from a validated PID and a fresh salt.
    pub fn from_pid(pid: &Pid, salt: &Salt) -> Result<Self, ZkpError> {
        let mut components = pid.component_digests();
        components.resize(MAX_COMPONENTS, Fr::zero());

        let mut lengths: Vec<Fr> = pid
            .components()
            .iter()
            .map(|c| Fr::from(c.len() as u64))
            .collect();
        lengths.resize(MAX_COMPONENTS, Fr::zero());

        let depth = Fr::from(pid.depth() as u64);
        Ok(Self {
            country: Some(pid.country_digest()),
            declared_depth: Some(depth),
            commitment: Some(structure_commitment(pid, salt)?),
            components: Some(components),
            lengths: Some(lengths),
            salt: Some(salt.as_field()),
        })
    }

    /// Public signals in allocation order:
    /// `[country, declared_depth, commitment]`.
    pub fn public_inputs(&self) -> Result<Vec<Fr>, ZkpError> {
        match (self.country, self.declared_depth, self.commitment) {
            (Some(country), Some(depth), Some(commitment)) => {
                Ok(vec![country, depth, commitment])
            }
            _ => Err(ZkpError::MalformedInput(
                "blank structure circuit has no public inputs".to_string(),
            )),
        }
    }
}

/// The commitment the structure circuit binds: component digests
/// (zero-padded), declared depth, salt. Published by the identifier owner
/// and re-derived in-circuit.
pub fn structure_commitment(pid: &Pid, salt: &Salt) -> Result<Fr, ZkpError> {
    let mut inputs = pid.component_digests();
    inputs.resize(MAX_COMPONENTS, Fr::zero());
    inputs.push(Fr::from(pid.depth() as u64));
    inputs.push(salt.as_field());
    Ok(hash_with_domain(domain::COMMIT, &inputs)?)
}

impl ConstraintSynthesizer<Fr> for StructureCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let country = FpVar::new_input(cs.clone(), || {
            self.country.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let declared_depth = FpVar::new_input(cs.clone(), || {
            self.declared_depth.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let commitment = FpVar::new_input(cs.clone(), || {
            self.commitment.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let mut components = Vec::with_capacity(MAX_COMPONENTS);
        let mut lengths = Vec::with_capacity(MAX_COMPONENTS);
        for slot in 0..MAX_COMPONENTS {
            components.push(FpVar::new_witness(cs.clone(), || {
                self.components
                    .as_ref()
                    .and_then(|v| v.get(slot).copied())
                    .ok_or(SynthesisError::AssignmentMissing)
            })?);
            lengths.push(FpVar::new_witness(cs.clone(), || {
                self.lengths
                    .as_ref()
                    .and_then(|v| v.get(slot).copied())
                    .ok_or(SynthesisError::AssignmentMissing)
            })?);
        }
        let salt = FpVar::new_witness(cs.clone(), || {
            self.salt.ok_or(SynthesisError::AssignmentMissing)
        })?;

        // Depth bounds: MIN_PID_DEPTH <= depth <= MAX_COMPONENTS.
        declared_depth.enforce_cmp(
            &FpVar::constant(Fr::from((MIN_PID_DEPTH - 1) as u64)),
            Ordering::Greater,
            false,
        )?;
        declared_depth.enforce_cmp(
            &FpVar::constant(Fr::from(MAX_COMPONENTS as u64)),
            Ordering::Less,
            true,
        )?;

        // Component 0 is the public country code.
        components[0].enforce_equal(&country)?;

        // Slot populated iff its index is below the declared depth:
        // strict-less-than combined with a zero-check per slot.
        for (slot, (component, length)) in components.iter().zip(&lengths).enumerate() {
            let active = declared_depth.is_cmp(
                &FpVar::constant(Fr::from(slot as u64)),
                Ordering::Greater,
                false,
            )?;
            let inactive = active.not();
            component.is_zero()?.enforce_equal(&inactive)?;
            length.is_zero()?.enforce_equal(&inactive)?;
        }

        // Re-derive the binding commitment.
        let mut commit_inputs = components;
        commit_inputs.push(declared_depth);
        commit_inputs.push(salt);
        let computed = poseidon_hash_var(cs, domain::COMMIT, &commit_inputs)?;
        computed.enforce_equal(&commitment)?;

        Ok(())
    }
}
