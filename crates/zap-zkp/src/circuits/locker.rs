//! # Locker-Access Circuit
//!
//! Proves the right to open *one of* a facility's lockers without
//! revealing which one ahead of time. The same Merkle-membership check as
//! the membership circuit, scoped to a per-facility locker set, plus an
//! access commitment a terminal can check against a single-use grant.
//!
//! Public inputs (allocation order):
//! 1. `facility` — facility identifier digest.
//! 2. `root` — the facility's locker-set root.
//! 3. `access_commitment` — `H(ACCESS, locker, facility, nonce)`.
//!
//! Witness (private): the locker identifier digest, its Merkle witness,
//! and the access nonce.

use ark_bn254::Fr;
use ark_r1cs_std::boolean::Boolean;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use zap_crypto::poseidon::domain;
use zap_crypto::{locker_access_commitment, MembershipWitness};

use crate::error::ZkpError;
use crate::gadgets::{leaf_hash_var, merkle_root_var, poseidon_hash_var};

/// Fixed tree depth for per-facility locker sets (up to 256 lockers).
/// Part of the circuit shape.
pub const LOCKER_TREE_DEPTH: usize = 8;

/// Locker-access constraint system. `None` witnesses produce the blank
/// circuit used for key generation.
#[derive(Debug, Clone, Default)]
pub struct LockerCircuit {
    // -- Public inputs --
    /// Facility identifier digest (public).
    pub facility: Option<Fr>,
    /// Locker-set root for the facility (public).
    pub root: Option<Fr>,
    /// Access commitment `H(ACCESS, locker, facility, nonce)` (public).
    pub access_commitment: Option<Fr>,

    // -- Witness (private inputs) --
    /// Locker identifier digest.
    pub locker: Option<Fr>,
    /// Sibling hashes, leaf level first.
    pub path_elements: Option<Vec<Fr>>,
    /// Direction bits (`true` = current node is the right child).
    pub path_indices: Option<Vec<bool>>,
    /// Single-use access nonce.
    pub nonce: Option<Fr>,
}

impl LockerCircuit {
    /// The blank circuit for key generation.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Build a filled circuit from a locker digest, its set witness, the
    /// facility digest, and a fresh access nonce.
    pub fn new(
        locker: Fr,
        witness: &MembershipWitness,
        facility: Fr,
        nonce: Fr,
    ) -> Result<Self, ZkpError> {
        if witness.depth() != LOCKER_TREE_DEPTH {
            return Err(ZkpError::MalformedInput(format!(
                "locker witness depth {} (circuit requires {})",
                witness.depth(),
                LOCKER_TREE_DEPTH
            )));
        }
        Ok(Self {
            facility: Some(facility),
            root: Some(witness.root),
            access_commitment: Some(locker_access_commitment(&locker, &facility, &nonce)),
            locker: Some(locker),
            path_elements: Some(witness.path_elements.clone()),
            path_indices: Some(witness.path_indices.clone()),
            nonce: Some(nonce),
        })
    }

    /// Public signals in allocation order:
    /// `[facility, root, access_commitment]`.
    pub fn public_inputs(&self) -> Result<Vec<Fr>, ZkpError> {
        match (self.facility, self.root, self.access_commitment) {
            (Some(facility), Some(root), Some(access)) => Ok(vec![facility, root, access]),
            _ => Err(ZkpError::MalformedInput(
                "blank locker circuit has no public inputs".to_string(),
            )),
        }
    }
}

impl ConstraintSynthesizer<Fr> for LockerCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let facility = FpVar::new_input(cs.clone(), || {
            self.facility.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let root = FpVar::new_input(cs.clone(), || {
            self.root.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let access_commitment = FpVar::new_input(cs.clone(), || {
            self.access_commitment
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        let locker = FpVar::new_witness(cs.clone(), || {
            self.locker.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let mut path_elements = Vec::with_capacity(LOCKER_TREE_DEPTH);
        let mut path_indices = Vec::with_capacity(LOCKER_TREE_DEPTH);
        for level in 0..LOCKER_TREE_DEPTH {
            path_elements.push(FpVar::new_witness(cs.clone(), || {
                self.path_elements
                    .as_ref()
                    .and_then(|v| v.get(level).copied())
                    .ok_or(SynthesisError::AssignmentMissing)
            })?);
            path_indices.push(Boolean::new_witness(cs.clone(), || {
                self.path_indices
                    .as_ref()
                    .and_then(|v| v.get(level).copied())
                    .ok_or(SynthesisError::AssignmentMissing)
            })?);
        }
        let nonce = FpVar::new_witness(cs.clone(), || {
            self.nonce.ok_or(SynthesisError::AssignmentMissing)
        })?;

        // Locker sits in the facility's set.
        let leaf = leaf_hash_var(cs.clone(), &locker)?;
        let computed_root = merkle_root_var(cs.clone(), &leaf, &path_elements, &path_indices)?;
        computed_root.enforce_equal(&root)?;

        // Access commitment binds locker, facility, and nonce.
        let computed_access =
            poseidon_hash_var(cs, domain::ACCESS, &[locker, facility, nonce])?;
        computed_access.enforce_equal(&access_commitment)?;

        Ok(())
    }
}
