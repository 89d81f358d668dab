//! # Membership Circuit
//!
//! Proves that a private identifier's leaf sits under a published
//! accumulator root, without revealing the identifier or its position.
//!
//! Public inputs (allocation order):
//! 1. `root` — the accumulator root the witness was generated against.
//! 2. `issued_at` — freshness timestamp (UTC epoch seconds), bound into
//!    the proof so it cannot be replayed under a different claimed time.
//!
//! Witness (private):
//! - `identifier` — the PID digest.
//! - `path_elements`, `path_indices` — the Merkle membership witness.
//!
//! Constraints: recompute `leaf = H(LEAF, identifier)`, walk the path with
//! affine direction-bit selects, and require the computed root to equal
//! the public root. A path that does not hash to the declared root is a
//! constraint violation, not a verification "false".

use ark_bn254::Fr;
use ark_r1cs_std::boolean::Boolean;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use chrono::{DateTime, Utc};

use zap_crypto::MembershipWitness;

use crate::error::ZkpError;
use crate::gadgets::{leaf_hash_var, merkle_root_var};

/// Fixed tree depth for address accumulators. Part of the circuit shape:
/// changing it requires regenerating keys.
pub const MEMBERSHIP_TREE_DEPTH: usize = 16;

/// Merkle membership constraint system. `None` witnesses produce the
/// blank circuit used for key generation.
#[derive(Debug, Clone, Default)]
pub struct MembershipCircuit {
    // -- Public inputs --
    /// Accumulator root (public).
    pub root: Option<Fr>,
    /// Freshness timestamp as a field element (public).
    pub issued_at: Option<Fr>,

    // -- Witness (private inputs) --
    /// PID digest.
    pub identifier: Option<Fr>,
    /// Sibling hashes, leaf level first.
    pub path_elements: Option<Vec<Fr>>,
    /// Direction bits (`true` = current node is the right child).
    pub path_indices: Option<Vec<bool>>,
}

impl MembershipCircuit {
    /// The blank circuit for key generation.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Build a filled circuit from an identifier digest and an
    /// accumulator witness.
    ///
    /// Rejects witnesses of the wrong depth and pre-epoch timestamps
    /// before any constraint work. Whether the witness actually satisfies
    /// the circuit is the prover's satisfiability check, not this
    /// constructor's.
    pub fn new(
        identifier: Fr,
        witness: &MembershipWitness,
        issued_at: DateTime<Utc>,
    ) -> Result<Self, ZkpError> {
        if witness.depth() != MEMBERSHIP_TREE_DEPTH {
            return Err(ZkpError::MalformedInput(format!(
                "membership witness depth {} (circuit requires {})",
                witness.depth(),
                MEMBERSHIP_TREE_DEPTH
            )));
        }
        Ok(Self {
            root: Some(witness.root),
            issued_at: Some(timestamp_field(issued_at)?),
            identifier: Some(identifier),
            path_elements: Some(witness.path_elements.clone()),
            path_indices: Some(witness.path_indices.clone()),
        })
    }

    /// Public signals in allocation order: `[root, issued_at]`.
    pub fn public_inputs(&self) -> Result<Vec<Fr>, ZkpError> {
        match (self.root, self.issued_at) {
            (Some(root), Some(issued_at)) => Ok(vec![root, issued_at]),
            _ => Err(ZkpError::MalformedInput(
                "blank membership circuit has no public inputs".to_string(),
            )),
        }
    }
}

/// UTC timestamp as a field element. Pre-epoch times are rejected rather
/// than wrapped into the field.
fn timestamp_field(at: DateTime<Utc>) -> Result<Fr, ZkpError> {
    let secs = at.timestamp();
    if secs < 0 {
        return Err(ZkpError::MalformedInput(format!(
            "pre-epoch timestamp: {at}"
        )));
    }
    Ok(Fr::from(secs as u64))
}

impl ConstraintSynthesizer<Fr> for MembershipCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let root = FpVar::new_input(cs.clone(), || {
            self.root.ok_or(SynthesisError::AssignmentMissing)
        })?;
        // Bound into the verification equation; no arithmetic relation
        // beyond that is required of a freshness signal.
        let _issued_at = FpVar::new_input(cs.clone(), || {
            self.issued_at.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let identifier = FpVar::new_witness(cs.clone(), || {
            self.identifier.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let mut path_elements = Vec::with_capacity(MEMBERSHIP_TREE_DEPTH);
        let mut path_indices = Vec::with_capacity(MEMBERSHIP_TREE_DEPTH);
        for level in 0..MEMBERSHIP_TREE_DEPTH {
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

        let leaf = leaf_hash_var(cs.clone(), &identifier)?;
        let computed_root = merkle_root_var(cs, &leaf, &path_elements, &path_indices)?;
        computed_root.enforce_equal(&root)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_relations::r1cs::ConstraintSystem;
    use zap_crypto::poseidon::leaf_hash;
    use zap_crypto::MerkleTree;

    fn fixture() -> (Fr, MembershipWitness) {
        let ids: Vec<Fr> = (0..6).map(|i| Fr::from(9000 + i as u64)).collect();
        let leaves: Vec<Fr> = ids.iter().map(leaf_hash).collect();
        let tree = MerkleTree::build(MEMBERSHIP_TREE_DEPTH, &leaves).unwrap();
        let witness = tree.prove_index(2).unwrap();
        (ids[2], witness)
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_754_000_000, 0).unwrap()
    }

    #[test]
    fn valid_witness_satisfies() {
        let (id, witness) = fixture();
        let circuit = MembershipCircuit::new(id, &witness, now()).unwrap();

        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit.generate_constraints(cs.clone()).unwrap();
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn wrong_identifier_is_unsatisfied() {
        let (_, witness) = fixture();
        let circuit = MembershipCircuit::new(Fr::from(1u64), &witness, now()).unwrap();

        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit.generate_constraints(cs.clone()).unwrap();
        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn flipped_direction_bit_is_unsatisfied() {
        let (id, witness) = fixture();
        let mut circuit = MembershipCircuit::new(id, &witness, now()).unwrap();
        if let Some(bits) = circuit.path_indices.as_mut() {
            bits[0] = !bits[0];
        }

        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit.generate_constraints(cs.clone()).unwrap();
        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn tampered_root_is_unsatisfied() {
        let (id, mut witness) = fixture();
        witness.root = leaf_hash(&Fr::from(5u64));
        let circuit = MembershipCircuit::new(id, &witness, now()).unwrap();

        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit.generate_constraints(cs.clone()).unwrap();
        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn wrong_depth_rejected_before_synthesis() {
        let leaves: Vec<Fr> = (0..3).map(|i| leaf_hash(&Fr::from(i as u64))).collect();
        let shallow = MerkleTree::build(4, &leaves).unwrap();
        let witness = shallow.prove_index(0).unwrap();
        let err = MembershipCircuit::new(Fr::from(0u64), &witness, now()).unwrap_err();
        assert!(matches!(err, ZkpError::MalformedInput(_)));
    }

    #[test]
    fn public_inputs_are_root_then_timestamp() {
        let (id, witness) = fixture();
        let circuit = MembershipCircuit::new(id, &witness, now()).unwrap();
        let signals = circuit.public_inputs().unwrap();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0], witness.root);
        assert_eq!(signals[1], Fr::from(1_754_000_000u64));
    }

    #[test]
    fn blank_circuit_has_no_public_inputs() {
        assert!(MembershipCircuit::blank().public_inputs().is_err());
    }

    #[test]
    fn identifier_is_not_among_public_signals() {
        let (id, witness) = fixture();
        let circuit = MembershipCircuit::new(id, &witness, now()).unwrap();
        for signal in circuit.public_inputs().unwrap() {
            assert_ne!(signal, id);
            assert_ne!(signal, leaf_hash(&id));
        }
    }
}
