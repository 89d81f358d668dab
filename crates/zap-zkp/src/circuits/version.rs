//! # Version/Linkage Circuit
//!
//! Proves continuity of ownership across a relocation: two identifier
//! commitments — the old address and the new — were made under the same
//! owner secret, without revealing the secret or either identifier.
//!
//! Public inputs (allocation order):
//! 1. `old_commitment` — `H(COMMIT, old_pid, secret)`.
//! 2. `new_commitment` — `H(COMMIT, new_pid, secret)`.
//! 3. `nonce` — caller-chosen challenge preventing replay of the link.
//! 4. `link_tag` — `H(LINK, secret, nonce)`, the verification-binding
//!    output tying both commitments to one secret for this nonce.
//!
//! Witness (private): the owner secret and both PID digests.

use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use zap_crypto::poseidon::domain;
use zap_crypto::{link_tag, pid_commitment, OwnerSecret};

use crate::error::ZkpError;
use crate::gadgets::poseidon_hash_var;

/// Ownership-linkage constraint system. `None` witnesses produce the
/// blank circuit used for key generation.
#[derive(Debug, Clone, Default)]
pub struct VersionCircuit {
    // -- Public inputs --
    /// Commitment to the pre-relocation identifier (public).
    pub old_commitment: Option<Fr>,
    /// Commitment to the post-relocation identifier (public).
    pub new_commitment: Option<Fr>,
    /// Replay-prevention nonce (public).
    pub nonce: Option<Fr>,
    /// Linking value `H(LINK, secret, nonce)` (public).
    pub link_tag: Option<Fr>,

    // -- Witness (private inputs) --
    /// Owner secret shared by both commitments.
    pub secret: Option<Fr>,
    /// Pre-relocation PID digest.
    pub old_pid: Option<Fr>,
    /// Post-relocation PID digest.
    pub new_pid: Option<Fr>,
}

impl VersionCircuit {
    /// The blank circuit for key generation.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Build a filled circuit for a relocation from `old_pid` to
    /// `new_pid` under `secret`.
    pub fn new(secret: &OwnerSecret, old_pid: Fr, new_pid: Fr, nonce: Fr) -> Self {
        Self {
            old_commitment: Some(pid_commitment(&old_pid, secret)),
            new_commitment: Some(pid_commitment(&new_pid, secret)),
            nonce: Some(nonce),
            link_tag: Some(link_tag(secret, &nonce)),
            secret: Some(secret.as_field()),
            old_pid: Some(old_pid),
            new_pid: Some(new_pid),
        }
    }

    /// Public signals in allocation order:
    /// `[old_commitment, new_commitment, nonce, link_tag]`.
    pub fn public_inputs(&self) -> Result<Vec<Fr>, ZkpError> {
        match (
            self.old_commitment,
            self.new_commitment,
            self.nonce,
            self.link_tag,
        ) {
            (Some(old), Some(new), Some(nonce), Some(link)) => Ok(vec![old, new, nonce, link]),
            _ => Err(ZkpError::MalformedInput(
                "blank version circuit has no public inputs".to_string(),
            )),
        }
    }
}

impl ConstraintSynthesizer<Fr> for VersionCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let old_commitment = FpVar::new_input(cs.clone(), || {
            self.old_commitment.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let new_commitment = FpVar::new_input(cs.clone(), || {
            self.new_commitment.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let nonce = FpVar::new_input(cs.clone(), || {
            self.nonce.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let link = FpVar::new_input(cs.clone(), || {
            self.link_tag.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let secret = FpVar::new_witness(cs.clone(), || {
            self.secret.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let old_pid = FpVar::new_witness(cs.clone(), || {
            self.old_pid.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let new_pid = FpVar::new_witness(cs.clone(), || {
            self.new_pid.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let computed_old = poseidon_hash_var(
            cs.clone(),
            domain::COMMIT,
            &[old_pid, secret.clone()],
        )?;
        computed_old.enforce_equal(&old_commitment)?;

        let computed_new = poseidon_hash_var(
            cs.clone(),
            domain::COMMIT,
            &[new_pid, secret.clone()],
        )?;
        computed_new.enforce_equal(&new_commitment)?;

        let computed_link = poseidon_hash_var(cs, domain::LINK, &[secret, nonce])?;
        computed_link.enforce_equal(&link)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_relations::r1cs::ConstraintSystem;
    use zap_core::Pid;

    fn satisfied(circuit: VersionCircuit) -> bool {
        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit.generate_constraints(cs.clone()).unwrap();
        cs.is_satisfied().unwrap()
    }

    fn fixture() -> (OwnerSecret, Fr, Fr) {
        let secret = OwnerSecret::from_bytes([42u8; 32]);
        let old_pid = Pid::parse("PK/ICT/Islamabad/F-7/H-12").unwrap().digest();
        let new_pid = Pid::parse("PK/Punjab/Lahore/Gulberg/H-9").unwrap().digest();
        (secret, old_pid, new_pid)
    }

    #[test]
    fn honest_relocation_satisfies() {
        let (secret, old_pid, new_pid) = fixture();
        let circuit = VersionCircuit::new(&secret, old_pid, new_pid, Fr::from(77u64));
        assert!(satisfied(circuit));
    }

    #[test]
    fn foreign_old_commitment_is_unsatisfied() {
        let (secret, old_pid, new_pid) = fixture();
        let stranger = OwnerSecret::from_bytes([43u8; 32]);
        let mut circuit = VersionCircuit::new(&secret, old_pid, new_pid, Fr::from(77u64));
        // Old commitment actually made by someone else's secret.
        circuit.old_commitment = Some(pid_commitment(&old_pid, &stranger));
        assert!(!satisfied(circuit));
    }

    #[test]
    fn forged_link_tag_is_unsatisfied() {
        let (secret, old_pid, new_pid) = fixture();
        let mut circuit = VersionCircuit::new(&secret, old_pid, new_pid, Fr::from(77u64));
        circuit.link_tag = Some(Fr::from(1u64));
        assert!(!satisfied(circuit));
    }

    #[test]
    fn replayed_nonce_changes_link_tag() {
        let (secret, old_pid, new_pid) = fixture();
        let a = VersionCircuit::new(&secret, old_pid, new_pid, Fr::from(1u64));
        let b = VersionCircuit::new(&secret, old_pid, new_pid, Fr::from(2u64));
        assert_ne!(a.link_tag, b.link_tag);
        // Swapping in the other run's nonce without recomputing the tag
        // fails.
        let mut mixed = a;
        mixed.nonce = Some(Fr::from(2u64));
        assert!(!satisfied(mixed));
    }

    #[test]
    fn public_inputs_hide_secret_and_pids() {
        let (secret, old_pid, new_pid) = fixture();
        let circuit = VersionCircuit::new(&secret, old_pid, new_pid, Fr::from(77u64));
        let signals = circuit.public_inputs().unwrap();
        assert_eq!(signals.len(), 4);
        for signal in &signals {
            assert_ne!(*signal, secret.as_field());
            assert_ne!(*signal, old_pid);
            assert_ne!(*signal, new_pid);
        }
    }
}
