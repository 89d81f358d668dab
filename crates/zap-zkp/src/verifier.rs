//! # Verifier
//!
//! Constant-time proof checking against a prepared verification key.
//! Runtime is independent of witness size — three pairings against the
//! envelope's public signals.
//!
//! Outcome contract: a well-formed but invalid proof is `Ok(false)`;
//! errors are reserved for structural problems — malformed encodings
//! ([`ZkpError::MalformedInput`]), circuit/version mismatches
//! ([`ZkpError::KeyMismatch`]). Public signals are part of the pairing
//! equation, so any post-generation tampering flips the result to
//! `false` on its own.

use std::sync::Arc;

use ark_bn254::Bn254;
use ark_groth16::{Groth16, PreparedVerifyingKey};
use ark_snark::SNARK;

use crate::error::ZkpError;
use crate::proof::ProofEnvelope;
use crate::setup::{CircuitKeys, KeyMetadata};

/// Proof checker bound to one circuit's verification key.
pub struct Verifier {
    keys: Arc<CircuitKeys>,
    prepared: PreparedVerifyingKey<Bn254>,
}

impl Verifier {
    /// Prepare a verifier from shared key material. Preparation is done
    /// once; verification reuses the processed key.
    pub fn new(keys: Arc<CircuitKeys>) -> Result<Self, ZkpError> {
        let prepared = Groth16::<Bn254>::process_vk(&keys.verifying_key)?;
        Ok(Self { keys, prepared })
    }

    /// Metadata of the key material this verifier holds.
    pub fn metadata(&self) -> &KeyMetadata {
        &self.keys.metadata
    }

    /// Verify an envelope.
    pub fn verify(&self, envelope: &ProofEnvelope) -> Result<bool, ZkpError> {
        let metadata = &self.keys.metadata;
        if envelope.circuit_type != metadata.circuit_type
            || envelope.key_version != metadata.version
        {
            return Err(ZkpError::KeyMismatch {
                expected_circuit: metadata.circuit_type,
                expected_version: metadata.version,
                found_circuit: envelope.circuit_type,
                found_version: envelope.key_version,
            });
        }

        let expected = envelope.circuit_type.public_signal_count();
        if envelope.public_signals.len() != expected {
            return Err(ZkpError::MalformedInput(format!(
                "{} circuit declares {expected} public signals, envelope has {}",
                envelope.circuit_type,
                envelope.public_signals.len()
            )));
        }

        let proof = envelope.proof()?;
        let accepted = Groth16::<Bn254>::verify_with_processed_vk(
            &self.prepared,
            &envelope.public_signals,
            &proof,
        )?;

        tracing::debug!(circuit = %envelope.circuit_type, accepted, "proof verified");
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::CircuitType;
    use crate::prover::{ProofRequest, Prover};
    use crate::setup::SetupCeremony;
    use ark_bn254::Fr;
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use zap_crypto::OwnerSecret;

    fn keys_pair() -> (Prover, Verifier) {
        let mut rng = StdRng::seed_from_u64(0);
        let keys = Arc::new(
            SetupCeremony::single_party(&mut rng)
                .finalize(CircuitType::Version, 1)
                .unwrap(),
        );
        (Prover::new(keys.clone()), Verifier::new(keys).unwrap())
    }

    fn request() -> ProofRequest {
        ProofRequest::Version {
            secret: OwnerSecret::from_bytes([9u8; 32]),
            old_pid: Fr::from(10u64),
            new_pid: Fr::from(20u64),
            nonce: Fr::from(3u64),
        }
    }

    #[test]
    fn completeness_prove_then_verify() {
        let (prover, verifier) = keys_pair();
        let envelope = prover.prove(request()).unwrap();
        assert!(verifier.verify(&envelope).unwrap());
    }

    #[test]
    fn tampered_signal_verifies_false_not_error() {
        let (prover, verifier) = keys_pair();
        let mut envelope = prover.prove(request()).unwrap();
        envelope.public_signals[3] += Fr::from(1u64);
        assert!(!verifier.verify(&envelope).unwrap());
    }

    #[test]
    fn wrong_key_version_is_key_mismatch() {
        let (prover, verifier) = keys_pair();
        let mut envelope = prover.prove(request()).unwrap();
        envelope.key_version = 2;
        assert!(matches!(
            verifier.verify(&envelope),
            Err(ZkpError::KeyMismatch { .. })
        ));
    }

    #[test]
    fn wrong_circuit_tag_is_key_mismatch() {
        let (prover, verifier) = keys_pair();
        let mut envelope = prover.prove(request()).unwrap();
        envelope.circuit_type = CircuitType::Locker;
        assert!(matches!(
            verifier.verify(&envelope),
            Err(ZkpError::KeyMismatch { .. })
        ));
    }

    #[test]
    fn wrong_signal_count_is_malformed() {
        let (prover, verifier) = keys_pair();
        let mut envelope = prover.prove(request()).unwrap();
        envelope.public_signals.pop();
        assert!(matches!(
            verifier.verify(&envelope),
            Err(ZkpError::MalformedInput(_))
        ));
    }

    #[test]
    fn garbage_proof_bytes_are_malformed() {
        let (prover, verifier) = keys_pair();
        let mut envelope = prover.prove(request()).unwrap();
        envelope.proof_bytes = vec![0u8; 7];
        assert!(matches!(
            verifier.verify(&envelope),
            Err(ZkpError::MalformedInput(_))
        ));
    }
}
