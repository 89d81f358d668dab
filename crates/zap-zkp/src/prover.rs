//! # Prover
//!
//! Turns a [`ProofRequest`] into a sealed [`ProofEnvelope`]. The witness
//! is synthesized on a diagnostic constraint system first, so a witness
//! that does not satisfy the circuit surfaces as
//! [`ZkpError::ConstraintViolation`] with the offending constraint named
//! — cleanly distinguishable from infrastructure failures (missing keys,
//! I/O), which arrive as their own variants.
//!
//! Zero-knowledge blinding randomness comes from the operating system on
//! every invocation and is never reused. Proof generation is otherwise
//! deterministic in the witness.

use std::sync::Arc;

use ark_bn254::{Bn254, Fr};
use ark_groth16::Groth16;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use ark_snark::SNARK;
use chrono::{DateTime, Utc};
use rand_core::OsRng;

use zap_core::Pid;
use zap_crypto::{MembershipWitness, OwnerSecret, Salt};

use crate::circuits::{
    CircuitType, LockerCircuit, MembershipCircuit, SelectiveRevealCircuit, StructureCircuit,
    VersionCircuit,
};
use crate::error::ZkpError;
use crate::proof::ProofEnvelope;
use crate::setup::CircuitKeys;

/// One proof to generate. Private material stays inside the request and
/// is dropped (zeroized where applicable) after proving.
#[derive(Debug, Clone)]
pub enum ProofRequest {
    /// Accumulator membership of an identifier.
    Membership {
        /// PID digest.
        identifier: Fr,
        /// Accumulator witness for the identifier's leaf.
        witness: MembershipWitness,
        /// Freshness timestamp to bind into the proof.
        issued_at: DateTime<Utc>,
    },
    /// Hierarchy validity of a PID.
    Structure {
        /// The identifier under proof.
        pid: Pid,
        /// Commitment randomness.
        salt: Salt,
    },
    /// Selective disclosure of committed fields.
    SelectiveReveal {
        /// The full committed field list.
        fields: Vec<Fr>,
        /// Commitment randomness.
        salt: Salt,
        /// Slot indices to reveal.
        reveal_indices: Vec<usize>,
    },
    /// Ownership continuity across a relocation.
    Version {
        /// Owner secret shared by both commitments.
        secret: OwnerSecret,
        /// Pre-relocation PID digest.
        old_pid: Fr,
        /// Post-relocation PID digest.
        new_pid: Fr,
        /// Replay-prevention nonce.
        nonce: Fr,
    },
    /// Locker access within a facility set.
    Locker {
        /// Locker identifier digest.
        locker: Fr,
        /// Locker-set witness.
        witness: MembershipWitness,
        /// Facility identifier digest.
        facility: Fr,
        /// Single-use access nonce.
        nonce: Fr,
    },
}

impl ProofRequest {
    /// Which circuit this request targets.
    pub fn circuit_type(&self) -> CircuitType {
        match self {
            ProofRequest::Membership { .. } => CircuitType::Membership,
            ProofRequest::Structure { .. } => CircuitType::Structure,
            ProofRequest::SelectiveReveal { .. } => CircuitType::SelectiveReveal,
            ProofRequest::Version { .. } => CircuitType::Version,
            ProofRequest::Locker { .. } => CircuitType::Locker,
        }
    }
}

/// Proof generator bound to one circuit's key material.
pub struct Prover {
    keys: Arc<CircuitKeys>,
}

impl Prover {
    /// A prover over shared key material.
    pub fn new(keys: Arc<CircuitKeys>) -> Self {
        Self { keys }
    }

    /// The key material this prover uses.
    pub fn keys(&self) -> &CircuitKeys {
        &self.keys
    }

    /// Generate a proof for `request`.
    pub fn prove(&self, request: ProofRequest) -> Result<ProofEnvelope, ZkpError> {
        let circuit_type = request.circuit_type();
        let metadata = &self.keys.metadata;
        if metadata.circuit_type != circuit_type {
            return Err(ZkpError::KeyMismatch {
                expected_circuit: metadata.circuit_type,
                expected_version: metadata.version,
                found_circuit: circuit_type,
                found_version: metadata.version,
            });
        }

        match request {
            ProofRequest::Membership {
                identifier,
                witness,
                issued_at,
            } => {
                let circuit = MembershipCircuit::new(identifier, &witness, issued_at)?;
                let signals = circuit.public_inputs()?;
                self.seal(circuit_type, circuit, signals)
            }
            ProofRequest::Structure { pid, salt } => {
                let circuit = StructureCircuit::from_pid(&pid, &salt)?;
                let signals = circuit.public_inputs()?;
                self.seal(circuit_type, circuit, signals)
            }
            ProofRequest::SelectiveReveal {
                fields,
                salt,
                reveal_indices,
            } => {
                let circuit = SelectiveRevealCircuit::new(fields, &salt, &reveal_indices)?;
                let signals = circuit.public_inputs()?;
                self.seal(circuit_type, circuit, signals)
            }
            ProofRequest::Version {
                secret,
                old_pid,
                new_pid,
                nonce,
            } => {
                let circuit = VersionCircuit::new(&secret, old_pid, new_pid, nonce);
                let signals = circuit.public_inputs()?;
                self.seal(circuit_type, circuit, signals)
            }
            ProofRequest::Locker {
                locker,
                witness,
                facility,
                nonce,
            } => {
                let circuit = LockerCircuit::new(locker, &witness, facility, nonce)?;
                let signals = circuit.public_inputs()?;
                self.seal(circuit_type, circuit, signals)
            }
        }
    }

    /// Satisfiability check, then Groth16 proving, then envelope sealing.
    fn seal<C>(
        &self,
        circuit_type: CircuitType,
        circuit: C,
        public_signals: Vec<Fr>,
    ) -> Result<ProofEnvelope, ZkpError>
    where
        C: ConstraintSynthesizer<Fr> + Clone,
    {
        // Diagnostic pass: an unsatisfied system is a witness problem,
        // reported as such before any proving work.
        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit.clone().generate_constraints(cs.clone())?;
        if !cs.is_satisfied()? {
            let constraint = cs
                .which_is_unsatisfied()?
                .unwrap_or_else(|| "unnamed constraint".to_string());
            return Err(ZkpError::ConstraintViolation {
                circuit: circuit_type,
                constraint,
            });
        }
        let constraint_count = cs.num_constraints();

        // Fresh OS randomness per invocation for the zero-knowledge
        // blinding factors.
        let proof = Groth16::<Bn254>::prove(&self.keys.proving_key, circuit, &mut OsRng)?;

        tracing::debug!(circuit = %circuit_type, constraint_count,
            signals = public_signals.len(), "proof generated");

        ProofEnvelope::seal(
            circuit_type,
            self.keys.metadata.version,
            &proof,
            public_signals,
        )
    }
}
