//! # Proof-System Error Taxonomy
//!
//! Structured errors for proving, verification, and the setup lifecycle.
//! The taxonomy distinguishes three kinds of failure:
//!
//! - **Recoverable, expected**: [`ZkpError::ConstraintViolation`] (the
//!   witness does not satisfy the circuit — wrong path, tampered length),
//!   [`ZkpError::StaleRoot`] (witness refers to a superseded accumulator
//!   root; re-fetch and retry), [`ZkpError::PoolSaturated`] and
//!   [`ZkpError::Timeout`] (back off and retry).
//! - **Caller bugs, rejected early**: [`ZkpError::MalformedInput`] (wrong
//!   arity, out-of-range index, invalid encoding — before witness
//!   construction), [`ZkpError::KeyMismatch`] (proof presented against a
//!   different circuit or key version — rejected, never reinterpreted).
//! - **Fatal**: [`ZkpError::SetupIntegrity`] — ceremony artifacts missing
//!   or corrupt; the affected circuit must halt rather than degrade.

use thiserror::Error;

use zap_crypto::CryptoError;

use crate::circuits::CircuitType;

/// Errors from the ZAP proof system.
#[derive(Error, Debug)]
pub enum ZkpError {
    /// The witness does not satisfy the circuit. Expected and local —
    /// not a bug in the proof system.
    #[error("constraint violation in {circuit} circuit: {constraint}")]
    ConstraintViolation {
        /// Which circuit rejected the witness.
        circuit: CircuitType,
        /// The first unsatisfied constraint, as named during synthesis.
        constraint: String,
    },

    /// Input rejected before witness construction.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Proof generated against a different circuit or key version than
    /// the verifier holds.
    #[error("key mismatch: proof is for {found_circuit} v{found_version}, verifier holds {expected_circuit} v{expected_version}")]
    KeyMismatch {
        /// Circuit type the verifier is configured for.
        expected_circuit: CircuitType,
        /// Key version the verifier is configured for.
        expected_version: u32,
        /// Circuit type claimed by the envelope.
        found_circuit: CircuitType,
        /// Key version claimed by the envelope.
        found_version: u32,
    },

    /// Witness generated against a superseded accumulator root.
    /// Recoverable: fetch a fresh witness and retry.
    #[error("stale accumulator root: {root_hex}")]
    StaleRoot {
        /// Hex encoding of the unrecognized root.
        root_hex: String,
    },

    /// Ceremony artifacts missing or corrupt. Fatal for the affected
    /// circuit.
    #[error("setup integrity error: {0}")]
    SetupIntegrity(String),

    /// Key policy rejected the presented key material (e.g. single-party
    /// setup in production mode).
    #[error("key policy violation: {0}")]
    PolicyViolation(String),

    /// The prover pool's bounded queue is full. Back off and retry.
    #[error("prover pool saturated: {queue_depth} proofs already queued")]
    PoolSaturated {
        /// The configured queue bound.
        queue_depth: usize,
    },

    /// Proof generation exceeded the caller's deadline. The proof is
    /// discarded — proofs are all-or-nothing.
    #[error("proof generation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A prover worker failed to complete (panic or runtime shutdown).
    #[error("prover task failed: {0}")]
    TaskFailed(String),

    /// Constraint synthesis failed for infrastructure reasons.
    #[error("synthesis error: {0}")]
    Synthesis(#[from] ark_relations::r1cs::SynthesisError),

    /// Curve-point or key (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Cryptographic primitive error from `zap-crypto`.
    #[error("crypto error: {0}")]
    Crypto(CryptoError),

    /// Domain validation error from `zap-core`.
    #[error("validation error: {0}")]
    Core(#[from] zap_core::CoreError),

    /// JSON envelope error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (key store operations).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ZkpError {
    /// Whether the caller can expect a retry (possibly after re-fetching
    /// a witness or backing off) to succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ZkpError::ConstraintViolation { .. }
                | ZkpError::StaleRoot { .. }
                | ZkpError::PoolSaturated { .. }
                | ZkpError::Timeout(_)
        )
    }

    /// Whether this error must halt the affected circuit's operation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ZkpError::SetupIntegrity(_))
    }
}

// StaleRoot keeps its identity across the crate boundary; everything else
// from zap-crypto is a generic crypto error.
impl From<CryptoError> for ZkpError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::StaleRoot { root_hex } => ZkpError::StaleRoot { root_hex },
            other => ZkpError::Crypto(other),
        }
    }
}

impl From<ark_serialize::SerializationError> for ZkpError {
    fn from(err: ark_serialize::SerializationError) -> Self {
        ZkpError::Serialization(err.to_string())
    }
}
