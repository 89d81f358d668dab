//! # zap-zkp — Zero-Knowledge Address Proofs
//!
//! The proof layer of the ZAP Stack. A party holding a hierarchical
//! address identifier (a [`Pid`](zap_core::Pid)) can prove facts about it
//! — set membership, structural validity, selective field disclosure,
//! ownership continuity across a relocation, locker access — without
//! revealing the identifier itself.
//!
//! ## Architecture
//!
//! Five circuit variants ([`circuits`]) are expressed as BN254 R1CS
//! constraint systems and proven with Groth16 (`ark-groth16`). Everything
//! a circuit must recompute is Poseidon-hashed, natively in `zap-crypto`
//! and in-circuit via the sponge gadget in [`gadgets`] — the same
//! parameterization on both sides, so witnesses and public commitments
//! agree bit-for-bit.
//!
//! - [`setup`] — per-circuit proving/verification keys from a
//!   contribution ceremony, with provenance recorded on the key material
//!   and a policy gate for production deployments.
//! - [`prover`] / [`verifier`] — proof generation (CPU-bound, blinded
//!   with fresh OS randomness) and constant-time verification.
//! - [`proof`] — the envelope that crosses the system boundary:
//!   `{ circuit_type, key_version, proof_bytes, public_signals }`, with
//!   byte-exact JSON and binary round-trips.
//! - [`pool`] — a bounded worker pool for concurrent proving with
//!   backpressure; verification is cheap and runs inline.
//! - [`registry`] — process-wide cache of loaded key material.
//!
//! ## Error Taxonomy
//!
//! [`ZkpError`] separates expected, recoverable conditions
//! (`ConstraintViolation`, `StaleRoot`) from caller bugs
//! (`MalformedInput`, `KeyMismatch`) and fatal deployment problems
//! (`SetupIntegrity`). See [`ZkpError::is_recoverable`].

pub mod circuits;
pub mod error;
pub mod gadgets;
pub mod pool;
pub mod proof;
pub mod prover;
pub mod registry;
pub mod setup;
pub mod verifier;

// Re-export primary types.
pub use circuits::CircuitType;
pub use error::ZkpError;
pub use pool::ProverPool;
pub use proof::ProofEnvelope;
pub use prover::{ProofRequest, Prover};
pub use registry::KeyRegistry;
pub use setup::{CircuitKeys, KeyPolicy, KeyProvenance, KeyStore, SetupCeremony};
pub use verifier::Verifier;
