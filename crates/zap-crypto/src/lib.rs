//! # zap-crypto — Cryptographic Primitives for the ZAP Stack
//!
//! This crate provides the cryptographic building blocks shared by the
//! proof layer and its callers:
//!
//! - **Poseidon hashing** over the BN254 scalar field, with domain-separated
//!   variants for leaves, tree nodes, commitments, link tags, and locker
//!   access tokens. The same parameterization is used natively here and
//!   inside the circuits in `zap-zkp`, so witnesses and public commitments
//!   agree bit-for-bit.
//! - **Commitments** — hiding, binding `Poseidon(fields.., salt)` values
//!   with single-use, zeroized salts.
//! - **Merkle accumulator** — a fixed-depth incremental tree over hashed
//!   identifiers, producing membership witnesses (sibling path + direction
//!   bits).
//! - **Accumulator service** — the owning, single-writer wrapper around a
//!   tree, with a bounded history of superseded roots so proofs bound to a
//!   recent root remain classifiable after updates.
//!
//! SHA-256 appears in this stack only off-circuit (byte-string to field
//! mapping in `zap-core`, key checksums in `zap-zkp`); everything that a
//! circuit must recompute goes through Poseidon.

pub mod accumulator;
pub mod commitment;
pub mod error;
pub mod merkle;
pub mod poseidon;

// Re-export primary types.
pub use accumulator::{AccumulatorExport, AccumulatorService, RootStatus};
pub use commitment::{commit, link_tag, locker_access_commitment, pid_commitment, OwnerSecret, Salt};
pub use error::CryptoError;
pub use merkle::{MembershipWitness, MerkleTree};
pub use poseidon::{hash_fields, leaf_hash, node_hash, poseidon_config, MAX_HASH_ARITY};
