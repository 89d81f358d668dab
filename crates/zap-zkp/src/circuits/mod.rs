//! # Circuit Definitions
//!
//! The five address-proof circuits, one module each:
//!
//! - [`membership`] — the identifier's leaf is under a published
//!   accumulator root.
//! - [`structure`] — the identifier has a valid hierarchy (country code,
//!   declared depth, non-empty components exactly below the depth).
//! - [`reveal`] — selective disclosure of committed fields.
//! - [`version`] — an old and a new identifier commitment share one owner
//!   secret (relocation continuity).
//! - [`locker`] — membership in a per-facility locker set, producing a
//!   single-use access commitment.
//!
//! Every circuit is an arkworks `ConstraintSynthesizer<Fr>` with
//! `Option`-valued witness fields: the blank form (all `None`) drives key
//! generation, the filled form drives proving. Private inputs are
//! allocated as witnesses and never leave the prover; public inputs are
//! allocated in a fixed order that each circuit's `public_inputs()`
//! reproduces exactly — the verifier checks against that order.
//!
//! Inside the constraint systems there is no control flow: direction-bit
//! path selection is an affine two-way select, and the structure
//! circuit's depth gating is a strict-less-than comparison combined with
//! a zero-check.

pub mod locker;
pub mod membership;
pub mod reveal;
pub mod structure;
pub mod version;

pub use locker::{LockerCircuit, LOCKER_TREE_DEPTH};
pub use membership::{MembershipCircuit, MEMBERSHIP_TREE_DEPTH};
pub use reveal::{SelectiveRevealCircuit, FIELD_SLOTS};
pub use structure::{StructureCircuit, MAX_COMPONENTS};
pub use version::VersionCircuit;

use serde::{Deserialize, Serialize};

/// Tag selecting one of the five circuit variants.
///
/// This is an orchestration-layer concept — key lookup, envelope routing,
/// request dispatch. Inside a constraint system no such branching exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitType {
    /// Accumulator membership under a published root.
    Membership,
    /// Hierarchical structure validity.
    Structure,
    /// Selective field disclosure against a commitment.
    SelectiveReveal,
    /// Ownership continuity across a relocation.
    Version,
    /// Locker-set membership with an access commitment.
    Locker,
}

impl CircuitType {
    /// All circuit types, in canonical order.
    pub const ALL: [CircuitType; 5] = [
        CircuitType::Membership,
        CircuitType::Structure,
        CircuitType::SelectiveReveal,
        CircuitType::Version,
        CircuitType::Locker,
    ];

    /// Stable lowercase name (matches the serde encoding).
    pub fn as_str(self) -> &'static str {
        match self {
            CircuitType::Membership => "membership",
            CircuitType::Structure => "structure",
            CircuitType::SelectiveReveal => "selective_reveal",
            CircuitType::Version => "version",
            CircuitType::Locker => "locker",
        }
    }

    /// Single-byte code for the binary envelope framing.
    pub fn code(self) -> u8 {
        match self {
            CircuitType::Membership => 1,
            CircuitType::Structure => 2,
            CircuitType::SelectiveReveal => 3,
            CircuitType::Version => 4,
            CircuitType::Locker => 5,
        }
    }

    /// Inverse of [`Self::code`].
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(CircuitType::Membership),
            2 => Some(CircuitType::Structure),
            3 => Some(CircuitType::SelectiveReveal),
            4 => Some(CircuitType::Version),
            5 => Some(CircuitType::Locker),
            _ => None,
        }
    }

    /// Number of public signals this circuit declares, in allocation
    /// order. Envelopes with any other count are malformed.
    pub fn public_signal_count(self) -> usize {
        match self {
            CircuitType::Membership => 2,
            CircuitType::Structure => 3,
            CircuitType::SelectiveReveal => 2 + FIELD_SLOTS,
            CircuitType::Version => 4,
            CircuitType::Locker => 3,
        }
    }
}

impl std::fmt::Display for CircuitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
