//! # Accumulator Service
//!
//! The owning wrapper around a [`MerkleTree`]. All mutation goes through
//! this service under a single write lock — path recomputation reads and
//! writes overlapping nodes, so concurrent writers are serialized here
//! rather than trusted to interleave. Readers take consistent snapshots:
//! a witness handed out mid-update is internally consistent and tagged
//! with the root it was generated against.
//!
//! Superseded roots are retained in a bounded history. A proof bound to a
//! recent root stays classifiable as *historical* after updates; only a
//! root that was never produced here (or has aged out) is *unknown* and
//! reported as stale.

use std::collections::VecDeque;

use ark_bn254::Fr;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use zap_core::field::{field_to_hex, serde_hex, serde_hex_vec};

use crate::error::CryptoError;
use crate::merkle::{MembershipWitness, MerkleTree};

/// Default number of superseded roots retained.
pub const DEFAULT_ROOT_HISTORY: usize = 100;

/// How a root relates to this accumulator's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootStatus {
    /// The root of the tree as it stands.
    Current,
    /// A superseded root still within the retained history. Witnesses
    /// against it refer to a historical state, not an error.
    Historical,
    /// Never produced here, or aged out of history.
    Unknown,
}

/// Public snapshot of an accumulator: everything a verifier-side party
/// needs, plus the leaves for a full rebuild by the owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccumulatorExport {
    /// Current root.
    #[serde(with = "serde_hex")]
    pub root: Fr,
    /// Fixed tree depth.
    pub depth: usize,
    /// Occupied leaf count.
    pub size: usize,
    /// Occupied leaf prefix, in insertion order.
    #[serde(with = "serde_hex_vec")]
    pub leaves: Vec<Fr>,
}

struct State {
    tree: MerkleTree,
    /// Superseded roots, most recent first.
    history: VecDeque<Fr>,
    history_limit: usize,
}

impl State {
    fn retire_root(&mut self, root: Fr) {
        self.history.push_front(root);
        self.history.truncate(self.history_limit);
    }
}

/// Single-writer accumulator service.
pub struct AccumulatorService {
    state: RwLock<State>,
}

impl AccumulatorService {
    /// Create an empty accumulator of the given depth.
    pub fn new(depth: usize) -> Result<Self, CryptoError> {
        Ok(Self::wrap(MerkleTree::new(depth)?))
    }

    /// Create an accumulator pre-populated with an ordered leaf list.
    pub fn from_leaves(depth: usize, leaves: &[Fr]) -> Result<Self, CryptoError> {
        Ok(Self::wrap(MerkleTree::build(depth, leaves)?))
    }

    /// Rebuild from an export, verifying that the rebuilt root matches the
    /// exported one.
    pub fn import(export: &AccumulatorExport) -> Result<Self, CryptoError> {
        let tree = MerkleTree::build(export.depth, &export.leaves)?;
        if tree.root() != export.root {
            return Err(CryptoError::StaleRoot {
                root_hex: field_to_hex(&export.root),
            });
        }
        Ok(Self::wrap(tree))
    }

    fn wrap(tree: MerkleTree) -> Self {
        Self {
            state: RwLock::new(State {
                tree,
                history: VecDeque::new(),
                history_limit: DEFAULT_ROOT_HISTORY,
            }),
        }
    }

    /// Override the retained-history bound.
    pub fn with_history_limit(self, limit: usize) -> Self {
        {
            let mut state = self.state.write();
            state.history_limit = limit;
            state.history.truncate(limit);
        }
        self
    }

    /// Current root.
    pub fn root(&self) -> Fr {
        self.state.read().tree.root()
    }

    /// Fixed depth.
    pub fn depth(&self) -> usize {
        self.state.read().tree.depth()
    }

    /// Occupied leaf count.
    pub fn len(&self) -> usize {
        self.state.read().tree.len()
    }

    /// Whether no leaf has ever been inserted.
    pub fn is_empty(&self) -> bool {
        self.state.read().tree.is_empty()
    }

    /// Insert a leaf. Returns its index and the new root.
    pub fn insert(&self, leaf: Fr) -> Result<(usize, Fr), CryptoError> {
        let mut state = self.state.write();
        let old_root = state.tree.root();
        let index = state.tree.insert(leaf)?;
        state.retire_root(old_root);
        let root = state.tree.root();
        tracing::debug!(index, root = %field_to_hex(&root), "accumulator insert");
        Ok((index, root))
    }

    /// Replace the leaf at `index`. Returns the new root.
    pub fn update(&self, index: usize, leaf: Fr) -> Result<Fr, CryptoError> {
        let mut state = self.state.write();
        let old_root = state.tree.root();
        state.tree.update(index, leaf)?;
        state.retire_root(old_root);
        let root = state.tree.root();
        tracing::debug!(index, root = %field_to_hex(&root), "accumulator update");
        Ok(root)
    }

    /// Remove the leaf at `index`. Returns the new root.
    pub fn remove(&self, index: usize) -> Result<Fr, CryptoError> {
        let mut state = self.state.write();
        let old_root = state.tree.root();
        state.tree.remove(index)?;
        state.retire_root(old_root);
        let root = state.tree.root();
        tracing::debug!(index, root = %field_to_hex(&root), "accumulator remove");
        Ok(root)
    }

    /// Witness for a leaf value against a consistent snapshot. The witness
    /// records the snapshot root; callers must pass that root (not
    /// "current") to verifiers.
    pub fn witness(&self, leaf: &Fr) -> Result<MembershipWitness, CryptoError> {
        self.state.read().tree.prove_membership(leaf)
    }

    /// Witness for a leaf index against a consistent snapshot.
    pub fn witness_for_index(&self, index: usize) -> Result<MembershipWitness, CryptoError> {
        self.state.read().tree.prove_index(index)
    }

    /// Classify a root against this accumulator's lifetime.
    pub fn root_status(&self, root: &Fr) -> RootStatus {
        let state = self.state.read();
        if state.tree.root() == *root {
            RootStatus::Current
        } else if state.history.contains(root) {
            RootStatus::Historical
        } else {
            RootStatus::Unknown
        }
    }

    /// Like [`Self::root_status`], but unknown roots become the
    /// recoverable [`CryptoError::StaleRoot`] — the caller should fetch a
    /// fresh witness.
    pub fn check_root(&self, root: &Fr) -> Result<RootStatus, CryptoError> {
        match self.root_status(root) {
            RootStatus::Unknown => Err(CryptoError::StaleRoot {
                root_hex: field_to_hex(root),
            }),
            status => Ok(status),
        }
    }

    /// Export the public snapshot plus leaves.
    pub fn export(&self) -> AccumulatorExport {
        let state = self.state.read();
        AccumulatorExport {
            root: state.tree.root(),
            depth: state.tree.depth(),
            size: state.tree.len(),
            leaves: state.tree.leaves().to_vec(),
        }
    }
}
