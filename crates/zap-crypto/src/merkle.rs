//! # Fixed-Depth Merkle Accumulator
//!
//! An incremental binary Merkle tree over Poseidon leaf hashes. The depth
//! is fixed at construction and bounds the set size at `2^depth`; empty
//! positions are padded with a precomputed empty-subtree hash chain
//! (`zeros[0] = 0`, `zeros[l+1] = H(zeros[l], zeros[l])`), so the root of
//! a partially filled tree is well defined and deterministic in leaf
//! order.
//!
//! Only occupied node prefixes are stored per level; sibling lookups fall
//! back to the zeros chain. Insert/update/remove recompute the touched
//! path only (O(depth)).
//!
//! Removal writes the empty-leaf hash into the slot. Slots are not
//! reused: the fixed depth bounds total insertions, not live leaves.
//! Because real leaves are Poseidon outputs, the zero empty-leaf value
//! never collides with one.

use ark_bn254::Fr;
use ark_ff::Zero;
use serde::{Deserialize, Serialize};

use zap_core::field::{field_to_hex, serde_hex, serde_hex_vec};

use crate::error::CryptoError;
use crate::poseidon::node_hash;

/// Minimum supported tree depth.
pub const MIN_TREE_DEPTH: usize = 1;

/// Maximum supported tree depth (2^32 leaves).
pub const MAX_TREE_DEPTH: usize = 32;

/// A membership witness: the sibling path and direction bits that carry a
/// leaf to a root, plus the root and index it was generated against.
///
/// A witness is a snapshot. After the tree changes it keeps referring to
/// the root recorded here — a *historical* root, not the current one —
/// and verifiers must be handed that root explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipWitness {
    /// The leaf being proven.
    #[serde(with = "serde_hex")]
    pub leaf: Fr,
    /// Position of the leaf in the tree.
    pub leaf_index: usize,
    /// Sibling hash at each level, leaf level first.
    #[serde(with = "serde_hex_vec")]
    pub path_elements: Vec<Fr>,
    /// Direction bit per level: `true` when the current node is the right
    /// child (sibling on the left).
    pub path_indices: Vec<bool>,
    /// The root this witness was generated against.
    #[serde(with = "serde_hex")]
    pub root: Fr,
}

impl MembershipWitness {
    /// Tree depth this witness spans.
    pub fn depth(&self) -> usize {
        self.path_elements.len()
    }

    /// Recompute the root implied by the leaf and path.
    pub fn compute_root(&self) -> Fr {
        let mut current = self.leaf;
        for (sibling, is_right) in self.path_elements.iter().zip(&self.path_indices) {
            current = if *is_right {
                node_hash(sibling, &current)
            } else {
                node_hash(&current, sibling)
            };
        }
        current
    }

    /// Whether the path hashes to the recorded root.
    pub fn verify(&self) -> bool {
        self.compute_root() == self.root
    }
}

/// Fixed-depth incremental Merkle tree.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    depth: usize,
    /// `levels[0]` is the occupied leaf prefix; `levels[depth]` holds the
    /// root when any leaf is present.
    levels: Vec<Vec<Fr>>,
    /// Empty-subtree hash per level, `zeros[0]` being the empty leaf.
    zeros: Vec<Fr>,
    /// Number of occupied leaf slots (including removed slots).
    size: usize,
}

impl MerkleTree {
    /// Create an empty tree of the given depth.
    pub fn new(depth: usize) -> Result<Self, CryptoError> {
        if !(MIN_TREE_DEPTH..=MAX_TREE_DEPTH).contains(&depth) {
            return Err(CryptoError::DepthOutOfRange(depth));
        }
        let mut zeros = Vec::with_capacity(depth + 1);
        zeros.push(Fr::zero());
        for level in 0..depth {
            let below = zeros[level];
            zeros.push(node_hash(&below, &below));
        }
        Ok(Self {
            depth,
            levels: vec![Vec::new(); depth + 1],
            zeros,
            size: 0,
        })
    }

    /// Build a tree of the given depth from an ordered leaf list.
    ///
    /// Deterministic in leaf order; positions beyond `leaves.len()` are
    /// padding. Exceeding `2^depth` leaves is a hard error.
    pub fn build(depth: usize, leaves: &[Fr]) -> Result<Self, CryptoError> {
        let mut tree = Self::new(depth)?;
        if leaves.len() > tree.capacity() {
            return Err(CryptoError::CapacityExceeded { depth });
        }
        for leaf in leaves {
            tree.insert(*leaf)?;
        }
        Ok(tree)
    }

    /// Fixed depth of this tree.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Maximum number of leaf slots.
    pub fn capacity(&self) -> usize {
        1usize << self.depth
    }

    /// Number of occupied leaf slots.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether no leaf has ever been inserted.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The current root. Changes iff the leaf set changes.
    pub fn root(&self) -> Fr {
        self.levels[self.depth]
            .first()
            .copied()
            .unwrap_or(self.zeros[self.depth])
    }

    /// The occupied leaf prefix, for export/rebuild.
    pub fn leaves(&self) -> &[Fr] {
        &self.levels[0]
    }

    /// Append a leaf, returning its index. Fails when the tree is full.
    pub fn insert(&mut self, leaf: Fr) -> Result<usize, CryptoError> {
        if self.size == self.capacity() {
            return Err(CryptoError::CapacityExceeded { depth: self.depth });
        }
        let index = self.size;
        self.levels[0].push(leaf);
        self.size += 1;
        self.recompute_path(index);
        Ok(index)
    }

    /// Replace the leaf at `index`, recomputing the touched path.
    pub fn update(&mut self, index: usize, leaf: Fr) -> Result<(), CryptoError> {
        if index >= self.size {
            return Err(CryptoError::IndexOutOfRange {
                index,
                size: self.size,
            });
        }
        self.levels[0][index] = leaf;
        self.recompute_path(index);
        Ok(())
    }

    /// Remove the leaf at `index` by writing the empty-leaf hash. The slot
    /// stays occupied; the root changes.
    pub fn remove(&mut self, index: usize) -> Result<(), CryptoError> {
        let empty = self.zeros[0];
        self.update(index, empty)
    }

    /// Produce a membership witness for the leaf at `index`, bound to the
    /// current root.
    pub fn prove_index(&self, index: usize) -> Result<MembershipWitness, CryptoError> {
        if index >= self.size {
            return Err(CryptoError::IndexOutOfRange {
                index,
                size: self.size,
            });
        }
        let mut path_elements = Vec::with_capacity(self.depth);
        let mut path_indices = Vec::with_capacity(self.depth);
        let mut position = index;
        for level in 0..self.depth {
            let sibling_pos = position ^ 1;
            let sibling = self.levels[level]
                .get(sibling_pos)
                .copied()
                .unwrap_or(self.zeros[level]);
            path_elements.push(sibling);
            path_indices.push(position & 1 == 1);
            position >>= 1;
        }
        Ok(MembershipWitness {
            leaf: self.levels[0][index],
            leaf_index: index,
            path_elements,
            path_indices,
            root: self.root(),
        })
    }

    /// Produce a membership witness for a specific leaf value.
    ///
    /// Fails with [`CryptoError::LeafNotFound`] if the leaf is absent
    /// (including leaves that were removed).
    pub fn prove_membership(&self, leaf: &Fr) -> Result<MembershipWitness, CryptoError> {
        let index = self.levels[0][..self.size]
            .iter()
            .position(|candidate| candidate == leaf)
            .ok_or_else(|| CryptoError::LeafNotFound {
                leaf_hex: field_to_hex(leaf),
            })?;
        self.prove_index(index)
    }

    /// Recompute hashes along the path from leaf `index` to the root.
    fn recompute_path(&mut self, index: usize) {
        let mut position = index;
        for level in 0..self.depth {
            let left_pos = position & !1;
            let left = self.node_at(level, left_pos);
            let right = self.node_at(level, left_pos + 1);
            let parent = node_hash(&left, &right);
            let parent_pos = position >> 1;
            if self.levels[level + 1].len() <= parent_pos {
                self.levels[level + 1].resize(parent_pos + 1, self.zeros[level + 1]);
            }
            self.levels[level + 1][parent_pos] = parent;
            position = parent_pos;
        }
    }

    /// Node value at a level, falling back to the zeros chain for
    /// never-written positions.
    fn node_at(&self, level: usize, position: usize) -> Fr {
        self.levels[level]
            .get(position)
            .copied()
            .unwrap_or(self.zeros[level])
    }
}
