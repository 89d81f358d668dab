//! # Cryptographic Error Types
//!
//! Structured errors for all cryptographic operations in `zap-crypto`.
//! Uses `thiserror` for ergonomic error definitions with diagnostic context.
//!
//! The recoverable/fatal split matters to callers: [`CryptoError::StaleRoot`]
//! means "re-fetch a fresh witness and retry", while capacity and arity
//! violations are caller bugs rejected before any hashing happens.

use thiserror::Error;

/// Errors from cryptographic operations in the ZAP Stack.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// More inputs were passed to the hash than its declared arity allows.
    /// Rejected before any absorption — never a silent truncation.
    #[error("hash arity exceeded: {got} inputs (declared maximum {max})")]
    ArityExceeded {
        /// Number of inputs supplied.
        got: usize,
        /// The declared arity cap.
        max: usize,
    },

    /// Tree depth outside the supported range.
    #[error("tree depth {0} out of range (expected {min}..={max})",
        min = crate::merkle::MIN_TREE_DEPTH,
        max = crate::merkle::MAX_TREE_DEPTH)]
    DepthOutOfRange(usize),

    /// The tree is full; its fixed depth bounds the leaf count.
    #[error("accumulator capacity exceeded: 2^{depth} leaves already present")]
    CapacityExceeded {
        /// The fixed tree depth.
        depth: usize,
    },

    /// The requested leaf is not present in the tree.
    #[error("leaf not found in accumulator: {leaf_hex}")]
    LeafNotFound {
        /// Hex encoding of the absent leaf.
        leaf_hex: String,
    },

    /// Leaf index beyond the number of occupied positions.
    #[error("leaf index {index} out of range (tree has {size} leaves)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of occupied leaf positions.
        size: usize,
    },

    /// A witness refers to a root this accumulator no longer recognizes.
    /// Recoverable: the caller should fetch a fresh witness.
    #[error("stale accumulator root: {root_hex} (not current and outside retained history)")]
    StaleRoot {
        /// Hex encoding of the unrecognized root.
        root_hex: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_error_names_both_counts() {
        let msg = format!("{}", CryptoError::ArityExceeded { got: 20, max: 16 });
        assert!(msg.contains("20"));
        assert!(msg.contains("16"));
    }

    #[test]
    fn depth_error_names_bounds() {
        let msg = format!("{}", CryptoError::DepthOutOfRange(40));
        assert!(msg.contains("40"));
        assert!(msg.contains("1..=32"));
    }

    #[test]
    fn stale_root_error_carries_root() {
        let err = CryptoError::StaleRoot {
            root_hex: "ab".repeat(32),
        };
        assert!(format!("{err}").contains(&"ab".repeat(32)));
    }
}
