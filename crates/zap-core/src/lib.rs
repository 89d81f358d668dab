//! # zap-core — Domain Primitives for the ZAP Stack
//!
//! This crate provides the foundation types used throughout the workspace:
//!
//! - **[`Pid`]** — a validated hierarchical address identifier
//!   (country → admin levels → locality → unit). The PID is the unit of
//!   privacy: it is hashed into the scalar field before it touches any
//!   circuit and never appears among public signals.
//! - **Field-element encoding** — conversions between bytes, lowercase hex,
//!   and the BN254 scalar field, plus serde adapters for envelopes.
//! - **Error hierarchy** — structured validation errors built with
//!   `thiserror`.
//!
//! Everything cryptographic (hashing, commitments, Merkle accumulation,
//! circuits) lives in `zap-crypto` and `zap-zkp`; this crate stays free of
//! proof-system dependencies so that API consumers can depend on it cheaply.

pub mod error;
pub mod field;
pub mod pid;

// Re-export primary types.
pub use error::CoreError;
pub use field::{field_from_bytes, field_from_hex, field_to_hex, hash_to_field};
pub use pid::{Pid, MAX_PID_DEPTH, MIN_PID_DEPTH};
