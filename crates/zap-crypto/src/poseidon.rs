//! # Poseidon Hashing
//!
//! The single algebraic hash used throughout the stack, both natively and
//! inside circuits. Parameters are generated deterministically for the
//! BN254 scalar field (rate 2, capacity 1, alpha 5, 8 full / 57 partial
//! rounds) via the Grain LFSR procedure shipped with
//! `ark-crypto-primitives`, so the prover's native evaluation and the
//! in-circuit sponge gadget are the same function by construction.
//!
//! ## Domain Separation
//!
//! Every use site absorbs a leading domain tag (cf. the 0x00/0x01 leaf and
//! node prefixes of classic Merkle constructions): a leaf hash can never
//! collide with a node hash or a commitment over the same field elements.
//!
//! ## Arity
//!
//! The hash has a declared arity cap, [`MAX_HASH_ARITY`]. Passing more
//! inputs is an error raised before any absorption — never a truncation.
//! Fixed-arity helpers ([`leaf_hash`], [`node_hash`]) are infallible
//! because their arity is correct by construction.

use std::sync::OnceLock;

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::{
    find_poseidon_ark_and_mds, PoseidonConfig, PoseidonSponge,
};
use ark_crypto_primitives::sponge::{CryptographicSponge, FieldBasedCryptographicSponge};
use ark_ff::PrimeField;

use crate::error::CryptoError;

/// Declared maximum number of payload inputs to a single hash invocation.
pub const MAX_HASH_ARITY: usize = 16;

const FULL_ROUNDS: u64 = 8;
const PARTIAL_ROUNDS: u64 = 57;
const ALPHA: u64 = 5;
const RATE: usize = 2;
const CAPACITY: usize = 1;

/// Domain tags, absorbed ahead of the payload.
pub mod domain {
    /// Accumulator leaf: `H(LEAF, identifier_digest)`.
    pub const LEAF: u64 = 1;
    /// Internal tree node: `H(NODE, left, right)`.
    pub const NODE: u64 = 2;
    /// Field commitment: `H(COMMIT, fields.., salt)`.
    pub const COMMIT: u64 = 3;
    /// Ownership link tag: `H(LINK, secret, nonce)`.
    pub const LINK: u64 = 4;
    /// Locker access token: `H(ACCESS, locker, facility, nonce)`.
    pub const ACCESS: u64 = 5;
}

/// The shared Poseidon parameterization over BN254 `Fr`.
///
/// Generated once per process and cached; the circuits in `zap-zkp` embed
/// the same configuration as constants, which is what makes on- and
/// off-circuit hashing agree.
pub fn poseidon_config() -> &'static PoseidonConfig<Fr> {
    static CONFIG: OnceLock<PoseidonConfig<Fr>> = OnceLock::new();
    CONFIG.get_or_init(|| {
        let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
            Fr::MODULUS_BIT_SIZE as u64,
            RATE,
            FULL_ROUNDS,
            PARTIAL_ROUNDS,
            0,
        );
        PoseidonConfig::new(
            FULL_ROUNDS as usize,
            PARTIAL_ROUNDS as usize,
            ALPHA,
            mds,
            ark,
            RATE,
            CAPACITY,
        )
    })
}

/// Absorb elements one at a time and squeeze a single output.
///
/// The in-circuit gadget mirrors this exact absorption order; do not batch
/// or reorder here without changing the gadget to match.
fn sponge_hash(inputs: &[Fr]) -> Fr {
    let mut sponge = PoseidonSponge::<Fr>::new(poseidon_config());
    for input in inputs {
        sponge.absorb(input);
    }
    sponge.squeeze_native_field_elements(1)[0]
}

/// Hash a domain tag followed by up to [`MAX_HASH_ARITY`] payload elements.
pub fn hash_with_domain(tag: u64, inputs: &[Fr]) -> Result<Fr, CryptoError> {
    if inputs.len() > MAX_HASH_ARITY {
        return Err(CryptoError::ArityExceeded {
            got: inputs.len(),
            max: MAX_HASH_ARITY,
        });
    }
    let mut elems = Vec::with_capacity(inputs.len() + 1);
    elems.push(Fr::from(tag));
    elems.extend_from_slice(inputs);
    Ok(sponge_hash(&elems))
}

/// Variadic hash without a caller-visible domain (uses [`domain::COMMIT`]).
///
/// Exposed for callers that build their own commitment-shaped values;
/// circuit-facing code should prefer the specific helpers.
pub fn hash_fields(inputs: &[Fr]) -> Result<Fr, CryptoError> {
    hash_with_domain(domain::COMMIT, inputs)
}

/// Fixed-arity domain hash for crate-internal call sites whose input count
/// is correct by construction.
pub(crate) fn domain_hash(tag: u64, inputs: &[Fr]) -> Fr {
    let mut elems = Vec::with_capacity(inputs.len() + 1);
    elems.push(Fr::from(tag));
    elems.extend_from_slice(inputs);
    sponge_hash(&elems)
}

/// Accumulator leaf hash of an identifier digest.
pub fn leaf_hash(value: &Fr) -> Fr {
    sponge_hash(&[Fr::from(domain::LEAF), *value])
}

/// Internal node hash of two children.
pub fn node_hash(left: &Fr, right: &Fr) -> Fr {
    sponge_hash(&[Fr::from(domain::NODE), *left, *right])
}
