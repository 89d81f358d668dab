//! # Shared R1CS Gadgets
//!
//! The in-circuit counterparts of `zap-crypto`'s native hashing: a
//! domain-tagged Poseidon sponge and the Merkle path walk. Both sides
//! absorb the tag first, then each element in order — change one and you
//! must change the other.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::constraints::CryptographicSpongeVar;
use ark_crypto_primitives::sponge::poseidon::constraints::PoseidonSpongeVar;
use ark_r1cs_std::boolean::Boolean;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use zap_crypto::poseidon::{domain, poseidon_config};

/// Domain-tagged Poseidon hash of field variables.
///
/// Mirrors `zap_crypto::poseidon`: absorb `tag`, absorb each input,
/// squeeze one element.
pub fn poseidon_hash_var(
    cs: ConstraintSystemRef<Fr>,
    tag: u64,
    inputs: &[FpVar<Fr>],
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut sponge = PoseidonSpongeVar::new(cs, poseidon_config());
    sponge.absorb(&FpVar::constant(Fr::from(tag)))?;
    for input in inputs {
        sponge.absorb(input)?;
    }
    let mut out = sponge.squeeze_field_elements(1)?;
    Ok(out.remove(0))
}

/// Leaf hash of an identifier digest, `H(LEAF, id)`.
pub fn leaf_hash_var(
    cs: ConstraintSystemRef<Fr>,
    identifier: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    poseidon_hash_var(cs, domain::LEAF, &[identifier.clone()])
}

/// Walk a Merkle path from a leaf to the implied root.
///
/// Each level selects the (left, right) child ordering from the direction
/// bit with an affine two-way select — a pure arithmetic expression, no
/// branching — then hashes `H(NODE, left, right)`.
pub fn merkle_root_var(
    cs: ConstraintSystemRef<Fr>,
    leaf: &FpVar<Fr>,
    path_elements: &[FpVar<Fr>],
    path_indices: &[Boolean<Fr>],
) -> Result<FpVar<Fr>, SynthesisError> {
    debug_assert_eq!(path_elements.len(), path_indices.len());
    let mut current = leaf.clone();
    for (sibling, is_right) in path_elements.iter().zip(path_indices) {
        // is_right: the current node is the right child, sibling the left.
        let left = FpVar::conditionally_select(is_right, sibling, &current)?;
        let right = FpVar::conditionally_select(is_right, &current, sibling)?;
        current = poseidon_hash_var(cs.clone(), domain::NODE, &[left, right])?;
    }
    Ok(current)
}
