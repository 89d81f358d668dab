//! # Field-Element Encoding
//!
//! Conversions between bytes, lowercase hex, and the BN254 scalar field
//! `Fr`. Every value that crosses a serialization boundary (proof
//! envelopes, accumulator exports, key metadata) travels as 64 lowercase
//! hex chars, big-endian — the same wire shape the rest of the stack uses
//! for digests.
//!
//! Decoding is strict: a hex string must decode to a value below the field
//! modulus, otherwise it is rejected as non-canonical rather than silently
//! reduced. Reduction is only performed by [`field_from_bytes`] and
//! [`hash_to_field`], whose contracts say so explicitly.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use sha2::{Digest, Sha256};

use crate::error::CoreError;

/// Encode a field element as 64 lowercase hex chars (big-endian).
pub fn field_to_hex(value: &Fr) -> String {
    hex::encode(value.into_bigint().to_bytes_be())
}

/// Decode a field element from 64 hex chars (optionally `0x`-prefixed).
///
/// Rejects strings of the wrong length, strings with non-hex characters,
/// and encodings of values at or above the field modulus. This keeps the
/// hex form canonical: `field_from_hex(field_to_hex(x)) == x` and no two
/// distinct strings decode to the same element.
pub fn field_from_hex(input: &str) -> Result<Fr, CoreError> {
    let stripped = input
        .trim()
        .strip_prefix("0x")
        .or_else(|| input.trim().strip_prefix("0X"))
        .unwrap_or_else(|| input.trim());

    if stripped.len() != 64 {
        return Err(CoreError::InvalidHex {
            value: input.to_string(),
            reason: format!("expected 64 hex chars, got {}", stripped.len()),
        });
    }
    let bytes = hex::decode(stripped).map_err(|e| CoreError::InvalidHex {
        value: input.to_string(),
        reason: e.to_string(),
    })?;

    let value = Fr::from_be_bytes_mod_order(&bytes);
    // Round-trip equality holds iff the encoding was already canonical.
    if field_to_hex(&value) != stripped.to_lowercase() {
        return Err(CoreError::NonCanonicalFieldElement(input.to_string()));
    }
    Ok(value)
}

/// Interpret arbitrary bytes as a field element, reducing modulo the field
/// order. Big-endian. Lossy for inputs of 32 bytes or more; callers that
/// need injectivity should go through [`hash_to_field`].
pub fn field_from_bytes(bytes: &[u8]) -> Fr {
    Fr::from_be_bytes_mod_order(bytes)
}

/// Map arbitrary bytes into the scalar field via SHA-256.
///
/// This is the off-circuit bridge from opaque byte strings (PID
/// components, facility labels) into field elements. SHA-256 is never
/// used inside a circuit — the in-circuit hash is Poseidon throughout —
/// so this function only appears on the witness-construction side.
pub fn hash_to_field(bytes: &[u8]) -> Fr {
    let digest = Sha256::digest(bytes);
    Fr::from_be_bytes_mod_order(&digest)
}

/// Serde adapter for a single `Fr` encoded as hex.
///
/// ```ignore
/// #[serde(with = "zap_core::field::serde_hex")]
/// root: Fr,
/// ```
pub mod serde_hex {
    use ark_bn254::Fr;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize an `Fr` as 64 lowercase hex chars.
    pub fn serialize<S: Serializer>(value: &Fr, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::field_to_hex(value))
    }

    /// Deserialize an `Fr` from canonical hex.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fr, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::field_from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Vec<Fr>` encoded as a list of hex strings.
pub mod serde_hex_vec {
    use ark_bn254::Fr;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a field-element list as hex strings.
    pub fn serialize<S: Serializer>(values: &[Fr], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|v| super::field_to_hex(v)))
    }

    /// Deserialize a field-element list from canonical hex strings.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Fr>, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|s| super::field_from_hex(s).map_err(serde::de::Error::custom))
            .collect()
    }
}
