//! # Proof Envelope
//!
//! The only artifact that crosses the system boundary: a circuit tag, the
//! key version the proof was generated under, the Groth16 proof bytes
//! (compressed canonical encoding), and the ordered public signals.
//!
//! Two wire forms, both byte-exact under round-trip:
//! - **JSON** — hex-encoded proof bytes and signals, for registries and
//!   wallets that speak JSON.
//! - **Binary** — a small framed encoding (`ZAP` magic + format version)
//!   for compact transport and storage.

use ark_bn254::{Bn254, Fr};
use ark_ff::{BigInteger, PrimeField};
use ark_groth16::Proof;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::{Deserialize, Serialize};

use zap_core::field::serde_hex_vec;

use crate::circuits::CircuitType;
use crate::error::ZkpError;

/// Binary envelope framing: magic bytes followed by a format version.
const MAGIC: [u8; 3] = *b"ZAP";
const FORMAT_VERSION: u8 = 1;

/// A sealed proof plus everything a verifier needs to check it.
///
/// Proofs are immutable, append-only artifacts: generated, serialized,
/// verified — never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofEnvelope {
    /// Which circuit this proof satisfies.
    pub circuit_type: CircuitType,
    /// Key version the proof was generated under. Verifiers holding a
    /// different version must reject, not reinterpret.
    pub key_version: u32,
    /// Compressed canonical Groth16 proof bytes.
    #[serde(with = "hex::serde")]
    pub proof_bytes: Vec<u8>,
    /// Public signals in the circuit's declared order.
    #[serde(with = "serde_hex_vec")]
    pub public_signals: Vec<Fr>,
}

impl ProofEnvelope {
    /// Seal a freshly generated proof into its envelope.
    pub fn seal(
        circuit_type: CircuitType,
        key_version: u32,
        proof: &Proof<Bn254>,
        public_signals: Vec<Fr>,
    ) -> Result<Self, ZkpError> {
        let mut proof_bytes = Vec::new();
        proof.serialize_compressed(&mut proof_bytes)?;
        Ok(Self {
            circuit_type,
            key_version,
            proof_bytes,
            public_signals,
        })
    }

    /// Decode the Groth16 proof. A failure here is a malformed envelope,
    /// not an invalid proof.
    pub fn proof(&self) -> Result<Proof<Bn254>, ZkpError> {
        Proof::deserialize_compressed(self.proof_bytes.as_slice())
            .map_err(|e| ZkpError::MalformedInput(format!("proof bytes: {e}")))
    }

    /// JSON wire form.
    pub fn to_json(&self) -> Result<String, ZkpError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the JSON wire form.
    pub fn from_json(raw: &str) -> Result<Self, ZkpError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Framed binary wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            MAGIC.len() + 2 + 4 + 4 + self.proof_bytes.len() + 4 + 32 * self.public_signals.len(),
        );
        out.extend_from_slice(&MAGIC);
        out.push(FORMAT_VERSION);
        out.push(self.circuit_type.code());
        out.extend_from_slice(&self.key_version.to_le_bytes());
        out.extend_from_slice(&(self.proof_bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.proof_bytes);
        out.extend_from_slice(&(self.public_signals.len() as u32).to_le_bytes());
        for signal in &self.public_signals {
            out.extend_from_slice(&signal.into_bigint().to_bytes_be());
        }
        out
    }

    /// Parse the framed binary wire form. Every structural defect is
    /// [`ZkpError::MalformedInput`].
    pub fn from_bytes(raw: &[u8]) -> Result<Self, ZkpError> {
        let mut cursor = Cursor { raw, offset: 0 };

        let magic = cursor.take(3)?;
        if magic != MAGIC {
            return Err(ZkpError::MalformedInput("bad envelope magic".to_string()));
        }
        let format = cursor.take_u8()?;
        if format != FORMAT_VERSION {
            return Err(ZkpError::MalformedInput(format!(
                "unsupported envelope format version {format}"
            )));
        }
        let circuit_type = CircuitType::from_code(cursor.take_u8()?).ok_or_else(|| {
            ZkpError::MalformedInput("unknown circuit type code".to_string())
        })?;
        let key_version = cursor.take_u32()?;

        let proof_len = cursor.take_u32()? as usize;
        let proof_bytes = cursor.take(proof_len)?.to_vec();

        let signal_count = cursor.take_u32()? as usize;
        let mut public_signals = Vec::with_capacity(signal_count);
        for _ in 0..signal_count {
            let chunk = cursor.take(32)?;
            let signal = Fr::from_be_bytes_mod_order(chunk);
            // Reject non-canonical encodings instead of silently reducing.
            if signal.into_bigint().to_bytes_be() != chunk {
                return Err(ZkpError::MalformedInput(
                    "non-canonical public signal".to_string(),
                ));
            }
            public_signals.push(signal);
        }
        if cursor.offset != raw.len() {
            return Err(ZkpError::MalformedInput(format!(
                "{} trailing bytes after envelope",
                raw.len() - cursor.offset
            )));
        }

        Ok(Self {
            circuit_type,
            key_version,
            proof_bytes,
            public_signals,
        })
    }
}

struct Cursor<'a> {
    raw: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], ZkpError> {
        let end = self.offset.checked_add(len).ok_or_else(|| {
            ZkpError::MalformedInput("envelope length overflow".to_string())
        })?;
        if end > self.raw.len() {
            return Err(ZkpError::MalformedInput(format!(
                "truncated envelope: wanted {len} bytes at offset {}",
                self.offset
            )));
        }
        let chunk = &self.raw[self.offset..end];
        self.offset = end;
        Ok(chunk)
    }

    fn take_u8(&mut self) -> Result<u8, ZkpError> {
        Ok(self.take(1)?[0])
    }

    fn take_u32(&mut self) -> Result<u32, ZkpError> {
        let chunk = self.take(4)?;
        Ok(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProofEnvelope {
        // Envelope-layer tests don't need a real proof; opaque bytes
        // exercise the framing the same way.
        ProofEnvelope {
            circuit_type: CircuitType::SelectiveReveal,
            key_version: 3,
            proof_bytes: vec![0xde, 0xad, 0xbe, 0xef, 0x01],
            public_signals: vec![Fr::from(1u64), Fr::from(999_999u64)],
        }
    }

    #[test]
    fn json_round_trip_is_exact() {
        let envelope = sample();
        let json = envelope.to_json().unwrap();
        let back = ProofEnvelope::from_json(&json).unwrap();
        assert_eq!(back, envelope);
        // Hex fields, not number arrays.
        assert!(json.contains("deadbeef01"));
        assert!(json.contains("selective_reveal"));
    }

    #[test]
    fn binary_round_trip_is_exact() {
        let envelope = sample();
        let bytes = envelope.to_bytes();
        let back = ProofEnvelope::from_bytes(&bytes).unwrap();
        assert_eq!(back, envelope);
        // Re-serializing reproduces the identical bytes.
        assert_eq!(back.to_bytes(), bytes);
    }

    #[test]
    fn bad_magic_rejected() {
        let mut bytes = sample().to_bytes();
        bytes[0] = b'X';
        assert!(matches!(
            ProofEnvelope::from_bytes(&bytes),
            Err(ZkpError::MalformedInput(_))
        ));
    }

    #[test]
    fn unknown_circuit_code_rejected() {
        let mut bytes = sample().to_bytes();
        bytes[4] = 99;
        assert!(ProofEnvelope::from_bytes(&bytes).is_err());
    }

    #[test]
    fn truncation_rejected() {
        let bytes = sample().to_bytes();
        for cut in [0, 3, 8, bytes.len() - 1] {
            assert!(
                ProofEnvelope::from_bytes(&bytes[..cut]).is_err(),
                "cut at {cut} must fail"
            );
        }
    }

    #[test]
    fn trailing_garbage_rejected() {
        let mut bytes = sample().to_bytes();
        bytes.push(0);
        assert!(ProofEnvelope::from_bytes(&bytes).is_err());
    }

    #[test]
    fn non_canonical_signal_rejected() {
        let envelope = ProofEnvelope {
            public_signals: vec![Fr::from(5u64)],
            ..sample()
        };
        let mut bytes = envelope.to_bytes();
        // Overwrite the signal with the field modulus + 5 pattern: all-ff
        // is far above the modulus.
        let signal_start = bytes.len() - 32;
        for b in &mut bytes[signal_start..] {
            *b = 0xff;
        }
        assert!(matches!(
            ProofEnvelope::from_bytes(&bytes),
            Err(ZkpError::MalformedInput(_))
        ));
    }

    #[test]
    fn malformed_proof_bytes_surface_on_decode() {
        let envelope = sample();
        assert!(matches!(
            envelope.proof(),
            Err(ZkpError::MalformedInput(_))
        ));
    }
}
