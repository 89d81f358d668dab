//! `zap verify` — proof verification.
//!
//! Loads the envelope, resolves key material for the envelope's own
//! `(circuit, version)` pair from the key store, applies the key policy,
//! and runs the pairing check. A valid proof exits 0, an invalid one
//! exits 2; structural problems are errors (exit 1).

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use zap_zkp::setup::{KeyPolicy, KeyStore};
use zap_zkp::{ProofEnvelope, Verifier};

/// Arguments for `zap verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Key store directory.
    #[arg(long)]
    pub keys_dir: PathBuf,

    /// Proof envelope JSON produced by `zap prove`.
    #[arg(long)]
    pub proof: PathBuf,

    /// Key policy: "production", "development", or "auto" (environment /
    /// build default).
    #[arg(long, default_value = "auto")]
    pub policy: String,
}

/// Verify a proof envelope.
pub fn run_verify(args: &VerifyArgs) -> anyhow::Result<u8> {
    let raw = std::fs::read_to_string(&args.proof)
        .with_context(|| format!("reading {}", args.proof.display()))?;
    let envelope = ProofEnvelope::from_json(&raw).context("parsing proof envelope")?;

    let store = KeyStore::new(&args.keys_dir);
    let keys = store
        .load(envelope.circuit_type, envelope.key_version)
        .with_context(|| {
            format!(
                "loading keys for {} v{}",
                envelope.circuit_type, envelope.key_version
            )
        })?;

    let policy = match args.policy.as_str() {
        "production" | "prod" => KeyPolicy::production(),
        "development" | "dev" => KeyPolicy::development(),
        "auto" => KeyPolicy::from_environment(),
        other => anyhow::bail!("unknown policy \"{other}\""),
    };
    policy.validate(&keys.metadata)?;

    let verifier = Verifier::new(std::sync::Arc::new(keys))?;
    if verifier.verify(&envelope)? {
        println!("accepted: {} proof, key v{}", envelope.circuit_type, envelope.key_version);
        Ok(0)
    } else {
        println!("rejected: {} proof fails verification", envelope.circuit_type);
        Ok(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;
    use std::sync::Arc;
    use zap_crypto::OwnerSecret;
    use zap_zkp::circuits::CircuitType;
    use zap_zkp::prover::{ProofRequest, Prover};
    use zap_zkp::setup::SetupCeremony;

    fn seeded_rng() -> impl rand_core::RngCore + rand_core::CryptoRng {
        use ark_std::rand::SeedableRng;
        ark_std::rand::rngs::StdRng::seed_from_u64(77)
    }

    #[test]
    fn end_to_end_verify_via_files() {
        let dir = tempfile::tempdir().unwrap();

        // Setup and save keys.
        let keys = SetupCeremony::single_party(&mut seeded_rng())
            .finalize(CircuitType::Version, 1)
            .unwrap();
        let store = KeyStore::new(dir.path().join("keys"));
        store.save(&keys).unwrap();

        // Prove and write the envelope.
        let prover = Prover::new(Arc::new(keys));
        let envelope = prover
            .prove(ProofRequest::Version {
                secret: OwnerSecret::from_bytes([4u8; 32]),
                old_pid: Fr::from(1u64),
                new_pid: Fr::from(2u64),
                nonce: Fr::from(3u64),
            })
            .unwrap();
        let proof_path = dir.path().join("proof.json");
        std::fs::write(&proof_path, envelope.to_json().unwrap()).unwrap();

        // Development policy accepts single-party keys.
        let args = VerifyArgs {
            keys_dir: dir.path().join("keys"),
            proof: proof_path.clone(),
            policy: "development".to_string(),
        };
        assert_eq!(run_verify(&args).unwrap(), 0);

        // Production policy refuses them outright.
        let strict = VerifyArgs {
            keys_dir: dir.path().join("keys"),
            proof: proof_path,
            policy: "production".to_string(),
        };
        assert!(run_verify(&strict).is_err());
    }

    #[test]
    fn tampered_envelope_exits_2() {
        let dir = tempfile::tempdir().unwrap();
        let keys = SetupCeremony::single_party(&mut seeded_rng())
            .finalize(CircuitType::Version, 1)
            .unwrap();
        let store = KeyStore::new(dir.path().join("keys"));
        store.save(&keys).unwrap();

        let prover = Prover::new(Arc::new(keys));
        let mut envelope = prover
            .prove(ProofRequest::Version {
                secret: OwnerSecret::from_bytes([4u8; 32]),
                old_pid: Fr::from(1u64),
                new_pid: Fr::from(2u64),
                nonce: Fr::from(3u64),
            })
            .unwrap();
        envelope.public_signals[0] += Fr::from(1u64);

        let proof_path = dir.path().join("proof.json");
        std::fs::write(&proof_path, envelope.to_json().unwrap()).unwrap();

        let args = VerifyArgs {
            keys_dir: dir.path().join("keys"),
            proof: proof_path,
            policy: "development".to_string(),
        };
        assert_eq!(run_verify(&args).unwrap(), 2);
    }
}
