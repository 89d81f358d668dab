//! # Setup Manager
//!
//! The trusted-setup lifecycle for the five circuits: a contribution
//! ceremony produces per-circuit Groth16 proving/verification keys, the
//! provenance of that ceremony is recorded on the key material, and a
//! policy gate decides whether the provenance is acceptable for the
//! deployment.
//!
//! ## Ceremony
//!
//! [`SetupCeremony`] accumulates participant contributions into a SHA-256
//! transcript; `finalize` derives the circuit-phase RNG from the
//! transcript and runs `Groth16::circuit_specific_setup`. A single
//! contribution yields [`KeyProvenance::SingleParty`] — acceptable for
//! testing only, and rejected by [`KeyPolicy::production`]. A multi-party
//! transcript is honest only if at least one participant sourced their
//! entropy honestly and discarded it; the provenance field exists so that
//! verifying deployments can refuse key material whose ceremony they do
//! not trust.
//!
//! ## Versioning
//!
//! Key material is keyed by `(circuit_type, version)`. Regenerating keys
//! for a circuit bumps the version and invalidates every proof issued
//! under the old version — verifiers reject them as [`KeyMismatch`]
//! rather than reinterpreting.
//!
//! ## Integrity
//!
//! [`KeyStore`] writes a SHA-256 checksum sidecar next to each binary
//! artifact and verifies it on load. Missing or corrupt artifacts are
//! [`ZkpError::SetupIntegrity`] — fatal for the affected circuit.
//!
//! [`KeyMismatch`]: crate::error::ZkpError::KeyMismatch

use std::path::{Path, PathBuf};

use ark_bn254::Bn254;
use ark_groth16::{Groth16, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::{rngs::StdRng, SeedableRng};
use chrono::{DateTime, Utc};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::circuits::{
    CircuitType, LockerCircuit, MembershipCircuit, SelectiveRevealCircuit, StructureCircuit,
    VersionCircuit,
};
use crate::error::ZkpError;

/// How the key material's ceremony was conducted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum KeyProvenance {
    /// One party ran the whole ceremony and saw the transcript seed.
    /// Testing only.
    SingleParty,
    /// Multiple parties contributed entropy; honest if at least one
    /// participant discarded theirs.
    Ceremony {
        /// Participant labels, in contribution order.
        participants: Vec<String>,
    },
}

impl KeyProvenance {
    /// Whether this provenance is acceptable for production use.
    pub fn is_production(&self) -> bool {
        matches!(self, KeyProvenance::Ceremony { .. })
    }
}

/// Metadata carried alongside every key pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    /// Circuit the keys were generated for.
    pub circuit_type: CircuitType,
    /// Key version; bumped on every regeneration.
    pub version: u32,
    /// Ceremony provenance.
    pub provenance: KeyProvenance,
    /// When the ceremony finalized.
    pub created_at: DateTime<Utc>,
}

/// A circuit's proving and verification keys plus their metadata.
///
/// The proving key is large and stays prover-side; the verification key
/// is small and distributed to verifiers. Both are immutable once the
/// ceremony concludes.
#[derive(Debug, Clone)]
pub struct CircuitKeys {
    /// Groth16 proving key (large, circuit-specific).
    pub proving_key: ProvingKey<Bn254>,
    /// Groth16 verification key (small, circuit-specific).
    pub verifying_key: VerifyingKey<Bn254>,
    /// Provenance and versioning.
    pub metadata: KeyMetadata,
}

/// Contribution ceremony for the universal randomness phase.
#[derive(Debug, Clone)]
pub struct SetupCeremony {
    transcript: [u8; 32],
    participants: Vec<String>,
}

impl SetupCeremony {
    /// Start an empty ceremony.
    pub fn new() -> Self {
        Self {
            transcript: [0u8; 32],
            participants: Vec::new(),
        }
    }

    /// Convenience single-party ceremony for tests and local tooling.
    /// The resulting keys carry [`KeyProvenance::SingleParty`].
    pub fn single_party<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut entropy = [0u8; 32];
        rng.fill_bytes(&mut entropy);
        let mut ceremony = Self::new();
        ceremony.contribute("single-party", entropy);
        ceremony
    }

    /// Mix a participant's entropy into the transcript.
    ///
    /// Participants should source `entropy` from a secure RNG and discard
    /// it after contributing — the discarded entropy is the ceremony's
    /// toxic waste.
    pub fn contribute(&mut self, participant: impl Into<String>, entropy: [u8; 32]) {
        let participant = participant.into();
        let mut hasher = Sha256::new();
        hasher.update(self.transcript);
        hasher.update(participant.as_bytes());
        hasher.update(entropy);
        self.transcript = hasher.finalize().into();
        self.participants.push(participant);
    }

    /// Participant labels, in contribution order.
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    /// Provenance the finalized keys will carry.
    pub fn provenance(&self) -> KeyProvenance {
        if self.participants.len() > 1 {
            KeyProvenance::Ceremony {
                participants: self.participants.clone(),
            }
        } else {
            KeyProvenance::SingleParty
        }
    }

    /// Run the circuit-specific phase for one circuit.
    ///
    /// Deterministic in (transcript, circuit, version): re-finalizing the
    /// same ceremony yields identical keys, which is what makes the
    /// transcript auditable.
    pub fn finalize(&self, circuit_type: CircuitType, version: u32) -> Result<CircuitKeys, ZkpError> {
        if self.participants.is_empty() {
            return Err(ZkpError::SetupIntegrity(
                "ceremony has no contributions".to_string(),
            ));
        }

        // Derive the circuit-phase seed from the transcript, domain
        // separated per circuit and version.
        let mut hasher = Sha256::new();
        hasher.update(self.transcript);
        hasher.update(circuit_type.as_str().as_bytes());
        hasher.update(version.to_le_bytes());
        let seed: [u8; 32] = hasher.finalize().into();
        let mut rng = StdRng::from_seed(seed);

        tracing::info!(circuit = %circuit_type, version, participants = self.participants.len(),
            "finalizing trusted setup");

        let (proving_key, verifying_key) = blank_setup(circuit_type, &mut rng)?;
        Ok(CircuitKeys {
            proving_key,
            verifying_key,
            metadata: KeyMetadata {
                circuit_type,
                version,
                provenance: self.provenance(),
                created_at: Utc::now(),
            },
        })
    }

    /// Finalize every circuit type under one ceremony and version.
    pub fn finalize_all(&self, version: u32) -> Result<Vec<CircuitKeys>, ZkpError> {
        CircuitType::ALL
            .iter()
            .map(|ct| self.finalize(*ct, version))
            .collect()
    }
}

impl Default for SetupCeremony {
    fn default() -> Self {
        Self::new()
    }
}

/// Key generation against the blank form of each circuit.
fn blank_setup<R: RngCore + CryptoRng>(
    circuit_type: CircuitType,
    rng: &mut R,
) -> Result<(ProvingKey<Bn254>, VerifyingKey<Bn254>), ZkpError> {
    let keys = match circuit_type {
        CircuitType::Membership => {
            Groth16::<Bn254>::circuit_specific_setup(MembershipCircuit::blank(), rng)?
        }
        CircuitType::Structure => {
            Groth16::<Bn254>::circuit_specific_setup(StructureCircuit::blank(), rng)?
        }
        CircuitType::SelectiveReveal => {
            Groth16::<Bn254>::circuit_specific_setup(SelectiveRevealCircuit::blank(), rng)?
        }
        CircuitType::Version => {
            Groth16::<Bn254>::circuit_specific_setup(VersionCircuit::blank(), rng)?
        }
        CircuitType::Locker => {
            Groth16::<Bn254>::circuit_specific_setup(LockerCircuit::blank(), rng)?
        }
    };
    Ok(keys)
}

// ---------------------------------------------------------------------------
// Key policy
// ---------------------------------------------------------------------------

/// Deployment mode for key acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    /// Reject single-party key material unconditionally.
    Production,
    /// Accept anything (local development and tests).
    Development,
}

/// Runtime policy deciding whether presented key material is acceptable.
#[derive(Debug, Clone)]
pub struct KeyPolicy {
    mode: PolicyMode,
}

impl KeyPolicy {
    /// Policy with an explicit mode.
    pub fn new(mode: PolicyMode) -> Self {
        Self { mode }
    }

    /// Production policy: single-party keys are rejected.
    pub fn production() -> Self {
        Self::new(PolicyMode::Production)
    }

    /// Development policy: everything accepted.
    pub fn development() -> Self {
        Self::new(PolicyMode::Development)
    }

    /// Resolve the policy from the environment.
    ///
    /// Checks, in order: the `ZAP_KEY_POLICY` variable (`production` /
    /// `development`), then the compile-time default — release builds are
    /// production, debug builds development.
    pub fn from_environment() -> Self {
        if let Ok(val) = std::env::var("ZAP_KEY_POLICY") {
            match val.to_lowercase().as_str() {
                "production" | "prod" => return Self::production(),
                "development" | "dev" => return Self::development(),
                _ => {} // Fall through to the compile-time default.
            }
        }
        if cfg!(not(debug_assertions)) {
            Self::production()
        } else {
            Self::development()
        }
    }

    /// Current mode.
    pub fn mode(&self) -> PolicyMode {
        self.mode
    }

    /// Validate key metadata against this policy.
    pub fn validate(&self, metadata: &KeyMetadata) -> Result<(), ZkpError> {
        match self.mode {
            PolicyMode::Production if !metadata.provenance.is_production() => {
                Err(ZkpError::PolicyViolation(format!(
                    "single-party setup for {} v{} rejected in production mode",
                    metadata.circuit_type, metadata.version
                )))
            }
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Key store
// ---------------------------------------------------------------------------

/// On-disk key storage with checksum sidecars.
///
/// Layout, per `(circuit, version)`:
/// `<circuit>.v<version>.pk` / `.vk` (compressed canonical bytes), each
/// with a `.sha256` sidecar, and `<circuit>.v<version>.meta.json`.
#[derive(Debug, Clone)]
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    /// A key store rooted at `dir`. The directory is created on first
    /// save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Artifact path `<dir>/<circuit>.v<version>.<suffix>`. Built by
    /// concatenation: `with_extension` would eat the `.v<n>` segment.
    fn artifact(&self, circuit_type: CircuitType, version: u32, suffix: &str) -> PathBuf {
        self.dir.join(format!("{circuit_type}.v{version}.{suffix}"))
    }

    /// Persist a key pair with checksums and metadata.
    pub fn save(&self, keys: &CircuitKeys) -> Result<(), ZkpError> {
        std::fs::create_dir_all(&self.dir)?;
        let (circuit_type, version) = (keys.metadata.circuit_type, keys.metadata.version);

        let mut pk_bytes = Vec::new();
        keys.proving_key.serialize_compressed(&mut pk_bytes)?;
        write_with_checksum(&self.artifact(circuit_type, version, "pk"), &pk_bytes)?;

        let mut vk_bytes = Vec::new();
        keys.verifying_key.serialize_compressed(&mut vk_bytes)?;
        write_with_checksum(&self.artifact(circuit_type, version, "vk"), &vk_bytes)?;

        let meta_json = serde_json::to_string_pretty(&keys.metadata)?;
        std::fs::write(self.artifact(circuit_type, version, "meta.json"), meta_json)?;

        tracing::info!(circuit = %keys.metadata.circuit_type,
            version = keys.metadata.version, dir = %self.dir.display(), "key material saved");
        Ok(())
    }

    /// Load a key pair, verifying checksums and metadata consistency.
    ///
    /// Missing or corrupt artifacts are [`ZkpError::SetupIntegrity`]:
    /// proving and verification for the circuit must halt until the
    /// material is restored.
    pub fn load(&self, circuit_type: CircuitType, version: u32) -> Result<CircuitKeys, ZkpError> {
        let meta_raw = read_artifact(&self.artifact(circuit_type, version, "meta.json"))?;
        let metadata: KeyMetadata = serde_json::from_slice(&meta_raw).map_err(|e| {
            ZkpError::SetupIntegrity(format!("corrupt key metadata for {circuit_type} v{version}: {e}"))
        })?;
        if metadata.circuit_type != circuit_type || metadata.version != version {
            return Err(ZkpError::SetupIntegrity(format!(
                "key metadata names {} v{}, expected {circuit_type} v{version}",
                metadata.circuit_type, metadata.version
            )));
        }

        let pk_bytes = read_with_checksum(&self.artifact(circuit_type, version, "pk"))?;
        let proving_key = ProvingKey::deserialize_compressed(pk_bytes.as_slice())
            .map_err(|e| ZkpError::SetupIntegrity(format!("corrupt proving key: {e}")))?;

        let vk_bytes = read_with_checksum(&self.artifact(circuit_type, version, "vk"))?;
        let verifying_key = VerifyingKey::deserialize_compressed(vk_bytes.as_slice())
            .map_err(|e| ZkpError::SetupIntegrity(format!("corrupt verification key: {e}")))?;

        Ok(CircuitKeys {
            proving_key,
            verifying_key,
            metadata,
        })
    }
}

fn checksum_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".sha256");
    PathBuf::from(os)
}

fn write_with_checksum(path: &Path, bytes: &[u8]) -> Result<(), ZkpError> {
    std::fs::write(path, bytes)?;
    let digest = hex::encode(Sha256::digest(bytes));
    std::fs::write(checksum_path(path), digest)?;
    Ok(())
}

/// Read a setup artifact; absence is an integrity failure, not a plain
/// I/O error.
fn read_artifact(path: &Path) -> Result<Vec<u8>, ZkpError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ZkpError::SetupIntegrity(
            format!("missing setup artifact: {}", path.display()),
        )),
        Err(e) => Err(ZkpError::Io(e)),
    }
}

fn read_with_checksum(path: &Path) -> Result<Vec<u8>, ZkpError> {
    let bytes = read_artifact(path)?;
    let recorded = read_artifact(&checksum_path(path))?;
    let actual = hex::encode(Sha256::digest(&bytes));
    if recorded != actual.as_bytes() {
        return Err(ZkpError::SetupIntegrity(format!(
            "checksum mismatch for {}",
            path.display()
        )));
    }
    Ok(bytes)
}
