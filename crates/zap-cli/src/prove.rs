//! `zap prove` — proof generation from a JSON request file.
//!
//! The request file is a tagged JSON object whose `circuit` field selects
//! the variant; private material (salts, secrets) is hex-encoded and
//! never echoed back. The output is the proof envelope JSON — the only
//! artifact meant to leave the machine.

use std::path::PathBuf;

use anyhow::Context;
use ark_bn254::Fr;
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Deserialize;

use zap_core::field::field_from_hex;
use zap_core::{hash_to_field, Pid};
use zap_crypto::{MembershipWitness, OwnerSecret, Salt};
use zap_zkp::prover::{ProofRequest, Prover};
use zap_zkp::setup::KeyStore;

/// Arguments for `zap prove`.
#[derive(Args, Debug)]
pub struct ProveArgs {
    /// Key store directory.
    #[arg(long)]
    pub keys_dir: PathBuf,

    /// Key version to prove under.
    #[arg(long, default_value_t = 1)]
    pub key_version: u32,

    /// JSON request file (see the request schema in the module docs).
    #[arg(long)]
    pub input: PathBuf,

    /// Output path for the proof envelope JSON.
    #[arg(long)]
    pub out: PathBuf,
}

/// Request file schema, tagged by circuit.
#[derive(Debug, Deserialize)]
#[serde(tag = "circuit", rename_all = "snake_case")]
enum RequestFile {
    Membership {
        pid: Pid,
        witness: MembershipWitness,
        issued_at: DateTime<Utc>,
    },
    Structure {
        pid: Pid,
        salt: String,
    },
    SelectiveReveal {
        fields: Vec<String>,
        salt: String,
        reveal: Vec<usize>,
    },
    Version {
        secret: String,
        old_pid: Pid,
        new_pid: Pid,
        nonce: String,
    },
    Locker {
        locker: String,
        witness: MembershipWitness,
        facility: String,
        nonce: String,
    },
}

impl RequestFile {
    fn into_request(self) -> anyhow::Result<ProofRequest> {
        Ok(match self {
            RequestFile::Membership {
                pid,
                witness,
                issued_at,
            } => ProofRequest::Membership {
                identifier: pid.digest(),
                witness,
                issued_at,
            },
            RequestFile::Structure { pid, salt } => ProofRequest::Structure {
                pid,
                salt: parse_salt(&salt)?,
            },
            RequestFile::SelectiveReveal {
                fields,
                salt,
                reveal,
            } => ProofRequest::SelectiveReveal {
                fields: fields
                    .iter()
                    .map(|f| field_from_hex(f).map_err(Into::into))
                    .collect::<anyhow::Result<Vec<Fr>>>()?,
                salt: parse_salt(&salt)?,
                reveal_indices: reveal,
            },
            RequestFile::Version {
                secret,
                old_pid,
                new_pid,
                nonce,
            } => ProofRequest::Version {
                secret: OwnerSecret::from_bytes(parse_bytes32(&secret)?),
                old_pid: old_pid.digest(),
                new_pid: new_pid.digest(),
                nonce: field_from_hex(&nonce)?,
            },
            RequestFile::Locker {
                locker,
                witness,
                facility,
                nonce,
            } => ProofRequest::Locker {
                locker: hash_to_field(locker.as_bytes()),
                witness,
                facility: hash_to_field(facility.as_bytes()),
                nonce: field_from_hex(&nonce)?,
            },
        })
    }
}

fn parse_bytes32(raw: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = hex::decode(raw).context("expected hex")?;
    bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected 32 bytes of hex"))
}

fn parse_salt(raw: &str) -> anyhow::Result<Salt> {
    Ok(Salt::from_bytes(parse_bytes32(raw)?))
}

/// Generate a proof from a request file.
pub fn run_prove(args: &ProveArgs) -> anyhow::Result<u8> {
    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let request_file: RequestFile = serde_json::from_str(&raw).context("parsing request file")?;
    let request = request_file.into_request()?;

    let circuit_type = request.circuit_type();
    let store = KeyStore::new(&args.keys_dir);
    let keys = store
        .load(circuit_type, args.key_version)
        .with_context(|| format!("loading keys for {circuit_type} v{}", args.key_version))?;

    let prover = Prover::new(std::sync::Arc::new(keys));
    let envelope = prover.prove(request)?;

    std::fs::write(&args.out, envelope.to_json()?)?;
    println!(
        "{circuit_type} proof sealed: {} public signals, {} proof bytes",
        envelope.public_signals.len(),
        envelope.proof_bytes.len()
    );
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::parse_circuit;

    #[test]
    fn request_tags_match_circuit_names() {
        let raw = r#"{
            "circuit": "version",
            "secret": "0101010101010101010101010101010101010101010101010101010101010101",
            "old_pid": "PK/ICT/Islamabad/F-7/H-12",
            "new_pid": "PK/Punjab/Lahore/Gulberg/H-9",
            "nonce": "0000000000000000000000000000000000000000000000000000000000000005"
        }"#;
        let parsed: RequestFile = serde_json::from_str(raw).unwrap();
        let request = parsed.into_request().unwrap();
        assert_eq!(request.circuit_type(), parse_circuit("version").unwrap());
    }

    #[test]
    fn bad_salt_length_is_reported() {
        assert!(parse_salt("abcd").is_err());
        assert!(parse_salt(&"00".repeat(32)).is_ok());
    }

    #[test]
    fn reveal_request_parses_fields() {
        let fields: Vec<String> = (0..8)
            .map(|i| format!("{:064x}", i + 1))
            .collect();
        let raw = serde_json::json!({
            "circuit": "selective_reveal",
            "fields": fields,
            "salt": "22".repeat(32),
            "reveal": [0, 3]
        });
        let parsed: RequestFile = serde_json::from_value(raw).unwrap();
        let request = parsed.into_request().unwrap();
        assert_eq!(
            request.circuit_type(),
            parse_circuit("selective_reveal").unwrap()
        );
    }
}
