//! `zap setup` — trusted-setup key generation.
//!
//! Runs a contribution ceremony and finalizes per-circuit Groth16 keys
//! into a key store. With `--participant` labels the CLI draws one OS
//! entropy block per label; with none it runs a single-party setup, which
//! the key metadata flags as non-production.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use rand_core::{OsRng, RngCore};

use zap_zkp::circuits::CircuitType;
use zap_zkp::setup::{KeyStore, SetupCeremony};

/// Arguments for `zap setup`.
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Directory to write key material into.
    #[arg(long)]
    pub keys_dir: PathBuf,

    /// Key version to generate.
    #[arg(long, default_value_t = 1)]
    pub key_version: u32,

    /// Circuit to set up; omit for all five.
    #[arg(long)]
    pub circuit: Option<String>,

    /// Ceremony participant labels. One OS-entropy contribution is drawn
    /// per label; fewer than two labels means a single-party (testing
    /// only) setup.
    #[arg(long = "participant")]
    pub participants: Vec<String>,
}

/// Run the setup ceremony and persist keys.
pub fn run_setup(args: &SetupArgs) -> anyhow::Result<u8> {
    let mut ceremony = SetupCeremony::new();
    if args.participants.is_empty() {
        ceremony = SetupCeremony::single_party(&mut OsRng);
        eprintln!("warning: single-party setup — key material is flagged non-production");
    } else {
        for participant in &args.participants {
            let mut entropy = [0u8; 32];
            OsRng.fill_bytes(&mut entropy);
            ceremony.contribute(participant.clone(), entropy);
        }
    }

    let circuits: Vec<CircuitType> = match args.circuit.as_deref() {
        Some(name) => vec![parse_circuit(name)?],
        None => CircuitType::ALL.to_vec(),
    };

    let store = KeyStore::new(&args.keys_dir);
    for circuit_type in circuits {
        let keys = ceremony
            .finalize(circuit_type, args.key_version)
            .with_context(|| format!("setup failed for {circuit_type}"))?;
        store
            .save(&keys)
            .with_context(|| format!("saving keys for {circuit_type}"))?;
        println!(
            "{circuit_type}: v{} ({})",
            args.key_version,
            if keys.metadata.provenance.is_production() {
                "ceremony"
            } else {
                "single-party, testing only"
            }
        );
    }

    Ok(0)
}

/// Parse a circuit name as it appears in envelopes and filenames.
pub fn parse_circuit(name: &str) -> anyhow::Result<CircuitType> {
    CircuitType::ALL
        .into_iter()
        .find(|ct| ct.as_str() == name)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "unknown circuit \"{name}\" (expected one of: membership, structure, \
                 selective_reveal, version, locker)"
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circuit_names_parse() {
        assert_eq!(
            parse_circuit("selective_reveal").unwrap(),
            CircuitType::SelectiveReveal
        );
        assert!(parse_circuit("bogus").is_err());
    }

    #[test]
    fn single_party_setup_writes_all_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let args = SetupArgs {
            keys_dir: dir.path().to_path_buf(),
            key_version: 1,
            circuit: Some("version".to_string()),
            participants: Vec::new(),
        };
        assert_eq!(run_setup(&args).unwrap(), 0);

        let store = KeyStore::new(dir.path());
        let keys = store.load(CircuitType::Version, 1).unwrap();
        assert!(!keys.metadata.provenance.is_production());
    }
}
