//! `zap tree` — accumulator operations.
//!
//! Builds fixed-depth accumulators from PID list files and produces
//! membership witnesses against them. The export format is the public
//! `AccumulatorExport` JSON; witnesses are exchanged out-of-band between
//! the accumulator owner and the prover.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};

use zap_core::field::field_to_hex;
use zap_core::Pid;
use zap_crypto::poseidon::leaf_hash;
use zap_crypto::{AccumulatorExport, AccumulatorService};

/// Arguments for `zap tree`.
#[derive(Args, Debug)]
pub struct TreeArgs {
    #[command(subcommand)]
    pub command: TreeCommand,
}

/// Accumulator subcommands.
#[derive(Subcommand, Debug)]
pub enum TreeCommand {
    /// Build an accumulator from a file of PIDs (one per line).
    Build {
        /// Fixed tree depth (16 for address sets, 8 for locker sets).
        #[arg(long, default_value_t = 16)]
        depth: usize,

        /// Input file, one canonical PID per line.
        #[arg(long)]
        pids: PathBuf,

        /// Output path for the accumulator export JSON.
        #[arg(long)]
        out: PathBuf,
    },

    /// Produce a membership witness for a PID against a built tree.
    Witness {
        /// Accumulator export JSON produced by `tree build`.
        #[arg(long)]
        tree: PathBuf,

        /// The PID to prove membership of.
        #[arg(long)]
        pid: String,

        /// Output path for the witness JSON.
        #[arg(long)]
        out: PathBuf,
    },
}

/// Dispatch a `zap tree` subcommand.
pub fn run_tree(args: &TreeArgs) -> anyhow::Result<u8> {
    match &args.command {
        TreeCommand::Build { depth, pids, out } => build(*depth, pids, out),
        TreeCommand::Witness { tree, pid, out } => witness(tree, pid, out),
    }
}

fn build(depth: usize, pids_path: &PathBuf, out: &PathBuf) -> anyhow::Result<u8> {
    let raw = std::fs::read_to_string(pids_path)
        .with_context(|| format!("reading {}", pids_path.display()))?;

    let mut leaves = Vec::new();
    for (line_no, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let pid = Pid::parse(line)
            .with_context(|| format!("{}:{}", pids_path.display(), line_no + 1))?;
        leaves.push(leaf_hash(&pid.digest()));
    }

    let service = AccumulatorService::from_leaves(depth, &leaves)?;
    let export = service.export();
    std::fs::write(out, serde_json::to_string_pretty(&export)?)?;

    println!("root: {}", field_to_hex(&export.root));
    println!("leaves: {} / capacity 2^{depth}", export.size);
    Ok(0)
}

fn witness(tree_path: &PathBuf, pid: &str, out: &PathBuf) -> anyhow::Result<u8> {
    let raw = std::fs::read_to_string(tree_path)
        .with_context(|| format!("reading {}", tree_path.display()))?;
    let export: AccumulatorExport = serde_json::from_str(&raw)?;
    let service = AccumulatorService::import(&export).context("rebuilding accumulator")?;

    let pid = Pid::parse(pid)?;
    let leaf = leaf_hash(&pid.digest());
    let witness = service
        .witness(&leaf)
        .context("PID is not a member of this tree")?;

    std::fs::write(out, serde_json::to_string_pretty(&witness)?)?;
    println!(
        "witness for leaf {} at index {}",
        field_to_hex(&witness.leaf),
        witness.leaf_index
    );
    println!("root: {}", field_to_hex(&witness.root));
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zap_crypto::MembershipWitness;

    #[test]
    fn build_then_witness_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let pids_path = dir.path().join("pids.txt");
        std::fs::write(
            &pids_path,
            "PK/ICT/Islamabad/F-7/H-12\nSG/Queenstown/Blk-88\n\nDE/BE/Berlin/Mitte\n",
        )
        .unwrap();

        let tree_path = dir.path().join("tree.json");
        build(8, &pids_path, &tree_path).unwrap();

        let witness_path = dir.path().join("witness.json");
        witness(&tree_path, "SG/Queenstown/Blk-88", &witness_path).unwrap();

        let raw = std::fs::read_to_string(&witness_path).unwrap();
        let witness: MembershipWitness = serde_json::from_str(&raw).unwrap();
        assert!(witness.verify());
        assert_eq!(witness.depth(), 8);
    }

    #[test]
    fn non_member_pid_fails_witness() {
        let dir = tempfile::tempdir().unwrap();
        let pids_path = dir.path().join("pids.txt");
        std::fs::write(&pids_path, "PK/ICT/Islamabad/F-7/H-12\n").unwrap();

        let tree_path = dir.path().join("tree.json");
        build(8, &pids_path, &tree_path).unwrap();

        let witness_path = dir.path().join("witness.json");
        assert!(witness(&tree_path, "PK/ICT/Islamabad/F-7/H-13", &witness_path).is_err());
    }

    #[test]
    fn invalid_pid_line_is_reported_with_location() {
        let dir = tempfile::tempdir().unwrap();
        let pids_path = dir.path().join("pids.txt");
        std::fs::write(&pids_path, "PK/ICT\nnot-a-pid\n").unwrap();

        let tree_path = dir.path().join("tree.json");
        let err = build(8, &pids_path, &tree_path).unwrap_err();
        assert!(format!("{err:#}").contains(":2"));
    }
}
