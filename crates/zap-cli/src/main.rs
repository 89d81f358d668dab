//! # zap CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Uses clap derive macros for argument parsing; verbosity maps onto a
//! tracing `EnvFilter`.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zap_cli::prove::{run_prove, ProveArgs};
use zap_cli::setup::{run_setup, SetupArgs};
use zap_cli::tree::{run_tree, TreeArgs};
use zap_cli::verify::{run_verify, VerifyArgs};

/// ZAP Stack CLI
///
/// Zero-knowledge address proofs: trusted-setup key generation, proof
/// generation and verification, and accumulator operations.
#[derive(Parser, Debug)]
#[command(name = "zap", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a trusted-setup ceremony and write key material.
    Setup(SetupArgs),

    /// Generate a proof from a JSON request file.
    Prove(ProveArgs),

    /// Verify a proof envelope against stored keys.
    Verify(VerifyArgs),

    /// Accumulator operations (build, witness).
    Tree(TreeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Setup(args) => run_setup(&args),
        Commands::Prove(args) => run_prove(&args),
        Commands::Verify(args) => run_verify(&args),
        Commands::Tree(args) => run_tree(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
