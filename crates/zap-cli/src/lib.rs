//! # zap-cli — ZAP Stack command-line toolchain
//!
//! Subcommand handlers for the `zap` binary:
//!
//! - [`setup`] — run a (simulated) trusted-setup ceremony and write key
//!   material to a key store.
//! - [`prove`] — build a proof from a JSON request file.
//! - [`verify`] — check a proof envelope against stored keys.
//! - [`tree`] — build accumulators from PID lists and produce membership
//!   witnesses.
//!
//! Each handler takes its clap args struct and returns an exit code via
//! `anyhow::Result<u8>`; the binary maps errors to exit code 1.

pub mod prove;
pub mod setup;
pub mod tree;
pub mod verify;
