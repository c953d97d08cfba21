// Copyright (c) 2026 Barter Labs. MIT License.
// See LICENSE for details.

//! # BARTER Harness
//!
//! Entry point for the `barter-harness` binary. Parses CLI arguments,
//! initializes logging, and drives the swap protocol end to end against
//! a local ledger.
//!
//! The binary supports three subcommands:
//!
//! - `swap`    — the full three-party trade scenario
//! - `refund`  — the make-then-cancel scenario
//! - `version` — print build version information
//!
//! Scenario reports are printed to stdout as JSON; all logging goes to
//! stderr so the two streams can be piped independently.

mod cli;
mod logging;
mod scenario;
mod wallet;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use barter_ledger::crypto::hash::sha256;

use cli::{BarterHarnessCli, Commands, ScenarioArgs};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = BarterHarnessCli::parse();

    match cli.command {
        Commands::Swap(args) => {
            init_from_args(&args);
            let report = scenario::run_swap(&args)?;
            emit_report(&report)
        }
        Commands::Refund(args) => {
            init_from_args(&args);
            let report = scenario::run_refund(&args)?;
            emit_report(&report)
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn init_from_args(args: &ScenarioArgs) {
    logging::init_logging(
        "barter_harness=info,barter_escrow=info,barter_ledger=info",
        LogFormat::from_str_lossy(&args.log_format),
    );
}

/// Print the report as JSON on stdout, with a SHA-256 fingerprint in the
/// logs so two runs can be compared without diffing the whole document.
fn emit_report<T: Serialize>(report: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    let fingerprint = hex::encode(sha256(json.as_bytes()));
    info!(%fingerprint, "scenario report emitted");
    println!("{json}");
    Ok(())
}

fn print_version() {
    println!(
        "barter-harness {} ({} profile)",
        env!("CARGO_PKG_VERSION"),
        if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        }
    );
}
