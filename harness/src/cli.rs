//! Command-line interface for the `barter-harness` binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// BARTER scenario driver — exercises the swap protocol end to end.
#[derive(Parser, Debug)]
#[command(name = "barter-harness", version, about)]
pub struct BarterHarnessCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full three-party swap scenario: issue assets, fund the
    /// parties, make an offer, discover it by asset pair, take it.
    Swap(ScenarioArgs),

    /// Run the cancellation scenario: make an offer, then refund it.
    Refund(ScenarioArgs),

    /// Print build version information.
    Version,
}

/// Shared arguments for the scenario subcommands.
#[derive(Args, Debug)]
pub struct ScenarioArgs {
    /// Ledger data directory. A throwaway temporary store is used when
    /// omitted.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Log output format: "pretty" or "json".
    #[arg(long, env = "BARTER_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Amount of asset A the maker deposits.
    #[arg(long, default_value_t = 1_000_000)]
    pub deposit: u64,

    /// Amount of asset B the maker asks in return.
    #[arg(long, default_value_t = 1_000_000)]
    pub receive: u64,
}
