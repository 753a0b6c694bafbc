//! Command-line interface definitions.

pub mod check;
pub mod feed;
pub mod output;
pub mod run;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::RiskMode;

/// Hedgeward - admission control for cross-venue hedge jobs.
#[derive(Parser, Debug)]
#[command(name = "hedgeward")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a configuration file and print the effective limits
    Check(ConfigPathArg),

    /// Replay a JSON-lines feed through the dry-run executor
    Run(RunArgs),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Feed of JSON lines (reads stdin when omitted)
    #[arg(long)]
    pub jobs: Option<PathBuf>,

    /// Override risk mode (conservative, balanced, aggressive)
    #[arg(long)]
    pub risk_mode: Option<RiskMode>,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,

    /// Simulated execution time per job, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub exec_delay_ms: u64,

    /// Simulated fee charged by the dry-run executor, in basis points
    #[arg(long, default_value_t = 0)]
    pub fee_bps: u32,
}
