//! Command line interface definition

use clap::{Parser, Subcommand};
use poolgate_types::{SelectionMode, WakeStrategy};
use std::path::PathBuf;

/// poolgate - Multi-category resource admission simulator
#[derive(Parser)]
#[command(name = "poolgate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-category resource admission simulator")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run concurrent clients against the configured pool
    Run {
        /// Number of clients to spawn
        #[arg(short, long)]
        clients: Option<usize>,

        /// Seed for category and hold-time choices
        #[arg(long)]
        seed: Option<u64>,

        /// Wake primitive used for parked clients
        #[arg(long, value_enum)]
        strategy: Option<WakeStrategy>,

        /// How clients pick their category
        #[arg(long, value_enum)]
        selection: Option<SelectionMode>,

        /// Shortest time a client holds its unit
        #[arg(long, value_name = "MS")]
        min_hold_ms: Option<u64>,

        /// Longest time a client holds its unit
        #[arg(long, value_name = "MS")]
        max_hold_ms: Option<u64>,
    },

    /// Print the effective configuration
    Config,
}
