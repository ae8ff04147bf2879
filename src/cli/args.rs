//! CLI argument definitions using clap
//!
//! `ledgerd start --role <master|slave> --config <path>`

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ledgerd - a replicated append-only log service
#[derive(Parser, Debug)]
#[command(name = "ledgerd")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start this node as a primary or secondary
    Start {
        /// Path to a node configuration file
        #[arg(long, default_value = "./ledgerd.json")]
        config: PathBuf,

        /// Override the role recorded in the config file
        #[arg(long, value_enum)]
        role: Option<CliRole>,

        /// Override the listen address recorded in the config file
        #[arg(long)]
        listen: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
pub enum CliRole {
    Master,
    Slave,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
