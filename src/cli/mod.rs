//! Command-line entry point: `ledgerd start --config <path>`.

mod args;
mod commands;
mod errors;

pub use args::{Cli, CliRole, Command};
pub use commands::run_command;
pub use errors::{CliError, CliResult};
