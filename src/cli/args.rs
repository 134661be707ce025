//! Clap argument types.

use clap::Parser;
use std::path::PathBuf;

use ssmenv::config::RunConfig;

/// Run commands with ssm:// environment references resolved from AWS Parameter Store.
#[derive(Parser, Debug)]
#[command(name = ssmenv::constants::APP_NAME, version = ssmenv::constants::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Run a command with SSM parameter substitution.
    Run(RunArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to a file containing environment variables, one KEY=VALUE per line.
    /// When omitted, the current process environment is used.
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Command to run, followed by its arguments. Put it after `--` so its
    /// own flags are not read as ssmenv options.
    #[arg(
        value_name = "COMMAND",
        required = true,
        num_args = 1..,
        trailing_var_arg = true
    )]
    pub command: Vec<String>,
}

impl RunArgs {
    /// Convert into the configuration threaded through the run.
    pub fn into_config(self) -> RunConfig {
        RunConfig::new(self.env_file, self.command)
    }
}
