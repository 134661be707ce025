//! ssmenv: run commands with `ssm://` references resolved.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use ssmenv::cancel::CancellationToken;
use ssmenv::config::RunConfig;
use ssmenv::constants;
use ssmenv::env::Env;
use ssmenv::runner;
use ssmenv::store::ssm::SsmParameterStore;

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::args::{Cli, Command};

#[tokio::main]
async fn main() {
    // stdout belongs to the child; keep diagnostics on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(constants::DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run().await {
        Ok(code) => process::exit(code),
        Err(err) => {
            use colored::Colorize;
            eprintln!("{} {err:#}", "Error:".red().bold());
            process::exit(1);
        }
    }
}

/// Dispatch the parsed command; returns the exit code to use.
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run_command(args.into_config()).await,
    }
}

/// Build the parameter store client and run the child command.
async fn run_command(config: RunConfig) -> Result<i32> {
    let cancel = CancellationToken::new();
    spawn_interrupt_listener(cancel.clone());

    let store = SsmParameterStore::load()
        .await
        .context("failed to initialise the parameter store client")?;

    let code = runner::run(&config, &Env::real(), &store, &cancel).await?;
    Ok(code)
}

/// Cancel `token` on Ctrl-C.
///
/// While this listener is installed the interrupt no longer kills ssmenv
/// itself, so a running child gets to handle it and its exit code is kept.
fn spawn_interrupt_listener(token: CancellationToken) {
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            tracing::debug!("interrupt received");
            token.cancel();
        }
    });
}
