//! Everkeep operator tool.
//!
//! Usage:
//!   everkeep gen-secret
//!   everkeep seal --owner u1 --context v42 "My Vault"
//!   everkeep issue-token --owner u1 --resource v42 --ttl 600
//!
//! The master secret is read from `--master-secret` or from the environment
//! variable named by `--secret-env` (default `EVERKEEP_MASTER_SECRET`).

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use everkeep_cli::{Args, execute};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::WARN };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let outcome = execute(&args)?;
    if outcome.success {
        println!("{}", outcome.output);
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{}", outcome.output);
        Ok(ExitCode::FAILURE)
    }
}
