//! nice-dns - command line front end for `nice-dns-provider`.
//!
//! # Usage
//!
//! ```bash
//! export AWS_ACCESS_KEY_ID=... AWS_SECRET_ACCESS_KEY=...
//!
//! # Zones by id or name
//! nice-dns zones
//! nice-dns zone-info example.com
//!
//! # Replace a record and wait until it is in sync
//! nice-dns set-record example.com www.example.com -t A --value 192.0.2.10 --poll 5
//!
//! # Delete by name and type
//! nice-dns del-record example.com old.example.com -t A
//! ```
//!
//! Results go to stdout as JSON. Errors go to stderr as `{type, code, msg}`.
//! Logging goes to stderr and is controlled by `RUST_LOG`.

mod cli;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use nice_dns_provider::{DnsClient, DnsError};
use tracing_subscriber::EnvFilter;

use cli::Cli;

/// Initialize tracing to stderr. Library `log` records are captured too.
///
/// - `quiet`: suppress all logging output
/// - `verbose`: enable debug-level logging
fn init_tracing(quiet: bool, verbose: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let client = DnsClient::from_config(cli.global.client_config()?)?;
    cli.command.run(&client).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.is_quiet, cli.global.is_verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<DnsError>() {
                Some(err) => {
                    if err.is_expected() {
                        tracing::warn!("{err}");
                    } else {
                        tracing::error!("{err}");
                    }
                    output::print_error(err);
                }
                None => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
