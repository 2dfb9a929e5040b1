//! JSON output for CLI responses.

use std::process::ExitCode;

use anyhow::Result;
use nice_dns_provider::{ChangeWatch, DnsError, PollOutcome};
use serde::Serialize;

/// Exit status after an interrupted poll (128 + SIGINT).
const EXIT_INTERRUPTED: u8 = 130;

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a library error as its `{type, code, msg}` shape on stderr.
pub fn print_error(err: &DnsError) {
    let shape = err.shape();
    match serde_json::to_string_pretty(&shape) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("{}: {} ({})", shape.error_type, shape.msg, shape.code),
    }
}

/// Print every poll event until the watch ends. Ctrl-C cancels the watch.
pub async fn follow(mut watch: ChangeWatch) -> Result<ExitCode> {
    loop {
        tokio::select! {
            event = watch.next_event() => match event {
                Some(event) => print_json(&event)?,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, cancelling poll of {}", watch.change_id());
                watch.cancel();
            }
        }
    }

    Ok(match watch.wait().await {
        PollOutcome::InSync(_) => ExitCode::SUCCESS,
        PollOutcome::Failed(_) => ExitCode::FAILURE,
        PollOutcome::Cancelled => ExitCode::from(EXIT_INTERRUPTED),
    })
}
