#![deny(warnings)]

use dice_app::cli::{self, CliOutcome, PlayOptions};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();

    let result = match cli::run_cli(std::env::args().skip(1)) {
        Ok(CliOutcome::Handled) => Ok(()),
        Ok(CliOutcome::NotHandled) => cli::run_play(PlayOptions::default()),
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("liars-dice: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr so they never interleave with the game prompt.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
