use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ReportPaths};

const DECISION_DIRECTIVE: &str = "dice_bot::decision=debug";

pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Install a JSON subscriber writing `telemetry.jsonl` next to the summary.
///
/// Returns `None` when structured logging is disabled. Keep the guard alive
/// until the run ends or buffered events are lost.
pub fn init_logging(
    logging: &LoggingConfig,
    paths: &ReportPaths,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    fs::create_dir_all(&paths.dir)
        .with_context(|| format!("creating report directory at {}", paths.dir.display()))?;

    let telemetry_path = paths.telemetry.clone();
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;

    let (writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let filter = build_filter(logging)?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // A subscriber may already be installed when several runs share a process.
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(Some(LoggingGuard {
        _guard: guard,
        telemetry_path,
    }))
}

fn build_filter(logging: &LoggingConfig) -> Result<EnvFilter> {
    let level = logging.tracing_level.as_level();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    if logging.decision_details {
        let directive: Directive = DECISION_DIRECTIVE
            .parse()
            .context("parsing decision log directive")?;
        Ok(filter.add_directive(directive))
    } else {
        Ok(filter)
    }
}
