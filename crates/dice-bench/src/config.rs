//! YAML description of a heads-up tournament between two bot agents.

use dice_core::game::match_state::{MAX_STARTING_DICE, STARTING_DICE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    /// Labels every row and names the report directory under `outputs.dir`.
    pub run_id: String,
    pub matches: MatchesConfig,
    /// Exactly two: one per side of the table.
    pub agents: Vec<AgentConfig>,
    pub outputs: OutputsConfig,
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate().map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    /// Checks the rules serde cannot express. Re-run after CLI overrides.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_label(&self.run_id) {
            return Err(ValidationError::RunId(self.run_id.clone()));
        }
        if self.matches.count == 0 {
            return Err(ValidationError::NoMatches);
        }
        if !(1..=MAX_STARTING_DICE).contains(&self.matches.starting_dice) {
            return Err(ValidationError::StartingDice(self.matches.starting_dice));
        }

        let [first, second] = self.agents.as_slice() else {
            return Err(ValidationError::AgentCount(self.agents.len()));
        };
        if let Some(agent) = [first, second].into_iter().find(|agent| !is_label(&agent.name)) {
            return Err(ValidationError::AgentName(agent.name.clone()));
        }
        if first.name == second.name {
            return Err(ValidationError::DuplicateAgent(first.name.clone()));
        }
        if self.metrics.baseline != first.name && self.metrics.baseline != second.name {
            return Err(ValidationError::UnknownBaseline(self.metrics.baseline.clone()));
        }

        if self.outputs.dir.as_os_str().is_empty() {
            return Err(ValidationError::EmptyOutputDir);
        }
        Ok(())
    }

    /// Where this run writes its rows, summary and telemetry.
    pub fn report_paths(&self) -> ReportPaths {
        let dir = self.outputs.dir.join(&self.run_id);
        ReportPaths {
            jsonl: dir.join("matches.jsonl"),
            summary_md: dir.join("summary.md"),
            telemetry: dir.join("telemetry.jsonl"),
            dir,
        }
    }
}

fn is_label(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MatchesConfig {
    /// Seeds the generator that hands out one seed per match.
    #[serde(default)]
    pub seed: Option<u64>,
    pub count: usize,
    /// Replay every match seed with the agents on opposite sides, so each
    /// agent opens the first round once.
    #[serde(default = "default_swap_seats")]
    pub swap_seats: bool,
    #[serde(default = "default_starting_dice")]
    pub starting_dice: usize,
}

impl MatchesConfig {
    pub fn seatings(&self) -> usize {
        if self.swap_seats { 2 } else { 1 }
    }
}

fn default_swap_seats() -> bool {
    true
}

fn default_starting_dice() -> usize {
    STARTING_DICE
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,
    /// Kind-specific settings; heuristic agents read `difficulty` and `raise_filter`.
    #[serde(default)]
    pub params: serde_yaml::Value,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Heuristic,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    /// Each run gets its own `<dir>/<run_id>/` subdirectory.
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MetricsConfig {
    /// Agent whose p-value is pinned to 1; the other is tested against it.
    pub baseline: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Write `telemetry.jsonl` next to the summary.
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default)]
    pub tracing_level: LogLevel,
    /// Also capture every bot decision (`dice_bot::decision` at DEBUG).
    #[serde(default)]
    pub decision_details: bool,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub dir: PathBuf,
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub telemetry: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read tournament config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("tournament config {path:?} is malformed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("tournament config {path:?} is invalid: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("run_id {0:?} must be non-empty and use only letters, digits, '.', '_' or '-'")]
    RunId(String),
    #[error("matches.count must be greater than zero")]
    NoMatches,
    #[error("matches.starting_dice must be between 1 and {MAX_STARTING_DICE}, got {0}")]
    StartingDice(usize),
    #[error("a heads-up tournament needs exactly 2 agents, got {0}")]
    AgentCount(usize),
    #[error("agent name {0:?} must be non-empty and use only letters, digits, '.', '_' or '-'")]
    AgentName(String),
    #[error("both agents are named '{0}'")]
    DuplicateAgent(String),
    #[error("metrics.baseline '{0}' is not one of the two agents")]
    UnknownBaseline(String),
    #[error("outputs.dir must not be empty")]
    EmptyOutputDir,
}
