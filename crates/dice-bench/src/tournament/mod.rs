use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::analytics::{AnalyticsCollector, AnalyticsError, AnalyticsSummary};
use dice_bot::{BotDifficulty, HeuristicPolicy, Policy, RaiseFilter, RngSource, TurnOutcome, take_turn};
use dice_core::game::match_state::{MatchConfig, MatchState};
use dice_core::model::side::Side;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{AgentConfig, AgentKind, BenchmarkConfig, ReportPaths, ValidationError};

/// Agent order per seating: index 0 sits on the side that opens the match.
const SEATINGS: [[usize; 2]; 2] = [[0, 1], [1, 0]];
const MAX_TURNS_PER_MATCH: usize = 10_000;
const POLICY_SEED_SALT: u64 = 0x5EED_D1CE_0000_0001;

/// Plays heads-up matches between the two configured agents.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    paths: ReportPaths,
    agents: Vec<AgentBlueprint>,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub matches_played: usize,
    pub seatings: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
    pub analytics: AnalyticsSummary,
}

impl TournamentRunner {
    pub fn new(config: BenchmarkConfig) -> Result<Self, RunnerError> {
        config.validate()?;
        let agents = AgentBlueprint::from_configs(&config.agents)?;

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            paths: config.report_paths(),
            config,
            agents,
        })
    }

    /// Play every configured match, streaming one JSONL row per match.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        fs::create_dir_all(&self.paths.dir)?;
        let mut writer = BufWriter::new(File::create(&self.paths.jsonl)?);
        let seatings = &SEATINGS[..self.config.matches.seatings()];
        let mut rng = StdRng::seed_from_u64(self.config.matches.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config)?;

        for match_index in 0..self.config.matches.count {
            let match_seed = rng.next_u64();

            for (seating_index, seating) in seatings.iter().enumerate() {
                let outcome = self.play_match(match_index, seating_index, match_seed, seating)?;
                analytics.record_match(&outcome)?;
                write_match_row(
                    &mut writer,
                    &self.config,
                    match_index,
                    seating_index,
                    match_seed,
                    &outcome,
                )?;
                rows_written += 1;
            }
        }

        writer.flush()?;

        let analytics = analytics.finalize()?;
        analytics.write_markdown(&self.paths.summary_md)?;

        let telemetry_path = self
            .logging_enabled
            .then(|| self.paths.telemetry.clone());

        Ok(RunSummary {
            matches_played: self.config.matches.count,
            seatings: seatings.len(),
            rows_written,
            jsonl_path: self.paths.jsonl.clone(),
            summary_path: self.paths.summary_md.clone(),
            telemetry_path,
            analytics,
        })
    }

    fn play_match(
        &self,
        match_index: usize,
        seating_index: usize,
        match_seed: u64,
        seating: &[usize; 2],
    ) -> Result<MatchOutcome, RunnerError> {
        let config = MatchConfig {
            starting_dice: self.config.matches.starting_dice,
            starting_side: Side::Human,
        };
        let mut state = MatchState::with_config(config, match_seed);
        let mut seats = build_seat_states(seating, &self.agents)?;
        let mut rng = RngSource::seeded(match_seed ^ POLICY_SEED_SALT);
        let mut turns = 0usize;

        while !state.is_over() {
            if turns >= MAX_TURNS_PER_MATCH {
                return Err(RunnerError::game(format!(
                    "match {match_index} exceeded {MAX_TURNS_PER_MATCH} turns"
                )));
            }

            let side = state.to_act();
            let round = state.round_number();
            let seat = &mut seats[side.index()];
            let start = Instant::now();
            let outcome = take_turn(&mut state, seat.policy.as_mut(), &mut rng).map_err(|err| {
                RunnerError::game(format!(
                    "turn rejected for '{}' in match {match_index}: {err}",
                    seat.agent_name
                ))
            })?;
            let elapsed_ms = seat.metrics.record(start.elapsed());
            turns += 1;

            let (action, bid) = match &outcome {
                TurnOutcome::Raised(bid) => ("raise", bid.to_string()),
                TurnOutcome::Challenged { outcome, forced } => {
                    seat.challenges += 1;
                    if *forced {
                        seat.forced_challenges += 1;
                    }
                    if outcome.challenge_succeeded() {
                        seat.successful_challenges += 1;
                    }
                    let action = if *forced { "forced_challenge" } else { "challenge" };
                    (action, outcome.bid.to_string())
                }
            };

            if self.logging_enabled && tracing::enabled!(Level::INFO) {
                event!(
                    target: "dice_bench::turn",
                    Level::INFO,
                    run_id = %self.config.run_id,
                    match_index = match_index as u32,
                    seating_index = seating_index as u32,
                    round,
                    seat = seat_label(side),
                    bot = %seat.agent_name,
                    action,
                    bid = %bid,
                    elapsed_ms
                );
            }
        }

        let winner = state
            .winner()
            .ok_or_else(|| RunnerError::game(format!("match {match_index} ended without a winner")))?;

        let seating = seats
            .iter()
            .map(|seat| SeatSnapshot {
                seat: seat_label(seat.side).to_string(),
                bot: seat.agent_name.clone(),
            })
            .collect();
        let starting_agent = seats[Side::Human.index()].agent_name.clone();
        let winning_agent = seats[winner.index()].agent_name.clone();

        let seat_results = seats
            .into_iter()
            .map(|seat| SeatResult {
                dice_left: state.dice_count(seat.side),
                won: seat.side == winner,
                agent_name: seat.agent_name,
                side: seat.side,
                challenges: seat.challenges,
                successful_challenges: seat.successful_challenges,
                forced_challenges: seat.forced_challenges,
                metrics: seat.metrics.finalize(),
            })
            .collect();

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "dice_bench::match",
                Level::INFO,
                run_id = %self.config.run_id,
                match_index = match_index as u32,
                seating_index = seating_index as u32,
                winner = %winning_agent,
                rounds = state.round_number(),
                turns = turns as u32
            );
        }

        Ok(MatchOutcome {
            seating,
            seat_results,
            starting_agent,
            winning_agent,
            rounds: state.round_number(),
            turns,
        })
    }
}

fn write_match_row(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    match_index: usize,
    seating_index: usize,
    match_seed: u64,
    outcome: &MatchOutcome,
) -> Result<(), RunnerError> {
    let row = MatchLogRow {
        run_id: config.run_id.clone(),
        match_id: format!("M{match_index:05}_S{seating_index}"),
        match_index,
        seating_index,
        match_seed,
        starting_agent: outcome.starting_agent.clone(),
        winner: outcome.winning_agent.clone(),
        rounds: outcome.rounds,
        turns: outcome.turns,
        seating: outcome.seating.clone(),
        seats: outcome
            .seat_results
            .iter()
            .map(|seat| SeatRow {
                seat: seat_label(seat.side).to_string(),
                bot: seat.agent_name.clone(),
                dice_left: seat.dice_left,
                challenges: seat.challenges,
                forced_challenges: seat.forced_challenges,
                decisions: seat.metrics.decisions,
                speed_ms_turn: seat.metrics.avg_ms_per_decision,
            })
            .collect(),
    };

    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

fn build_seat_states(
    seating: &[usize; 2],
    agents: &[AgentBlueprint],
) -> Result<Vec<SeatState>, RunnerError> {
    let mut seats = Vec::with_capacity(2);
    for (seat_idx, agent_idx) in seating.iter().enumerate() {
        let side = Side::from_index(seat_idx).ok_or_else(|| {
            RunnerError::game(format!("invalid seat index generated: {seat_idx}"))
        })?;
        let agent = agents.get(*agent_idx).ok_or(RunnerError::InvalidSeating {
            index: seat_idx,
            agent_index: *agent_idx,
        })?;
        seats.push(SeatState::new(side, agent));
    }
    Ok(seats)
}

fn seat_label(side: Side) -> &'static str {
    match side {
        Side::Human => "opener",
        Side::Computer => "responder",
    }
}

struct SeatState {
    side: Side,
    agent_name: String,
    policy: Box<dyn Policy>,
    metrics: DecisionMetrics,
    challenges: u32,
    successful_challenges: u32,
    forced_challenges: u32,
}

impl SeatState {
    fn new(side: Side, agent: &AgentBlueprint) -> Self {
        Self {
            side,
            agent_name: agent.name.clone(),
            policy: agent.spawn_policy(),
            metrics: DecisionMetrics::default(),
            challenges: 0,
            successful_challenges: 0,
            forced_challenges: 0,
        }
    }
}

pub struct MatchOutcome {
    pub seating: Vec<SeatSnapshot>,
    pub seat_results: Vec<SeatResult>,
    pub starting_agent: String,
    pub winning_agent: String,
    pub rounds: u32,
    pub turns: usize,
}

#[derive(Clone, Serialize)]
pub struct SeatSnapshot {
    pub seat: String,
    pub bot: String,
}

pub struct SeatResult {
    pub agent_name: String,
    pub side: Side,
    pub won: bool,
    pub dice_left: usize,
    pub challenges: u32,
    pub successful_challenges: u32,
    pub forced_challenges: u32,
    pub metrics: DecisionSummary,
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) -> f64 {
        self.total += duration;
        self.decisions += 1;
        duration.as_secs_f64() * 1000.0
    }

    fn finalize(self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Clone)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Serialize)]
struct MatchLogRow {
    run_id: String,
    match_id: String,
    match_index: usize,
    seating_index: usize,
    match_seed: u64,
    starting_agent: String,
    winner: String,
    rounds: u32,
    turns: usize,
    seating: Vec<SeatSnapshot>,
    seats: Vec<SeatRow>,
}

#[derive(Serialize)]
struct SeatRow {
    seat: String,
    bot: String,
    dice_left: usize,
    challenges: u32,
    forced_challenges: u32,
    decisions: u32,
    speed_ms_turn: f64,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),
    #[error("seat {index} references invalid agent index {agent_index}")]
    InvalidSeating { index: usize, agent_index: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl RunnerError {
    fn game(message: String) -> Self {
        RunnerError::Game { message }
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid heuristic parameter for agent '{name}': {message}")]
    InvalidHeuristicParam { name: String, message: String },
}

struct AgentBlueprint {
    name: String,
    options: HeuristicOptions,
}

impl AgentBlueprint {
    fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let options = match config.kind {
            AgentKind::Heuristic => HeuristicOptions::from_params(&config.name, &config.params)?,
        };

        Ok(Self {
            name: config.name.clone(),
            options,
        })
    }

    fn spawn_policy(&self) -> Box<dyn Policy> {
        Box::new(HeuristicPolicy::new(self.options.difficulty).with_filter(self.options.filter))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeuristicOptions {
    difficulty: BotDifficulty,
    filter: RaiseFilter,
}

impl HeuristicOptions {
    fn from_params(name: &str, params: &serde_yaml::Value) -> Result<Self, AgentError> {
        let mut options = Self {
            difficulty: BotDifficulty::Normal,
            filter: RaiseFilter::Permissive,
        };

        if params.is_null() {
            return Ok(options);
        }

        let mapping = params
            .as_mapping()
            .ok_or_else(|| AgentError::InvalidHeuristicParam {
                name: name.to_string(),
                message: "expected mapping for heuristic params".to_string(),
            })?;

        for (key, value) in mapping {
            let key = key.as_str().unwrap_or_default();
            if key != "difficulty" && key != "raise_filter" {
                return Err(AgentError::InvalidHeuristicParam {
                    name: name.to_string(),
                    message: format!("unknown parameter '{key}'"),
                });
            }

            let text = value
                .as_str()
                .ok_or_else(|| AgentError::InvalidHeuristicParam {
                    name: name.to_string(),
                    message: format!("{key} must be a string"),
                })?;

            if key == "difficulty" {
                options.difficulty =
                    BotDifficulty::parse(text).ok_or_else(|| AgentError::InvalidHeuristicParam {
                        name: name.to_string(),
                        message: format!("unknown difficulty '{text}'"),
                    })?;
            } else {
                options.filter =
                    RaiseFilter::parse(text).ok_or_else(|| AgentError::InvalidHeuristicParam {
                        name: name.to_string(),
                        message: format!("unknown raise filter '{text}'"),
                    })?;
            }
        }

        Ok(options)
    }
}
