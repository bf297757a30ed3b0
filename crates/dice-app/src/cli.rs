use crate::console;
use crate::controller::GameController;
use dice_bot::{
    BotDifficulty, HeuristicPolicy, Policy, RaiseFilter, RngSource, TurnOutcome, take_turn,
};
use dice_core::AppInfo;
use dice_core::game::match_state::{MatchConfig, MatchState};
use dice_core::game::round::RoundError;
use dice_core::game::serialization::{MatchSnapshot, SnapshotError};
use dice_core::model::side::Side;
use dice_core::stats::{GameStats, JsonFileStore, StoreError};
use std::fs;
use std::io;
use std::path::PathBuf;

const DEFAULT_STATS_FILE: &str = "liars-dice-stats.json";
const USAGE: &str = "\
Usage:
  liars-dice [play] [--seed N] [--stats-file PATH] [--difficulty easy|normal] [--strict]
  liars-dice stats [--stats-file PATH]
  liars-dice eval <matches> [--seed N] [--strict]
  liars-dice --export-snapshot <path> [seed]
  liars-dice --import-snapshot <path>
  liars-dice --version";

pub enum CliOutcome {
    Handled,
    NotHandled,
}

#[derive(Debug)]
pub enum CliError {
    UnknownCommand(String),
    MissingArgument(&'static str),
    Io(io::Error),
    Json(serde_json::Error),
    Store(StoreError),
    Round(RoundError),
    Snapshot(SnapshotError),
    InvalidNumber(String),
    InvalidDifficulty(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::UnknownCommand(cmd) => write!(f, "Unknown command: {cmd}\n{USAGE}"),
            CliError::MissingArgument(arg) => write!(f, "Missing argument: {arg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Store(err) => write!(f, "Stats error: {err}"),
            CliError::Round(err) => write!(f, "Game error: {err}"),
            CliError::Snapshot(err) => write!(f, "Invalid snapshot: {err}"),
            CliError::InvalidNumber(value) => write!(f, "Invalid number: {value}"),
            CliError::InvalidDifficulty(value) => {
                write!(f, "Invalid difficulty: {value}. Valid difficulties: easy, normal")
            }
        }
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(value: io::Error) -> Self {
        CliError::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        CliError::Json(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        CliError::Store(value)
    }
}

impl From<SnapshotError> for CliError {
    fn from(value: SnapshotError) -> Self {
        CliError::Snapshot(value)
    }
}

impl From<RoundError> for CliError {
    fn from(value: RoundError) -> Self {
        CliError::Round(value)
    }
}

/// Options for an interactive match.
#[derive(Debug, Clone)]
pub struct PlayOptions {
    pub seed: Option<u64>,
    pub stats_file: PathBuf,
    pub difficulty: BotDifficulty,
    pub filter: RaiseFilter,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            seed: None,
            stats_file: default_stats_file(),
            difficulty: BotDifficulty::from_env(),
            filter: RaiseFilter::from_env(),
        }
    }
}

/// Head-to-head tallies from `eval`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalTally {
    pub matches: usize,
    pub normal_wins: usize,
    pub easy_wins: usize,
    pub rounds: usize,
    pub forced_challenges: usize,
}

pub fn run_cli<I>(args: I) -> Result<CliOutcome, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(cmd) = args.next() else {
        return Ok(CliOutcome::NotHandled);
    };

    match cmd.as_str() {
        "play" => {
            let mut options = PlayOptions::default();
            while let Some(flag) = args.next() {
                match flag.as_str() {
                    "--seed" => {
                        let value = args.next().ok_or(CliError::MissingArgument("--seed <N>"))?;
                        options.seed = Some(parse_number(&value)?);
                    }
                    "--stats-file" => {
                        let value = args
                            .next()
                            .ok_or(CliError::MissingArgument("--stats-file <path>"))?;
                        options.stats_file = PathBuf::from(value);
                    }
                    "--difficulty" => {
                        let value = args
                            .next()
                            .ok_or(CliError::MissingArgument("--difficulty <easy|normal>"))?;
                        options.difficulty = BotDifficulty::parse(&value)
                            .ok_or(CliError::InvalidDifficulty(value))?;
                    }
                    "--strict" => options.filter = RaiseFilter::StrictRaise,
                    other => return Err(CliError::UnknownCommand(other.to_string())),
                }
            }
            run_play(options)?;
            Ok(CliOutcome::Handled)
        }
        "stats" => {
            let mut path = default_stats_file();
            while let Some(flag) = args.next() {
                match flag.as_str() {
                    "--stats-file" => {
                        let value = args
                            .next()
                            .ok_or(CliError::MissingArgument("--stats-file <path>"))?;
                        path = PathBuf::from(value);
                    }
                    other => return Err(CliError::UnknownCommand(other.to_string())),
                }
            }
            print_stats(path)?;
            Ok(CliOutcome::Handled)
        }
        "eval" | "--eval" => {
            let matches_arg = args.next().ok_or(CliError::MissingArgument(
                "eval <matches> [--seed N] [--strict]",
            ))?;
            let matches = parse_number(&matches_arg)? as usize;
            let mut seed = 0u64;
            let mut filter = RaiseFilter::Permissive;
            while let Some(flag) = args.next() {
                match flag.as_str() {
                    "--seed" => {
                        let value = args.next().ok_or(CliError::MissingArgument("--seed <N>"))?;
                        seed = parse_number(&value)?;
                    }
                    "--strict" => filter = RaiseFilter::StrictRaise,
                    other => return Err(CliError::UnknownCommand(other.to_string())),
                }
            }
            let tally = run_eval(matches, seed, filter)?;
            print_tally(&tally, filter);
            Ok(CliOutcome::Handled)
        }
        "--export-snapshot" => {
            let path = args
                .next()
                .map(PathBuf::from)
                .ok_or(CliError::MissingArgument("--export-snapshot <path> [seed]"))?;
            let seed = args.next().map(|s| parse_number(&s)).transpose()?.unwrap_or(0);
            export_snapshot(path, seed)?;
            Ok(CliOutcome::Handled)
        }
        "--import-snapshot" => {
            let path = args
                .next()
                .map(PathBuf::from)
                .ok_or(CliError::MissingArgument("--import-snapshot <path>"))?;
            import_snapshot(path)?;
            Ok(CliOutcome::Handled)
        }
        "--version" | "-V" => {
            println!("{}", version_line());
            Ok(CliOutcome::Handled)
        }
        "--help" | "-h" | "help" => {
            println!("{USAGE}");
            Ok(CliOutcome::Handled)
        }
        other => Err(CliError::UnknownCommand(other.to_string())),
    }
}

pub fn version_line() -> String {
    format!(
        "{} {} ({}), built {} [{}]",
        AppInfo::name(),
        AppInfo::version(),
        AppInfo::codename(),
        env!("LIARS_BUILD_DATE"),
        env!("LIARS_BUILD_PROFILE")
    )
}

pub fn run_play(options: PlayOptions) -> Result<(), CliError> {
    let mut store = JsonFileStore::open(&options.stats_file)?;
    let policy = HeuristicPolicy::new(options.difficulty).with_filter(options.filter);
    let mut controller = GameController::new_with_seed(options.seed, Side::Human, policy);

    println!(
        "{} {}: you against {} (match seed {}).",
        AppInfo::name(),
        AppInfo::version(),
        controller.policy_name(),
        controller.state().seed()
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let winner = console::play_match(&mut controller, &mut stdin.lock(), &mut stdout.lock())?;

    match winner {
        Some(winner) => {
            let stats = GameStats::record(&mut store, winner)?;
            println!(
                "Record: {} wins, {} losses, {} games ({}% won). Saved to {}",
                stats.wins,
                stats.losses,
                stats.games_played,
                stats.win_rate_percent(),
                store.path().display()
            );
        }
        None => println!("Match abandoned; stats unchanged."),
    }
    Ok(())
}

fn print_stats(path: PathBuf) -> Result<(), CliError> {
    let store = JsonFileStore::open(&path)?;
    let stats = GameStats::load(&store);
    println!("Stats file: {}", path.display());
    println!("Games played: {}", stats.games_played);
    println!("Wins: {}", stats.wins);
    println!("Losses: {}", stats.losses);
    println!("Win rate: {}%", stats.win_rate_percent());
    Ok(())
}

/// Normal against Easy, alternating who opens. Normal sits on `Side::Human`.
pub fn run_eval(matches: usize, seed: u64, filter: RaiseFilter) -> Result<EvalTally, CliError> {
    let mut tally = EvalTally {
        matches,
        ..EvalTally::default()
    };

    for index in 0..matches {
        let match_seed = seed.wrapping_add(index as u64);
        let starting_side = if index % 2 == 0 {
            Side::Human
        } else {
            Side::Computer
        };
        let mut state = MatchState::with_config(
            MatchConfig {
                starting_side,
                ..MatchConfig::default()
            },
            match_seed,
        );
        let mut policies = [
            HeuristicPolicy::normal().with_filter(filter),
            HeuristicPolicy::easy(),
        ];
        let mut rng = RngSource::seeded(match_seed.rotate_left(32));

        while !state.is_over() {
            let side = state.to_act();
            let policy: &mut dyn Policy = &mut policies[side.index()];
            if let TurnOutcome::Challenged { forced: true, .. } =
                take_turn(&mut state, policy, &mut rng)?
            {
                tally.forced_challenges += 1;
            }
        }

        tally.rounds += state.round_number() as usize;
        match state.winner() {
            Some(Side::Human) => tally.normal_wins += 1,
            Some(Side::Computer) => tally.easy_wins += 1,
            None => {}
        }
    }

    Ok(tally)
}

fn print_tally(tally: &EvalTally, filter: RaiseFilter) {
    let pct = |wins: usize| {
        if tally.matches == 0 {
            0.0
        } else {
            wins as f64 * 100.0 / tally.matches as f64
        }
    };
    println!(
        "Evaluated {} matches (normal bot uses {} raises)",
        tally.matches,
        filter.as_str()
    );
    println!(
        "  normal: {} wins ({:.1}%)",
        tally.normal_wins,
        pct(tally.normal_wins)
    );
    println!(
        "  easy:   {} wins ({:.1}%)",
        tally.easy_wins,
        pct(tally.easy_wins)
    );
    println!(
        "  rounds: {}  forced challenges: {}",
        tally.rounds, tally.forced_challenges
    );
}

fn export_snapshot(path: PathBuf, seed: u64) -> Result<(), CliError> {
    let state = MatchState::with_seed(Side::Human, seed);
    let json = MatchSnapshot::to_json(&state)?;
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, json)?;
    println!("Snapshot saved to {}\nSeed: {}", path.display(), seed);
    Ok(())
}

fn import_snapshot(path: PathBuf) -> Result<(), CliError> {
    if !path.exists() {
        return Err(CliError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Snapshot not found: {}", path.display()),
        )));
    }

    let json = fs::read_to_string(&path)?;
    let restored = MatchSnapshot::from_json(&json)?.restore()?;
    println!(
        "Snapshot loaded from {}\nSeed: {}\nRound: {}\nDice: you {} / computer {}\nTo act: {}",
        path.display(),
        restored.seed(),
        restored.round_number(),
        restored.dice_count(Side::Human),
        restored.dice_count(Side::Computer),
        restored.to_act()
    );
    Ok(())
}

fn parse_number(value: &str) -> Result<u64, CliError> {
    value
        .parse::<u64>()
        .map_err(|_| CliError::InvalidNumber(value.to_string()))
}

fn default_stats_file() -> PathBuf {
    std::env::var_os("LIARS_STATS_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_is_not_handled() {
        assert!(matches!(
            run_cli(Vec::<String>::new()),
            Ok(CliOutcome::NotHandled)
        ));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(matches!(
            run_cli(args(&["fly"])),
            Err(CliError::UnknownCommand(cmd)) if cmd == "fly"
        ));
    }

    #[test]
    fn eval_requires_a_count() {
        assert!(matches!(
            run_cli(args(&["eval"])),
            Err(CliError::MissingArgument(_))
        ));
        assert!(matches!(
            run_cli(args(&["eval", "many"])),
            Err(CliError::InvalidNumber(_))
        ));
    }

    #[test]
    fn eval_tallies_every_match() {
        let tally = run_eval(6, 11, RaiseFilter::Permissive).unwrap();
        assert_eq!(tally.matches, 6);
        assert_eq!(tally.normal_wins + tally.easy_wins, 6);
        assert!(tally.rounds >= 6 * 5);
    }

    #[test]
    fn eval_is_reproducible() {
        let a = run_eval(4, 3, RaiseFilter::StrictRaise).unwrap();
        let b = run_eval(4, 3, RaiseFilter::StrictRaise).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn snapshot_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap").join("match.json");
        export_snapshot(path.clone(), 42).unwrap();
        let snapshot = MatchSnapshot::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(snapshot.seed, 42);
        import_snapshot(path).unwrap();
    }

    #[test]
    fn tampered_snapshot_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.json");
        fs::write(
            &path,
            r#"{"seed": 3, "round_number": 2, "dice_counts": [9, 7], "opener": "Human", "starting_dice": 5}"#,
        )
        .unwrap();
        assert!(matches!(
            import_snapshot(path),
            Err(CliError::Snapshot(SnapshotError::DiceAboveStart { count: 9, .. }))
        ));
    }

    #[test]
    fn version_line_names_the_app() {
        assert!(version_line().starts_with("liars-dice "));
    }
}
