use std::path::PathBuf;

use clap::Parser;

use dice_bench::config::BenchmarkConfig;
use dice_bench::logging::init_logging;
use dice_bench::tournament::TournamentRunner;

/// Heads-up tournament harness for the Liar's Dice bots.
#[derive(Debug, Parser)]
#[command(
    name = "dice-bench",
    author,
    version,
    about = "Deterministic Liar's Dice tournament harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (also the report subdirectory).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of match seeds to play.
    #[arg(long, value_name = "COUNT")]
    matches: Option<usize>,

    /// Override the RNG seed for match generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Play each seed once instead of once per seating.
    #[arg(long)]
    no_swap: bool,

    /// Exit after validating the configuration (no tournament is run).
    #[arg(long)]
    validate_only: bool,

    /// Log every bot decision regardless of config.
    #[arg(long)]
    log_decision_details: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(matches) = cli.matches {
        config.matches.count = matches;
    }

    if let Some(seed) = cli.seed {
        config.matches.seed = Some(seed);
    }

    if cli.no_swap {
        config.matches.swap_seats = false;
    }

    if cli.log_decision_details {
        config.logging.enable_structured = true;
        config.logging.decision_details = true;
    }

    config.validate()?;

    let paths = config.report_paths();
    let run_id = config.run_id.clone();
    let matches = config.matches.count;
    let seatings = config.matches.seatings();

    println!(
        "Loaded configuration '{run_id}': {} vs {} ({matches} matches, {seatings} seating{})",
        config.agents[0].name,
        config.agents[1].name,
        if seatings == 1 { "" } else { "s" }
    );

    let _logging_guard = init_logging(&config.logging, &paths)?;
    let baseline = config.metrics.baseline.clone();
    let runner = TournamentRunner::new(config)?;

    if cli.validate_only {
        println!("Validation-only mode: tournament execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Tournament complete for '{run_id}': {} matches × {} seatings → {} rows at {}",
        summary.matches_played,
        summary.seatings,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    for agent in &summary.analytics.agents {
        let marker = if agent.name == baseline { " (baseline)" } else { "" };
        println!(
            "  {}{marker}: {}/{} wins ({:.1}%), p = {:.3}",
            agent.name,
            agent.wins,
            agent.matches,
            agent.win_rate * 100.0,
            agent.p_value
        );
    }
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
