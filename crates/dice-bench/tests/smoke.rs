use std::fs;
use std::path::Path;

use dice_bench::config::BenchmarkConfig;
use dice_bench::tournament::TournamentRunner;
use sha2::{Digest, Sha256};
use tempfile::tempdir;

fn load_config(output_dir: &Path, swap_seats: bool) -> BenchmarkConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
matches:
  seed: 4242
  count: 6
  swap_seats: {swap_seats}
agents:
  - name: "normal"
    kind: "heuristic"
    params:
      difficulty: "normal"
  - name: "easy_strict"
    kind: "heuristic"
    params:
      difficulty: "easy"
      raise_filter: "strict"
outputs:
  dir: "{dir}"
metrics:
  baseline: "normal"
logging:
  enable_structured: false
"#,
        dir = output_dir.display(),
    );

    let cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

/// Hash of the JSONL output with wall-clock timings zeroed.
fn normalized_hash(jsonl: &str) -> String {
    let mut normalized = String::new();
    for line in jsonl.lines() {
        let mut value: serde_json::Value = serde_json::from_str(line).expect("row decodes to JSON");
        if let Some(seats) = value.get_mut("seats").and_then(|s| s.as_array_mut()) {
            for seat in seats {
                if let Some(speed) = seat.get_mut("speed_ms_turn") {
                    *speed = serde_json::Value::Number(
                        serde_json::Number::from_f64(0.0).expect("number for normalized speed"),
                    );
                }
            }
        }
        normalized.push_str(&serde_json::to_string(&value).expect("re-serialize normalized row"));
        normalized.push('\n');
    }

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

fn run_once(dir: &Path, swap_seats: bool) -> (String, String) {
    let config = load_config(dir, swap_seats);
    let expected_jsonl = dir.join("test_smoke").join("matches.jsonl");
    let runner = TournamentRunner::new(config).expect("runner created");
    let summary = runner.run().expect("tournament completes");

    let expected_rows = if swap_seats { 12 } else { 6 };
    assert_eq!(summary.matches_played, 6);
    assert_eq!(summary.rows_written, expected_rows);
    assert_eq!(summary.jsonl_path, expected_jsonl);
    assert!(summary.summary_path.exists(), "summary markdown missing");
    assert!(summary.telemetry_path.is_none());

    let total_wins: u64 = summary.analytics.agents.iter().map(|a| a.wins).sum();
    assert_eq!(total_wins, expected_rows as u64);

    let jsonl = fs::read_to_string(&summary.jsonl_path).expect("jsonl readable");
    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    (jsonl, markdown)
}

#[test]
fn tournament_output_is_reproducible() {
    let first = tempdir().expect("temp dir");
    let second = tempdir().expect("temp dir");

    let (jsonl_a, markdown) = run_once(first.path(), true);
    let (jsonl_b, _) = run_once(second.path(), true);

    assert_eq!(jsonl_a.lines().count(), 12);
    assert_eq!(
        normalized_hash(&jsonl_a),
        normalized_hash(&jsonl_b),
        "same seed must give the same match rows"
    );
    assert!(markdown.contains("| normal |"));
    assert!(markdown.contains("| easy_strict |"));
}

#[test]
fn every_row_records_a_finished_match() {
    let dir = tempdir().expect("temp dir");
    let (jsonl, _) = run_once(dir.path(), false);

    for line in jsonl.lines() {
        let row: serde_json::Value = serde_json::from_str(line).expect("row decodes");
        let winner = row["winner"].as_str().expect("winner recorded");
        let seats = row["seats"].as_array().expect("seat rows");
        assert_eq!(seats.len(), 2);

        let mut winners = 0;
        for seat in seats {
            let dice_left = seat["dice_left"].as_u64().expect("dice left");
            if seat["bot"].as_str() == Some(winner) {
                assert!(dice_left >= 1);
                winners += 1;
            } else {
                assert_eq!(dice_left, 0);
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(row["starting_agent"].as_str(), Some("normal"));
    }
}

#[test]
fn runner_rejects_a_third_agent() {
    let dir = tempdir().expect("temp dir");
    let mut config = load_config(dir.path(), false);
    let mut third = config.agents[0].clone();
    third.name = "third".to_string();
    config.agents.push(third);

    let err = TournamentRunner::new(config).err().expect("three agents rejected");
    assert!(err.to_string().contains("exactly 2 agents"));
}
