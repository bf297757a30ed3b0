use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{Binomial, DiscreteCDF};
use thiserror::Error;

use crate::config::{AgentConfig, AgentKind, BenchmarkConfig};
use crate::tournament::{DecisionSummary, MatchOutcome};

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline agent '{0}' not present in tournament results")]
    MissingBaseline(String),
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("binomial test failed: {0}")]
    Stats(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub struct AnalyticsCollector {
    baseline: String,
    agents: HashMap<String, AgentAccumulator>,
    agent_order: Vec<String>,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Result<Self, AnalyticsError> {
        let baseline = config.metrics.baseline.clone();

        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(agent.name.clone(), AgentAccumulator::new(agent.clone()));
            order.push(agent.name.clone());
        }

        if !agents.contains_key(&baseline) {
            return Err(AnalyticsError::MissingBaseline(baseline));
        }

        Ok(Self {
            baseline,
            agents,
            agent_order: order,
        })
    }

    pub fn record_match(&mut self, outcome: &MatchOutcome) -> Result<(), AnalyticsError> {
        for seat in &outcome.seat_results {
            let acc = self
                .agents
                .get_mut(&seat.agent_name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(seat.agent_name.clone()))?;

            acc.matches += 1;
            if seat.agent_name == outcome.starting_agent {
                acc.starts += 1;
                if seat.won {
                    acc.wins_as_starter += 1;
                }
            }
            if seat.won {
                acc.wins += 1;
                acc.dice_left_on_win += seat.dice_left as u64;
            }
            acc.challenges += u64::from(seat.challenges);
            acc.successful_challenges += u64::from(seat.successful_challenges);
            acc.forced_challenges += u64::from(seat.forced_challenges);
            acc.record_metrics(&seat.metrics);
        }
        Ok(())
    }

    pub fn finalize(mut self) -> Result<AnalyticsSummary, AnalyticsError> {
        let mut agents = Vec::new();
        for name in &self.agent_order {
            if let Some(acc) = self.agents.remove(name) {
                agents.push(acc.into_report()?);
            }
        }

        for agent in &mut agents {
            if agent.name == self.baseline {
                agent.p_value = 1.0;
            }
        }

        Ok(AnalyticsSummary {
            baseline: self.baseline,
            agents,
        })
    }
}

struct AgentAccumulator {
    config: AgentConfig,
    matches: u64,
    wins: u64,
    starts: u64,
    wins_as_starter: u64,
    dice_left_on_win: u64,
    challenges: u64,
    successful_challenges: u64,
    forced_challenges: u64,
    total_latency_ms: f64,
    total_decisions: u64,
}

impl AgentAccumulator {
    fn new(config: AgentConfig) -> Self {
        Self {
            config,
            matches: 0,
            wins: 0,
            starts: 0,
            wins_as_starter: 0,
            dice_left_on_win: 0,
            challenges: 0,
            successful_challenges: 0,
            forced_challenges: 0,
            total_latency_ms: 0.0,
            total_decisions: 0,
        }
    }

    fn record_metrics(&mut self, metrics: &DecisionSummary) {
        self.total_latency_ms += metrics.total_ms;
        self.total_decisions += u64::from(metrics.decisions);
    }

    fn into_report(self) -> Result<AgentReport, AnalyticsError> {
        let win_rate = ratio(self.wins, self.matches);
        let avg_latency = if self.total_decisions == 0 {
            0.0
        } else {
            self.total_latency_ms / self.total_decisions as f64
        };

        Ok(AgentReport {
            name: self.config.name.clone(),
            kind: self.config.kind.clone(),
            params: self.config.params.clone(),
            matches: self.matches,
            wins: self.wins,
            win_rate,
            ci95: confidence_interval(self.wins, self.matches),
            starter_win_rate: ratio(self.wins_as_starter, self.starts),
            avg_dice_left_on_win: ratio(self.dice_left_on_win, self.wins),
            challenges: self.challenges,
            challenge_success_rate: ratio(self.successful_challenges, self.challenges),
            forced_challenges: self.forced_challenges,
            average_ms_per_decision: avg_latency,
            p_value: binomial_test(self.wins, self.matches)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub agents: Vec<AgentReport>,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Tournament Summary\n\n");
        rows.push_str(&format!("Baseline: {}\n\n", self.baseline));
        rows.push_str("| Agent | Kind | Matches | Wins | Win % | 95% CI | Win % as opener | Dice left on win | Challenges | Challenge hit % | Forced | Avg ms/decision | p-value |\n");
        rows.push_str("|-------|------|---------|------|-------|--------|-----------------|------------------|------------|-----------------|--------|-----------------|---------|\n");

        for agent in &self.agents {
            rows.push_str(&format!(
                "| {name} | {kind:?} | {matches} | {wins} | {win:.1}% | [{ci_low:.1}%, {ci_high:.1}%] | {opener:.1}% | {dice:.2} | {challenges} | {hit:.1}% | {forced} | {latency:.3} | {pval:.3} |\n",
                name = agent.name,
                kind = agent.kind,
                matches = agent.matches,
                wins = agent.wins,
                win = agent.win_rate * 100.0,
                ci_low = agent.ci95.0 * 100.0,
                ci_high = agent.ci95.1 * 100.0,
                opener = agent.starter_win_rate * 100.0,
                dice = agent.avg_dice_left_on_win,
                challenges = agent.challenges,
                hit = agent.challenge_success_rate * 100.0,
                forced = agent.forced_challenges,
                latency = agent.average_ms_per_decision,
                pval = agent.p_value,
            ));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: AgentKind,
    pub params: serde_yaml::Value,
    pub matches: u64,
    pub wins: u64,
    pub win_rate: f64,
    pub ci95: (f64, f64),
    pub starter_win_rate: f64,
    pub avg_dice_left_on_win: f64,
    pub challenges: u64,
    pub challenge_success_rate: f64,
    pub forced_challenges: u64,
    pub average_ms_per_decision: f64,
    /// Two-sided binomial test of the win count against an even split.
    pub p_value: f64,
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Normal-approximation interval for a win proportion, clamped to [0, 1].
fn confidence_interval(wins: u64, matches: u64) -> (f64, f64) {
    if matches == 0 {
        return (0.0, 0.0);
    }
    let p = ratio(wins, matches);
    let margin = CONFIDENCE_Z * (p * (1.0 - p) / matches as f64).sqrt();
    ((p - margin).max(0.0), (p + margin).min(1.0))
}

fn binomial_test(successes: u64, trials: u64) -> Result<f64, AnalyticsError> {
    if trials == 0 {
        return Ok(1.0);
    }
    let dist = Binomial::new(0.5, trials).map_err(|e| AnalyticsError::Stats(e.to_string()))?;
    let lower = dist.cdf(successes);
    let upper = if successes == 0 {
        1.0
    } else {
        1.0 - dist.cdf(successes - 1)
    };
    Ok((2.0 * lower.min(upper)).min(1.0))
}
