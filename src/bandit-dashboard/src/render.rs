//! Text rendering of a session: the terminal stand-in for the dashboard's
//! charts and JSON panels.

use bandit_core::types::{Algorithm, ArmEstimate, StepRecord};
use bandit_simulator::Session;
use serde::Serialize;
use serde_json::Value;

const BAR_WIDTH: usize = 30;
const RECENT_STEPS: usize = 10;

/// Machine-readable snapshot printed by `run --json`.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub session_id: String,
    pub algorithm: Algorithm,
    pub steps: u64,
    pub true_probs: Vec<f64>,
    pub estimates: Vec<ArmEstimate>,
    pub pull_counts: Value,
    pub smoothed_rmse: Option<f64>,
    pub cumulative_regret: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explore_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exploit_count: Option<u64>,
}

impl Summary {
    pub fn from_session(session: &Session, rmse_window: usize) -> Self {
        let split = session.engine().exploration_counts();
        Self {
            session_id: session.id().to_string(),
            algorithm: session.algorithm(),
            steps: session.step(),
            true_probs: session.environment().true_probs().to_vec(),
            estimates: session.estimates(),
            pull_counts: session.pull_counts_view(),
            smoothed_rmse: session.smoothed_rmse(rmse_window).last().copied(),
            cumulative_regret: session.cumulative_regret(),
            explore_count: split.map(|(explore, _)| explore),
            exploit_count: split.map(|(_, exploit)| exploit),
        }
    }
}

fn bar(value: f64) -> String {
    let filled = (value.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn recent_rewards(history: &[StepRecord]) -> String {
    let start = history.len().saturating_sub(RECENT_STEPS);
    history[start..]
        .iter()
        .map(|r| format!("#{}:a{}={}", r.step, r.chosen_arm, r.reward))
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn print_dashboard(session: &Session, rmse_window: usize) {
    let algorithm = session.algorithm();
    println!("{}", algorithm.title());
    println!("{}", "=".repeat(algorithm.title().len()));
    println!("Session {}  step {}", session.id(), session.step());
    println!();

    println!("True vs Estimated");
    let true_probs = session.environment().true_probs();
    for estimate in session.estimates() {
        let truth = true_probs.get(estimate.arm).copied().unwrap_or_default();
        println!(
            "  arm {:>2}  true {:.3} |{}|  est {:.3} |{}|  pulls {}",
            estimate.arm,
            truth,
            bar(truth),
            estimate.mean,
            bar(estimate.mean),
            estimate.pulls,
        );
    }
    println!();

    if let Some((explore, exploit)) = session.engine().exploration_counts() {
        println!("Explore / exploit: {explore} / {exploit}");
    }

    println!("Pull counts: {}", session.pull_counts_view());

    if !session.history().is_empty() {
        println!("Recent rewards: {}", recent_rewards(session.history()));
    }

    match session.smoothed_rmse(rmse_window).last() {
        Some(rmse) => println!("RMSE (smoothed, window {rmse_window}): {rmse:.4}"),
        None => println!("RMSE: no pulls yet"),
    }
    println!("Cumulative expected regret: {:.3}", session.cumulative_regret());
}

pub fn print_home() {
    println!("Multi-Armed Bandit Dashboard");
    println!();
    println!("1. Epsilon-Greedy");
    println!("   With probability epsilon pick a random arm (explore), otherwise the arm");
    println!("   with the highest estimated mean reward (exploit).");
    println!();
    println!("2. UCB1 (Upper Confidence Bound 1)");
    println!("   Pick the arm maximizing  mean_i + sqrt(2 ln t / n_i),  where t is the");
    println!("   total number of pulls and n_i the pulls of arm i. Unpulled arms go first.");
    println!();
    println!("3. Thompson Sampling");
    println!("   Keep a Beta(alpha, beta) posterior per arm, draw theta ~ Beta(alpha, beta)");
    println!("   for every arm and pick the highest draw. Every arm is pulled once first.");
    println!();
    println!("Usage:");
    println!("   bandit-dashboard run <epsilon-greedy|ucb1|thompson> [--pulls N]");
    println!("   bandit-dashboard run thompson --auto-rounds 10 --batch 100 --delay-ms 300");
    println!("   bandit-dashboard reset <algorithm>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandit_core::event_bus::noop_sink;
    use bandit_engine::BanditAlgorithm;
    use bandit_simulator::{ProbabilityMode, SessionParams};

    #[test]
    fn test_bar_width_is_constant() {
        assert_eq!(bar(0.0), ".".repeat(BAR_WIDTH));
        assert_eq!(bar(1.0), "#".repeat(BAR_WIDTH));
        assert_eq!(bar(1.7).len(), BAR_WIDTH);
        assert_eq!(bar(0.5).matches('#').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_summary_from_epsilon_session() {
        let mut session = Session::start(
            SessionParams {
                n_arms: 2,
                algorithm: BanditAlgorithm::EpsilonGreedy { epsilon: 0.2 },
                mode: ProbabilityMode::Manual(vec![0.3, 0.7]),
                seed: Some(5),
            },
            noop_sink(),
        )
        .unwrap();
        session.pull_batch(40).unwrap();

        let summary = Summary::from_session(&session, 2000);
        assert_eq!(summary.steps, 40);
        assert_eq!(
            summary.explore_count.unwrap() + summary.exploit_count.unwrap(),
            40
        );
        assert!(summary.smoothed_rmse.is_some());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["algorithm"], "epsilon_greedy");
        assert_eq!(json["estimates"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_recent_rewards_keeps_last_steps() {
        let history: Vec<StepRecord> = (1..=15)
            .map(|step| StepRecord {
                step,
                chosen_arm: 0,
                reward: 1.0,
                estimates: vec![1.0],
            })
            .collect();
        let text = recent_rewards(&history);
        assert!(text.starts_with("#6:"));
        assert_eq!(text.matches('#').count(), RECENT_STEPS);
    }
}
