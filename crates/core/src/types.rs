use crate::error::{BanditError, BanditResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three bandit strategies offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    EpsilonGreedy,
    Ucb1,
    ThompsonSampling,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::EpsilonGreedy,
        Algorithm::Ucb1,
        Algorithm::ThompsonSampling,
    ];

    /// Short key used for log file names and session lookups.
    pub fn key(&self) -> &'static str {
        match self {
            Algorithm::EpsilonGreedy => "eps",
            Algorithm::Ucb1 => "ucb",
            Algorithm::ThompsonSampling => "thompson",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Algorithm::EpsilonGreedy => "Multi-Armed Bandit: Epsilon-Greedy",
            Algorithm::Ucb1 => "Multi-Armed Bandit: UCB1",
            Algorithm::ThompsonSampling => "Multi-Armed Bandit: Thompson Sampling",
        }
    }

    pub fn default_log_file(&self) -> String {
        format!("{}_logs.csv", self.key())
    }

    /// Whether the engine runs a deterministic warm-up pass before selecting.
    pub fn warms_up(&self) -> bool {
        matches!(self, Algorithm::ThompsonSampling)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::EpsilonGreedy => "epsilon_greedy",
            Algorithm::Ucb1 => "ucb1",
            Algorithm::ThompsonSampling => "thompson_sampling",
        };
        f.write_str(name)
    }
}

impl FromStr for Algorithm {
    type Err = BanditError;

    fn from_str(s: &str) -> BanditResult<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "epsilon_greedy" | "eps" | "epsilon" => Ok(Algorithm::EpsilonGreedy),
            "ucb1" | "ucb" => Ok(Algorithm::Ucb1),
            "thompson" | "thompson_sampling" | "ts" => Ok(Algorithm::ThompsonSampling),
            other => Err(BanditError::config(format!("unknown algorithm '{other}'"))),
        }
    }
}

/// Lifecycle of an engine. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    Uninitialized,
    WarmingUp,
    Ready,
}

/// Beta posterior parameters of a Thompson arm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posterior {
    pub alpha: f64,
    pub beta: f64,
    pub mean: f64,
}

/// Snapshot of one arm as reported by `estimates()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmEstimate {
    pub arm: usize,
    pub pulls: u64,
    pub total_reward: f64,
    pub mean: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posterior: Option<Posterior>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
}

/// Result of a single pull, consumed by the charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: u64,
    pub chosen_arm: usize,
    pub reward: f64,
    pub estimates: Vec<f64>,
}

/// One row of the per-pull CSV log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub step: u64,
    pub arm: usize,
    pub reward: f64,
    pub algorithm: Algorithm,
    pub counts: Vec<u64>,
    pub values: Vec<f64>,
}

impl LogRecord {
    pub fn new(algorithm: Algorithm, record: &StepRecord, counts: Vec<u64>) -> Self {
        Self {
            timestamp: Utc::now(),
            step: record.step,
            arm: record.chosen_arm,
            reward: record.reward,
            algorithm,
            counts,
            values: record.estimates.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("eps".parse::<Algorithm>().unwrap(), Algorithm::EpsilonGreedy);
        assert_eq!(
            "Epsilon-Greedy".parse::<Algorithm>().unwrap(),
            Algorithm::EpsilonGreedy
        );
        assert_eq!("UCB1".parse::<Algorithm>().unwrap(), Algorithm::Ucb1);
        assert_eq!(
            "thompson-sampling".parse::<Algorithm>().unwrap(),
            Algorithm::ThompsonSampling
        );
    }

    #[test]
    fn test_unknown_algorithm_is_config_error() {
        let err = "softmax".parse::<Algorithm>().unwrap_err();
        assert!(matches!(err, BanditError::Configuration(_)));
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for algo in Algorithm::ALL {
            assert_eq!(algo.to_string().parse::<Algorithm>().unwrap(), algo);
        }
    }

    #[test]
    fn test_log_file_names() {
        assert_eq!(Algorithm::EpsilonGreedy.default_log_file(), "eps_logs.csv");
        assert_eq!(Algorithm::Ucb1.default_log_file(), "ucb_logs.csv");
        assert_eq!(
            Algorithm::ThompsonSampling.default_log_file(),
            "thompson_logs.csv"
        );
    }

    #[test]
    fn test_estimate_serialization_skips_missing_fields() {
        let estimate = ArmEstimate {
            arm: 0,
            pulls: 3,
            total_reward: 2.0,
            mean: 2.0 / 3.0,
            posterior: None,
            upper_bound: None,
        };
        let json = serde_json::to_string(&estimate).unwrap();
        assert!(!json.contains("posterior"));
        assert!(!json.contains("upper_bound"));
    }
}
