//! Simulated arms with hidden Bernoulli success probabilities.

use bandit_core::{BanditError, BanditResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

const RANDOM_PROB_LOW: f64 = 0.1;
const RANDOM_PROB_HIGH: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardEnvironment {
    true_probs: Vec<f64>,
}

impl RewardEnvironment {
    /// Probabilities drawn uniformly from [0.1, 0.9).
    pub fn random(n_arms: usize, rng: &mut impl Rng) -> BanditResult<Self> {
        if n_arms < 1 {
            return Err(BanditError::config("number of arms must be at least 1"));
        }
        let true_probs = (0..n_arms)
            .map(|_| rng.gen_range(RANDOM_PROB_LOW..RANDOM_PROB_HIGH))
            .collect();
        Ok(Self { true_probs })
    }

    pub fn from_probabilities(true_probs: Vec<f64>) -> BanditResult<Self> {
        if true_probs.is_empty() {
            return Err(BanditError::config("at least one probability is required"));
        }
        if let Some(bad) = true_probs.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(BanditError::config(format!(
                "probabilities must be in [0, 1], got {bad}"
            )));
        }
        Ok(Self { true_probs })
    }

    /// Parse a comma-separated list such as `"0.10, 0.55, 0.80"`.
    pub fn parse(text: &str, n_arms: usize) -> BanditResult<Self> {
        let probs = text
            .split(',')
            .map(|part| {
                part.trim().parse::<f64>().map_err(|_| {
                    BanditError::config(format!("invalid probability '{}'", part.trim()))
                })
            })
            .collect::<BanditResult<Vec<f64>>>()?;
        if probs.len() != n_arms {
            return Err(BanditError::config(format!(
                "expected {n_arms} probabilities, got {}",
                probs.len()
            )));
        }
        Self::from_probabilities(probs)
    }

    pub fn n_arms(&self) -> usize {
        self.true_probs.len()
    }

    pub fn true_probs(&self) -> &[f64] {
        &self.true_probs
    }

    /// Binary reward: 1.0 with the arm's probability, else 0.0.
    pub fn draw(&self, arm: usize, rng: &mut impl Rng) -> BanditResult<f64> {
        let p = self
            .true_probs
            .get(arm)
            .copied()
            .ok_or(BanditError::InvalidArmIndex {
                arm,
                n_arms: self.true_probs.len(),
            })?;
        Ok(if rng.gen::<f64>() < p { 1.0 } else { 0.0 })
    }

    pub fn best_arm(&self) -> usize {
        let mut best = 0;
        for (i, p) in self.true_probs.iter().enumerate() {
            if *p > self.true_probs[best] {
                best = i;
            }
        }
        best
    }

    /// Expected regret of pulling `arm` instead of the best arm.
    pub fn regret(&self, arm: usize) -> f64 {
        let best = self.true_probs[self.best_arm()];
        self.true_probs.get(arm).map(|p| best - p).unwrap_or(0.0)
    }

    /// Root-mean-square error between estimates and the true probabilities.
    pub fn rmse(&self, estimates: &[f64]) -> f64 {
        let n = self.true_probs.len().min(estimates.len());
        if n == 0 {
            return 0.0;
        }
        let sum_sq: f64 = self
            .true_probs
            .iter()
            .zip(estimates)
            .map(|(truth, est)| (est - truth).powi(2))
            .sum();
        (sum_sq / n as f64).sqrt()
    }
}
