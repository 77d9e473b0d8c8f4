//! Per-arm running statistics shared by every strategy.

use bandit_core::{BanditError, BanditResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmStats {
    pub pulls: u64,
    pub total_reward: f64,
    pub mean: f64,
}

impl ArmStats {
    /// Incremental average: `mean += (reward - mean) / pulls`.
    pub fn record(&mut self, reward: f64) {
        self.pulls += 1;
        self.total_reward += reward;
        self.mean += (reward - self.mean) / self.pulls as f64;
    }
}

/// Fixed-size arm table plus the global step counter.
///
/// The sum of all pull counts always equals `steps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanditState {
    arms: Vec<ArmStats>,
    steps: u64,
}

impl BanditState {
    pub fn new(n_arms: usize) -> Self {
        Self {
            arms: vec![ArmStats::default(); n_arms],
            steps: 0,
        }
    }

    pub fn n_arms(&self) -> usize {
        self.arms.len()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn arms(&self) -> &[ArmStats] {
        &self.arms
    }

    pub fn arm(&self, arm: usize) -> Option<&ArmStats> {
        self.arms.get(arm)
    }

    pub fn check_arm(&self, arm: usize) -> BanditResult<()> {
        if arm >= self.arms.len() {
            return Err(BanditError::InvalidArmIndex {
                arm,
                n_arms: self.arms.len(),
            });
        }
        Ok(())
    }

    pub fn record(&mut self, arm: usize, reward: f64) -> BanditResult<&ArmStats> {
        self.check_arm(arm)?;
        self.steps += 1;
        let stats = &mut self.arms[arm];
        stats.record(reward);
        Ok(stats)
    }

    pub fn counts(&self) -> Vec<u64> {
        self.arms.iter().map(|a| a.pulls).collect()
    }

    pub fn means(&self) -> Vec<f64> {
        self.arms.iter().map(|a| a.mean).collect()
    }

    /// Lowest-index arm that has never been pulled.
    pub fn first_unpulled(&self) -> Option<usize> {
        self.arms.iter().position(|a| a.pulls == 0)
    }

    pub fn best_mean_arm(&self) -> usize {
        argmax(self.arms.iter().map(|a| a.mean))
    }

    pub fn reset(&mut self) {
        self.arms.iter_mut().for_each(|a| *a = ArmStats::default());
        self.steps = 0;
    }
}

/// Index of the largest score; ties go to the lowest index.
pub(crate) fn argmax(scores: impl IntoIterator<Item = f64>) -> usize {
    let mut best_idx = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (idx, score) in scores.into_iter().enumerate() {
        if score > best_score {
            best_score = score;
            best_idx = idx;
        }
    }
    best_idx
}
