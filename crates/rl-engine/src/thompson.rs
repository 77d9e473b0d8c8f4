//! Thompson Sampling over Beta-Bernoulli posteriors.
//!
//! Each arm keeps success/failure counts; its posterior is
//! `Beta(alpha0 + successes, beta0 + failures)`. A reward counts as a
//! success when it is at or above the configured threshold.

use crate::state::{argmax, BanditState};
use bandit_core::config::ThompsonConfig;
use bandit_core::types::Posterior;
use bandit_core::BanditResult;
use rand::Rng;
use rand_distr::{Beta, Distribution};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct BetaCounts {
    successes: u64,
    failures: u64,
}

#[derive(Debug, Clone)]
pub struct ThompsonSampling {
    initial_alpha: f64,
    initial_beta: f64,
    success_threshold: f64,
    counts: Vec<BetaCounts>,
}

impl ThompsonSampling {
    pub fn new(n_arms: usize, config: &ThompsonConfig) -> BanditResult<Self> {
        config.validate()?;
        Ok(Self {
            initial_alpha: config.initial_alpha,
            initial_beta: config.initial_beta,
            success_threshold: config.success_threshold,
            counts: vec![BetaCounts::default(); n_arms],
        })
    }

    pub fn success_threshold(&self) -> f64 {
        self.success_threshold
    }

    pub fn is_success(&self, reward: f64) -> bool {
        reward >= self.success_threshold
    }

    pub fn posterior(&self, arm: usize) -> Option<Posterior> {
        let c = self.counts.get(arm)?;
        let alpha = self.initial_alpha + c.successes as f64;
        let beta = self.initial_beta + c.failures as f64;
        Some(Posterior {
            alpha,
            beta,
            mean: alpha / (alpha + beta),
        })
    }

    /// One posterior draw per arm; the highest draw wins.
    pub fn choose(&self, state: &BanditState, rng: &mut impl Rng) -> usize {
        let samples: Vec<f64> = (0..state.n_arms())
            .map(|arm| match self.posterior(arm) {
                Some(p) => sample_beta(rng, p.alpha, p.beta),
                None => f64::NEG_INFINITY,
            })
            .collect();
        argmax(samples)
    }

    /// Caller has already validated the arm index.
    pub fn observe(&mut self, arm: usize, reward: f64) {
        let success = self.is_success(reward);
        if let Some(c) = self.counts.get_mut(arm) {
            if success {
                c.successes += 1;
            } else {
                c.failures += 1;
            }
        }
    }

    pub fn reset(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = BetaCounts::default());
    }
}

fn sample_beta(rng: &mut impl Rng, alpha: f64, beta: f64) -> f64 {
    match Beta::new(alpha, beta) {
        Ok(dist) => dist.sample(rng),
        Err(_) => alpha / (alpha + beta),
    }
}
