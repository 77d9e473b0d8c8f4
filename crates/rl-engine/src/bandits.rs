//! Multi-Armed Bandit engine: Thompson Sampling, UCB1, Epsilon-Greedy
//! behind one `choose_arm` / `update` / `estimates` interface.

use crate::epsilon_greedy::EpsilonGreedy;
use crate::state::BanditState;
use crate::thompson::ThompsonSampling;
use crate::ucb1::{upper_bound, Ucb1};
use bandit_core::config::{validate_n_arms, AppConfig, ThompsonConfig};
use bandit_core::types::{Algorithm, ArmEstimate, EnginePhase, StepRecord};
use bandit_core::{BanditError, BanditResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BanditAlgorithm {
    EpsilonGreedy {
        epsilon: f64,
    },
    Ucb1,
    ThompsonSampling {
        initial_alpha: f64,
        initial_beta: f64,
        success_threshold: f64,
    },
}

impl Default for BanditAlgorithm {
    fn default() -> Self {
        let defaults = ThompsonConfig::default();
        BanditAlgorithm::ThompsonSampling {
            initial_alpha: defaults.initial_alpha,
            initial_beta: defaults.initial_beta,
            success_threshold: defaults.success_threshold,
        }
    }
}

impl BanditAlgorithm {
    /// Algorithm parameters as configured in the application config.
    pub fn from_config(algorithm: Algorithm, config: &AppConfig) -> Self {
        match algorithm {
            Algorithm::EpsilonGreedy => BanditAlgorithm::EpsilonGreedy {
                epsilon: config.epsilon_greedy.epsilon,
            },
            Algorithm::Ucb1 => BanditAlgorithm::Ucb1,
            Algorithm::ThompsonSampling => BanditAlgorithm::ThompsonSampling {
                initial_alpha: config.thompson.initial_alpha,
                initial_beta: config.thompson.initial_beta,
                success_threshold: config.thompson.success_threshold,
            },
        }
    }

    pub fn kind(&self) -> Algorithm {
        match self {
            BanditAlgorithm::EpsilonGreedy { .. } => Algorithm::EpsilonGreedy,
            BanditAlgorithm::Ucb1 => Algorithm::Ucb1,
            BanditAlgorithm::ThompsonSampling { .. } => Algorithm::ThompsonSampling,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanditConfig {
    pub n_arms: usize,
    pub algorithm: BanditAlgorithm,
    /// Fixed seed for reproducible runs; entropy-seeded when absent.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
enum Strategy {
    EpsilonGreedy(EpsilonGreedy),
    Ucb1(Ucb1),
    Thompson(ThompsonSampling),
}

impl Strategy {
    fn build(n_arms: usize, algorithm: &BanditAlgorithm) -> BanditResult<Self> {
        Ok(match algorithm {
            BanditAlgorithm::EpsilonGreedy { epsilon } => {
                Strategy::EpsilonGreedy(EpsilonGreedy::new(*epsilon)?)
            }
            BanditAlgorithm::Ucb1 => Strategy::Ucb1(Ucb1::new()),
            BanditAlgorithm::ThompsonSampling {
                initial_alpha,
                initial_beta,
                success_threshold,
            } => Strategy::Thompson(ThompsonSampling::new(
                n_arms,
                &ThompsonConfig {
                    initial_alpha: *initial_alpha,
                    initial_beta: *initial_beta,
                    success_threshold: *success_threshold,
                },
            )?),
        })
    }
}

/// One session's bandit: arm statistics, the selected strategy and its
/// random source. Mutated only through `choose_arm` and `update`.
#[derive(Debug, Clone)]
pub struct BanditEngine {
    config: BanditConfig,
    state: BanditState,
    strategy: Strategy,
    phase: EnginePhase,
    rng: StdRng,
}

impl BanditEngine {
    pub fn new(config: BanditConfig) -> BanditResult<Self> {
        let n_arms = validate_n_arms(config.n_arms)?;
        let strategy = Strategy::build(n_arms, &config.algorithm)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            algorithm = %config.algorithm.kind(),
            n_arms,
            seed = ?config.seed,
            "Bandit engine initialized"
        );

        Ok(Self {
            state: BanditState::new(n_arms),
            strategy,
            phase: EnginePhase::Uninitialized,
            rng,
            config,
        })
    }

    pub fn config(&self) -> &BanditConfig {
        &self.config
    }

    pub fn algorithm(&self) -> Algorithm {
        self.config.algorithm.kind()
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn state(&self) -> &BanditState {
        &self.state
    }

    pub fn n_arms(&self) -> usize {
        self.state.n_arms()
    }

    pub fn steps(&self) -> u64 {
        self.state.steps()
    }

    pub fn counts(&self) -> Vec<u64> {
        self.state.counts()
    }

    pub fn means(&self) -> Vec<f64> {
        self.state.means()
    }

    /// Explore/exploit split for Epsilon-Greedy engines.
    pub fn exploration_counts(&self) -> Option<(u64, u64)> {
        match &self.strategy {
            Strategy::EpsilonGreedy(eg) => Some((eg.explore_count(), eg.exploit_count())),
            _ => None,
        }
    }

    /// Pick the next arm. Always in `[0, n_arms)`.
    pub fn choose_arm(&mut self) -> usize {
        if self.phase == EnginePhase::Uninitialized {
            self.phase = if self.algorithm().warms_up() {
                EnginePhase::WarmingUp
            } else {
                EnginePhase::Ready
            };
            debug!(phase = ?self.phase, "Engine left uninitialized state");
        }

        if self.phase == EnginePhase::WarmingUp {
            if let Some(arm) = self.state.first_unpulled() {
                return arm;
            }
            self.mark_ready();
        }

        match &mut self.strategy {
            Strategy::EpsilonGreedy(eg) => eg.choose(&self.state, &mut self.rng),
            Strategy::Ucb1(ucb) => ucb.choose(&self.state),
            Strategy::Thompson(ts) => ts.choose(&self.state, &mut self.rng),
        }
    }

    /// Record the reward observed for `arm` and return the step record.
    pub fn update(&mut self, arm: usize, reward: f64) -> BanditResult<StepRecord> {
        self.state.check_arm(arm)?;
        if !reward.is_finite() {
            return Err(BanditError::InvalidReward(reward));
        }

        self.state.record(arm, reward)?;
        if let Strategy::Thompson(ts) = &mut self.strategy {
            ts.observe(arm, reward);
        }

        if self.phase == EnginePhase::WarmingUp && self.state.first_unpulled().is_none() {
            self.mark_ready();
        }

        let step = self.state.steps();
        debug!(step, arm, reward, "Bandit updated");

        Ok(StepRecord {
            step,
            chosen_arm: arm,
            reward,
            estimates: self.state.means(),
        })
    }

    pub fn estimates(&self) -> Vec<ArmEstimate> {
        let total = self.state.steps();
        self.state
            .arms()
            .iter()
            .enumerate()
            .map(|(arm, stats)| ArmEstimate {
                arm,
                pulls: stats.pulls,
                total_reward: stats.total_reward,
                mean: stats.mean,
                posterior: match &self.strategy {
                    Strategy::Thompson(ts) => ts.posterior(arm),
                    _ => None,
                },
                upper_bound: match &self.strategy {
                    Strategy::Ucb1(_) => upper_bound(stats.mean, stats.pulls, total),
                    _ => None,
                },
            })
            .collect()
    }

    /// Back to the zeroed start-of-session state. A seeded engine replays
    /// the same random stream after a reset.
    pub fn reset(&mut self) {
        self.state.reset();
        match &mut self.strategy {
            Strategy::EpsilonGreedy(eg) => eg.reset(),
            Strategy::Ucb1(_) => {}
            Strategy::Thompson(ts) => ts.reset(),
        }
        if let Some(seed) = self.config.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.phase = EnginePhase::Uninitialized;
        info!(algorithm = %self.algorithm(), "Bandit engine reset");
    }

    fn mark_ready(&mut self) {
        self.phase = EnginePhase::Ready;
        info!(
            algorithm = %self.algorithm(),
            steps = self.state.steps(),
            "Warm-up complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(algorithm: BanditAlgorithm, n_arms: usize) -> BanditEngine {
        BanditEngine::new(BanditConfig {
            n_arms,
            algorithm,
            seed: Some(42),
        })
        .unwrap()
    }

    #[test]
    fn test_zero_arms_is_configuration_error() {
        let result = BanditEngine::new(BanditConfig {
            n_arms: 0,
            algorithm: BanditAlgorithm::Ucb1,
            seed: None,
        });
        assert!(matches!(result, Err(BanditError::Configuration(_))));
    }

    #[test]
    fn test_invalid_epsilon_is_configuration_error() {
        let result = BanditEngine::new(BanditConfig {
            n_arms: 3,
            algorithm: BanditAlgorithm::EpsilonGreedy { epsilon: 2.0 },
            seed: None,
        });
        assert!(matches!(result, Err(BanditError::Configuration(_))));
    }

    #[test]
    fn test_update_rejects_bad_arm_and_reward() {
        let mut e = engine(BanditAlgorithm::Ucb1, 3);
        assert!(matches!(
            e.update(5, 1.0),
            Err(BanditError::InvalidArmIndex { arm: 5, n_arms: 3 })
        ));
        assert!(matches!(
            e.update(0, f64::NAN),
            Err(BanditError::InvalidReward(_))
        ));
        assert_eq!(e.steps(), 0);
    }

    #[test]
    fn test_non_thompson_engines_are_ready_immediately() {
        for algorithm in [
            BanditAlgorithm::Ucb1,
            BanditAlgorithm::EpsilonGreedy { epsilon: 0.1 },
        ] {
            let mut e = engine(algorithm, 3);
            assert_eq!(e.phase(), EnginePhase::Uninitialized);
            e.choose_arm();
            assert_eq!(e.phase(), EnginePhase::Ready);
        }
    }

    #[test]
    fn test_thompson_warm_up_visits_arms_in_order() {
        let mut e = engine(BanditAlgorithm::default(), 4);
        for expected in 0..4 {
            let arm = e.choose_arm();
            assert_eq!(arm, expected);
            assert_eq!(e.phase(), EnginePhase::WarmingUp);
            e.update(arm, 1.0).unwrap();
        }
        assert_eq!(e.phase(), EnginePhase::Ready);
        assert_eq!(e.counts(), vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_update_returns_step_record() {
        let mut e = engine(BanditAlgorithm::EpsilonGreedy { epsilon: 0.0 }, 2);
        e.update(1, 1.0).unwrap();
        let record = e.update(1, 0.0).unwrap();
        assert_eq!(record.step, 2);
        assert_eq!(record.chosen_arm, 1);
        assert_eq!(record.estimates, vec![0.0, 0.5]);
    }

    #[test]
    fn test_estimates_carry_algorithm_specific_fields() {
        let mut ucb = engine(BanditAlgorithm::Ucb1, 2);
        ucb.update(0, 1.0).unwrap();
        let est = ucb.estimates();
        assert!(est[0].upper_bound.is_some());
        assert!(est[1].upper_bound.is_none());
        assert!(est[0].posterior.is_none());

        let mut ts = engine(BanditAlgorithm::default(), 2);
        ts.update(1, 1.0).unwrap();
        let est = ts.estimates();
        let p = est[1].posterior.unwrap();
        assert_eq!((p.alpha, p.beta), (2.0, 1.0));
        assert!(est[1].upper_bound.is_none());
    }

    #[test]
    fn test_reset_replays_seeded_choices() {
        let mut e = engine(BanditAlgorithm::EpsilonGreedy { epsilon: 0.5 }, 5);
        let mut first = Vec::new();
        for _ in 0..30 {
            let arm = e.choose_arm();
            e.update(arm, (arm % 2) as f64).unwrap();
            first.push(arm);
        }
        e.reset();
        assert_eq!(e.steps(), 0);
        assert_eq!(e.phase(), EnginePhase::Uninitialized);
        assert_eq!(e.exploration_counts(), Some((0, 0)));

        let mut second = Vec::new();
        for _ in 0..30 {
            let arm = e.choose_arm();
            e.update(arm, (arm % 2) as f64).unwrap();
            second.push(arm);
        }
        assert_eq!(first, second);
    }

    #[test]
    fn test_from_config_uses_app_defaults() {
        let config = AppConfig::default();
        assert_eq!(
            BanditAlgorithm::from_config(Algorithm::EpsilonGreedy, &config),
            BanditAlgorithm::EpsilonGreedy { epsilon: 0.1 }
        );
        assert_eq!(
            BanditAlgorithm::from_config(Algorithm::ThompsonSampling, &config).kind(),
            Algorithm::ThompsonSampling
        );
    }
}
