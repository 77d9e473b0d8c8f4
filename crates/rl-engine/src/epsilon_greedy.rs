//! Epsilon-Greedy: explore uniformly with probability ε, otherwise exploit
//! the best running mean.

use crate::state::BanditState;
use bandit_core::config::validate_epsilon;
use bandit_core::BanditResult;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    epsilon: f64,
    explore_count: u64,
    exploit_count: u64,
}

impl EpsilonGreedy {
    pub fn new(epsilon: f64) -> BanditResult<Self> {
        Ok(Self {
            epsilon: validate_epsilon(epsilon)?,
            explore_count: 0,
            exploit_count: 0,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn explore_count(&self) -> u64 {
        self.explore_count
    }

    pub fn exploit_count(&self) -> u64 {
        self.exploit_count
    }

    pub fn choose(&mut self, state: &BanditState, rng: &mut impl Rng) -> usize {
        if self.epsilon > 0.0 && rng.gen::<f64>() < self.epsilon {
            self.explore_count += 1;
            rng.gen_range(0..state.n_arms())
        } else {
            self.exploit_count += 1;
            state.best_mean_arm()
        }
    }

    pub fn reset(&mut self) {
        self.explore_count = 0;
        self.exploit_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rejects_epsilon_outside_unit_interval() {
        assert!(EpsilonGreedy::new(-0.1).is_err());
        assert!(EpsilonGreedy::new(1.5).is_err());
        assert!(EpsilonGreedy::new(0.0).is_ok());
    }

    #[test]
    fn test_zero_epsilon_always_exploits() {
        let mut state = BanditState::new(3);
        state.record(0, 0.2).unwrap();
        state.record(1, 0.9).unwrap();
        state.record(2, 0.4).unwrap();

        let mut policy = EpsilonGreedy::new(0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(policy.choose(&state, &mut rng), 1);
        }
        assert_eq!(policy.explore_count(), 0);
        assert_eq!(policy.exploit_count(), 100);
    }

    #[test]
    fn test_full_epsilon_always_explores() {
        let state = BanditState::new(4);
        let mut policy = EpsilonGreedy::new(1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let arm = policy.choose(&state, &mut rng);
            assert!(arm < 4);
            seen[arm] = true;
        }
        assert_eq!(policy.explore_count(), 200);
        assert!(seen.iter().all(|s| *s), "every arm should be explored");
    }
}
