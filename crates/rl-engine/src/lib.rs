//! Multi-armed bandit engine: Epsilon-Greedy, UCB1 and Thompson Sampling
//! over a shared per-arm statistics record.

pub mod bandits;
pub mod epsilon_greedy;
pub mod state;
pub mod thompson;
pub mod ucb1;

pub use bandits::{BanditAlgorithm, BanditConfig, BanditEngine};
pub use epsilon_greedy::EpsilonGreedy;
pub use state::{ArmStats, BanditState};
pub use thompson::ThompsonSampling;
pub use ucb1::Ucb1;
