//! Simulation side of the dashboard: Bernoulli reward environment and the
//! session loop that drives a bandit engine one pull at a time.

pub mod environment;
pub mod session;

pub use environment::RewardEnvironment;
pub use session::{ProbabilityMode, Session, SessionParams};
