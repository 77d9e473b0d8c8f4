use crate::error::{BanditError, BanditResult};
use serde::Deserialize;

/// Root application configuration. Loaded from an optional
/// `bandit-dashboard.toml` file and environment variables with the prefix
/// `BANDIT_DASHBOARD__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub epsilon_greedy: EpsilonGreedyConfig,
    #[serde(default)]
    pub thompson: ThompsonConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_n_arms")]
    pub n_arms: usize,
    #[serde(default = "default_batch")]
    pub batch: usize,
    #[serde(default = "default_auto_rounds")]
    pub auto_rounds: usize,
    #[serde(default = "default_auto_delay_ms")]
    pub auto_delay_ms: u64,
    #[serde(default = "default_rmse_window")]
    pub rmse_window: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpsilonGreedyConfig {
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThompsonConfig {
    #[serde(default = "default_prior")]
    pub initial_alpha: f64,
    #[serde(default = "default_prior")]
    pub initial_beta: f64,
    #[serde(default = "default_success_threshold")]
    pub success_threshold: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_enabled")]
    pub enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

// Default functions
fn default_n_arms() -> usize {
    5
}
fn default_batch() -> usize {
    100
}
fn default_auto_rounds() -> usize {
    100
}
fn default_auto_delay_ms() -> u64 {
    300
}
fn default_rmse_window() -> usize {
    2000
}
fn default_epsilon() -> f64 {
    0.1
}
fn default_prior() -> f64 {
    1.0
}
fn default_success_threshold() -> f64 {
    0.5
}
fn default_log_enabled() -> bool {
    true
}
fn default_log_dir() -> String {
    ".".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            n_arms: default_n_arms(),
            batch: default_batch(),
            auto_rounds: default_auto_rounds(),
            auto_delay_ms: default_auto_delay_ms(),
            rmse_window: default_rmse_window(),
            seed: None,
        }
    }
}

impl Default for EpsilonGreedyConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
        }
    }
}

impl Default for ThompsonConfig {
    fn default() -> Self {
        Self {
            initial_alpha: default_prior(),
            initial_beta: default_prior(),
            success_threshold: default_success_threshold(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_log_enabled(),
            log_dir: default_log_dir(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            epsilon_greedy: EpsilonGreedyConfig::default(),
            thompson: ThompsonConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Exploration rate must be a probability.
pub fn validate_epsilon(epsilon: f64) -> BanditResult<f64> {
    if !(0.0..=1.0).contains(&epsilon) {
        return Err(BanditError::config(format!(
            "epsilon must be in [0, 1], got {epsilon}"
        )));
    }
    Ok(epsilon)
}

pub fn validate_n_arms(n_arms: usize) -> BanditResult<usize> {
    if n_arms < 1 {
        return Err(BanditError::config("number of arms must be at least 1"));
    }
    Ok(n_arms)
}

impl ThompsonConfig {
    pub fn validate(&self) -> BanditResult<()> {
        for (name, value) in [
            ("initial_alpha", self.initial_alpha),
            ("initial_beta", self.initial_beta),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(BanditError::config(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !self.success_threshold.is_finite() {
            return Err(BanditError::config(format!(
                "success_threshold must be finite, got {}",
                self.success_threshold
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from an optional config file and environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("bandit-dashboard").required(false))
            .add_source(
                config::Environment::with_prefix("BANDIT_DASHBOARD")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Check every algorithm parameter up front so bad values surface at startup.
    pub fn validate(&self) -> BanditResult<()> {
        validate_n_arms(self.session.n_arms)?;
        validate_epsilon(self.epsilon_greedy.epsilon)?;
        self.thompson.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard_pages() {
        let config = AppConfig::default();
        assert_eq!(config.session.n_arms, 5);
        assert_eq!(config.session.batch, 100);
        assert_eq!(config.session.auto_rounds, 100);
        assert_eq!(config.session.auto_delay_ms, 300);
        assert_eq!(config.session.rmse_window, 2000);
        assert!((config.epsilon_greedy.epsilon - 0.1).abs() < f64::EPSILON);
        assert!((config.thompson.initial_alpha - 1.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_epsilon_validation() {
        assert!(validate_epsilon(0.0).is_ok());
        assert!(validate_epsilon(1.0).is_ok());
        assert!(validate_epsilon(-0.01).is_err());
        assert!(validate_epsilon(1.01).is_err());
        assert!(validate_epsilon(f64::NAN).is_err());
    }

    #[test]
    fn test_zero_arms_rejected() {
        let mut config = AppConfig::default();
        config.session.n_arms = 0;
        assert!(matches!(
            config.validate(),
            Err(BanditError::Configuration(_))
        ));
    }

    #[test]
    fn test_thompson_prior_validation() {
        let mut thompson = ThompsonConfig::default();
        thompson.initial_beta = 0.0;
        assert!(thompson.validate().is_err());

        thompson.initial_beta = 5.0;
        thompson.success_threshold = f64::INFINITY;
        assert!(thompson.validate().is_err());
    }
}
