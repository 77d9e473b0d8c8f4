use thiserror::Error;

pub type BanditResult<T> = Result<T, BanditError>;

#[derive(Error, Debug)]
pub enum BanditError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid arm index {arm}: engine has {n_arms} arms")]
    InvalidArmIndex { arm: usize, n_arms: usize },

    #[error("Invalid reward: {0} is not a finite number")]
    InvalidReward(f64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl BanditError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
