pub mod config;
pub mod error;
pub mod event_bus;
pub mod types;

pub use config::AppConfig;
pub use error::{BanditError, BanditResult};
pub use event_bus::StepSink;
pub use types::{Algorithm, ArmEstimate, EnginePhase, LogRecord, Posterior, StepRecord};
