pub mod logger;

pub use logger::StepLogger;
