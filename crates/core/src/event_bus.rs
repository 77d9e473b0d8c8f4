//! Step event bus: trait for handing per-pull log records to whatever
//! collaborator persists or displays them.
//!
//! Sessions accept an `Arc<dyn StepSink>` and emit one `LogRecord` after each
//! `update` returns; the engine itself never performs I/O.

use crate::error::BanditResult;
use crate::types::{Algorithm, LogRecord};
use std::sync::{Arc, Mutex};

pub trait StepSink: Send + Sync {
    fn emit(&self, record: &LogRecord) -> BanditResult<()>;
}

/// No-op sink for sessions that don't log.
pub struct NoOpSink;

impl StepSink for NoOpSink {
    fn emit(&self, _record: &LogRecord) -> BanditResult<()> {
        Ok(())
    }
}

/// In-memory sink that captures records for testing.
#[derive(Default)]
pub struct CaptureSink {
    records: Mutex<Vec<LogRecord>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().expect("step sink mutex poisoned").clone()
    }

    pub fn count(&self) -> usize {
        self.records.lock().expect("step sink mutex poisoned").len()
    }

    pub fn count_algorithm(&self, algorithm: Algorithm) -> usize {
        self.records
            .lock()
            .expect("step sink mutex poisoned")
            .iter()
            .filter(|r| r.algorithm == algorithm)
            .count()
    }

    pub fn clear(&self) {
        self.records.lock().expect("step sink mutex poisoned").clear();
    }
}

impl StepSink for CaptureSink {
    fn emit(&self, record: &LogRecord) -> BanditResult<()> {
        self.records
            .lock()
            .expect("step sink mutex poisoned")
            .push(record.clone());
        Ok(())
    }
}

/// Convenience: a sink that drops everything.
pub fn noop_sink() -> Arc<dyn StepSink> {
    Arc::new(NoOpSink)
}

/// Convenience: create a capture sink for tests.
pub fn capture_sink() -> Arc<CaptureSink> {
    Arc::new(CaptureSink::new())
}
