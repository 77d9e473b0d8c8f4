//! CSV step logger. Appends one row per pull so a run can be charted or
//! replayed outside the dashboard.

use bandit_core::event_bus::StepSink;
use bandit_core::types::{Algorithm, LogRecord};
use bandit_core::BanditResult;
use chrono::SecondsFormat;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

pub const CSV_HEADER: &str = "timestamp,step,arm,reward,algorithm,counts,values";

pub struct StepLogger {
    path: PathBuf,
    file: Mutex<File>,
}

impl StepLogger {
    /// Open `path` for appending. The header is written only when the file
    /// is new or empty.
    pub fn open(path: impl AsRef<Path>) -> BanditResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        if file.metadata()?.len() == 0 {
            writeln!(file, "{CSV_HEADER}")?;
            info!(path = %path.display(), "Created step log");
        } else {
            info!(path = %path.display(), "Appending to existing step log");
        }

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// The algorithm's default log file inside `log_dir`.
    pub fn for_algorithm(log_dir: impl AsRef<Path>, algorithm: Algorithm) -> BanditResult<Self> {
        Self::open(Self::default_path(log_dir, algorithm))
    }

    pub fn default_path(log_dir: impl AsRef<Path>, algorithm: Algorithm) -> PathBuf {
        log_dir.as_ref().join(algorithm.default_log_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete a log file. Missing files are not an error.
    pub fn remove(path: impl AsRef<Path>) -> BanditResult<bool> {
        match std::fs::remove_file(path.as_ref()) {
            Ok(()) => {
                info!(path = %path.as_ref().display(), "Removed step log");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// One CSV line (without the trailing newline). List fields are `;`-joined
/// so they never collide with the column separator.
pub fn format_row(record: &LogRecord) -> String {
    let counts = record
        .counts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(";");
    let values = record
        .values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(";");
    format!(
        "{},{},{},{},{},{},{}",
        record.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
        record.step,
        record.arm,
        record.reward,
        record.algorithm,
        counts,
        values
    )
}

impl StepSink for StepLogger {
    fn emit(&self, record: &LogRecord) -> BanditResult<()> {
        let line = format!("{}\n", format_row(record));
        let mut file = self.file.lock().expect("step logger mutex poisoned");
        file.write_all(line.as_bytes())?;
        debug!(step = record.step, arm = record.arm, "Logged step");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandit_core::types::StepRecord;

    fn temp_log(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{name}-{}.csv", uuid::Uuid::new_v4()))
    }

    fn log_record(step: u64, arm: usize, reward: f64) -> LogRecord {
        LogRecord::new(
            Algorithm::EpsilonGreedy,
            &StepRecord {
                step,
                chosen_arm: arm,
                reward,
                estimates: vec![0.5, 0.25],
            },
            vec![2, 1],
        )
    }

    #[test]
    fn test_format_row_fields() {
        let row = format_row(&log_record(3, 1, 1.0));
        let fields: Vec<&str> = row.split(',').collect();
        assert_eq!(fields.len(), 7);
        assert_eq!(&fields[1..], &["3", "1", "1", "epsilon_greedy", "2;1", "0.5;0.25"]);
    }

    #[test]
    fn test_header_written_once() {
        let path = temp_log("bandit-header");
        {
            let logger = StepLogger::open(&path).unwrap();
            logger.emit(&log_record(1, 0, 0.0)).unwrap();
        }
        {
            let logger = StepLogger::open(&path).unwrap();
            logger.emit(&log_record(2, 1, 1.0)).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(contents.matches("timestamp").count(), 1);

        assert!(StepLogger::remove(&path).unwrap());
        assert!(!StepLogger::remove(&path).unwrap());
    }

    #[test]
    fn test_default_path_uses_algorithm_key() {
        let path = StepLogger::default_path("/tmp/logs", Algorithm::ThompsonSampling);
        assert_eq!(path, PathBuf::from("/tmp/logs/thompson_logs.csv"));
    }
}
