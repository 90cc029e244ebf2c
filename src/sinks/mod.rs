//! Record sinks
//!
//! A sink accepts finished records one at a time and reports success or
//! failure per record. The runner fans every record out to all enabled sinks
//! through a [`SinkSet`].
//!
//! - **CsvSink**: appends rows to a CSV file
//! - **JsonLinesSink**: one JSON object per line on any writer (stdout by default)
//! - **DatabaseSink**: inserts into a MySQL `sensor_readings` table
//! - **DryRunSink**: logs what the database sink would insert

pub mod csv;
pub mod database;
pub mod dry_run;
pub mod json;

pub use self::csv::CsvSink;
pub use self::database::DatabaseSink;
pub use self::dry_run::DryRunSink;
pub use self::json::JsonLinesSink;

use crate::records::Record;
use crate::types::RunConfig;
use std::fmt;
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Errors a sink can return
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// File or stream I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// CSV encoding or writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// JSON encoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The database rejected a statement or the connection failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The async runtime driving the database driver could not start
    #[error("Failed to start database runtime: {0}")]
    Runtime(#[source] io::Error),
}

/// Destination for finished records
pub trait RecordSink {
    /// Short name used in logs and statistics
    fn name(&self) -> &str;

    /// Persist one record
    fn write(&mut self, record: &Record) -> Result<(), SinkError>;

    /// Push buffered output to its destination
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Outcome of handing one record to every sink
#[derive(Debug, Default)]
pub struct SinkReport {
    /// Sinks that failed, with their errors
    pub failures: Vec<(String, SinkError)>,
    /// Time spent in each sink, in sink order
    pub timings: Vec<(String, Duration)>,
}

impl SinkReport {
    /// Whether every sink accepted the record
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// All sinks enabled for a run
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn RecordSink>>,
}

impl fmt::Debug for SinkSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkSet").field("sinks", &self.names()).finish()
    }
}

impl SinkSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Open every sink the configuration enables
    ///
    /// Fails with the name of the first sink that could not be opened.
    pub fn from_config(config: &RunConfig) -> Result<Self, (String, SinkError)> {
        let format = config.timestamp_format();
        let mut set = Self::new();

        if config.output.csv_write {
            let sink = CsvSink::open(&config.output.csv_path, format)
                .map_err(|e| (CsvSink::NAME.to_string(), e))?;
            set.push(Box::new(sink));
        }

        if config.output.stdout {
            set.push(Box::new(JsonLinesSink::stdout(format)));
        }

        if config.database.write {
            let sink = DatabaseSink::connect(&config.database, format)
                .map_err(|e| (DatabaseSink::NAME.to_string(), e))?;
            set.push(Box::new(sink));
        } else {
            set.push(Box::new(DryRunSink::new(format)));
        }

        info!("Sinks enabled: {}", set.names().join(", "));
        Ok(set)
    }

    /// Add a sink
    pub fn push(&mut self, sink: Box<dyn RecordSink>) {
        debug!("Adding {} sink", sink.name());
        self.sinks.push(sink);
    }

    /// Names of the sinks in write order
    pub fn names(&self) -> Vec<String> {
        self.sinks.iter().map(|sink| sink.name().to_string()).collect()
    }

    /// Number of sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether no sink is enabled
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Hand `record` to every sink; one sink failing does not skip the others
    pub fn write(&mut self, record: &Record) -> SinkReport {
        let mut report = SinkReport::default();

        for sink in &mut self.sinks {
            let started = Instant::now();
            let result = sink.write(record);
            report.timings.push((sink.name().to_string(), started.elapsed()));

            if let Err(error) = result {
                report.failures.push((sink.name().to_string(), error));
            }
        }

        report
    }

    /// Flush every sink, collecting the failures
    pub fn flush(&mut self) -> Vec<(String, SinkError)> {
        self.sinks
            .iter_mut()
            .filter_map(|sink| sink.flush().err().map(|e| (sink.name().to_string(), e)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SensorId;
    use chrono::NaiveDate;

    #[derive(Debug, Default)]
    struct Collecting {
        records: Vec<Record>,
    }

    impl RecordSink for Collecting {
        fn name(&self) -> &str {
            "collecting"
        }

        fn write(&mut self, record: &Record) -> Result<(), SinkError> {
            self.records.push(record.clone());
            Ok(())
        }
    }

    struct Failing;

    impl RecordSink for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn write(&mut self, _record: &Record) -> Result<(), SinkError> {
            Err(SinkError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "closed")))
        }
    }

    fn record() -> Record {
        let timestamp = NaiveDate::from_ymd_opt(2025, 10, 27)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        Record::new(SensorId::new(1), 3, 30.5, timestamp)
    }

    #[test]
    fn test_failure_does_not_skip_other_sinks() {
        let mut set = SinkSet::new();
        set.push(Box::new(Failing));
        set.push(Box::new(Collecting::default()));

        let report = set.write(&record());

        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "failing");
        assert_eq!(report.timings.len(), 2);
        assert_eq!(set.names(), vec!["failing", "collecting"]);
    }

    #[test]
    fn test_default_config_enables_csv_and_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RunConfig::default();
        config.output.csv_path = dir.path().join("out.csv").display().to_string();

        let set = SinkSet::from_config(&config).unwrap();
        assert_eq!(set.names(), vec!["csv", "dry-run"]);
    }

    #[test]
    fn test_stdout_only_config() {
        let mut config = RunConfig::default();
        config.output.csv_write = false;
        config.output.stdout = true;

        let set = SinkSet::from_config(&config).unwrap();
        assert_eq!(set.names(), vec!["stdout", "dry-run"]);
        assert_eq!(set.len(), 2);
    }
}
