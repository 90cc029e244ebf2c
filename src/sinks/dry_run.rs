//! Dry-run stand-in for the database sink

use super::{RecordSink, SinkError};
use crate::records::Record;
use crate::types::TimestampFormat;
use tracing::info;

/// Logs each record the database sink would have inserted
#[derive(Debug, Clone)]
pub struct DryRunSink {
    format: TimestampFormat,
    records_seen: u64,
}

impl DryRunSink {
    /// Name used in logs and statistics
    pub const NAME: &'static str = "dry-run";

    /// Create a dry-run sink
    pub fn new(format: TimestampFormat) -> Self {
        Self {
            format,
            records_seen: 0,
        }
    }

    /// Records logged so far
    pub fn records_seen(&self) -> u64 {
        self.records_seen
    }
}

impl RecordSink for DryRunSink {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn write(&mut self, record: &Record) -> Result<(), SinkError> {
        let row = record.to_row(self.format);
        info!(
            pgmid = %row.pgmid,
            vehicle_count = row.vehicle_count,
            peakspeed = row.peakspeed,
            timestamp = %row.timestamp,
            "Dry run: would insert record"
        );
        self.records_seen += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SensorId;
    use chrono::NaiveDate;

    #[test]
    fn test_dry_run_never_fails() {
        let mut sink = DryRunSink::new(TimestampFormat::TimeOnly);
        let timestamp = NaiveDate::from_ymd_opt(2025, 10, 27)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        for i in 1..=5 {
            sink.write(&Record::new(SensorId::new(i), 4, 38.0, timestamp)).unwrap();
        }

        assert_eq!(sink.records_seen(), 5);
        assert!(sink.flush().is_ok());
    }
}
