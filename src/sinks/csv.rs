//! CSV file sink

use super::{RecordSink, SinkError};
use crate::records::Record;
use crate::types::TimestampFormat;
use ::csv::{Writer, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Appends records to a CSV file
///
/// The parent directory is created when missing and the header row is only
/// written when the file is new or empty, so repeated runs keep appending to
/// one table.
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    writer: Writer<File>,
    format: TimestampFormat,
    rows_written: u64,
}

impl CsvSink {
    /// Name used in logs and statistics
    pub const NAME: &'static str = "csv";

    /// Open `path` for appending
    pub fn open<P: AsRef<Path>>(path: P, format: TimestampFormat) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let is_new = fs::metadata(&path).map(|meta| meta.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let writer = WriterBuilder::new().has_headers(is_new).from_writer(file);

        info!(
            "Appending records to {} ({})",
            path.display(),
            if is_new { "new file" } else { "existing file" }
        );

        Ok(Self {
            path,
            writer,
            format,
            rows_written: 0,
        })
    }

    /// File being appended to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows written by this sink
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

impl RecordSink for CsvSink {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn write(&mut self, record: &Record) -> Result<(), SinkError> {
        self.writer.serialize(record.to_row(self.format))?;
        // Each row reaches the file before the next record is generated
        self.writer.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        debug!("Flushed {} rows to {}", self.rows_written, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SensorId;
    use chrono::NaiveDate;

    fn record(sensor: u32, second: u32) -> Record {
        let timestamp = NaiveDate::from_ymd_opt(2025, 10, 27)
            .unwrap()
            .and_hms_milli_opt(8, 0, second, 500)
            .unwrap();
        Record::new(SensorId::new(sensor), 7, 33.25, timestamp)
    }

    #[test]
    fn test_creates_parent_dir_and_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("readings.csv");

        let mut sink = CsvSink::open(&path, TimestampFormat::TimeOnly).unwrap();
        sink.write(&record(1, 0)).unwrap();
        sink.write(&record(2, 1)).unwrap();
        sink.flush().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "pgmid,vehicle_count,peakspeed,timestamp");
        assert_eq!(lines[1], "PMG00001,7,33.25,08:00:00.500");
        assert_eq!(lines.len(), 3);
        assert_eq!(sink.rows_written(), 2);
    }

    #[test]
    fn test_reopen_appends_without_second_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readings.csv");

        {
            let mut sink = CsvSink::open(&path, TimestampFormat::DateTime).unwrap();
            sink.write(&record(1, 0)).unwrap();
        }
        {
            let mut sink = CsvSink::open(&path, TimestampFormat::DateTime).unwrap();
            sink.write(&record(2, 1)).unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        let headers = content.lines().filter(|l| l.starts_with("pgmid")).count();
        assert_eq!(headers, 1);
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("2025-10-27 08:00:01.500"));
    }
}
