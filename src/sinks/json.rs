//! JSON lines sink

use super::{RecordSink, SinkError};
use crate::records::Record;
use crate::types::TimestampFormat;
use std::io::{self, Stdout, Write};

/// Writes one JSON object per record, newline separated
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    format: TimestampFormat,
}

impl JsonLinesSink<Stdout> {
    /// Sink writing to standard output
    pub fn stdout(format: TimestampFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Name used in logs and statistics
    pub const NAME: &'static str = "stdout";

    /// Sink writing to `writer`
    pub fn new(writer: W, format: TimestampFormat) -> Self {
        Self { writer, format }
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn write(&mut self, record: &Record) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, &record.to_row(self.format))?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
