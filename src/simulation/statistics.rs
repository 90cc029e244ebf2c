//! Run statistics
//!
//! Counters collected while records flow from the scheduler to the sinks,
//! and the summary printed at the end of a run.

use crate::simulation::scheduler::Emission;
use crate::sinks::SinkReport;
use crate::types::TrafficPeriod;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The scheduler produced every requested record
    Completed,
    /// The wall-clock duration ran out
    DurationElapsed,
    /// Ctrl-C or SIGTERM
    Interrupted,
    /// A sink failed with stop-on-error set
    SinkFailure,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Completed => write!(f, "completed"),
            StopReason::DurationElapsed => write!(f, "duration elapsed"),
            StopReason::Interrupted => write!(f, "interrupted"),
            StopReason::SinkFailure => write!(f, "stopped on sink failure"),
        }
    }
}

/// Per-sink counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SinkStatistics {
    /// Records the sink accepted
    pub written: u64,
    /// Records the sink rejected
    pub failed: u64,
    /// Time spent inside the sink
    pub total_time: Duration,
}

impl SinkStatistics {
    /// Mean time per write attempt
    pub fn average_time(&self) -> Duration {
        let attempts = self.written + self.failed;
        if attempts == 0 {
            Duration::ZERO
        } else {
            mean_duration(self.total_time, attempts)
        }
    }
}

fn mean_duration(total: Duration, count: u64) -> Duration {
    Duration::from_secs_f64(total.as_secs_f64() / count as f64)
}

/// Counters for one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStatistics {
    /// Records produced by the scheduler
    pub records_generated: u64,
    /// Records every sink accepted
    pub records_written: u64,
    /// Bursts started
    pub bursts: u64,
    /// Records per traffic period, indexed by [`TrafficPeriod::index`]
    pub period_counts: [u64; 4],
    /// Per-sink counters keyed by sink name
    pub sinks: BTreeMap<String, SinkStatistics>,
    /// Timestamp of the first record
    pub first_timestamp: Option<NaiveDateTime>,
    /// Timestamp of the last record
    pub last_timestamp: Option<NaiveDateTime>,
    /// Wall-clock time of the run
    pub elapsed: Duration,
    /// Why the run ended
    pub stop_reason: StopReason,
}

impl Default for RunStatistics {
    fn default() -> Self {
        Self {
            records_generated: 0,
            records_written: 0,
            bursts: 0,
            period_counts: [0; 4],
            sinks: BTreeMap::new(),
            first_timestamp: None,
            last_timestamp: None,
            elapsed: Duration::ZERO,
            stop_reason: StopReason::Completed,
        }
    }
}

impl RunStatistics {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a record handed out by the scheduler
    pub fn record_emission(&mut self, emission: &Emission) {
        self.records_generated += 1;
        self.period_counts[emission.period.index()] += 1;
        if emission.position == 1 {
            self.bursts += 1;
        }

        let timestamp = emission.record.timestamp;
        if self.first_timestamp.is_none() {
            self.first_timestamp = Some(timestamp);
        }
        self.last_timestamp = Some(timestamp);
    }

    /// Fold in the outcome of writing one record to every sink
    pub fn record_sink_report(&mut self, report: &SinkReport) {
        for (name, time) in &report.timings {
            let entry = self.sinks.entry(name.clone()).or_default();
            entry.total_time += *time;
            if report.failures.iter().any(|(failed, _)| failed == name) {
                entry.failed += 1;
            } else {
                entry.written += 1;
            }
        }
        if report.is_success() {
            self.records_written += 1;
        }
    }

    /// Set the wall-clock duration of the run
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    /// Set why the run ended
    pub fn set_stop_reason(&mut self, reason: StopReason) {
        self.stop_reason = reason;
    }

    /// Records in `period`
    pub fn period_count(&self, period: TrafficPeriod) -> u64 {
        self.period_counts[period.index()]
    }

    /// Share of generated records in `period`, 0.0-1.0
    pub fn period_share(&self, period: TrafficPeriod) -> f64 {
        if self.records_generated == 0 {
            0.0
        } else {
            self.period_count(period) as f64 / self.records_generated as f64
        }
    }

    /// Write failures summed over every sink
    pub fn total_failures(&self) -> u64 {
        self.sinks.values().map(|sink| sink.failed).sum()
    }

    /// Mean time a record spent in all sinks together
    pub fn average_sink_time(&self) -> Duration {
        if self.records_generated == 0 {
            return Duration::ZERO;
        }
        let total: Duration = self.sinks.values().map(|sink| sink.total_time).sum();
        mean_duration(total, self.records_generated)
    }

    /// Records generated per wall-clock second
    pub fn records_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.records_generated as f64 / secs
        } else {
            0.0
        }
    }

    /// Mean records per burst
    pub fn average_burst_length(&self) -> f64 {
        if self.bursts == 0 {
            0.0
        } else {
            self.records_generated as f64 / self.bursts as f64
        }
    }

    /// Human-readable end-of-run summary
    pub fn generate_summary_output(&self) -> String {
        let mut output = String::new();

        output.push_str("🚦 Traffic Sensor Simulation Complete!\n");
        output.push_str("======================================\n\n");

        output.push_str("📊 Run Summary:\n");
        output.push_str(&format!("   Stop Reason: {}\n", self.stop_reason));
        output.push_str(&format!(
            "   Duration: {:.2} seconds ({:.1} records/s)\n",
            self.elapsed.as_secs_f64(),
            self.records_per_second()
        ));
        if let (Some(first), Some(last)) = (self.first_timestamp, self.last_timestamp) {
            output.push_str(&format!("   Synthetic Time: {} .. {}\n", first, last));
        }
        output.push('\n');

        output.push_str("📈 Record Statistics:\n");
        output.push_str(&format!("   Records Generated: {}\n", self.records_generated));
        output.push_str(&format!("   Records Written: {}\n", self.records_written));
        output.push_str(&format!(
            "   Bursts: {} (avg {:.2} records/burst)\n\n",
            self.bursts,
            self.average_burst_length()
        ));

        output.push_str("🕒 Traffic Periods:\n");
        for period in TrafficPeriod::ALL {
            output.push_str(&format!(
                "   {:<15} {:>8} ({:.1}%)\n",
                format!("{}:", period),
                self.period_count(period),
                self.period_share(period) * 100.0
            ));
        }
        output.push('\n');

        output.push_str("💾 Sinks:\n");
        if self.sinks.is_empty() {
            output.push_str("   (none)\n");
        }
        for (name, sink) in &self.sinks {
            output.push_str(&format!(
                "   {}: {} written, {} failed, avg {:.3} ms/write\n",
                name,
                sink.written,
                sink.failed,
                sink.average_time().as_secs_f64() * 1000.0
            ));
        }
        output.push_str(&format!(
            "   Average sink time per record: {:.3} ms\n",
            self.average_sink_time().as_secs_f64() * 1000.0
        ));

        output
    }

    /// One-line summary for logs
    pub fn compact_summary(&self) -> String {
        format!(
            "{} generated, {} written, {} sink failures, {} bursts in {:.2}s ({})",
            self.records_generated,
            self.records_written,
            self.total_failures(),
            self.bursts,
            self.elapsed.as_secs_f64(),
            self.stop_reason
        )
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.compact_summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Record;
    use crate::sinks::SinkError;
    use crate::types::SensorId;
    use chrono::NaiveDate;
    use std::io;

    fn emission(period: TrafficPeriod, position: u8, hour: u32) -> Emission {
        let timestamp = NaiveDate::from_ymd_opt(2025, 10, 27)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        Emission {
            record: Record::new(SensorId::new(1), 3, 40.0, timestamp),
            period,
            burst: 1,
            burst_length: 2,
            position,
        }
    }

    fn report(failing: Option<&str>) -> SinkReport {
        let mut report = SinkReport::default();
        report.timings.push(("csv".to_string(), Duration::from_millis(2)));
        report.timings.push(("dry-run".to_string(), Duration::from_millis(1)));
        if let Some(name) = failing {
            report.failures.push((
                name.to_string(),
                SinkError::Io(io::Error::new(io::ErrorKind::Other, "boom")),
            ));
        }
        report
    }

    #[test]
    fn test_emission_counters() {
        let mut stats = RunStatistics::new();
        stats.record_emission(&emission(TrafficPeriod::MorningRush, 1, 8));
        stats.record_emission(&emission(TrafficPeriod::MorningRush, 2, 9));
        stats.record_emission(&emission(TrafficPeriod::Overnight, 1, 22));

        assert_eq!(stats.records_generated, 3);
        assert_eq!(stats.bursts, 2);
        assert_eq!(stats.period_count(TrafficPeriod::MorningRush), 2);
        assert!((stats.period_share(TrafficPeriod::Overnight) - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.first_timestamp.unwrap().time().to_string(), "08:00:00");
        assert_eq!(stats.last_timestamp.unwrap().time().to_string(), "22:00:00");
        assert!((stats.average_burst_length() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_sink_reports() {
        let mut stats = RunStatistics::new();
        stats.record_emission(&emission(TrafficPeriod::BusinessLunch, 1, 12));
        stats.record_sink_report(&report(None));
        stats.record_emission(&emission(TrafficPeriod::BusinessLunch, 2, 12));
        stats.record_sink_report(&report(Some("csv")));

        assert_eq!(stats.records_written, 1);
        assert_eq!(stats.sinks["csv"].written, 1);
        assert_eq!(stats.sinks["csv"].failed, 1);
        assert_eq!(stats.sinks["dry-run"].written, 2);
        assert_eq!(stats.total_failures(), 1);
        assert_eq!(stats.sinks["csv"].average_time(), Duration::from_millis(2));
        assert_eq!(stats.average_sink_time(), Duration::from_millis(3));
    }

    #[test]
    fn test_averages_past_u32_counts() {
        let sink = SinkStatistics {
            written: 1 << 32,
            failed: 0,
            total_time: Duration::from_secs(1 << 33),
        };
        assert_eq!(sink.average_time(), Duration::from_secs(2));

        let mut stats = RunStatistics::new();
        stats.records_generated = u64::from(u32::MAX) + 2;
        stats.sinks.insert(
            "csv".to_string(),
            SinkStatistics {
                written: stats.records_generated,
                failed: 0,
                total_time: Duration::from_secs(u64::from(u32::MAX) + 2),
            },
        );
        assert_eq!(stats.average_sink_time(), Duration::from_secs(1));
    }

    #[test]
    fn test_empty_statistics_do_not_divide_by_zero() {
        let stats = RunStatistics::new();
        assert_eq!(stats.period_share(TrafficPeriod::EveningRush), 0.0);
        assert_eq!(stats.average_sink_time(), Duration::ZERO);
        assert_eq!(stats.records_per_second(), 0.0);
        assert_eq!(stats.average_burst_length(), 0.0);
    }

    #[test]
    fn test_summary_output_lists_periods_and_sinks() {
        let mut stats = RunStatistics::new();
        stats.record_emission(&emission(TrafficPeriod::EveningRush, 1, 17));
        stats.record_sink_report(&report(None));
        stats.set_elapsed(Duration::from_secs(2));
        stats.set_stop_reason(StopReason::Interrupted);

        let output = stats.generate_summary_output();
        assert!(output.contains("Records Generated: 1"));
        assert!(output.contains("Evening Rush:"));
        assert!(output.contains("csv: 1 written, 0 failed"));
        assert!(output.contains("Stop Reason: interrupted"));
        assert!(stats.to_string().contains("1 generated"));
    }
}
