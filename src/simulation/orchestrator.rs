//! Main simulation orchestrator
//!
//! Wires the run configuration to the synthesizer, the burst scheduler and
//! the sinks, and drives the record loop with its stop conditions, pacing
//! and progress reporting.

use crate::records::build_synthesizer;
use crate::simulation::{
    BurstScheduler, BurstState, ErrorHandler, RecoveryStrategy, RunStatistics, ShutdownFlag,
    SimulationError, SimulationResult, StopReason, TimeManager,
};
use crate::sinks::SinkSet;
use crate::types::RunConfig;
use crate::{perf_span, sim_event};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Main simulation orchestrator that coordinates all components
#[derive(Debug)]
pub struct SimulationOrchestrator {
    /// Validated configuration for the run
    config: RunConfig,
    /// Synthetic start instant and wall-clock tracking
    time_manager: TimeManager,
    /// Source of records
    scheduler: BurstScheduler<StdRng>,
    /// Decides whether a sink failure ends the run
    error_handler: ErrorHandler,
    /// Counters for the run
    statistics: RunStatistics,
    /// Wall-clock settings converted once at construction
    limits: WallClockLimits,
}

/// Wall-clock settings of a run as [`Duration`]s
#[derive(Debug, Clone, Copy)]
struct WallClockLimits {
    duration: Option<Duration>,
    progress_interval: Duration,
    pace_interval: Option<Duration>,
}

impl WallClockLimits {
    fn from_config(config: &RunConfig) -> SimulationResult<Self> {
        let duration = config
            .duration_secs
            .map(|secs| seconds("duration", secs))
            .transpose()?;
        let progress_interval = seconds("progress interval", config.progress_interval_secs)?;
        let pace_interval = if config.rate > 0.0 {
            Some(seconds("rate interval", 1.0 / config.rate)?)
        } else {
            None
        };

        Ok(Self {
            duration,
            progress_interval,
            pace_interval,
        })
    }
}

fn seconds(what: &str, secs: f64) -> SimulationResult<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|e| {
        SimulationError::configuration_error(format!("{} of {} seconds: {}", what, secs, e))
    })
}

/// Spaces records one `interval` apart
#[derive(Debug)]
struct Pacer {
    interval: Duration,
    next_tick: Instant,
}

impl Pacer {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_tick: Instant::now(),
        }
    }

    fn wait(&mut self) {
        let now = Instant::now();
        self.next_tick = self.next_tick.checked_add(self.interval).unwrap_or(now);
        if self.next_tick > now {
            thread::sleep(self.next_tick - now);
        } else if now - self.next_tick > self.interval {
            // Fell behind (slow sink); do not burst to catch up
            self.next_tick = now;
        }
    }
}

impl SimulationOrchestrator {
    /// Validate `config` and build the scheduler it describes
    #[instrument(skip(config), fields(generator = %config.generator, timeline = %config.timeline))]
    pub fn new(config: RunConfig) -> SimulationResult<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => {
                info!("Using deterministic seed: {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => {
                debug!("Using entropy-based random seed");
                StdRng::from_entropy()
            }
        };

        let limits = WallClockLimits::from_config(&config)?;
        let time_manager = TimeManager::from_config(&config);
        let synthesizer = build_synthesizer(&config).map_err(|e| {
            SimulationError::configuration_error(format!("invalid speed distribution: {}", e))
        })?;
        let scheduler = BurstScheduler::from_config(&config, synthesizer, &time_manager, rng);

        info!(
            "Orchestrator ready: {} sensors, {} generator, {} timeline",
            config.sensor_count, config.generator, config.timeline
        );

        Ok(Self {
            error_handler: ErrorHandler::new(config.stop_on_error),
            config,
            time_manager,
            scheduler,
            statistics: RunStatistics::new(),
            limits,
        })
    }

    /// Configuration the run was built from
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Time manager for the run
    pub fn time_manager(&self) -> &TimeManager {
        &self.time_manager
    }

    /// Statistics gathered so far
    pub fn statistics(&self) -> &RunStatistics {
        &self.statistics
    }

    /// Current scheduler state
    pub fn scheduler_state(&self) -> BurstState {
        self.scheduler.state()
    }

    /// Generate records into `sinks` until a stop condition is met
    ///
    /// Stops when the scheduler is exhausted, the configured duration has
    /// elapsed, `shutdown` is raised, or a sink fails with stop-on-error set.
    /// The record in flight is always handed to every sink before stopping.
    #[instrument(skip_all, fields(sinks = sinks.len()))]
    pub fn run(
        &mut self,
        sinks: &mut SinkSet,
        shutdown: &ShutdownFlag,
    ) -> SimulationResult<RunStatistics> {
        let span = perf_span!("record_loop", target_records = self.config.record_count);
        let _entered = span.enter();

        self.time_manager.restart_wall_clock();
        let duration_limit = self.limits.duration;
        let progress_interval = self.limits.progress_interval;
        let mut pacer = self.limits.pace_interval.map(Pacer::new);
        let mut last_progress = Instant::now();

        info!(
            "Starting run at {} ({})",
            self.time_manager.simulation_start(),
            match (self.config.record_count, duration_limit) {
                (Some(count), _) => format!("{} records", count),
                (None, Some(limit)) => format!("{:.1}s", limit.as_secs_f64()),
                (None, None) => "until the simulated span ends".to_string(),
            }
        );

        let stop_reason = loop {
            if shutdown.is_triggered() {
                break StopReason::Interrupted;
            }
            if self.time_manager.duration_reached(duration_limit) {
                break StopReason::DurationElapsed;
            }

            let emission = match self.scheduler.next_emission() {
                Some(emission) => emission,
                None => break StopReason::Completed,
            };
            self.statistics.record_emission(&emission);

            let report = sinks.write(&emission.record);
            self.statistics.record_sink_report(&report);

            let mut abort = false;
            for (sink, source) in report.failures {
                let error = SimulationError::sink_write_error(sink, source);
                if self.error_handler.handle_error(&error) == RecoveryStrategy::Abort {
                    abort = true;
                }
            }
            if abort {
                break StopReason::SinkFailure;
            }

            if last_progress.elapsed() >= progress_interval {
                self.log_progress();
                last_progress = Instant::now();
            }

            if let Some(pacer) = pacer.as_mut() {
                pacer.wait();
            }
        };

        for (sink, error) in sinks.flush() {
            warn!("Failed to flush {} sink: {}", sink, error);
        }

        self.statistics.set_elapsed(self.time_manager.elapsed());
        self.statistics.set_stop_reason(stop_reason);
        info!("Run finished: {}", self.statistics.compact_summary());

        Ok(self.statistics.clone())
    }

    fn log_progress(&self) {
        let elapsed = self.time_manager.elapsed().as_secs_f64();
        let records = self.statistics.records_generated;
        let rate = if elapsed > 0.0 {
            records as f64 / elapsed
        } else {
            0.0
        };
        sim_event!(
            info,
            "Progress",
            records = records,
            elapsed_secs = elapsed,
            rate = rate,
            failures = self.statistics.total_failures(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Record;
    use crate::sinks::{RecordSink, SinkError};
    use crate::types::TimelineMode;
    use chrono::{NaiveDate, NaiveTime};
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Default)]
    struct Collecting {
        records: Arc<Mutex<Vec<Record>>>,
    }

    impl RecordSink for Collecting {
        fn name(&self) -> &str {
            "collecting"
        }

        fn write(&mut self, record: &Record) -> Result<(), SinkError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    struct Failing;

    impl RecordSink for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn write(&mut self, _record: &Record) -> Result<(), SinkError> {
            Err(SinkError::Io(io::Error::new(io::ErrorKind::Other, "disk full")))
        }
    }

    fn config(records: u64) -> RunConfig {
        RunConfig {
            record_count: Some(records),
            seed: Some(42),
            date: NaiveDate::from_ymd_opt(2025, 10, 27),
            start_time: NaiveTime::from_hms_opt(8, 0, 0),
            ..RunConfig::default()
        }
    }

    fn run(config: RunConfig, sinks: &mut SinkSet) -> RunStatistics {
        SimulationOrchestrator::new(config)
            .unwrap()
            .run(sinks, &ShutdownFlag::new())
            .unwrap()
    }

    #[test]
    fn test_orchestrator_creation() {
        let orchestrator = SimulationOrchestrator::new(config(10)).unwrap();
        assert_eq!(orchestrator.scheduler_state(), BurstState::Idle);
        assert_eq!(orchestrator.statistics().records_generated, 0);
        assert_eq!(orchestrator.config().record_count, Some(10));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut bad = config(10);
        bad.sensor_count = 0;
        assert!(matches!(
            SimulationOrchestrator::new(bad),
            Err(SimulationError::ValidationError(_))
        ));
    }

    #[test]
    fn test_out_of_range_wall_clock_settings_are_rejected() {
        let mut tiny_rate = config(10);
        tiny_rate.rate = 1e-30;
        let mut slow_progress = config(10);
        slow_progress.progress_interval_secs = 1e30;
        let mut long_duration = config(10);
        long_duration.duration_secs = Some(1e30);
        let mut long_span = config(10);
        long_span.simulated_span_secs = Some(u64::MAX);
        let mut many_days = config(10);
        many_days.days = u32::MAX;

        for bad in [tiny_rate, slow_progress, long_duration, long_span, many_days] {
            assert!(matches!(
                SimulationOrchestrator::new(bad),
                Err(SimulationError::ValidationError(_))
            ));
        }
    }

    #[test]
    fn test_wall_clock_limits_convert_rate() {
        let mut cfg = config(10);
        cfg.rate = 4.0;
        cfg.duration_secs = Some(2.5);
        let limits = WallClockLimits::from_config(&cfg).unwrap();
        assert_eq!(limits.pace_interval, Some(Duration::from_millis(250)));
        assert_eq!(limits.duration, Some(Duration::from_millis(2_500)));
        assert_eq!(limits.progress_interval, Duration::from_secs(5));

        cfg.progress_interval_secs = f64::INFINITY;
        assert!(matches!(
            WallClockLimits::from_config(&cfg),
            Err(SimulationError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_longest_simulated_span_runs() {
        let mut cfg = config(20);
        cfg.simulated_span_secs = Some(crate::types::MAX_SIMULATED_SPAN_SECS);
        cfg.days = crate::types::MAX_DAYS;
        let mut sinks = SinkSet::new();
        sinks.push(Box::new(Collecting::default()));

        let stats = run(cfg, &mut sinks);

        assert_eq!(stats.records_generated, 20);
        assert_eq!(stats.stop_reason, StopReason::Completed);
    }

    #[test]
    fn test_count_run_writes_every_record() {
        let collecting = Collecting::default();
        let mut sinks = SinkSet::new();
        sinks.push(Box::new(collecting.clone()));

        let stats = run(config(25), &mut sinks);

        assert_eq!(stats.records_generated, 25);
        assert_eq!(stats.records_written, 25);
        assert_eq!(stats.stop_reason, StopReason::Completed);
        assert_eq!(collecting.records.lock().unwrap().len(), 25);
        assert_eq!(stats.sinks["collecting"].written, 25);
    }

    #[test]
    fn test_failures_are_counted_and_skipped() {
        let collecting = Collecting::default();
        let mut sinks = SinkSet::new();
        sinks.push(Box::new(Failing));
        sinks.push(Box::new(collecting.clone()));

        let stats = run(config(8), &mut sinks);

        assert_eq!(stats.records_generated, 8);
        assert_eq!(stats.records_written, 0);
        assert_eq!(stats.sinks["failing"].failed, 8);
        assert_eq!(collecting.records.lock().unwrap().len(), 8);
        assert_eq!(stats.stop_reason, StopReason::Completed);
    }

    #[test]
    fn test_stop_on_error_aborts_after_first_record() {
        let collecting = Collecting::default();
        let mut sinks = SinkSet::new();
        sinks.push(Box::new(Failing));
        sinks.push(Box::new(collecting.clone()));

        let mut cfg = config(50);
        cfg.stop_on_error = true;
        let stats = run(cfg, &mut sinks);

        assert_eq!(stats.stop_reason, StopReason::SinkFailure);
        assert_eq!(stats.records_generated, 1);
        // The in-flight record still reached the healthy sink
        assert_eq!(collecting.records.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_shutdown_flag_stops_before_first_record() {
        let mut sinks = SinkSet::new();
        sinks.push(Box::new(Collecting::default()));
        let shutdown = ShutdownFlag::new();
        shutdown.trigger();

        let stats = SimulationOrchestrator::new(config(100))
            .unwrap()
            .run(&mut sinks, &shutdown)
            .unwrap();

        assert_eq!(stats.stop_reason, StopReason::Interrupted);
        assert_eq!(stats.records_generated, 0);
    }

    #[test]
    fn test_duration_run_stops_on_wall_clock() {
        let mut cfg = config(1);
        cfg.record_count = None;
        cfg.duration_secs = Some(0.2);
        cfg.rate = 50.0;
        let mut sinks = SinkSet::new();
        sinks.push(Box::new(Collecting::default()));

        let stats = run(cfg, &mut sinks);

        assert_eq!(stats.stop_reason, StopReason::DurationElapsed);
        assert!(stats.records_generated >= 1);
        assert!(stats.records_generated <= 20);
        assert!(stats.elapsed >= Duration::from_millis(200));
    }

    #[test]
    fn test_full_day_run_spans_periods() {
        let mut cfg = config(2_000);
        cfg.timeline = TimelineMode::FullDay;
        let mut sinks = SinkSet::new();
        sinks.push(Box::new(Collecting::default()));

        let stats = run(cfg, &mut sinks);

        assert_eq!(stats.records_generated, 2_000);
        assert!(stats.period_counts.iter().all(|&count| count > 0));
        assert!(stats.first_timestamp <= stats.last_timestamp);
    }
}
