//! Sensor/burst scheduler
//!
//! The scheduler owns the only mutable state of a run: the synthetic clock,
//! the sensor currently emitting, how many records its burst still owes and
//! the random number generator. Each call to [`BurstScheduler::next_emission`]
//! yields one record; the iterator ends once the record limit, the simulated
//! span or the full-day plan is exhausted.

use crate::records::{Record, Synthesizer};
use crate::simulation::day_plan::{DayPlan, PlannedBurst};
use crate::simulation::time_manager::TimeManager;
use crate::simulation::time_variance::TimeVariance;
use crate::traffic::TrafficProfile;
use crate::types::{RunConfig, SensorId, SensorPool, TimelineMode, TrafficPeriod};
use chrono::NaiveDateTime;
use rand::{Rng, RngCore};
use tracing::{debug, trace};

/// Shortest burst a sensor emits
pub const MIN_BURST_LENGTH: u8 = 2;

/// Longest burst a sensor emits
pub const MAX_BURST_LENGTH: u8 = 5;

/// Scheduler state machine: `Idle → InBurst → Idle … → Done`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstState {
    /// Next emission starts a new burst
    Idle,
    /// A sensor is part-way through its burst
    InBurst {
        /// Sensor emitting the burst
        sensor: SensorId,
        /// Records the burst was drawn with
        length: u8,
        /// Records the burst still owes
        remaining: u8,
    },
    /// No more records will be produced
    Done,
}

/// A record together with where it sits in the run
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    /// The synthesized record
    pub record: Record,
    /// Period the record's timestamp falls in
    pub period: TrafficPeriod,
    /// 1-based burst number within the run
    pub burst: u64,
    /// Length the burst was drawn with
    pub burst_length: u8,
    /// 1-based position of the record within its burst
    pub position: u8,
}

#[derive(Debug, Clone)]
struct SequentialClock {
    clock: NaiveDateTime,
    started: bool,
    horizon: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
struct ActiveBurst {
    planned: PlannedBurst,
    last: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
enum Timeline {
    Sequential(SequentialClock),
    FullDay {
        plan: DayPlan,
        active: Option<ActiveBurst>,
    },
}

impl Timeline {
    fn next_timestamp<R: Rng + ?Sized>(
        &mut self,
        variance: &TimeVariance,
        rng: &mut R,
    ) -> Option<NaiveDateTime> {
        match self {
            Timeline::Sequential(seq) => {
                if seq.started {
                    seq.clock = variance.advance(seq.clock, rng);
                } else {
                    seq.started = true;
                }
                match seq.horizon {
                    Some(horizon) if seq.clock > horizon => None,
                    _ => Some(seq.clock),
                }
            }
            Timeline::FullDay { active, .. } => {
                let burst = active.as_mut()?;
                let timestamp = match burst.last {
                    None => burst.planned.anchor,
                    Some(last) => last
                        .checked_add_signed(variance.capped_step(rng, burst.planned.step_cap()))
                        .unwrap_or(burst.planned.bound),
                };
                burst.last = Some(timestamp);
                Some(timestamp)
            }
        }
    }
}

/// Chooses sensors and burst lengths and drives the synthetic clock
#[derive(Debug)]
pub struct BurstScheduler<R: RngCore> {
    synthesizer: Box<dyn Synthesizer>,
    profile: TrafficProfile,
    pool: SensorPool,
    variance: TimeVariance,
    timeline: Timeline,
    record_limit: Option<u64>,
    state: BurstState,
    emitted: u64,
    bursts: u64,
    rng: R,
}

impl<R: RngCore> BurstScheduler<R> {
    /// Scheduler whose clock starts at `start` and steps forward by `variance`
    ///
    /// Stops after `record_limit` records or once the clock passes `horizon`,
    /// whichever comes first. With neither set it runs until dropped.
    #[allow(clippy::too_many_arguments)]
    pub fn sequential(
        synthesizer: Box<dyn Synthesizer>,
        profile: TrafficProfile,
        pool: SensorPool,
        variance: TimeVariance,
        start: NaiveDateTime,
        record_limit: Option<u64>,
        horizon: Option<NaiveDateTime>,
        rng: R,
    ) -> Self {
        Self {
            synthesizer,
            profile,
            pool,
            variance,
            timeline: Timeline::Sequential(SequentialClock {
                clock: start,
                started: false,
                horizon,
            }),
            record_limit,
            state: BurstState::Idle,
            emitted: 0,
            bursts: 0,
            rng,
        }
    }

    /// Scheduler that spreads `record_count` records over the days of `time_manager`
    pub fn full_day(
        synthesizer: Box<dyn Synthesizer>,
        profile: TrafficProfile,
        pool: SensorPool,
        variance: TimeVariance,
        time_manager: &TimeManager,
        record_count: u64,
        mut rng: R,
    ) -> Self {
        let plan = DayPlan::build(
            &profile,
            time_manager.first_day(),
            time_manager.days(),
            record_count,
            &mut rng,
        );

        Self {
            synthesizer,
            profile,
            pool,
            variance,
            timeline: Timeline::FullDay { plan, active: None },
            record_limit: Some(record_count),
            state: BurstState::Idle,
            emitted: 0,
            bursts: 0,
            rng,
        }
    }

    /// Build the scheduler a run configuration describes
    pub fn from_config(
        config: &RunConfig,
        synthesizer: Box<dyn Synthesizer>,
        time_manager: &TimeManager,
        rng: R,
    ) -> Self {
        let pool = SensorPool::new(config.sensor_count);
        let variance = TimeVariance::new(config.jitter_min_ms, config.jitter_max_ms);
        let profile = config.profile.clone();

        match config.timeline {
            TimelineMode::Sequential => {
                let horizon = config
                    .simulated_span_secs
                    .map(|secs| time_manager.horizon_after_secs(secs));
                Self::sequential(
                    synthesizer,
                    profile,
                    pool,
                    variance,
                    time_manager.simulation_start(),
                    config.record_count,
                    horizon,
                    rng,
                )
            }
            TimelineMode::FullDay => Self::full_day(
                synthesizer,
                profile,
                pool,
                variance,
                time_manager,
                config.record_count.unwrap_or(0),
                rng,
            ),
        }
    }

    /// Current state of the burst state machine
    pub fn state(&self) -> BurstState {
        self.state
    }

    /// Records produced so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Bursts started so far
    pub fn bursts_started(&self) -> u64 {
        self.bursts
    }

    /// Whether the scheduler has finished
    pub fn is_done(&self) -> bool {
        self.state == BurstState::Done
    }

    /// The traffic profile records are classified against
    pub fn profile(&self) -> &TrafficProfile {
        &self.profile
    }

    /// Produce the next record, or `None` once the run is complete
    pub fn next_emission(&mut self) -> Option<Emission> {
        if self.state == BurstState::Done {
            return None;
        }
        if self.limit_reached() {
            return self.finish();
        }

        let (sensor, length, remaining) = match self.state {
            BurstState::InBurst {
                sensor,
                length,
                remaining,
            } => (sensor, length, remaining),
            _ => match self.open_burst() {
                Some(burst) => burst,
                None => return self.finish(),
            },
        };

        let timestamp = match self.timeline.next_timestamp(&self.variance, &mut self.rng) {
            Some(timestamp) => timestamp,
            None => return self.finish(),
        };

        let spec = self.profile.classify(timestamp.time());
        let record = self.synthesizer.synthesize(sensor, timestamp, spec, &mut self.rng);
        let period = spec.period;

        let remaining = remaining - 1;
        self.state = if remaining == 0 {
            BurstState::Idle
        } else {
            BurstState::InBurst {
                sensor,
                length,
                remaining,
            }
        };
        self.emitted += 1;

        trace!(
            "Emitted {} at {} ({}, burst {} record {}/{})",
            sensor,
            timestamp,
            period,
            self.bursts,
            length - remaining,
            length
        );

        if self.limit_reached() {
            self.finish();
        }

        Some(Emission {
            record,
            period,
            burst: self.bursts,
            burst_length: length,
            position: length - remaining,
        })
    }

    fn open_burst(&mut self) -> Option<(SensorId, u8, u8)> {
        let length = match &mut self.timeline {
            Timeline::Sequential(_) => self.rng.gen_range(MIN_BURST_LENGTH..=MAX_BURST_LENGTH),
            Timeline::FullDay { plan, active } => {
                let planned = plan.pop_next()?;
                *active = Some(ActiveBurst {
                    planned,
                    last: None,
                });
                planned.length
            }
        };
        if length == 0 {
            return None;
        }

        let sensor = self.pool.pick(&mut self.rng);
        self.bursts += 1;
        debug!("Burst {} opened for {} with {} record(s)", self.bursts, sensor, length);

        Some((sensor, length, length))
    }

    fn limit_reached(&self) -> bool {
        self.record_limit.map_or(false, |limit| self.emitted >= limit)
    }

    fn finish(&mut self) -> Option<Emission> {
        if self.state != BurstState::Done {
            debug!(
                "Scheduler done after {} record(s) in {} burst(s)",
                self.emitted, self.bursts
            );
        }
        self.state = BurstState::Done;
        None
    }
}

impl<R: RngCore> Iterator for BurstScheduler<R> {
    type Item = Emission;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_emission()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::TimeDistributedSynthesizer;
    use crate::records::SamplingBaseline;
    use chrono::{Duration, NaiveDate};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 27)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn sequential(limit: Option<u64>, horizon: Option<NaiveDateTime>, seed: u64) -> BurstScheduler<StdRng> {
        BurstScheduler::sequential(
            Box::new(TimeDistributedSynthesizer::new(SamplingBaseline::from_config(
                &RunConfig::default(),
            ))),
            TrafficProfile::default(),
            SensorPool::default(),
            TimeVariance::default(),
            start(),
            limit,
            horizon,
            StdRng::seed_from_u64(seed),
        )
    }

    #[test]
    fn test_starts_idle_and_ends_done() {
        let mut scheduler = sequential(Some(3), None, 1);
        assert_eq!(scheduler.state(), BurstState::Idle);

        let emitted: Vec<_> = scheduler.by_ref().collect();
        assert_eq!(emitted.len(), 3);
        assert_eq!(scheduler.state(), BurstState::Done);
        assert!(scheduler.next_emission().is_none());
    }

    #[test]
    fn test_first_record_at_start_instant() {
        let mut scheduler = sequential(Some(1), None, 2);
        let emission = scheduler.next_emission().unwrap();
        assert_eq!(emission.record.timestamp, start());
        assert_eq!(emission.period, TrafficPeriod::MorningRush);
        assert_eq!(emission.position, 1);
    }

    #[test]
    fn test_bursts_keep_one_sensor() {
        let emissions: Vec<_> = sequential(Some(500), None, 3).collect();

        for pair in emissions.windows(2) {
            if pair[0].burst == pair[1].burst {
                assert_eq!(pair[0].record.sensor_id, pair[1].record.sensor_id);
                assert_eq!(pair[1].position, pair[0].position + 1);
            } else {
                assert_eq!(pair[1].burst, pair[0].burst + 1);
                assert_eq!(pair[1].position, 1);
                // A completed burst emitted exactly its drawn length
                assert_eq!(pair[0].position, pair[0].burst_length);
            }
        }
    }

    #[test]
    fn test_horizon_stops_run() {
        let horizon = start() + Duration::seconds(30);
        let emissions: Vec<_> = sequential(None, Some(horizon), 4).collect();

        assert!(!emissions.is_empty());
        assert!(emissions.iter().all(|e| e.record.timestamp <= horizon));
        // 30 s at 50-1500 ms per step
        assert!(emissions.len() >= 20 && emissions.len() <= 601);
    }

    #[test]
    fn test_unbounded_keeps_going() {
        let mut scheduler = sequential(None, None, 5);
        for _ in 0..10_000 {
            assert!(scheduler.next_emission().is_some());
        }
        assert_eq!(scheduler.emitted(), 10_000);
        assert!(!scheduler.is_done());
    }

    #[test]
    fn test_in_burst_state_tracks_remaining() {
        let mut scheduler = sequential(Some(100), None, 6);
        let first = scheduler.next_emission().unwrap();
        match scheduler.state() {
            BurstState::InBurst {
                sensor,
                length,
                remaining,
            } => {
                assert_eq!(sensor, first.record.sensor_id);
                assert_eq!(length, first.burst_length);
                assert_eq!(remaining, length - 1);
            }
            other => panic!("expected InBurst after the first record, got {:?}", other),
        }
    }
}
