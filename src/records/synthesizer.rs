//! Record synthesizers
//!
//! A [`Synthesizer`] turns a sensor, a timestamp and the traffic period that
//! covers it into a [`Record`]. Two strategies exist: a flat generator that
//! ignores the time of day and a period-aware one that scales speed and
//! vehicle count by the period multipliers.

use crate::records::record::{round_speed, Record};
use crate::traffic::PeriodSpec;
use crate::types::{GeneratorKind, RunConfig, SensorId};
use chrono::NaiveDateTime;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal, NormalError, StandardNormal};
use std::fmt;

/// Highest speed the flat generator reports
pub const BASIC_MAX_SPEED: f64 = 120.0;

/// Vehicle counts the flat generator draws from
pub const BASIC_VEHICLE_COUNT_RANGE: std::ops::RangeInclusive<u32> = 1..=5;

/// Baseline values every period multiplier applies to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingBaseline {
    /// Mean speed before the period multiplier
    pub speed_mean: f64,
    /// Speed standard deviation (not scaled)
    pub speed_stddev: f64,
    /// Vehicle count before the period multiplier
    pub base_vehicle_count: u32,
}

impl SamplingBaseline {
    /// Take the baseline from a run configuration
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            speed_mean: config.speed_mean,
            speed_stddev: config.speed_stddev,
            base_vehicle_count: config.base_vehicle_count,
        }
    }
}

/// Produces one record per call; all randomness comes from `rng`
pub trait Synthesizer: fmt::Debug + Send {
    /// Draw a record for `sensor` at `timestamp`, which falls in `period`
    fn synthesize(
        &self,
        sensor: SensorId,
        timestamp: NaiveDateTime,
        period: &PeriodSpec,
        rng: &mut dyn RngCore,
    ) -> Record;

    /// Which strategy this is
    fn kind(&self) -> GeneratorKind;
}

/// Period-aware synthesizer
///
/// speed ~ Normal(speed_mean × m, speed_stddev) with `m` drawn from the
/// period's speed range, floored at zero. The vehicle count is the baseline
/// scaled by a multiplier drawn from the period's count range.
#[derive(Debug, Clone)]
pub struct TimeDistributedSynthesizer {
    baseline: SamplingBaseline,
}

impl TimeDistributedSynthesizer {
    /// Create a synthesizer around a baseline
    pub fn new(baseline: SamplingBaseline) -> Self {
        Self { baseline }
    }
}

impl Synthesizer for TimeDistributedSynthesizer {
    fn synthesize(
        &self,
        sensor: SensorId,
        timestamp: NaiveDateTime,
        period: &PeriodSpec,
        rng: &mut dyn RngCore,
    ) -> Record {
        let speed_multiplier = period.speed_multiplier.sample(rng);
        let noise: f64 = rng.sample(StandardNormal);
        let speed = self.baseline.speed_mean * speed_multiplier + self.baseline.speed_stddev * noise;

        let count_multiplier = period.count_multiplier.sample(rng);
        let vehicle_count = (f64::from(self.baseline.base_vehicle_count) * count_multiplier)
            .round()
            .max(0.0) as u32;

        Record::new(sensor, vehicle_count, round_speed(speed.max(0.0)), timestamp)
    }

    fn kind(&self) -> GeneratorKind {
        GeneratorKind::TimeDistributed
    }
}

/// Flat synthesizer: the same distribution at every hour
#[derive(Debug, Clone)]
pub struct BasicSynthesizer {
    speed: Normal<f64>,
}

impl BasicSynthesizer {
    /// Create a synthesizer; fails when the standard deviation is not finite
    pub fn new(baseline: SamplingBaseline) -> Result<Self, NormalError> {
        Ok(Self {
            speed: Normal::new(baseline.speed_mean, baseline.speed_stddev)?,
        })
    }
}

impl Synthesizer for BasicSynthesizer {
    fn synthesize(
        &self,
        sensor: SensorId,
        timestamp: NaiveDateTime,
        _period: &PeriodSpec,
        rng: &mut dyn RngCore,
    ) -> Record {
        let vehicle_count = rng.gen_range(BASIC_VEHICLE_COUNT_RANGE);
        let speed: f64 = self.speed.sample(rng);

        Record::new(
            sensor,
            vehicle_count,
            round_speed(speed.clamp(0.0, BASIC_MAX_SPEED)),
            timestamp,
        )
    }

    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Basic
    }
}

/// Build the synthesizer a run configuration asks for
pub fn build_synthesizer(config: &RunConfig) -> Result<Box<dyn Synthesizer>, NormalError> {
    let baseline = SamplingBaseline::from_config(config);
    Ok(match config.generator {
        GeneratorKind::Basic => Box::new(BasicSynthesizer::new(baseline)?),
        GeneratorKind::TimeDistributed => Box::new(TimeDistributedSynthesizer::new(baseline)),
    })
}
