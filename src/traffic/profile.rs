//! Traffic profile: the four time-of-day periods and their sampling parameters
//!
//! A [`TrafficProfile`] holds one [`PeriodSpec`] per [`TrafficPeriod`]. Once
//! validated, the period windows partition the 24-hour day and the shares sum
//! to one, which makes [`TrafficProfile::classify`] total.

use crate::types::TrafficPeriod;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Milliseconds in a calendar day
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Tolerance used when checking that period shares sum to one
const SHARE_SUM_TOLERANCE: f64 = 0.001;

/// Errors found while validating a traffic profile
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    /// A period appears more than once
    #[error("Traffic profile lists the {0} period more than once")]
    DuplicatePeriod(TrafficPeriod),

    /// A window starts and ends at the same instant
    #[error("The {0} window is empty (start equals end)")]
    EmptyWindow(TrafficPeriod),

    /// Consecutive windows leave a gap or overlap
    #[error("The {period} window ends at {end} but the next window starts at {next_start}")]
    NotContiguous {
        /// Period whose end does not meet the next start
        period: TrafficPeriod,
        /// End of that period's window
        end: NaiveTime,
        /// Start of the following window
        next_start: NaiveTime,
    },

    /// A share is negative, above one, or not a number
    #[error("Invalid share for the {period} period: {share} (must be between 0.0 and 1.0)")]
    InvalidShare {
        /// Offending period
        period: TrafficPeriod,
        /// Configured share
        share: f64,
    },

    /// Shares do not add up to one
    #[error("Traffic period shares must sum to 1.0, got {sum}")]
    InvalidShareSum {
        /// Actual sum of all shares
        sum: f64,
    },

    /// A multiplier range is reversed, negative, or not finite
    #[error("Invalid {which} multiplier range for the {period} period: {min}..{max}")]
    InvalidMultiplierRange {
        /// Offending period
        period: TrafficPeriod,
        /// `speed` or `count`
        which: &'static str,
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },
}

/// Half-open time-of-day window `[start, end)`, wrapping midnight when `end <= start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// First instant of the window
    pub start: NaiveTime,
    /// First instant after the window
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Window from whole hours; `end_hour` 24 is midnight
    pub fn from_hours(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start: hour(start_hour),
            end: hour(end_hour % 24),
        }
    }

    /// Whether the window crosses midnight
    pub fn wraps(&self) -> bool {
        self.end <= self.start
    }

    /// Whether `time` falls inside the window
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.wraps() {
            time >= self.start || time < self.end
        } else {
            time >= self.start && time < self.end
        }
    }

    /// Length of the window in milliseconds
    pub fn duration_ms(&self) -> i64 {
        (millis_of_day(self.end) - millis_of_day(self.start)).rem_euclid(MILLIS_PER_DAY)
    }

    /// A uniformly drawn instant inside the window on `date`
    ///
    /// For a wrapping window the instant lands on either side of midnight of
    /// the same calendar day.
    pub fn sample_on<R: Rng + ?Sized>(&self, date: NaiveDate, rng: &mut R) -> NaiveDateTime {
        let duration = self.duration_ms();
        let offset = if duration > 0 { rng.gen_range(0..duration) } else { 0 };
        let (time, _) = self.start.overflowing_add_signed(Duration::milliseconds(offset));
        date.and_time(time)
    }

    /// The instant this window closes, for a window occurrence containing `instant`
    pub fn end_after(&self, instant: NaiveDateTime) -> NaiveDateTime {
        let date = instant.date();
        if instant.time() < self.end {
            date.and_time(self.end)
        } else {
            date.and_time(self.end)
                .checked_add_signed(Duration::days(1))
                .unwrap_or(NaiveDateTime::MAX)
        }
    }
}

/// Inclusive multiplier range sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiplierRange {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

impl MultiplierRange {
    /// Create a range
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies inside the range
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Draw a multiplier uniformly from the range
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.min >= self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min >= 0.0 && self.min <= self.max
    }
}

/// Sampling parameters for one traffic period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodSpec {
    /// Which period these parameters describe
    pub period: TrafficPeriod,
    /// Time-of-day window the period covers
    pub window: TimeWindow,
    /// Target fraction of the daily record volume
    pub share: f64,
    /// Multiplier applied to the baseline mean speed
    pub speed_multiplier: MultiplierRange,
    /// Multiplier applied to the baseline vehicle count
    pub count_multiplier: MultiplierRange,
}

/// The complete time-of-day traffic model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficProfile {
    periods: [PeriodSpec; 4],
}

impl Default for TrafficProfile {
    fn default() -> Self {
        Self {
            periods: [
                PeriodSpec {
                    period: TrafficPeriod::MorningRush,
                    window: TimeWindow::from_hours(7, 10),
                    share: 0.50,
                    speed_multiplier: MultiplierRange::new(0.60, 0.80),
                    count_multiplier: MultiplierRange::new(1.50, 2.00),
                },
                PeriodSpec {
                    period: TrafficPeriod::BusinessLunch,
                    window: TimeWindow::from_hours(10, 16),
                    share: 0.30,
                    speed_multiplier: MultiplierRange::new(0.85, 1.00),
                    count_multiplier: MultiplierRange::new(1.00, 1.30),
                },
                PeriodSpec {
                    period: TrafficPeriod::EveningRush,
                    window: TimeWindow::from_hours(16, 20),
                    share: 0.15,
                    speed_multiplier: MultiplierRange::new(0.65, 0.85),
                    count_multiplier: MultiplierRange::new(1.40, 1.80),
                },
                PeriodSpec {
                    period: TrafficPeriod::Overnight,
                    window: TimeWindow::from_hours(20, 7),
                    share: 0.05,
                    speed_multiplier: MultiplierRange::new(1.10, 1.20),
                    count_multiplier: MultiplierRange::new(0.30, 0.50),
                },
            ],
        }
    }
}

impl TrafficProfile {
    /// Build a profile from period specs, validating the day partition
    pub fn new(periods: [PeriodSpec; 4]) -> Result<Self, ProfileError> {
        let profile = Self { periods };
        profile.validate()?;
        Ok(profile)
    }

    /// All period specs in the order they were configured
    pub fn periods(&self) -> &[PeriodSpec] {
        &self.periods
    }

    /// Parameters of a named period
    pub fn spec(&self, period: TrafficPeriod) -> Option<&PeriodSpec> {
        self.periods.iter().find(|spec| spec.period == period)
    }

    /// Resolve the period covering `time`
    ///
    /// Boundary instants belong to the period starting there. On a validated
    /// profile the result is the unique window containing `time`.
    pub fn classify(&self, time: NaiveTime) -> &PeriodSpec {
        let latest_start_at_or_before = self
            .periods
            .iter()
            .filter(|spec| spec.window.start <= time)
            .max_by_key(|spec| spec.window.start);

        // Before every start: the window wrapping midnight holds the time
        latest_start_at_or_before
            .or_else(|| self.periods.iter().max_by_key(|spec| spec.window.start))
            .unwrap_or(&self.periods[0])
    }

    /// Pick a period with probability proportional to its share
    pub fn sample_period<R: Rng + ?Sized>(&self, rng: &mut R) -> &PeriodSpec {
        self.sample_period_among(rng, |_| true)
            .unwrap_or(&self.periods[0])
    }

    /// Pick a period by share among those `eligible` accepts
    ///
    /// Returns `None` when no eligible period has a positive share.
    pub fn sample_period_among<R, F>(&self, rng: &mut R, mut eligible: F) -> Option<&PeriodSpec>
    where
        R: Rng + ?Sized,
        F: FnMut(&PeriodSpec) -> bool,
    {
        let candidates: Vec<&PeriodSpec> = self
            .periods
            .iter()
            .filter(|spec| spec.share > 0.0 && eligible(*spec))
            .collect();
        let total: f64 = candidates.iter().map(|spec| spec.share).sum();
        if candidates.is_empty() || total <= 0.0 {
            return None;
        }

        let mut roll = rng.gen::<f64>() * total;
        for &spec in &candidates {
            if roll < spec.share {
                return Some(spec);
            }
            roll -= spec.share;
        }

        // Rounding can leave the roll just past the last share
        candidates.last().copied()
    }

    /// Check the partition, share and multiplier invariants
    pub fn validate(&self) -> Result<(), ProfileError> {
        // Four slots and no duplicates means every period is present
        let mut seen = [false; 4];
        for spec in &self.periods {
            let slot = &mut seen[spec.period.index()];
            if *slot {
                return Err(ProfileError::DuplicatePeriod(spec.period));
            }
            *slot = true;
        }

        for spec in &self.periods {
            if spec.window.start == spec.window.end {
                return Err(ProfileError::EmptyWindow(spec.period));
            }
            if !spec.share.is_finite() || !(0.0..=1.0).contains(&spec.share) {
                return Err(ProfileError::InvalidShare {
                    period: spec.period,
                    share: spec.share,
                });
            }
            for (which, range) in [
                ("speed", spec.speed_multiplier),
                ("count", spec.count_multiplier),
            ] {
                if !range.is_valid() {
                    return Err(ProfileError::InvalidMultiplierRange {
                        period: spec.period,
                        which,
                        min: range.min,
                        max: range.max,
                    });
                }
            }
        }

        let sum: f64 = self.periods.iter().map(|spec| spec.share).sum();
        if (sum - 1.0).abs() > SHARE_SUM_TOLERANCE {
            return Err(ProfileError::InvalidShareSum { sum });
        }

        // Sorted by start, every window must end where the next one begins.
        // With all windows non-empty that makes them cover the day exactly once.
        let mut ordered: Vec<&PeriodSpec> = self.periods.iter().collect();
        ordered.sort_by_key(|spec| spec.window.start);
        for (i, spec) in ordered.iter().enumerate() {
            let next = ordered[(i + 1) % ordered.len()];
            if spec.window.end != next.window.start {
                return Err(ProfileError::NotContiguous {
                    period: spec.period,
                    end: spec.window.end,
                    next_start: next.window.start,
                });
            }
        }

        Ok(())
    }
}

fn hour(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Milliseconds since midnight
pub fn millis_of_day(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight()) * 1000 + i64::from(time.nanosecond() / 1_000_000)
}
