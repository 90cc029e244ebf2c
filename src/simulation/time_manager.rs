//! Simulated and wall-clock time management
//!
//! This module resolves where the synthetic clock starts, which calendar days
//! a run covers, and how much real time the run has used so far.

use crate::types::RunConfig;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Time management for one run
#[derive(Debug, Clone)]
pub struct TimeManager {
    /// Instant the synthetic clock starts at
    simulation_start: NaiveDateTime,
    /// Number of calendar days the run covers
    days: u32,
    /// Real time the run started
    wall_start: Instant,
}

impl TimeManager {
    /// Create a time manager starting at `simulation_start` and covering `days` days
    pub fn new(simulation_start: NaiveDateTime, days: u32) -> Self {
        Self {
            simulation_start,
            days: days.max(1),
            wall_start: Instant::now(),
        }
    }

    /// Resolve the start instant from the configured date and time, falling back to now (UTC)
    pub fn from_config(config: &RunConfig) -> Self {
        let now = Utc::now().naive_utc();
        let start = Self::resolve_start(config.date, config.start_time, now);
        info!("Synthetic clock starts at {} covering {} day(s)", start, config.days);
        Self::new(start, config.days)
    }

    /// Combine an optional date and start time into the run start instant
    ///
    /// A date without a time starts at midnight; a time without a date runs on
    /// `now`'s date; neither gives `now` truncated to milliseconds.
    #[instrument]
    pub fn resolve_start(
        date: Option<NaiveDate>,
        start_time: Option<NaiveTime>,
        now: NaiveDateTime,
    ) -> NaiveDateTime {
        let start = match (date, start_time) {
            (Some(date), Some(time)) => date.and_time(time),
            (Some(date), None) => date.and_time(NaiveTime::MIN),
            (None, Some(time)) => now.date().and_time(time),
            (None, None) => truncate_to_millis(now),
        };
        debug!("Resolved simulation start: {}", start);
        start
    }

    /// Instant the synthetic clock starts at
    pub fn simulation_start(&self) -> NaiveDateTime {
        self.simulation_start
    }

    /// First calendar day of the run
    pub fn first_day(&self) -> NaiveDate {
        self.simulation_start.date()
    }

    /// Number of calendar days the run covers
    pub fn days(&self) -> u32 {
        self.days
    }

    /// Calendar day at `index` (0-based) within the run
    pub fn day(&self, index: u32) -> Option<NaiveDate> {
        if index >= self.days {
            return None;
        }
        self.first_day()
            .checked_add_signed(Duration::days(i64::from(index)))
    }

    /// Synthetic instant reached after `span` of simulated time
    ///
    /// Saturates at the latest representable instant.
    pub fn horizon(&self, span: Duration) -> NaiveDateTime {
        self.simulation_start
            .checked_add_signed(span)
            .unwrap_or(NaiveDateTime::MAX)
    }

    /// Synthetic instant reached after `secs` seconds of simulated time
    pub fn horizon_after_secs(&self, secs: u64) -> NaiveDateTime {
        Duration::from_std(std::time::Duration::from_secs(secs))
            .map_or(NaiveDateTime::MAX, |span| self.horizon(span))
    }

    /// Real time elapsed since the run started
    pub fn elapsed(&self) -> std::time::Duration {
        self.wall_start.elapsed()
    }

    /// Whether the wall-clock budget is used up
    pub fn duration_reached(&self, limit: Option<std::time::Duration>) -> bool {
        limit.map_or(false, |limit| self.elapsed() >= limit)
    }

    /// Reset the wall clock, e.g. after slow sink setup
    pub fn restart_wall_clock(&mut self) {
        self.wall_start = Instant::now();
    }
}

fn truncate_to_millis(instant: NaiveDateTime) -> NaiveDateTime {
    let millis = instant.nanosecond() / 1_000_000 * 1_000_000;
    instant.with_nanosecond(millis).unwrap_or(instant)
}
