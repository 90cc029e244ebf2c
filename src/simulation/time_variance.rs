//! Time variance module for spacing consecutive readings on the synthetic clock
//!
//! This module provides forward-only jitter between records. Steps are never
//! negative, so a clock advanced only through [`TimeVariance`] is non-decreasing.

use chrono::{Duration, NaiveDateTime};
use rand::Rng;

use crate::records::Record;

/// Default smallest clock step in milliseconds
pub const DEFAULT_MIN_STEP_MS: u64 = 50;

/// Default largest clock step in milliseconds
pub const DEFAULT_MAX_STEP_MS: u64 = 1500;

/// Forward-only jitter applied between consecutive records
///
/// Each step is drawn uniformly from `[min_step_ms, max_step_ms]`. The caller
/// owns the random number generator so seeded runs stay reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeVariance {
    min_step_ms: u64,
    max_step_ms: u64,
}

impl TimeVariance {
    /// Create a jitter source; a reversed range is swapped into order
    pub fn new(min_step_ms: u64, max_step_ms: u64) -> Self {
        Self {
            min_step_ms: min_step_ms.min(max_step_ms),
            max_step_ms: max_step_ms.max(min_step_ms),
        }
    }

    /// Smallest and largest step in milliseconds
    pub fn range_ms(&self) -> (u64, u64) {
        (self.min_step_ms, self.max_step_ms)
    }

    /// Draw the next clock step
    pub fn next_step<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let ms = rng.gen_range(self.min_step_ms..=self.max_step_ms);
        Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
    }

    /// Draw a step no longer than `cap`
    pub fn capped_step<R: Rng + ?Sized>(&self, rng: &mut R, cap: Duration) -> Duration {
        self.next_step(rng).min(cap.max(Duration::zero()))
    }

    /// Advance `clock` by one drawn step, saturating at the latest representable instant
    pub fn advance<R: Rng + ?Sized>(&self, clock: NaiveDateTime, rng: &mut R) -> NaiveDateTime {
        clock
            .checked_add_signed(self.next_step(rng))
            .unwrap_or(NaiveDateTime::MAX)
    }

    /// Whether the records are in non-decreasing timestamp order
    pub fn is_chronological(records: &[Record]) -> bool {
        records.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp)
    }
}

impl Default for TimeVariance {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_STEP_MS, DEFAULT_MAX_STEP_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SensorId;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn base_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_default_range() {
        assert_eq!(TimeVariance::default().range_ms(), (50, 1500));
    }

    #[test]
    fn test_reversed_range_is_ordered() {
        assert_eq!(TimeVariance::new(900, 100).range_ms(), (100, 900));
    }

    #[test]
    fn test_steps_within_range() {
        let variance = TimeVariance::default();
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..1000 {
            let step = variance.next_step(&mut rng);
            assert!(step >= Duration::milliseconds(50));
            assert!(step <= Duration::milliseconds(1500));
        }
    }

    #[test]
    fn test_zero_width_range() {
        let variance = TimeVariance::new(250, 250);
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(variance.next_step(&mut rng), Duration::milliseconds(250));
    }

    #[test]
    fn test_capped_step() {
        let variance = TimeVariance::default();
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..200 {
            let step = variance.capped_step(&mut rng, Duration::milliseconds(10));
            assert!(step <= Duration::milliseconds(10));
        }
        assert_eq!(
            variance.capped_step(&mut rng, Duration::milliseconds(-5)),
            Duration::zero()
        );
    }

    #[test]
    fn test_advance_is_forward_only() {
        let variance = TimeVariance::default();
        let mut rng = StdRng::seed_from_u64(4);
        let mut clock = base_time();
        let mut records = Vec::new();

        for _ in 0..100 {
            clock = variance.advance(clock, &mut rng);
            records.push(Record::new(SensorId::new(1), 1, 40.0, clock));
        }

        assert!(TimeVariance::is_chronological(&records));
        assert!(records[0].timestamp > base_time());
    }

    #[test]
    fn test_advance_saturates_at_max_instant() {
        let variance = TimeVariance::new(1_000, 1_000);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(
            variance.advance(NaiveDateTime::MAX, &mut rng),
            NaiveDateTime::MAX
        );
    }

    #[test]
    fn test_is_chronological_detects_regression() {
        let records = vec![
            Record::new(SensorId::new(1), 1, 40.0, base_time() + Duration::seconds(1)),
            Record::new(SensorId::new(1), 1, 40.0, base_time()),
        ];
        assert!(!TimeVariance::is_chronological(&records));
    }
}
