//! Full-day burst planning
//!
//! Spreads a fixed number of records over whole calendar days so that each
//! traffic period receives its share of the volume. Every burst gets an
//! anchor instant; anchors are sorted before emission and each burst is
//! confined to `[anchor, bound)`, where `bound` is the earliest of the next
//! anchor, the end of the anchor's period and the end of the anchor's day.
//!
//! Record counts per period follow fixed quotas; each burst samples its
//! period by share among the periods still short of their quota.

use crate::traffic::TrafficProfile;
use chrono::{Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::Rng;
use std::collections::VecDeque;
use tracing::debug;

use super::scheduler::{MAX_BURST_LENGTH, MIN_BURST_LENGTH};

/// One pre-planned burst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedBurst {
    /// Records in the burst
    pub length: u8,
    /// Timestamp of the first record
    pub anchor: NaiveDateTime,
    /// Every record of the burst is strictly before this instant, unless the
    /// burst shares its anchor with the next one
    pub bound: NaiveDateTime,
}

impl PlannedBurst {
    /// Largest step between consecutive records that keeps the burst inside its bound
    pub fn step_cap(&self) -> Duration {
        let span_ms = (self.bound - self.anchor).num_milliseconds().max(0);
        Duration::milliseconds(span_ms / i64::from(self.length.max(1)))
    }
}

/// Chronologically ordered bursts for a full-day run
#[derive(Debug, Clone, Default)]
pub struct DayPlan {
    bursts: VecDeque<PlannedBurst>,
}

impl DayPlan {
    /// Plan `record_count` records over `days` days starting at `first_day`
    pub fn build<R: Rng + ?Sized>(
        profile: &TrafficProfile,
        first_day: NaiveDate,
        days: u32,
        record_count: u64,
        rng: &mut R,
    ) -> Self {
        let lengths = draw_burst_lengths(record_count, rng);
        let days = days.max(1);

        // Records each period still owes against its quota
        let mut deficit: [i64; 4] = record_quotas(profile, record_count)
            .map(|quota| i64::try_from(quota).unwrap_or(i64::MAX));

        let mut anchors: Vec<NaiveDateTime> = lengths
            .iter()
            .map(|&length| {
                let spec = profile
                    .sample_period_among(rng, |spec| deficit[spec.period.index()] > 0)
                    .unwrap_or_else(|| profile.sample_period(rng));
                deficit[spec.period.index()] -= i64::from(length);

                let day_offset = rng.gen_range(0..days);
                let date = first_day
                    .checked_add_days(Days::new(u64::from(day_offset)))
                    .unwrap_or(first_day);
                spec.window.sample_on(date, rng)
            })
            .collect();
        anchors.sort();

        let bursts: VecDeque<PlannedBurst> = anchors
            .iter()
            .zip(&lengths)
            .enumerate()
            .map(|(i, (&anchor, &length))| {
                let period_end = profile.classify(anchor.time()).window.end_after(anchor);
                let day_end = anchor
                    .date()
                    .and_time(NaiveTime::MIN)
                    .checked_add_signed(Duration::days(1))
                    .unwrap_or(NaiveDateTime::MAX);
                let mut bound = period_end.min(day_end);
                if let Some(&next) = anchors.get(i + 1) {
                    bound = bound.min(next);
                }
                PlannedBurst { length, anchor, bound }
            })
            .collect();

        debug!(
            "Planned {} bursts for {} records over {} day(s) from {}",
            bursts.len(),
            record_count,
            days,
            first_day
        );

        Self { bursts }
    }

    /// Remaining bursts in emission order
    pub fn bursts(&self) -> impl Iterator<Item = &PlannedBurst> {
        self.bursts.iter()
    }

    /// Number of remaining bursts
    pub fn len(&self) -> usize {
        self.bursts.len()
    }

    /// Whether every burst has been taken
    pub fn is_empty(&self) -> bool {
        self.bursts.is_empty()
    }

    /// Records still planned
    pub fn total_records(&self) -> u64 {
        self.bursts.iter().map(|burst| u64::from(burst.length)).sum()
    }

    /// Take the next burst
    pub fn pop_next(&mut self) -> Option<PlannedBurst> {
        self.bursts.pop_front()
    }
}

/// Split `record_count` across the periods by share, indexed by [`TrafficPeriod::index`]
///
/// Largest remainder: every period gets the floor of its exact quota and the
/// leftover records go to the largest fractional parts.
///
/// [`TrafficPeriod::index`]: crate::types::TrafficPeriod::index
pub fn record_quotas(profile: &TrafficProfile, record_count: u64) -> [u64; 4] {
    let total_share: f64 = profile.periods().iter().map(|spec| spec.share).sum();
    let mut quotas = [0u64; 4];
    let mut remainders: Vec<(usize, f64)> = Vec::with_capacity(4);

    if total_share <= 0.0 {
        quotas[0] = record_count;
        return quotas;
    }

    for spec in profile.periods() {
        let exact = spec.share / total_share * record_count as f64;
        let floor = exact.floor();
        quotas[spec.period.index()] = floor as u64;
        remainders.push((spec.period.index(), exact - floor));
    }

    remainders.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    let assigned: u64 = quotas.iter().sum();
    let mut leftover = record_count.saturating_sub(assigned);
    for &(index, _) in remainders.iter().cycle() {
        if leftover == 0 {
            break;
        }
        quotas[index] += 1;
        leftover -= 1;
    }

    quotas
}

/// Draw burst lengths until they cover `record_count`, truncating the last one
pub fn draw_burst_lengths<R: Rng + ?Sized>(record_count: u64, rng: &mut R) -> Vec<u8> {
    let mut lengths = Vec::new();
    let mut total = 0u64;

    while total < record_count {
        let drawn = rng.gen_range(MIN_BURST_LENGTH..=MAX_BURST_LENGTH);
        let left = record_count - total;
        let length = if u64::from(drawn) > left { left as u8 } else { drawn };
        lengths.push(length);
        total += u64::from(length);
    }

    lengths
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 27).unwrap()
    }

    #[test]
    fn test_burst_lengths_cover_target_exactly() {
        let mut rng = StdRng::seed_from_u64(1);
        for target in [0u64, 1, 2, 7, 10, 1000] {
            let lengths = draw_burst_lengths(target, &mut rng);
            let total: u64 = lengths.iter().map(|&l| u64::from(l)).sum();
            assert_eq!(total, target);

            if let Some((last, rest)) = lengths.split_last() {
                assert!(rest.iter().all(|l| (MIN_BURST_LENGTH..=MAX_BURST_LENGTH).contains(l)));
                assert!(*last >= 1 && *last <= MAX_BURST_LENGTH);
            }
        }
    }

    #[test]
    fn test_plan_is_sorted_and_bounded() {
        let profile = TrafficProfile::default();
        let mut rng = StdRng::seed_from_u64(7);
        let plan = DayPlan::build(&profile, day(), 2, 3000, &mut rng);

        assert_eq!(plan.total_records(), 3000);

        let bursts: Vec<_> = plan.bursts().copied().collect();
        for pair in bursts.windows(2) {
            assert!(pair[0].anchor <= pair[1].anchor);
            assert!(pair[0].bound <= pair[1].anchor);
        }
        for burst in &bursts {
            assert!(burst.anchor <= burst.bound);
            assert!(burst.anchor.date() >= day());
            assert!(burst.anchor.date() <= day() + Duration::days(1));
            // Bound never crosses into the next period
            let period = profile.classify(burst.anchor.time());
            assert!(burst.bound <= period.window.end_after(burst.anchor));
        }
    }

    #[test]
    fn test_step_cap_keeps_burst_inside_bound() {
        let anchor = day().and_hms_opt(9, 59, 59).unwrap();
        let burst = PlannedBurst {
            length: 4,
            anchor,
            bound: day().and_hms_opt(10, 0, 0).unwrap(),
        };
        assert_eq!(burst.step_cap(), Duration::milliseconds(250));
        assert!(anchor + burst.step_cap() * 3 < burst.bound);
    }

    #[test]
    fn test_pop_next_drains_in_order() {
        let profile = TrafficProfile::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut plan = DayPlan::build(&profile, day(), 1, 20, &mut rng);

        let mut previous = None;
        while let Some(burst) = plan.pop_next() {
            if let Some(prev) = previous {
                assert!(prev <= burst.anchor);
            }
            previous = Some(burst.anchor);
        }
        assert!(plan.is_empty());
    }

    #[test]
    fn test_record_quotas_largest_remainder() {
        let profile = TrafficProfile::default();
        assert_eq!(record_quotas(&profile, 5_000), [2_500, 1_500, 750, 250]);
        // 0.5, 0.3, 0.15, 0.05 of 7: remainders .5, .1, .05, .35
        assert_eq!(record_quotas(&profile, 7), [4, 2, 1, 0]);
        for count in [1u64, 3, 99, 12_345] {
            assert_eq!(record_quotas(&profile, count).iter().sum::<u64>(), count);
        }
    }

    #[test]
    fn test_plan_period_totals_track_quotas() {
        let profile = TrafficProfile::default();
        let quotas = record_quotas(&profile, 5_000);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = DayPlan::build(&profile, day(), 1, 5_000, &mut rng);

            let mut totals = [0u64; 4];
            for burst in plan.bursts() {
                totals[profile.classify(burst.anchor.time()).period.index()] += u64::from(burst.length);
            }
            for (total, quota) in totals.iter().zip(quotas) {
                // Overshoot is at most one burst per period
                assert!(total.abs_diff(quota) <= 4 * u64::from(MAX_BURST_LENGTH), "seed {}", seed);
            }
        }
    }

    #[test]
    fn test_plan_survives_out_of_range_days() {
        let profile = TrafficProfile::default();
        let mut rng = StdRng::seed_from_u64(9);
        let plan = DayPlan::build(&profile, NaiveDate::MAX, u32::MAX, 50, &mut rng);
        assert_eq!(plan.total_records(), 50);
    }
}
