//! Tests for record synthesis across traffic periods

use chrono::{NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::SeedableRng;
use traffic_sensor_simulator::records::{
    build_synthesizer, BasicSynthesizer, Record, SamplingBaseline, Synthesizer,
    TimeDistributedSynthesizer, BASIC_MAX_SPEED,
};
use traffic_sensor_simulator::traffic::TrafficProfile;
use traffic_sensor_simulator::types::{GeneratorKind, RunConfig, SensorId, TrafficPeriod};

fn on_2025_10_27(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 10, 27)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn sample(synth: &dyn Synthesizer, hour: u32, n: usize, seed: u64) -> Vec<Record> {
    let profile = TrafficProfile::default();
    let timestamp = on_2025_10_27(hour);
    let spec = profile.classify(timestamp.time());
    let mut rng = StdRng::seed_from_u64(seed);

    (0..n)
        .map(|i| synth.synthesize(SensorId::new(i as u32 % 50 + 1), timestamp, spec, &mut rng))
        .collect()
}

fn mean_speed(records: &[Record]) -> f64 {
    records.iter().map(|r| r.speed).sum::<f64>() / records.len() as f64
}

fn mean_count(records: &[Record]) -> f64 {
    records.iter().map(|r| r.vehicle_count as f64).sum::<f64>() / records.len() as f64
}

#[test]
fn test_morning_rush_versus_overnight() {
    let profile = TrafficProfile::default();
    assert_eq!(profile.classify(on_2025_10_27(8).time()).period, TrafficPeriod::MorningRush);
    assert_eq!(profile.classify(on_2025_10_27(2).time()).period, TrafficPeriod::Overnight);

    let synth = TimeDistributedSynthesizer::new(SamplingBaseline::from_config(&RunConfig::default()));
    let morning = sample(&synth, 8, 1_000, 11);
    let overnight = sample(&synth, 2, 1_000, 12);

    // 40 * [0.60, 0.80] against 40 * [1.10, 1.20]
    assert!(mean_speed(&morning) < 34.0, "morning mean {}", mean_speed(&morning));
    assert!(mean_speed(&overnight) > 42.0, "overnight mean {}", mean_speed(&overnight));

    // 5 * [1.5, 2.0] against 5 * [0.3, 0.5]
    assert!(morning.iter().all(|r| (8..=10).contains(&r.vehicle_count)));
    assert!(overnight.iter().all(|r| (2..=3).contains(&r.vehicle_count)));
    assert!(mean_count(&morning) > 3.0 * mean_count(&overnight));
}

#[test]
fn test_values_are_never_negative() {
    let config = RunConfig {
        speed_mean: 1.0,
        speed_stddev: 20.0,
        ..RunConfig::default()
    };
    let synth = TimeDistributedSynthesizer::new(SamplingBaseline::from_config(&config));

    for hour in [2, 8, 12, 18] {
        for record in sample(&synth, hour, 500, hour as u64) {
            assert!(record.speed >= 0.0);
            assert_eq!(record.speed, (record.speed * 100.0).round() / 100.0);
        }
    }
}

#[test]
fn test_basic_synthesizer_ignores_time_of_day() {
    let synth = BasicSynthesizer::new(SamplingBaseline::from_config(&RunConfig::default())).unwrap();
    let morning = sample(&synth, 8, 1_000, 21);
    let overnight = sample(&synth, 2, 1_000, 22);

    for record in morning.iter().chain(overnight.iter()) {
        assert!((1..=5).contains(&record.vehicle_count));
        assert!(record.speed >= 0.0 && record.speed <= BASIC_MAX_SPEED);
    }
    assert!((mean_speed(&morning) - mean_speed(&overnight)).abs() < 1.5);
}

#[test]
fn test_build_synthesizer_follows_config() {
    let mut config = RunConfig::default();
    assert_eq!(build_synthesizer(&config).unwrap().kind(), GeneratorKind::TimeDistributed);

    config.generator = GeneratorKind::Basic;
    assert_eq!(build_synthesizer(&config).unwrap().kind(), GeneratorKind::Basic);
}

#[test]
fn test_same_seed_same_records() {
    let synth = TimeDistributedSynthesizer::new(SamplingBaseline::from_config(&RunConfig::default()));
    assert_eq!(sample(&synth, 17, 200, 99), sample(&synth, 17, 200, 99));
}
