//! Time-of-day traffic model
//!
//! Maps a clock time to one of the four [`TrafficPeriod`](crate::types::TrafficPeriod)s
//! and exposes the sampling parameters that apply there.

pub mod profile;

pub use profile::{
    millis_of_day, MultiplierRange, PeriodSpec, ProfileError, TimeWindow, TrafficProfile,
    MILLIS_PER_DAY,
};
