//! Enumeration types for the traffic sensor simulator
//!
//! This module contains the traffic periods, the generator strategy and
//! timeline selectors, and the timestamp output format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named time-of-day windows with their own traffic regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficPeriod {
    /// Commute into town: dense, slow traffic
    MorningRush,
    /// Business hours and lunch
    BusinessLunch,
    /// Commute home
    EveningRush,
    /// Late evening through early morning: sparse, fast traffic
    Overnight,
}

impl TrafficPeriod {
    /// All periods in day order starting with the morning rush
    pub const ALL: [TrafficPeriod; 4] = [
        TrafficPeriod::MorningRush,
        TrafficPeriod::BusinessLunch,
        TrafficPeriod::EveningRush,
        TrafficPeriod::Overnight,
    ];

    /// Position of this period in [`TrafficPeriod::ALL`]
    pub fn index(self) -> usize {
        match self {
            TrafficPeriod::MorningRush => 0,
            TrafficPeriod::BusinessLunch => 1,
            TrafficPeriod::EveningRush => 2,
            TrafficPeriod::Overnight => 3,
        }
    }
}

impl fmt::Display for TrafficPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrafficPeriod::MorningRush => write!(f, "Morning Rush"),
            TrafficPeriod::BusinessLunch => write!(f, "Business/Lunch"),
            TrafficPeriod::EveningRush => write!(f, "Evening Rush"),
            TrafficPeriod::Overnight => write!(f, "Overnight"),
        }
    }
}

impl FromStr for TrafficPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', '/'], " ").as_str() {
            "morning rush" | "morning" => Ok(TrafficPeriod::MorningRush),
            "business lunch" | "business" | "lunch" => Ok(TrafficPeriod::BusinessLunch),
            "evening rush" | "evening" => Ok(TrafficPeriod::EveningRush),
            "overnight" | "night" => Ok(TrafficPeriod::Overnight),
            _ => Err(format!("Unknown traffic period: {}", s)),
        }
    }
}

/// Which record synthesizer a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GeneratorKind {
    /// Flat distribution independent of the time of day
    Basic,
    /// Period-aware speeds and vehicle counts
    TimeDistributed,
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorKind::Basic => write!(f, "basic"),
            GeneratorKind::TimeDistributed => write!(f, "time-distributed"),
        }
    }
}

/// How the synthetic clock moves across a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TimelineMode {
    /// Start at the run start instant and step forward with small jitter
    Sequential,
    /// Spread records over whole days according to the period shares
    FullDay,
}

impl fmt::Display for TimelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineMode::Sequential => write!(f, "sequential"),
            TimelineMode::FullDay => write!(f, "full-day"),
        }
    }
}

/// Rendering of record timestamps in sink output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// `HH:MM:SS.mmm`
    TimeOnly,
    /// `YYYY-MM-DD HH:MM:SS.mmm`
    DateTime,
}

impl TimestampFormat {
    /// chrono format string for this rendering
    pub fn pattern(self) -> &'static str {
        match self {
            TimestampFormat::TimeOnly => "%H:%M:%S%.3f",
            TimestampFormat::DateTime => "%Y-%m-%d %H:%M:%S%.3f",
        }
    }
}

impl fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampFormat::TimeOnly => write!(f, "HH:MM:SS.mmm"),
            TimestampFormat::DateTime => write!(f, "YYYY-MM-DD HH:MM:SS.mmm"),
        }
    }
}
