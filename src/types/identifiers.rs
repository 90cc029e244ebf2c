//! Sensor identifier types for the traffic sensor simulator
//!
//! Sensors are drawn from a fixed pool of numbered identifiers. The identifiers
//! carry no state of their own; they only group readings into bursts.

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of sensors in the default pool
pub const DEFAULT_SENSOR_COUNT: u32 = 10_000;

/// Upper bound for a configured pool size
pub const MAX_SENSOR_COUNT: u32 = 10_000;

const SENSOR_PREFIX: &str = "PMG";

/// Identifier of a simulated roadside sensor (`PMG00001` .. `PMG10000`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SensorId(u32);

impl SensorId {
    /// Create a sensor identifier from its 1-based pool number
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    /// The 1-based pool number of this sensor
    pub fn number(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:05}", SENSOR_PREFIX, self.0)
    }
}

impl FromStr for SensorId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(SENSOR_PREFIX)
            .ok_or_else(|| format!("Sensor id must start with {}: {}", SENSOR_PREFIX, s))?;
        digits
            .parse::<u32>()
            .map(SensorId)
            .map_err(|e| format!("Invalid sensor number in {}: {}", s, e))
    }
}

impl Serialize for SensorId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SensorId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The fixed pool sensors are drawn from, with replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorPool {
    size: u32,
}

impl SensorPool {
    /// Create a pool of `size` sensors numbered from 1
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    /// Number of sensors in the pool
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Pick a sensor uniformly at random
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> SensorId {
        SensorId(rng.gen_range(1..=self.size))
    }

    /// Whether `id` belongs to this pool
    pub fn contains(&self, id: SensorId) -> bool {
        (1..=self.size).contains(&id.0)
    }
}

impl Default for SensorPool {
    fn default() -> Self {
        Self::new(DEFAULT_SENSOR_COUNT)
    }
}
