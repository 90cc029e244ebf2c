//! Sensor reading record and its wire representation

use crate::types::{SensorId, TimestampFormat};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One traffic reading from one sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Sensor that produced the reading
    pub sensor_id: SensorId,
    /// Vehicles counted in the sampling interval
    pub vehicle_count: u32,
    /// Peak speed, rounded to two decimals and never negative
    pub speed: f64,
    /// Synthetic time of the reading, millisecond precision
    pub timestamp: NaiveDateTime,
}

impl Record {
    /// Create a new record
    pub fn new(sensor_id: SensorId, vehicle_count: u32, speed: f64, timestamp: NaiveDateTime) -> Self {
        Self {
            sensor_id,
            vehicle_count,
            speed,
            timestamp,
        }
    }

    /// Render the record with the column names sinks write
    pub fn to_row(&self, format: TimestampFormat) -> RecordRow {
        RecordRow {
            pgmid: self.sensor_id.to_string(),
            vehicle_count: self.vehicle_count,
            peakspeed: self.speed,
            timestamp: self.timestamp.format(format.pattern()).to_string(),
        }
    }
}

/// Flat record layout shared by the CSV header, the JSON lines and the SQL columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRow {
    /// Sensor identifier (`PMGnnnnn`)
    pub pgmid: String,
    /// Vehicle count
    pub vehicle_count: u32,
    /// Peak speed
    pub peakspeed: f64,
    /// Formatted timestamp
    pub timestamp: String,
}

impl RecordRow {
    /// Column names in output order
    pub fn field_names() -> [&'static str; 4] {
        ["pgmid", "vehicle_count", "peakspeed", "timestamp"]
    }
}

/// Round a speed to two decimals, the precision sinks persist
pub fn round_speed(speed: f64) -> f64 {
    (speed * 100.0).round() / 100.0
}
