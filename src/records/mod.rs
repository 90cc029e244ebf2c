//! Sensor reading records and the synthesizers that produce them
//!
//! - **Record**: one reading (sensor, vehicle count, speed, timestamp)
//! - **RecordRow**: the flat `pgmid`/`vehicle_count`/`peakspeed`/`timestamp` layout sinks write
//! - **Synthesizer**: draws count and speed for a sensor at a point in time
//!
//! # Usage Example
//!
//! ```rust
//! use traffic_sensor_simulator::records::*;
//! use traffic_sensor_simulator::traffic::TrafficProfile;
//! use traffic_sensor_simulator::types::{RunConfig, SensorId};
//! use chrono::NaiveDate;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let config = RunConfig::default();
//! let synthesizer = build_synthesizer(&config).unwrap();
//! let profile = TrafficProfile::default();
//! let timestamp = NaiveDate::from_ymd_opt(2025, 10, 27).unwrap().and_hms_opt(8, 0, 0).unwrap();
//! let mut rng = StdRng::seed_from_u64(42);
//!
//! let record = synthesizer.synthesize(
//!     SensorId::new(88),
//!     timestamp,
//!     profile.classify(timestamp.time()),
//!     &mut rng,
//! );
//! assert_eq!(record.sensor_id.to_string(), "PMG00088");
//! ```

pub mod record;
pub mod synthesizer;

// Re-export all public types for convenience
pub use record::*;
pub use synthesizer::*;
