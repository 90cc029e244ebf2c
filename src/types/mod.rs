//! Core types and configuration for the traffic sensor simulator
//!
//! # Overview
//!
//! - **Identifiers**: sensor identifiers and the pool they are drawn from
//! - **Enums**: traffic periods, generator and timeline selectors, timestamp formats
//! - **Configuration**: run configuration with validation and CLI/environment support
//!
//! # Usage Example
//!
//! ```rust
//! use traffic_sensor_simulator::types::*;
//!
//! let config = RunConfig {
//!     record_count: Some(500),
//!     seed: Some(7),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! assert_eq!(SensorId::new(42).to_string(), "PMG00042");
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
