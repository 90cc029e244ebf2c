//! Simulation orchestration and control
//!
//! This module contains the burst scheduler, the run orchestrator, time
//! management, statistics collection, shutdown handling and error handling.
//!
//! # Overview
//!
//! - **BurstScheduler**: picks sensors and burst lengths and drives the synthetic clock
//! - **DayPlan**: period-weighted burst anchors for the full-day timeline
//! - **SimulationOrchestrator**: runs the scheduler into the sinks until a stop condition
//! - **TimeManager**: resolves the start instant and tracks wall-clock time
//! - **RunStatistics**: counts records, bursts, periods and sink outcomes
//! - **SimulationError**: run-level errors and the skip/abort policy
//!
//! # Usage Example
//!
//! ```rust
//! use traffic_sensor_simulator::simulation::*;
//! use traffic_sensor_simulator::sinks::{JsonLinesSink, SinkSet};
//! use traffic_sensor_simulator::types::*;
//!
//! let config = RunConfig {
//!     record_count: Some(12),
//!     seed: Some(7),
//!     output: OutputSettings { csv_write: false, ..Default::default() },
//!     ..Default::default()
//! };
//!
//! let mut sinks = SinkSet::new();
//! sinks.push(Box::new(JsonLinesSink::new(Vec::new(), config.timestamp_format())));
//!
//! let mut orchestrator = SimulationOrchestrator::new(config).unwrap();
//! let stats = orchestrator.run(&mut sinks, &ShutdownFlag::new()).unwrap();
//! assert_eq!(stats.records_generated, 12);
//! ```

pub mod day_plan;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod scheduler;
pub mod shutdown;
pub mod statistics;
pub mod time_manager;
pub mod time_variance;

// Re-export all public types for convenience
pub use day_plan::*;
pub use error::*;
pub use logging::*;
pub use orchestrator::*;
pub use scheduler::*;
pub use shutdown::*;
pub use statistics::*;
pub use time_manager::*;
pub use time_variance::*;
