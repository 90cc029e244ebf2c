//! Traffic Sensor Simulator
//!
//! Generates synthetic telemetry from a fleet of roadside traffic sensors and
//! persists it to CSV files, stdout or a MySQL table.
//!
//! # Overview
//!
//! Each record carries a sensor id, a vehicle count, a peak speed and a
//! millisecond timestamp. Records come in short bursts from one sensor at a
//! time, and their values follow the time of day: rush hours carry more
//! vehicles at lower speeds, overnight traffic is sparse and fast.
//!
//! ## Key Features
//!
//! - **Time-of-Day Profile**: four traffic periods with shares and multiplier ranges
//! - **Two Synthesizers**: time-distributed (period aware) and basic (flat baseline)
//! - **Burst Scheduling**: 2-5 records per sensor on a monotonically advancing clock
//! - **Full-Day Timeline**: period-weighted records spread over one or more days
//! - **Pluggable Sinks**: CSV, JSON lines, MySQL and a dry-run logger
//! - **Reproducible Runs**: one seeded RNG drives every random choice
//!
//! ## Quick Start
//!
//! ```rust
//! use traffic_sensor_simulator::*;
//! use traffic_sensor_simulator::sinks::JsonLinesSink;
//!
//! let config = RunConfig {
//!     record_count: Some(10),
//!     seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut sinks = SinkSet::new();
//! sinks.push(Box::new(JsonLinesSink::new(Vec::new(), config.timestamp_format())));
//!
//! let mut orchestrator = SimulationOrchestrator::new(config)?;
//! let stats = orchestrator.run(&mut sinks, &ShutdownFlag::new())?;
//! println!("{}", stats.compact_summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Identifiers, enums and run configuration
//! - [`traffic`]: Traffic periods and the time-of-day classifier
//! - [`records`]: The record type and the synthesizers
//! - [`sinks`]: Record destinations
//! - [`simulation`]: Scheduler, orchestrator, statistics and logging
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │   Traffic   │    │   Records   │
//! │             │    │             │    │             │
//! │ Identifiers │◄───┤ Profile     │◄───┤ Record      │
//! │ Enums       │    │ Classifier  │    │ Synthesizer │
//! │ Config      │    │             │    │             │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        ▲                                      ▲
//!        │                                      │
//! ┌─────────────┐                       ┌─────────────┐
//! │   Sinks     │                       │ Simulation  │
//! │             │◄──────────────────────┤             │
//! │ CSV / JSON  │                       │ Scheduler   │
//! │ MySQL       │                       │ Orchestrator│
//! └─────────────┘                       └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod records;
pub mod simulation;
pub mod sinks;
pub mod traffic;
pub mod types;

// Core types and configuration
pub use types::{
    CliArgs, ConfigError, ConfigValidationError, GeneratorKind, RunConfig, SensorId, SensorPool,
    TimelineMode, TimestampFormat, TrafficPeriod,
};

// Traffic profile
pub use traffic::{PeriodSpec, TimeWindow, TrafficProfile};

// Records
pub use records::{Record, RecordRow, Synthesizer};

// Sinks
pub use sinks::{RecordSink, SinkError, SinkSet};

// Simulation types and functionality
pub use simulation::{
    BurstScheduler, LoggingConfig, RunStatistics, ShutdownFlag, SimulationError,
    SimulationOrchestrator, StopReason, TimeManager,
};
