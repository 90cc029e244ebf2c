//! Configuration structures for the traffic sensor simulator
//!
//! This module contains the run configuration, its command line and file
//! sources, and the validation applied before a run starts.

use super::{GeneratorKind, TimelineMode, TimestampFormat, MAX_SENSOR_COUNT};
use crate::traffic::{ProfileError, TrafficProfile};
use chrono::{NaiveDate, NaiveTime};
use clap::builder::BoolishValueParser;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default location of the CSV output file
pub const DEFAULT_CSV_PATH: &str = "data/sensor_readings.csv";

/// Default database name
pub const DEFAULT_DB_NAME: &str = "capstone_db";

/// Default MySQL port
pub const DEFAULT_DB_PORT: u16 = 3306;

/// Longest run in calendar days
pub const MAX_DAYS: u32 = 3_660;

/// Longest wall-clock duration in seconds (365 days)
pub const MAX_DURATION_SECS: f64 = 31_536_000.0;

/// Longest simulated span in seconds ([`MAX_DAYS`] days)
pub const MAX_SIMULATED_SPAN_SECS: u64 = MAX_DAYS as u64 * 86_400;

/// Slowest paced rate in records per second
pub const MIN_RATE: f64 = 0.001;

/// Fastest paced rate in records per second
pub const MAX_RATE: f64 = 1_000_000.0;

/// Longest gap between progress lines in seconds
pub const MAX_PROGRESS_INTERVAL_SECS: f64 = 86_400.0;

/// Largest clock step in milliseconds
pub const MAX_JITTER_MS: u64 = 3_600_000;

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "traffic-sensor-simulator",
    version,
    about = "Traffic Sensor Simulator - Generates time-of-day aware vehicle count and speed readings",
    long_about = "Generates traffic sensor readings in short per-sensor bursts. Vehicle counts and speeds follow a four-period daily traffic profile (morning rush, business/lunch, evening rush, overnight) and every record is handed to the enabled sinks: a CSV file, JSON lines on stdout, and a MySQL table.

EXAMPLES:
    # Generate the default 100 records into data/sensor_readings.csv
    traffic-sensor-simulator

    # Stream readings for 10 minutes at 20 records per second
    traffic-sensor-simulator --duration 600 --rate 20

    # Reproducible full-day dataset for a fixed date
    traffic-sensor-simulator --records 20000 --timeline full-day --date 2025-10-27 --seed 42

    # Write to MySQL as well as CSV
    DB_WRITE=true DB_HOST=localhost DB_USER=sim traffic-sensor-simulator

    # Generate configuration template
    traffic-sensor-simulator --print-config > my-config.json

    # Validate configuration without running
    traffic-sensor-simulator --config my-config.json --dry-run

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments and environment variables (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)

    Use --print-config to generate a template configuration file."
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments and environment variables override file settings."
    )]
    pub config: Option<String>,

    /// Number of records to generate
    #[arg(
        short = 'n',
        long,
        env = "NUM_RECORDS",
        help = "Number of records to generate",
        long_help = "Total number of records to generate. Must be greater than 0. Default: 100. When --duration is given without --records the run is bounded by time only."
    )]
    pub records: Option<u64>,

    /// Wall-clock run duration in seconds
    #[arg(
        long,
        help = "Run for this many seconds of wall-clock time",
        long_help = "Stop generating once this many seconds of wall-clock time have elapsed. The record in flight is finished first."
    )]
    pub duration: Option<f64>,

    /// Synthetic time budget in seconds
    #[arg(
        long,
        help = "Stop once the synthetic clock has advanced this many seconds",
        long_help = "Bound the sequential timeline by simulated time instead of record count: generation stops once the synthetic clock passes start + this many seconds."
    )]
    pub simulated_span: Option<u64>,

    /// Records per second (0 = unlimited)
    #[arg(
        long,
        env = "RECORDS_PER_SECOND",
        help = "Target records per second (0 = unlimited)"
    )]
    pub rate: Option<f64>,

    /// Progress log interval in seconds
    #[arg(long, help = "Seconds between progress log lines")]
    pub progress: Option<f64>,

    /// Baseline mean speed
    #[arg(long, env = "PEAKSPEED_MEAN", help = "Baseline mean peak speed")]
    pub speed_mean: Option<f64>,

    /// Baseline speed standard deviation
    #[arg(long, env = "PEAKSPEED_STD", help = "Standard deviation of peak speed")]
    pub speed_stddev: Option<f64>,

    /// Baseline vehicle count
    #[arg(long, help = "Baseline vehicle count scaled by the period multiplier")]
    pub base_vehicle_count: Option<u32>,

    /// Sensor pool size
    #[arg(
        long,
        help = "Number of sensors in the pool (1-10000)",
        long_help = "Number of sensors PMG00001..PMGnnnnn in the pool that bursts are drawn from. Range: 1-10000. Default: 10000"
    )]
    pub sensor_count: Option<u32>,

    /// Minimum clock jitter between records in milliseconds
    #[arg(long, help = "Minimum clock step between records (ms)")]
    pub jitter_min_ms: Option<u64>,

    /// Maximum clock jitter between records in milliseconds
    #[arg(long, help = "Maximum clock step between records (ms)")]
    pub jitter_max_ms: Option<u64>,

    /// Date of the simulated day
    #[arg(
        long,
        help = "Simulated date (YYYY-MM-DD)",
        long_help = "Calendar date the synthetic clock starts on. Defaults to today (UTC)."
    )]
    pub date: Option<NaiveDate>,

    /// Start time of the synthetic clock
    #[arg(
        long,
        help = "Simulated start time (HH:MM:SS)",
        long_help = "Time of day the sequential timeline starts at. Defaults to the current time (UTC) when no date is given, and to midnight otherwise."
    )]
    pub start_time: Option<NaiveTime>,

    /// Number of days to simulate
    #[arg(
        long,
        help = "Number of days to simulate",
        long_help = "Number of calendar days the full-day timeline spreads records over. Must be greater than 0. Default: 1"
    )]
    pub days: Option<u32>,

    /// Random seed for reproducible results
    #[arg(long, help = "Random seed for reproducible results")]
    pub seed: Option<u64>,

    /// Record synthesizer
    #[arg(long, value_enum, help = "Record generator strategy")]
    pub generator: Option<GeneratorKind>,

    /// Timeline mode
    #[arg(long, value_enum, help = "How the synthetic clock moves across the run")]
    pub timeline: Option<TimelineMode>,

    /// Always render the date in timestamps
    #[arg(long, help = "Render timestamps as YYYY-MM-DD HH:MM:SS.mmm")]
    pub full_timestamps: bool,

    /// Also write JSON lines to stdout
    #[arg(long, help = "Write each record as a JSON line to stdout")]
    pub stdout: bool,

    /// Abort the run on the first sink failure
    #[arg(long, help = "Stop the run when any sink fails to write a record")]
    pub stop_on_error: bool,

    /// Enable the CSV sink
    #[arg(long, env = "CSV_WRITE", value_parser = BoolishValueParser::new(), help = "Append records to the CSV file (true/false)")]
    pub csv_write: Option<bool>,

    /// CSV output path
    #[arg(long, env = "CSV_PATH", help = "CSV output file path")]
    pub csv_path: Option<String>,

    /// Enable the database sink
    #[arg(
        long,
        env = "DB_WRITE",
        value_parser = BoolishValueParser::new(),
        help = "Insert records into MySQL (true/false)",
        long_help = "Insert every record into the sensor_readings table. When false the records that would be inserted are logged at INFO level instead."
    )]
    pub db_write: Option<bool>,

    /// Database host
    #[arg(long, env = "DB_HOST", help = "MySQL host")]
    pub db_host: Option<String>,

    /// Database port
    #[arg(long, env = "DB_PORT", help = "MySQL port")]
    pub db_port: Option<u16>,

    /// Database user
    #[arg(long, env = "DB_USER", help = "MySQL user")]
    pub db_user: Option<String>,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true, help = "MySQL password")]
    pub db_password: Option<String>,

    /// Database name
    #[arg(long, env = "DB_NAME", help = "MySQL database name")]
    pub db_name: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Emit logs as JSON
    #[arg(long, help = "Emit log lines as JSON")]
    pub log_json: bool,

    /// Directory for daily rolling log files
    #[arg(long, help = "Also write logs to daily rolling files in this directory")]
    pub log_dir: Option<String>,

    /// Dry run mode - validate configuration without running simulation
    #[arg(long, help = "Validate configuration without generating records")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// File and stdout sink settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Append records to `csv_path`
    pub csv_write: bool,
    /// CSV file location
    pub csv_path: String,
    /// Write JSON lines to stdout
    pub stdout: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            csv_write: true,
            csv_path: DEFAULT_CSV_PATH.to_string(),
            stdout: false,
        }
    }
}

/// MySQL sink settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Insert records; when false the records are only logged
    pub write: bool,
    /// Server host
    pub host: Option<String>,
    /// Server port
    pub port: u16,
    /// Login user
    pub user: Option<String>,
    /// Login password, never serialized back out
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Database name
    pub name: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            write: false,
            host: None,
            port: DEFAULT_DB_PORT,
            user: None,
            password: None,
            name: DEFAULT_DB_NAME.to_string(),
        }
    }
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Number of records to generate
    pub record_count: Option<u64>,
    /// Wall-clock run duration in seconds
    pub duration_secs: Option<f64>,
    /// Synthetic time budget in seconds
    pub simulated_span_secs: Option<u64>,
    /// Records per second (0 = unlimited)
    pub rate: Option<f64>,
    /// Progress log interval in seconds
    pub progress_interval_secs: Option<f64>,
    /// Baseline mean speed
    pub speed_mean: Option<f64>,
    /// Baseline speed standard deviation
    pub speed_stddev: Option<f64>,
    /// Baseline vehicle count
    pub base_vehicle_count: Option<u32>,
    /// Sensor pool size
    pub sensor_count: Option<u32>,
    /// Minimum clock step in milliseconds
    pub jitter_min_ms: Option<u64>,
    /// Maximum clock step in milliseconds
    pub jitter_max_ms: Option<u64>,
    /// Simulated date
    pub date: Option<NaiveDate>,
    /// Simulated start time
    pub start_time: Option<NaiveTime>,
    /// Number of days to simulate
    pub days: Option<u32>,
    /// Random seed
    pub seed: Option<u64>,
    /// Record synthesizer
    pub generator: Option<GeneratorKind>,
    /// Timeline mode
    pub timeline: Option<TimelineMode>,
    /// Always render the date in timestamps
    pub full_timestamps: Option<bool>,
    /// Abort on first sink failure
    pub stop_on_error: Option<bool>,
    /// File and stdout sinks
    pub output: Option<OutputSettings>,
    /// MySQL sink
    pub database: Option<DatabaseSettings>,
    /// Period table override
    pub profile: Option<TrafficProfile>,
}

/// Configuration for a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of records to generate; `None` for a time-bounded run
    pub record_count: Option<u64>,

    /// Wall-clock run duration in seconds
    pub duration_secs: Option<f64>,

    /// Stop once the sequential clock passes start + this many seconds
    pub simulated_span_secs: Option<u64>,

    /// Records per second, 0 for unlimited
    pub rate: f64,

    /// Seconds between progress log lines
    pub progress_interval_secs: f64,

    /// Baseline mean speed
    pub speed_mean: f64,

    /// Baseline speed standard deviation
    pub speed_stddev: f64,

    /// Baseline vehicle count
    pub base_vehicle_count: u32,

    /// Number of sensors in the pool
    pub sensor_count: u32,

    /// Minimum clock step between records in milliseconds
    pub jitter_min_ms: u64,

    /// Maximum clock step between records in milliseconds
    pub jitter_max_ms: u64,

    /// Simulated date, today when unset
    pub date: Option<NaiveDate>,

    /// Simulated start time
    pub start_time: Option<NaiveTime>,

    /// Number of calendar days for the full-day timeline
    pub days: u32,

    /// Random seed for reproducible results
    pub seed: Option<u64>,

    /// Record synthesizer
    pub generator: GeneratorKind,

    /// Timeline mode
    pub timeline: TimelineMode,

    /// Always render the date in timestamps
    pub full_timestamps: bool,

    /// Abort the run on the first sink failure
    pub stop_on_error: bool,

    /// File and stdout sinks
    pub output: OutputSettings,

    /// MySQL sink
    pub database: DatabaseSettings,

    /// Period table
    pub profile: TrafficProfile,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for run configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// Record count is zero
    #[error("Record count must be greater than 0, got {0}")]
    InvalidRecordCount(u64),

    /// Neither a record count, a duration nor a simulated span bounds the run
    #[error("A run needs a record count, a duration or a simulated span")]
    UnboundedRun,

    /// Duration is not a positive number
    #[error("Duration must be greater than 0 seconds, got {0}")]
    InvalidDuration(f64),

    /// Duration is longer than the supported maximum
    #[error("Duration must be at most {max} seconds, got {value}")]
    DurationTooLong {
        /// The invalid value
        value: f64,
        /// Longest allowed duration
        max: f64,
    },

    /// Simulated span is zero
    #[error("Simulated span must be greater than 0 seconds")]
    InvalidSimulatedSpan,

    /// Simulated span is longer than the supported maximum
    #[error("Simulated span must be at most {max} seconds, got {value}")]
    SimulatedSpanTooLong {
        /// The invalid value
        value: u64,
        /// Longest allowed span
        max: u64,
    },

    /// Rate is negative or not a number
    #[error("Rate must be 0 (unlimited) or positive, got {0}")]
    InvalidRate(f64),

    /// Rate is positive but outside the pacing range
    #[error("Rate must be 0 (unlimited) or between {min} and {max} records/s, got {value}")]
    RateOutOfRange {
        /// The invalid value
        value: f64,
        /// Slowest allowed rate
        min: f64,
        /// Fastest allowed rate
        max: f64,
    },

    /// Progress interval is not a positive number
    #[error("Progress interval must be greater than 0 seconds, got {0}")]
    InvalidProgressInterval(f64),

    /// Progress interval is longer than the supported maximum
    #[error("Progress interval must be at most {max} seconds, got {value}")]
    ProgressIntervalTooLong {
        /// The invalid value
        value: f64,
        /// Longest allowed interval
        max: f64,
    },

    /// Speed parameter is not a positive number
    #[error("Invalid {field}: {value} (must be greater than 0)")]
    InvalidSpeed {
        /// Name of the offending field
        field: &'static str,
        /// The invalid value
        value: f64,
    },

    /// Base vehicle count is zero
    #[error("Base vehicle count must be greater than 0")]
    InvalidBaseVehicleCount,

    /// Sensor pool size out of range
    #[error("Sensor count must be between 1 and {max}, got {value}")]
    InvalidSensorCount {
        /// The invalid value
        value: u32,
        /// Largest allowed pool
        max: u32,
    },

    /// Jitter range is reversed
    #[error("Invalid jitter range: min ({0} ms) must be <= max ({1} ms)")]
    InvalidJitterRange(u64, u64),

    /// Largest jitter step exceeds the supported maximum
    #[error("Jitter max must be at most {max} ms, got {value}")]
    JitterTooLarge {
        /// The invalid value
        value: u64,
        /// Largest allowed step
        max: u64,
    },

    /// Days count is zero
    #[error("Days count must be greater than 0, got {0}")]
    InvalidDaysCount(u32),

    /// Days count exceeds the supported maximum
    #[error("Days count must be at most {max}, got {value}")]
    TooManyDays {
        /// The invalid value
        value: u32,
        /// Largest allowed count
        max: u32,
    },

    /// Full-day timeline without a record count
    #[error("The full-day timeline needs a record count")]
    FullDayWithoutRecordCount,

    /// Database writes enabled without connection details
    #[error("Database writes are enabled but {0} is not set")]
    MissingDatabaseSetting(&'static str),

    /// CSV writes enabled without a path
    #[error("CSV writes are enabled but the CSV path is empty")]
    EmptyCsvPath,

    /// Period table is not a valid partition of the day
    #[error("Invalid traffic profile: {0}")]
    InvalidProfile(#[from] ProfileError),
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            record_count: Some(100),
            duration_secs: None,
            simulated_span_secs: None,
            rate: 0.0,
            progress_interval_secs: 5.0,
            speed_mean: 40.0,
            speed_stddev: 5.0,
            base_vehicle_count: 5,
            sensor_count: super::DEFAULT_SENSOR_COUNT,
            jitter_min_ms: 50,
            jitter_max_ms: 1500,
            date: None,
            start_time: None,
            days: 1,
            seed: None,
            generator: GeneratorKind::TimeDistributed,
            timeline: TimelineMode::Sequential,
            full_timestamps: false,
            stop_on_error: false,
            output: OutputSettings::default(),
            database: DatabaseSettings::default(),
            profile: TrafficProfile::default(),
        }
    }
}

impl RunConfig {
    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI and environment take precedence over the file
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(file: ConfigFile) -> Self {
        let defaults = Self::default();

        // A file that only bounds the run by time drops the default record count
        let time_bounded = file.duration_secs.is_some() || file.simulated_span_secs.is_some();
        let record_count = match (file.record_count, time_bounded) {
            (Some(count), _) => Some(count),
            (None, true) => None,
            (None, false) => defaults.record_count,
        };

        Self {
            record_count,
            duration_secs: file.duration_secs.or(defaults.duration_secs),
            simulated_span_secs: file.simulated_span_secs.or(defaults.simulated_span_secs),
            rate: file.rate.unwrap_or(defaults.rate),
            progress_interval_secs: file
                .progress_interval_secs
                .unwrap_or(defaults.progress_interval_secs),
            speed_mean: file.speed_mean.unwrap_or(defaults.speed_mean),
            speed_stddev: file.speed_stddev.unwrap_or(defaults.speed_stddev),
            base_vehicle_count: file.base_vehicle_count.unwrap_or(defaults.base_vehicle_count),
            sensor_count: file.sensor_count.unwrap_or(defaults.sensor_count),
            jitter_min_ms: file.jitter_min_ms.unwrap_or(defaults.jitter_min_ms),
            jitter_max_ms: file.jitter_max_ms.unwrap_or(defaults.jitter_max_ms),
            date: file.date.or(defaults.date),
            start_time: file.start_time.or(defaults.start_time),
            days: file.days.unwrap_or(defaults.days),
            seed: file.seed.or(defaults.seed),
            generator: file.generator.unwrap_or(defaults.generator),
            timeline: file.timeline.unwrap_or(defaults.timeline),
            full_timestamps: file.full_timestamps.unwrap_or(defaults.full_timestamps),
            stop_on_error: file.stop_on_error.unwrap_or(defaults.stop_on_error),
            output: file.output.unwrap_or(defaults.output),
            database: file.database.unwrap_or(defaults.database),
            profile: file.profile.unwrap_or(defaults.profile),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        match (args.records, args.duration.is_some() || args.simulated_span.is_some()) {
            (Some(value), _) => config.record_count = Some(value),
            // --duration alone means run until the clock says stop
            (None, true) => config.record_count = None,
            (None, false) => {}
        }
        if let Some(value) = args.duration {
            config.duration_secs = Some(value);
        }
        if let Some(value) = args.simulated_span {
            config.simulated_span_secs = Some(value);
        }
        if let Some(value) = args.rate {
            config.rate = value;
        }
        if let Some(value) = args.progress {
            config.progress_interval_secs = value;
        }
        if let Some(value) = args.speed_mean {
            config.speed_mean = value;
        }
        if let Some(value) = args.speed_stddev {
            config.speed_stddev = value;
        }
        if let Some(value) = args.base_vehicle_count {
            config.base_vehicle_count = value;
        }
        if let Some(value) = args.sensor_count {
            config.sensor_count = value;
        }
        if let Some(value) = args.jitter_min_ms {
            config.jitter_min_ms = value;
        }
        if let Some(value) = args.jitter_max_ms {
            config.jitter_max_ms = value;
        }
        if let Some(value) = args.date {
            config.date = Some(value);
        }
        if let Some(value) = args.start_time {
            config.start_time = Some(value);
        }
        if let Some(value) = args.days {
            config.days = value;
        }
        if let Some(value) = args.seed {
            config.seed = Some(value);
        }
        if let Some(value) = args.generator {
            config.generator = value;
        }
        if let Some(value) = args.timeline {
            config.timeline = value;
        }

        // Flags only ever switch these on
        config.full_timestamps |= args.full_timestamps;
        config.stop_on_error |= args.stop_on_error;
        config.output.stdout |= args.stdout;

        if let Some(value) = args.csv_write {
            config.output.csv_write = value;
        }
        if let Some(value) = args.csv_path {
            config.output.csv_path = value;
        }
        if let Some(value) = args.db_write {
            config.database.write = value;
        }
        if let Some(value) = args.db_host {
            config.database.host = Some(value);
        }
        if let Some(value) = args.db_port {
            config.database.port = value;
        }
        if let Some(value) = args.db_user {
            config.database.user = Some(value);
        }
        if let Some(value) = args.db_password {
            config.database.password = Some(value);
        }
        if let Some(value) = args.db_name {
            config.database.name = value;
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if let Some(count) = self.record_count {
            if count == 0 {
                return Err(ConfigValidationError::InvalidRecordCount(count));
            }
        }

        if let Some(duration) = self.duration_secs {
            if !(duration.is_finite() && duration > 0.0) {
                return Err(ConfigValidationError::InvalidDuration(duration));
            }
            if duration > MAX_DURATION_SECS {
                return Err(ConfigValidationError::DurationTooLong {
                    value: duration,
                    max: MAX_DURATION_SECS,
                });
            }
        }

        match self.simulated_span_secs {
            Some(0) => return Err(ConfigValidationError::InvalidSimulatedSpan),
            Some(span) if span > MAX_SIMULATED_SPAN_SECS => {
                return Err(ConfigValidationError::SimulatedSpanTooLong {
                    value: span,
                    max: MAX_SIMULATED_SPAN_SECS,
                });
            }
            _ => {}
        }

        if self.record_count.is_none()
            && self.duration_secs.is_none()
            && self.simulated_span_secs.is_none()
        {
            return Err(ConfigValidationError::UnboundedRun);
        }

        if !(self.rate.is_finite() && self.rate >= 0.0) {
            return Err(ConfigValidationError::InvalidRate(self.rate));
        }
        if self.rate > 0.0 && !(MIN_RATE..=MAX_RATE).contains(&self.rate) {
            return Err(ConfigValidationError::RateOutOfRange {
                value: self.rate,
                min: MIN_RATE,
                max: MAX_RATE,
            });
        }

        if !(self.progress_interval_secs.is_finite() && self.progress_interval_secs > 0.0) {
            return Err(ConfigValidationError::InvalidProgressInterval(
                self.progress_interval_secs,
            ));
        }
        if self.progress_interval_secs > MAX_PROGRESS_INTERVAL_SECS {
            return Err(ConfigValidationError::ProgressIntervalTooLong {
                value: self.progress_interval_secs,
                max: MAX_PROGRESS_INTERVAL_SECS,
            });
        }

        self.validate_positive("speed_mean", self.speed_mean)?;
        self.validate_positive("speed_stddev", self.speed_stddev)?;

        if self.base_vehicle_count == 0 {
            return Err(ConfigValidationError::InvalidBaseVehicleCount);
        }

        if self.sensor_count == 0 || self.sensor_count > MAX_SENSOR_COUNT {
            return Err(ConfigValidationError::InvalidSensorCount {
                value: self.sensor_count,
                max: MAX_SENSOR_COUNT,
            });
        }

        if self.jitter_min_ms > self.jitter_max_ms {
            return Err(ConfigValidationError::InvalidJitterRange(
                self.jitter_min_ms,
                self.jitter_max_ms,
            ));
        }
        if self.jitter_max_ms > MAX_JITTER_MS {
            return Err(ConfigValidationError::JitterTooLarge {
                value: self.jitter_max_ms,
                max: MAX_JITTER_MS,
            });
        }

        if self.days == 0 {
            return Err(ConfigValidationError::InvalidDaysCount(self.days));
        }
        if self.days > MAX_DAYS {
            return Err(ConfigValidationError::TooManyDays {
                value: self.days,
                max: MAX_DAYS,
            });
        }

        if self.timeline == TimelineMode::FullDay && self.record_count.is_none() {
            return Err(ConfigValidationError::FullDayWithoutRecordCount);
        }

        if self.output.csv_write && self.output.csv_path.trim().is_empty() {
            return Err(ConfigValidationError::EmptyCsvPath);
        }

        if self.database.write {
            if self.database.host.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigValidationError::MissingDatabaseSetting("DB_HOST"));
            }
            if self.database.user.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigValidationError::MissingDatabaseSetting("DB_USER"));
            }
        }

        self.profile.validate()?;

        Ok(())
    }

    /// Helper method to validate strictly positive parameters
    fn validate_positive(&self, field: &'static str, value: f64) -> Result<(), ConfigValidationError> {
        if !(value.is_finite() && value > 0.0) {
            return Err(ConfigValidationError::InvalidSpeed { field, value });
        }
        Ok(())
    }

    /// Rendering of record timestamps for this run
    ///
    /// Multi-day runs always carry the date so rows from different days stay distinguishable.
    pub fn timestamp_format(&self) -> TimestampFormat {
        if self.full_timestamps || self.days > 1 {
            TimestampFormat::DateTime
        } else {
            TimestampFormat::TimeOnly
        }
    }

    /// Minimum and maximum clock step in milliseconds
    pub fn jitter_range_ms(&self) -> (u64, u64) {
        (self.jitter_min_ms, self.jitter_max_ms)
    }
}
