// Traffic Sensor Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/traffic-sensor-simulator
// ```
//
// Or with custom configuration:
//
// ```console
// $ ./target/release/traffic-sensor-simulator --records 5000 --timeline full-day --seed 42 --verbose
// ```

use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use traffic_sensor_simulator::simulation::{
    LoggingConfig, LoggingError, LoggingGuard, RunStatistics, ShutdownFlag, SimulationError,
    SimulationOrchestrator, StopReason,
};
use traffic_sensor_simulator::sinks::SinkSet;
use traffic_sensor_simulator::types::{CliArgs, RunConfig};
use tracing::{error, info, Level};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    // Handle special CLI flags that don't require full initialization
    if args.print_config {
        match RunConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    let logging_guard = match init_logging(&args) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    info!("Starting Traffic Sensor Simulator");

    let exit_code = match run(args) {
        Ok(Some(stats)) if stats.stop_reason == StopReason::SinkFailure => 1,
        Ok(_) => 0,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    };

    // Flush buffered log lines before exiting
    drop(logging_guard);
    process::exit(exit_code);
}

/// Initialize logging based on CLI flags
fn init_logging(args: &CliArgs) -> std::result::Result<LoggingGuard, LoggingError> {
    let mut logging = LoggingConfig::new();
    if args.debug {
        logging = logging.with_level(Level::DEBUG).with_span_events();
    } else if args.verbose {
        logging = logging.with_level(Level::INFO);
    }
    if args.log_json {
        logging = logging.with_json_format();
    }
    if let Some(dir) = &args.log_dir {
        logging = logging.with_file_logging(dir.clone());
    }
    logging.init()
}

/// Load the configuration and run the simulation; `None` for a dry run
fn run(args: CliArgs) -> Result<Option<RunStatistics>> {
    let dry_run = args.dry_run;

    // Load configuration from CLI arguments, environment and optional config file
    let config = RunConfig::from_cli_args(args).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;
    info!("Configuration loaded and validated successfully");

    if dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - no records will be generated.");
        print_configuration_summary(&config);
        return Ok(None);
    }

    print_startup_banner(&config);

    let shutdown = ShutdownFlag::new();
    shutdown
        .install_signal_handlers()
        .context("Failed to install shutdown handlers")?;

    let mut sinks = SinkSet::from_config(&config)
        .map_err(|(sink, e)| SimulationError::sink_setup_error(sink, e))
        .context("Failed to set up output sinks")?;

    let mut orchestrator =
        SimulationOrchestrator::new(config).context("Failed to initialize simulation")?;
    let stats = orchestrator
        .run(&mut sinks, &shutdown)
        .context("Simulation failed")?;

    eprintln!("{}", stats.generate_summary_output());
    info!("Traffic Sensor Simulator finished: {}", stats.stop_reason);
    Ok(Some(stats))
}

/// Print startup banner and configuration summary
fn print_startup_banner(config: &RunConfig) {
    eprintln!("Traffic Sensor Simulator");
    eprintln!("========================");
    eprintln!("Synthetic roadside sensor telemetry with time-of-day traffic patterns");
    eprintln!();

    print_configuration_summary(config);
}

/// Print configuration summary
fn print_configuration_summary(config: &RunConfig) {
    eprintln!("Configuration:");
    match config.record_count {
        Some(count) => eprintln!("  Records: {}", count),
        None => eprintln!("  Records: unbounded"),
    }
    if let Some(duration) = config.duration_secs {
        eprintln!("  Duration: {:.1}s", duration);
    }
    if let Some(span) = config.simulated_span_secs {
        eprintln!("  Simulated Span: {}s", span);
    }
    if config.rate > 0.0 {
        eprintln!("  Rate: {:.1} records/s", config.rate);
    } else {
        eprintln!("  Rate: unlimited");
    }
    eprintln!("  Generator: {}", config.generator);
    eprintln!("  Timeline: {} ({} day(s))", config.timeline, config.days);
    eprintln!("  Sensors: {}", config.sensor_count);
    eprintln!(
        "  Baseline: speed {:.1} ± {:.1}, {} vehicles",
        config.speed_mean, config.speed_stddev, config.base_vehicle_count
    );
    eprintln!("  Clock Step: {}-{} ms", config.jitter_min_ms, config.jitter_max_ms);
    if let Some(seed) = config.seed {
        eprintln!("  Random Seed: {}", seed);
    }

    eprintln!("\nSinks:");
    if config.output.csv_write {
        eprintln!("  CSV: {}", config.output.csv_path);
    }
    if config.output.stdout {
        eprintln!("  JSON lines: stdout");
    }
    if config.database.write {
        eprintln!(
            "  MySQL: {}:{}/{}",
            config.database.host.as_deref().unwrap_or("localhost"),
            config.database.port,
            config.database.name
        );
    } else {
        eprintln!("  MySQL: disabled (dry-run logging)");
    }
    eprintln!();
}
