//! fieldlog - Main Entry Point
//!
//! Runs the periodic status monitor: collect a record each interval, append
//! it to the configured output file, keep going until interrupted.

use clap::Parser;
use fieldlog_rs::{start_monitoring, ExitSignal, MonitorConfig, StatusRegistry};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "fieldlog", version, about = "Field-deployable status monitor")]
struct Cli {
    /// Output file (used verbatim) or directory (dated filename derived).
    /// With no value, the platform data directory is used; omit the flag
    /// entirely to echo records to the console
    #[arg(short, long, num_args = 0..=1)]
    output_path: Option<Option<PathBuf>>,

    /// Seconds between monitoring cycles
    #[arg(long)]
    interval_s: Option<f64>,

    /// Maximum seconds to sleep before re-checking for shutdown
    #[arg(long)]
    sleep_interval_s: Option<f64>,

    /// TOML configuration file; CLI flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for daily-rolling log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG still wins over the verbosity flags
    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // The non-blocking writer guard must outlive the monitor loop
    let _log_guard = match &cli.log_dir {
        Some(log_dir) => {
            let appender = tracing_appender::rolling::daily(log_dir, "fieldlog.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
            None
        }
    };

    let mut config = match &cli.config {
        Some(path) => MonitorConfig::load(path)?,
        None => MonitorConfig::default(),
    };
    match cli.output_path {
        Some(Some(path)) => config.output_path = Some(path),
        Some(None) => {
            let dir = MonitorConfig::default_output_dir()
                .ok_or_else(|| anyhow::anyhow!("could not determine a default data directory"))?;
            config.output_path = Some(dir);
        }
        None => {}
    }
    if let Some(interval_s) = cli.interval_s {
        config.interval_s = interval_s;
    }
    if let Some(sleep_interval_s) = cli.sleep_interval_s {
        config.sleep_interval_s = sleep_interval_s;
    }

    let status_items = StatusRegistry::with_default_items();

    let exit_signal = ExitSignal::new();
    let handler_signal = exit_signal.clone();
    ctrlc::set_handler(move || {
        tracing::info!("Interrupt received; shutting down");
        handler_signal.set();
    })?;

    tracing::info!("Starting fieldlog monitoring...");
    start_monitoring(&status_items, &config, Some(exit_signal))?;
    tracing::info!("fieldlog monitoring stopped");

    Ok(())
}
