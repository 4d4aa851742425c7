//! Drift-corrected monitor loop with cooperative cancellation.
//!
//! Wake times are computed from a fixed start instant plus a whole number of
//! intervals, never from "now + interval", so a slow cycle shrinks the next
//! wait instead of accumulating lag. Waits happen in bounded slices through
//! [`ExitSignal::wait_timeout`], which bounds cancellation latency by one
//! slice rather than the full remaining wait.

use crate::config::MonitorConfig;
use crate::error::{FieldLogError, Result};
use crate::monitor::status::{get_status_data, StatusRegistry};
use crate::output;
use crate::types::{Record, Value};
use std::path::Path;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Shared cancellation flag with a bounded wait primitive.
///
/// Settable from any thread (e.g. an interrupt handler) while the monitor
/// thread is sleeping or mid-cycle. Cloning shares the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct ExitSignal {
    inner: Arc<SignalInner>,
}

#[derive(Debug, Default)]
struct SignalInner {
    flag: Mutex<bool>,
    cond: Condvar,
}

impl ExitSignal {
    /// Create an unset signal
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self) -> MutexGuard<'_, bool> {
        self.inner
            .flag
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Request shutdown and wake any waiter
    pub fn set(&self) {
        *self.flag() = true;
        self.inner.cond.notify_all();
    }

    /// True once shutdown has been requested
    pub fn is_set(&self) -> bool {
        *self.flag()
    }

    /// Reset the signal so it can be reused for a subsequent run
    pub fn clear(&self) {
        *self.flag() = false;
    }

    /// Wait up to `timeout` for the signal, returning its state afterwards
    ///
    /// Returns immediately when the signal is already set.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.flag();
        if *guard {
            return true;
        }
        let (guard, _result) = self
            .inner
            .cond
            .wait_timeout(guard, timeout)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Next wake time: the first interval boundary after `now`, anchored to
/// `start`
pub fn next_cycle_start(start: Instant, now: Instant, interval: Duration) -> Instant {
    let interval_ns = interval.as_nanos().max(1);
    let elapsed_ns = now.duration_since(start).as_nanos();
    let periods = elapsed_ns / interval_ns + 1;
    start + Duration::from_nanos((periods * interval_ns) as u64)
}

/// Append one status record to the configured output destination
///
/// A path with an extension is used verbatim; a bare directory gets a
/// derived, date-bearing filename.
pub fn write_status_data(
    status_data: &Record,
    output_path: &Path,
    config: &MonitorConfig,
) -> Result<()> {
    let path = if output_path.extension().is_some() {
        output_path.to_path_buf()
    } else {
        output::determine_output_filename(
            output_path,
            &config.filename_prefix,
            &config.filename_template,
            &config.extension,
        )
    };
    tracing::debug!(path = %path.display(), "Writing monitoring record");
    output::write_line_csv(status_data, &path)
}

fn run_cycle(status_items: &StatusRegistry, config: &MonitorConfig) -> Result<()> {
    let status_data = get_status_data(status_items)?;
    match &config.output_path {
        Some(output_path) => write_status_data(&status_data, output_path, config)?,
        None => {
            // Without an output destination the record still surfaces,
            // unless debug logging already shows it
            if !tracing::enabled!(tracing::Level::DEBUG) {
                println!("Status data: {}", Value::Map(status_data));
            }
        }
    }
    Ok(())
}

/// Run the monitor loop until the exit signal is set.
///
/// One cycle runs immediately, then cycles repeat on interval boundaries.
/// Errors inside a cycle are logged and the loop continues on schedule; the
/// next scheduled cycle is the retry. Startup errors (bad intervals, an
/// uncreatable output directory) propagate instead.
///
/// The signal is cleared before returning, so a caller-supplied signal can
/// be reused for a subsequent run.
pub fn start_monitoring(
    status_items: &StatusRegistry,
    config: &MonitorConfig,
    exit_signal: Option<ExitSignal>,
) -> Result<()> {
    let exit_signal = exit_signal.unwrap_or_default();

    if !(config.interval_s > 0.0) {
        return Err(FieldLogError::Config(format!(
            "monitor interval must be positive, got {}",
            config.interval_s
        )));
    }
    if !(config.sleep_interval_s > 0.0) {
        return Err(FieldLogError::Config(format!(
            "sleep interval must be positive, got {}",
            config.sleep_interval_s
        )));
    }

    if let Some(output_path) = &config.output_path {
        if output_path.extension().is_none() {
            tracing::debug!(
                dir = %output_path.display(),
                "Ensuring monitoring output directory"
            );
            std::fs::create_dir_all(output_path)?;
        }
    }

    let interval = Duration::from_secs_f64(config.interval_s);
    let sleep_slice = Duration::from_secs_f64(config.sleep_interval_s);
    let start = Instant::now();

    while !exit_signal.is_set() {
        if let Err(e) = run_cycle(status_items, config) {
            // Keep recording data if an error occurs
            tracing::error!("{} caught at cycle level: {}", e.kind(), e);
            tracing::debug!(error = ?e, "Cycle failure details");
        }

        let next_time = next_cycle_start(start, Instant::now(), interval);
        while !exit_signal.is_set() {
            let now = Instant::now();
            if now >= next_time {
                break;
            }
            exit_signal.wait_timeout(sleep_slice.min(next_time - now));
        }
    }

    exit_signal.clear();
    Ok(())
}
