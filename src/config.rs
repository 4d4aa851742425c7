//! Monitor configuration.
//!
//! One [`MonitorConfig`] is built at process start — from defaults, an
//! optional TOML file, and CLI overrides — and passed down explicitly.
//! Nothing reads configuration at call time.

use crate::error::{FieldLogError, Result};
use crate::output;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "fieldlog-rs";

/// Default seconds between monitoring cycles
pub const DEFAULT_INTERVAL_S: f64 = 60.0;

/// Default maximum seconds to sleep before re-checking for shutdown
pub const DEFAULT_SLEEP_INTERVAL_S: f64 = 1.0;

/// Monitor loop parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Output destination: a file path (extension present, appended across
    /// cycles) or a directory (filename derived per cycle). `None` echoes
    /// records to the console instead.
    pub output_path: Option<PathBuf>,

    /// Seconds between cycle starts
    pub interval_s: f64,

    /// Maximum seconds per wait slice; bounds cancellation latency
    pub sleep_interval_s: f64,

    /// `{prefix}` value for derived filenames
    pub filename_prefix: String,

    /// Template for derived filenames
    pub filename_template: String,

    /// Extension for derived filenames
    pub extension: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            output_path: None,
            interval_s: DEFAULT_INTERVAL_S,
            sleep_interval_s: DEFAULT_SLEEP_INTERVAL_S,
            filename_prefix: output::DEFAULT_FILENAME_PREFIX.to_string(),
            filename_template: output::DEFAULT_FILENAME_TEMPLATE.to_string(),
            extension: output::DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FieldLogError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&raw).map_err(|e| {
            FieldLogError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Platform data directory for this application
    pub fn default_output_dir() -> Option<PathBuf> {
        dirs_next::data_dir().map(|p| p.join(APP_ID))
    }
}
