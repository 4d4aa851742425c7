//! # fieldlog-rs: field-deployable status monitor
//!
//! A data-acquisition pipeline for unattended deployments: periodically read
//! sensor and status values, decode them into structured records, and append
//! them to rotating CSV files — continuing across individual failures.
//!
//! ## Architecture
//!
//! - **Pipeline**: composable steps behind one `execute` contract. Input
//!   steps acquire and decode, output steps persist and pass through,
//!   [`pipeline::SequentialMultiStep`] merges sub-step outputs into one
//!   record.
//! - **Monitor**: a drift-corrected loop that collects a status record each
//!   interval, writes or echoes it, and isolates every per-cycle failure.
//! - **Cancellation**: a shared [`monitor::ExitSignal`] observed between
//!   wait slices, so shutdown latency is bounded by one slice.
//!
//! ## Example
//!
//! ```no_run
//! use fieldlog_rs::{start_monitoring, MonitorConfig, StatusRegistry};
//!
//! fn main() -> fieldlog_rs::Result<()> {
//!     let status_items = StatusRegistry::with_default_items();
//!     let config = MonitorConfig {
//!         output_path: Some("/data/field".into()),
//!         interval_s: 60.0,
//!         ..MonitorConfig::default()
//!     };
//!     start_monitoring(&status_items, &config, None)
//! }
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod monitor;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use config::MonitorConfig;
pub use decode::{Conversion, ConversionFn, DataDecoder, VariableDef, VariableDefaults};
pub use error::{FieldLogError, Result, ResultExt};
pub use monitor::{
    get_status_data, start_monitoring, ExitSignal, StatusDataItem, StatusFn, StatusRegistry,
};
pub use output::CsvFileWriter;
pub use pipeline::{
    DecodeInputStep, FileOutputStep, FileWriter, LogHelper, PipelineStep, RawSource,
    SequentialMultiStep, StepKind,
};
pub use types::{RawValue, Record, Value, VariableType};
