//! Composable acquisition pipeline.
//!
//! Data flows through typed steps: Input (sources, decoding) → Transform →
//! Output (file sinks). Steps share one execution contract and are composed
//! with [`SequentialMultiStep`], which fans the same input out to every
//! sub-step and merges their outputs into a single record.
//!
//! # Architecture
//!
//! ```text
//! [DecodeInputStep] ──► [SequentialMultiStep] ──► [FileOutputStep]
//! ```
//!
//! # Failure policy
//!
//! - Input and transform steps propagate their errors to the caller.
//! - Output steps isolate write failures: they log, push a truncated payload
//!   excerpt to their diagnostic sink, and pass their input through
//!   unchanged so downstream steps still run.
//! - The monitor loop isolates whatever reaches it, once per cycle.

pub mod decode_input;
pub mod file_output;
pub mod multi_step;
pub mod step;

pub use decode_input::{DecodeInputStep, RawSource};
pub use file_output::{FileOutputStep, FileWriter};
pub use multi_step::SequentialMultiStep;
pub use step::{truncate_payload, LogHelper, PipelineStep, StepKind, MAX_PAYLOAD_EXCERPT_CHARS};
