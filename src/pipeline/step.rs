//! Step abstraction for the pipeline.
//!
//! Every unit of work implements [`PipelineStep`]: it takes optional input
//! data and produces optional output data. [`StepKind`] tags a step's role
//! for composition-time shape checks; the kinds carry no behavior of their
//! own.

use crate::error::Result;
use crate::types::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Cap on the diagnostic payload excerpt, in characters
pub const MAX_PAYLOAD_EXCERPT_CHARS: usize = 1000;

/// Marker appended to a truncated payload excerpt
const TRUNCATION_MARKER: &str = " <snipped at 1000 chars>";

/// Categorical role of a step in a composed pipeline
///
/// Kinds exist for composition-time validation only; e.g. an output step's
/// output is a pass-through of its input and need not be further consumable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Produces data, ignores its input
    Input,
    /// Transforms its input into new output
    Transform,
    /// Persists its input, passing it through unchanged
    Output,
    /// A self-contained unit, e.g. a composed multi-step
    Unit,
}

impl StepKind {
    /// Short label used when logging a composed sequence's shape
    pub fn label(&self) -> &'static str {
        match self {
            StepKind::Input => "input",
            StepKind::Transform => "transform",
            StepKind::Output => "output",
            StepKind::Unit => "unit",
        }
    }
}

/// The execution contract every pipeline step implements
///
/// `execute` must accept `None` input: sources ignore input entirely and
/// treat themselves as pure producers. Failure policy differs by kind —
/// input and transform steps propagate errors, output steps self-isolate
/// (see [`crate::pipeline::file_output::FileOutputStep`]).
pub trait PipelineStep: Send {
    /// Human-readable name of this step
    fn name(&self) -> &str;

    /// Categorical role of this step
    fn kind(&self) -> StepKind;

    /// Run the step against optional input data
    fn execute(&mut self, input: Option<&Value>) -> Result<Option<Value>>;

    /// Diagnostic sink for extended failure context, if the step carries one
    fn log_helper(&self) -> Option<&LogHelper> {
        None
    }
}

/// Diagnostic sink for extended failure context
///
/// Records payload excerpts on failure outside a step's primary return
/// value. Entries go to the `fieldlog::diagnostic` log target at debug
/// level; the count and the most recent entry are kept for inspection.
#[derive(Debug)]
pub struct LogHelper {
    label: String,
    entry_count: AtomicU64,
    last_entry: Mutex<Option<String>>,
}

impl LogHelper {
    /// Create a sink labeled with the owning step's name
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entry_count: AtomicU64::new(0),
            last_entry: Mutex::new(None),
        }
    }

    /// Record one diagnostic entry
    pub fn log(&self, context: &str, data: &str) {
        let entry = format!("{} | {}", context, data);
        tracing::debug!(
            target: "fieldlog::diagnostic",
            label = %self.label,
            %entry,
            "step diagnostic"
        );
        self.entry_count.fetch_add(1, Ordering::Relaxed);
        let mut last = self
            .last_entry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *last = Some(entry);
    }

    /// Number of diagnostic entries recorded so far
    pub fn entry_count(&self) -> u64 {
        self.entry_count.load(Ordering::Relaxed)
    }

    /// The most recent diagnostic entry, if any
    pub fn last_entry(&self) -> Option<String> {
        self.last_entry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Cap a payload representation for diagnostic logging
///
/// Representations longer than [`MAX_PAYLOAD_EXCERPT_CHARS`] characters are
/// cut there and marked explicitly.
pub fn truncate_payload(repr: &str) -> String {
    if repr.chars().count() <= MAX_PAYLOAD_EXCERPT_CHARS {
        return repr.to_string();
    }
    let mut excerpt: String = repr.chars().take(MAX_PAYLOAD_EXCERPT_CHARS).collect();
    excerpt.push_str(TRUNCATION_MARKER);
    excerpt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_payload_unchanged() {
        let repr = "short payload";
        assert_eq!(truncate_payload(repr), repr);
    }

    #[test]
    fn test_truncate_long_payload_capped_and_marked() {
        let repr = "x".repeat(5000);
        let excerpt = truncate_payload(&repr);
        assert!(excerpt.starts_with(&"x".repeat(MAX_PAYLOAD_EXCERPT_CHARS)));
        assert!(excerpt.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            excerpt.chars().count(),
            MAX_PAYLOAD_EXCERPT_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_truncate_exact_boundary_not_marked() {
        let repr = "y".repeat(MAX_PAYLOAD_EXCERPT_CHARS);
        assert_eq!(truncate_payload(&repr), repr);
    }

    #[test]
    fn test_log_helper_counts_entries() {
        let helper = LogHelper::new("csv_output");
        assert_eq!(helper.entry_count(), 0);
        helper.log("/data/status.csv", "payload excerpt");
        assert_eq!(helper.entry_count(), 1);
        let last = helper.last_entry().unwrap();
        assert!(last.contains("/data/status.csv"));
        assert!(last.contains("payload excerpt"));
    }
}
