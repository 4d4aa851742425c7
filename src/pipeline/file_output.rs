//! Output step that writes its input to a rendered file path.
//!
//! Serialization lives behind the [`FileWriter`] trait; the step owns the
//! path rendering, directory creation and failure isolation. A write failure
//! is logged together with a truncated payload excerpt and never reaches the
//! caller — the step always passes its input through unchanged.

use crate::error::{FieldLogError, Result};
use crate::output;
use crate::pipeline::step::{truncate_payload, LogHelper, PipelineStep, StepKind};
use crate::types::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Serialization boundary for [`FileOutputStep`]
pub trait FileWriter: Send {
    /// Append or write the given data to the file at `path`
    fn write_file(&mut self, data: Option<&Value>, path: &Path) -> Result<()>;
}

/// Output step: renders a target path, ensures its directory, writes.
///
/// The target path is re-rendered on every execution since the filename
/// template may embed the current time.
pub struct FileOutputStep {
    name: String,
    output_path: PathBuf,
    filename_template: Option<String>,
    extension: Option<String>,
    filename_args: HashMap<String, String>,
    writer: Box<dyn FileWriter>,
    log_helper: LogHelper,
}

impl FileOutputStep {
    /// Create an output step writing beneath `output_path`
    pub fn new(
        name: impl Into<String>,
        writer: Box<dyn FileWriter>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        let name = name.into();
        let log_helper = LogHelper::new(&name);
        Self {
            name,
            output_path: output_path.into(),
            filename_template: None,
            extension: None,
            filename_args: HashMap::new(),
            writer,
            log_helper,
        }
    }

    /// Set the filename template
    pub fn with_filename_template(mut self, template: impl Into<String>) -> Self {
        self.filename_template = Some(template.into());
        self
    }

    /// Set the file extension
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Add a template argument available as `{key}` in the filename template
    pub fn with_filename_arg(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.filename_args.insert(key.into(), value.into());
        self
    }

    /// Render the concrete target path for this execution
    fn render_target(&self) -> PathBuf {
        output::render_output_filename(
            &self.output_path,
            self.filename_template.as_deref(),
            self.extension.as_deref(),
            &self.filename_args,
        )
    }

    fn ensure_dir_and_write(&mut self, input: Option<&Value>, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tracing::debug!(dir = %parent.display(), "Ensuring output directory");
            fs::create_dir_all(parent).map_err(|e| FieldLogError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        tracing::debug!(path = %path.display(), "Writing data to file");
        self.writer.write_file(input, path)
    }
}

impl PipelineStep for FileOutputStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StepKind {
        StepKind::Output
    }

    fn execute(&mut self, input: Option<&Value>) -> Result<Option<Value>> {
        let output_file_path = self.render_target();

        match self.ensure_dir_and_write(input, &output_file_path) {
            Ok(()) => {
                tracing::debug!(
                    path = %output_file_path.display(),
                    "Data successfully written to file"
                );
            }
            Err(e) => {
                // Write failures never abort the pipeline; the input is
                // still passed through for downstream steps.
                tracing::error!(
                    "{} writing output data to file at {}: {}",
                    e.kind(),
                    output_file_path.display(),
                    e
                );
                let excerpt = truncate_payload(&format!("{:?}", input));
                self.log_helper
                    .log(&output_file_path.display().to_string(), &excerpt);
            }
        }

        Ok(input.cloned())
    }

    fn log_helper(&self) -> Option<&LogHelper> {
        Some(&self.log_helper)
    }
}
