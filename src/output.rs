//! Output filename rendering and CSV record serialization.
//!
//! Filenames are rendered from a small placeholder template at write time —
//! `{date}`, `{time}` and `{datetime}` expand from the current UTC clock,
//! `{prefix}` and any auxiliary arguments from the caller. Records append to
//! CSV files one line per cycle, with a header written when the file is new.

use crate::error::{FieldLogError, Result};
use crate::pipeline::file_output::FileWriter;
use crate::types::{Record, Value};
use chrono::Utc;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Template used when a filename template is not configured
pub const DEFAULT_FILENAME_TEMPLATE: &str = "{prefix}_{date}";

/// Prefix used when no `{prefix}` argument is supplied
pub const DEFAULT_FILENAME_PREFIX: &str = "status";

/// Extension used for derived output filenames
pub const DEFAULT_EXTENSION: &str = "csv";

/// Render a concrete output file path beneath `output_path`
///
/// Rendered fresh on every call: templates may embed the current time, so
/// the result must never be cached across cycles.
pub fn render_output_filename(
    output_path: &Path,
    filename_template: Option<&str>,
    extension: Option<&str>,
    filename_args: &HashMap<String, String>,
) -> PathBuf {
    let template = filename_template.unwrap_or(DEFAULT_FILENAME_TEMPLATE);
    let now = Utc::now();

    let mut rendered = template.to_string();
    for (key, value) in filename_args {
        rendered = rendered.replace(&format!("{{{}}}", key), value);
    }
    rendered = rendered
        .replace("{date}", &now.format("%Y-%m-%d").to_string())
        .replace("{time}", &now.format("%H-%M-%S").to_string())
        .replace("{datetime}", &now.format("%Y-%m-%dT%H-%M-%S").to_string())
        .replace("{prefix}", DEFAULT_FILENAME_PREFIX);

    let mut filename = rendered;
    if let Some(ext) = extension {
        filename.push('.');
        filename.push_str(ext);
    }
    output_path.join(filename)
}

/// Derive the output filename for a directory-style output path
pub fn determine_output_filename(
    output_dir: &Path,
    prefix: &str,
    filename_template: &str,
    extension: &str,
) -> PathBuf {
    let mut args = HashMap::new();
    args.insert("prefix".to_string(), prefix.to_string());
    render_output_filename(output_dir, Some(filename_template), Some(extension), &args)
}

/// Append one record to a CSV file, writing a header when the file is new
pub fn write_line_csv(record: &Record, path: &Path) -> Result<()> {
    let wrap = |e: std::io::Error| FieldLogError::Write {
        path: path.to_path_buf(),
        source: e,
    };

    let write_header = match std::fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(_) => true,
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(wrap)?;
    let mut writer = BufWriter::new(file);

    if write_header {
        let header: Vec<String> = record.keys().map(|k| csv_escape(k)).collect();
        writeln!(writer, "{}", header.join(",")).map_err(wrap)?;
    }

    let line: Vec<String> = record.values().map(csv_field).collect();
    writeln!(writer, "{}", line.join(",")).map_err(wrap)?;
    writer.flush().map_err(wrap)?;
    Ok(())
}

fn csv_field(value: &Value) -> String {
    csv_escape(&value.to_string())
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// CSV serialization for [`crate::pipeline::FileOutputStep`]
#[derive(Debug, Default)]
pub struct CsvFileWriter;

impl CsvFileWriter {
    /// Create a CSV writer
    pub fn new() -> Self {
        Self
    }
}

impl FileWriter for CsvFileWriter {
    fn write_file(&mut self, data: Option<&Value>, path: &Path) -> Result<()> {
        match data {
            Some(Value::Map(record)) => write_line_csv(record, path),
            Some(other) => Err(FieldLogError::Composition(format!(
                "CSV writer requires a record, got {}",
                other.type_name()
            ))),
            // Absent input is valid and writes nothing
            None => Ok(()),
        }
    }
}
