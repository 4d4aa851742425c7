//! Error handling for fieldlog-rs
//!
//! This module defines the crate error type and a Result alias used
//! throughout the acquisition pipeline and monitor loop.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fieldlog-rs operations
#[derive(Error, Debug)]
pub enum FieldLogError {
    /// Errors raised while acquiring raw data from a source
    #[error("Acquisition error: {0}")]
    Acquisition(String),

    /// Errors raised while decoding a raw payload into typed variables
    #[error("Decode error: {0}")]
    Decode(String),

    /// Errors raised while creating directories or writing output files
    #[error("Write error for {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A composed step produced a shape that cannot be merged
    #[error("Composition error: {0}")]
    Composition(String),

    /// Errors related to configuration loading or validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors outside the output-write path
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<FieldLogError>,
    },
}

impl FieldLogError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        FieldLogError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Short kind name, used when logging a failure's class and message
    pub fn kind(&self) -> &'static str {
        match self {
            FieldLogError::Acquisition(_) => "AcquisitionError",
            FieldLogError::Decode(_) => "DecodeError",
            FieldLogError::Write { .. } => "WriteError",
            FieldLogError::Composition(_) => "CompositionError",
            FieldLogError::Config(_) => "ConfigError",
            FieldLogError::Io(_) => "IoError",
            FieldLogError::WithContext { source, .. } => source.kind(),
        }
    }
}

/// Result type alias for fieldlog-rs operations
pub type Result<T> = std::result::Result<T, FieldLogError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
