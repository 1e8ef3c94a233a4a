//! Diagnostic messages and the per-job munge report.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A single diagnostic produced while munging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// File the diagnostic refers to, prefixed with the source directory the
    /// producing tool ran against. May be empty.
    pub file: PathBuf,
    /// Name of the tool that produced the diagnostic
    pub tool: String,
    /// Diagnostic text, possibly spanning several lines
    pub message: String,
}

impl Message {
    /// Create a message.
    pub fn new(file: impl Into<PathBuf>, tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self { file: file.into(), tool: tool.into(), message: message.into() }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]:{}", self.tool, self.file.display(), self.message)
    }
}

/// Warnings and errors collected over one munge or clean job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Warnings in the order they were reported
    pub warnings: Vec<Message>,
    /// Errors in the order they were reported
    pub errors: Vec<Message>,
}

impl Report {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report describing a job that could not complete.
    ///
    /// Carries exactly one error with an empty file and the tool `Munge`.
    pub fn job_failure(message: impl Into<String>) -> Self {
        Self { warnings: vec![], errors: vec![Message::new(PathBuf::new(), "Munge", message)] }
    }

    /// Check if the report holds no diagnostics.
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    /// Check if any error was reported.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// One-line summary of the report.
    pub fn summary(&self) -> String {
        format!("{} error(s), {} warning(s)", self.errors.len(), self.warnings.len())
    }
}
