//! Tool context: the directories and services a tool runs against.

use super::feedback::Feedback;
use super::host::{join_relative, Host};
use super::message::Message;
use crate::config::{Platform, Project};
use std::path::{Path, PathBuf};

/// Tool name recorded when an output directory cannot be created.
pub const CREATE_DIRECTORY_TOOL: &str = "Create Directory";
/// Message recorded when an output directory cannot be created.
pub const CREATE_DIRECTORY_MESSAGE: &str = "Failed to create directory for use as output path.";

/// Everything a tool needs to run.
///
/// Contexts are cheap to derive from one another; phases start from the
/// job's root context and override the directories they work on.
#[derive(Debug, Clone)]
pub struct ToolContext<'a> {
    pub toolsfl_bin_path: PathBuf,
    pub project_path: PathBuf,
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    pub lvl_output_path: PathBuf,
    pub platform: Platform,
    /// Manifests of already packed content shared with every level pack
    pub common_files: Vec<PathBuf>,
    pub feedback: &'a Feedback,
    pub host: &'a Host,
}

impl<'a> ToolContext<'a> {
    /// Create the root context of a job for `project`.
    pub fn new(project: &Project, platform: Platform, feedback: &'a Feedback, host: &'a Host) -> Self {
        Self {
            toolsfl_bin_path: project.config.toolsfl_bin.clone(),
            project_path: project.directory.clone(),
            source_path: project.directory.clone(),
            output_path: project.directory.clone(),
            lvl_output_path: project.directory.clone(),
            platform,
            common_files: vec![],
            feedback,
            host,
        }
    }

    /// Derive a context reading from another source directory.
    pub fn with_source_path(&self, source_path: impl Into<PathBuf>) -> Self {
        Self { source_path: source_path.into(), ..self.clone() }
    }

    /// Derive a context reading from a subdirectory of the source directory.
    pub fn with_source_child(&self, relative: &str) -> Self {
        self.with_source_path(join_relative(&self.source_path, relative))
    }

    /// Path of a ToolsFL executable, e.g. `ConfigMunge`.
    pub fn tool_path(&self, name: &str) -> PathBuf {
        self.toolsfl_bin_path.join(format!("{}.exe", name))
    }

    /// Create a directory, recording an error on failure.
    ///
    /// Returns whether the directory now exists.
    pub fn create_directory(&self, path: &Path) -> bool {
        match self.host.fs.create_directories(path) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to create directory");
                self.feedback.add_error(Message::new(
                    path,
                    CREATE_DIRECTORY_TOOL,
                    CREATE_DIRECTORY_MESSAGE,
                ));
                false
            }
        }
    }

    /// Create the output and lvl output directories.
    ///
    /// Stops at the first failure; returns whether both exist.
    pub fn create_output_directories(&self) -> bool {
        self.create_directory(&self.output_path) && self.create_directory(&self.lvl_output_path)
    }
}
