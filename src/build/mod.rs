//! Munge pipeline for ToolsFL content projects.
//!
//! Turns a project's source directories into platform-specific munged
//! output and level files by running the ToolsFL executables in a fixed
//! order, then reports per-file warnings and errors.
//!
//! # Overview
//!
//! The pipeline consists of:
//! - **Discovery**: Find sides, worlds, and sound directories of a project
//! - **Orchestration**: Walk the categories and derive each one's directories
//! - **Execution**: Run the tools of a category and classify their output
//! - **Management**: Run one munge or clean job at a time in the background
//!
//! # Example
//!
//! ```ignore
//! use lvlmunge::build::{Host, Manager};
//!
//! let mut manager = Manager::new(Project::new(project_dir), Host::system())?;
//! manager.open_project(&project_dir)?;
//! manager.start_munge();
//! manager.wait_for_idle();
//! println!("{}", manager.get_munge_report().summary());
//! ```

pub mod context;
pub mod diagnostics;
pub mod discovery;
pub mod executor;
pub mod feedback;
pub mod host;
pub mod manager;
pub mod message;
pub mod pipeline;
pub mod task;
pub mod tool;
pub mod tool_set;

#[cfg(test)]
pub(crate) mod testing;

pub use context::*;
pub use discovery::*;
pub use feedback::*;
pub use host::*;
pub use manager::*;
pub use message::*;
pub use pipeline::*;
pub use task::*;
pub use tool::*;
pub use tool_set::*;
