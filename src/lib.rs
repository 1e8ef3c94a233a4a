//! lvlmunge - Munge pipeline driving the ToolsFL content tools
//!
//! This library provides functionality to:
//! - Describe a content project and the tools each category runs
//! - Run munge and clean jobs in the background, one at a time
//! - Classify tool output into per-file warnings and errors

pub mod build;
pub mod cli;
pub mod config;
pub mod output;
