//! Configuration module for the munge pipeline
//!
//! Provides the project model and the `munge.toml` project file.

pub mod loader;
pub mod schema;

pub use schema::*;
