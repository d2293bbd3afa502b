//! Shared library for `course-graph`
//! Builds a course prerequisite graph from catalog data and exports it as node/link JSON

pub mod config;
pub mod core;
pub mod error;
pub mod logger;

pub use error::{CatalogError, Result};

/// Returns the current version of the `course-graph` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
