//! CLI command handlers for `coursegraph`.
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod config;
