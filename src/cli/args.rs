//! CLI argument definitions for `coursegraph`

use clap::{builder::BoolishValueParser, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use course_graph::config::ConfigOverrides;
use course_graph::logger::Level;

/// CLI log level argument
///
/// Represents log levels that can be passed via CLI arguments. Converts to lowercase
/// strings for config storage and to `logger::Level` for runtime use.
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevelArg {
    /// Error-level logging
    Error,
    /// Warning-level logging
    Warn,
    /// Info-level logging
    Info,
    /// Debug-level logging
    Debug,
}

impl From<LogLevelArg> for Level {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Self::Error,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Debug => Self::Debug,
        }
    }
}

impl std::fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let as_str = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        write!(f, "{as_str}")
    }
}

/// Prerequisite extraction mode argument
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum ExtractModeArg {
    /// Only accept mentions of courses present in the catalog
    Validated,
    /// Accept any course-shaped mention near a prerequisite keyword
    Loose,
}

impl std::fmt::Display for ExtractModeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validated => write!(f, "validated"),
            Self::Loose => write!(f, "loose"),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Display configuration values.
    ///
    /// If a KEY is provided, displays only that configuration value.
    /// If no KEY is provided, displays all configuration values.
    Get {
        /// Optional configuration key to display (e.g., `term`, `departments`, `output_file`)
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },
    /// Set a configuration value.
    Set {
        /// Configuration key to set
        #[arg(value_name = "KEY")]
        key: String,
        /// Value to set
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Unset a configuration value.
    Unset {
        /// Configuration key to unset
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Reset configuration to defaults (requires confirmation).
    Reset,
}

/// Options shared by the graph-building commands
#[derive(Debug, Clone, Default, Args)]
pub struct BuildArgs {
    /// Output JSON path (defaults to config `output_file`)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Curated prerequisite table to use instead of the built-in one
    #[arg(long, value_name = "FILE", conflicts_with = "no_overrides")]
    pub overrides: Option<PathBuf>,

    /// Skip the curated prerequisite table
    #[arg(long)]
    pub no_overrides: bool,

    /// Write a Markdown run report into the config `reports_dir`
    #[arg(long)]
    pub report: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    ///
    /// If no subcommand is provided, displays all configuration values.
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// Build the graph from a bulk CSV catalog export.
    Csv {
        /// Path to the CSV export (defaults to config `csv_file`)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        #[command(flatten)]
        build: BuildArgs,
    },
    /// Build the graph from the remote class-search API.
    ///
    /// Departments are requested one at a time; a failed department is skipped.
    Api {
        /// Department to fetch (repeatable; defaults to config `departments`)
        #[arg(long = "department", value_name = "DEPT")]
        departments: Vec<String>,

        /// Term to query, e.g. 2024-FALL (defaults to config `term`)
        #[arg(long, value_name = "TERM")]
        term: Option<String>,

        #[command(flatten)]
        build: BuildArgs,
    },
}

impl Command {
    fn build_args(&self) -> Option<&BuildArgs> {
        match self {
            Self::Csv { build, .. } | Self::Api { build, .. } => Some(build),
            Self::Config { .. } => None,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "coursegraph",
    about = "Build a course prerequisite graph from catalog data",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Set the runtime log level (error|warn|info|debug). Falls back to config if omitted.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Enable verbose output (runtime only)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Enable debug-level logging and runtime debug flag (shorthand)
    #[arg(long = "debug")]
    pub debug_flag: bool,

    /// Write runtime logs to a file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    // --- Config overrides ---
    /// Override config logging level (stored in config file)
    #[arg(long = "config-level", value_enum)]
    pub config_level: Option<LogLevelArg>,

    /// Override config log file path
    #[arg(long = "config-log-file", value_name = "PATH")]
    pub config_log_file: Option<PathBuf>,

    /// Override config verbose flag (true/false)
    #[arg(long = "config-verbose", value_parser = BoolishValueParser::new())]
    pub config_verbose: Option<bool>,

    /// Override config extraction mode
    #[arg(long = "config-mode", value_enum)]
    pub config_mode: Option<ExtractModeArg>,

    /// Override config extraction mode (short form)
    #[arg(long = "mode", value_enum)]
    pub mode: Option<ExtractModeArg>,

    /// Override config reports directory
    #[arg(long = "config-reports-dir", value_name = "DIR")]
    pub config_reports_dir: Option<PathBuf>,

    /// Override config reports directory (short form)
    #[arg(long = "reports-dir", value_name = "DIR")]
    pub reports_dir: Option<PathBuf>,

    /// Subcommand to execute.
    /// A subcommand is required to run the CLI.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Convert CLI flags into config overrides
    ///
    /// Short-form flags (e.g., `--mode`) take precedence over long-form flags
    /// (e.g., `--config-mode`) when both are provided. Build command options
    /// (`--output`, `--overrides`, `--department`, `--term`) become overrides
    /// of the matching config values.
    ///
    /// # Returns
    /// A `ConfigOverrides` struct with values from CLI flags, where `None` means no override.
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        let build = self.command.build_args();
        let (departments, term): (Option<Vec<String>>, Option<String>) = match &self.command {
            Command::Api {
                departments, term, ..
            } => (
                (!departments.is_empty())
                    .then(|| departments.iter().map(|d| d.trim().to_uppercase()).collect()),
                term.clone(),
            ),
            _ => (None, None),
        };

        ConfigOverrides {
            level: self.config_level.map(|lvl| lvl.to_string().to_lowercase()),
            file: self
                .config_log_file
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            verbose: self.config_verbose,
            term,
            departments,
            mode: self.mode.or(self.config_mode).map(|m| m.to_string()),
            output_file: build
                .and_then(|b| b.output.as_ref())
                .map(|p| p.to_string_lossy().to_string()),
            overrides_file: build
                .and_then(|b| b.overrides.as_ref())
                .map(|p| p.to_string_lossy().to_string()),
            reports_dir: self
                .reports_dir
                .as_ref()
                .or(self.config_reports_dir.as_ref())
                .map(|p| p.to_string_lossy().to_string()),
        }
    }
}
