//! Configuration module for `course-graph`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Default CLI configuration loaded based on build profile.
/// Uses release defaults in release mode, debug defaults in debug mode.
#[cfg(not(debug_assertions))]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultCLIConfigRelease.toml");

#[cfg(debug_assertions)]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultCLIConfigDebug.toml");

#[cfg(not(debug_assertions))]
const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(debug_assertions)]
const CONFIG_FILE_NAME: &str = "dconfig.toml";

/// Placeholder expanded to the config directory in path-like values
const DIR_VARIABLE: &str = "$COURSE_GRAPH";

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    #[serde(default)]
    pub level: String,
    /// Log file path
    #[serde(default)]
    pub file: String,
    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

/// Delay between department requests when the config does not set one
pub const DEFAULT_DELAY_MS: u64 = 1000;

const fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

/// Remote catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Base URL of the class search API (the `/search` path is appended)
    #[serde(default)]
    pub base_url: String,
    /// Academic term passed as the `term` query parameter (e.g. `2024-FALL`)
    #[serde(default)]
    pub term: String,
    /// Department codes fetched one after another
    #[serde(default)]
    pub departments: Vec<String>,
    /// Delay between department requests, in milliseconds; an explicit 0 disables it
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Per-request timeout, in seconds
    #[serde(default)]
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    #[serde(default)]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            term: String::new(),
            departments: Vec::new(),
            delay_ms: DEFAULT_DELAY_MS,
            timeout_secs: 0,
            user_agent: String::new(),
        }
    }
}

/// Prerequisite extraction configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Extraction mode: `validated` or `loose`
    #[serde(default)]
    pub mode: String,
    /// Maximum characters scanned after a `Prerequisites:` marker
    #[serde(default)]
    pub window: usize,
}

/// Paths configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Default CSV catalog export
    #[serde(default)]
    pub csv_file: String,
    /// Where the node/link JSON document is written
    #[serde(default)]
    pub output_file: String,
    /// Optional user override table (empty means the built-in table)
    #[serde(default)]
    pub overrides_file: String,
    /// Directory for run reports
    #[serde(default)]
    pub reports_dir: String,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Remote catalog settings
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Extraction settings
    #[serde(default)]
    pub extract: ExtractConfig,
    /// Path settings
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Optional CLI overrides for configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override logging level
    pub level: Option<String>,
    /// Override log file path
    pub file: Option<String>,
    /// Override verbose flag
    pub verbose: Option<bool>,
    /// Override academic term
    pub term: Option<String>,
    /// Override department list
    pub departments: Option<Vec<String>>,
    /// Override extraction mode
    pub mode: Option<String>,
    /// Override output JSON path
    pub output_file: Option<String>,
    /// Override curated override table path
    pub overrides_file: Option<String>,
    /// Override reports directory
    pub reports_dir: Option<String>,
}

impl Config {
    /// Get the `$COURSE_GRAPH` directory path
    ///
    /// Returns:
    /// - Linux: `~/.config/coursegraph`
    /// - macOS: `~/Library/Application Support/coursegraph`
    /// - Windows: `%APPDATA%\coursegraph`
    #[must_use]
    pub fn get_course_graph_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("coursegraph")
    }

    /// Merge missing fields from defaults into this config
    ///
    /// Only fields that are empty (or zero) here and set in `defaults` are
    /// filled, so user settings survive upgrades that add new keys.
    ///
    /// # Returns
    ///
    /// `true` if any fields were added/changed, `false` otherwise
    #[allow(clippy::useless_let_if_seq)]
    pub fn merge_defaults(&mut self, defaults: &Self) -> bool {
        let mut changed = false;

        let mut fill = |value: &mut String, default: &String| {
            if value.is_empty() && !default.is_empty() {
                value.clone_from(default);
                changed = true;
            }
        };

        fill(&mut self.logging.level, &defaults.logging.level);
        fill(&mut self.logging.file, &defaults.logging.file);
        fill(&mut self.fetch.base_url, &defaults.fetch.base_url);
        fill(&mut self.fetch.term, &defaults.fetch.term);
        fill(&mut self.fetch.user_agent, &defaults.fetch.user_agent);
        fill(&mut self.extract.mode, &defaults.extract.mode);
        fill(&mut self.paths.csv_file, &defaults.paths.csv_file);
        fill(&mut self.paths.output_file, &defaults.paths.output_file);
        fill(&mut self.paths.reports_dir, &defaults.paths.reports_dir);

        if self.fetch.departments.is_empty() && !defaults.fetch.departments.is_empty() {
            self.fetch.departments.clone_from(&defaults.fetch.departments);
            changed = true;
        }
        if self.fetch.timeout_secs == 0 && defaults.fetch.timeout_secs != 0 {
            self.fetch.timeout_secs = defaults.fetch.timeout_secs;
            changed = true;
        }
        if self.extract.window == 0 && defaults.extract.window != 0 {
            self.extract.window = defaults.extract.window;
            changed = true;
        }

        changed
    }

    /// Apply CLI-provided overrides onto the loaded configuration
    ///
    /// Overrides only affect this run; the config file is not modified.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.level {
            self.logging.level.clone_from(level);
        }
        if let Some(file) = &overrides.file {
            self.logging.file.clone_from(file);
        }
        if let Some(verbose) = overrides.verbose {
            self.logging.verbose = verbose;
        }

        if let Some(term) = &overrides.term {
            self.fetch.term.clone_from(term);
        }
        if let Some(departments) = &overrides.departments {
            self.fetch.departments.clone_from(departments);
        }

        if let Some(mode) = &overrides.mode {
            self.extract.mode.clone_from(mode);
        }

        if let Some(output_file) = &overrides.output_file {
            self.paths.output_file.clone_from(output_file);
        }
        if let Some(overrides_file) = &overrides.overrides_file {
            self.paths.overrides_file.clone_from(overrides_file);
        }
        if let Some(reports_dir) = &overrides.reports_dir {
            self.paths.reports_dir.clone_from(reports_dir);
        }
    }

    /// Get the user config file path
    ///
    /// `config.toml` for release builds, `dconfig.toml` for debug builds, inside
    /// [`get_course_graph_dir`](Self::get_course_graph_dir).
    #[must_use]
    pub fn get_config_file_path() -> PathBuf {
        Self::get_course_graph_dir().join(CONFIG_FILE_NAME)
    }

    #[must_use]
    fn expand_variables(value: &str) -> String {
        if value.contains(DIR_VARIABLE) {
            let dir = Self::get_course_graph_dir();
            value.replace(DIR_VARIABLE, dir.to_str().unwrap_or("."))
        } else {
            value.to_string()
        }
    }

    /// Initialize config from a TOML string
    ///
    /// Expands `$COURSE_GRAPH` in path values. Missing fields use their serde
    /// defaults (empty strings, zero, false).
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML cannot be parsed or doesn't match the expected schema
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(toml_str)?;

        config.logging.file = Self::expand_variables(&config.logging.file);
        config.paths.csv_file = Self::expand_variables(&config.paths.csv_file);
        config.paths.output_file = Self::expand_variables(&config.paths.output_file);
        config.paths.overrides_file = Self::expand_variables(&config.paths.overrides_file);
        config.paths.reports_dir = Self::expand_variables(&config.paths.reports_dir);

        Ok(config)
    }

    /// Load configuration from embedded defaults
    ///
    /// # Panics
    /// Panics if the embedded default configuration is invalid TOML. The
    /// defaults are compiled into the binary and covered by tests.
    #[must_use]
    pub fn from_defaults() -> Self {
        Self::from_toml(CONFIG_DEFAULTS).expect("Failed to parse compiled-in default configuration")
    }

    /// Load configuration from file, or create from defaults if not found
    ///
    /// - If the config file exists: load it, merge missing fields from defaults
    ///   and save the result when something was added.
    /// - On first run: create the config directory and save the defaults.
    ///
    /// Falls back to defaults if the file cannot be read or parsed.
    #[must_use]
    pub fn load() -> Self {
        let config_file = Self::get_config_file_path();
        let defaults = Self::from_defaults();

        if config_file.exists() {
            if let Ok(content) = fs::read_to_string(&config_file) {
                if let Ok(mut config) = Self::from_toml(&content) {
                    if config.merge_defaults(&defaults) {
                        let _ = config.save();
                    }
                    return config;
                }
            }
        } else {
            if let Some(parent) = config_file.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = defaults.save();
            return defaults;
        }

        defaults
    }

    /// Save configuration to the user config file
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be created, the config
    /// cannot be serialized, or the file cannot be written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_file = Self::get_config_file_path();
        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(&config_file, toml_str)?;
        Ok(())
    }

    /// Get a configuration value by key
    ///
    /// Supported keys: `level`, `file`, `verbose`, `base_url`, `term`,
    /// `departments` (comma-separated), `delay_ms`, `timeout_secs`,
    /// `user_agent`, `mode`, `window`, `csv_file`, `output_file`,
    /// `overrides_file`, `reports_dir`. Underscores may be written as dashes.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key.replace('-', "_").as_str() {
            "level" => self.logging.level.clone(),
            "file" => self.logging.file.clone(),
            "verbose" => self.logging.verbose.to_string(),
            "base_url" => self.fetch.base_url.clone(),
            "term" => self.fetch.term.clone(),
            "departments" => self.fetch.departments.join(","),
            "delay_ms" => self.fetch.delay_ms.to_string(),
            "timeout_secs" => self.fetch.timeout_secs.to_string(),
            "user_agent" => self.fetch.user_agent.clone(),
            "mode" => self.extract.mode.clone(),
            "window" => self.extract.window.to_string(),
            "csv_file" => self.paths.csv_file.clone(),
            "output_file" => self.paths.output_file.clone(),
            "overrides_file" => self.paths.overrides_file.clone(),
            "reports_dir" => self.paths.reports_dir.clone(),
            _ => return None,
        };
        Some(value)
    }

    /// Set a configuration value by key
    ///
    /// Updates the in-memory config only; call [`save()`](Config::save) to persist.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// (booleans, integers, extraction mode).
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key.replace('-', "_").as_str() {
            "level" => self.logging.level = value.to_string(),
            "file" => self.logging.file = value.to_string(),
            "verbose" => {
                self.logging.verbose = value
                    .parse::<bool>()
                    .map_err(|_| format!("Invalid boolean value for 'verbose': '{value}'"))?;
            }
            "base_url" => self.fetch.base_url = value.to_string(),
            "term" => self.fetch.term = value.to_string(),
            "departments" => self.fetch.departments = parse_list(value),
            "delay_ms" => self.fetch.delay_ms = parse_number(key, value)?,
            "timeout_secs" => self.fetch.timeout_secs = parse_number(key, value)?,
            "user_agent" => self.fetch.user_agent = value.to_string(),
            "mode" => {
                let mode = value.to_ascii_lowercase();
                if mode != "validated" && mode != "loose" {
                    return Err(format!(
                        "Invalid extraction mode '{value}' (expected 'validated' or 'loose')"
                    ));
                }
                self.extract.mode = mode;
            }
            "window" => self.extract.window = parse_number(key, value)?,
            "csv_file" => self.paths.csv_file = value.to_string(),
            "output_file" => self.paths.output_file = value.to_string(),
            "overrides_file" => self.paths.overrides_file = value.to_string(),
            "reports_dir" => self.paths.reports_dir = value.to_string(),
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Unset a configuration value by key (reset to default)
    ///
    /// # Errors
    /// Returns an error if the key is not recognized.
    pub fn unset(&mut self, key: &str, defaults: &Self) -> Result<(), String> {
        match key.replace('-', "_").as_str() {
            "level" => self.logging.level.clone_from(&defaults.logging.level),
            "file" => self.logging.file.clone_from(&defaults.logging.file),
            "verbose" => self.logging.verbose = defaults.logging.verbose,
            "base_url" => self.fetch.base_url.clone_from(&defaults.fetch.base_url),
            "term" => self.fetch.term.clone_from(&defaults.fetch.term),
            "departments" => self
                .fetch
                .departments
                .clone_from(&defaults.fetch.departments),
            "delay_ms" => self.fetch.delay_ms = defaults.fetch.delay_ms,
            "timeout_secs" => self.fetch.timeout_secs = defaults.fetch.timeout_secs,
            "user_agent" => self.fetch.user_agent.clone_from(&defaults.fetch.user_agent),
            "mode" => self.extract.mode.clone_from(&defaults.extract.mode),
            "window" => self.extract.window = defaults.extract.window,
            "csv_file" => self.paths.csv_file.clone_from(&defaults.paths.csv_file),
            "output_file" => self.paths.output_file.clone_from(&defaults.paths.output_file),
            "overrides_file" => self
                .paths
                .overrides_file
                .clone_from(&defaults.paths.overrides_file),
            "reports_dir" => self.paths.reports_dir.clone_from(&defaults.paths.reports_dir),
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Reset all configuration to defaults by deleting the config file
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be deleted.
    pub fn reset() -> Result<(), std::io::Error> {
        let config_file = Self::get_config_file_path();
        if config_file.exists() {
            fs::remove_file(config_file)?;
        }
        Ok(())
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_ascii_uppercase)
        .collect()
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| format!("Invalid number for '{key}': '{value}'"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[logging]")?;
        writeln!(f, "  level = \"{}\"", self.logging.level)?;
        writeln!(f, "  file = \"{}\"", self.logging.file)?;
        writeln!(f, "  verbose = {}", self.logging.verbose)?;

        writeln!(f, "\n[fetch]")?;
        writeln!(f, "  base_url = \"{}\"", self.fetch.base_url)?;
        writeln!(f, "  term = \"{}\"", self.fetch.term)?;
        writeln!(f, "  departments = [{}]", self.fetch.departments.join(", "))?;
        writeln!(f, "  delay_ms = {}", self.fetch.delay_ms)?;
        writeln!(f, "  timeout_secs = {}", self.fetch.timeout_secs)?;
        writeln!(f, "  user_agent = \"{}\"", self.fetch.user_agent)?;

        writeln!(f, "\n[extract]")?;
        writeln!(f, "  mode = \"{}\"", self.extract.mode)?;
        writeln!(f, "  window = {}", self.extract.window)?;

        writeln!(f, "\n[paths]")?;
        writeln!(f, "  csv_file = \"{}\"", self.paths.csv_file)?;
        writeln!(f, "  output_file = \"{}\"", self.paths.output_file)?;
        writeln!(f, "  overrides_file = \"{}\"", self.paths.overrides_file)?;
        writeln!(f, "  reports_dir = \"{}\"", self.paths.reports_dir)?;

        Ok(())
    }
}
