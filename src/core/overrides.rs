//! Curated prerequisite overrides
//!
//! Well-known prerequisite chains that catalog text does not state reliably,
//! kept as a versioned TOML table (target course -> prerequisite courses).
//! The built-in table is compiled from `assets/overrides.toml`; a user table
//! with the same layout can replace it.

use super::normalize::normalize_course_id;
use crate::error::{CatalogError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Built-in override table
const BUILTIN_OVERRIDES: &str = include_str!("../../assets/overrides.toml");

/// Override table layout version understood by this build
pub const SUPPORTED_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct OverrideFile {
    version: u32,
    #[serde(default)]
    prerequisites: BTreeMap<String, Vec<String>>,
}

/// Static mapping from target course to its curated prerequisite courses
///
/// All identifiers are normalized on load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl OverrideTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table from TOML
    ///
    /// # Errors
    /// Returns an error if the TOML is malformed, the `version` is not
    /// [`SUPPORTED_VERSION`], or an identifier does not normalize
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let file: OverrideFile = toml::from_str(toml_str)
            .map_err(|e| CatalogError::parse(format!("invalid override table: {e}")))?;

        if file.version != SUPPORTED_VERSION {
            return Err(CatalogError::validation(format!(
                "override table version {} not supported (expected {SUPPORTED_VERSION})",
                file.version
            )));
        }

        let mut table = Self::new();
        for (target, sources) in file.prerequisites {
            for source in sources {
                table.insert(&target, &source)?;
            }
        }
        Ok(table)
    }

    /// The table compiled into the binary
    ///
    /// # Errors
    /// Returns an error if the embedded table is invalid
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_OVERRIDES)
    }

    /// Load a table from a TOML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        Self::from_toml(&content)
    }

    /// Add one `source -> target` relationship
    ///
    /// # Errors
    /// Returns a validation error when either identifier does not normalize
    pub fn insert(&mut self, target: &str, source: &str) -> Result<()> {
        let target = normalize_course_id(target).ok_or_else(|| {
            CatalogError::validation(format!("invalid override target '{target}'"))
        })?;
        let source = normalize_course_id(source).ok_or_else(|| {
            CatalogError::validation(format!("invalid override source '{source}' for {target}"))
        })?;

        let sources = self.entries.entry(target).or_default();
        if !sources.contains(&source) {
            sources.push(source);
        }
        Ok(())
    }

    /// Iterate over `(target, sources)` entries in target order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(target, sources)| (target.as_str(), sources.as_slice()))
    }

    /// Curated prerequisites of a target course
    #[must_use]
    pub fn sources_for(&self, target: &str) -> Option<&[String]> {
        self.entries.get(target).map(Vec::as_slice)
    }

    /// Number of `(source, target)` pairs in the table
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Whether the table has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
