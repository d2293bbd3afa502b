//! Course record model

use crate::core::normalize::department_of;
use serde::{Deserialize, Serialize};

/// A catalog course accepted into the graph
///
/// Serialized as one entry of the `nodes` array in the exported document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    /// Normalized identifier (e.g., "COMPSCI 61A")
    pub id: String,

    /// Course title
    pub name: String,

    /// Department code, the first token of `id`
    pub department: String,

    /// Units, either a single value ("4") or a range ("1-4")
    pub units: String,

    /// Free-text catalog description
    pub description: String,

    /// Terms the course is offered in, when the source provides it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_offered: Option<String>,

    /// Cross-listed course codes, when the source provides them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_listed: Option<String>,
}

impl CourseRecord {
    /// Create a record from an already-normalized identifier
    ///
    /// The department is derived from `id`.
    #[must_use]
    pub fn new(id: String, name: String, units: String, description: String) -> Self {
        let department = department_of(&id).to_string();
        Self {
            id,
            name,
            department,
            units,
            description,
            terms_offered: None,
            cross_listed: None,
        }
    }

    /// Attach the terms-offered metadata
    #[must_use]
    pub fn with_terms_offered(mut self, terms: Option<String>) -> Self {
        self.terms_offered = terms;
        self
    }

    /// Attach the cross-listing metadata
    #[must_use]
    pub fn with_cross_listed(mut self, cross_listed: Option<String>) -> Self {
        self.cross_listed = cross_listed;
        self
    }
}

/// Combine the minimum and maximum unit columns into one units string
///
/// Equal bounds give a single value, different bounds give `"min-max"`, a lone
/// bound is used as is and no bound at all gives `"0"`.
#[must_use]
pub fn format_units(min: &str, max: &str) -> String {
    let (min, max) = (min.trim(), max.trim());
    match (min.is_empty(), max.is_empty()) {
        (true, true) => "0".to_string(),
        (false, true) => min.to_string(),
        (true, false) => max.to_string(),
        (false, false) if min == max => min.to_string(),
        (false, false) => format!("{min}-{max}"),
    }
}

/// Derive a display title from a description: its first 100 characters,
/// with `...` appended when truncated
#[must_use]
pub fn title_from_description(description: &str) -> String {
    const TITLE_CHARS: usize = 100;

    let mut chars = description.chars();
    let head: String = chars.by_ref().take(TITLE_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
