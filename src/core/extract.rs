//! Prerequisite extraction from free-text course descriptions
//!
//! Two strategies are available:
//!
//! - [`PrerequisiteExtractor::extract`] locates the prerequisite span of a
//!   description and keeps only course codes found in a valid-identifier set.
//!   This is the primary strategy.
//! - [`extract_loose`] scans the whole description with a few
//!   `Prerequisite`/conjunction patterns and does no validation. It is meant for
//!   the case where no valid-identifier set exists yet.

use super::normalize::normalize_course_id;
use crate::error::Result;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Default number of characters scanned after a `Prerequisites:` marker
pub const DEFAULT_WINDOW: usize = 500;

/// Upper bound on the scan window
pub const MAX_WINDOW: usize = 2000;

/// Section markers that end a prerequisite span
const SECTION_MARKERS: &str = "corequisites?|enrollment|credit|formerly|note|hours";

/// Course-code shaped tokens. Case-sensitive: lowercase mentions are ignored.
static COURSE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z]{2,10})\s*([0-9]{1,3}[A-Z]{0,3})\b").expect("valid course code pattern")
});

/// Whole-description patterns used by [`extract_loose`]
static LOOSE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)prerequisites?:?\s*([A-Z]{2,4}\s*[0-9]{1,3}[A-Z]?)",
        r"(?i)prerequisites?:?\s*([A-Z]{2,4}\s*[0-9]{1,3})",
        r"(?i)([A-Z]{2,4}\s*[0-9]{1,3}[A-Z]?)\s*or\s*([A-Z]{2,4}\s*[0-9]{1,3}[A-Z]?)",
        r"(?i)([A-Z]{2,4}\s*[0-9]{1,3})\s*and\s*([A-Z]{2,4}\s*[0-9]{1,3})",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid loose prerequisite pattern"))
    .collect()
});

/// Which extraction strategy the assembler runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Bounded prerequisite span, codes checked against the node set
    #[default]
    Validated,
    /// Whole-description scan, no validation
    Loose,
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "validated" | "strict" => Ok(Self::Validated),
            "loose" => Ok(Self::Loose),
            _ => Err(format!("Unknown extraction mode: {s}")),
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validated => write!(f, "validated"),
            Self::Loose => write!(f, "loose"),
        }
    }
}

/// Validated prerequisite extractor
///
/// Holds the span patterns, tried in order:
/// 1. `Prerequisites:` up to and including the next `.`
/// 2. `Prerequisites:` up to and including the next `;`
/// 3. `Prerequisites:` then at most `window` characters up to a section marker
///    (`Corequisites`, `Enrollment`, `Credit`, `Formerly`, `NOTE`, `Hours`)
#[derive(Debug, Clone)]
pub struct PrerequisiteExtractor {
    span_patterns: Vec<Regex>,
    window: usize,
}

impl PrerequisiteExtractor {
    /// Build an extractor scanning at most `window` characters after the marker
    ///
    /// The window is clamped to `1..=MAX_WINDOW`.
    ///
    /// # Errors
    /// Returns an error if a span pattern fails to compile
    pub fn new(window: usize) -> Result<Self> {
        let window = window.clamp(1, MAX_WINDOW);
        let span_patterns = vec![
            Regex::new(r"(?is)prerequisites?:([^.]+\.)")?,
            Regex::new(r"(?is)prerequisites?:([^;]+;)")?,
            Regex::new(&format!(
                r"(?is)prerequisites?:(.{{0,{window}}}?)(?:{SECTION_MARKERS})"
            ))?,
        ];
        Ok(Self {
            span_patterns,
            window,
        })
    }

    /// Build an extractor with [`DEFAULT_WINDOW`]
    ///
    /// # Errors
    /// Returns an error if a span pattern fails to compile
    pub fn with_default_window() -> Result<Self> {
        Self::new(DEFAULT_WINDOW)
    }

    /// Scan window in characters
    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Locate the prerequisite span of a description
    ///
    /// Falls back to the whole description when no pattern matches or the
    /// matched span is blank.
    #[must_use]
    pub fn prerequisite_span<'a>(&self, description: &'a str) -> &'a str {
        self.span_patterns
            .iter()
            .find_map(|pattern| pattern.captures(description))
            .and_then(|caps| caps.get(1))
            .map(|span| span.as_str())
            .filter(|span| !span.trim().is_empty())
            .unwrap_or(description)
    }

    /// Extract the prerequisite course ids named by a description
    ///
    /// Every returned id is a member of `valid_ids`. An empty description
    /// yields an empty set.
    #[must_use]
    pub fn extract(&self, description: &str, valid_ids: &HashSet<String>) -> BTreeSet<String> {
        if description.trim().is_empty() {
            return BTreeSet::new();
        }

        let span = self.prerequisite_span(description);
        course_codes(span)
            .filter(|id| valid_ids.contains(id))
            .collect()
    }
}

/// Normalized course codes mentioned in a piece of text, in order of appearance
fn course_codes(text: &str) -> impl Iterator<Item = String> + '_ {
    COURSE_CODE
        .captures_iter(text)
        .filter_map(|caps| normalize_course_id(&format!("{} {}", &caps[1], &caps[2])))
}

/// Extract prerequisite codes by scanning the whole description, without validation
///
/// Matches are normalized; matches that do not normalize are dropped. Lower
/// precision than [`PrerequisiteExtractor::extract`].
#[must_use]
pub fn extract_loose(description: &str) -> BTreeSet<String> {
    if description.trim().is_empty() {
        return BTreeSet::new();
    }

    LOOSE_PATTERNS
        .iter()
        .flat_map(|pattern| pattern.captures_iter(description))
        .flat_map(|caps| {
            caps.iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str().to_string())
                .collect::<Vec<_>>()
        })
        .filter_map(|raw| normalize_course_id(&raw))
        .collect()
}
