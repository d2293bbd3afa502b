//! Course identifier normalization
//!
//! Canonical identifiers look like `"COMPSCI 61A"`: a 2–10 letter department,
//! one space, then 1–3 digits with up to 3 trailing letters.

use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]{2,10})\s*([0-9]{1,3}[A-Z]{0,3})$").expect("valid identifier pattern")
});

/// Normalize a raw department + number string to `"DEPT NUM"`
///
/// Whitespace is collapsed and letters are upper-cased before matching.
///
/// # Returns
/// The canonical identifier, or `None` when the input is not course-code shaped
///
/// # Examples
/// ```
/// use course_graph::core::normalize::normalize_course_id;
///
/// assert_eq!(normalize_course_id("  compsci   61a "), Some("COMPSCI 61A".to_string()));
/// assert_eq!(normalize_course_id("Intro to CS"), None);
/// ```
#[must_use]
pub fn normalize_course_id(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let upper = collapsed.to_uppercase();

    IDENTIFIER
        .captures(&upper)
        .map(|caps| format!("{} {}", &caps[1], &caps[2]))
}

/// Normalize a department code and course number given separately
#[must_use]
pub fn normalize_parts(department: &str, number: &str) -> Option<String> {
    normalize_course_id(&format!("{department} {number}"))
}

/// Department code of a normalized identifier (its first whitespace-delimited token)
#[must_use]
pub fn department_of(id: &str) -> &str {
    id.split_whitespace().next().unwrap_or_default()
}
