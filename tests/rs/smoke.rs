//! Integration smoke tests for `course_graph`

use course_graph::core::normalize::normalize_course_id;
use course_graph::get_version;

#[test]
fn version_is_not_empty() {
    let v = get_version();
    assert!(!v.trim().is_empty());
}

#[test]
fn normalizer_is_reachable_from_the_crate_root() {
    assert_eq!(
        normalize_course_id("  compsci   61a ").as_deref(),
        Some("COMPSCI 61A")
    );
}
