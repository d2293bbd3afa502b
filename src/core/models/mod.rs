//! Data models for `course-graph`

pub mod course;
pub mod graph;

pub use course::CourseRecord;
pub use graph::{CourseGraph, PrerequisiteEdge};
