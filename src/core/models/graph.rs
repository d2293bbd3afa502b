//! Course prerequisite graph

use super::CourseRecord;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A directed prerequisite relationship: `source` must be taken before `target`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrerequisiteEdge {
    /// Prerequisite course id
    pub source: String,
    /// Course that requires `source`
    pub target: String,
}

impl PrerequisiteEdge {
    /// Create a new edge
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Node/link graph of courses and their prerequisites
///
/// Nodes keep insertion order and have unique ids. Links keep insertion order.
/// [`add_edge`](Self::add_edge) only accepts edges between known nodes, so the
/// graph never holds a dangling link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseGraph {
    /// Courses in insertion order
    nodes: Vec<CourseRecord>,

    /// Prerequisite edges in insertion order
    links: Vec<PrerequisiteEdge>,

    /// Maps course id -> position in `nodes`
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl CourseGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a course node
    ///
    /// # Returns
    /// `true` if the course was added, `false` if a course with that id already exists
    pub fn add_course(&mut self, course: CourseRecord) -> bool {
        if self.index.contains_key(&course.id) {
            return false;
        }
        self.index.insert(course.id.clone(), self.nodes.len());
        self.nodes.push(course);
        true
    }

    /// Append an edge if both endpoints are known nodes
    ///
    /// Exact duplicates are not checked here; callers that need set semantics
    /// use [`contains_edge`](Self::contains_edge) or an edge set of their own.
    ///
    /// # Returns
    /// `true` if the edge was appended
    pub fn add_edge(&mut self, edge: PrerequisiteEdge) -> bool {
        if !self.contains_course(&edge.source) || !self.contains_course(&edge.target) {
            return false;
        }
        self.links.push(edge);
        true
    }

    /// Check whether a course id is a node of the graph
    #[must_use]
    pub fn contains_course(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Check whether the exact `(source, target)` edge is present
    #[must_use]
    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        self.links
            .iter()
            .any(|edge| edge.source == source && edge.target == target)
    }

    /// Look up a course by id
    #[must_use]
    pub fn get_course(&self, id: &str) -> Option<&CourseRecord> {
        self.index.get(id).map(|&pos| &self.nodes[pos])
    }

    /// All courses in insertion order
    #[must_use]
    pub fn courses(&self) -> &[CourseRecord] {
        &self.nodes
    }

    /// All edges in insertion order
    #[must_use]
    pub fn links(&self) -> &[PrerequisiteEdge] {
        &self.links
    }

    /// Set of all course ids, used as the valid-identifier set for extraction
    #[must_use]
    pub fn course_ids(&self) -> HashSet<String> {
        self.index.keys().cloned().collect()
    }

    /// Set of all `(source, target)` pairs currently present
    #[must_use]
    pub fn edge_set(&self) -> HashSet<(String, String)> {
        self.links
            .iter()
            .map(|edge| (edge.source.clone(), edge.target.clone()))
            .collect()
    }

    /// Prerequisites recorded for a course, in insertion order
    #[must_use]
    pub fn prerequisites_of(&self, id: &str) -> Vec<&str> {
        self.links
            .iter()
            .filter(|edge| edge.target == id)
            .map(|edge| edge.source.as_str())
            .collect()
    }

    /// Number of courses
    #[must_use]
    pub fn course_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Rebuild the id index after deserialization
    pub(crate) fn reindex(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(pos, course)| (course.id.clone(), pos))
            .collect();
    }
}

impl std::fmt::Display for CourseGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Prerequisite graph ({} courses, {} links):",
            self.nodes.len(),
            self.links.len()
        )?;
        writeln!(f)?;

        let mut incoming: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &self.links {
            incoming
                .entry(edge.target.as_str())
                .or_default()
                .push(edge.source.as_str());
        }

        let mut sorted: Vec<&str> = self.nodes.iter().map(|c| c.id.as_str()).collect();
        sorted.sort_unstable();

        for id in sorted {
            match incoming.get(id) {
                Some(prereqs) => writeln!(f, "  {id} ← {}", prereqs.join(", "))?,
                None => writeln!(f, "  {id} ← (no prerequisites)")?,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: &str) -> CourseRecord {
        CourseRecord::new(id.to_string(), id.to_string(), "4".to_string(), String::new())
    }

    #[test]
    fn test_graph_creation() {
        let graph = CourseGraph::new();
        assert_eq!(graph.course_count(), 0);
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_duplicate_course_rejected() {
        let mut graph = CourseGraph::new();
        assert!(graph.add_course(course("COMPSCI 61A")));
        assert!(!graph.add_course(course("COMPSCI 61A")));
        assert_eq!(graph.course_count(), 1);
    }

    #[test]
    fn test_add_edge_between_known_nodes() {
        let mut graph = CourseGraph::new();
        graph.add_course(course("COMPSCI 61A"));
        graph.add_course(course("COMPSCI 61B"));

        assert!(graph.add_edge(PrerequisiteEdge::new("COMPSCI 61A", "COMPSCI 61B")));
        assert!(graph.contains_edge("COMPSCI 61A", "COMPSCI 61B"));
        assert!(!graph.contains_edge("COMPSCI 61B", "COMPSCI 61A"));
        assert_eq!(graph.prerequisites_of("COMPSCI 61B"), vec!["COMPSCI 61A"]);
    }

    #[test]
    fn test_dangling_edge_rejected() {
        let mut graph = CourseGraph::new();
        graph.add_course(course("COMPSCI 61B"));

        assert!(!graph.add_edge(PrerequisiteEdge::new("CS 61A", "COMPSCI 61B")));
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_nodes_keep_insertion_order() {
        let mut graph = CourseGraph::new();
        graph.add_course(course("STAT 20"));
        graph.add_course(course("DATA 8"));
        graph.add_course(course("MATH 1A"));

        let ids: Vec<&str> = graph.courses().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["STAT 20", "DATA 8", "MATH 1A"]);
        assert_eq!(graph.get_course("DATA 8").map(|c| c.department.as_str()), Some("DATA"));
    }

    #[test]
    fn test_reindex_after_deserialize() {
        let mut graph = CourseGraph::new();
        graph.add_course(course("MATH 1A"));
        graph.add_course(course("MATH 1B"));
        graph.add_edge(PrerequisiteEdge::new("MATH 1A", "MATH 1B"));

        let json = serde_json::to_string(&graph).unwrap();
        let mut restored: CourseGraph = serde_json::from_str(&json).unwrap();
        assert!(!restored.contains_course("MATH 1A"));
        restored.reindex();
        assert!(restored.contains_course("MATH 1A"));
        assert_eq!(restored.link_count(), 1);
    }

    #[test]
    fn test_graph_display() {
        let mut graph = CourseGraph::new();
        graph.add_course(course("MATH 1A"));
        graph.add_course(course("MATH 1B"));
        graph.add_edge(PrerequisiteEdge::new("MATH 1A", "MATH 1B"));

        let display = format!("{graph}");
        assert!(display.contains("Prerequisite graph"));
        assert!(display.contains("MATH 1B ← MATH 1A"));
        assert!(display.contains("MATH 1A ← (no prerequisites)"));
    }

    #[test]
    fn test_graph_display_lists_every_prerequisite_in_link_order() {
        let mut graph = CourseGraph::new();
        for id in ["COMPSCI 170", "COMPSCI 61B", "COMPSCI 70", "MATH 1A"] {
            graph.add_course(course(id));
        }
        graph.add_edge(PrerequisiteEdge::new("COMPSCI 61B", "COMPSCI 170"));
        graph.add_edge(PrerequisiteEdge::new("MATH 1A", "COMPSCI 70"));
        graph.add_edge(PrerequisiteEdge::new("COMPSCI 70", "COMPSCI 170"));

        let display = format!("{graph}");
        let lines: Vec<&str> = display.lines().skip(2).collect();
        assert_eq!(
            lines,
            vec![
                "  COMPSCI 170 ← COMPSCI 61B, COMPSCI 70",
                "  COMPSCI 61B ← (no prerequisites)",
                "  COMPSCI 70 ← MATH 1A",
                "  MATH 1A ← (no prerequisites)",
            ]
        );
        assert_eq!(graph.prerequisites_of("COMPSCI 170"), vec!["COMPSCI 61B", "COMPSCI 70"]);
    }
}
