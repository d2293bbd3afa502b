//! Graph assembly: nodes from course records, edges from extraction and overrides

use super::extract::{extract_loose, ExtractionMode, PrerequisiteExtractor};
use super::fetch::FetchReport;
use super::models::{CourseGraph, CourseRecord, PrerequisiteEdge};
use super::overrides::OverrideTable;
use crate::error::Result;
use std::collections::HashSet;

/// Counts collected while assembling a graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblySummary {
    /// Edges produced by text extraction
    pub extracted_links: usize,
    /// Loose-mode mentions dropped because an endpoint is not a node
    pub dangling_dropped: usize,
    /// Edges added from the curated override table
    pub override_links: usize,
}

/// Builds a [`CourseGraph`] from course records
#[derive(Debug, Clone)]
pub struct GraphAssembler {
    extractor: PrerequisiteExtractor,
    mode: ExtractionMode,
}

impl GraphAssembler {
    /// Create an assembler using `extractor` in the given mode
    #[must_use]
    pub const fn new(extractor: PrerequisiteExtractor, mode: ExtractionMode) -> Self {
        Self { extractor, mode }
    }

    /// Create a validated-mode assembler with the default window
    ///
    /// # Errors
    /// Returns an error if the extraction patterns fail to compile
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(
            PrerequisiteExtractor::with_default_window()?,
            ExtractionMode::Validated,
        ))
    }

    /// Extraction mode in use
    #[must_use]
    pub const fn mode(&self) -> ExtractionMode {
        self.mode
    }

    /// Build the graph: add every record as a node, then extract edges
    ///
    /// Duplicate record ids keep the first record. Edges always run
    /// `prerequisite -> course`, never point a course at itself, and only
    /// connect known nodes.
    #[must_use]
    pub fn assemble(&self, records: Vec<CourseRecord>) -> (CourseGraph, AssemblySummary) {
        let mut graph = CourseGraph::new();
        for record in records {
            if !graph.add_course(record) {
                crate::debug!("Duplicate course dropped during assembly");
            }
        }

        let valid_ids = graph.course_ids();
        let mut summary = AssemblySummary::default();
        let mut edges = Vec::new();

        for course in graph.courses() {
            let prereqs = match self.mode {
                ExtractionMode::Validated => self.extractor.extract(&course.description, &valid_ids),
                ExtractionMode::Loose => extract_loose(&course.description),
            };

            for prereq in prereqs {
                if prereq == course.id {
                    continue;
                }
                if !valid_ids.contains(&prereq) {
                    summary.dangling_dropped += 1;
                    continue;
                }
                edges.push(PrerequisiteEdge::new(prereq, course.id.clone()));
            }
        }

        for edge in edges {
            if graph.add_edge(edge) {
                summary.extracted_links += 1;
            }
        }

        crate::info!(
            "Extracted {} prerequisite relationships ({} mode)",
            summary.extracted_links,
            self.mode
        );
        if summary.dangling_dropped > 0 {
            crate::info!(
                "Dropped {} mentions of courses outside the catalog",
                summary.dangling_dropped
            );
        }

        (graph, summary)
    }

    /// Assemble from a fetch report's accepted records
    #[must_use]
    pub fn assemble_report(&self, report: &FetchReport) -> (CourseGraph, AssemblySummary) {
        self.assemble(report.records.clone())
    }
}

/// Add curated override edges to a graph
///
/// An edge is added only when both courses are nodes and the exact
/// `(source, target)` pair is not already present. Existing edges are never
/// touched, so applying the same table twice adds nothing the second time.
///
/// # Returns
/// The number of edges added
pub fn apply_overrides(graph: &mut CourseGraph, table: &OverrideTable) -> usize {
    let mut existing: HashSet<(String, String)> = graph.edge_set();
    let mut added = 0;

    for (target, sources) in table.iter() {
        if !graph.contains_course(target) {
            continue;
        }
        for source in sources {
            if source == target || !graph.contains_course(source) {
                continue;
            }
            if existing.insert((source.clone(), target.to_string()))
                && graph.add_edge(PrerequisiteEdge::new(source.clone(), target))
            {
                added += 1;
            }
        }
    }

    if added > 0 {
        crate::info!("Added {added} well-known prerequisite relationships");
    }
    added
}
