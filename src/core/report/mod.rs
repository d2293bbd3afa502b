//! Run statistics and reports
//!
//! [`GraphStats`] summarizes an assembled graph; it is logged after every build.
//! A [`ReportContext`] bundles the statistics with the fetch and assembly
//! summaries so a [`ReportGenerator`] can write them to a file.

pub mod markdown;

pub use markdown::MarkdownReporter;

use crate::core::assembler::AssemblySummary;
use crate::core::fetch::FetchSummary;
use crate::core::models::CourseGraph;
use crate::error::Result;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Number of departments listed in the statistics
pub const TOP_DEPARTMENTS: usize = 15;

/// Summary statistics of a course graph
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStats {
    /// Number of course nodes
    pub course_count: usize,
    /// Number of prerequisite links
    pub link_count: usize,
    /// Departments with the most courses, largest first
    pub top_departments: Vec<(String, usize)>,
    /// Courses that are the target of at least one link
    pub courses_with_prereqs: usize,
    /// Links per course node
    pub average_prereqs: f64,
}

impl GraphStats {
    /// Compute statistics for a graph
    ///
    /// Departments with equal counts are ordered by name.
    #[must_use]
    pub fn from_graph(graph: &CourseGraph) -> Self {
        let mut departments: HashMap<&str, usize> = HashMap::new();
        for course in graph.courses() {
            *departments.entry(course.department.as_str()).or_default() += 1;
        }

        let mut top_departments: Vec<(String, usize)> = departments
            .into_iter()
            .map(|(dept, count)| (dept.to_string(), count))
            .collect();
        top_departments.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_departments.truncate(TOP_DEPARTMENTS);

        let courses_with_prereqs = graph
            .links()
            .iter()
            .map(|link| link.target.as_str())
            .collect::<HashSet<_>>()
            .len();

        let course_count = graph.course_count();
        let link_count = graph.link_count();
        #[allow(clippy::cast_precision_loss)]
        let average_prereqs = if course_count == 0 {
            0.0
        } else {
            link_count as f64 / course_count as f64
        };

        Self {
            course_count,
            link_count,
            top_departments,
            courses_with_prereqs,
            average_prereqs,
        }
    }

    /// Write the statistics to the log
    pub fn log(&self) {
        crate::info!(
            "Graph has {} courses and {} prerequisite links",
            self.course_count,
            self.link_count
        );
        crate::info!("Top departments by course count:");
        for (dept, count) in &self.top_departments {
            crate::info!("  {dept}: {count} courses");
        }
        crate::info!("Courses with prerequisites: {}", self.courses_with_prereqs);
        crate::info!(
            "Average prerequisites per course: {:.2}",
            self.average_prereqs
        );
    }
}

/// Everything a run report shows
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    /// Where the records came from (file path or endpoint)
    pub source: &'a str,
    /// Path the graph document was written to
    pub output: &'a Path,
    /// Fetch summary of the source
    pub fetch: &'a FetchSummary,
    /// Assembly counts
    pub assembly: &'a AssemblySummary,
    /// Graph statistics
    pub stats: &'a GraphStats,
}

impl<'a> ReportContext<'a> {
    /// Create a new report context
    #[must_use]
    pub const fn new(
        source: &'a str,
        output: &'a Path,
        fetch: &'a FetchSummary,
        assembly: &'a AssemblySummary,
        stats: &'a GraphStats,
    ) -> Self {
        Self {
            source,
            output,
            fetch,
            assembly,
            stats,
        }
    }
}

/// Trait for report generators
pub trait ReportGenerator {
    /// File extension of the generated report
    fn extension(&self) -> &'static str;

    /// Generate report content as a string
    fn render(&self, ctx: &ReportContext) -> String;

    /// Generate a report to a file, creating parent directories as needed
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be written
    fn generate(&self, ctx: &ReportContext, output_path: &Path) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| crate::CatalogError::io(parent, e))?;
            }
        }
        std::fs::write(output_path, self.render(ctx))
            .map_err(|e| crate::CatalogError::io(output_path, e))
    }
}
