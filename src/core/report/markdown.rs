//! Markdown run report
//!
//! Renders well in GitHub, GitLab, and VS Code.

use crate::core::fetch::SkipReason;
use crate::core::report::{ReportContext, ReportGenerator};
use std::fmt::Write;

/// Embedded Markdown report template
const MARKDOWN_TEMPLATE: &str = include_str!("templates/report.md");

/// Markdown report generator
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// Create a new Markdown reporter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Generate the department table
    fn generate_department_table(ctx: &ReportContext) -> String {
        if ctx.stats.top_departments.is_empty() {
            return "_No courses._".to_string();
        }

        let mut table = String::from("| Department | Courses |\n|---|---|\n");
        for (dept, count) in &ctx.stats.top_departments {
            let _ = writeln!(table, "| {dept} | {count} |");
        }
        table.trim_end().to_string()
    }

    /// Generate the accepted/skipped rows of the fetch table
    fn generate_fetch_rows(ctx: &ReportContext) -> String {
        let mut rows = String::new();
        let _ = writeln!(rows, "| Accepted | {} |", ctx.fetch.accepted);
        for reason in [
            SkipReason::MissingIdentifier,
            SkipReason::InvalidIdentifier,
            SkipReason::DuplicateIdentifier,
        ] {
            let _ = writeln!(
                rows,
                "| Skipped: {reason} | {} |",
                ctx.fetch.skipped_for(reason)
            );
        }
        rows.trim_end().to_string()
    }

    /// Generate the failed-unit list, empty when nothing failed
    fn generate_failed_units(ctx: &ReportContext) -> String {
        if ctx.fetch.failed_units.is_empty() {
            return String::new();
        }

        let mut list = String::from("### Failed Requests\n\n");
        for failed in &ctx.fetch.failed_units {
            let _ = writeln!(list, "- ⚠️ **{}**: {}", failed.unit, failed.error);
        }
        list
    }
}

impl ReportGenerator for MarkdownReporter {
    fn extension(&self) -> &'static str {
        "md"
    }

    fn render(&self, ctx: &ReportContext) -> String {
        let mut output = MARKDOWN_TEMPLATE.to_string();

        output = output.replace("{{source}}", ctx.source);
        output = output.replace("{{output}}", &ctx.output.display().to_string());
        output = output.replace("{{version}}", crate::get_version());

        output = output.replace("{{course_count}}", &ctx.stats.course_count.to_string());
        output = output.replace("{{link_count}}", &ctx.stats.link_count.to_string());
        output = output.replace(
            "{{extracted_links}}",
            &ctx.assembly.extracted_links.to_string(),
        );
        output = output.replace(
            "{{override_links}}",
            &ctx.assembly.override_links.to_string(),
        );
        output = output.replace(
            "{{dangling_dropped}}",
            &ctx.assembly.dangling_dropped.to_string(),
        );
        output = output.replace(
            "{{courses_with_prereqs}}",
            &ctx.stats.courses_with_prereqs.to_string(),
        );
        output = output.replace(
            "{{average_prereqs}}",
            &format!("{:.2}", ctx.stats.average_prereqs),
        );

        output = output.replace("{{top_departments}}", &Self::generate_department_table(ctx));
        output = output.replace("{{fetch_rows}}", &Self::generate_fetch_rows(ctx));
        output = output.replace("{{failed_units}}", &Self::generate_failed_units(ctx));

        format!("{}\n", output.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assembler::AssemblySummary;
    use crate::core::fetch::{FetchReport, RecordOutcome};
    use crate::core::models::{CourseGraph, CourseRecord, PrerequisiteEdge};
    use crate::core::report::GraphStats;
    use std::path::Path;
    use tempfile::TempDir;

    fn fixture() -> (FetchReport, AssemblySummary, GraphStats) {
        let mut fetch = FetchReport::new();
        fetch.record(RecordOutcome::Accepted(CourseRecord::new(
            "STAT 20".to_string(),
            String::new(),
            "4".to_string(),
            String::new(),
        )));
        fetch.record(RecordOutcome::skipped(SkipReason::InvalidIdentifier, "L&S 1"));
        fetch.fail_unit("PHYSICS", "HTTP error: 503");

        let mut graph = CourseGraph::new();
        for record in &fetch.records {
            graph.add_course(record.clone());
        }
        graph.add_course(CourseRecord::new(
            "STAT 134".to_string(),
            String::new(),
            "4".to_string(),
            String::new(),
        ));
        graph.add_edge(PrerequisiteEdge::new("STAT 20", "STAT 134"));

        let assembly = AssemblySummary {
            extracted_links: 0,
            dangling_dropped: 2,
            override_links: 1,
        };
        (fetch, assembly, GraphStats::from_graph(&graph))
    }

    #[test]
    fn test_render_fills_every_placeholder() {
        let (fetch, assembly, stats) = fixture();
        let ctx = ReportContext::new(
            "courses-report.csv",
            Path::new("data/courses.json"),
            &fetch.summary,
            &assembly,
            &stats,
        );
        let text = MarkdownReporter::new().render(&ctx);

        assert!(!text.contains("{{"));
        assert!(text.contains("**Source:** courses-report.csv"));
        assert!(text.contains("| Courses | 2 |"));
        assert!(text.contains("| Links from curated table | 1 |"));
        assert!(text.contains("| Mentions outside the catalog | 2 |"));
        assert!(text.contains("| STAT | 2 |"));
        assert!(text.contains("| Skipped: invalid identifier | 1 |"));
        assert!(text.contains("**PHYSICS**: HTTP error: 503"));
    }

    #[test]
    fn test_generate_writes_file() {
        let (fetch, assembly, stats) = fixture();
        let ctx = ReportContext::new(
            "api",
            Path::new("out.json"),
            &fetch.summary,
            &assembly,
            &stats,
        );
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("reports/run.md");

        let reporter = MarkdownReporter::new();
        reporter.generate(&ctx, &path).unwrap();

        assert_eq!(reporter.extension(), "md");
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.starts_with("# Course Prerequisite Graph Report"));
    }
}
