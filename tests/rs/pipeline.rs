//! End-to-end tests: CSV export -> graph -> overrides -> JSON document

use course_graph::core::assembler::{apply_overrides, GraphAssembler};
use course_graph::core::export::{read_graph_json, write_graph_json};
use course_graph::core::extract::{ExtractionMode, PrerequisiteExtractor};
use course_graph::core::fetch::{CourseSource, CsvSource, SkipReason};
use course_graph::core::models::CourseGraph;
use course_graph::core::overrides::OverrideTable;
use course_graph::core::report::GraphStats;
use course_graph::CatalogError;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CATALOG: &str = "\
Subject,Course Number,Course Description,Credits - Units - Minimum Units,Credits - Units - Maximum Units,Terms Offered,Cross-Listed Course(s)
COMPSCI,61A,\"An introduction to programming, abstraction and interpretation.\",4,4,\"Fall, Spring\",
COMPSCI,61B,\"Fundamental data structures. Prerequisites: COMPSCI 61A or equivalent.\",4,4,\"Fall, Spring\",
COMPSCI,70,\"Discrete mathematics and probability. Prerequisites: Sophomore standing; MATH 1A.\",4,4,Fall,
compsci,170,\"Efficient algorithms. Prerequisites: COMPSCI 61B and COMPSCI 70.\",4,4,Spring,
MATH,1A,\"Calculus. Formerly known as MATH 1AS. Prerequisites: None.\",4,4,,
MATH,1B,\"Continuation of MATH 1A.
Prerequisites: MATH 1A.\",4,4,,
STAT,20,\"Introduction to statistics.\",4,4,,
STAT,134,\"Probability. Prerequisites: MATH 1B; STAT 20 recommended.\",4,4,,
DATA,C8,\"Cross-listed code that is not course shaped.\",4,4,,
,99,\"Row without a subject.\",1,1,,
MATH,1A,\"Duplicate row.\",4,4,,
";

fn write_catalog(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("courses-report.csv");
    fs::write(&path, content).unwrap();
    path
}

fn assembler(mode: ExtractionMode) -> GraphAssembler {
    GraphAssembler::new(PrerequisiteExtractor::with_default_window().unwrap(), mode)
}

fn assert_well_formed(graph: &CourseGraph) {
    let ids = graph.course_ids();
    let mut seen = HashSet::new();
    for link in graph.links() {
        assert!(ids.contains(&link.source), "unknown source {}", link.source);
        assert!(ids.contains(&link.target), "unknown target {}", link.target);
        assert_ne!(link.source, link.target, "self edge on {}", link.source);
        assert!(
            seen.insert((link.source.clone(), link.target.clone())),
            "duplicate link {} -> {}",
            link.source,
            link.target
        );
    }
}

#[test]
fn csv_to_graph_extracts_validated_edges() {
    let temp = TempDir::new().unwrap();
    let report = CsvSource::new(write_catalog(temp.path(), CATALOG))
        .fetch()
        .unwrap();

    assert_eq!(report.records.len(), 8);
    assert_eq!(report.summary.skipped_for(SkipReason::InvalidIdentifier), 1);
    assert_eq!(report.summary.skipped_for(SkipReason::MissingIdentifier), 1);
    assert_eq!(report.summary.skipped_for(SkipReason::DuplicateIdentifier), 1);

    let assembler = GraphAssembler::with_defaults().unwrap();
    assert_eq!(assembler.mode(), ExtractionMode::Validated);
    let (graph, summary) = assembler.assemble_report(&report);
    assert_well_formed(&graph);

    assert!(graph.contains_edge("COMPSCI 61A", "COMPSCI 61B"));
    assert!(graph.contains_edge("MATH 1A", "COMPSCI 70"));
    assert!(graph.contains_edge("COMPSCI 61B", "COMPSCI 170"));
    assert!(graph.contains_edge("COMPSCI 70", "COMPSCI 170"));
    assert!(graph.contains_edge("MATH 1A", "MATH 1B"));
    assert!(graph.contains_edge("MATH 1B", "STAT 134"));

    // "Formerly known as MATH 1AS" is not a prerequisite and 1AS is no node
    assert!(graph.prerequisites_of("MATH 1A").is_empty());
    // The span runs to the first '.', past the ';'
    assert!(graph.contains_edge("STAT 20", "STAT 134"));
    assert_eq!(graph.link_count(), 7);

    assert_eq!(summary.extracted_links, graph.link_count());
    assert_eq!(graph.get_course("COMPSCI 170").unwrap().department, "COMPSCI");
}

#[test]
fn overrides_are_additive_and_idempotent() {
    let temp = TempDir::new().unwrap();
    let report = CsvSource::new(write_catalog(temp.path(), CATALOG))
        .fetch()
        .unwrap();
    let (mut graph, _) = assembler(ExtractionMode::Validated).assemble_report(&report);
    let before = graph.edge_set();

    let table = OverrideTable::builtin().unwrap();
    let added = apply_overrides(&mut graph, &table);
    let after_first = graph.edge_set();

    assert!(after_first.is_superset(&before));
    // Only COMPSCI 70 <- COMPSCI 61A is missing from the descriptions
    assert_eq!(added, 1);
    assert_eq!(after_first.len(), before.len() + 1);
    assert!(graph.contains_edge("COMPSCI 61A", "COMPSCI 70"));

    assert_eq!(apply_overrides(&mut graph, &table), 0);
    assert_eq!(graph.edge_set(), after_first);
    assert_well_formed(&graph);
}

#[test]
fn user_override_file_is_used() {
    let temp = TempDir::new().unwrap();
    let report = CsvSource::new(write_catalog(temp.path(), CATALOG))
        .fetch()
        .unwrap();
    let (mut graph, _) = assembler(ExtractionMode::Validated).assemble_report(&report);

    let table_path = temp.path().join("overrides.toml");
    fs::write(
        &table_path,
        "version = 1\n\n[prerequisites]\n\"STAT 20\" = [\"math 1a\"]\n",
    )
    .unwrap();
    let table = OverrideTable::load(&table_path).unwrap();

    assert_eq!(apply_overrides(&mut graph, &table), 1);
    assert!(graph.contains_edge("MATH 1A", "STAT 20"));
}

#[test]
fn loose_mode_keeps_graph_well_formed() {
    let temp = TempDir::new().unwrap();
    let report = CsvSource::new(write_catalog(temp.path(), CATALOG))
        .fetch()
        .unwrap();

    let (graph, _) = assembler(ExtractionMode::Loose).assemble_report(&report);
    assert_well_formed(&graph);
    assert!(graph.contains_edge("MATH 1A", "MATH 1B"));
}

#[test]
fn exported_document_round_trips() {
    let temp = TempDir::new().unwrap();
    let report = CsvSource::new(write_catalog(temp.path(), CATALOG))
        .fetch()
        .unwrap();
    let (mut graph, _) = assembler(ExtractionMode::Validated).assemble_report(&report);
    apply_overrides(&mut graph, &OverrideTable::builtin().unwrap());

    let output = temp.path().join("data/berkeley-courses-data.json");
    write_graph_json(&graph, &output).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let nodes = value["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 8);
    assert_eq!(nodes[0]["id"], "COMPSCI 61A");
    assert_eq!(nodes[0]["units"], "4");
    assert_eq!(nodes[0]["terms_offered"], "Fall, Spring");
    assert!(nodes[0].get("cross_listed").is_none());
    assert_eq!(value["links"].as_array().unwrap().len(), graph.link_count());

    let restored = read_graph_json(&output).unwrap();
    assert_eq!(restored.edge_set(), graph.edge_set());
    assert_eq!(
        GraphStats::from_graph(&restored),
        GraphStats::from_graph(&graph)
    );
}

#[test]
fn missing_required_column_aborts_before_output() {
    let temp = TempDir::new().unwrap();
    let path = write_catalog(temp.path(), "Department,Number\nMATH,1A\n");

    let err = CsvSource::new(path).fetch().unwrap_err();
    assert!(matches!(err, CatalogError::Csv { .. }));
    assert!(!temp.path().join("data").exists());
}
