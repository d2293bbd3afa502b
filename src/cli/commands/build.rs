//! Graph build command handler
//!
//! Runs fetch -> assemble -> overrides -> export for the `csv` and `api`
//! commands and optionally writes a run report.

use course_graph::config::Config;
use course_graph::core::assembler::{apply_overrides, GraphAssembler};
use course_graph::core::export::write_graph_json;
use course_graph::core::extract::{ExtractionMode, PrerequisiteExtractor};
use course_graph::core::fetch::{ApiSource, ApiSourceConfig, CourseSource, CsvSource};
use course_graph::core::overrides::OverrideTable;
use course_graph::core::report::{GraphStats, MarkdownReporter, ReportContext, ReportGenerator};
use course_graph::{debug, error, info, CatalogError, Result};
use std::path::{Path, PathBuf};

/// Per-run options that are not config values
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Apply the curated prerequisite table after extraction
    pub use_overrides: bool,
    /// Write a Markdown run report
    pub report: bool,
    /// Print progress to stdout
    pub verbose: bool,
}

/// Build the graph from a CSV export
///
/// `input` falls back to the config `csv_file`.
pub fn run_csv(input: Option<&Path>, config: &Config, options: BuildOptions) {
    let path = input.map_or_else(|| PathBuf::from(&config.paths.csv_file), Path::to_path_buf);
    run(&CsvSource::new(path), "csv", config, options);
}

/// Build the graph from the remote class-search API
pub fn run_api(config: &Config, options: BuildOptions) {
    match ApiSource::new(ApiSourceConfig::from_config(&config.fetch)) {
        Ok(source) => run(&source, "api", config, options),
        Err(e) => fail(&e),
    }
}

fn run(source: &dyn CourseSource, label: &str, config: &Config, options: BuildOptions) {
    match build(source, label, config, options) {
        Ok(stats) => {
            println!(
                "✓ Processed {} courses with {} prerequisite links",
                stats.course_count, stats.link_count
            );
            println!("✓ Data saved to {}", config.paths.output_file);
        }
        Err(e) => {
            error!("Build from {} failed: {e}", source.describe());
            fail(&e);
        }
    }
}

fn fail(e: &CatalogError) -> ! {
    eprintln!("✗ {e}");
    eprintln!("✗ Processed 0 courses; nothing was written");
    std::process::exit(1);
}

fn build(
    source: &dyn CourseSource,
    label: &str,
    config: &Config,
    options: BuildOptions,
) -> Result<GraphStats> {
    let mode: ExtractionMode = config.extract.mode.parse().map_err(CatalogError::config)?;
    let assembler = GraphAssembler::new(PrerequisiteExtractor::new(config.extract.window)?, mode);
    debug!("Extracting prerequisites in {} mode", assembler.mode());

    let mut fetched = source.fetch()?;
    if options.verbose {
        println!(
            "✓ Loaded {} courses from {}",
            fetched.records.len(),
            source.describe()
        );
    } else {
        info!("Loaded {} courses from {}", fetched.records.len(), source.describe());
    }

    let (mut graph, mut assembly) = assembler.assemble(std::mem::take(&mut fetched.records));

    if options.use_overrides {
        let table = load_override_table(config)?;
        assembly.override_links = apply_overrides(&mut graph, &table);
    }

    let output = PathBuf::from(&config.paths.output_file);
    write_graph_json(&graph, &output)?;

    let stats = GraphStats::from_graph(&graph);
    stats.log();

    if options.report {
        let reporter = MarkdownReporter::new();
        let describe = source.describe();
        let ctx = ReportContext::new(&describe, &output, &fetched.summary, &assembly, &stats);
        let report_path = Path::new(&config.paths.reports_dir)
            .join(format!("coursegraph-{label}.{}", reporter.extension()));
        reporter.generate(&ctx, &report_path)?;
        println!("✓ Report generated: {}", report_path.display());
    }

    Ok(stats)
}

/// The configured override table, or the built-in one when none is set
fn load_override_table(config: &Config) -> Result<OverrideTable> {
    if config.paths.overrides_file.is_empty() {
        OverrideTable::builtin()
    } else {
        let path = Path::new(&config.paths.overrides_file);
        info!("Using prerequisite overrides from {}", path.display());
        OverrideTable::load(path)
    }
}
