//! Export the course graph as a node/link JSON document
//!
//! The document has two top-level keys: `nodes` (course objects) and `links`
//! (`{source, target}` objects). Consumers should tolerate additional fields.

use super::models::CourseGraph;
use crate::error::{CatalogError, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Render the graph as pretty-printed JSON
///
/// # Errors
/// Returns an error if serialization fails
pub fn to_json_string(graph: &CourseGraph) -> Result<String> {
    Ok(serde_json::to_string_pretty(graph)?)
}

/// Write the graph to `path`, creating parent directories as needed
///
/// # Errors
/// Returns an error if the directory or file cannot be created or written
pub fn write_graph_json(graph: &CourseGraph, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;
        }
    }

    let file = File::create(path).map_err(|e| CatalogError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, graph)?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| CatalogError::io(path, e))?;

    crate::info!(
        "Wrote {} courses and {} links to {}",
        graph.course_count(),
        graph.link_count(),
        path.display()
    );
    Ok(())
}

/// Read a previously exported document back into a graph
///
/// # Errors
/// Returns an error if the file cannot be read, is not a node/link document,
/// or has a link whose endpoint is not a node
pub fn read_graph_json(path: &Path) -> Result<CourseGraph> {
    let content = fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
    let mut graph: CourseGraph = serde_json::from_str(&content)?;
    graph.reindex();

    if let Some(link) = graph
        .links()
        .iter()
        .find(|link| !graph.contains_course(&link.source) || !graph.contains_course(&link.target))
    {
        return Err(CatalogError::validation(format!(
            "{}: link {} -> {} references an unknown course",
            path.display(),
            link.source,
            link.target
        )));
    }
    Ok(graph)
}
