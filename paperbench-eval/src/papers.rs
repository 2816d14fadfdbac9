//! Document reference resolution.
//!
//! Evaluation needs to know which source documents a dataset was built
//! from. Explicit paths always win; otherwise the dataset container itself
//! is consulted: a JSON `papers` field, or the `Papers:` header line that
//! generation writes as the first non-empty line of a text export.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Header marker for text-container paper lists.
pub const PAPERS_MARKER: &str = "Papers:";

/// Errors that can occur while resolving document references.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PapersError {
    /// Failed to read the dataset file or absolutize a path
    #[error("Failed to read document references: {0}")]
    Io(#[from] std::io::Error),

    /// The JSON container could not be parsed
    #[error("Failed to parse dataset: {0}")]
    Parse(String),
}

/// Resolve the document set for a run.
///
/// - Non-empty `explicit` paths are absolutized and returned as-is.
/// - Otherwise the dataset container is inspected per its kind.
/// - An empty result is the caller's problem: the evaluation orchestrator
///   treats zero resolved documents as a fatal configuration error.
pub fn resolve(explicit: &[PathBuf], dataset_path: &Path) -> Result<Vec<PathBuf>, PapersError> {
    if !explicit.is_empty() {
        return absolutize_all(explicit.iter().map(PathBuf::as_path));
    }

    let ext = dataset_path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => papers_from_json(&std::fs::read_to_string(dataset_path)?),
        "txt" | "md" => papers_from_text(&std::fs::read_to_string(dataset_path)?),
        _ => Ok(Vec::new()),
    }
}

/// Read a non-empty `papers` field from a JSON container, if present.
pub fn papers_from_json(content: &str) -> Result<Vec<PathBuf>, PapersError> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| PapersError::Parse(e.to_string()))?;

    let Some(list) = value.get("papers").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    absolutize_all(
        list.iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Path::new),
    )
}

/// Read a `Papers:` header from a line-oriented container.
///
/// Only the FIRST non-empty line is considered; if it does not carry the
/// marker, the scan stops and the result is empty.
pub fn papers_from_text(content: &str) -> Result<Vec<PathBuf>, PapersError> {
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(rest) = line.strip_prefix(PAPERS_MARKER) else {
            break;
        };
        return absolutize_all(
            rest.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Path::new),
        );
    }
    Ok(Vec::new())
}

/// Expand each path to absolute form, preserving order.
pub fn absolutize_all<'a>(
    paths: impl Iterator<Item = &'a Path>,
) -> Result<Vec<PathBuf>, PapersError> {
    paths
        .map(|p| std::path::absolute(p).map_err(PapersError::Io))
        .collect()
}
