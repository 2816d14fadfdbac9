//! Dataset loading and normalization.
//!
//! A dataset arrives in one of two container shapes: a JSON file (a bare
//! array of QA objects, or an object with an `items` array and optional
//! `papers` list) or a line-oriented text file carrying labeled
//! `Question:` / `Answer:` blocks. Either way, [`Dataset::load`] produces
//! the same thing: an ordered sequence of [`QaItem`]s with stable ids.
//!
//! Authoring bugs fail fast: a malformed item aborts the load naming the
//! offending index instead of silently dropping the item.

use paperbench_core::extract::extract_any;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors that can occur when loading datasets.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DatasetError {
    /// Failed to read the dataset file
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    /// The container could not be parsed at all
    #[error("Failed to parse dataset: {0}")]
    Parse(String),

    /// The file extension names no supported container kind
    #[error("Unsupported dataset format `{0}`: expected .json, .txt, or .md")]
    UnsupportedFormat(String),

    /// One item is malformed; the index pinpoints it for the dataset author
    #[error("Malformed item at index {index}: {reason}")]
    MalformedItem { index: usize, reason: String },

    /// The container parsed but produced zero QA items
    #[error("Dataset contains no QA items")]
    NoItems,
}

/// A single benchmark item: question, gold answer, stable id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaItem {
    /// Identifier, unique within the dataset
    pub id: String,
    /// The question text
    pub question: String,
    /// The gold answer the model's response is graded against
    pub answer: String,
}

/// A normalized benchmark dataset.
///
/// Constructed once per run (by [`Dataset::load`] or the generation
/// orchestrator) and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Source documents this dataset was generated from (may be empty;
    /// the papers resolver is the authority at evaluation time)
    #[serde(default)]
    pub papers: Vec<PathBuf>,
    /// Ordered QA items
    pub items: Vec<QaItem>,
}

impl Dataset {
    /// Load a dataset, dispatching on the container kind.
    pub async fn load(path: &Path) -> Result<Self, DatasetError> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match ext.as_str() {
            "json" => Self::from_json_str(&fs::read_to_string(path).await?),
            "txt" | "md" => Self::from_text(&fs::read_to_string(path).await?),
            other => Err(DatasetError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Parse a structured JSON container.
    ///
    /// Accepts a bare array of QA objects or an object with an `items`
    /// array (optionally alongside `papers`).
    pub fn from_json_str(content: &str) -> Result<Self, DatasetError> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| DatasetError::Parse(e.to_string()))?;

        let (papers, raw_items) = match value {
            Value::Array(items) => (Vec::new(), items),
            Value::Object(map) => {
                let papers = map
                    .get("papers")
                    .and_then(Value::as_array)
                    .map(|list| {
                        list.iter()
                            .filter_map(Value::as_str)
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(PathBuf::from)
                            .collect()
                    })
                    .unwrap_or_default();

                let items = map
                    .get("items")
                    .and_then(Value::as_array)
                    .cloned()
                    .ok_or_else(|| {
                        DatasetError::Parse(
                            "expected a list of QA objects or an object with an `items` list"
                                .to_string(),
                        )
                    })?;

                (papers, items)
            }
            _ => {
                return Err(DatasetError::Parse(
                    "expected a list of QA objects or an object with an `items` list".to_string(),
                ))
            }
        };

        let mut items = Vec::with_capacity(raw_items.len());
        for (index, raw) in raw_items.iter().enumerate() {
            items.push(qa_item_from_value(index, raw)?);
        }

        if items.is_empty() {
            return Err(DatasetError::NoItems);
        }

        Ok(Self { papers, items })
    }

    /// Parse a line-oriented text container.
    ///
    /// Tries the tolerant scanner first, then the strict literal-label
    /// split. A `Papers:` header line is harmless noise here; the papers
    /// resolver reads it separately.
    pub fn from_text(content: &str) -> Result<Self, DatasetError> {
        let (pairs, strategy) = extract_any(content).ok_or(DatasetError::NoItems)?;
        log::debug!(
            "Text dataset parsed via {:?} strategy ({} items)",
            strategy,
            pairs.len()
        );

        let items = pairs
            .into_iter()
            .enumerate()
            .map(|(i, pair)| QaItem {
                id: format!("Q{}", i + 1),
                question: pair.question,
                answer: pair.answer,
            })
            .collect();

        Ok(Self {
            papers: Vec::new(),
            items,
        })
    }
}

/// Validate one element of a JSON container.
///
/// An explicit non-empty `id` wins; otherwise the id defaults to the
/// 1-based ordinal position.
fn qa_item_from_value(index: usize, value: &Value) -> Result<QaItem, DatasetError> {
    let obj = value.as_object().ok_or_else(|| DatasetError::MalformedItem {
        index,
        reason: "expected a JSON object".to_string(),
    })?;

    let question = require_text(obj, "question", index)?;
    let answer = require_text(obj, "answer", index)?;

    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| format!("Q{}", index + 1));

    Ok(QaItem {
        id,
        question,
        answer,
    })
}

fn require_text(
    obj: &serde_json::Map<String, Value>,
    field: &str,
    index: usize,
) -> Result<String, DatasetError> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or_else(|| DatasetError::MalformedItem {
            index,
            reason: format!("missing or empty `{field}` field"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_bare_array_container() {
        let json = r#"[
            {"question": "Q1?", "answer": "A1"},
            {"id": "custom", "question": "Q2?", "answer": "A2"}
        ]"#;

        let dataset = Dataset::from_json_str(json).unwrap();

        assert!(dataset.papers.is_empty());
        assert_eq!(dataset.items.len(), 2);
        assert_eq!(dataset.items[0].id, "Q1");
        assert_eq!(dataset.items[1].id, "custom");
    }

    #[test]
    fn test_wrapped_container_with_papers() {
        let json = r#"{
            "papers": ["/abs/a.pdf", "/abs/b.pdf"],
            "items": [{"question": "Q?", "answer": "A"}]
        }"#;

        let dataset = Dataset::from_json_str(json).unwrap();

        assert_eq!(dataset.papers.len(), 2);
        assert_eq!(dataset.papers[0], PathBuf::from("/abs/a.pdf"));
        assert_eq!(dataset.items.len(), 1);
    }

    #[test]
    fn test_malformed_item_names_index() {
        let json = r#"[
            {"question": "Q1?", "answer": "A1"},
            {"question": "Q2?", "answer": "A2"},
            {"question": "Q3?", "answer": "  "}
        ]"#;

        let err = Dataset::from_json_str(json).unwrap_err();
        match err {
            DatasetError::MalformedItem { index, reason } => {
                assert_eq!(index, 2);
                assert!(reason.contains("answer"));
            }
            other => panic!("expected MalformedItem, got {other:?}"),
        }
    }

    #[rstest]
    #[case::non_object(r#"["just a string"]"#)]
    #[case::non_string_answer(r#"[{"question": "Q?", "answer": 42}]"#)]
    #[case::missing_question(r#"[{"answer": "A"}]"#)]
    #[case::empty_question(r#"[{"question": "", "answer": "A"}]"#)]
    fn test_malformed_first_item_rejected(#[case] json: &str) {
        let err = Dataset::from_json_str(json).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MalformedItem { index: 0, .. }
        ));
    }

    #[test]
    fn test_empty_items_rejected() {
        assert!(matches!(
            Dataset::from_json_str("[]"),
            Err(DatasetError::NoItems)
        ));
        assert!(matches!(
            Dataset::from_json_str(r#"{"items": []}"#),
            Err(DatasetError::NoItems)
        ));
    }

    #[test]
    fn test_unsupported_top_level_shape() {
        assert!(matches!(
            Dataset::from_json_str("42"),
            Err(DatasetError::Parse(_))
        ));
    }

    #[test]
    fn test_text_container_positional_ids() {
        let text = "Papers: /abs/a.pdf\n\nQuestion: A?\nAnswer: B\n\nQuestion: C?\nAnswer: D";
        let dataset = Dataset::from_text(text).unwrap();

        assert_eq!(dataset.items.len(), 2);
        assert_eq!(dataset.items[0].id, "Q1");
        assert_eq!(dataset.items[1].id, "Q2");
    }

    #[test]
    fn test_text_container_without_pairs() {
        assert!(matches!(
            Dataset::from_text("nothing labeled here"),
            Err(DatasetError::NoItems)
        ));
    }

    #[tokio::test]
    async fn test_load_dispatches_on_extension() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(br#"[{"question": "Q?", "answer": "A"}]"#)
            .unwrap();
        file.flush().unwrap();

        let dataset = Dataset::load(file.path()).await.unwrap();
        assert_eq!(dataset.items.len(), 1);
    }

    #[tokio::test]
    async fn test_load_rejects_unknown_extension() {
        let file = NamedTempFile::with_suffix(".csv").unwrap();
        let err = Dataset::load(file.path()).await.unwrap_err();
        assert!(matches!(err, DatasetError::UnsupportedFormat(ext) if ext == "csv"));
    }
}
