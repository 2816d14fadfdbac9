//! Benchmark generation.
//!
//! One completion request per run: the chosen instruction text plus every
//! source document, in order. The raw output is fed through the extraction
//! scanner, items get prefixed ordinal ids, and the result is persisted as
//! a JSON dataset (optionally alongside a line-preserving text export whose
//! `Papers:` header round-trips through the papers resolver).

use crate::dataset::{Dataset, QaItem};
use crate::papers::{absolutize_all, PapersError, PAPERS_MARKER};
use paperbench_core::{extract, CompletionRequest, LlmError, TextCompletion};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors that can occur during benchmark generation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerateError {
    /// Document paths could not be resolved
    #[error("Document reference error: {0}")]
    Papers(#[from] PapersError),

    /// The text-completion capability failed
    #[error("Capability error: {0}")]
    Llm(#[from] LlmError),

    /// Outputs could not be written
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// The dataset could not be encoded
    #[error("Failed to encode dataset: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for benchmark generation.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GenerateConfig {
    /// Model identifier for the generation request
    pub model: String,

    /// Prefix for item identifiers (default: "Q")
    pub id_prefix: String,

    /// Cap on the number of items kept, in extraction order
    pub max_items: Option<usize>,
}

impl GenerateConfig {
    /// Create a configuration for the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            id_prefix: "Q".to_string(),
            max_items: None,
        }
    }

    /// Set the item identifier prefix.
    #[must_use]
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Cap the number of items kept.
    #[must_use]
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }
}

/// A generated benchmark: the normalized dataset plus the raw model output
/// it was extracted from.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Normalized dataset (papers are absolute; items carry prefixed ids)
    pub dataset: Dataset,
    /// The model's raw output, line-preserving
    pub raw_text: String,
}

/// Benchmark generation orchestrator.
pub struct Generator {
    config: GenerateConfig,
}

impl Generator {
    /// Create a generator with the given configuration.
    pub fn new(config: GenerateConfig) -> Self {
        Self { config }
    }

    /// Generate a QA benchmark from one or more source documents.
    ///
    /// Document count is the single policy input for prompt selection:
    /// more than one document selects `prompt_multi`, else `prompt_single`.
    /// Zero extracted pairs is not an error here; downstream consumers
    /// reject the empty dataset.
    pub async fn generate<C: TextCompletion>(
        &self,
        client: &C,
        paper_paths: &[PathBuf],
        prompt_single: &str,
        prompt_multi: &str,
    ) -> Result<Generation, GenerateError> {
        let papers = absolutize_all(paper_paths.iter().map(PathBuf::as_path))?;
        let multi = papers.len() > 1;

        let instructions = if multi { prompt_multi } else { prompt_single };
        let user_text = if multi {
            "Generate the QA benchmark as instructed. Use ALL provided papers."
        } else {
            "Generate the QA benchmark as instructed."
        };

        let mut request =
            CompletionRequest::new(&self.config.model, instructions).with_text(user_text);
        for paper in &papers {
            request = request.with_document(client.upload(paper).await?);
        }

        log::info!(
            "Generating QA benchmark from {} paper(s) with model {}",
            papers.len(),
            self.config.model
        );
        let raw_text = client.complete(request).await?.trim().to_string();

        let pairs = extract(&raw_text);
        if pairs.is_empty() {
            log::warn!(
                "No QA pairs extracted from generated text ({} chars)",
                raw_text.len()
            );
        }

        let keep = self.config.max_items.unwrap_or(usize::MAX);
        let items = pairs
            .into_iter()
            .take(keep)
            .enumerate()
            .map(|(i, pair)| QaItem {
                id: format!("{}{}", self.config.id_prefix, i + 1),
                question: pair.question,
                answer: pair.answer,
            })
            .collect();

        Ok(Generation {
            dataset: Dataset { papers, items },
            raw_text,
        })
    }

    /// Output file stem: the single paper's stem, or `multi_<n>_papers`.
    pub fn output_stem(papers: &[PathBuf]) -> String {
        if papers.len() > 1 {
            format!("multi_{}_papers", papers.len())
        } else {
            papers
                .first()
                .and_then(|p| p.file_stem())
                .and_then(|s| s.to_str())
                .unwrap_or("dataset")
                .to_string()
        }
    }

    /// Persist the dataset as `<stem>_QA.json` under `out_dir`.
    pub async fn write_json(
        &self,
        generation: &Generation,
        out_dir: &Path,
    ) -> Result<PathBuf, GenerateError> {
        fs::create_dir_all(out_dir).await?;

        let path = out_dir.join(format!(
            "{}_QA.json",
            Self::output_stem(&generation.dataset.papers)
        ));
        let json = serde_json::to_string_pretty(&generation.dataset)?;
        fs::write(&path, json).await?;

        log::info!(
            "Wrote {} ({} items)",
            path.display(),
            generation.dataset.items.len()
        );
        Ok(path)
    }

    /// Persist the raw output as `<stem>_QA.txt` under `out_dir`.
    ///
    /// The first non-empty line is the `Papers:` header the papers resolver
    /// parses back; the raw text follows line-preserved, so the export can
    /// be fed to evaluation as a dataset in its own right.
    pub async fn write_text_export(
        &self,
        generation: &Generation,
        out_dir: &Path,
    ) -> Result<PathBuf, GenerateError> {
        fs::create_dir_all(out_dir).await?;

        let stem = Self::output_stem(&generation.dataset.papers);
        let path = out_dir.join(format!("{stem}_QA.txt"));

        let papers_line = generation
            .dataset
            .papers
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        let mut content = format!("{PAPERS_MARKER} {papers_line}\n{stem} QA (raw model output)\n\n");
        content.push_str(&generation.raw_text);
        content.push('\n');
        fs::write(&path, content).await?;

        log::info!(
            "Wrote {} ({} chars raw)",
            path.display(),
            generation.raw_text.len()
        );
        Ok(path)
    }
}
