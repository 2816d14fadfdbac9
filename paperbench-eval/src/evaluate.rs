//! Evaluation harness.
//!
//! Iterates a dataset strictly in order: one answering request and one
//! judging request per item, against one fixed set of document references
//! uploaded once per run. The judge is instructed to emit exactly `true`
//! or `false`; anything else counts as incorrect, with the raw text
//! preserved in the record for audit.

use crate::dataset::{Dataset, DatasetError};
use crate::report::{EvalRecord, EvalReport};
use paperbench_core::{CompletionRequest, LlmError, TextCompletion};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EvalError {
    /// No documents were resolved from any source
    #[error(
        "No papers resolved: pass --paper, or use a dataset that names its papers \
         (JSON `papers` field, or a `Papers:` first line in a text export)"
    )]
    NoPapers,

    /// The dataset carries no QA items
    #[error("Dataset contains no QA items; nothing to evaluate")]
    EmptyDataset,

    /// Failed to load the dataset
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// The text-completion capability failed
    #[error("Capability error: {0}")]
    Llm(#[from] LlmError),
}

/// Progress events emitted during evaluation.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum EvalProgress {
    /// Preconditions passed, evaluation starting.
    Started {
        /// Total number of items to evaluate.
        total: usize,
    },
    /// An item finished the answer/judge/record cycle.
    ItemCompleted {
        /// Number of items completed so far.
        completed: usize,
        /// Total number of items.
        total: usize,
        /// Whether the judge accepted this item's answer.
        correct: bool,
    },
}

/// Configuration for the evaluation harness.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct EvalConfig {
    /// Model identifier for answering requests
    pub answer_model: String,

    /// Model identifier for judging requests
    pub judge_model: String,
}

impl EvalConfig {
    /// Create a configuration with the given models.
    pub fn new(answer_model: impl Into<String>, judge_model: impl Into<String>) -> Self {
        Self {
            answer_model: answer_model.into(),
            judge_model: judge_model.into(),
        }
    }
}

/// Evaluation harness for grading a dataset against a document set.
///
/// # Example
///
/// ```no_run
/// use paperbench_core::{LlmConfig, OpenAiClient};
/// use paperbench_eval::{Dataset, EvalConfig, EvalHarness};
/// use std::path::PathBuf;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = OpenAiClient::new("api-key", LlmConfig::default())?;
/// let dataset = Dataset::load(std::path::Path::new("attention_QA.json")).await?;
/// let papers = vec![PathBuf::from("/abs/attention.pdf")];
///
/// let harness = EvalHarness::new(EvalConfig::new("gpt-5", "gpt-5"));
/// let report = harness
///     .evaluate(&client, &papers, &dataset, "answer prompt", "judge prompt")
///     .await?;
///
/// report.print_summary();
/// # Ok(())
/// # }
/// ```
pub struct EvalHarness {
    config: EvalConfig,
}

impl EvalHarness {
    /// Create a new evaluation harness.
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    /// Run evaluation over every item of `dataset`.
    ///
    /// The report's `papers` reflect the documents passed here, never the
    /// dataset's own metadata.
    pub async fn evaluate<C: TextCompletion>(
        &self,
        client: &C,
        papers: &[PathBuf],
        dataset: &Dataset,
        prompt_answer: &str,
        prompt_judge: &str,
    ) -> Result<EvalReport, EvalError> {
        self.evaluate_with_progress(client, papers, dataset, prompt_answer, prompt_judge, |_| {})
            .await
    }

    /// Same as [`evaluate`](Self::evaluate), with progress callbacks.
    pub async fn evaluate_with_progress<C, F>(
        &self,
        client: &C,
        papers: &[PathBuf],
        dataset: &Dataset,
        prompt_answer: &str,
        prompt_judge: &str,
        on_progress: F,
    ) -> Result<EvalReport, EvalError>
    where
        C: TextCompletion,
        F: Fn(EvalProgress),
    {
        // Fail before any request is issued.
        if papers.is_empty() {
            return Err(EvalError::NoPapers);
        }
        if dataset.items.is_empty() {
            return Err(EvalError::EmptyDataset);
        }

        let total = dataset.items.len();
        on_progress(EvalProgress::Started { total });
        log::info!(
            "Evaluating {} items against {} paper(s)",
            total,
            papers.len()
        );

        // One upload pass; the same references serve every item.
        let mut documents = Vec::with_capacity(papers.len());
        for paper in papers {
            documents.push(client.upload(paper).await?);
        }

        let mut records = Vec::with_capacity(total);
        for (index, item) in dataset.items.iter().enumerate() {
            let answer_request =
                CompletionRequest::new(&self.config.answer_model, prompt_answer)
                    .with_text(format!("{}\n", item.question))
                    .with_documents(documents.iter().cloned());
            let model_answer = client.complete(answer_request).await?.trim().to_string();

            let judge_request = CompletionRequest::new(&self.config.judge_model, prompt_judge)
                .with_text(judge_block(&item.question, &item.answer, &model_answer));
            let judge_raw = client
                .complete(judge_request)
                .await?
                .trim()
                .to_lowercase();

            // Exact literal equality after normalization. "True.", "yes",
            // or an explanation all count as incorrect; the raw text stays
            // in the record.
            let correct = judge_raw == "true";

            records.push(EvalRecord {
                id: item.id.clone(),
                question: item.question.clone(),
                gold_answer: item.answer.clone(),
                model_answer,
                correct,
                judge_raw,
            });
            on_progress(EvalProgress::ItemCompleted {
                completed: index + 1,
                total,
                correct,
            });
        }

        Ok(EvalReport::from_records(records, papers.to_vec()))
    }
}

/// The fixed delimited block handed to the judge.
fn judge_block(question: &str, gold: &str, predicted: &str) -> String {
    format!("QUERY:\n{question}\nGOLD_ANSWER:\n{gold}\nMODEL_ANSWER:\n{predicted}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::QaItem;
    use paperbench_core::MockCompletion;

    fn dataset(items: Vec<QaItem>) -> Dataset {
        Dataset {
            papers: Vec::new(),
            items,
        }
    }

    fn item(id: &str) -> QaItem {
        QaItem {
            id: id.to_string(),
            question: format!("{id} question?"),
            answer: format!("{id} gold"),
        }
    }

    #[test]
    fn test_judge_block_format() {
        let block = judge_block("Q?", "gold", "pred");
        assert_eq!(block, "QUERY:\nQ?\nGOLD_ANSWER:\ngold\nMODEL_ANSWER:\npred");
    }

    #[tokio::test]
    async fn test_empty_papers_fatal_before_requests() {
        let mock = MockCompletion::new(vec![]);
        let harness = EvalHarness::new(EvalConfig::new("a", "j"));

        let result = harness
            .evaluate(&mock, &[], &dataset(vec![item("Q1")]), "pa", "pj")
            .await;

        assert!(matches!(result, Err(EvalError::NoPapers)));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_empty_dataset_fatal_before_requests() {
        let mock = MockCompletion::new(vec![]);
        let harness = EvalHarness::new(EvalConfig::new("a", "j"));

        let result = harness
            .evaluate(
                &mock,
                &[std::path::PathBuf::from("/abs/a.pdf")],
                &dataset(vec![]),
                "pa",
                "pj",
            )
            .await;

        assert!(matches!(result, Err(EvalError::EmptyDataset)));
        assert!(mock.requests().is_empty());
    }
}
