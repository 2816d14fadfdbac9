//! Evaluation report types.
//!
//! Output types for evaluation runs, designed for JSON serialization and
//! audit: every judge response is preserved verbatim alongside the derived
//! `correct` flag.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of one evaluated QA item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalRecord {
    /// Item identifier from the dataset
    pub id: String,

    /// The question that was asked
    pub question: String,

    /// Expected answer
    pub gold_answer: String,

    /// The answering model's response (trimmed; may be empty)
    pub model_answer: String,

    /// Whether the judge emitted exactly `true`
    pub correct: bool,

    /// The judge's response, trimmed and lowercased, preserved verbatim
    /// for audit even when it is not a clean verdict
    pub judge_raw: String,
}

/// Aggregate of an entire evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSummary {
    /// Number of items evaluated
    pub total: usize,

    /// Number of items the judge accepted
    pub correct: usize,

    /// `correct / max(1, total)`, rounded to 3 decimals
    pub accuracy: f64,

    /// Absolute paths of the documents actually used for answering
    pub papers: Vec<PathBuf>,
}

/// The persisted report: summary plus per-item records in dataset order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    /// Aggregate results
    pub summary: EvalSummary,
    /// Per-item outcomes
    pub results: Vec<EvalRecord>,
}

impl EvalReport {
    /// Build a report from per-item records.
    pub fn from_records(records: Vec<EvalRecord>, papers: Vec<PathBuf>) -> Self {
        let total = records.len();
        let correct = records.iter().filter(|r| r.correct).count();
        let accuracy = round3(correct as f64 / total.max(1) as f64);

        Self {
            summary: EvalSummary {
                total,
                correct,
                accuracy,
                papers,
            },
            results: records,
        }
    }

    /// Print a summary to stdout.
    pub fn print_summary(&self) {
        let summary = &self.summary;
        println!();
        println!("=== Evaluation Summary ===");
        println!(
            "Items: {} total, {} correct",
            summary.total, summary.correct
        );
        println!("Accuracy: {:.3}", summary.accuracy);
        println!();
        println!("Papers:");
        for paper in &summary.papers {
            println!("  {}", paper.display());
        }
    }

    /// Write the full report to a JSON file.
    pub fn write_json(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, correct: bool) -> EvalRecord {
        EvalRecord {
            id: id.to_string(),
            question: "Q?".to_string(),
            gold_answer: "gold".to_string(),
            model_answer: "pred".to_string(),
            correct,
            judge_raw: if correct { "true" } else { "false" }.to_string(),
        }
    }

    #[test]
    fn test_summary_arithmetic() {
        let records: Vec<EvalRecord> = (0..10).map(|i| record(&format!("Q{i}"), i < 7)).collect();
        let report = EvalReport::from_records(records, vec![PathBuf::from("/abs/a.pdf")]);

        assert_eq!(report.summary.total, 10);
        assert_eq!(report.summary.correct, 7);
        assert_eq!(report.summary.accuracy, 0.700);
    }

    #[test]
    fn test_empty_records_avoid_division_by_zero() {
        let report = EvalReport::from_records(vec![], vec![]);
        assert_eq!(report.summary.total, 0);
        assert_eq!(report.summary.accuracy, 0.0);
    }

    #[test]
    fn test_accuracy_rounding() {
        let records = vec![record("Q1", true), record("Q2", false), record("Q3", false)];
        let report = EvalReport::from_records(records, vec![]);

        // 1/3 rounds to 0.333
        assert_eq!(report.summary.accuracy, 0.333);
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let report = EvalReport::from_records(
            vec![record("Q1", true)],
            vec![PathBuf::from("/abs/a.pdf")],
        );

        let json = serde_json::to_string(&report).unwrap();
        let parsed: EvalReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.summary.total, 1);
        assert_eq!(parsed.results[0].judge_raw, "true");
    }
}
