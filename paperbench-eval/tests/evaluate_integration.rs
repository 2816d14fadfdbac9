//! Integration tests for the evaluation harness.
//!
//! These use the scripted mock capability, so no API calls are made.

use paperbench_core::{ContentPart, MockCompletion};
use paperbench_eval::{
    Dataset, EvalConfig, EvalError, EvalHarness, EvalProgress, GenerateConfig, Generator, QaItem,
};
use std::path::PathBuf;
use std::sync::Mutex;

fn item(id: &str, question: &str, answer: &str) -> QaItem {
    QaItem {
        id: id.to_string(),
        question: question.to_string(),
        answer: answer.to_string(),
    }
}

fn write_paper(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"paper bytes").unwrap();
    path
}

fn harness() -> EvalHarness {
    EvalHarness::new(EvalConfig::new("answer-model", "judge-model"))
}

#[tokio::test]
async fn test_judge_strictness() {
    let dir = tempfile::tempdir().unwrap();
    let paper = write_paper(&dir, "p.pdf");

    let dataset = Dataset {
        papers: Vec::new(),
        items: vec![
            item("Q1", "A?", "a"),
            item("Q2", "B?", "b"),
            item("Q3", "C?", "c"),
            item("Q4", "D?", "d"),
        ],
    };

    // Per item: one answer response, then one judge response.
    let mock = MockCompletion::new(vec![
        "ans".into(),
        "True".into(),
        "ans".into(),
        "true.".into(),
        "ans".into(),
        " TRUE ".into(),
        "ans".into(),
        "yes".into(),
    ]);

    let report = harness()
        .evaluate(&mock, &[paper], &dataset, "PA", "PJ")
        .await
        .unwrap();

    // Only responses normalizing to the exact literal "true" count.
    let correct: Vec<bool> = report.results.iter().map(|r| r.correct).collect();
    assert_eq!(correct, vec![true, false, true, false]);

    // judge_raw preserves the normalized text for audit.
    let raw: Vec<&str> = report.results.iter().map(|r| r.judge_raw.as_str()).collect();
    assert_eq!(raw, vec!["true", "true.", "true", "yes"]);

    assert_eq!(report.summary.total, 4);
    assert_eq!(report.summary.correct, 2);
    assert_eq!(report.summary.accuracy, 0.5);
}

#[tokio::test]
async fn test_requests_are_sequential_and_well_formed() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_paper(&dir, "a.pdf");
    let b = write_paper(&dir, "b.pdf");

    let dataset = Dataset {
        papers: Vec::new(),
        items: vec![item("Q1", "First?", "gold1"), item("Q2", "Second?", "gold2")],
    };

    let mock = MockCompletion::new(vec![
        "  answer one  ".into(),
        "true".into(),
        "answer two".into(),
        "false".into(),
    ]);

    let report = harness()
        .evaluate(&mock, &[a, b], &dataset, "ANSWER PROMPT", "JUDGE PROMPT")
        .await
        .unwrap();

    // Papers are uploaded once per run, not once per item.
    assert_eq!(mock.upload_count(), 2);

    let requests = mock.requests();
    assert_eq!(requests.len(), 4);

    // Answer request: answer model, answer prompt, question text first,
    // then every document reference in order.
    assert_eq!(requests[0].model, "answer-model");
    assert_eq!(requests[0].instructions, "ANSWER PROMPT");
    assert_eq!(
        requests[0].content[0],
        ContentPart::Text("First?\n".into())
    );
    let documents = requests[0]
        .content
        .iter()
        .filter(|p| matches!(p, ContentPart::Document(_)))
        .count();
    assert_eq!(documents, 2);

    // Judge request: judge model, the fixed delimited block, no documents.
    assert_eq!(requests[1].model, "judge-model");
    assert_eq!(requests[1].instructions, "JUDGE PROMPT");
    assert_eq!(
        requests[1].content[0],
        ContentPart::Text("QUERY:\nFirst?\nGOLD_ANSWER:\ngold1\nMODEL_ANSWER:\nanswer one".into())
    );
    assert_eq!(requests[1].content.len(), 1);

    // Results stay in dataset order with trimmed answers.
    assert_eq!(report.results[0].id, "Q1");
    assert_eq!(report.results[0].model_answer, "answer one");
    assert_eq!(report.results[1].id, "Q2");
    assert!(!report.results[1].correct);
}

#[tokio::test]
async fn test_summary_papers_reflect_run_documents() {
    let dir = tempfile::tempdir().unwrap();
    let used = write_paper(&dir, "used.pdf");

    // The dataset claims different papers; the run's documents win.
    let dataset = Dataset {
        papers: vec![PathBuf::from("/abs/stale.pdf")],
        items: vec![item("Q1", "A?", "a")],
    };

    let mock = MockCompletion::new(vec!["ans".into(), "true".into()]);
    let report = harness()
        .evaluate(&mock, std::slice::from_ref(&used), &dataset, "PA", "PJ")
        .await
        .unwrap();

    assert_eq!(report.summary.papers, vec![used]);
}

#[tokio::test]
async fn test_progress_events() {
    let dir = tempfile::tempdir().unwrap();
    let paper = write_paper(&dir, "p.pdf");

    let dataset = Dataset {
        papers: Vec::new(),
        items: vec![item("Q1", "A?", "a"), item("Q2", "B?", "b")],
    };

    let mock = MockCompletion::new(vec![
        "ans".into(),
        "true".into(),
        "ans".into(),
        "nope".into(),
    ]);

    let events = Mutex::new(Vec::new());
    harness()
        .evaluate_with_progress(&mock, &[paper], &dataset, "PA", "PJ", |progress| {
            events.lock().unwrap().push(progress);
        })
        .await
        .unwrap();

    let events = events.into_inner().unwrap();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], EvalProgress::Started { total: 2 }));
    assert!(matches!(
        events[2],
        EvalProgress::ItemCompleted {
            completed: 2,
            total: 2,
            correct: false,
            ..
        }
    ));
}

#[tokio::test]
async fn test_empty_generation_rejected_by_evaluation() {
    let dir = tempfile::tempdir().unwrap();
    let paper = write_paper(&dir, "p.pdf");

    // Generation output with no labeled pairs produces an empty dataset.
    let mock = MockCompletion::new(vec!["no labeled content at all".into()]);
    let generator = Generator::new(GenerateConfig::new("gpt-4o"));
    let generation = generator
        .generate(&mock, std::slice::from_ref(&paper), "S", "M")
        .await
        .unwrap();
    assert!(generation.dataset.items.is_empty());

    // Evaluation must refuse it rather than report zero accuracy.
    let result = harness()
        .evaluate(&mock, &[paper], &generation.dataset, "PA", "PJ")
        .await;
    assert!(matches!(result, Err(EvalError::EmptyDataset)));
}
