//! QnA extraction from generated text.
//!
//! Benchmark generation asks the model for labeled `Question:` / `Answer:`
//! blocks, but real model output varies: ordinal markers come and go,
//! labels may be bold-wrapped, answers run over multiple lines. This module
//! recovers (question, answer) pairs from that text with a small line-driven
//! scanner with explicit block-boundary rules, so each tolerance can be
//! tested on its own.
//!
//! Extraction is best-effort and lexical: pairs whose labels are misspelled
//! or that stray from "label, colon, content" are not recovered.

use serde::{Deserialize, Serialize};

/// A question paired with its gold answer, as recovered from raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QnaPair {
    /// The question text, whitespace-normalized
    pub question: String,
    /// The gold answer text, whitespace-normalized
    pub answer: String,
}

/// Which extraction strategy produced a set of pairs.
///
/// Strategies are tried in declaration order until one yields a non-empty
/// result; see [`extract_any`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// The tolerant scanner: optional ordinals, optional `**` emphasis,
    /// case-insensitive labels.
    Labeled,
    /// Literal `Question:` / `Answer:` label blocks, no tolerance.
    StrictLabels,
}

/// Extract labeled question/answer pairs from raw generated text.
///
/// Pure and order-preserving; returns an empty vector when nothing matches.
/// A pair is emitted only when both sides are non-empty after whitespace
/// normalization.
///
/// # Example
///
/// ```
/// use paperbench_core::extract;
///
/// let pairs = extract("1. **Question:** What is X?\n**Answer:** Y");
/// assert_eq!(pairs.len(), 1);
/// assert_eq!(pairs[0].question, "What is X?");
/// assert_eq!(pairs[0].answer, "Y");
/// ```
pub fn extract(raw_text: &str) -> Vec<QnaPair> {
    let mut pairs = Vec::new();
    let mut state = State::Idle;
    for line in raw_text.lines() {
        state = step(state, line, &mut pairs);
    }
    if let State::Answer { question, answer } = state {
        push_pair(&mut pairs, &question, &answer);
    }
    pairs
}

/// Extract pairs requiring literal `Question:` / `Answer:` labels in
/// sequence.
///
/// This is the fallback for text datasets the tolerant scanner cannot read.
pub fn extract_strict(raw_text: &str) -> Vec<QnaPair> {
    let mut pairs = Vec::new();
    let mut blocks = raw_text.split("Question:");
    blocks.next(); // anything before the first label
    for block in blocks {
        if let Some((question, answer)) = block.split_once("Answer:") {
            push_pair(&mut pairs, question, answer);
        }
    }
    pairs
}

/// Try each extraction strategy in order until one yields pairs.
///
/// Returns the pairs together with the strategy that produced them, or
/// `None` when every strategy came up empty.
pub fn extract_any(raw_text: &str) -> Option<(Vec<QnaPair>, ExtractionStrategy)> {
    let pairs = extract(raw_text);
    if !pairs.is_empty() {
        return Some((pairs, ExtractionStrategy::Labeled));
    }
    let pairs = extract_strict(raw_text);
    if !pairs.is_empty() {
        return Some((pairs, ExtractionStrategy::StrictLabels));
    }
    None
}

/// Scanner state while walking lines of raw text.
enum State {
    /// Looking for the next `Question:` label
    Idle,
    /// Accumulating question text until an `Answer:` label appears
    Question(String),
    /// Accumulating answer text until a block boundary
    Answer { question: String, answer: String },
}

fn step(state: State, line: &str, pairs: &mut Vec<QnaPair>) -> State {
    match state {
        State::Idle => match question_content(line) {
            Some(content) => begin_question(content),
            None => State::Idle,
        },
        State::Question(mut question) => {
            // A fresh question label drops the unanswered question before it.
            if let Some(content) = question_content(line) {
                return begin_question(content);
            }
            if let Some((before_end, content_start)) = find_label(line, "answer") {
                question.push(' ');
                question.push_str(&line[..before_end]);
                return State::Answer {
                    question,
                    answer: line[content_start..].to_string(),
                };
            }
            question.push(' ');
            question.push_str(line);
            State::Question(question)
        }
        State::Answer {
            question,
            mut answer,
        } => {
            // Block boundaries: blank line, ordinal-marker line, next label.
            if line.trim().is_empty() {
                push_pair(pairs, &question, &answer);
                return State::Idle;
            }
            if question_content(line).is_some() || is_ordinal_line(line) {
                push_pair(pairs, &question, &answer);
                return step(State::Idle, line, pairs);
            }
            answer.push(' ');
            answer.push_str(line);
            State::Answer { question, answer }
        }
    }
}

/// Start a question block; the answer label may sit on the same line.
fn begin_question(content: &str) -> State {
    match find_label(content, "answer") {
        Some((before_end, content_start)) => State::Answer {
            question: content[..before_end].to_string(),
            answer: content[content_start..].to_string(),
        },
        None => State::Question(content.to_string()),
    }
}

fn push_pair(pairs: &mut Vec<QnaPair>, question: &str, answer: &str) {
    let question = normalize_ws(question);
    let answer = normalize_ws(answer);
    if !question.is_empty() && !answer.is_empty() {
        pairs.push(QnaPair { question, answer });
    }
}

/// Collapse all whitespace runs (including newlines) into single spaces.
fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// If `line` begins a question block (after an optional ordinal marker),
/// return the text following the label.
fn question_content(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let rest = strip_ordinal(trimmed).unwrap_or(trimmed);
    let (before_end, content_start) = find_label(rest, "question")?;
    if !rest[..before_end].trim().is_empty() {
        return None;
    }
    Some(&rest[content_start..])
}

/// Strip a leading `3.`-style ordinal marker.
fn strip_ordinal(s: &str) -> Option<&str> {
    let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    s[digits..].strip_prefix('.')
}

fn is_ordinal_line(line: &str) -> bool {
    strip_ordinal(line.trim_start()).is_some()
}

/// Case-insensitive search for a `label:` block anywhere in `s`, tolerating
/// `**` emphasis around the label word and colon.
///
/// Returns byte offsets `(before_end, content_start)`: the end of the text
/// preceding the label (emphasis and trailing whitespace excluded) and the
/// start of the content following it.
fn find_label(s: &str, label: &str) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    let needle = label.as_bytes();
    if bytes.len() < needle.len() {
        return None;
    }
    for i in 0..=bytes.len() - needle.len() {
        if !bytes[i..i + needle.len()].eq_ignore_ascii_case(needle) {
            continue;
        }
        // Word boundary: "answers:" must not match "answer".
        if i > 0 && bytes[i - 1].is_ascii_alphanumeric() {
            continue;
        }
        // Tail grammar: opt ws, opt `**`, `:`, opt `**`, then content.
        let mut k = eat_ws(s, i + needle.len());
        if s[k..].starts_with("**") {
            k = eat_ws(s, k + 2);
        }
        if !s[k..].starts_with(':') {
            continue;
        }
        k += 1;
        if s[k..].starts_with("**") {
            k += 2;
        }
        let content_start = eat_ws(s, k);

        // Trim whitespace and an opening `**` off the preceding text.
        let mut end = s[..i].trim_end().len();
        if s[..end].ends_with("**") {
            end = s[..end - 2].trim_end().len();
        }
        return Some((end, content_start));
    }
    None
}

/// Advance `i` past any whitespace (including newlines).
fn eat_ws(s: &str, i: usize) -> usize {
    i + (s[i..].len() - s[i..].trim_start().len())
}
