//! Scripted text-completion capability for tests.
//!
//! [`MockCompletion`] replays queued responses in order and records every
//! request it sees, enabling:
//!
//! - **Offline testing**: run the orchestrators without API calls
//! - **Deterministic testing**: assert on the exact requests issued
//!
//! # Example
//!
//! ```
//! use paperbench_core::{CompletionRequest, MockCompletion, TextCompletion};
//!
//! # async fn example() -> Result<(), paperbench_core::LlmError> {
//! let mock = MockCompletion::new(vec!["Question: A? Answer: B".to_string()]);
//!
//! let text = mock
//!     .complete(CompletionRequest::new("test-model", "generate"))
//!     .await?;
//! assert_eq!(text, "Question: A? Answer: B");
//! assert!(mock.is_exhausted());
//! # Ok(())
//! # }
//! ```

use super::{CompletionRequest, DocumentRef, TextCompletion};
use crate::error::LlmError;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock capability that replays scripted responses.
#[derive(Debug, Default)]
pub struct MockCompletion {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
    uploads: AtomicUsize,
}

impl MockCompletion {
    /// Create a mock that returns `responses` in order.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            uploads: AtomicUsize::new(0),
        }
    }

    /// Queue one more scripted response.
    pub fn push_response(&self, response: impl Into<String>) {
        self.responses
            .lock()
            .expect("mock lock poisoned")
            .push_back(response.into());
    }

    /// All completion requests seen so far, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }

    /// How many documents were uploaded.
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    /// Check if all scripted responses have been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.responses.lock().expect("mock lock poisoned").is_empty()
    }
}

impl TextCompletion for MockCompletion {
    async fn upload(&self, path: &Path) -> Result<DocumentRef, LlmError> {
        if !path.exists() {
            return Err(LlmError::Upload {
                path: path.to_path_buf(),
                message: "no such file".to_string(),
            });
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(DocumentRef(format!("mock-file-{n}")))
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        self.requests
            .lock()
            .expect("mock lock poisoned")
            .push(request);

        self.responses
            .lock()
            .expect("mock lock poisoned")
            .pop_front()
            .ok_or_else(|| {
                LlmError::ResponseProcessing("mock response queue exhausted".to_string())
            })
    }
}
