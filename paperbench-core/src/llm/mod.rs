//! Text-completion capability.
//!
//! The benchmark orchestrators never talk to a service directly; they hold a
//! [`TextCompletion`] handle created once per run and passed in at
//! construction time. [`openai::OpenAiClient`] implements the capability
//! over the OpenAI Files and Responses APIs; [`mock::MockCompletion`]
//! replays scripted responses for tests.

pub mod mock;
pub mod openai;

use crate::error::LlmError;
use std::future::Future;
use std::path::Path;

/// Opaque handle to an uploaded/ingested source document.
///
/// Obtained from [`TextCompletion::upload`] and only meaningful to the
/// capability that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef(pub String);

/// One element of a completion request's content list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// Free text
    Text(String),
    /// Reference to an uploaded document
    Document(DocumentRef),
}

/// A single completion request: instruction text plus ordered content.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,
    /// Instruction text (the prompt file contents)
    pub instructions: String,
    /// Ordered content: text blocks and document references
    pub content: Vec<ContentPart>,
}

impl CompletionRequest {
    /// Create a request with no content parts yet.
    pub fn new(model: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            instructions: instructions.into(),
            content: Vec::new(),
        }
    }

    /// Append a text block.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content.push(ContentPart::Text(text.into()));
        self
    }

    /// Append a document reference.
    #[must_use]
    pub fn with_document(mut self, document: DocumentRef) -> Self {
        self.content.push(ContentPart::Document(document));
        self
    }

    /// Append document references in order.
    #[must_use]
    pub fn with_documents(mut self, documents: impl IntoIterator<Item = DocumentRef>) -> Self {
        self.content
            .extend(documents.into_iter().map(ContentPart::Document));
        self
    }
}

/// The text-completion capability.
///
/// Implementations are created once per run and shared read-only by the
/// generation and evaluation orchestrators. Both methods are blocking calls
/// from the caller's perspective; failures are capability-level
/// ([`LlmError`]) and fatal for the run.
pub trait TextCompletion: Send + Sync {
    /// Ingest a local document, returning an opaque reference usable in
    /// request content lists.
    ///
    /// Fails identifying the offending path when the document cannot be
    /// read or the service rejects it.
    fn upload(&self, path: &Path) -> impl Future<Output = Result<DocumentRef, LlmError>> + Send;

    /// Submit one completion request and return the output text.
    ///
    /// An empty output is not an error; callers decide what emptiness means.
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder_preserves_order() {
        let request = CompletionRequest::new("gpt-4o", "do the thing")
            .with_text("first")
            .with_documents(vec![
                DocumentRef("file-1".into()),
                DocumentRef("file-2".into()),
            ]);

        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.content.len(), 3);
        assert_eq!(request.content[0], ContentPart::Text("first".into()));
        assert_eq!(
            request.content[2],
            ContentPart::Document(DocumentRef("file-2".into()))
        );
    }
}
