//! # Paperbench Core
//!
//! Capability layer for the paperbench QA benchmark tooling.
//!
//! ## Overview
//!
//! - **Text completion**: the [`TextCompletion`] trait with an
//!   OpenAI-backed client ([`OpenAiClient`]) and a scripted mock
//!   ([`MockCompletion`]) for tests
//! - **Extraction**: recover labeled question/answer pairs from raw
//!   generated text ([`extract`], [`extract_any`])
//! - **Configuration**: timeout and retry policy ([`LlmConfig`])
//!
//! ## Architecture
//!
//! ```text
//! paperbench-core (capability, extraction)   ← this crate
//!     ↓
//! paperbench-eval (datasets, orchestrators, CLI)
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use paperbench_core::{CompletionRequest, LlmConfig, OpenAiClient, TextCompletion};
//!
//! # async fn example() -> Result<(), paperbench_core::LlmError> {
//! let client = OpenAiClient::new("api-key", LlmConfig::default())?;
//!
//! let paper = client.upload(std::path::Path::new("paper.pdf")).await?;
//! let text = client
//!     .complete(
//!         CompletionRequest::new("gpt-4o", "Generate a QA benchmark.")
//!             .with_text("Generate the QA benchmark as instructed.")
//!             .with_document(paper),
//!     )
//!     .await?;
//!
//! let pairs = paperbench_core::extract(&text);
//! println!("extracted {} pairs", pairs.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod llm;

// Re-export public API
pub use config::LlmConfig;
pub use error::LlmError;
pub use extract::{extract, extract_any, extract_strict, ExtractionStrategy, QnaPair};
pub use llm::mock::MockCompletion;
pub use llm::openai::OpenAiClient;
pub use llm::{CompletionRequest, ContentPart, DocumentRef, TextCompletion};
