//! # Paperbench Eval
//!
//! Generate and grade QA benchmarks derived from reference papers.
//!
//! ## Overview
//!
//! - **Datasets**: load JSON or labeled-text containers into a uniform
//!   [`Dataset`] ([`Dataset::load`])
//! - **Papers**: resolve the source-document set for a run
//!   ([`papers::resolve`])
//! - **Generation**: drive one completion request over N papers and
//!   persist the extracted benchmark ([`Generator`])
//! - **Evaluation**: answer and judge every item, aggregate an accuracy
//!   report ([`EvalHarness`])
//!
//! ## Architecture
//!
//! ```text
//! paperbench-core (capability, extraction)
//!     ↓
//! paperbench-eval (datasets, orchestrators, CLI)  ← this crate
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use paperbench_core::{LlmConfig, OpenAiClient};
//! use paperbench_eval::{GenerateConfig, Generator};
//! use std::path::{Path, PathBuf};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new("api-key", LlmConfig::default())?;
//!
//! let generator = Generator::new(GenerateConfig::new("gpt-4o").with_max_items(20));
//! let generation = generator
//!     .generate(
//!         &client,
//!         &[PathBuf::from("attention.pdf")],
//!         "single-paper prompt",
//!         "multi-paper prompt",
//!     )
//!     .await?;
//!
//! generator.write_json(&generation, Path::new("out")).await?;
//! # Ok(())
//! # }
//! ```

pub mod dataset;
pub mod evaluate;
pub mod generate;
pub mod papers;
pub mod report;

// Re-export public API
pub use dataset::{Dataset, DatasetError, QaItem};
pub use evaluate::{EvalConfig, EvalError, EvalHarness, EvalProgress};
pub use generate::{GenerateConfig, GenerateError, Generation, Generator};
pub use papers::PapersError;
pub use report::{EvalRecord, EvalReport, EvalSummary};
