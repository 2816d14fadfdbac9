//! OpenAI-backed implementation of the text-completion capability.
//!
//! Documents are ingested through the Files API; completions go through the
//! Responses API with `input_file` references. Transient failures (timeouts,
//! 429, 5xx) are retried with exponential backoff per [`LlmConfig`];
//! authentication failures are never retried.

use super::{CompletionRequest, ContentPart, DocumentRef, TextCompletion};
use crate::config::LlmConfig;
use crate::error::LlmError;
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::path::Path;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Purpose tag for uploaded documents.
const UPLOAD_PURPOSE: &str = "assistants";

/// Text-completion client for the OpenAI API.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    config: LlmConfig,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_base", &self.api_base)
            .field("api_key", &"[REDACTED]")
            .field("config", &self.config)
            .finish()
    }
}

impl OpenAiClient {
    /// Create a client with the given API key and configuration.
    ///
    /// Fails with [`LlmError::MissingApiKey`] on an empty key so the
    /// misconfiguration surfaces before any request is issued.
    pub fn new(api_key: impl Into<String>, config: LlmConfig) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key,
            config,
        })
    }

    /// Override the API base URL (proxies, compatible endpoints, tests).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Get a reference to the client configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Run `op`, retrying transient failures with exponential backoff.
    async fn retrying<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T, LlmError>
    where
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.retry_delay(attempt);
                    log::warn!(
                        "Transient capability error (attempt {}/{}): {}; retrying in {:?}",
                        attempt + 1,
                        self.config.max_retries + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.config.timeout.as_millis() as u64)
        } else {
            LlmError::Http(e)
        }
    }

    /// Turn a non-success response into an [`LlmError::Api`], extracting the
    /// service's error message when the body carries one.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);

        Err(LlmError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn upload_once(&self, path: &Path) -> Result<DocumentRef, LlmError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| LlmError::Upload {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("document")
            .to_string();

        let form = reqwest::multipart::Form::new()
            .text("purpose", UPLOAD_PURPOSE)
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(filename),
            );

        let response = self
            .http
            .post(format!("{}/files", self.api_base))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let uploaded: UploadedFile = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::ResponseProcessing(e.to_string()))?;

        log::debug!("Uploaded {} as {}", path.display(), uploaded.id);
        Ok(DocumentRef(uploaded.id))
    }

    async fn complete_once(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let content: Vec<serde_json::Value> = request
            .content
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => json!({ "type": "input_text", "text": text }),
                ContentPart::Document(doc) => json!({ "type": "input_file", "file_id": doc.0 }),
            })
            .collect();

        let body = json!({
            "model": request.model,
            "instructions": request.instructions,
            "input": [{ "role": "user", "content": content }],
        });

        let response = self
            .http
            .post(format!("{}/responses", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let parsed: ResponsesBody = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::ResponseProcessing(e.to_string()))?;

        Ok(parsed.output_text())
    }
}

impl TextCompletion for OpenAiClient {
    async fn upload(&self, path: &Path) -> Result<DocumentRef, LlmError> {
        self.retrying(|| self.upload_once(path)).await
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        self.retrying(|| self.complete_once(&request)).await
    }
}

#[derive(Deserialize)]
struct UploadedFile {
    id: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Minimal view of a Responses API body: the generated text lives in
/// `output[].content[]` entries of type `output_text`.
#[derive(Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl ResponsesBody {
    fn output_text(&self) -> String {
        self.output
            .iter()
            .flat_map(|item| item.content.iter())
            .filter(|c| c.kind == "output_text")
            .map(|c| c.text.as_str())
            .collect()
    }
}
