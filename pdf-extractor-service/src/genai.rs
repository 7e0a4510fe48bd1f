//! Client for the hosted generative model.
//!
//! [`GenerativeBackend`] is the seam the extraction code talks to: register a local file,
//! then generate content from an ordered list of parts. [`GeminiClient`] implements it
//! against the Gemini REST API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("request to model service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid response from model service: {0}")]
    InvalidResponse(String),

    #[error("failed to read file for upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Reference to a file the service has registered
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileHandle {
    pub name: String,
    pub uri: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// One ordered input to a generation request
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    File(FileHandle),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationConfig {
    pub temperature: f32,
}

/// The parts of a generation response this service looks at
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Build a response carrying a single text part
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(CandidateContent {
                    parts: vec![ResponsePart {
                        text: Some(text.into()),
                    }],
                }),
            }],
        }
    }

    /// Concatenated text of the first candidate, if it has any
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Register a local file with the service
    async fn upload_file(&self, path: &Path, mime_type: &str) -> Result<FileHandle, GenAiError>;

    async fn generate_content(
        &self,
        parts: Vec<Part>,
        config: GenerationConfig,
    ) -> Result<GenerateResponse, GenAiError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: FileHandle,
}

/// Gemini REST client; cheap to share, holds no per-request state
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Resumable upload, step one: announce the file and get an upload URL back
    async fn start_upload(
        &self,
        display_name: &str,
        mime_type: &str,
        size: usize,
    ) -> Result<String, GenAiError> {
        let response = self
            .http
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;

        let response = ensure_success(response).await?;

        response
            .headers()
            .get("x-goog-upload-url")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| GenAiError::InvalidResponse("missing x-goog-upload-url header".into()))
    }

    fn part_to_json(part: &Part) -> Value {
        match part {
            Part::File(handle) => json!({
                "file_data": {
                    "mime_type": handle.mime_type,
                    "file_uri": handle.uri
                }
            }),
            Part::Text(text) => json!({ "text": text }),
        }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn upload_file(&self, path: &Path, mime_type: &str) -> Result<FileHandle, GenAiError> {
        let bytes = tokio::fs::read(path).await?;
        let display_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("document.pdf");

        let upload_url = self
            .start_upload(display_name, mime_type, bytes.len())
            .await?;
        debug!("Upload session opened for {}", display_name);

        let response = self
            .http
            .post(upload_url)
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header("X-Goog-Upload-Offset", "0")
            .body(bytes)
            .send()
            .await?;

        let uploaded: UploadResponse = ensure_success(response).await?.json().await?;

        info!(file = %uploaded.file.name, "File registered with model service");
        Ok(uploaded.file)
    }

    async fn generate_content(
        &self,
        parts: Vec<Part>,
        config: GenerationConfig,
    ) -> Result<GenerateResponse, GenAiError> {
        let payload = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": parts.iter().map(Self::part_to_json).collect::<Vec<_>>()
                }
            ],
            "generationConfig": config
        });

        let response = self
            .http
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let generated: GenerateResponse = ensure_success(response).await?.json().await?;
        Ok(generated)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GenAiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GenAiError::Status { status, body })
}
