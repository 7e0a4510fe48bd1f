//! Test doubles for the model service.
//!
//! [`MockBackend`] records every call and can be told to fail at upload or generation.

use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::genai::{
    FileHandle, GenAiError, GenerateResponse, GenerationConfig, GenerativeBackend, Part,
};
use crate::models::UploadedDocument;

/// Smallest byte string the upload check accepts as a PDF
pub const MINIMAL_PDF: &[u8] = b"%PDF-1.4\n1 0 obj << >> endobj\ntrailer << >>\n%%EOF\n";

pub fn pdf_document(name: &str) -> UploadedDocument {
    UploadedDocument {
        name: name.to_string(),
        bytes: Bytes::from_static(MINIMAL_PDF),
    }
}

/// A panicking test must not hide the calls recorded before it
fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What the backend saw when asked to upload a file
#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub path: PathBuf,
    pub mime_type: String,
    pub existed_during_upload: bool,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
enum Behaviour {
    Reply(String),
    FailUpload(String),
    FailGeneration(String),
}

#[derive(Clone)]
pub struct MockBackend {
    behaviour: Behaviour,
    uploads: Arc<Mutex<Vec<UploadRecord>>>,
    generate_requests: Arc<Mutex<Vec<(Vec<Part>, GenerationConfig)>>>,
}

impl MockBackend {
    fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            uploads: Arc::new(Mutex::new(Vec::new())),
            generate_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_behaviour(Behaviour::Reply(text.into()))
    }

    pub fn failing_upload(message: impl Into<String>) -> Self {
        Self::with_behaviour(Behaviour::FailUpload(message.into()))
    }

    pub fn failing_generation(message: impl Into<String>) -> Self {
        Self::with_behaviour(Behaviour::FailGeneration(message.into()))
    }

    pub fn uploads(&self) -> Vec<UploadRecord> {
        locked(&self.uploads).clone()
    }

    pub fn generate_requests(&self) -> Vec<(Vec<Part>, GenerationConfig)> {
        locked(&self.generate_requests).clone()
    }

    fn service_error(message: &str) -> GenAiError {
        GenAiError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: message.to_string(),
        }
    }
}

#[async_trait]
impl GenerativeBackend for MockBackend {
    async fn upload_file(&self, path: &Path, mime_type: &str) -> Result<FileHandle, GenAiError> {
        let existed = path.exists();
        let bytes = std::fs::read(path).unwrap_or_default();
        locked(&self.uploads).push(UploadRecord {
            path: path.to_path_buf(),
            mime_type: mime_type.to_string(),
            existed_during_upload: existed,
            bytes,
        });

        if let Behaviour::FailUpload(message) = &self.behaviour {
            return Err(Self::service_error(message));
        }

        let n = locked(&self.uploads).len();
        Ok(FileHandle {
            name: format!("files/mock-{n}"),
            uri: format!("https://files.mock/files/mock-{n}"),
            mime_type: mime_type.to_string(),
        })
    }

    async fn generate_content(
        &self,
        parts: Vec<Part>,
        config: GenerationConfig,
    ) -> Result<GenerateResponse, GenAiError> {
        locked(&self.generate_requests).push((parts, config));

        match &self.behaviour {
            Behaviour::Reply(text) => Ok(GenerateResponse::from_text(text.clone())),
            Behaviour::FailGeneration(message) => Err(Self::service_error(message)),
            Behaviour::FailUpload(_) => Err(GenAiError::InvalidResponse(
                "generate called after failed upload".into(),
            )),
        }
    }
}
