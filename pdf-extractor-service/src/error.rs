use thiserror::Error;

use crate::genai::GenAiError;

/// Every failure a user can run into, one variant per kind.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Upload(String),

    #[error("Error processing PDF: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Result is not valid JSON: {0}")]
    Presentation(#[from] serde_json::Error),
}

/// Failure anywhere between staging the document and reading the model's answer.
///
/// Callers treat this as one opaque failure; the variants only shape the message.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to stage document: {0}")]
    Staging(#[from] std::io::Error),

    #[error("{0}")]
    Service(#[from] GenAiError),

    #[error("the model returned no text")]
    EmptyResponse,
}
