use std::path::Path;
use tracing::{error, info};

use crate::error::ExtractionError;
use crate::genai::{GenerationConfig, GenerativeBackend, Part};
use crate::models::UploadedDocument;
use crate::staging::StagedDocument;

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Low temperature keeps the model literal
pub const EXTRACTION_TEMPERATURE: f32 = 0.2;

/// Send `document` and `prompt` to the model and return its answer verbatim.
///
/// The document is staged to a temporary `.pdf` file for the upload and that file is
/// removed again whatever the outcome.
pub async fn extract(
    backend: &dyn GenerativeBackend,
    staging_dir: &Path,
    document: &UploadedDocument,
    prompt: &str,
) -> Result<String, ExtractionError> {
    info!(
        file_name = %document.name,
        size = document.size(),
        "Starting extraction"
    );

    let staged = StagedDocument::write(staging_dir, &document.bytes).await?;
    let outcome = upload_and_generate(backend, staged.path(), prompt).await;
    staged.release();

    match &outcome {
        Ok(text) => info!(characters = text.len(), "Extraction completed"),
        Err(e) => error!(error = %e, "Extraction failed"),
    }
    outcome
}

async fn upload_and_generate(
    backend: &dyn GenerativeBackend,
    staged_path: &Path,
    prompt: &str,
) -> Result<String, ExtractionError> {
    let handle = backend.upload_file(staged_path, PDF_MIME_TYPE).await?;

    let parts = vec![Part::File(handle), Part::Text(prompt.to_string())];
    let config = GenerationConfig {
        temperature: EXTRACTION_TEMPERATURE,
    };

    let response = backend.generate_content(parts, config).await?;
    response.text().ok_or(ExtractionError::EmptyResponse)
}
