use axum::body::Bytes;
use std::path::Path;

use crate::error::AppError;
use crate::extraction::PDF_MIME_TYPE;
use crate::models::UploadedDocument;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Room for multipart framing on top of the file itself
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Check one uploaded file and accept it as the session's document.
///
/// The name or declared content type must say PDF, and the bytes must start with the
/// PDF header.
pub fn accept_pdf(
    file_name: Option<&str>,
    content_type: Option<&str>,
    bytes: Bytes,
) -> Result<UploadedDocument, AppError> {
    if bytes.is_empty() {
        return Err(AppError::Upload(
            "Please choose a PDF file to upload.".to_string(),
        ));
    }

    let name = file_name
        .and_then(|name| Path::new(name).file_name())
        .and_then(|name| name.to_str())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or("document.pdf")
        .to_string();

    let has_pdf_extension = name.to_ascii_lowercase().ends_with(".pdf");
    let declared_pdf = content_type.is_some_and(|ct| ct.eq_ignore_ascii_case(PDF_MIME_TYPE));
    if !has_pdf_extension && !declared_pdf {
        return Err(AppError::Upload(format!(
            "Only PDF files are supported, got '{name}'."
        )));
    }

    if !bytes.starts_with(PDF_MAGIC) {
        return Err(AppError::Upload(format!(
            "'{name}' does not look like a PDF document."
        )));
    }

    Ok(UploadedDocument { name, bytes })
}
