use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::genai::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::upload::MULTIPART_OVERHEAD;

/// Service configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub api_base_url: String,
    pub port: u16,
    pub staging_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Sessions untouched for this long are dropped along with their document
    pub session_idle_timeout: Duration,
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GOOGLE_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::Configuration("GOOGLE_API_KEY must be set".to_string()))?;

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| {
                AppError::Configuration(format!("PORT must be a valid port number, got '{raw}'"))
            })?,
            None => 3000,
        };

        let max_upload_mb: usize = match lookup("MAX_UPLOAD_MB") {
            Some(raw) => raw.parse().map_err(|_| {
                AppError::Configuration(format!("MAX_UPLOAD_MB must be a number, got '{raw}'"))
            })?,
            None => 200,
        };

        // The body limit adds multipart framing on top, so that sum must fit too
        let max_upload_bytes = max_upload_mb
            .checked_mul(1024 * 1024)
            .filter(|bytes| bytes.checked_add(MULTIPART_OVERHEAD).is_some())
            .ok_or_else(|| {
                AppError::Configuration(format!("MAX_UPLOAD_MB is too large, got {max_upload_mb}"))
            })?;

        let session_idle_minutes: u64 = match lookup("SESSION_IDLE_MINUTES") {
            Some(raw) => raw.parse().ok().filter(|minutes| *minutes > 0).ok_or_else(|| {
                AppError::Configuration(format!(
                    "SESSION_IDLE_MINUTES must be a positive number, got '{raw}'"
                ))
            })?,
            None => 30,
        };
        let session_idle_timeout = session_idle_minutes
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "SESSION_IDLE_MINUTES is too large, got {session_idle_minutes}"
                ))
            })?;

        Ok(Self {
            api_key,
            model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base_url: lookup("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            port,
            staging_dir: lookup("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            max_upload_bytes,
            session_idle_timeout,
        })
    }
}
