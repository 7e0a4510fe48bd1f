use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// How the user wants the answer laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputStyle {
    #[default]
    #[serde(rename = "Bullet list")]
    BulletList,
    #[serde(rename = "Numbered list")]
    NumberedList,
    #[serde(rename = "Table")]
    Table,
    #[serde(rename = "Paragraph summary")]
    ParagraphSummary,
    #[serde(rename = "JSON")]
    Json,
}

impl OutputStyle {
    pub const ALL: [OutputStyle; 5] = [
        OutputStyle::BulletList,
        OutputStyle::NumberedList,
        OutputStyle::Table,
        OutputStyle::ParagraphSummary,
        OutputStyle::Json,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OutputStyle::BulletList => "Bullet list",
            OutputStyle::NumberedList => "Numbered list",
            OutputStyle::Table => "Table",
            OutputStyle::ParagraphSummary => "Paragraph summary",
            OutputStyle::Json => "JSON",
        }
    }
}

impl fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OutputStyle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        OutputStyle::ALL
            .into_iter()
            .find(|style| style.label() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown output style: {s}")))
    }
}

/// What the user asked for. Only built through validation, so `goal` is never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIntent {
    pub goal: String,
    pub entities: Vec<String>,
    pub style: OutputStyle,
    pub notes: String,
}

/// The PDF the user uploaded, held in memory for the session
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub name: String,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}
