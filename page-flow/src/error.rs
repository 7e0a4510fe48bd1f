use thiserror::Error;

/// Errors raised while running a pipeline or touching session storage
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Step '{step_id}' failed: {message}")]
    StepFailed { step_id: String, message: String },

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Pipeline '{0}' has no steps")]
    EmptyPipeline(String),
}

impl FlowError {
    pub fn step_failed(step_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StepFailed {
            step_id: step_id.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
