use page_flow::{ExecutionStatus, FlowError, Pipeline, PipelineBuilder, SessionStorage};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::genai::GenerativeBackend;
use crate::intent::IntentForm;
use crate::models::UploadedDocument;
use crate::session::SessionState;
use crate::steps::*;
use crate::view::PageView;

/// What the user did to trigger this cycle
#[derive(Debug)]
pub enum Interaction {
    View,
    Upload(Result<UploadedDocument, AppError>),
    SubmitIntent(IntentForm),
    Extract,
    Reset,
}

impl Interaction {
    pub fn name(&self) -> &'static str {
        match self {
            Interaction::View => "view",
            Interaction::Upload(_) => "upload",
            Interaction::SubmitIntent(_) => "submit_intent",
            Interaction::Extract => "extract",
            Interaction::Reset => "reset",
        }
    }
}

/// Everything one cycle works on
pub struct PageContext {
    pub session: SessionState,
    pub interaction: Interaction,
    pub backend: Arc<dyn GenerativeBackend>,
    pub staging_dir: PathBuf,
    pub prompt: Option<String>,
    pub view: PageView,
}

impl PageContext {
    /// Take the upload out of the interaction, leaving a plain view behind
    pub fn take_upload(&mut self) -> Option<Result<UploadedDocument, AppError>> {
        match std::mem::replace(&mut self.interaction, Interaction::View) {
            Interaction::Upload(outcome) => Some(outcome),
            other => {
                self.interaction = other;
                None
            }
        }
    }

    /// Take the intent form out of the interaction, leaving a plain view behind
    pub fn take_submission(&mut self) -> Option<IntentForm> {
        match std::mem::replace(&mut self.interaction, Interaction::View) {
            Interaction::SubmitIntent(form) => Some(form),
            other => {
                self.interaction = other;
                None
            }
        }
    }
}

pub fn build_page_pipeline() -> Pipeline<PageContext> {
    PipelineBuilder::<PageContext>::new("pdf_extraction")
        .add_step(Arc::new(AcceptUploadStep))
        .add_step(Arc::new(CollectIntentStep))
        .add_step(Arc::new(BuildPromptStep))
        .add_step(Arc::new(RunExtractionStep))
        .build()
}

/// Loads a session, runs one cycle of the page pipeline, and saves the session back.
#[derive(Clone)]
pub struct CycleRunner {
    pipeline: Arc<Pipeline<PageContext>>,
    storage: Arc<dyn SessionStorage<SessionState>>,
    backend: Arc<dyn GenerativeBackend>,
    staging_dir: PathBuf,
}

impl CycleRunner {
    pub fn new(
        storage: Arc<dyn SessionStorage<SessionState>>,
        backend: Arc<dyn GenerativeBackend>,
        staging_dir: PathBuf,
    ) -> Self {
        Self {
            pipeline: Arc::new(build_page_pipeline()),
            storage,
            backend,
            staging_dir,
        }
    }

    pub async fn run(
        &self,
        session_id: &str,
        interaction: Interaction,
    ) -> Result<PageView, FlowError> {
        let stored = self.storage.get(session_id).await?;
        let is_new = stored.is_none();
        let session = stored.unwrap_or_else(|| {
            info!(session_id = %session_id, "Starting new session");
            SessionState::new()
        });

        info!(
            session_id = %session_id,
            interaction = interaction.name(),
            "Running page cycle"
        );

        let mut ctx = PageContext {
            session,
            interaction,
            backend: self.backend.clone(),
            staging_dir: self.staging_dir.clone(),
            prompt: None,
            view: PageView::default(),
        };

        let result = self.pipeline.execute(&mut ctx).await?;
        if let ExecutionStatus::Error(message) = &result.status {
            warn!(
                session_id = %session_id,
                step_id = %result.last_step_id,
                "Cycle stopped by a failing step"
            );
            ctx.view.error(format!("❌ An error occurred: {message}"));
        }

        if is_new && ctx.session.is_blank() {
            debug!(session_id = %session_id, "Nothing to keep, session not stored");
        } else {
            self.storage.save(session_id, ctx.session).await?;
        }
        Ok(ctx.view)
    }

    pub async fn session(&self, session_id: &str) -> Result<Option<SessionState>, FlowError> {
        self.storage.get(session_id).await
    }
}
