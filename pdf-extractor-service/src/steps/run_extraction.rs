use async_trait::async_trait;
use chrono::Local;
use page_flow::{FlowError, NextAction, Result, Step};
use tracing::{error, info};

use crate::error::AppError;
use crate::extraction;
use crate::present::present;
use crate::view::Block;
use crate::workflow::{Interaction, PageContext};

/// Calls the model when the user asks for it and shows the result
pub struct RunExtractionStep;

#[async_trait]
impl Step<PageContext> for RunExtractionStep {
    fn id(&self) -> &str {
        "run_extraction"
    }

    async fn run(&self, ctx: &mut PageContext) -> Result<NextAction> {
        if !matches!(ctx.interaction, Interaction::Extract) {
            return Ok(NextAction::End);
        }

        let Some(document) = ctx.session.document.clone() else {
            let e = AppError::Upload("Please upload a PDF file first.".to_string());
            ctx.view.error(e.to_string());
            return Ok(NextAction::End);
        };
        let intent = ctx
            .session
            .intent()
            .cloned()
            .ok_or_else(|| FlowError::step_failed(self.id(), "no intent has been submitted"))?;
        let prompt = ctx
            .prompt
            .clone()
            .ok_or_else(|| FlowError::step_failed(self.id(), "prompt was not built"))?;

        let outcome = extraction::extract(
            ctx.backend.as_ref(),
            &ctx.staging_dir,
            &document,
            &prompt,
        )
        .await
        .map_err(AppError::from);

        match outcome {
            Ok(text) => {
                let presentation = present(&text, &intent, Local::now());
                info!(export = %presentation.export.file_name, "Result ready");
                ctx.session.last_export = Some(presentation.export.clone());
                ctx.view.push(Block::Result(presentation));
            }
            Err(e) => {
                error!(file_name = %document.name, error = %e, "Extraction request failed");
                ctx.view.error(format!("❌ {e}"));
            }
        }
        Ok(NextAction::End)
    }
}
