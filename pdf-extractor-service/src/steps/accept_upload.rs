use async_trait::async_trait;
use page_flow::{NextAction, Result, Step};
use tracing::{info, warn};

use crate::view::Block;
use crate::workflow::PageContext;

/// Applies a fresh upload and halts the page until a document is present
pub struct AcceptUploadStep;

#[async_trait]
impl Step<PageContext> for AcceptUploadStep {
    fn id(&self) -> &str {
        "accept_upload"
    }

    async fn run(&self, ctx: &mut PageContext) -> Result<NextAction> {
        match ctx.take_upload() {
            Some(Ok(document)) => {
                info!(
                    file_name = %document.name,
                    size = document.size(),
                    "Document uploaded"
                );
                ctx.session.document = Some(document);
            }
            Some(Err(e)) => {
                warn!(error = %e, "Upload rejected");
                ctx.view.error(e.to_string());
            }
            None => {}
        }

        let Some(document) = &ctx.session.document else {
            ctx.view.info("👆 Please upload a PDF file to get started");
            return Ok(NextAction::WaitForInput);
        };

        ctx.view.push(Block::FileInfo {
            name: document.name.clone(),
            size: document.size(),
        });
        Ok(NextAction::Continue)
    }
}
