use async_trait::async_trait;
use page_flow::{NextAction, Result, Step};
use tracing::info;

use crate::intent::{Collected, collect};
use crate::view::Block;
use crate::workflow::{Interaction, PageContext};

/// Runs the intent collector; the page stops here until an intent is stored
pub struct CollectIntentStep;

#[async_trait]
impl Step<PageContext> for CollectIntentStep {
    fn id(&self) -> &str {
        "collect_intent"
    }

    async fn run(&self, ctx: &mut PageContext) -> Result<NextAction> {
        if matches!(ctx.interaction, Interaction::Reset) {
            info!("Intent reset by user");
            ctx.session.reset();
        }

        let submission = ctx.take_submission();
        match collect(&mut ctx.session, submission) {
            Collected::Ready(intent) => {
                ctx.view.push(Block::IntentSummary(intent));
                Ok(NextAction::Continue)
            }
            Collected::Rejected { form, error } => {
                ctx.view.push(Block::IntentForm(Some(form)));
                ctx.view.error(error.to_string());
                Ok(NextAction::WaitForInput)
            }
            Collected::Pending => {
                ctx.view.push(Block::IntentForm(None));
                Ok(NextAction::WaitForInput)
            }
        }
    }
}
