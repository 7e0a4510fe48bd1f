use async_trait::async_trait;
use page_flow::{FlowError, NextAction, Result, Step};

use crate::prompt;
use crate::view::Block;
use crate::workflow::PageContext;

pub struct BuildPromptStep;

#[async_trait]
impl Step<PageContext> for BuildPromptStep {
    fn id(&self) -> &str {
        "build_prompt"
    }

    async fn run(&self, ctx: &mut PageContext) -> Result<NextAction> {
        let intent = ctx
            .session
            .intent()
            .ok_or_else(|| FlowError::step_failed(self.id(), "no intent has been submitted"))?;

        ctx.prompt = Some(prompt::build(intent));
        ctx.view.push(Block::ExtractAction);
        Ok(NextAction::Continue)
    }
}
