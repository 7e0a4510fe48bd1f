use async_trait::async_trait;

use crate::error::Result;

/// Defines what should happen after a step completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// Run the next step in the pipeline within the same cycle
    Continue,
    /// Stop this cycle here; the user has to act before later steps can run
    WaitForInput,
    /// Stop this cycle; nothing is pending
    End,
}

/// One unit of work in a pipeline.
///
/// `C` is the per-cycle context: it owns whatever the step reads (session state, the
/// user's interaction) and whatever it produces (page output).
#[async_trait]
pub trait Step<C>: Send + Sync
where
    C: Send,
{
    /// Unique identifier for this step
    fn id(&self) -> &str;

    async fn run(&self, ctx: &mut C) -> Result<NextAction>;
}
