use std::sync::Arc;
use tracing::{debug, error};

use crate::{
    error::{FlowError, Result},
    step::{NextAction, Step},
};

/// An ordered sequence of steps run once per interaction cycle
pub struct Pipeline<C: Send> {
    pub id: String,
    steps: Vec<Arc<dyn Step<C>>>,
}

impl<C: Send> Pipeline<C> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step to the end of the pipeline
    pub fn add_step(&mut self, step: Arc<dyn Step<C>>) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn step_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.id()).collect()
    }

    /// Run the steps in order until one of them stops the cycle.
    ///
    /// A failing step does not abort the caller: the failure is logged and reported as
    /// [`ExecutionStatus::Error`] so the cycle can still produce output.
    pub async fn execute(&self, ctx: &mut C) -> Result<ExecutionResult> {
        if self.steps.is_empty() {
            return Err(FlowError::EmptyPipeline(self.id.clone()));
        }

        let mut steps_run = 0;
        for step in &self.steps {
            let step_id = step.id().to_string();
            steps_run += 1;

            let next_action = match step.run(ctx).await {
                Ok(next_action) => next_action,
                Err(e) => {
                    error!(pipeline = %self.id, step_id = %step_id, error = %e, "Step failed");
                    return Ok(ExecutionResult {
                        status: ExecutionStatus::Error(e.to_string()),
                        last_step_id: step_id,
                        steps_run,
                    });
                }
            };

            debug!(pipeline = %self.id, step_id = %step_id, ?next_action, "Step finished");

            match next_action {
                NextAction::Continue => continue,
                NextAction::WaitForInput => {
                    return Ok(ExecutionResult {
                        status: ExecutionStatus::WaitingForInput,
                        last_step_id: step_id,
                        steps_run,
                    });
                }
                NextAction::End => {
                    return Ok(ExecutionResult {
                        status: ExecutionStatus::Completed,
                        last_step_id: step_id,
                        steps_run,
                    });
                }
            }
        }

        // Falling off the end means every step asked to continue
        let last_step_id = self
            .steps
            .last()
            .map(|step| step.id().to_string())
            .unwrap_or_default();
        Ok(ExecutionResult {
            status: ExecutionStatus::Completed,
            last_step_id,
            steps_run,
        })
    }
}

/// Builder for creating pipelines
pub struct PipelineBuilder<C: Send> {
    pipeline: Pipeline<C>,
}

impl<C: Send> PipelineBuilder<C> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            pipeline: Pipeline::new(id),
        }
    }

    pub fn add_step(mut self, step: Arc<dyn Step<C>>) -> Self {
        self.pipeline.add_step(step);
        self
    }

    pub fn build(self) -> Pipeline<C> {
        self.pipeline
    }
}

/// Outcome of one pipeline cycle
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    /// The step that stopped the cycle (or the last step if all continued)
    pub last_step_id: String,
    pub steps_run: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// A step is waiting for the user before the rest can run
    WaitingForInput,
    /// The cycle ran to its end
    Completed,
    /// A step failed; the message is safe to show
    Error(String),
}
