pub mod error;
pub mod pipeline;
pub mod step;
pub mod storage;

// Re-export commonly used types
pub use error::{FlowError, Result};
pub use pipeline::{ExecutionResult, ExecutionStatus, Pipeline, PipelineBuilder};
pub use step::{NextAction, Step};
pub use storage::{InMemorySessionStorage, SessionStorage};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct Trail {
        visited: Vec<String>,
        ready: bool,
    }

    struct RecordStep {
        id: String,
        next: NextAction,
    }

    #[async_trait]
    impl Step<Trail> for RecordStep {
        fn id(&self) -> &str {
            &self.id
        }

        async fn run(&self, ctx: &mut Trail) -> Result<NextAction> {
            ctx.visited.push(self.id.clone());
            Ok(self.next)
        }
    }

    struct GateStep;

    #[async_trait]
    impl Step<Trail> for GateStep {
        fn id(&self) -> &str {
            "gate"
        }

        async fn run(&self, ctx: &mut Trail) -> Result<NextAction> {
            ctx.visited.push("gate".to_string());
            if ctx.ready {
                Ok(NextAction::Continue)
            } else {
                Ok(NextAction::WaitForInput)
            }
        }
    }

    struct FailingStep;

    #[async_trait]
    impl Step<Trail> for FailingStep {
        fn id(&self) -> &str {
            "failing"
        }

        async fn run(&self, _ctx: &mut Trail) -> Result<NextAction> {
            Err(FlowError::step_failed("failing", "boom"))
        }
    }

    fn record(id: &str, next: NextAction) -> Arc<dyn Step<Trail>> {
        Arc::new(RecordStep {
            id: id.to_string(),
            next,
        })
    }

    fn gated_pipeline() -> Pipeline<Trail> {
        PipelineBuilder::<Trail>::new("gated")
            .add_step(record("first", NextAction::Continue))
            .add_step(Arc::new(GateStep))
            .add_step(record("last", NextAction::End))
            .build()
    }

    #[tokio::test]
    async fn test_pipeline_halts_when_step_waits_for_input() {
        let pipeline = gated_pipeline();
        let mut trail = Trail::default();

        let result = pipeline.execute(&mut trail).await.unwrap();

        assert_eq!(result.status, ExecutionStatus::WaitingForInput);
        assert_eq!(result.last_step_id, "gate");
        assert_eq!(result.steps_run, 2);
        assert_eq!(trail.visited, vec!["first", "gate"]);
    }

    #[tokio::test]
    async fn test_pipeline_runs_to_end_once_gate_opens() {
        let pipeline = gated_pipeline();
        let mut trail = Trail {
            ready: true,
            ..Default::default()
        };

        let result = pipeline.execute(&mut trail).await.unwrap();

        assert_eq!(result.status, ExecutionStatus::Completed);
        assert_eq!(result.last_step_id, "last");
        assert_eq!(trail.visited, vec!["first", "gate", "last"]);
    }

    #[tokio::test]
    async fn test_step_failure_is_reported_not_propagated() {
        let pipeline = PipelineBuilder::<Trail>::new("failing")
            .add_step(Arc::new(FailingStep))
            .add_step(record("never", NextAction::End))
            .build();
        let mut trail = Trail::default();

        let result = pipeline.execute(&mut trail).await.unwrap();

        match result.status {
            ExecutionStatus::Error(message) => assert!(message.contains("boom")),
            other => panic!("expected error status, got {:?}", other),
        }
        assert!(trail.visited.is_empty());
    }

    #[tokio::test]
    async fn test_empty_pipeline_is_rejected() {
        let pipeline: Pipeline<Trail> = PipelineBuilder::new("empty").build();
        let mut trail = Trail::default();

        assert!(matches!(
            pipeline.execute(&mut trail).await,
            Err(FlowError::EmptyPipeline(_))
        ));
    }

    #[tokio::test]
    async fn test_storage() {
        let storage: InMemorySessionStorage<Vec<u32>> = InMemorySessionStorage::new();

        storage.save("session1", vec![1, 2]).await.unwrap();
        assert_eq!(storage.get("session1").await.unwrap(), Some(vec![1, 2]));
        assert_eq!(storage.len(), 1);

        storage.delete("session1").await.unwrap();
        assert!(storage.get("session1").await.unwrap().is_none());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_idle_session_expires() {
        let storage: InMemorySessionStorage<u32> =
            InMemorySessionStorage::with_idle_timeout(Duration::from_millis(30));

        storage.save("stale", 1).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        storage.save("fresh", 2).await.unwrap();

        assert_eq!(storage.evict_idle(), 1);
        assert_eq!(storage.len(), 1);
        assert!(storage.get("stale").await.unwrap().is_none());
        assert_eq!(storage.get("fresh").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_idle_session_is_gone_on_read() {
        let storage: InMemorySessionStorage<u32> =
            InMemorySessionStorage::with_idle_timeout(Duration::from_millis(30));

        storage.save("session1", 7).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(storage.get("session1").await.unwrap().is_none());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_storage_without_timeout_never_evicts() {
        let storage: InMemorySessionStorage<u32> = InMemorySessionStorage::new();

        storage.save("session1", 7).await.unwrap();
        assert_eq!(storage.evict_idle(), 0);
        assert_eq!(storage.get("session1").await.unwrap(), Some(7));
    }
}
