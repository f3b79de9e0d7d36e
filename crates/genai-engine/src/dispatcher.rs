//! Async Dispatcher (spec.md §4.G) — submits a workflow run as a
//! fire-and-forget background job. Workers never propagate errors to the
//! caller; every outcome lands as a terminal job status instead.

use std::sync::Arc;
use uuid::Uuid;

use genai_core::JobStatus;

use crate::engine::WorkflowEngine;
use crate::job::JobManager;

pub struct AsyncDispatcher {
    engine: Arc<WorkflowEngine>,
    jobs: Arc<JobManager>,
}

impl AsyncDispatcher {
    pub fn new(engine: Arc<WorkflowEngine>, jobs: Arc<JobManager>) -> Self {
        Self { engine, jobs }
    }

    /// Create a PENDING job synchronously, hand off execution, and return
    /// the job id immediately.
    pub fn submit(&self, workflow_id: impl Into<String>, initial_input: impl Into<String>) -> Uuid {
        let workflow_id = workflow_id.into();
        let initial_input = initial_input.into();
        let job_id = self.jobs.create(workflow_id.clone());

        let engine = self.engine.clone();
        let jobs = self.jobs.clone();
        tokio::spawn(async move {
            if let Err(e) = jobs.update(job_id, JobStatus::Processing, None) {
                tracing::warn!(%job_id, error = %e, "failed to mark job processing");
                return;
            }

            match engine.run(&workflow_id, &initial_input).await {
                Ok(output) => {
                    if let Err(e) = jobs.update(job_id, JobStatus::Completed, Some(output)) {
                        tracing::warn!(%job_id, error = %e, "failed to record job completion");
                    }
                }
                Err(err) => {
                    let message = format!("Processing failed: {}", err.message);
                    if let Err(e) = jobs.update(job_id, JobStatus::Failed, Some(message)) {
                        tracing::warn!(%job_id, error = %e, "failed to record job failure");
                    }
                }
            }
        });

        job_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai_config::AgentRegistry;
    use genai_llm::ModelFactory;
    use std::sync::mpsc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn submit_unknown_workflow_resolves_to_failed_job() {
        let tmp = TempDir::new().unwrap();
        let (tx, rx) = mpsc::channel();
        let agents = AgentRegistry::start(tmp.path(), tx);
        let models = Arc::new(ModelFactory::new());
        let engine = WorkflowEngine::start(tmp.path(), agents, models, rx);
        let jobs = Arc::new(JobManager::new());
        let dispatcher = AsyncDispatcher::new(engine, jobs.clone());

        let job_id = dispatcher.submit("does-not-exist", "hello");

        for _ in 0..50 {
            if jobs.get(job_id).status.is_terminal() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let job = jobs.get(job_id);
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.result.unwrap().starts_with("Processing failed: "));
    }
}
