//! Job Manager (spec.md §4.F) — in-memory, concurrency-safe
//! `jobId -> {status, result}` tracking for asynchronous workflow runs.

use chrono::Utc;
use dashmap::DashMap;
use genai_core::{GenaiError, Job, JobStatus};
use uuid::Uuid;

#[derive(Default)]
pub struct JobManager {
    jobs: DashMap<Uuid, Job>,
}

impl JobManager {
    pub fn new() -> Self {
        Self { jobs: DashMap::new() }
    }

    /// Create a PENDING job record for `workflow_id` and return its id.
    pub fn create(&self, workflow_id: impl Into<String>) -> Uuid {
        let job = Job::new(workflow_id, Utc::now());
        let id = job.job_id;
        self.jobs.insert(id, job);
        id
    }

    /// Transition a job to `status`, recording `result`. Fails on an
    /// unknown id — the dispatcher only ever updates jobs it just created.
    pub fn update(&self, job_id: Uuid, status: JobStatus, result: Option<String>) -> Result<(), GenaiError> {
        let mut entry = self
            .jobs
            .get_mut(&job_id)
            .ok_or(GenaiError::JobNotFound)?;
        entry.status = status;
        entry.result = result;
        entry.updated_at = Utc::now();
        Ok(())
    }

    /// Returns a synthetic FAILED record for an unknown id so a polling
    /// caller gets a uniform response instead of a not-found branch.
    pub fn get(&self, job_id: Uuid) -> Job {
        self.jobs
            .get(&job_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| Job::not_found(job_id, Utc::now()))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_seeds_pending_job() {
        let manager = JobManager::new();
        let id = manager.create("grade-essay");
        let job = manager.get(id);
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.result.is_none());
    }

    #[test]
    fn update_unknown_job_fails() {
        let manager = JobManager::new();
        let err = manager.update(Uuid::new_v4(), JobStatus::Completed, Some("x".into()));
        assert!(matches!(err, Err(GenaiError::JobNotFound)));
    }

    #[test]
    fn get_unknown_job_returns_synthetic_failed_record() {
        let manager = JobManager::new();
        let missing = Uuid::new_v4();
        let job = manager.get(missing);
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.result.as_deref(), Some("Job ID not found or expired"));
    }

    #[test]
    fn update_then_get_roundtrips() {
        let manager = JobManager::new();
        let id = manager.create("triage");
        manager.update(id, JobStatus::Processing, None).unwrap();
        manager.update(id, JobStatus::Completed, Some("done".into())).unwrap();
        let job = manager.get(id);
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.result.as_deref(), Some("done"));
    }
}
