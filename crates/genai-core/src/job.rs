//! The asynchronous job record: one execution of a workflow for one input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: Uuid,
    pub workflow_id: String,
    pub status: JobStatus,
    pub result: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(workflow_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            workflow_id: workflow_id.into(),
            status: JobStatus::Pending,
            result: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The synthetic record returned for an unknown or expired job id, so
    /// the polling surface can respond uniformly instead of a 404.
    pub fn not_found(job_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            job_id,
            workflow_id: String::new(),
            status: JobStatus::Failed,
            result: Some("Job ID not found or expired".to_string()),
            created_at: now,
            updated_at: now,
        }
    }
}
