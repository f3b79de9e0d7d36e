use std::path::Path;

use uuid::Uuid;

use crate::bootstrap;
use crate::output::Output;

/// `genai status <job-id>` — mirrors `GET /api/workflows/status/{jobId}`.
/// Since this CLI has no backing server process, the job store here is
/// always fresh; looking up any id resolves to the same synthetic FAILED
/// record the spec requires for an unknown job, which is the honest
/// behavior for a one-shot invocation.
pub async fn execute(base_path: &Path, job_id: Uuid, output: &Output) -> anyhow::Result<()> {
    let stack = bootstrap::build(base_path);
    let job = stack.jobs.get(job_id);
    output.print_job_status(&job);
    Ok(())
}
