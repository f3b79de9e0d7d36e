use std::path::Path;
use std::time::Duration;

use genai_core::JobStatus;

use crate::bootstrap;
use crate::output::{Output, Spinner};

/// `genai submit <workflow-id> <input>` — mirrors `POST
/// /api/workflows/submit/{workflowId}` at the function-call level: create
/// a PENDING job, then poll the in-process job manager to completion since
/// there's no separate server process to poll against.
pub async fn execute(base_path: &Path, workflow_id: &str, input: &str, output: &Output) -> anyhow::Result<()> {
    let stack = bootstrap::build(base_path);
    let job_id = stack.dispatcher.submit(workflow_id, input);
    output.print_job_submitted(&job_id.to_string());

    let mut spinner = Spinner::new("running workflow");
    loop {
        let job = stack.jobs.get(job_id);
        if job.status.is_terminal() {
            spinner.finish(job.status == JobStatus::Completed);
            output.print_job_status(&job);
            break;
        }
        spinner.tick();
        tokio::time::sleep(Duration::from_millis(150)).await;
    }

    Ok(())
}
