use std::path::Path;

use crate::bootstrap;
use crate::output::Output;

/// `genai discover agents` — mirrors `GET /api/discovery/agents`.
pub async fn agents(base_path: &Path, output: &Output) -> anyhow::Result<()> {
    let stack = bootstrap::build(base_path);
    let summaries = genai_discovery::list_agents(&stack.agents);
    output.print_agents_table(&summaries);
    Ok(())
}

/// `genai discover workflows` — mirrors `GET /api/discovery/workflows`.
pub async fn workflows(base_path: &Path, output: &Output) -> anyhow::Result<()> {
    let stack = bootstrap::build(base_path);
    let summaries = genai_discovery::list_workflows(&stack.engine);
    output.print_workflows_table(&summaries);
    Ok(())
}
