//! Process wiring (spec.md §9 design notes): construct leaves first (model
//! factory; the file watcher and loader live inside the registry's own
//! `start`), then the registries, then the engine — subscribed to the
//! workflow-change channel the agent registry publishes on — then the job
//! manager and dispatcher.

use std::path::Path;
use std::sync::Arc;

use genai_config::AgentRegistry;
use genai_engine::{AsyncDispatcher, JobManager, WorkflowEngine};
use genai_llm::ModelFactory;

pub struct Stack {
    pub agents: Arc<AgentRegistry>,
    pub engine: Arc<WorkflowEngine>,
    pub jobs: Arc<JobManager>,
    pub dispatcher: AsyncDispatcher,
}

pub fn build(base_path: &Path) -> Stack {
    let models = Arc::new(ModelFactory::new());
    let (workflow_tx, workflow_rx) = std::sync::mpsc::channel();

    let agents = AgentRegistry::start(base_path, workflow_tx);
    let engine = WorkflowEngine::start(base_path, agents.clone(), models, workflow_rx);
    let jobs = Arc::new(JobManager::new());
    let dispatcher = AsyncDispatcher::new(engine.clone(), jobs.clone());

    Stack { agents, engine, jobs, dispatcher }
}
