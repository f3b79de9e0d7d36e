//! Workflow Engine (spec.md §4.E) — owns `workflowId -> WorkflowDefinition`
//! with the same load-and-reload discipline as the Agent Registry, but
//! reacts to `WorkflowFileChanged` events pushed across a channel instead
//! of watching the filesystem directly (spec.md §9: this is what breaks
//! the registry/engine dependency cycle).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;

use dashmap::DashMap;
use genai_config::AgentRegistry;
use genai_core::{
    postprocess_response, AgentExecutionError, ExecutionContext, GenaiError, InputSource,
    WorkflowDefinition, WorkflowFileChanged, WorkflowTopology,
};
use genai_llm::ModelFactory;

pub struct WorkflowEngine {
    base_root: PathBuf,
    workflows: DashMap<String, Arc<WorkflowDefinition>>,
    agents: Arc<AgentRegistry>,
    models: Arc<ModelFactory>,
}

impl WorkflowEngine {
    /// Walk `base_root`'s `workflows` subtree once, then spawn a thread that
    /// reloads on every `WorkflowFileChanged` the registry forwards.
    pub fn start(
        base_root: impl Into<PathBuf>,
        agents: Arc<AgentRegistry>,
        models: Arc<ModelFactory>,
        workflow_rx: std_mpsc::Receiver<WorkflowFileChanged>,
    ) -> Arc<Self> {
        let engine = Arc::new(Self {
            base_root: base_root.into(),
            workflows: DashMap::new(),
            agents,
            models,
        });

        engine.initial_scan();

        let watched = engine.clone();
        std::thread::spawn(move || {
            while let Ok(event) = workflow_rx.recv() {
                watched.reload(&event.path);
            }
        });

        engine
    }

    fn initial_scan(&self) {
        for path in walk_yaml_files(&self.base_root) {
            if is_under(&path, "workflows") {
                self.reload(&path);
            }
        }
    }

    fn reload(&self, path: &Path) {
        match load_workflow(path) {
            Ok(def) => {
                tracing::info!(workflow_id = %def.id, path = %path.display(), "workflow loaded");
                self.workflows.insert(def.id.clone(), Arc::new(def));
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load workflow, keeping previous entry");
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<WorkflowDefinition>> {
        self.workflows.get(id).map(|entry| entry.value().clone())
    }

    pub fn get_all(&self) -> HashMap<String, Arc<WorkflowDefinition>> {
        self.workflows.iter().map(|entry| (entry.key().clone(), entry.value().clone())).collect()
    }

    /// Run a workflow to completion and return its output string.
    pub async fn run(&self, workflow_id: &str, initial_input: &str) -> Result<String, AgentExecutionError> {
        let workflow = self
            .get(workflow_id)
            .ok_or_else(|| GenaiError::WorkflowNotFound(workflow_id.to_string()))?;

        match &workflow.topology {
            WorkflowTopology::Chain(chain) => self.run_chain(chain, initial_input).await,
            WorkflowTopology::Router(router) => self.run_router(router, initial_input).await,
        }
    }

    async fn run_chain(
        &self,
        chain: &genai_core::ChainWorkflow,
        initial_input: &str,
    ) -> Result<String, AgentExecutionError> {
        let mut ctx = ExecutionContext::new(initial_input);
        let mut current = initial_input.to_string();

        for step in &chain.steps {
            let step_input = match &step.input_template {
                Some(template) => ctx.render_template(template),
                None => match step.input_source {
                    InputSource::UserInput => ctx.user_input().to_string(),
                    InputSource::Previous => current.clone(),
                },
            };

            let response = self.invoke_agent(&step.agent_id, &step_input).await?;

            ctx.insert_once(step.step_id.clone(), response.clone())
                .map_err(AgentExecutionError::from)?;
            current = response;
        }

        Ok(current)
    }

    async fn run_router(
        &self,
        router: &genai_core::RouterWorkflow,
        initial_input: &str,
    ) -> Result<String, AgentExecutionError> {
        let mut current = initial_input.to_string();
        let max_steps = router.effective_max_steps();

        for _ in 0..max_steps {
            let routing_prompt = build_routing_prompt(&current, &router.allowed_agents);
            let decision_raw = self.invoke_agent(&router.manager_agent_id, &routing_prompt).await?;

            let next_agent = match parse_next_agent(&decision_raw) {
                Some(id) => id,
                None => return Ok(current),
            };

            if next_agent.eq_ignore_ascii_case("FINISH") {
                return Ok(current);
            }

            if router.enforce_allowed_agents
                && !router.allowed_agents.iter().any(|a| a == &next_agent)
            {
                tracing::warn!(agent_id = %next_agent, "router chose an agent outside allowedAgents, stopping");
                return Ok(current);
            }

            current = self.invoke_agent(&next_agent, &current).await?;
        }

        Ok(current)
    }

    async fn invoke_agent(&self, agent_id: &str, input: &str) -> Result<String, AgentExecutionError> {
        let agent = self
            .agents
            .get(agent_id)
            .ok_or_else(|| GenaiError::AgentNotFound(agent_id.to_string()))?;

        let model = self.models.model_for(&agent).map_err(AgentExecutionError::from)?;
        let prompt = agent.build_prompt(input);
        let raw = model.chat(&prompt).await?;
        Ok(postprocess_response(&raw))
    }
}

/// Build the manager-facing routing prompt: current payload plus the
/// allowed-agent roster, asking for `{"next_agent": "<id>"}` or `"FINISH"`.
fn build_routing_prompt(current: &str, allowed_agents: &[String]) -> String {
    format!(
        "Current payload:\n{current}\n\nAvailable agents: {}\n\nRespond with JSON of the form {{\"next_agent\": \"<agent id>\"}} or {{\"next_agent\": \"FINISH\"}} once the task is complete.",
        allowed_agents.join(", ")
    )
}

/// Parse the manager's routing decision. Any parse failure is fail-safe
/// FINISH (spec.md §4.E step 3), signaled here by returning `None`.
fn parse_next_agent(raw: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(raw).ok()?;
    parsed.get("next_agent")?.as_str().map(|s| s.to_string())
}

fn load_workflow(path: &Path) -> Result<WorkflowDefinition, GenaiError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| GenaiError::file_io(format!("reading {}: {e}", path.display())))?;
    let def: WorkflowDefinition = serde_yaml::from_str(&content)
        .map_err(|e| GenaiError::config_invalid(format!("parsing {}: {e}", path.display())))?;
    def.validate()?;
    Ok(def)
}

fn walk_yaml_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    walk_into(root, &mut out);
    out
}

fn walk_into(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if name == ".git" || name == "target" {
                continue;
            }
            walk_into(&path, out);
        } else if path.extension().and_then(|e| e.to_str()).map(|e| e.eq_ignore_ascii_case("yaml")).unwrap_or(false) {
            out.push(path);
        }
    }
}

fn is_under(path: &Path, name: &str) -> bool {
    path.components().any(|c| c.as_os_str().to_str() == Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_next_agent_reads_bare_id() {
        assert_eq!(parse_next_agent(r#"{"next_agent": "researcher"}"#), Some("researcher".to_string()));
    }

    #[test]
    fn parse_next_agent_handles_finish() {
        assert_eq!(parse_next_agent(r#"{"next_agent": "FINISH"}"#), Some("FINISH".to_string()));
    }

    #[test]
    fn parse_next_agent_fails_safe_on_garbage() {
        assert_eq!(parse_next_agent("not json at all"), None);
    }

    #[test]
    fn load_workflow_rejects_duplicate_step_id() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("dup.yaml");
        std::fs::write(
            &path,
            "id: dup\nname: Dup\ntype: CHAIN\nsteps:\n  - stepId: step1\n    agentId: a\n  - stepId: step1\n    agentId: b\n",
        )
        .unwrap();
        let err = load_workflow(&path).unwrap_err();
        assert!(matches!(err, GenaiError::ConfigInvalid(_)));
    }

    #[test]
    fn is_under_matches_workflows_subtree() {
        assert!(is_under(Path::new("/base/env/workflows/pipeline.yaml"), "workflows"));
        assert!(!is_under(Path::new("/base/env/agents/a.yaml"), "workflows"));
    }
}
