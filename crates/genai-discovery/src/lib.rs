// GenAI Discovery - read-only projections over the agent and workflow
// registries. Never exposes prompts, model config, or metadata.

use genai_config::AgentRegistry;
use genai_engine::WorkflowEngine;
use serde::Serialize;

/// Public-safe view of an agent. Deliberately omits `systemPrompt`,
/// `userPrompt`, `model`, and `metadata` (spec.md §4.H, §8 discovery-safety
/// invariant).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub allowed_tools: Vec<String>,
}

/// Public-safe view of a workflow: just its routing topology, never its
/// steps or manager agent.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub topology: String,
}

pub fn list_agents(registry: &AgentRegistry) -> Vec<AgentSummary> {
    let mut agents: Vec<AgentSummary> = registry
        .get_all()
        .into_values()
        .map(|def| AgentSummary {
            id: def.id.clone(),
            name: def.name.clone(),
            description: def.description.clone(),
            allowed_tools: def.allowed_tools.clone(),
        })
        .collect();
    agents.sort_by(|a, b| a.id.cmp(&b.id));
    agents
}

pub fn list_workflows(engine: &WorkflowEngine) -> Vec<WorkflowSummary> {
    let mut workflows: Vec<WorkflowSummary> = engine
        .get_all()
        .into_values()
        .map(|def| WorkflowSummary {
            id: def.id.clone(),
            name: def.name.clone(),
            topology: if def.is_chain() { "CHAIN".to_string() } else { "ROUTER".to_string() },
        })
        .collect();
    workflows.sort_by(|a, b| a.id.cmp(&b.id));
    workflows
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn write_file(dir: &std::path::Path, rel: &str, content: &str) {
        let full = dir.join(rel);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }

    #[test]
    fn agent_summary_never_carries_prompt_or_model_fields() {
        let tmp = TempDir::new().unwrap();
        write_file(
            tmp.path(),
            "agents/summarizer.yaml",
            "id: summarizer\nname: Summarizer\ndescription: condenses text\nsystemPromptPath: system.md\nmodel:\n  provider: openai\n  name: gpt-4o-mini\n",
        );
        write_file(tmp.path(), "agents/system.md", "SECRET_SYSTEM_PROMPT_TEXT");

        let (tx, _rx) = mpsc::channel();
        let registry = AgentRegistry::start(tmp.path(), tx);
        let summaries = list_agents(&registry);

        let serialized = serde_json::to_string(&summaries).unwrap();
        assert!(!serialized.contains("SECRET_SYSTEM_PROMPT_TEXT"));
        assert!(!serialized.contains("openai"));
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, "summarizer");
    }

    #[test]
    fn workflow_summary_reports_topology_kind() {
        let tmp = TempDir::new().unwrap();
        write_file(
            tmp.path(),
            "workflows/grade-essay.yaml",
            "id: grade-essay\nname: Grade Essay\ntype: CHAIN\nsteps: []\n",
        );
        let (agent_tx, agent_rx) = mpsc::channel();
        let agents = AgentRegistry::start(tmp.path(), agent_tx);
        let (workflow_tx, workflow_rx) = mpsc::channel();
        drop(agent_rx);
        drop(workflow_tx);
        let models = std::sync::Arc::new(genai_llm::ModelFactory::new());
        let engine = WorkflowEngine::start(tmp.path(), agents, models, workflow_rx);

        let summaries = list_workflows(&engine);
        assert_eq!(summaries, vec![WorkflowSummary {
            id: "grade-essay".to_string(),
            name: "Grade Essay".to_string(),
            topology: "CHAIN".to_string(),
        }]);
    }
}
