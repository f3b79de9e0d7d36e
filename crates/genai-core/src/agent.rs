//! Agent configuration and hydrated agent definitions.
//!
//! `AgentConfig` is the on-disk shape (spec.md §3); `AgentDefinition` is
//! the immutable, fully-hydrated form the Agent Loader produces once
//! prompt includes are expanded and placeholders substituted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// On-disk agent configuration, one per YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub system_prompt_path: Option<String>,
    #[serde(default)]
    pub user_prompt_path: Option<String>,

    pub model: ModelSpec,

    #[serde(default)]
    pub allowed_tools: Vec<String>,

    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Model selection embedded in an `AgentConfig`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSpec {
    pub provider: String,
    pub name: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    0.7
}

/// Fully hydrated agent: superset of `AgentConfig` with resolved prompt text.
///
/// Immutable once constructed. Registries hand out `Arc<AgentDefinition>`
/// snapshots rather than references, so a reader never observes a
/// half-built definition while a reload is in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDefinition {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,

    pub system_prompt: String,
    pub user_prompt: String,

    pub model: ModelSpec,
    pub allowed_tools: Vec<String>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl AgentDefinition {
    /// Build the final prompt for a chain/router step: the agent's system
    /// prompt followed by the step's resolved user input.
    pub fn build_prompt(&self, step_input: &str) -> String {
        format!("{}\n\nUser Input:\n{}", self.system_prompt, step_input)
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_config() {
        let yaml = r#"
id: summarizer
name: Summarizer
model:
  provider: openai
  name: gpt-4o-mini
"#;
        let config: AgentConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.id, "summarizer");
        assert_eq!(config.model.provider, "openai");
        assert!((config.model.temperature - 0.7).abs() < f32::EPSILON);
        assert!(config.system_prompt_path.is_none());
    }

    #[test]
    fn build_prompt_joins_system_and_input() {
        let def = AgentDefinition {
            id: "a".into(),
            name: "A".into(),
            version: "1".into(),
            description: String::new(),
            system_prompt: "Be concise.".into(),
            user_prompt: String::new(),
            model: ModelSpec {
                provider: "openai".into(),
                name: "gpt-4o-mini".into(),
                temperature: 0.0,
            },
            allowed_tools: vec![],
            metadata: HashMap::new(),
        };
        assert_eq!(
            def.build_prompt("essay"),
            "Be concise.\n\nUser Input:\nessay"
        );
    }
}
