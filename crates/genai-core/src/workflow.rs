//! Workflow definitions: the CHAIN and ROUTER topologies.
//!
//! A `WorkflowDefinition` is an enum over the two topologies rather than a
//! struct with always-optional fields, so a malformed mix (a chain with a
//! `managerAgentId`, say) is unrepresentable instead of needing load-time
//! validation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::GenaiError;

/// A workflow definition: either a fixed linear `Chain` or a manager-led
/// `Router` loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(flatten)]
    pub topology: WorkflowTopology,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum WorkflowTopology {
    Chain(ChainWorkflow),
    Router(RouterWorkflow),
}

impl WorkflowDefinition {
    pub fn is_chain(&self) -> bool {
        matches!(self.topology, WorkflowTopology::Chain(_))
    }

    pub fn is_router(&self) -> bool {
        matches!(self.topology, WorkflowTopology::Router(_))
    }

    /// Reject a config a load-time check can catch before it ever reaches
    /// the registry (spec.md §3/§7: a load-time error excludes the entity
    /// from the registry rather than surfacing only once a run is attempted).
    pub fn validate(&self) -> Result<(), GenaiError> {
        if let WorkflowTopology::Chain(chain) = &self.topology {
            chain.validate()?;
        }
        Ok(())
    }
}

/// A fixed, ordered sequence of steps.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChainWorkflow {
    pub steps: Vec<Step>,
}

impl ChainWorkflow {
    /// A `stepId` collision in the source config is a load-time rejection
    /// (spec.md §3), not something that should surface only once
    /// `ExecutionContext::insert_once` hits the duplicate mid-run.
    pub fn validate(&self) -> Result<(), GenaiError> {
        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.step_id.as_str()) {
                return Err(GenaiError::config_invalid(format!(
                    "duplicate stepId: {}",
                    step.step_id
                )));
            }
        }
        Ok(())
    }
}

/// A manager-agent-directed loop over a fixed set of worker agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterWorkflow {
    pub manager_agent_id: String,
    #[serde(default)]
    pub allowed_agents: Vec<String>,
    #[serde(default)]
    pub max_steps: i64,

    /// Opt-in mechanical enforcement of `allowed_agents` against the
    /// manager's routing decision. Defaults to `false`: the spec's source
    /// system supplies the allow-list as information only and accepts the
    /// manager's choice verbatim (see the "router allow-list enforcement"
    /// design note). Flip this on for a stricter deployment.
    #[serde(default)]
    pub enforce_allowed_agents: bool,
}

impl RouterWorkflow {
    /// Effective iteration cap: `max_steps` if positive, else 5.
    pub fn effective_max_steps(&self) -> u32 {
        if self.max_steps > 0 {
            self.max_steps as u32
        } else {
            5
        }
    }
}

/// One step of a chain workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub step_id: String,
    pub agent_id: String,
    #[serde(default)]
    pub input_source: InputSource,
    #[serde(default)]
    pub input_template: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputSource {
    #[default]
    UserInput,
    Previous,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chain_workflow() {
        let yaml = r#"
id: grade-essay
name: Grade Essay
type: CHAIN
steps:
  - stepId: step1
    agentId: summarizer
    inputSource: USER_INPUT
  - stepId: step2
    agentId: grader
    inputTemplate: "score {{step1}} for {{USER_INPUT}}"
"#;
        let def: WorkflowDefinition = serde_yaml::from_str(yaml).unwrap();
        assert!(def.is_chain());
        if let WorkflowTopology::Chain(chain) = def.topology {
            assert_eq!(chain.steps.len(), 2);
            assert_eq!(chain.steps[1].input_template.as_deref(), Some("score {{step1}} for {{USER_INPUT}}"));
        } else {
            panic!("expected chain topology");
        }
    }

    #[test]
    fn parses_router_workflow_with_default_max_steps() {
        let yaml = r#"
id: triage
name: Triage
type: ROUTER
managerAgentId: manager
allowedAgents: [worker-a, worker-b]
"#;
        let def: WorkflowDefinition = serde_yaml::from_str(yaml).unwrap();
        assert!(def.is_router());
        if let WorkflowTopology::Router(router) = def.topology {
            assert_eq!(router.effective_max_steps(), 5);
            assert_eq!(router.allowed_agents, vec!["worker-a", "worker-b"]);
        } else {
            panic!("expected router topology");
        }
    }

    #[test]
    fn duplicate_step_id_is_rejected() {
        let chain = ChainWorkflow {
            steps: vec![
                Step {
                    step_id: "step1".into(),
                    agent_id: "a".into(),
                    input_source: InputSource::UserInput,
                    input_template: None,
                },
                Step {
                    step_id: "step1".into(),
                    agent_id: "b".into(),
                    input_source: InputSource::Previous,
                    input_template: None,
                },
            ],
        };
        let err = chain.validate().unwrap_err();
        assert!(matches!(err, GenaiError::ConfigInvalid(_)));
    }

    #[test]
    fn non_positive_max_steps_falls_back_to_five() {
        let router = RouterWorkflow {
            manager_agent_id: "m".into(),
            allowed_agents: vec![],
            max_steps: 0,
            enforce_allowed_agents: false,
        };
        assert_eq!(router.effective_max_steps(), 5);
    }
}
