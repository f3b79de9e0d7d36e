// GenAI Core - Foundation types for the LM workflow orchestration engine.
//
// Data model, error taxonomy, and the `ChatModel` contract shared by every
// other crate in the workspace. Holds no I/O: loading, watching, and
// execution live in `genai-config` and `genai-engine`.

pub mod agent;
pub mod context;
pub mod error;
pub mod job;
pub mod model;
pub mod registry;
pub mod workflow;

pub use agent::{AgentConfig, AgentDefinition, ModelSpec};
pub use context::{ExecutionContext, USER_INPUT_KEY};
pub use error::{AgentExecutionError, GenaiError, GenaiResult};
pub use job::{Job, JobStatus};
pub use model::{ChatModel, ModelConfig, ModelProvider};
pub use registry::{FileEvent, FileEventKind, WorkflowFileChanged};
pub use workflow::{ChainWorkflow, InputSource, RouterWorkflow, Step, WorkflowDefinition, WorkflowTopology};

/// Post-process a raw model response: strip a leading/trailing triple-backtick
/// fence (with or without a `json` language hint), then trim whitespace.
pub fn postprocess_response(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = if let Some(inner) = trimmed.strip_prefix("```") {
        let inner = inner.strip_prefix("json").unwrap_or(inner);
        let inner = inner.strip_prefix('\n').unwrap_or(inner);
        inner.strip_suffix("```").unwrap_or(inner)
    } else {
        trimmed
    };
    stripped.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postprocess_strips_plain_fence() {
        assert_eq!(postprocess_response("```\nhello\n```"), "hello");
    }

    #[test]
    fn postprocess_strips_json_fence() {
        assert_eq!(
            postprocess_response("```json\n{\"next_agent\":\"FINISH\"}\n```"),
            "{\"next_agent\":\"FINISH\"}"
        );
    }

    #[test]
    fn postprocess_leaves_plain_text_trimmed() {
        assert_eq!(postprocess_response("  hi there  "), "hi there");
    }
}
