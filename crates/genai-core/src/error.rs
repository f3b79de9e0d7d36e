//! Error taxonomy for the GenAI orchestration engine.
//!
//! `GenaiError` covers load-time and lookup failures; `AgentExecutionError`
//! covers the classified runtime failures of a single agent invocation
//! (see the workflow engine's failure table).

use thiserror::Error;

/// Load-time, lookup, and protocol-level errors.
#[derive(Debug, Error, Clone)]
pub enum GenaiError {
    #[error("agent config not found: {0}")]
    ConfigNotFound(String),

    #[error("invalid agent config: {0}")]
    ConfigInvalid(String),

    #[error("file I/O error: {0}")]
    FileIo(String),

    #[error("include depth exceeded (max {max}) while expanding {path}")]
    IncludeDepthExceeded { path: String, max: usize },

    #[error("workflow not found: {0}")]
    WorkflowNotFound(String),

    #[error("agent not found: {0}")]
    AgentNotFound(String),

    #[error("unsupported model provider: {0}")]
    UnsupportedProvider(String),

    #[error("missing credential for provider {0}")]
    MissingCredential(String),

    #[error("job id not found or expired")]
    JobNotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl GenaiError {
    pub fn config_invalid(msg: impl Into<String>) -> Self {
        Self::ConfigInvalid(msg.into())
    }

    pub fn file_io(msg: impl Into<String>) -> Self {
        Self::FileIo(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type GenaiResult<T> = Result<T, GenaiError>;

/// A classified failure from invoking an agent's underlying model.
///
/// Carries everything a caller needs to decide whether to retry, modeled
/// on the HTTP-status-to-retryable table the workflow engine applies to
/// every agent invocation.
#[derive(Debug, Error, Clone)]
#[error("{message}")]
pub struct AgentExecutionError {
    pub message: String,
    pub status_code: u16,
    pub retryable: bool,
    #[source]
    pub cause: Option<Box<GenaiErrorCause>>,
}

/// Boxed, cloneable stand-in for the original cause so `AgentExecutionError`
/// stays `Clone` (job records clone their terminal error into `result`).
#[derive(Debug, Error, Clone)]
#[error("{0}")]
pub struct GenaiErrorCause(pub String);

impl AgentExecutionError {
    pub fn new(message: impl Into<String>, status_code: u16, retryable: bool) -> Self {
        Self {
            message: message.into(),
            status_code,
            retryable,
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl std::fmt::Display) -> Self {
        self.cause = Some(Box::new(GenaiErrorCause(cause.to_string())));
        self
    }

    /// Classify a raw HTTP status code per the workflow engine's failure table.
    pub fn from_http_status(status: u16, body_hint: Option<&str>) -> Self {
        let (retryable, message) = match status {
            404 => (false, "Resource not found".to_string()),
            401 => (false, "Unauthorized".to_string()),
            429 => (true, "Rate limit exceeded".to_string()),
            500 | 503 => (true, format!("Provider server error ({status})")),
            _ => (false, format!("Provider returned HTTP {status}")),
        };
        let message = match body_hint {
            Some(hint) if !hint.is_empty() => format!("{message}: {hint}"),
            _ => message,
        };
        Self::new(message, status, retryable)
    }

    /// Classify a socket/read timeout.
    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::new(format!("Request timed out: {}", detail.into()), 408, true)
    }

    /// Classify any other runtime failure (default: non-retryable, 500).
    pub fn other(detail: impl Into<String>) -> Self {
        Self::new(detail.into(), 500, false)
    }
}

impl From<GenaiError> for AgentExecutionError {
    fn from(err: GenaiError) -> Self {
        Self::other(err.to_string())
    }
}
