use thiserror::Error;

/// Failures surfaced by the conversation engine.
///
/// None of these are retried or recovered from inside the engine; they end the
/// current `ask` stream and are reported by whoever drives it.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Backend request failed: {0}")]
    Backend(String),

    #[error("Tool '{tool}' failed: {message}")]
    ToolExecution { tool: String, message: String },

    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

impl From<tera::Error> for AgentError {
    fn from(err: tera::Error) -> Self {
        AgentError::Prompt(err.to_string())
    }
}

/// Failures produced while running a tool.
///
/// Only [`ToolError::Execution`] is allowed to escape [`crate::tools::Tool::run`];
/// the other kinds are expected and get turned into tool output by [`crate::tools::report`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("'{0}' argument is required")]
    MissingArgument(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Patch application failed: {0}")]
    PatchApplication(String),

    /// A file or external command the tool relies on failed
    #[error("{0}")]
    Io(String),

    #[error("{0}")]
    Execution(String),
}

impl ToolError {
    /// Whether the failure is part of the normal conversation with the model
    pub fn is_expected(&self) -> bool {
        !matches!(self, ToolError::Execution(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_messages() {
        assert_eq!(
            ToolError::MissingArgument("path".into()).to_string(),
            "'path' argument is required"
        );
        assert_eq!(
            ToolError::PatchApplication("hunk 1 failed".into()).to_string(),
            "Patch application failed: hunk 1 failed"
        );
    }

    #[test]
    fn test_only_execution_is_unexpected() {
        assert!(ToolError::MissingArgument("x".into()).is_expected());
        assert!(ToolError::InvalidArgument("x".into()).is_expected());
        assert!(ToolError::PatchApplication("x".into()).is_expected());
        assert!(ToolError::Io("x".into()).is_expected());
        assert!(!ToolError::Execution("boom".into()).is_expected());
    }
}
