use thiserror::Error;

use crate::failure::GitFlowFailureInfo;

/// Unified error type for gitflow operations
#[derive(Error, Debug)]
pub enum GitFlowError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Branch error: {0}")]
    Branch(String),

    #[error("Build failed{}", display_reason(.0))]
    Build(Option<String>),

    #[error("Hook error: {0}")]
    Hook(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A workflow step failed and the user has to act before the goal can continue.
    #[error("{}", .0.problem())]
    Failure(GitFlowFailureInfo),
}

fn display_reason(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(": {}", reason),
        None => String::new(),
    }
}

/// Convenience type alias for Results in gitflow
pub type Result<T> = std::result::Result<T, GitFlowError>;

impl GitFlowError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GitFlowError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        GitFlowError::Version(msg.into())
    }

    /// Create a validation error with the validator's message
    pub fn validation(msg: impl Into<String>) -> Self {
        GitFlowError::Validation(msg.into())
    }

    /// Create a branch error with context
    pub fn branch(msg: impl Into<String>) -> Self {
        GitFlowError::Branch(msg.into())
    }

    /// Create a hook error with context
    pub fn hook(msg: impl Into<String>) -> Self {
        GitFlowError::Hook(msg.into())
    }

    /// The structured diagnostic, if this error carries one
    pub fn failure_info(&self) -> Option<&GitFlowFailureInfo> {
        match self {
            GitFlowError::Failure(info) => Some(info),
            _ => None,
        }
    }
}

impl From<GitFlowFailureInfo> for GitFlowError {
    fn from(info: GitFlowFailureInfo) -> Self {
        GitFlowError::Failure(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GitFlowError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GitFlowError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_build_error_with_and_without_reason() {
        assert_eq!(
            GitFlowError::Build(Some("compilation failure".to_string())).to_string(),
            "Build failed: compilation failure"
        );
        assert_eq!(GitFlowError::Build(None).to_string(), "Build failed");
    }

    #[test]
    fn test_failure_displays_problem() {
        let info = GitFlowFailureInfo::new("Something broke.", "Fix it.", Vec::new());
        let err: GitFlowError = info.clone().into();
        assert_eq!(err.to_string(), "Something broke.");
        assert_eq!(err.failure_info(), Some(&info));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (GitFlowError::config("x"), "Configuration error"),
            (GitFlowError::version("x"), "Version error"),
            (GitFlowError::validation("x"), "Validation failed"),
            (GitFlowError::branch("x"), "Branch error"),
            (GitFlowError::hook("x"), "Hook error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
            assert!(err.failure_info().is_none());
        }
    }
}
