use std::fmt;

/// Outcome of a multi-step git operation (rebase or merge)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractiveRebaseStatus {
    /// Completed cleanly
    Success,
    /// Stopped with unmerged paths
    Conflict,
    /// In progress without conflicts, waiting for the user to continue or commit
    Paused,
}

impl InteractiveRebaseStatus {
    pub fn description(&self) -> &'static str {
        match self {
            InteractiveRebaseStatus::Success => "completed",
            InteractiveRebaseStatus::Conflict => "stopped on conflicts",
            InteractiveRebaseStatus::Paused => "paused",
        }
    }
}

impl fmt::Display for InteractiveRebaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractiveRebaseResult {
    status: InteractiveRebaseStatus,
    git_message: Option<String>,
}

impl InteractiveRebaseResult {
    /// Clean completion without a message
    pub const SUCCESS: InteractiveRebaseResult = InteractiveRebaseResult {
        status: InteractiveRebaseStatus::Success,
        git_message: None,
    };

    pub fn new(status: InteractiveRebaseStatus, git_message: Option<String>) -> Self {
        InteractiveRebaseResult {
            status,
            git_message,
        }
    }

    pub fn conflict(git_message: impl Into<String>) -> Self {
        Self::new(InteractiveRebaseStatus::Conflict, Some(git_message.into()))
    }

    pub fn paused(git_message: impl Into<String>) -> Self {
        Self::new(InteractiveRebaseStatus::Paused, Some(git_message.into()))
    }

    pub fn status(&self) -> InteractiveRebaseStatus {
        self.status
    }

    pub fn git_message(&self) -> Option<&str> {
        self.git_message.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.status == InteractiveRebaseStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_constant() {
        assert_eq!(
            InteractiveRebaseResult::SUCCESS.status(),
            InteractiveRebaseStatus::Success
        );
        assert_eq!(InteractiveRebaseResult::SUCCESS.git_message(), None);
        assert!(InteractiveRebaseResult::SUCCESS.is_success());
    }

    #[test]
    fn test_conflict_keeps_message() {
        let result = InteractiveRebaseResult::conflict("CONFLICT (content): Merge conflict in pom.xml");
        assert_eq!(result.status(), InteractiveRebaseStatus::Conflict);
        assert_eq!(
            result.git_message(),
            Some("CONFLICT (content): Merge conflict in pom.xml")
        );
        assert!(!result.is_success());
    }

    #[test]
    fn test_paused_is_not_success() {
        assert!(!InteractiveRebaseResult::paused("rebase in progress").is_success());
    }
}
