//! Resume points of interrupted goals, kept in the repository configuration.

use crate::error::{GitFlowError, Result};
use crate::git::Repository;

pub const BREAKPOINT_KEY: &str = "gitflow.breakpoint";
pub const BREAKPOINT_BRANCH_KEY: &str = "gitflow.breakpoint-branch";
/// Version a merge target gets back once the merge is concluded
pub const KEPT_VERSION_KEY: &str = "gitflow.breakpoint-version";

/// Where a goal stopped: the step to resume at and the branch the goal works on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub goal: String,
    pub step: String,
    pub branch: String,
}

impl Breakpoint {
    pub fn new(goal: impl Into<String>, step: impl Into<String>, branch: impl Into<String>) -> Self {
        Breakpoint {
            goal: goal.into(),
            step: step.into(),
            branch: branch.into(),
        }
    }

    pub fn load(repo: &dyn Repository) -> Result<Option<Breakpoint>> {
        let Some(value) = repo.config_value(BREAKPOINT_KEY)? else {
            return Ok(None);
        };

        let (goal, step) = value.split_once('.').ok_or_else(|| {
            GitFlowError::config(format!(
                "Malformed breakpoint '{}' in git config {}",
                value, BREAKPOINT_KEY
            ))
        })?;

        let branch = repo.config_value(BREAKPOINT_BRANCH_KEY)?.ok_or_else(|| {
            GitFlowError::config(format!(
                "Breakpoint '{}' has no branch (git config {})",
                value, BREAKPOINT_BRANCH_KEY
            ))
        })?;

        Ok(Some(Breakpoint::new(goal, step, branch)))
    }

    pub fn store(&self, repo: &dyn Repository) -> Result<()> {
        repo.set_config_value(BREAKPOINT_KEY, &format!("{}.{}", self.goal, self.step))?;
        repo.set_config_value(BREAKPOINT_BRANCH_KEY, &self.branch)
    }

    pub fn clear(repo: &dyn Repository) -> Result<()> {
        repo.remove_config_value(BREAKPOINT_KEY)?;
        repo.remove_config_value(BREAKPOINT_BRANCH_KEY)?;
        repo.remove_config_value(KEPT_VERSION_KEY)
    }
}
