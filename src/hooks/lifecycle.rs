use std::collections::HashMap;

use crate::domain::{CommandContext, GitFlowAction};

/// Points in the workflow where a user script can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookType {
    PostVersionChange,
    PostFinish,
}

impl HookType {
    pub fn name(&self) -> &'static str {
        match self {
            HookType::PostVersionChange => "post-version-change",
            HookType::PostFinish => "post-finish",
        }
    }
}

/// Context information passed to a hook
#[derive(Debug, Clone)]
pub struct HookContext {
    pub hook_type: HookType,
    pub action: GitFlowAction,
    /// Branch the goal operated on
    pub branch: String,
    pub context: CommandContext,
    pub old_version: Option<String>,
    pub new_version: Option<String>,
}

impl HookContext {
    /// Maps context fields to GITFLOW_* environment variables
    pub fn to_env_vars(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();

        env.insert("GITFLOW_HOOK".to_string(), self.hook_type.name().to_string());
        env.insert("GITFLOW_GOAL".to_string(), self.action.goal_name().to_string());
        env.insert("GITFLOW_BRANCH".to_string(), self.branch.clone());
        env.insert("GITFLOW_CONTEXT".to_string(), self.context.name().to_string());

        if let Some(ref old) = self.old_version {
            env.insert("GITFLOW_OLD_VERSION".to_string(), old.clone());
        }

        if let Some(ref new) = self.new_version {
            env.insert("GITFLOW_NEW_VERSION".to_string(), new.clone());
        }

        env
    }
}
