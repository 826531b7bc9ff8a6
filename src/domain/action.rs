use std::fmt;

/// How a workflow action relates to version mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandContext {
    /// The action is itself a release-version transition
    Release,
    /// Implementation-detail version change other commands should not react to
    Internal,
    /// Explicit, user-visible version change
    Version,
}

impl CommandContext {
    /// Whether a version change made in this context is announced to other commands
    pub fn propagates_version_change(&self) -> bool {
        !matches!(self, CommandContext::Internal)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CommandContext::Release => "release",
            CommandContext::Internal => "internal",
            CommandContext::Version => "version",
        }
    }
}

impl fmt::Display for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The supported workflow actions, one per goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitFlowAction {
    FeatureStart,
    FeatureRebase,
    FeatureFinish,
    EpicStart,
    EpicUpdate,
    EpicFinish,
    MaintenanceStart,
    ReleaseStart,
    ReleaseFinish,
    HotfixStart,
    HotfixFinish,
    SetVersion,
    MakeVersionless,
    BuildVersion,
}

impl GitFlowAction {
    pub const ALL: [GitFlowAction; 14] = [
        GitFlowAction::FeatureStart,
        GitFlowAction::FeatureRebase,
        GitFlowAction::FeatureFinish,
        GitFlowAction::EpicStart,
        GitFlowAction::EpicUpdate,
        GitFlowAction::EpicFinish,
        GitFlowAction::MaintenanceStart,
        GitFlowAction::ReleaseStart,
        GitFlowAction::ReleaseFinish,
        GitFlowAction::HotfixStart,
        GitFlowAction::HotfixFinish,
        GitFlowAction::SetVersion,
        GitFlowAction::MakeVersionless,
        GitFlowAction::BuildVersion,
    ];

    /// The command context this action runs in
    pub fn command_context(&self) -> CommandContext {
        match self {
            GitFlowAction::FeatureStart
            | GitFlowAction::FeatureRebase
            | GitFlowAction::FeatureFinish
            | GitFlowAction::EpicStart
            | GitFlowAction::EpicUpdate
            | GitFlowAction::EpicFinish
            | GitFlowAction::MakeVersionless => CommandContext::Internal,
            GitFlowAction::ReleaseStart
            | GitFlowAction::ReleaseFinish
            | GitFlowAction::HotfixStart
            | GitFlowAction::HotfixFinish => CommandContext::Release,
            GitFlowAction::MaintenanceStart
            | GitFlowAction::SetVersion
            | GitFlowAction::BuildVersion => CommandContext::Version,
        }
    }

    /// Name of the goal implementing this action
    pub fn goal_name(&self) -> &'static str {
        match self {
            GitFlowAction::FeatureStart => "feature-start",
            GitFlowAction::FeatureRebase => "feature-rebase",
            GitFlowAction::FeatureFinish => "feature-finish",
            GitFlowAction::EpicStart => "epic-start",
            GitFlowAction::EpicUpdate => "epic-update",
            GitFlowAction::EpicFinish => "epic-finish",
            GitFlowAction::MaintenanceStart => "maintenance-start",
            GitFlowAction::ReleaseStart => "release-start",
            GitFlowAction::ReleaseFinish => "release-finish",
            GitFlowAction::HotfixStart => "hotfix-start",
            GitFlowAction::HotfixFinish => "hotfix-finish",
            GitFlowAction::SetVersion => "set-version",
            GitFlowAction::MakeVersionless => "make-versionless",
            GitFlowAction::BuildVersion => "build-version",
        }
    }

    pub fn from_goal_name(goal: &str) -> Option<GitFlowAction> {
        GitFlowAction::ALL
            .into_iter()
            .find(|action| action.goal_name() == goal)
    }
}

impl fmt::Display for GitFlowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.goal_name())
    }
}

/// A goal name kept for compatibility that forwards to a current goal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeprecatedGoal {
    pub alias: &'static str,
    pub replacement: GitFlowAction,
}

pub const DEPRECATED_GOALS: [DeprecatedGoal; 2] = [
    DeprecatedGoal {
        alias: "feature-integrate",
        replacement: GitFlowAction::FeatureRebase,
    },
    DeprecatedGoal {
        alias: "epic-rebase",
        replacement: GitFlowAction::EpicUpdate,
    },
];

impl DeprecatedGoal {
    pub fn find(alias: &str) -> Option<DeprecatedGoal> {
        DEPRECATED_GOALS.into_iter().find(|goal| goal.alias == alias)
    }

    pub fn warning(&self) -> String {
        format!(
            "Goal '{}' is deprecated, use '{}' instead.",
            self.alias,
            self.replacement.goal_name()
        )
    }
}
