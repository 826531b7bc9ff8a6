//! Domain logic - pure workflow rules independent of git operations

pub mod action;
pub mod branch;
pub mod version;
pub mod versionless;

pub use action::{CommandContext, DeprecatedGoal, GitFlowAction, DEPRECATED_GOALS};
pub use branch::{is_hotfix_branch, BranchType, HOTFIX_PREFIX};
pub use versionless::VersionlessMode;
