//! Goal orchestration.
//!
//! A [Workflow] runs one goal at a time against one repository. Every goal
//! follows the same rules:
//!
//! - it refuses to start while a merge or rebase is still open
//! - user input is validated before the repository is touched
//! - version changes go through a single routine that decides about the
//!   commit and about announcing the change, see [VersionChange]
//! - a step that needs the user (conflicts, failed installs) stores a
//!   [Breakpoint]; running the same goal again resumes there

pub mod breakpoint;
pub mod goals;

pub use breakpoint::Breakpoint;
pub use goals::{run_deprecated_goal, run_goal, run_goal_by_name};

use std::path::PathBuf;

use tracing::{debug, info};

use crate::build::BuildTool;
use crate::config::Config;
use crate::domain::{CommandContext, GitFlowAction, VersionlessMode};
use crate::error::{GitFlowError, Result};
use crate::failure::{FailureInfoBuilder, GitFlowFailureInfo, CLI_NAME};
use crate::git::Repository;
use crate::hooks::{HookContext, HookExecutor, HookType};
use crate::ui::Reporter;
use crate::validation::StringValidator;
use crate::version_source::{version_source_for, ConfigVersionSource, VersionSource};

/// Repository config key recording the mode chosen with make-versionless
pub const VERSIONLESS_KEY: &str = "gitflow.versionless";

/// Repository config key recording the branch a release or hotfix was started from
pub fn base_key(branch: &str) -> String {
    format!("branch.{}.gitflow-base", branch)
}

/// Inputs of a goal; which fields are used depends on the goal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalParams {
    pub name: Option<String>,
    pub version: Option<String>,
    pub base: Option<String>,
    pub mode: Option<String>,
    pub build_id: Option<String>,
}

/// One version change made by a goal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChange {
    pub action: GitFlowAction,
    pub branch: String,
    pub old: Option<String>,
    pub new: String,
    pub context: CommandContext,
    /// Announced to the user and to the post-version-change hook
    pub notified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowResult {
    pub action: GitFlowAction,
    /// The branch the goal worked on
    pub branch: String,
    pub version_changes: Vec<VersionChange>,
    /// The goal continued from a breakpoint
    pub resumed: bool,
}

pub struct Workflow<'a> {
    repo: &'a dyn Repository,
    build: &'a dyn BuildTool,
    config: &'a Config,
    reporter: &'a dyn Reporter,
}

impl<'a> Workflow<'a> {
    pub fn new(
        repo: &'a dyn Repository,
        build: &'a dyn BuildTool,
        config: &'a Config,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Workflow {
            repo,
            build,
            config,
            reporter,
        }
    }

    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter
    }

    /// Effective versionless mode.
    ///
    /// A `-D flow.versionless` override wins over the mode recorded in the
    /// repository, which wins over the configuration file.
    pub fn versionless_mode(&self) -> Result<VersionlessMode> {
        if let Some(mode) = self.config.versionless_override {
            return Ok(mode);
        }

        match self.repo.config_value(VERSIONLESS_KEY)? {
            Some(value) => value.parse(),
            None => Ok(self.config.version.versionless),
        }
    }

    pub fn version_source(&self) -> Result<Box<dyn VersionSource>> {
        let mode = self.versionless_mode()?;
        version_source_for(mode, &self.config.version, self.repo.workdir().as_deref())
    }

    /// Version of the checked out branch
    pub fn current_version(&self) -> Result<String> {
        let branch = self.repo.current_branch()?;
        self.version_source()?.read_version(self.repo, &branch)
    }

    /// Tag based versions only exist on tagged commits, so branches carry no version of their own
    fn tracks_branch_versions(&self) -> Result<bool> {
        Ok(self.versionless_mode()? != VersionlessMode::Tags)
    }

    fn begin(&self, action: GitFlowAction, require_clean: bool) -> Result<GoalRun<'_>> {
        let goal = action.goal_name();
        let current = self.repo.current_branch()?;

        let pending = self.repo.pending_operation()?;
        if !pending.is_success() {
            return Err(FailureInfoBuilder::new(goal, &current)
                .unresolved_operation(&pending)
                .into());
        }

        let breakpoint = match Breakpoint::load(self.repo)? {
            Some(stale) if !self.repo.branch_exists(&stale.branch)? => {
                Breakpoint::clear(self.repo)?;
                self.reporter.warning(&format!(
                    "Discarded the breakpoint of goal '{}' because branch '{}' no longer exists",
                    stale.goal, stale.branch
                ));
                None
            }
            breakpoint => breakpoint,
        };

        let (branch, resume_at) = match breakpoint {
            Some(breakpoint) if breakpoint.goal == goal => {
                info!(goal, step = %breakpoint.step, branch = %breakpoint.branch, "resuming goal");
                (breakpoint.branch, Some(breakpoint.step))
            }
            Some(breakpoint) => {
                return Err(GitFlowError::validation(format!(
                    "Goal '{}' was interrupted on branch '{}'. Run '{} {}' to complete it before running '{}'.",
                    breakpoint.goal, breakpoint.branch, CLI_NAME, breakpoint.goal, goal
                )))
            }
            None => (current.clone(), None),
        };

        if require_clean && self.repo.has_uncommitted_changes()? {
            return Err(FailureInfoBuilder::new(goal, &current)
                .uncommitted_changes()
                .into());
        }

        debug!(goal, branch = %branch, "starting goal");
        Ok(GoalRun {
            workflow: self,
            action,
            branch,
            resumed: resume_at.is_some(),
            resume_at,
            changes: Vec::new(),
        })
    }

    fn run_hook(
        &self,
        hook_type: HookType,
        action: GitFlowAction,
        branch: &str,
        old_version: Option<&str>,
        new_version: Option<&str>,
    ) {
        let script = match hook_type {
            HookType::PostVersionChange => self.config.hooks.post_version_change.as_deref(),
            HookType::PostFinish => self.config.hooks.post_finish.as_deref(),
        };
        let Some(script) = script else {
            return;
        };

        let context = HookContext {
            hook_type,
            action,
            branch: branch.to_string(),
            context: action.command_context(),
            old_version: old_version.map(str::to_string),
            new_version: new_version.map(str::to_string),
        };
        let workdir = self.repo.workdir().unwrap_or_else(|| PathBuf::from("."));

        if !HookExecutor::execute_permissive(script, &workdir, &context) {
            self.reporter.warning(&format!(
                "Hook '{}' ({}) failed, continuing",
                hook_type.name(),
                script
            ));
        }
    }

    /// Delete a finished branch together with its gitflow settings
    ///
    /// The branch must be fully merged into `merged_into`.
    fn delete_branch(&self, branch: &str, merged_into: &str) -> Result<()> {
        if !self.repo.is_ancestor(branch, merged_into)? {
            return Err(GitFlowError::branch(format!(
                "Branch '{}' is not merged into '{}' and was kept",
                branch, merged_into
            )));
        }

        self.repo
            .remove_config_value(&ConfigVersionSource::key(branch))?;
        self.repo.remove_config_value(&base_key(branch))?;
        self.repo.delete_branch(branch)?;
        info!(branch, "deleted branch");
        Ok(())
    }

    fn push(&self, branches: &[&str], tag: Option<&str>) -> Result<()> {
        let remote = &self.config.branches.remote;
        for branch in branches {
            self.repo.push_branch(remote, branch)?;
        }
        if let Some(tag) = tag {
            self.repo.push_tag(remote, tag)?;
        }
        self.reporter
            .status(&format!("Pushed {} to '{}'", branches.join(", "), remote));
        Ok(())
    }
}

/// Check user input; a valid value is returned as is
fn validated<'v>(validator: &dyn StringValidator, value: Option<&'v str>) -> Result<&'v str> {
    let result = validator.validate(value);
    match result.invalid_message() {
        Some(message) => Err(GitFlowError::validation(message)),
        None => Ok(value.unwrap_or_default()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Run,
    /// The goal was interrupted in this step and the user has dealt with it
    Resume,
    /// Done before the interruption
    Skip,
}

impl Step {
    fn runs(self) -> bool {
        self != Step::Skip
    }
}

/// State of one goal execution
struct GoalRun<'w> {
    workflow: &'w Workflow<'w>,
    action: GitFlowAction,
    branch: String,
    resume_at: Option<String>,
    resumed: bool,
    changes: Vec<VersionChange>,
}

impl<'w> GoalRun<'w> {
    fn goal(&self) -> &'static str {
        self.action.goal_name()
    }

    fn builder(&self, branch: &str) -> FailureInfoBuilder {
        FailureInfoBuilder::new(self.goal(), branch)
    }

    /// Every step must be entered in order, whether it has work to do or not
    fn step(&mut self, name: &str) -> Step {
        match self.resume_at.as_deref() {
            None => Step::Run,
            Some(at) if at == name => {
                self.resume_at = None;
                Step::Resume
            }
            Some(_) => Step::Skip,
        }
    }

    fn interrupted<T>(&self, step: &str, info: GitFlowFailureInfo) -> Result<T> {
        Breakpoint::new(self.goal(), step, &self.branch).store(self.workflow.repo)?;
        info!(goal = self.goal(), step, "goal interrupted");
        Err(info.into())
    }

    fn ensure_checked_out(&self, branch: &str) -> Result<()> {
        let repo = self.workflow.repo;
        if repo.current_branch()? != branch {
            repo.checkout(branch)?;
        }
        Ok(())
    }

    /// Merge `source` into `target`
    ///
    /// When resuming, the merge counts as done only if `source` is contained
    /// in `target`. An aborted merge is attempted again.
    fn merge(&mut self, step: &str, source: &str, target: &str) -> Result<()> {
        let state = self.step(step);
        self.merge_in_step(state, step, source, target)
    }

    fn merge_in_step(&mut self, state: Step, step: &str, source: &str, target: &str) -> Result<()> {
        match state {
            Step::Skip => Ok(()),
            Step::Resume if self.workflow.repo.is_ancestor(source, target)? => {
                debug!(source, target, "merge was concluded by the user");
                Ok(())
            }
            Step::Resume => {
                self.workflow.reporter.status(&format!(
                    "Branch '{}' is not merged into '{}' yet, merging again",
                    source, target
                ));
                self.merge_now(step, source, target)
            }
            Step::Run => self.merge_now(step, source, target),
        }
    }

    /// Like [GoalRun::merge], but `target` keeps the version it had before.
    ///
    /// The version to keep is stored with the breakpoint, so a merge that
    /// stops on conflicts restores it when the goal resumes.
    fn merge_keeping_version(&mut self, step: &str, source: &str, target: &str) -> Result<()> {
        let state = self.step(step);
        if state == Step::Skip {
            return Ok(());
        }

        let repo = self.workflow.repo;
        if state == Step::Run {
            self.ensure_checked_out(target)?;
            let kept = if self.workflow.tracks_branch_versions()? {
                self.workflow.version_source()?.read_version(repo, target).ok()
            } else {
                None
            };
            match kept {
                Some(kept) => repo.set_config_value(breakpoint::KEPT_VERSION_KEY, &kept)?,
                None => repo.remove_config_value(breakpoint::KEPT_VERSION_KEY)?,
            }
        }

        self.merge_in_step(state, step, source, target)?;

        if let Some(kept) = repo.config_value(breakpoint::KEPT_VERSION_KEY)? {
            self.ensure_checked_out(target)?;
            self.change_version(target, &kept)?;
            repo.remove_config_value(breakpoint::KEPT_VERSION_KEY)?;
        }
        Ok(())
    }

    fn merge_now(&mut self, step: &str, source: &str, target: &str) -> Result<()> {
        self.ensure_checked_out(target)?;
        let message = format!("Merge branch '{}' into {}", source, target);
        let result = self.workflow.repo.merge(source, &message)?;

        if !result.is_success() {
            let info = self.builder(target).merge_conflict(source, &result);
            return self.interrupted(step, info);
        }

        info!(source, target, "merged");
        Ok(())
    }

    /// Rebase `branch` onto `onto`
    ///
    /// When resuming, the rebase counts as done only if `branch` now contains
    /// `onto`. An aborted rebase is attempted again.
    fn rebase(&mut self, step: &str, branch: &str, onto: &str) -> Result<()> {
        match self.step(step) {
            Step::Skip => return Ok(()),
            Step::Resume if self.workflow.repo.is_ancestor(onto, branch)? => {
                debug!(branch, onto, "rebase was concluded by the user");
                return Ok(());
            }
            Step::Resume => {
                self.workflow.reporter.status(&format!(
                    "Branch '{}' is not based on '{}' yet, rebasing again",
                    branch, onto
                ));
            }
            Step::Run => {}
        }

        self.ensure_checked_out(branch)?;
        let result = self.workflow.repo.rebase(onto)?;

        if !result.is_success() {
            let info = self.builder(branch).rebase_conflict(onto, &result);
            return self.interrupted(step, info);
        }

        info!(branch, onto, "rebased");
        Ok(())
    }

    /// Install the project on `branch`; resuming installs again
    fn install(&mut self, step: &str, branch: &str, process: &str) -> Result<()> {
        if !self.step(step).runs() {
            return Ok(());
        }

        let workflow = self.workflow;
        if !workflow.config.flow.install_project {
            debug!(branch, "project installation disabled");
            return Ok(());
        }

        self.ensure_checked_out(branch)?;
        let workdir = workflow.repo.workdir().ok_or_else(|| {
            GitFlowError::config("Project installation needs a working tree, but the repository is bare")
        })?;

        workflow
            .reporter
            .status(&format!("Installing project on branch '{}'", branch));

        match workflow.build.install(&workdir) {
            Ok(()) => Ok(()),
            Err(GitFlowError::Build(reason)) => {
                let info = self
                    .builder(branch)
                    .install_failed_after(process, reason.as_deref());
                self.interrupted(step, info)
            }
            Err(e) => Err(e),
        }
    }

    fn change_version(&mut self, branch: &str, new: &str) -> Result<()> {
        self.apply_version(branch, new, true)
    }

    /// Version change that is left in the working tree
    fn change_version_uncommitted(&mut self, branch: &str, new: &str) -> Result<()> {
        self.apply_version(branch, new, false)
    }

    fn apply_version(&mut self, branch: &str, new: &str, allow_commit: bool) -> Result<()> {
        let workflow = self.workflow;
        let repo = workflow.repo;
        let source = workflow.version_source()?;

        let old = source.read_version(repo, branch).ok();
        if old.as_deref() == Some(new) {
            debug!(branch, version = new, "version unchanged");
            return Ok(());
        }

        source.write_version(repo, branch, new)?;
        if allow_commit && source.needs_version_change_commit() {
            repo.commit_all(&format!("Update version to {}", new))?;
        }

        let context = self.action.command_context();
        let notified = context.propagates_version_change();
        if notified {
            workflow.reporter.status(&format!(
                "Version of branch '{}' changed to {}",
                branch, new
            ));
            workflow.run_hook(
                HookType::PostVersionChange,
                self.action,
                branch,
                old.as_deref(),
                Some(new),
            );
        } else {
            debug!(branch, old = ?old, new, "internal version change");
        }

        self.changes.push(VersionChange {
            action: self.action,
            branch: branch.to_string(),
            old,
            new: new.to_string(),
            context,
            notified,
        });
        Ok(())
    }

    fn finish(self) -> Result<WorkflowResult> {
        let repo = self.workflow.repo;

        if let Some(step) = self.resume_at {
            return Err(GitFlowError::config(format!(
                "Goal '{}' has no step '{}' to resume at. Remove the breakpoint with 'git config --unset {}'.",
                self.action.goal_name(),
                step,
                breakpoint::BREAKPOINT_KEY
            )));
        }

        if self.resumed {
            Breakpoint::clear(repo)?;
        }

        Ok(WorkflowResult {
            action: self.action,
            branch: self.branch,
            version_changes: self.changes,
            resumed: self.resumed,
        })
    }
}
