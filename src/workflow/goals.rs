use tracing::debug;

use super::{base_key, validated, GoalParams, GoalRun, Step, Workflow, WorkflowResult, VERSIONLESS_KEY};
use crate::domain::version;
use crate::domain::{is_hotfix_branch, BranchType, DeprecatedGoal, GitFlowAction, VersionlessMode, HOTFIX_PREFIX};
use crate::error::{GitFlowError, Result};
use crate::hooks::HookType;
use crate::validation::{
    BranchNameValidator, BuildIdentifierValidator, VersionValidator, VersionlessModeValidator,
};
use crate::version_source::version_source_for;

/// Run the goal implementing `action`
pub fn run_goal(workflow: &Workflow<'_>, action: GitFlowAction, params: &GoalParams) -> Result<WorkflowResult> {
    debug!(goal = action.goal_name(), ?params, "running goal");

    match action {
        GitFlowAction::FeatureStart => workflow.feature_start(params.name.as_deref()),
        GitFlowAction::FeatureRebase => workflow.feature_rebase(),
        GitFlowAction::FeatureFinish => workflow.feature_finish(),
        GitFlowAction::EpicStart => workflow.epic_start(params.name.as_deref()),
        GitFlowAction::EpicUpdate => workflow.epic_update(),
        GitFlowAction::EpicFinish => workflow.epic_finish(),
        GitFlowAction::MaintenanceStart => workflow.maintenance_start(
            params.name.as_deref(),
            params.base.as_deref(),
            params.version.as_deref(),
        ),
        GitFlowAction::ReleaseStart => workflow.release_start(params.version.as_deref()),
        GitFlowAction::ReleaseFinish => workflow.release_finish(),
        GitFlowAction::HotfixStart => workflow.hotfix_start(params.version.as_deref()),
        GitFlowAction::HotfixFinish => workflow.hotfix_finish(),
        GitFlowAction::SetVersion => workflow.set_version(params.version.as_deref()),
        GitFlowAction::MakeVersionless => workflow.make_versionless(params.mode.as_deref()),
        GitFlowAction::BuildVersion => workflow.build_version(params.build_id.as_deref()),
    }
}

/// Run a goal through its deprecated name.
///
/// Emits the deprecation warning once, then behaves exactly like the current goal.
pub fn run_deprecated_goal(workflow: &Workflow<'_>, alias: &str, params: &GoalParams) -> Result<WorkflowResult> {
    let deprecated = DeprecatedGoal::find(alias)
        .ok_or_else(|| GitFlowError::validation(format!("Unknown goal '{}'", alias)))?;

    workflow.reporter().warning(&deprecated.warning());
    run_goal(workflow, deprecated.replacement, params)
}

/// Run a goal by its current or deprecated name
pub fn run_goal_by_name(workflow: &Workflow<'_>, goal: &str, params: &GoalParams) -> Result<WorkflowResult> {
    match GitFlowAction::from_goal_name(goal) {
        Some(action) => run_goal(workflow, action, params),
        None => run_deprecated_goal(workflow, goal, params),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReleaseLine {
    Release,
    Hotfix,
}

impl<'a> Workflow<'a> {
    pub fn feature_start(&self, name: Option<&str>) -> Result<WorkflowResult> {
        self.start_topic(GitFlowAction::FeatureStart, BranchType::Feature, name)
    }

    pub fn epic_start(&self, name: Option<&str>) -> Result<WorkflowResult> {
        self.start_topic(GitFlowAction::EpicStart, BranchType::Epic, name)
    }

    /// Rebase the current feature branch onto the development branch
    pub fn feature_rebase(&self) -> Result<WorkflowResult> {
        let mut run = self.begin(GitFlowAction::FeatureRebase, true)?;
        let branch = run.branch.clone();
        let name = topic_name(&run, BranchType::Feature)?;
        let development = self.config.branches.development.as_str();

        if run.step("integrated").runs() {
            let marker = BranchType::Integrated.branch_name(&name);
            if self.repo.branch_exists(&marker)? {
                self.repo.delete_branch(&marker)?;
            }
            self.repo.create_branch(&marker, development)?;
            debug!(marker = %marker, "moved integration marker");
        }

        run.rebase("rebase", &branch, development)?;
        run.install("install", &branch, &format!("rebase onto {}", development))?;

        self.reporter
            .success(&format!("Rebased '{}' onto '{}'", branch, development));
        run.finish()
    }

    /// Merge the development branch into the current epic branch
    pub fn epic_update(&self) -> Result<WorkflowResult> {
        let mut run = self.begin(GitFlowAction::EpicUpdate, true)?;
        let branch = run.branch.clone();
        topic_name(&run, BranchType::Epic)?;
        let development = self.config.branches.development.as_str();

        run.merge("merge", development, &branch)?;
        run.install("install", &branch, &format!("merge of '{}'", development))?;

        self.reporter
            .success(&format!("Updated '{}' with '{}'", branch, development));
        run.finish()
    }

    pub fn feature_finish(&self) -> Result<WorkflowResult> {
        self.finish_topic(GitFlowAction::FeatureFinish, BranchType::Feature)
    }

    pub fn epic_finish(&self) -> Result<WorkflowResult> {
        self.finish_topic(GitFlowAction::EpicFinish, BranchType::Epic)
    }

    /// Start a maintenance line from `base` (default: the production branch)
    pub fn maintenance_start(
        &self,
        name: Option<&str>,
        base: Option<&str>,
        version: Option<&str>,
    ) -> Result<WorkflowResult> {
        let name = validated(&BranchNameValidator, name)?;
        if version.is_some() {
            validated(&VersionValidator, version)?;
        }
        let base = base.unwrap_or(self.config.branches.production.as_str());

        let mut run = self.begin(GitFlowAction::MaintenanceStart, true)?;
        let branch = BranchType::Maintenance.branch_name(name);
        self.create_and_checkout(&branch, base)?;
        run.branch = branch.clone();

        if let Some(version) = version {
            run.change_version(&branch, version)?;
        }

        self.reporter
            .success(&format!("Started maintenance branch '{}' from '{}'", branch, base));
        run.finish()
    }

    /// Start a release from the development branch, or from the checked out maintenance branch
    pub fn release_start(&self, version: Option<&str>) -> Result<WorkflowResult> {
        if version.is_some() {
            validated(&VersionValidator, version)?;
        }

        let run = self.begin(GitFlowAction::ReleaseStart, true)?;
        let base = if BranchType::classify(&run.branch) == Some(BranchType::Maintenance) {
            run.branch.clone()
        } else {
            self.config.branches.development.clone()
        };

        self.start_release_line(run, ReleaseLine::Release, &base, version)
    }

    pub fn release_finish(&self) -> Result<WorkflowResult> {
        let run = self.begin(GitFlowAction::ReleaseFinish, true)?;
        let branch = run.branch.clone();
        let version = BranchType::Release
            .short_name(&branch)
            .ok_or_else(|| GitFlowError::from(run.builder(&branch).wrong_branch("release")))?;
        validated(&VersionValidator, Some(version))?;

        self.finish_release_line(run, ReleaseLine::Release, &branch, version)
    }

    /// Start a hotfix from the production branch, or from the checked out maintenance branch
    pub fn hotfix_start(&self, version: Option<&str>) -> Result<WorkflowResult> {
        if version.is_some() {
            validated(&VersionValidator, version)?;
        }

        let run = self.begin(GitFlowAction::HotfixStart, true)?;
        let base = if BranchType::classify(&run.branch) == Some(BranchType::Maintenance) {
            run.branch.clone()
        } else {
            self.config.branches.production.clone()
        };

        self.start_release_line(run, ReleaseLine::Hotfix, &base, version)
    }

    pub fn hotfix_finish(&self) -> Result<WorkflowResult> {
        let run = self.begin(GitFlowAction::HotfixFinish, true)?;
        let branch = run.branch.clone();
        if !is_hotfix_branch(&branch) {
            return Err(run.builder(&branch).wrong_branch("hotfix").into());
        }
        let version = &branch[HOTFIX_PREFIX.len()..];
        validated(&VersionValidator, Some(version))?;

        self.finish_release_line(run, ReleaseLine::Hotfix, &branch, version)
    }

    /// Set the version of the checked out branch
    pub fn set_version(&self, version: Option<&str>) -> Result<WorkflowResult> {
        let version = validated(&VersionValidator, version)?;

        let mut run = self.begin(GitFlowAction::SetVersion, true)?;
        let branch = run.branch.clone();
        run.change_version(&branch, version)?;

        self.reporter
            .success(&format!("Version of branch '{}' is {}", branch, version));
        run.finish()
    }

    /// Stamp a CI build identifier onto the version, without committing
    pub fn build_version(&self, build_id: Option<&str>) -> Result<WorkflowResult> {
        let build_id = validated(&BuildIdentifierValidator, build_id)?;

        let mut run = self.begin(GitFlowAction::BuildVersion, false)?;
        let branch = run.branch.clone();
        let current = self.version_source()?.read_version(self.repo, &branch)?;
        let build_version = version::build_version(&current, build_id);
        run.change_version_uncommitted(&branch, &build_version)?;

        self.reporter
            .success(&format!("Build version of branch '{}' is {}", branch, build_version));
        run.finish()
    }

    /// Move the version of the checked out branch to another storage
    pub fn make_versionless(&self, mode: Option<&str>) -> Result<WorkflowResult> {
        let mode: VersionlessMode = validated(&VersionlessModeValidator, mode)?.parse()?;

        let run = self.begin(GitFlowAction::MakeVersionless, true)?;
        let branch = run.branch.clone();
        let current_mode = self.versionless_mode()?;

        if current_mode == mode {
            self.reporter
                .status(&format!("Versionless mode is already '{}'", mode));
            return run.finish();
        }

        let version = self.version_source()?.read_version(self.repo, &branch)?;
        let target = version_source_for(mode, &self.config.version, self.repo.workdir().as_deref())?;
        target.write_version(self.repo, &branch, &version)?;
        self.repo.set_config_value(VERSIONLESS_KEY, mode.tag())?;

        if target.needs_version_change_commit() {
            self.repo
                .commit_all(&format!("Store version {} for versionless mode '{}'", version, mode))?;
        }

        if self.config.versionless_override.is_some() {
            debug!("versionless override is set and still takes precedence");
        }

        self.reporter.success(&format!(
            "Switched from versionless mode '{}' to '{}' with version {}",
            current_mode, mode, version
        ));
        run.finish()
    }

    fn create_and_checkout(&self, branch: &str, start_point: &str) -> Result<()> {
        if self.repo.branch_exists(branch)? {
            return Err(GitFlowError::branch(format!(
                "Branch '{}' already exists",
                branch
            )));
        }

        self.repo.create_branch(branch, start_point)?;
        self.repo.checkout(branch)?;
        self.version_source()?.inherit(self.repo, start_point, branch)
    }

    fn start_topic(
        &self,
        action: GitFlowAction,
        branch_type: BranchType,
        name: Option<&str>,
    ) -> Result<WorkflowResult> {
        let name = validated(&BranchNameValidator, name)?;
        let development = self.config.branches.development.as_str();

        let mut run = self.begin(action, true)?;
        let branch = branch_type.branch_name(name);
        self.create_and_checkout(&branch, development)?;
        run.branch = branch.clone();

        if self.config.flow.feature_versions && self.tracks_branch_versions()? {
            let base = self.version_source()?.read_version(self.repo, &branch)?;
            run.change_version(&branch, &version::feature_version(&base, name))?;
        }

        self.reporter
            .success(&format!("Started {} branch '{}'", branch_type, branch));
        run.finish()
    }

    fn finish_topic(&self, action: GitFlowAction, branch_type: BranchType) -> Result<WorkflowResult> {
        let mut run = self.begin(action, true)?;
        let branch = run.branch.clone();
        let name = topic_name(&run, branch_type)?;
        let development = self.config.branches.development.as_str();

        if run.step("version").runs()
            && self.config.flow.feature_versions
            && self.tracks_branch_versions()?
        {
            let current = self.version_source()?.read_version(self.repo, &branch)?;
            run.change_version(&branch, &version::remove_feature_qualifier(&current, &name))?;
        }

        let process = if branch_type == BranchType::Epic {
            run.merge("update", development, &branch)?;
            format!("merge of '{}'", development)
        } else {
            run.rebase("rebase", &branch, development)?;
            format!("rebase onto {}", development)
        };
        run.install("install", &branch, &process)?;
        run.merge("merge", &branch, development)?;

        if run.step("cleanup").runs() && !self.config.flow.keep_branch {
            run.ensure_checked_out(development)?;
            self.delete_branch(&branch, development)?;

            let marker = BranchType::Integrated.branch_name(&name);
            if self.repo.branch_exists(&marker)? {
                self.repo.delete_branch(&marker)?;
            }
        }

        if run.step("push").runs() && self.config.flow.push {
            self.push(&[development], None)?;
        }

        self.run_hook(HookType::PostFinish, action, &branch, None, None);
        self.reporter
            .success(&format!("Finished '{}' into '{}'", branch, development));
        run.finish()
    }

    fn start_release_line(
        &self,
        mut run: GoalRun<'_>,
        line: ReleaseLine,
        base: &str,
        version: Option<&str>,
    ) -> Result<WorkflowResult> {
        run.ensure_checked_out(base)?;

        let version = match version {
            Some(version) => version.to_string(),
            None => {
                let current = self.version_source()?.read_version(self.repo, base)?;
                match line {
                    ReleaseLine::Release => version::release_version_for(&current)?,
                    ReleaseLine::Hotfix => version::hotfix_version_for(&current)?,
                }
            }
        };
        validated(&VersionValidator, Some(version.as_str()))?;

        let branch = match line {
            ReleaseLine::Release => BranchType::Release.branch_name(&version),
            ReleaseLine::Hotfix => format!("{}{}", HOTFIX_PREFIX, version),
        };
        self.create_and_checkout(&branch, base)?;
        self.repo.set_config_value(&base_key(&branch), base)?;
        run.branch = branch.clone();

        if self.tracks_branch_versions()? {
            run.change_version(&branch, &version)?;
        }

        self.reporter
            .success(&format!("Started '{}' from '{}'", branch, base));
        run.finish()
    }

    fn finish_release_line(
        &self,
        mut run: GoalRun<'_>,
        line: ReleaseLine,
        branch: &str,
        version: &str,
    ) -> Result<WorkflowResult> {
        let production = self.config.branches.production.as_str();
        let development = self.config.branches.development.as_str();

        let base = self.repo.config_value(&base_key(branch))?;
        let target = match base.as_deref() {
            Some(base) if BranchType::classify(base) == Some(BranchType::Maintenance) => base,
            _ => production,
        };
        let maintenance = target != production;
        let tag = format!("{}{}", self.config.version.tag_prefix, version);
        let tracks_versions = self.tracks_branch_versions()?;

        run.merge("merge", branch, target)?;

        if run.step("tag").runs() {
            run.ensure_checked_out(target)?;
            self.version_source()?.inherit(self.repo, branch, target)?;
            if !self.repo.tag_exists(&tag)? {
                self.repo.create_tag(&tag)?;
            }
        }

        run.install("install", target, &format!("merge of '{}'", branch))?;

        let mut pushed = vec![target];
        if maintenance {
            if run.step("next-version").runs() && tracks_versions {
                run.ensure_checked_out(target)?;
                run.change_version(target, &version::next_maintenance_version(version)?)?;
            }
        } else {
            pushed.push(development);
            match line {
                ReleaseLine::Release => {
                    run.merge("develop", branch, development)?;
                    if run.step("next-version").runs() && tracks_versions {
                        run.ensure_checked_out(development)?;
                        run.change_version(development, &version::next_development_version(version)?)?;
                    }
                }
                ReleaseLine::Hotfix => {
                    run.merge_keeping_version("develop", branch, development)?;
                }
            }
        }

        if run.step("cleanup").runs() && !self.config.flow.keep_branch {
            if self.repo.current_branch()? == branch {
                self.repo.checkout(target)?;
            }
            self.delete_branch(branch, target)?;
        }

        if run.step("push").runs() && self.config.flow.push {
            self.push(&pushed, Some(tag.as_str()))?;
        }

        self.reporter
            .success(&format!("Released {} as '{}'", version, tag));
        run.finish()
    }
}

/// Short name of the goal's branch, which must be of `branch_type`
fn topic_name(run: &GoalRun<'_>, branch_type: BranchType) -> Result<String> {
    branch_type
        .short_name(&run.branch)
        .map(str::to_string)
        .ok_or_else(|| run.builder(&run.branch).wrong_branch(branch_type.tag()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::MockBuild;
    use crate::config::Config;
    use crate::git::{MockRepository, Repository};
    use crate::ui::RecordingReporter;

    fn config_mode() -> Config {
        let mut config = Config::default();
        config.version.versionless = VersionlessMode::Config;
        config
    }

    #[test]
    fn test_feature_start_sets_feature_version() {
        let repo = MockRepository::new("develop");
        repo.set_config_value("branch.develop.gitflow-version", "1.2.0-SNAPSHOT")
            .unwrap();
        let build = MockBuild::new();
        let config = config_mode();
        let reporter = RecordingReporter::new();
        let workflow = Workflow::new(&repo, &build, &config, &reporter);

        let result = workflow.feature_start(Some("login")).unwrap();

        assert_eq!(result.branch, "feature/login");
        assert_eq!(repo.current_branch().unwrap(), "feature/login");
        assert_eq!(
            repo.config_value("branch.feature/login.gitflow-version").unwrap().as_deref(),
            Some("1.2.0-login-SNAPSHOT")
        );
        assert_eq!(result.version_changes.len(), 1);
        assert!(!result.version_changes[0].notified);
    }

    #[test]
    fn test_invalid_name_touches_nothing() {
        let repo = MockRepository::new("develop");
        let build = MockBuild::new();
        let config = config_mode();
        let reporter = RecordingReporter::new();
        let workflow = Workflow::new(&repo, &build, &config, &reporter);

        let err = workflow.feature_start(Some("bad..name")).unwrap_err();
        assert!(matches!(err, GitFlowError::Validation(_)));
        assert_eq!(repo.branch_names(), vec!["develop".to_string()]);
    }

    #[test]
    fn test_set_version_is_notified() {
        let repo = MockRepository::new("develop");
        let build = MockBuild::new();
        let config = config_mode();
        let reporter = RecordingReporter::new();
        let workflow = Workflow::new(&repo, &build, &config, &reporter);

        let result = workflow.set_version(Some("2.0.0-SNAPSHOT")).unwrap();

        assert_eq!(result.version_changes.len(), 1);
        assert!(result.version_changes[0].notified);
        assert_eq!(result.version_changes[0].old, None);
        assert_eq!(workflow.current_version().unwrap(), "2.0.0-SNAPSHOT");
    }

    #[test]
    fn test_run_goal_by_name_unknown() {
        let repo = MockRepository::new("develop");
        let build = MockBuild::new();
        let config = config_mode();
        let reporter = RecordingReporter::new();
        let workflow = Workflow::new(&repo, &build, &config, &reporter);

        assert!(run_goal_by_name(&workflow, "feature-publish", &GoalParams::default()).is_err());
        assert!(reporter.warnings().is_empty());
    }

    #[test]
    fn test_resume_point_is_consumed() {
        let repo = MockRepository::new("feature/x");
        let build = MockBuild::new();
        let config = config_mode();
        let reporter = RecordingReporter::new();
        let workflow = Workflow::new(&repo, &build, &config, &reporter);

        crate::workflow::Breakpoint::new("feature-rebase", "install", "feature/x")
            .store(&repo)
            .unwrap();
        let mut run = workflow.begin(GitFlowAction::FeatureRebase, true).unwrap();

        assert_eq!(run.step("integrated"), Step::Skip);
        assert_eq!(run.step("rebase"), Step::Skip);
        assert_eq!(run.step("install"), Step::Resume);
        assert_eq!(run.step("cleanup"), Step::Run);
    }
}
