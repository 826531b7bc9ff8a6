// tests/git2_repository_test.rs
use std::fs;
use std::path::Path;

use gitflow::build::MockBuild;
use gitflow::config::Config;
use gitflow::domain::VersionlessMode;
use gitflow::git::{Git2Repository, Repository};
use gitflow::rebase::InteractiveRebaseStatus;
use gitflow::ui::RecordingReporter;
use gitflow::workflow::Workflow;
use tempfile::TempDir;

/// Repository with one commit on `develop` and a `master` branch at the same commit
fn init_repo() -> (TempDir, Git2Repository) {
    let dir = tempfile::tempdir().unwrap();
    let repo = git2::Repository::init(dir.path()).unwrap();
    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }
    repo.set_head("refs/heads/develop").unwrap();

    fs::write(dir.path().join("README.md"), "hello\n").unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new("README.md")).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    {
        let tree = repo.find_tree(tree_id).unwrap();
        let signature = repo.signature().unwrap();
        let commit = repo
            .commit(Some("HEAD"), &signature, &signature, "Initial commit", &tree, &[])
            .unwrap();
        let commit = repo.find_commit(commit).unwrap();
        repo.branch("master", &commit, false).unwrap();
    }

    (dir, Git2Repository::from_git2(repo))
}

fn commit_file(dir: &TempDir, repo: &Git2Repository, name: &str, content: &str, message: &str) {
    fs::write(dir.path().join(name), content).unwrap();
    repo.commit_all(message).unwrap();
}

#[test]
fn test_branches_and_commits() {
    let (dir, repo) = init_repo();

    assert_eq!(repo.current_branch().unwrap(), "develop");
    assert!(repo.branch_exists("master").unwrap());
    assert!(!repo.branch_exists("feature/x").unwrap());

    repo.create_branch("feature/x", "develop").unwrap();
    repo.checkout("feature/x").unwrap();
    assert_eq!(repo.current_branch().unwrap(), "feature/x");

    fs::write(dir.path().join("README.md"), "changed\n").unwrap();
    assert!(repo.has_uncommitted_changes().unwrap());
    repo.commit_all("Change readme").unwrap();
    assert!(!repo.has_uncommitted_changes().unwrap());

    assert!(repo.delete_branch("develop").is_ok());
    assert!(repo.create_branch("other", "does-not-exist").is_err());
}

#[test]
fn test_merge_creates_merge_commit() {
    let (dir, repo) = init_repo();
    repo.create_branch("feature/x", "develop").unwrap();
    repo.checkout("feature/x").unwrap();
    commit_file(&dir, &repo, "feature.txt", "feature\n", "Add feature");
    repo.checkout("develop").unwrap();
    assert!(!repo.is_ancestor("feature/x", "develop").unwrap());
    assert!(repo.is_ancestor("develop", "feature/x").unwrap());

    let result = repo
        .merge("feature/x", "Merge branch 'feature/x' into develop")
        .unwrap();
    assert!(result.is_success());
    assert!(repo.is_ancestor("feature/x", "develop").unwrap());
    assert!(dir.path().join("feature.txt").exists());

    let git = git2::Repository::open(dir.path()).unwrap();
    let head = git.head().unwrap().peel_to_commit().unwrap();
    assert_eq!(head.parent_count(), 2);
    assert_eq!(head.message(), Some("Merge branch 'feature/x' into develop"));
    assert!(repo.pending_operation().unwrap().is_success());
}

#[test]
fn test_merge_conflict_is_reported() {
    let (dir, repo) = init_repo();
    repo.create_branch("feature/x", "develop").unwrap();
    commit_file(&dir, &repo, "README.md", "develop\n", "Develop change");
    repo.checkout("feature/x").unwrap();
    commit_file(&dir, &repo, "README.md", "feature\n", "Feature change");
    repo.checkout("develop").unwrap();

    let result = repo.merge("feature/x", "Merge").unwrap();
    assert_eq!(result.status(), InteractiveRebaseStatus::Conflict);
    assert!(result.git_message().unwrap().contains("README.md"));

    let pending = repo.pending_operation().unwrap();
    assert_eq!(pending.status(), InteractiveRebaseStatus::Conflict);
}

#[test]
fn test_rebase_onto_development() {
    let (dir, repo) = init_repo();
    repo.create_branch("feature/x", "develop").unwrap();
    commit_file(&dir, &repo, "develop.txt", "develop\n", "Develop change");
    repo.checkout("feature/x").unwrap();
    commit_file(&dir, &repo, "feature.txt", "feature\n", "Feature change");

    let result = repo.rebase("develop").unwrap();
    assert!(result.is_success());
    assert_eq!(repo.current_branch().unwrap(), "feature/x");
    assert!(dir.path().join("develop.txt").exists());
    assert!(dir.path().join("feature.txt").exists());
}

#[test]
fn test_tags_and_config() {
    let (dir, repo) = init_repo();
    repo.create_tag("v1.0.0").unwrap();
    commit_file(&dir, &repo, "next.txt", "next\n", "Next");
    repo.create_tag("v1.1.0").unwrap();
    repo.create_tag("other-tag").unwrap();

    assert!(repo.tag_exists("v1.0.0").unwrap());
    assert_eq!(repo.latest_tag("v").unwrap().as_deref(), Some("v1.1.0"));
    assert_eq!(repo.latest_tag("release-").unwrap(), None);

    assert_eq!(repo.config_value("gitflow.versionless").unwrap(), None);
    repo.set_config_value("gitflow.versionless", "tags").unwrap();
    assert_eq!(
        repo.config_value("gitflow.versionless").unwrap().as_deref(),
        Some("tags")
    );
    repo.remove_config_value("gitflow.versionless").unwrap();
    repo.remove_config_value("gitflow.versionless").unwrap();
    assert_eq!(repo.config_value("gitflow.versionless").unwrap(), None);
}

#[test]
fn test_tags_on_one_commit_are_ordered_by_version() {
    let (_dir, repo) = init_repo();
    repo.create_tag("v1.9.0").unwrap();
    repo.create_tag("v1.10.0-42").unwrap();
    repo.create_tag("v1.10.0").unwrap();

    assert_eq!(
        repo.reachable_tags("v").unwrap(),
        vec![
            "v1.10.0".to_string(),
            "v1.10.0-42".to_string(),
            "v1.9.0".to_string()
        ]
    );
    assert_eq!(repo.latest_tag("v").unwrap().as_deref(), Some("v1.10.0"));
}

#[test]
fn test_feature_workflow_on_real_repository() {
    let (dir, repo) = init_repo();
    repo.set_config_value("branch.develop.gitflow-version", "1.0.0-SNAPSHOT")
        .unwrap();

    let mut config = Config::default();
    config.version.versionless = VersionlessMode::Config;
    config.flow.install_project = false;
    let build = MockBuild::new();
    let reporter = RecordingReporter::new();
    let workflow = Workflow::new(&repo, &build, &config, &reporter);

    workflow.feature_start(Some("login")).unwrap();
    assert_eq!(
        repo.config_value("branch.feature/login.gitflow-version")
            .unwrap()
            .as_deref(),
        Some("1.0.0-login-SNAPSHOT")
    );
    commit_file(&dir, &repo, "login.txt", "login\n", "Add login");

    workflow.feature_finish().unwrap();

    assert_eq!(repo.current_branch().unwrap(), "develop");
    assert!(!repo.branch_exists("feature/login").unwrap());
    assert!(dir.path().join("login.txt").exists());
    assert_eq!(build.install_count(), 0);
}
