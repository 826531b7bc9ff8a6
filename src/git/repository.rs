use std::collections::HashMap;
use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{
    BranchType, ConfigLevel, ErrorCode, IndexAddOption, ObjectType, Oid, PushOptions,
    RemoteCallbacks, Repository as Git2Repo, RepositoryState, Sort, StatusOptions,
};
use tracing::debug;

use crate::domain::version;
use crate::error::{GitFlowError, Result};
use crate::rebase::InteractiveRebaseResult;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn branch_oid(&self, name: &str) -> Result<Oid> {
        let branch = self
            .repo
            .find_branch(name, BranchType::Local)
            .map_err(|e| GitFlowError::branch(format!("Cannot find branch '{}': {}", name, e)))?;

        branch
            .get()
            .target()
            .ok_or_else(|| GitFlowError::branch(format!("Branch '{}' has no target", name)))
    }

    fn head_commit(&self) -> Result<git2::Commit<'_>> {
        Ok(self.repo.head()?.peel_to_commit()?)
    }

    fn conflict_paths(index: &git2::Index) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        for conflict in index.conflicts()? {
            let conflict = conflict?;
            if let Some(entry) = conflict.our.or(conflict.their).or(conflict.ancestor) {
                paths.push(String::from_utf8_lossy(&entry.path).into_owned());
            }
        }
        Ok(paths)
    }

    fn push_refspec(&self, remote_name: &str, refspec: &str) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|_| GitFlowError::branch(format!("Remote '{}' not found", remote_name)))?;

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            let username = username_from_url.unwrap_or("git");
            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }

                if let Some(home) = dirs::home_dir() {
                    for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                        let path = home.join(".ssh").join(key);
                        if path.exists() {
                            if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                                return Ok(cred);
                            }
                        }
                    }
                }
            }

            git2::Cred::default()
        });

        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);

        debug!(remote = remote_name, refspec, "pushing");
        remote.push(&[refspec], Some(&mut options)).map_err(|e| {
            GitFlowError::branch(format!("Push of '{}' to '{}' failed: {}", refspec, remote_name, e))
        })?;

        Ok(())
    }

    fn local_config(&self) -> Result<git2::Config> {
        Ok(self.repo.config()?.open_level(ConfigLevel::Local)?)
    }
}

fn describe_state(state: RepositoryState) -> &'static str {
    match state {
        RepositoryState::Clean => "no operation",
        RepositoryState::Merge => "merge",
        RepositoryState::Rebase | RepositoryState::RebaseInteractive | RepositoryState::RebaseMerge => {
            "rebase"
        }
        RepositoryState::CherryPick | RepositoryState::CherryPickSequence => "cherry-pick",
        RepositoryState::Revert | RepositoryState::RevertSequence => "revert",
        RepositoryState::Bisect => "bisect",
        RepositoryState::ApplyMailbox | RepositoryState::ApplyMailboxOrRebase => "am",
    }
}

impl super::Repository for Git2Repository {
    fn workdir(&self) -> Option<PathBuf> {
        self.repo.workdir().map(Path::to_path_buf)
    }

    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(GitFlowError::branch(
                "HEAD is detached, check out a branch first",
            ));
        }

        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| GitFlowError::branch("Current branch name is not valid UTF-8"))
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        match self.repo.find_branch(name, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn create_branch(&self, name: &str, start_point: &str) -> Result<()> {
        let commit = self
            .repo
            .revparse_single(start_point)
            .map_err(|e| {
                GitFlowError::branch(format!("Cannot resolve '{}': {}", start_point, e))
            })?
            .peel_to_commit()?;

        self.repo.branch(name, &commit, false).map_err(|e| {
            GitFlowError::branch(format!("Cannot create branch '{}': {}", name, e))
        })?;

        debug!(branch = name, start_point, "created branch");
        Ok(())
    }

    fn checkout(&self, name: &str) -> Result<()> {
        let refname = format!("refs/heads/{}", name);
        let target = self.repo.revparse_single(&refname).map_err(|e| {
            GitFlowError::branch(format!("Cannot find branch '{}': {}", name, e))
        })?;

        let mut options = CheckoutBuilder::new();
        options.safe();
        self.repo.checkout_tree(&target, Some(&mut options))?;
        self.repo.set_head(&refname)?;

        debug!(branch = name, "checked out");
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        let mut branch = self
            .repo
            .find_branch(name, BranchType::Local)
            .map_err(|e| GitFlowError::branch(format!("Cannot find branch '{}': {}", name, e)))?;

        branch.delete()?;
        Ok(())
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(!statuses.is_empty())
    }

    fn commit_all(&self, message: &str) -> Result<()> {
        let mut index = self.repo.index()?;
        index.update_all(["*"].iter(), None)?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.write()?;

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = self.repo.signature()?;
        let parent = self.head_commit()?;

        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])?;

        debug!(message, "committed");
        Ok(())
    }

    fn merge(&self, source: &str, message: &str) -> Result<InteractiveRebaseResult> {
        let source_oid = self.branch_oid(source)?;
        let annotated = self.repo.find_annotated_commit(source_oid)?;

        let (analysis, _) = self.repo.merge_analysis(&[&annotated])?;
        if analysis.is_up_to_date() {
            debug!(source, "nothing to merge");
            return Ok(InteractiveRebaseResult::SUCCESS);
        }

        self.repo.merge(&[&annotated], None, None)?;

        let mut index = self.repo.index()?;
        if index.has_conflicts() {
            let paths = Self::conflict_paths(&index)?;
            return Ok(InteractiveRebaseResult::conflict(format!(
                "Merge conflict in {}",
                paths.join(", ")
            )));
        }

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = self.repo.signature()?;
        let head = self.head_commit()?;
        let source_commit = self.repo.find_commit(source_oid)?;

        self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&head, &source_commit],
        )?;
        self.repo.cleanup_state()?;

        debug!(source, "merged");
        Ok(InteractiveRebaseResult::SUCCESS)
    }

    fn rebase(&self, upstream: &str) -> Result<InteractiveRebaseResult> {
        let upstream_oid = self.branch_oid(upstream)?;
        let upstream_commit = self.repo.find_annotated_commit(upstream_oid)?;

        let mut rebase = self.repo.rebase(None, Some(&upstream_commit), None, None)?;
        let signature = self.repo.signature()?;

        while let Some(operation) = rebase.next() {
            let commit_id = operation?.id();

            let index = self.repo.index()?;
            if index.has_conflicts() {
                let paths = Self::conflict_paths(&index)?;
                return Ok(InteractiveRebaseResult::conflict(format!(
                    "could not apply {}: conflict in {}",
                    commit_id,
                    paths.join(", ")
                )));
            }

            if let Err(e) = rebase.commit(None, &signature, None) {
                // Commit already present upstream
                if e.code() != ErrorCode::Applied {
                    return Err(e.into());
                }
            }
        }

        rebase.finish(Some(&signature))?;

        debug!(upstream, "rebased");
        Ok(InteractiveRebaseResult::SUCCESS)
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        let ancestor = self.branch_oid(ancestor)?;
        let descendant = self.branch_oid(descendant)?;

        Ok(ancestor == descendant || self.repo.graph_descendant_of(descendant, ancestor)?)
    }

    fn pending_operation(&self) -> Result<InteractiveRebaseResult> {
        let state = self.repo.state();
        if state == RepositoryState::Clean {
            return Ok(InteractiveRebaseResult::SUCCESS);
        }

        let operation = describe_state(state);
        if self.repo.index()?.has_conflicts() {
            Ok(InteractiveRebaseResult::conflict(format!(
                "{} in progress with unresolved conflicts",
                operation
            )))
        } else {
            Ok(InteractiveRebaseResult::paused(format!("{} in progress", operation)))
        }
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        match self.repo.find_reference(&format!("refs/tags/{}", name)) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel(ObjectType::Commit)?;

        self.repo
            .tag_lightweight(name, &head, false)
            .map_err(|e| GitFlowError::branch(format!("Cannot create tag '{}': {}", name, e)))?;

        Ok(())
    }

    fn reachable_tags(&self, prefix: &str) -> Result<Vec<String>> {
        let mut tagged = HashMap::new();
        for tag_name in self.repo.tag_names(Some(&format!("{}*", prefix)))?.iter().flatten() {
            if let Ok(reference) = self.repo.find_reference(&format!("refs/tags/{}", tag_name)) {
                if let Ok(commit) = reference.peel(ObjectType::Commit) {
                    tagged
                        .entry(commit.id())
                        .or_insert_with(Vec::new)
                        .push(tag_name.to_string());
                }
            }
        }

        if tagged.is_empty() {
            return Ok(Vec::new());
        }

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push_head()?;

        let mut reachable = Vec::new();
        for oid in revwalk {
            if let Some(mut names) = tagged.remove(&oid?) {
                names.sort_by(|a, b| version::compare(&b[prefix.len()..], &a[prefix.len()..]));
                reachable.extend(names);
            }
            if tagged.is_empty() {
                break;
            }
        }

        Ok(reachable)
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.push_refspec(remote, &format!("refs/heads/{0}:refs/heads/{0}", branch))
    }

    fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        self.push_refspec(remote, &format!("refs/tags/{0}:refs/tags/{0}", tag))
    }

    fn config_value(&self, key: &str) -> Result<Option<String>> {
        match self.repo.config()?.get_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_config_value(&self, key: &str, value: &str) -> Result<()> {
        self.local_config()?.set_str(key, value)?;
        Ok(())
    }

    fn remove_config_value(&self, key: &str) -> Result<()> {
        match self.local_config()?.remove(key) {
            Ok(()) => Ok(()),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_state() {
        assert_eq!(describe_state(RepositoryState::RebaseMerge), "rebase");
        assert_eq!(describe_state(RepositoryState::Merge), "merge");
        assert_eq!(describe_state(RepositoryState::Clean), "no operation");
    }

    #[test]
    fn test_open_outside_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        // tempdir may itself live inside a repository on some machines
        if Git2Repo::discover(dir.path()).is_err() {
            assert!(Git2Repository::open(dir.path()).is_err());
        }
    }
}
