use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use crate::error::{GitFlowError, Result};
use crate::git::Repository;
use crate::rebase::InteractiveRebaseResult;

#[derive(Debug, Clone)]
struct MockCommit {
    id: u64,
    message: String,
    /// Commits brought in by a merge or rebase
    merged: HashSet<u64>,
}

#[derive(Default)]
struct MockState {
    current: String,
    /// First-parent history per branch, oldest first
    branches: HashMap<String, Vec<MockCommit>>,
    next_id: u64,
    /// Tags in creation order with the branch they were created on
    tags: Vec<(String, String)>,
    config: HashMap<String, String>,
    dirty: bool,
    pending: Option<InteractiveRebaseResult>,
    /// Branch being merged in or rebased onto by the open operation
    pending_source: Option<String>,
    merge_results: VecDeque<InteractiveRebaseResult>,
    rebase_results: VecDeque<InteractiveRebaseResult>,
    pushed: Vec<String>,
    workdir: Option<PathBuf>,
}

/// Mock repository for testing without actual git operations
///
/// Branches are lists of commits that remember what merges and rebases
/// brought in, so ancestry can be answered. Merge and rebase succeed unless a
/// result was queued with [MockRepository::queue_merge_result] or
/// [MockRepository::queue_rebase_result].
pub struct MockRepository {
    state: Mutex<MockState>,
}

impl MockRepository {
    /// Create a repository with a single branch that is checked out
    pub fn new(initial_branch: &str) -> Self {
        let mut state = MockState {
            current: initial_branch.to_string(),
            ..MockState::default()
        };
        let initial = state.new_commit("Initial commit".to_string(), HashSet::new());
        state.branches.insert(initial_branch.to_string(), vec![initial]);

        MockRepository {
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A poisoned lock only means another test thread panicked
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_workdir(self, workdir: impl Into<PathBuf>) -> Self {
        self.state().workdir = Some(workdir.into());
        self
    }

    /// Add a branch with the same history as the current branch
    pub fn add_branch(&self, name: &str) {
        let mut state = self.state();
        let history = state.branches.get(&state.current).cloned().unwrap_or_default();
        state.branches.insert(name.to_string(), history);
    }

    pub fn set_current_branch(&self, name: &str) {
        let mut state = self.state();
        state.branches.entry(name.to_string()).or_default();
        state.current = name.to_string();
    }

    pub fn set_dirty(&self, dirty: bool) {
        self.state().dirty = dirty;
    }

    pub fn set_pending_operation(&self, result: InteractiveRebaseResult) {
        self.state().pending = Some(result);
    }

    /// Simulate the user resolving conflicts and committing the result
    pub fn resolve_pending_operation(&self, message: &str) {
        let mut state = self.state();
        state.pending = None;
        state.dirty = false;
        let merged = match state.pending_source.take() {
            Some(source) => state.reachable(&source),
            None => HashSet::new(),
        };
        state.record_commit(message.to_string(), merged);
    }

    /// Simulate `git merge --abort` or `git rebase --abort`
    pub fn abort_pending_operation(&self) {
        let mut state = self.state();
        state.pending = None;
        state.pending_source = None;
        state.dirty = false;
    }

    pub fn queue_merge_result(&self, result: InteractiveRebaseResult) {
        self.state().merge_results.push_back(result);
    }

    pub fn queue_rebase_result(&self, result: InteractiveRebaseResult) {
        self.state().rebase_results.push_back(result);
    }

    /// First-parent commit messages of a branch
    pub fn commits(&self, branch: &str) -> Vec<String> {
        self.state()
            .branches
            .get(branch)
            .map(|commits| commits.iter().map(|commit| commit.message.clone()).collect())
            .unwrap_or_default()
    }

    pub fn branch_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state().branches.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn tag_names(&self) -> Vec<String> {
        self.state().tags.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Pushed refs as `<remote>/<ref>`
    pub fn pushed(&self) -> Vec<String> {
        self.state().pushed.clone()
    }

}

impl MockState {
    fn new_commit(&mut self, message: String, merged: HashSet<u64>) -> MockCommit {
        self.next_id += 1;
        MockCommit {
            id: self.next_id,
            message,
            merged,
        }
    }

    fn record_commit(&mut self, message: String, merged: HashSet<u64>) {
        let commit = self.new_commit(message, merged);
        let current = self.current.clone();
        self.branches.entry(current).or_default().push(commit);
    }

    /// Ids of every commit contained in a branch
    fn reachable(&self, branch: &str) -> HashSet<u64> {
        let mut reachable = HashSet::new();
        for commit in self.branches.get(branch).into_iter().flatten() {
            reachable.insert(commit.id);
            reachable.extend(commit.merged.iter().copied());
        }
        reachable
    }
}

impl Repository for MockRepository {
    fn workdir(&self) -> Option<PathBuf> {
        self.state().workdir.clone()
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.state().current.clone())
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.state().branches.contains_key(name))
    }

    fn create_branch(&self, name: &str, start_point: &str) -> Result<()> {
        let mut state = self.state();
        if state.branches.contains_key(name) {
            return Err(GitFlowError::branch(format!(
                "Cannot create branch '{}': already exists",
                name
            )));
        }

        let history = match state.branches.get(start_point).cloned() {
            Some(history) => history,
            None if state.tags.iter().any(|(tag, _)| tag == start_point) => {
                vec![state.new_commit(format!("Tagged {}", start_point), HashSet::new())]
            }
            None => {
                return Err(GitFlowError::branch(format!(
                    "Cannot resolve '{}'",
                    start_point
                )))
            }
        };

        state.branches.insert(name.to_string(), history);
        Ok(())
    }

    fn checkout(&self, name: &str) -> Result<()> {
        let mut state = self.state();
        if !state.branches.contains_key(name) {
            return Err(GitFlowError::branch(format!("Cannot find branch '{}'", name)));
        }
        state.current = name.to_string();
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        let mut state = self.state();
        if state.current == name {
            return Err(GitFlowError::branch(format!(
                "Cannot delete checked out branch '{}'",
                name
            )));
        }
        state
            .branches
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| GitFlowError::branch(format!("Cannot find branch '{}'", name)))
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        Ok(self.state().dirty)
    }

    fn commit_all(&self, message: &str) -> Result<()> {
        let mut state = self.state();
        state.dirty = false;
        state.record_commit(message.to_string(), HashSet::new());
        Ok(())
    }

    fn merge(&self, source: &str, message: &str) -> Result<InteractiveRebaseResult> {
        let mut state = self.state();
        if !state.branches.contains_key(source) {
            return Err(GitFlowError::branch(format!("Cannot find branch '{}'", source)));
        }

        let result = state
            .merge_results
            .pop_front()
            .unwrap_or(InteractiveRebaseResult::SUCCESS);

        if result.is_success() {
            let merged = state.reachable(source);
            state.record_commit(message.to_string(), merged);
        } else {
            state.pending = Some(result.clone());
            state.pending_source = Some(source.to_string());
            state.dirty = true;
        }
        Ok(result)
    }

    fn rebase(&self, upstream: &str) -> Result<InteractiveRebaseResult> {
        let mut state = self.state();
        if !state.branches.contains_key(upstream) {
            return Err(GitFlowError::branch(format!("Cannot find branch '{}'", upstream)));
        }

        let result = state
            .rebase_results
            .pop_front()
            .unwrap_or(InteractiveRebaseResult::SUCCESS);

        if result.is_success() {
            let merged = state.reachable(upstream);
            state.record_commit(format!("Rebased onto {}", upstream), merged);
        } else {
            state.pending = Some(result.clone());
            state.pending_source = Some(upstream.to_string());
        }
        Ok(result)
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        let state = self.state();
        for branch in [ancestor, descendant] {
            if !state.branches.contains_key(branch) {
                return Err(GitFlowError::branch(format!("Cannot find branch '{}'", branch)));
            }
        }

        let reachable = state.reachable(descendant);
        Ok(state
            .branches
            .get(ancestor)
            .and_then(|commits| commits.last())
            .map_or(true, |tip| reachable.contains(&tip.id)))
    }

    fn pending_operation(&self) -> Result<InteractiveRebaseResult> {
        Ok(self
            .state()
            .pending
            .clone()
            .unwrap_or(InteractiveRebaseResult::SUCCESS))
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.state().tags.iter().any(|(tag, _)| tag == name))
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let mut state = self.state();
        if state.tags.iter().any(|(tag, _)| tag == name) {
            return Err(GitFlowError::branch(format!("Cannot create tag '{}': already exists", name)));
        }
        let current = state.current.clone();
        state.tags.push((name.to_string(), current));
        Ok(())
    }

    /// Every tag counts as reachable; newest means most recently created
    fn reachable_tags(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .state()
            .tags
            .iter()
            .rev()
            .filter(|(tag, _)| tag.starts_with(prefix))
            .map(|(tag, _)| tag.clone())
            .collect())
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.state().pushed.push(format!("{}/{}", remote, branch));
        Ok(())
    }

    fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        self.state().pushed.push(format!("{}/tags/{}", remote, tag));
        Ok(())
    }

    fn config_value(&self, key: &str) -> Result<Option<String>> {
        Ok(self.state().config.get(key).cloned())
    }

    fn set_config_value(&self, key: &str, value: &str) -> Result<()> {
        self.state().config.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_config_value(&self, key: &str) -> Result<()> {
        self.state().config.remove(key);
        Ok(())
    }
}
