//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git operations the
//! workflow needs, allowing for a real libgit2-backed implementation and a
//! mock implementation for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations are:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory implementation for testing
//!
//! Multi-step operations (merge, rebase) never fail because of conflicts.
//! They report an [InteractiveRebaseResult] instead and leave the repository
//! in the intermediate state for the user to resolve.
//!
//! ```rust
//! # use gitflow::git::Repository;
//! # fn example(repo: &dyn Repository) -> gitflow::Result<()> {
//! let result = repo.rebase("develop")?;
//! if !result.is_success() {
//!     println!("rebase {}", result.status());
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use std::path::PathBuf;

use crate::error::Result;
use crate::rebase::InteractiveRebaseResult;

/// Common git operation trait for abstraction
///
/// All operations act on the single working tree of the repository and are
/// expected to be called from one thread, one goal at a time.
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying errors (like `git2::Error`) to [crate::error::GitFlowError]
/// variants. Conflicts are not errors, see [Repository::merge] and
/// [Repository::rebase].
pub trait Repository {
    /// Root of the working tree, `None` for bare repositories
    fn workdir(&self) -> Option<PathBuf>;

    /// Name of the checked out branch
    ///
    /// # Returns
    /// * `Ok(String)` - Short branch name, e.g. "feature/login"
    /// * `Err` - If HEAD is detached or unborn
    fn current_branch(&self) -> Result<String>;

    /// Whether a local branch with this name exists
    fn branch_exists(&self, name: &str) -> Result<bool>;

    /// Create a local branch at `start_point` without checking it out
    ///
    /// # Arguments
    /// * `name` - Name of the new branch
    /// * `start_point` - Branch, tag or commit the branch starts from
    ///
    /// # Returns
    /// * `Err` - If the branch already exists or the start point is unknown
    fn create_branch(&self, name: &str, start_point: &str) -> Result<()>;

    /// Check out a local branch
    ///
    /// Refuses to overwrite local modifications.
    fn checkout(&self, name: &str) -> Result<()>;

    /// Delete a local branch. The branch must not be checked out.
    fn delete_branch(&self, name: &str) -> Result<()>;

    /// Whether tracked files have staged or unstaged modifications
    fn has_uncommitted_changes(&self) -> Result<bool>;

    /// Stage every change in the working tree and commit it on the current branch
    fn commit_all(&self, message: &str) -> Result<()>;

    /// Merge `source` into the current branch, always creating a merge commit
    ///
    /// # Returns
    /// * `Ok(SUCCESS)` - Merge commit created (or nothing to merge)
    /// * `Ok(Conflict)` - Merge stopped; conflicts are left in the working tree
    /// * `Err` - If `source` doesn't exist or git fails
    fn merge(&self, source: &str, message: &str) -> Result<InteractiveRebaseResult>;

    /// Rebase the current branch onto `upstream`
    ///
    /// # Returns
    /// * `Ok(SUCCESS)` - All commits replayed
    /// * `Ok(Conflict)` - Rebase stopped on a commit; the rebase stays in progress
    /// * `Err` - If `upstream` doesn't exist or git fails
    fn rebase(&self, upstream: &str) -> Result<InteractiveRebaseResult>;

    /// Whether every commit of branch `ancestor` is contained in branch `descendant`
    ///
    /// A branch is its own ancestor.
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool>;

    /// State of a merge or rebase left open by an earlier operation
    ///
    /// Returns [InteractiveRebaseResult::SUCCESS] when nothing is in progress.
    fn pending_operation(&self) -> Result<InteractiveRebaseResult>;

    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// Create a lightweight tag at HEAD
    fn create_tag(&self, name: &str) -> Result<()>;

    /// Tags starting with `prefix` that are reachable from HEAD, newest first
    ///
    /// Tags on the same commit are ordered by their version after the prefix,
    /// highest first.
    fn reachable_tags(&self, prefix: &str) -> Result<Vec<String>>;

    /// Newest tag starting with `prefix` that is reachable from HEAD
    fn latest_tag(&self, prefix: &str) -> Result<Option<String>> {
        Ok(self.reachable_tags(prefix)?.into_iter().next())
    }

    /// Push a local branch to the remote branch of the same name
    fn push_branch(&self, remote: &str, branch: &str) -> Result<()>;

    fn push_tag(&self, remote: &str, tag: &str) -> Result<()>;

    /// Read a value from the repository configuration
    ///
    /// Returns `Ok(None)` if the key is not set.
    fn config_value(&self, key: &str) -> Result<Option<String>>;

    /// Write a value to the repository-local configuration
    fn set_config_value(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value from the repository-local configuration. Missing keys are ignored.
    fn remove_config_value(&self, key: &str) -> Result<()>;
}
