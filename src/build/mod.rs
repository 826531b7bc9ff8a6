//! Project build integration.
//!
//! The workflow installs the project after merges and rebases to catch
//! broken integrations before anything is pushed.

pub mod maven;
pub mod mock;

pub use maven::MavenBuild;
pub use mock::MockBuild;

use std::path::Path;

use crate::error::Result;

pub trait BuildTool {
    /// Build and install the project found in `workdir`
    ///
    /// # Returns
    /// * `Ok(())` - Build succeeded
    /// * `Err(GitFlowError::Build(reason))` - Build failed or its command could not be started,
    ///   with a short cause if one was found. The workflow stops at a breakpoint.
    /// * `Err` - Any other error
    fn install(&self, workdir: &Path) -> Result<()>;
}
