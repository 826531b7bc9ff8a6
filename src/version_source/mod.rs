//! Where the project version is read from and written to.
//!
//! One [VersionSource] exists per [VersionlessMode]. The workflow only asks
//! the source to read or write and whether the change has to be committed.

pub mod config;
pub mod file;
pub mod pom;
pub mod tags;

pub use config::ConfigVersionSource;
pub use file::FileVersionSource;
pub use pom::PomVersionSource;
pub use tags::TagVersionSource;

use std::path::Path;

use crate::config::VersionConfig;
use crate::domain::VersionlessMode;
use crate::error::{GitFlowError, Result};
use crate::git::Repository;

pub trait VersionSource {
    fn mode(&self) -> VersionlessMode;

    /// Current version of `branch`, which must be checked out for working tree based sources
    fn read_version(&self, repo: &dyn Repository, branch: &str) -> Result<String>;

    fn write_version(&self, repo: &dyn Repository, branch: &str, version: &str) -> Result<()>;

    /// Give a newly created branch the version of the branch it was created from
    ///
    /// Sources stored in the working tree get this for free from git.
    fn inherit(&self, _repo: &dyn Repository, _from: &str, _to: &str) -> Result<()> {
        Ok(())
    }

    fn needs_version_change_commit(&self) -> bool {
        self.mode().needs_version_change_commit()
    }
}

/// Build the version source for `mode`
///
/// Working tree based modes need the repository's working directory.
pub fn version_source_for(
    mode: VersionlessMode,
    config: &VersionConfig,
    workdir: Option<&Path>,
) -> Result<Box<dyn VersionSource>> {
    let require_workdir = || {
        workdir.ok_or_else(|| {
            GitFlowError::config(format!(
                "Versionless mode '{}' needs a working tree, but the repository is bare",
                mode
            ))
        })
    };

    let source: Box<dyn VersionSource> = match mode {
        VersionlessMode::None => Box::new(PomVersionSource::new(require_workdir()?.join(&config.pom))),
        VersionlessMode::File => Box::new(FileVersionSource::new(
            require_workdir()?.join(&config.version_file),
        )),
        VersionlessMode::Config => Box::new(ConfigVersionSource),
        VersionlessMode::Tags => Box::new(TagVersionSource::new(config.tag_prefix.clone())),
    };

    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_per_mode() {
        let config = VersionConfig::default();
        let dir = tempfile::tempdir().unwrap();

        for mode in VersionlessMode::ALL {
            let source = version_source_for(mode, &config, Some(dir.path())).unwrap();
            assert_eq!(source.mode(), mode);
            assert_eq!(
                source.needs_version_change_commit(),
                mode.needs_version_change_commit()
            );
        }
    }

    #[test]
    fn test_working_tree_modes_need_workdir() {
        let config = VersionConfig::default();
        assert!(version_source_for(VersionlessMode::None, &config, None).is_err());
        assert!(version_source_for(VersionlessMode::File, &config, None).is_err());
        assert!(version_source_for(VersionlessMode::Config, &config, None).is_ok());
        assert!(version_source_for(VersionlessMode::Tags, &config, None).is_ok());
    }
}
