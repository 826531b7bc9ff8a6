use tracing::debug;

use super::VersionSource;
use crate::domain::VersionlessMode;
use crate::error::{GitFlowError, Result};
use crate::git::Repository;

/// Version stored per branch in the repository configuration, outside the working tree
pub struct ConfigVersionSource;

impl ConfigVersionSource {
    pub fn key(branch: &str) -> String {
        format!("branch.{}.gitflow-version", branch)
    }
}

impl VersionSource for ConfigVersionSource {
    fn mode(&self) -> VersionlessMode {
        VersionlessMode::Config
    }

    fn read_version(&self, repo: &dyn Repository, branch: &str) -> Result<String> {
        repo.config_value(&Self::key(branch))?.ok_or_else(|| {
            GitFlowError::version(format!(
                "No version configured for branch '{}' (git config {})",
                branch,
                Self::key(branch)
            ))
        })
    }

    fn write_version(&self, repo: &dyn Repository, branch: &str, version: &str) -> Result<()> {
        repo.set_config_value(&Self::key(branch), version)?;
        debug!(branch, version, "stored branch version");
        Ok(())
    }

    fn inherit(&self, repo: &dyn Repository, from: &str, to: &str) -> Result<()> {
        if let Some(version) = repo.config_value(&Self::key(from))? {
            self.write_version(repo, to, &version)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    #[test]
    fn test_versions_are_per_branch() {
        let repo = MockRepository::new("develop");
        let source = ConfigVersionSource;

        assert!(source.read_version(&repo, "develop").is_err());
        source.write_version(&repo, "develop", "1.0.0-SNAPSHOT").unwrap();
        assert_eq!(source.read_version(&repo, "develop").unwrap(), "1.0.0-SNAPSHOT");
        assert!(source.read_version(&repo, "master").is_err());
    }

    #[test]
    fn test_inherit_copies_version() {
        let repo = MockRepository::new("develop");
        let source = ConfigVersionSource;
        source.write_version(&repo, "develop", "1.0.0-SNAPSHOT").unwrap();

        source.inherit(&repo, "develop", "feature/x").unwrap();
        assert_eq!(source.read_version(&repo, "feature/x").unwrap(), "1.0.0-SNAPSHOT");
        assert_eq!(
            repo.config_value("branch.feature/x.gitflow-version").unwrap(),
            Some("1.0.0-SNAPSHOT".to_string())
        );
    }
}
