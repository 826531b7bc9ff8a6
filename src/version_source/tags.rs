use tracing::debug;

use super::VersionSource;
use crate::domain::{version, VersionlessMode};
use crate::error::{GitFlowError, Result};
use crate::git::Repository;

/// Version derived from the newest reachable `<prefix><version>` tag
pub struct TagVersionSource {
    prefix: String,
}

impl TagVersionSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        TagVersionSource {
            prefix: prefix.into(),
        }
    }

    pub fn tag_name(&self, version: &str) -> String {
        format!("{}{}", self.prefix, version)
    }
}

impl VersionSource for TagVersionSource {
    fn mode(&self) -> VersionlessMode {
        VersionlessMode::Tags
    }

    /// Build tags (`v1.2.0-42` next to `v1.2.0`) are not project versions and are passed over
    fn read_version(&self, repo: &dyn Repository, _branch: &str) -> Result<String> {
        let tags = repo.reachable_tags(&self.prefix)?;
        let versions: Vec<&str> = tags.iter().map(|tag| &tag[self.prefix.len()..]).collect();

        versions
            .iter()
            .find(|candidate| !versions.iter().any(|base| version::is_build_of(candidate, base)))
            .map(|found| found.to_string())
            .ok_or_else(|| {
                GitFlowError::version(format!(
                    "No tag starting with '{}' is reachable from HEAD",
                    self.prefix
                ))
            })
    }

    fn write_version(&self, repo: &dyn Repository, _branch: &str, version: &str) -> Result<()> {
        let tag = self.tag_name(version);
        if !repo.tag_exists(&tag)? {
            repo.create_tag(&tag)?;
            debug!(tag = %tag, "created version tag");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    #[test]
    fn test_read_latest_tag() {
        let repo = MockRepository::new("develop");
        repo.create_tag("v1.0.0").unwrap();
        repo.create_tag("release-2").unwrap();

        let source = TagVersionSource::new("v");
        assert_eq!(source.read_version(&repo, "develop").unwrap(), "1.0.0");
    }

    #[test]
    fn test_write_is_idempotent() {
        let repo = MockRepository::new("develop");
        let source = TagVersionSource::new("v");

        assert!(source.read_version(&repo, "develop").is_err());
        source.write_version(&repo, "develop", "1.1.0").unwrap();
        source.write_version(&repo, "develop", "1.1.0").unwrap();
        assert_eq!(repo.tag_names(), vec!["v1.1.0".to_string()]);
        assert_eq!(source.read_version(&repo, "develop").unwrap(), "1.1.0");
    }

    #[test]
    fn test_build_tags_are_passed_over() {
        let repo = MockRepository::new("develop");
        repo.create_tag("v1.2.0").unwrap();
        repo.create_tag("v1.2.0-42").unwrap();

        let source = TagVersionSource::new("v");
        assert_eq!(source.read_version(&repo, "develop").unwrap(), "1.2.0");

        repo.create_tag("v1.3.0").unwrap();
        assert_eq!(source.read_version(&repo, "develop").unwrap(), "1.3.0");
    }
}
