use std::fs;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::VersionSource;
use crate::domain::VersionlessMode;
use crate::error::{GitFlowError, Result};
use crate::git::Repository;

/// Project version element of a Maven `pom.xml`
pub struct PomVersionSource {
    path: PathBuf,
}

impl PomVersionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PomVersionSource { path: path.into() }
    }

    fn read_pom(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| {
            GitFlowError::version(format!("Cannot read '{}': {}", self.path.display(), e))
        })
    }
}

static VERSION_ELEMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<version>\s*([^<\s]+)\s*</version>").expect("Invalid version element regex")
});

/// Byte range of the project version value
///
/// The parent's `<version>` is skipped; the first `<version>` after the
/// parent block (or the first one overall) belongs to the project.
fn project_version_range(pom: &str) -> Option<Range<usize>> {
    let start = pom.find("</parent>").map(|i| i + "</parent>".len()).unwrap_or(0);
    let captures = VERSION_ELEMENT_REGEX.captures(&pom[start..])?;
    let value = captures.get(1)?;
    Some(start + value.start()..start + value.end())
}

impl VersionSource for PomVersionSource {
    fn mode(&self) -> VersionlessMode {
        VersionlessMode::None
    }

    fn read_version(&self, _repo: &dyn Repository, _branch: &str) -> Result<String> {
        let pom = self.read_pom()?;
        let range = project_version_range(&pom).ok_or_else(|| {
            GitFlowError::version(format!("No project version found in '{}'", self.path.display()))
        })?;
        Ok(pom[range].to_string())
    }

    fn write_version(&self, _repo: &dyn Repository, _branch: &str, version: &str) -> Result<()> {
        let mut pom = self.read_pom()?;
        let range = project_version_range(&pom).ok_or_else(|| {
            GitFlowError::version(format!("No project version found in '{}'", self.path.display()))
        })?;

        pom.replace_range(range, version);
        fs::write(&self.path, pom)?;

        debug!(path = %self.path.display(), version, "wrote pom version");
        Ok(())
    }
}
