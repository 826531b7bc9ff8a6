use std::fs;
use std::path::PathBuf;

use tracing::debug;

use super::VersionSource;
use crate::domain::VersionlessMode;
use crate::error::{GitFlowError, Result};
use crate::git::Repository;

const REVISION_PROPERTY: &str = "-Drevision=";

/// `-Drevision=<version>` line of `.mvn/maven.config`
pub struct FileVersionSource {
    path: PathBuf,
}

impl FileVersionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileVersionSource { path: path.into() }
    }
}

impl VersionSource for FileVersionSource {
    fn mode(&self) -> VersionlessMode {
        VersionlessMode::File
    }

    fn read_version(&self, _repo: &dyn Repository, _branch: &str) -> Result<String> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            GitFlowError::version(format!("Cannot read '{}': {}", self.path.display(), e))
        })?;

        content
            .split_whitespace()
            .find_map(|arg| arg.strip_prefix(REVISION_PROPERTY))
            .filter(|version| !version.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                GitFlowError::version(format!(
                    "No '{}' entry in '{}'",
                    REVISION_PROPERTY,
                    self.path.display()
                ))
            })
    }

    fn write_version(&self, _repo: &dyn Repository, _branch: &str, version: &str) -> Result<()> {
        let existing = if self.path.exists() {
            fs::read_to_string(&self.path)?
        } else {
            String::new()
        };

        let entry = format!("{}{}", REVISION_PROPERTY, version);
        let mut replaced = false;
        let mut lines: Vec<String> = existing
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let args: Vec<String> = line
                    .split_whitespace()
                    .map(|arg| {
                        if arg.starts_with(REVISION_PROPERTY) {
                            replaced = true;
                            entry.clone()
                        } else {
                            arg.to_string()
                        }
                    })
                    .collect();
                args.join(" ")
            })
            .collect();

        if !replaced {
            lines.push(entry);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, format!("{}\n", lines.join("\n")))?;

        debug!(path = %self.path.display(), version, "wrote version file");
        Ok(())
    }
}
