use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GitFlowError;

/// Where the authoritative project version lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionlessMode {
    /// Regular project metadata (`pom.xml`)
    #[default]
    None,
    /// Dedicated version file in the working tree
    File,
    /// Per-branch repository configuration
    Config,
    /// Most recent reachable version tag
    Tags,
}

impl VersionlessMode {
    pub const ALL: [VersionlessMode; 4] = [
        VersionlessMode::None,
        VersionlessMode::File,
        VersionlessMode::Config,
        VersionlessMode::Tags,
    ];

    /// Whether changing the version has to be committed to the repository
    pub fn needs_version_change_commit(&self) -> bool {
        match self {
            VersionlessMode::None | VersionlessMode::File => true,
            VersionlessMode::Config | VersionlessMode::Tags => false,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            VersionlessMode::None => "none",
            VersionlessMode::File => "file",
            VersionlessMode::Config => "config",
            VersionlessMode::Tags => "tags",
        }
    }
}

impl fmt::Display for VersionlessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for VersionlessMode {
    type Err = GitFlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionlessMode::ALL
            .into_iter()
            .find(|mode| mode.tag().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                GitFlowError::config(format!(
                    "Unknown versionless mode '{}', expected one of none, file, config, tags",
                    s
                ))
            })
    }
}
