use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use super::BuildTool;
use crate::config::BuildConfig;
use crate::error::{GitFlowError, Result};

const ERROR_MARKER: &str = "[ERROR]";

/// Runs the configured build command (`mvn clean install` by default)
#[derive(Debug, Clone)]
pub struct MavenBuild {
    command: String,
    install_args: Vec<String>,
}

impl MavenBuild {
    pub fn new(command: impl Into<String>, install_args: Vec<String>) -> Self {
        MavenBuild {
            command: command.into(),
            install_args,
        }
    }

    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(config.command.clone(), config.install_args.clone())
    }
}

/// First Maven error line of the build output, without the marker
pub fn first_error_line(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(ERROR_MARKER))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
}

impl BuildTool for MavenBuild {
    fn install(&self, workdir: &Path) -> Result<()> {
        info!(command = %self.command, args = ?self.install_args, "installing project");

        let output = Command::new(&self.command)
            .args(&self.install_args)
            .current_dir(workdir)
            .output()
            .map_err(|e| {
                GitFlowError::Build(Some(format!(
                    "failed to execute '{}': {}",
                    self.command, e
                )))
            })?;

        if output.status.success() {
            debug!("install succeeded");
            return Ok(());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = first_error_line(&stdout)
            .or_else(|| first_error_line(&stderr))
            .or_else(|| {
                output
                    .status
                    .code()
                    .map(|code| format!("'{}' exited with code {}", self.command, code))
            });

        Err(GitFlowError::Build(reason))
    }
}
