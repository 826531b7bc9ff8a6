use crate::error::{GitFlowError, Result};
use crate::hooks::HookContext;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Executes gitflow hook scripts
pub struct HookExecutor;

impl HookExecutor {
    /// Execute a hook script with the given context
    ///
    /// The script runs in `workdir` with the context exported as environment
    /// variables. A relative script path is resolved against `workdir`.
    ///
    /// # Returns
    /// * `Ok(())` if hook succeeds (exit code 0)
    /// * `Err` if script not found, not executable, or returns non-zero exit code
    pub fn execute(script_path: &str, workdir: &Path, context: &HookContext) -> Result<()> {
        let path = workdir.join(script_path);

        if !path.exists() {
            return Err(GitFlowError::hook(format!(
                "Hook script not found: {}",
                script_path
            )));
        }

        if !path.is_file() {
            return Err(GitFlowError::hook(format!(
                "Hook path is not a file: {}",
                script_path
            )));
        }

        debug!(hook = context.hook_type.name(), script = %path.display(), "running hook");

        let output = Command::new(&path)
            .current_dir(workdir)
            .envs(context.to_env_vars())
            .output()
            .map_err(|e| {
                GitFlowError::hook(format!("Failed to execute hook {}: {}", script_path, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(GitFlowError::hook(format!(
                "Hook {} failed with exit code {}\nStdout: {}\nStderr: {}",
                script_path,
                output.status.code().unwrap_or(-1),
                stdout,
                stderr
            )));
        }

        Ok(())
    }

    /// Try to execute a hook, logging errors but not failing
    ///
    /// Used after the goal's git work is done, where a hook failure must not
    /// undo or fail the goal. Returns whether the hook succeeded.
    pub fn execute_permissive(script_path: &str, workdir: &Path, context: &HookContext) -> bool {
        match Self::execute(script_path, workdir, context) {
            Ok(()) => true,
            Err(e) => {
                warn!(hook = context.hook_type.name(), "{}", e);
                false
            }
        }
    }
}
