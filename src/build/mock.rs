use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use super::BuildTool;
use crate::error::{GitFlowError, Result};

/// Build tool double: succeeds unless failures were queued
#[derive(Default)]
pub struct MockBuild {
    failures: Mutex<VecDeque<Option<String>>>,
    installs: Mutex<usize>,
}

impl MockBuild {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next install fail with the given reason
    pub fn fail_next(&self, reason: Option<&str>) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reason.map(str::to_string));
    }

    pub fn install_count(&self) -> usize {
        *self.installs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl BuildTool for MockBuild {
    fn install(&self, _workdir: &Path) -> Result<()> {
        *self.installs.lock().unwrap_or_else(|e| e.into_inner()) += 1;

        match self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            Some(reason) => Err(GitFlowError::Build(reason)),
            None => Ok(()),
        }
    }
}
