pub mod build;
pub mod config;
pub mod domain;
pub mod error;
pub mod failure;
pub mod git;
pub mod hooks;
pub mod logging;
pub mod rebase;
pub mod ui;
pub mod validation;
pub mod version_source;
pub mod workflow;

pub use error::{GitFlowError, Result};
