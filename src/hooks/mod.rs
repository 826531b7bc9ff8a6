//! User hooks
//!
//! Scripts configured in the `[hooks]` table run at these workflow points:
//! - post-version-change: After a version change that other tooling should see
//! - post-finish: After a feature or epic branch was merged back

pub mod executor;
pub mod lifecycle;

pub use executor::HookExecutor;
pub use lifecycle::{HookContext, HookType};
