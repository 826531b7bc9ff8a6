//! Pure formatting functions for UI output.
//!
//! Functions here build the styled strings; printing is left to the reporter.

use console::style;

use crate::failure::GitFlowFailureInfo;

pub fn format_error(message: &str) -> String {
    format!("{} {}", style("ERROR:").red().bold(), message)
}

pub fn format_success(message: &str) -> String {
    format!("{} {}", style("✓").green(), message)
}

pub fn format_status(message: &str) -> String {
    format!("{} {}", style("→").yellow(), message)
}

pub fn format_warning(message: &str) -> String {
    format!("{} {}", style("⚠ WARNING:").yellow(), message)
}

/// Render failure diagnostics with section headings and numbered steps.
///
/// Commands inside the steps keep their quotes so they can be copied as-is.
pub fn format_failure(info: &GitFlowFailureInfo) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", style("Problem:").red().bold()));
    out.push_str(info.problem());
    out.push_str(&format!("\n\n{}\n", style("Solution proposal:").bold()));
    out.push_str(info.solution_proposal());

    if !info.steps_to_continue().is_empty() {
        out.push_str(&format!("\n\n{}", style("Steps to continue:").bold()));
        for (i, step) in info.steps_to_continue().iter().enumerate() {
            out.push_str(&format!("\n  {}. {}", i + 1, style(step).cyan()));
        }
    }

    out
}
