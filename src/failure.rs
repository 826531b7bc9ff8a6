//! Structured diagnostics for failed or interrupted workflow steps.
//!
//! A [`GitFlowFailureInfo`] always has three parts: what went wrong, what the
//! user should do about it, and the exact commands to run to get back on
//! track. The builder only formats; deciding when a step has failed is up to
//! the workflow.

use std::fmt;

use crate::rebase::InteractiveRebaseResult;

/// Name of the binary as users type it in resume instructions
pub const CLI_NAME: &str = "gitflow";

/// Property that disables the install step on retry
pub const SKIP_INSTALL_PROPERTY: &str = "-Dflow.installProject=false";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitFlowFailureInfo {
    problem: String,
    solution_proposal: String,
    steps_to_continue: Vec<String>,
}

impl GitFlowFailureInfo {
    pub fn new(
        problem: impl Into<String>,
        solution_proposal: impl Into<String>,
        steps_to_continue: Vec<String>,
    ) -> Self {
        GitFlowFailureInfo {
            problem: problem.into(),
            solution_proposal: solution_proposal.into(),
            steps_to_continue,
        }
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn solution_proposal(&self) -> &str {
        &self.solution_proposal
    }

    pub fn steps_to_continue(&self) -> &[String] {
        &self.steps_to_continue
    }
}

impl fmt::Display for GitFlowFailureInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Problem:")?;
        writeln!(f, "{}", self.problem)?;
        writeln!(f)?;
        writeln!(f, "Solution proposal:")?;
        write!(f, "{}", self.solution_proposal)?;
        if !self.steps_to_continue.is_empty() {
            writeln!(f)?;
            writeln!(f)?;
            write!(f, "Steps to continue:")?;
            for (i, step) in self.steps_to_continue.iter().enumerate() {
                write!(f, "\n  {}. {}", i + 1, step)?;
            }
        }
        Ok(())
    }
}

/// Builds diagnostics for one goal running on one branch
#[derive(Debug, Clone)]
pub struct FailureInfoBuilder {
    goal: String,
    branch: String,
}

impl FailureInfoBuilder {
    pub fn new(goal: impl Into<String>, branch: impl Into<String>) -> Self {
        FailureInfoBuilder {
            goal: goal.into(),
            branch: branch.into(),
        }
    }

    fn command(&self) -> String {
        format!("{} {}", CLI_NAME, self.goal)
    }

    fn continue_step(&self) -> String {
        format!(
            "'{}' to continue the {} process after problem solving",
            self.command(),
            self.goal
        )
    }

    /// The build failed after the workflow already changed the branch
    pub fn install_failed_after(&self, process: &str, reason: Option<&str>) -> GitFlowFailureInfo {
        let mut problem = format!(
            "Failed to install the project on branch '{}' after {}.",
            self.branch, process
        );
        if let Some(reason) = reason {
            problem.push_str("\nReason: ");
            problem.push_str(reason);
        }

        let command = self.command();
        let solution = format!(
            "Please solve the problems on the project, add and commit your changes and run '{command}' again in order to continue.\n\
             Do NOT push the branch '{branch}' before the problems are solved!\n\
             Alternatively you can use property '{skip}' while running '{command}' to skip the project installation.",
            command = command,
            branch = self.branch,
            skip = SKIP_INSTALL_PROPERTY,
        );

        GitFlowFailureInfo::new(
            problem,
            solution,
            vec![
                "'git add' and 'git commit' to commit your changes".to_string(),
                self.continue_step(),
                format!(
                    "or '{} {}' to continue the {} process without project installation",
                    command, SKIP_INSTALL_PROPERTY, self.goal
                ),
            ],
        )
    }

    pub fn rebase_conflict(&self, onto: &str, result: &InteractiveRebaseResult) -> GitFlowFailureInfo {
        let problem = with_git_message(
            format!(
                "Automatic rebase of branch '{}' onto '{}' {} during {}.",
                self.branch,
                onto,
                result.status(),
                self.goal
            ),
            result,
        );

        let solution = format!(
            "Fix the rebase conflicts and mark them as resolved by using 'git add'. \
             Continue the rebase with 'git rebase --continue' and run '{}' again afterwards.\n\
             Do NOT push the branch '{}' while the rebase is in progress!",
            self.command(),
            self.branch
        );

        GitFlowFailureInfo::new(
            problem,
            solution,
            vec![
                "'git add' to mark conflicts as resolved".to_string(),
                "'git rebase --continue' to continue the rebase".to_string(),
                self.continue_step(),
                "or 'git rebase --abort' to abort the rebase".to_string(),
            ],
        )
    }

    pub fn merge_conflict(&self, source: &str, result: &InteractiveRebaseResult) -> GitFlowFailureInfo {
        let problem = with_git_message(
            format!(
                "Automatic merge of branch '{}' into '{}' {} during {}.",
                source,
                self.branch,
                result.status(),
                self.goal
            ),
            result,
        );

        let solution = format!(
            "Fix the merge conflicts, add and commit the resolution and run '{}' again.",
            self.command()
        );

        GitFlowFailureInfo::new(
            problem,
            solution,
            vec![
                "'git add' and 'git commit' to mark conflicts as resolved and conclude the merge"
                    .to_string(),
                self.continue_step(),
                "or 'git merge --abort' to abort the merge".to_string(),
            ],
        )
    }

    /// The goal was started while an earlier merge or rebase is still open
    pub fn unresolved_operation(&self, result: &InteractiveRebaseResult) -> GitFlowFailureInfo {
        let problem = with_git_message(
            format!(
                "Goal '{}' cannot run on branch '{}' because a merge or rebase is still open ({}).",
                self.goal,
                self.branch,
                result.status()
            ),
            result,
        );

        GitFlowFailureInfo::new(
            problem,
            "Finish or abort the pending git operation before running the goal again.",
            vec![
                "'git status' to see the pending operation".to_string(),
                "'git add' and 'git commit' or 'git rebase --continue' to finish it".to_string(),
                format!("'{}' to run the goal again", self.command()),
            ],
        )
    }

    pub fn uncommitted_changes(&self) -> GitFlowFailureInfo {
        GitFlowFailureInfo::new(
            format!(
                "Goal '{}' requires a clean working tree but branch '{}' has uncommitted changes.",
                self.goal, self.branch
            ),
            format!(
                "Commit or stash your changes before running '{}'.",
                self.command()
            ),
            vec![
                "'git add' and 'git commit' to commit your changes".to_string(),
                "or 'git stash' to set them aside".to_string(),
                format!("'{}' to run the goal again", self.command()),
            ],
        )
    }

    pub fn wrong_branch(&self, expected: &str) -> GitFlowFailureInfo {
        GitFlowFailureInfo::new(
            format!(
                "Goal '{}' must be run on a {} branch but the current branch is '{}'.",
                self.goal, expected, self.branch
            ),
            format!(
                "Check out the {} branch you want to work on and run '{}' again.",
                expected,
                self.command()
            ),
            vec![
                format!("'git checkout <{} branch>' to switch branches", expected),
                format!("'{}' to run the goal again", self.command()),
            ],
        )
    }
}

fn with_git_message(mut problem: String, result: &InteractiveRebaseResult) -> String {
    if let Some(message) = result.git_message() {
        problem.push_str("\nGit: ");
        problem.push_str(message);
    }
    problem
}

/// Diagnostic for a failed project installation after `process` on `branch`
pub fn install_failed(goal: &str, branch: &str, process: &str, reason: Option<&str>) -> GitFlowFailureInfo {
    FailureInfoBuilder::new(goal, branch).install_failed_after(process, reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_has_three_sections_in_order() {
        let info = GitFlowFailureInfo::new(
            "It broke.",
            "Fix it.",
            vec!["first".to_string(), "second".to_string()],
        );
        let rendered = info.to_string();

        let problem = rendered.find("Problem:").unwrap();
        let solution = rendered.find("Solution proposal:").unwrap();
        let steps = rendered.find("Steps to continue:").unwrap();
        assert!(problem < solution && solution < steps);
        assert!(rendered.find("1. first").unwrap() < rendered.find("2. second").unwrap());
    }

    #[test]
    fn test_display_without_steps() {
        let info = GitFlowFailureInfo::new("It broke.", "Fix it.", Vec::new());
        assert!(!info.to_string().contains("Steps to continue"));
    }

    #[test]
    fn test_rebase_conflict_includes_git_message() {
        let builder = FailureInfoBuilder::new("feature-rebase", "feature/x");
        let info = builder.rebase_conflict(
            "develop",
            &InteractiveRebaseResult::conflict("could not apply 1a2b3c"),
        );
        assert!(info.problem().contains("'feature/x' onto 'develop'"));
        assert!(info.problem().ends_with("\nGit: could not apply 1a2b3c"));
        assert_eq!(info.steps_to_continue()[1], "'git rebase --continue' to continue the rebase");
    }

    #[test]
    fn test_merge_conflict_names_goal_and_branches() {
        let builder = FailureInfoBuilder::new("feature-finish", "develop");
        let info = builder.merge_conflict("feature/x", &InteractiveRebaseResult::conflict("pom.xml"));
        assert!(info.problem().contains("'feature/x' into 'develop'"));
        assert!(info.problem().contains("feature-finish"));
        assert!(info.steps_to_continue()[1].contains("'gitflow feature-finish'"));
    }

    #[test]
    fn test_uncommitted_changes() {
        let info = FailureInfoBuilder::new("release-start", "develop").uncommitted_changes();
        assert!(info.problem().contains("uncommitted changes"));
        assert_eq!(info.steps_to_continue().len(), 3);
    }

    #[test]
    fn test_wrong_branch() {
        let info = FailureInfoBuilder::new("feature-finish", "develop").wrong_branch("feature");
        assert_eq!(
            info.problem(),
            "Goal 'feature-finish' must be run on a feature branch but the current branch is 'develop'."
        );
    }
}
