//! Validators for user-supplied values.
//!
//! Every validator answers with a [`ValidationResult`] and never fails: a
//! missing value is simply an invalid one, with a message saying what was
//! expected.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::VersionlessMode;

/// Outcome of validating a single value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    valid: bool,
    invalid_message: Option<String>,
}

impl ValidationResult {
    /// Shared "valid, no message" result
    pub const VALID: ValidationResult = ValidationResult {
        valid: true,
        invalid_message: None,
    };

    /// Invalid with an explanation for the user
    pub fn invalid(message: impl Into<String>) -> Self {
        ValidationResult {
            valid: false,
            invalid_message: Some(message.into()),
        }
    }

    pub fn valid() -> Self {
        Self::VALID
    }

    /// Valid or invalid without a message
    pub fn from_bool(valid: bool) -> Self {
        ValidationResult {
            valid,
            invalid_message: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn invalid_message(&self) -> Option<&str> {
        self.invalid_message.as_deref()
    }
}

/// A check over one string value. `None` stands for an absent value.
pub trait StringValidator {
    fn validate(&self, value: Option<&str>) -> ValidationResult;
}

fn required<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str, ValidationResult> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ValidationResult::invalid(format!("{} is required.", what))),
    }
}

/// Short branch names as passed to the start goals
#[derive(Debug, Default, Clone, Copy)]
pub struct BranchNameValidator;

impl StringValidator for BranchNameValidator {
    fn validate(&self, value: Option<&str>) -> ValidationResult {
        let name = match required(value, "Branch name") {
            Ok(name) => name,
            Err(result) => return result,
        };

        if name.trim() != name {
            return ValidationResult::invalid(format!(
                "Branch name '{}' must not start or end with whitespace.",
                name
            ));
        }

        if !git2::Reference::is_valid_name(&format!("refs/heads/{}", name)) {
            return ValidationResult::invalid(format!(
                "'{}' is not a valid git branch name.",
                name
            ));
        }

        ValidationResult::VALID
    }
}

/// Project versions (`<major>.<minor>.<patch>[-qualifier]`)
#[derive(Debug, Default, Clone, Copy)]
pub struct VersionValidator;

impl StringValidator for VersionValidator {
    fn validate(&self, value: Option<&str>) -> ValidationResult {
        let version = match required(value, "Version") {
            Ok(version) => version,
            Err(result) => return result,
        };

        match semver::Version::parse(version) {
            Ok(_) => ValidationResult::VALID,
            Err(_) => ValidationResult::invalid(format!(
                "'{}' is not a valid version. Expected <major>.<minor>.<patch>[-<qualifier>], e.g. 1.2.0 or 1.2.0-SNAPSHOT.",
                version
            )),
        }
    }
}

static BUILD_IDENTIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("Invalid build identifier regex")
});

/// Build identifiers appended to CI build versions
#[derive(Debug, Default, Clone, Copy)]
pub struct BuildIdentifierValidator;

impl StringValidator for BuildIdentifierValidator {
    fn validate(&self, value: Option<&str>) -> ValidationResult {
        let build_id = match required(value, "Build identifier") {
            Ok(build_id) => build_id,
            Err(result) => return result,
        };

        if BUILD_IDENTIFIER_REGEX.is_match(build_id) {
            ValidationResult::VALID
        } else {
            ValidationResult::invalid(format!(
                "Build identifier '{}' may only contain letters, digits, '.', '_' and '-' and must start with a letter or digit.",
                build_id
            ))
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct VersionlessModeValidator;

impl StringValidator for VersionlessModeValidator {
    fn validate(&self, value: Option<&str>) -> ValidationResult {
        let mode = match required(value, "Versionless mode") {
            Ok(mode) => mode,
            Err(result) => return result,
        };

        match mode.parse::<VersionlessMode>() {
            Ok(_) => ValidationResult::VALID,
            Err(_) => ValidationResult::invalid(format!(
                "Unknown versionless mode '{}'. Use one of: none, file, config, tags.",
                mode
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_constant() {
        assert!(ValidationResult::VALID.is_valid());
        assert_eq!(ValidationResult::VALID.invalid_message(), None);
        assert_eq!(ValidationResult::valid(), ValidationResult::VALID);
    }

    #[test]
    fn test_invalid_with_message() {
        let result = ValidationResult::invalid("bad value");
        assert!(!result.is_valid());
        assert_eq!(result.invalid_message(), Some("bad value"));
    }

    #[test]
    fn test_from_bool() {
        assert_eq!(ValidationResult::from_bool(true), ValidationResult::VALID);
        let invalid = ValidationResult::from_bool(false);
        assert!(!invalid.is_valid());
        assert_eq!(invalid.invalid_message(), None);
    }

    #[test]
    fn test_branch_name_validator() {
        let validator = BranchNameValidator;
        assert!(validator.validate(Some("login")).is_valid());
        assert!(validator.validate(Some("JIRA-12/login")).is_valid());

        for bad in [None, Some(""), Some("  "), Some(" login"), Some("a..b"), Some("x~1"), Some("end.lock")] {
            let result = validator.validate(bad);
            assert!(!result.is_valid(), "{:?} should be invalid", bad);
            assert!(result.invalid_message().is_some());
        }
    }

    #[test]
    fn test_branch_name_required_message() {
        let result = BranchNameValidator.validate(None);
        assert_eq!(result.invalid_message(), Some("Branch name is required."));
    }

    #[test]
    fn test_version_validator() {
        let validator = VersionValidator;
        assert!(validator.validate(Some("1.2.0")).is_valid());
        assert!(validator.validate(Some("1.2.0-SNAPSHOT")).is_valid());
        assert!(!validator.validate(Some("1.2")).is_valid());
        assert!(!validator.validate(Some("latest")).is_valid());
        assert_eq!(
            validator.validate(None).invalid_message(),
            Some("Version is required.")
        );
    }

    #[test]
    fn test_build_identifier_validator() {
        let validator = BuildIdentifierValidator;
        assert!(validator.validate(Some("42")).is_valid());
        assert!(validator.validate(Some("ci.build_7-a")).is_valid());
        assert!(!validator.validate(Some("-42")).is_valid());
        assert!(!validator.validate(Some("4 2")).is_valid());
        assert!(!validator.validate(Some("")).is_valid());
    }

    #[test]
    fn test_versionless_mode_validator() {
        let validator = VersionlessModeValidator;
        assert!(validator.validate(Some("tags")).is_valid());
        assert!(validator.validate(Some("CONFIG")).is_valid());
        assert!(!validator.validate(Some("svn")).is_valid());
        assert!(!validator.validate(None).is_valid());
    }
}
