//! Maven-style version arithmetic used on branch transitions.

use std::cmp::Ordering;

use semver::{BuildMetadata, Prerelease, Version};

use crate::error::{GitFlowError, Result};

pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Parse a version string (e.g. "1.2.0-SNAPSHOT")
pub fn parse(version: &str) -> Result<Version> {
    Version::parse(version.trim()).map_err(|e| {
        GitFlowError::version(format!("Invalid version '{}': {}", version, e))
    })
}

pub fn is_snapshot(version: &str) -> bool {
    version.ends_with(SNAPSHOT_SUFFIX)
}

/// "1.2.0-SNAPSHOT" -> "1.2.0"
pub fn strip_snapshot(version: &str) -> &str {
    version.strip_suffix(SNAPSHOT_SUFFIX).unwrap_or(version)
}

/// "1.2.0" -> "1.2.0-SNAPSHOT"
pub fn to_snapshot(version: &str) -> String {
    format!("{}{}", strip_snapshot(version), SNAPSHOT_SUFFIX)
}

/// Turn a branch short name into a version qualifier
pub fn sanitize_qualifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '-' })
        .collect()
}

/// Version used on a feature or epic branch: "1.2.0-SNAPSHOT" + "login" -> "1.2.0-login-SNAPSHOT"
pub fn feature_version(base: &str, name: &str) -> String {
    format!(
        "{}-{}{}",
        strip_snapshot(base),
        sanitize_qualifier(name),
        SNAPSHOT_SUFFIX
    )
}

/// Inverse of [`feature_version`]. Versions without the qualifier are returned unchanged.
pub fn remove_feature_qualifier(version: &str, name: &str) -> String {
    let qualifier = format!("-{}{}", sanitize_qualifier(name), SNAPSHOT_SUFFIX);
    match version.strip_suffix(&qualifier) {
        Some(base) => format!("{}{}", base, SNAPSHOT_SUFFIX),
        None => version.to_string(),
    }
}

fn release_core(version: &str) -> Result<Version> {
    let mut parsed = parse(strip_snapshot(version))?;
    parsed.pre = Prerelease::EMPTY;
    parsed.build = BuildMetadata::EMPTY;
    Ok(parsed)
}

/// Development version after a release: "1.2.0" -> "1.3.0-SNAPSHOT"
pub fn next_development_version(release: &str) -> Result<String> {
    let mut next = release_core(release)?;
    next.minor += 1;
    next.patch = 0;
    Ok(to_snapshot(&next.to_string()))
}

/// Next patch release: "1.2.0" -> "1.2.1"
pub fn next_patch_version(version: &str) -> Result<String> {
    let mut next = release_core(version)?;
    next.patch += 1;
    Ok(next.to_string())
}

/// Development version of a maintenance line after a release: "1.2.0" -> "1.2.1-SNAPSHOT"
pub fn next_maintenance_version(release: &str) -> Result<String> {
    Ok(to_snapshot(&next_patch_version(release)?))
}

/// Default release version for a development line.
///
/// A snapshot is released as is ("1.2.0-SNAPSHOT" -> "1.2.0"); an already
/// released version moves to the next minor ("1.2.0" -> "1.3.0").
pub fn release_version_for(current: &str) -> Result<String> {
    if is_snapshot(current) {
        return Ok(release_core(current)?.to_string());
    }
    let mut next = release_core(current)?;
    next.minor += 1;
    next.patch = 0;
    Ok(next.to_string())
}

/// Default hotfix version: the pending snapshot of a maintenance line, else the next patch
pub fn hotfix_version_for(current: &str) -> Result<String> {
    if is_snapshot(current) {
        Ok(release_core(current)?.to_string())
    } else {
        next_patch_version(current)
    }
}

/// Version stamped on CI builds: "1.2.0-SNAPSHOT" + "42" -> "1.2.0-42"
pub fn build_version(version: &str, build_id: &str) -> String {
    format!("{}-{}", strip_snapshot(version), build_id)
}

/// Whether `version` is a build version stamped onto `base`: "1.2.0-42" is a build of "1.2.0"
pub fn is_build_of(version: &str, base: &str) -> bool {
    version
        .strip_prefix(strip_snapshot(base))
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|build_id| !build_id.is_empty())
}

/// Semantic version order, falling back to text order for unparseable versions
pub fn compare(a: &str, b: &str) -> Ordering {
    match (Version::parse(a), Version::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_helpers() {
        assert!(is_snapshot("1.2.0-SNAPSHOT"));
        assert!(!is_snapshot("1.2.0"));
        assert_eq!(strip_snapshot("1.2.0-SNAPSHOT"), "1.2.0");
        assert_eq!(strip_snapshot("1.2.0"), "1.2.0");
        assert_eq!(to_snapshot("1.2.0"), "1.2.0-SNAPSHOT");
        assert_eq!(to_snapshot("1.2.0-SNAPSHOT"), "1.2.0-SNAPSHOT");
    }

    #[test]
    fn test_feature_version_round_trip() {
        let version = feature_version("1.2.0-SNAPSHOT", "login/oauth");
        assert_eq!(version, "1.2.0-login-oauth-SNAPSHOT");
        assert_eq!(remove_feature_qualifier(&version, "login/oauth"), "1.2.0-SNAPSHOT");
        assert_eq!(remove_feature_qualifier("1.2.0-SNAPSHOT", "login"), "1.2.0-SNAPSHOT");
    }

    #[test]
    fn test_next_versions() {
        assert_eq!(next_development_version("1.2.0").unwrap(), "1.3.0-SNAPSHOT");
        assert_eq!(next_development_version("1.2.3-RC1").unwrap(), "1.3.0-SNAPSHOT");
        assert_eq!(next_patch_version("1.2.0-SNAPSHOT").unwrap(), "1.2.1");
        assert_eq!(next_maintenance_version("1.2.0").unwrap(), "1.2.1-SNAPSHOT");
    }

    #[test]
    fn test_next_version_invalid() {
        assert!(next_development_version("1.2").is_err());
        assert!(next_patch_version("abc").is_err());
    }

    #[test]
    fn test_default_release_and_hotfix_versions() {
        assert_eq!(release_version_for("1.2.0-SNAPSHOT").unwrap(), "1.2.0");
        assert_eq!(release_version_for("1.2.0").unwrap(), "1.3.0");
        assert_eq!(hotfix_version_for("1.2.0").unwrap(), "1.2.1");
        assert_eq!(hotfix_version_for("1.2.1-SNAPSHOT").unwrap(), "1.2.1");
    }

    #[test]
    fn test_build_version() {
        assert_eq!(build_version("1.2.0-SNAPSHOT", "42"), "1.2.0-42");
        assert_eq!(build_version("1.2.0", "ci.7"), "1.2.0-ci.7");
    }

    #[test]
    fn test_build_versions_are_recognized() {
        assert!(is_build_of("1.2.0-42", "1.2.0"));
        assert!(is_build_of("1.2.0-42", "1.2.0-SNAPSHOT"));
        assert!(!is_build_of("1.2.0", "1.2.0"));
        assert!(!is_build_of("1.2.0-", "1.2.0"));
        assert!(!is_build_of("1.2.10", "1.2.1"));
        assert!(!is_build_of("1.3.0", "1.2.0"));
    }

    #[test]
    fn test_compare_is_semantic() {
        assert_eq!(compare("1.10.0", "1.9.0"), Ordering::Greater);
        assert_eq!(compare("1.2.0", "1.2.0-42"), Ordering::Greater);
        assert_eq!(compare("1.2.0", "1.2.0"), Ordering::Equal);
        assert_eq!(compare("b", "a"), Ordering::Greater);
    }
}
