use std::fmt;

/// Prefix of hotfix branches. Hotfixes are not a managed branch type.
pub const HOTFIX_PREFIX: &str = "hotfix/";

/// The managed gitflow branch types.
///
/// Every type carries a lowercase tag which is also the branch name prefix
/// (`feature/login` is a [`BranchType::Feature`] branch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchType {
    Feature,
    Epic,
    Maintenance,
    Release,
    /// Marker branch pointing at the development commit a feature was last rebased onto
    Integrated,
}

impl BranchType {
    /// All branch types in declaration order
    pub const ALL: [BranchType; 5] = [
        BranchType::Feature,
        BranchType::Epic,
        BranchType::Maintenance,
        BranchType::Release,
        BranchType::Integrated,
    ];

    /// Canonical lowercase tag
    pub fn tag(&self) -> &'static str {
        match self {
            BranchType::Feature => "feature",
            BranchType::Epic => "epic",
            BranchType::Maintenance => "maintenance",
            BranchType::Release => "release",
            BranchType::Integrated => "integrated",
        }
    }

    /// Look up a branch type by its tag, ignoring case.
    ///
    /// Returns `None` for a missing, empty or unknown tag.
    pub fn get_by_type(tag: Option<&str>) -> Option<BranchType> {
        let tag = tag?;
        BranchType::ALL
            .into_iter()
            .find(|branch_type| branch_type.tag().eq_ignore_ascii_case(tag))
    }

    /// Classify a branch name by its prefix.
    ///
    /// `None` means the branch is not a managed type, e.g. `develop` or `master`.
    pub fn classify(branch_name: &str) -> Option<BranchType> {
        let (prefix, rest) = branch_name.split_once('/')?;
        if rest.is_empty() {
            return None;
        }
        BranchType::get_by_type(Some(prefix))
    }

    /// Compose the full branch name, e.g. `feature` + `login` -> `feature/login`
    pub fn branch_name(&self, short_name: &str) -> String {
        format!("{}/{}", self.tag(), short_name)
    }

    /// Strip this type's prefix (case-insensitive) from a branch name
    pub fn short_name<'a>(&self, branch_name: &'a str) -> Option<&'a str> {
        let (prefix, rest) = branch_name.split_once('/')?;
        if prefix.eq_ignore_ascii_case(self.tag()) && !rest.is_empty() {
            Some(rest)
        } else {
            None
        }
    }
}

impl fmt::Display for BranchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Whether the branch follows the hotfix naming convention
pub fn is_hotfix_branch(branch_name: &str) -> bool {
    branch_name
        .get(..HOTFIX_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(HOTFIX_PREFIX))
        && branch_name.len() > HOTFIX_PREFIX.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for branch_type in BranchType::ALL {
            assert_eq!(
                BranchType::get_by_type(Some(branch_type.tag())),
                Some(branch_type)
            );
            assert_eq!(
                BranchType::get_by_type(Some(&branch_type.tag().to_uppercase())),
                Some(branch_type)
            );
        }
    }

    #[test]
    fn test_tags_are_unique_and_lowercase() {
        let mut tags: Vec<&str> = BranchType::ALL.iter().map(|t| t.tag()).collect();
        for tag in &tags {
            assert_eq!(*tag, tag.to_lowercase());
        }
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), BranchType::ALL.len());
    }

    #[test]
    fn test_get_by_type_not_found() {
        assert_eq!(BranchType::get_by_type(None), None);
        assert_eq!(BranchType::get_by_type(Some("")), None);
        assert_eq!(BranchType::get_by_type(Some("hotfix")), None);
        assert_eq!(BranchType::get_by_type(Some("features")), None);
    }

    #[test]
    fn test_classify() {
        assert_eq!(BranchType::classify("feature/login"), Some(BranchType::Feature));
        assert_eq!(BranchType::classify("Feature/login"), Some(BranchType::Feature));
        assert_eq!(BranchType::classify("RELEASE/1.2.0"), Some(BranchType::Release));
        assert_eq!(
            BranchType::classify("maintenance/1.x"),
            Some(BranchType::Maintenance)
        );
        assert_eq!(
            BranchType::classify("integrated/login"),
            Some(BranchType::Integrated)
        );
        assert_eq!(BranchType::classify("epic/big/part"), Some(BranchType::Epic));
    }

    #[test]
    fn test_classify_unmanaged() {
        assert_eq!(BranchType::classify("develop"), None);
        assert_eq!(BranchType::classify("master"), None);
        assert_eq!(BranchType::classify("feature"), None);
        assert_eq!(BranchType::classify("feature/"), None);
        assert_eq!(BranchType::classify("hotfix/1.0.1"), None);
        assert_eq!(BranchType::classify(""), None);
    }

    #[test]
    fn test_branch_name_and_short_name() {
        let name = BranchType::Feature.branch_name("login");
        assert_eq!(name, "feature/login");
        assert_eq!(BranchType::Feature.short_name(&name), Some("login"));
        assert_eq!(BranchType::Feature.short_name("FEATURE/login"), Some("login"));
        assert_eq!(BranchType::Epic.short_name("feature/login"), None);
    }

    #[test]
    fn test_hotfix_branch() {
        assert!(is_hotfix_branch("hotfix/1.0.1"));
        assert!(is_hotfix_branch("Hotfix/1.0.1"));
        assert!(!is_hotfix_branch("hotfix/"));
        assert!(!is_hotfix_branch("feature/x"));
    }
}
