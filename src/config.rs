use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::domain::VersionlessMode;
use crate::error::{GitFlowError, Result};

/// Represents the complete configuration for gitflow.
///
/// Contains branch names, version storage, build command, workflow switches and hooks.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub branches: BranchesConfig,

    #[serde(default)]
    pub version: VersionConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub flow: FlowConfig,

    #[serde(default)]
    pub hooks: HooksConfig,

    /// Set by a `-D flow.versionless=` override; wins over the repository setting
    #[serde(skip)]
    pub versionless_override: Option<VersionlessMode>,
}

fn default_development() -> String {
    "develop".to_string()
}

fn default_production() -> String {
    "master".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Names of the long-lived branches and the remote.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchesConfig {
    #[serde(default = "default_development")]
    pub development: String,

    #[serde(default = "default_production")]
    pub production: String,

    #[serde(default = "default_remote")]
    pub remote: String,
}

impl Default for BranchesConfig {
    fn default() -> Self {
        BranchesConfig {
            development: default_development(),
            production: default_production(),
            remote: default_remote(),
        }
    }
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

fn default_pom() -> String {
    "pom.xml".to_string()
}

fn default_version_file() -> String {
    ".mvn/maven.config".to_string()
}

/// Where versions are stored and how release tags are named.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VersionConfig {
    #[serde(default)]
    pub versionless: VersionlessMode,

    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    /// Relative to the working tree root
    #[serde(default = "default_pom")]
    pub pom: String,

    /// Relative to the working tree root
    #[serde(default = "default_version_file")]
    pub version_file: String,
}

impl Default for VersionConfig {
    fn default() -> Self {
        VersionConfig {
            versionless: VersionlessMode::default(),
            tag_prefix: default_tag_prefix(),
            pom: default_pom(),
            version_file: default_version_file(),
        }
    }
}

fn default_build_command() -> String {
    "mvn".to_string()
}

fn default_install_args() -> Vec<String> {
    vec!["clean".to_string(), "install".to_string()]
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BuildConfig {
    #[serde(default = "default_build_command")]
    pub command: String,

    #[serde(default = "default_install_args")]
    pub install_args: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            command: default_build_command(),
            install_args: default_install_args(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Switches controlling optional workflow steps.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FlowConfig {
    /// Run the build's install step after merges and rebases
    #[serde(default = "default_true")]
    pub install_project: bool,

    #[serde(default)]
    pub push: bool,

    /// Keep finished branches instead of deleting them
    #[serde(default)]
    pub keep_branch: bool,

    /// Give feature and epic branches their own version qualifier
    #[serde(default = "default_true")]
    pub feature_versions: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        FlowConfig {
            install_project: true,
            push: false,
            keep_branch: false,
            feature_versions: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct HooksConfig {
    #[serde(default)]
    pub post_version_change: Option<String>,

    #[serde(default)]
    pub post_finish: Option<String>,
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(GitFlowError::config(format!(
            "Property '{}' expects true or false, got '{}'",
            key, other
        ))),
    }
}

impl Config {
    /// Apply one `-D key=value` property override
    pub fn apply_property(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "flow.installProject" => self.flow.install_project = parse_bool(key, value)?,
            "flow.push" => self.flow.push = parse_bool(key, value)?,
            "flow.keepBranch" => self.flow.keep_branch = parse_bool(key, value)?,
            "flow.featureVersions" => self.flow.feature_versions = parse_bool(key, value)?,
            "flow.versionless" => self.versionless_override = Some(value.parse()?),
            "flow.tagPrefix" => self.version.tag_prefix = value.to_string(),
            "flow.developmentBranch" => self.branches.development = value.to_string(),
            "flow.productionBranch" => self.branches.production = value.to_string(),
            _ => {
                return Err(GitFlowError::config(format!(
                    "Unknown property '{}'",
                    key
                )))
            }
        }
        Ok(())
    }

    /// Apply `key=value` definitions as given on the command line
    pub fn apply_definitions<S: AsRef<str>>(&mut self, definitions: &[S]) -> Result<()> {
        for definition in definitions {
            let definition = definition.as_ref();
            let (key, value) = definition.split_once('=').ok_or_else(|| {
                GitFlowError::config(format!(
                    "Property definition '{}' must have the form key=value",
                    definition
                ))
            })?;
            self.apply_property(key.trim(), value)?;
        }
        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitflow.toml` in current directory
/// 3. `.gitflow.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)
            .map_err(|e| GitFlowError::config(format!("Cannot read '{}': {}", path, e)))?
    } else if Path::new("./gitflow.toml").exists() {
        fs::read_to_string("./gitflow.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".gitflow.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    toml::from_str(&config_str).map_err(|e| GitFlowError::config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.branches.development, "develop");
        assert_eq!(config.branches.production, "master");
        assert_eq!(config.version.versionless, VersionlessMode::None);
        assert!(config.flow.install_project);
        assert!(!config.flow.push);
        assert_eq!(config.build.install_args, vec!["clean", "install"]);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_apply_property() {
        let mut config = Config::default();
        config.apply_property("flow.installProject", "false").unwrap();
        config.apply_property("flow.versionless", "tags").unwrap();
        config.apply_property("flow.developmentBranch", "dev").unwrap();

        assert!(!config.flow.install_project);
        assert_eq!(config.versionless_override, Some(VersionlessMode::Tags));
        assert_eq!(config.branches.development, "dev");
    }

    #[test]
    fn test_apply_property_errors() {
        let mut config = Config::default();
        assert!(config.apply_property("flow.push", "yes").is_err());
        assert!(config.apply_property("flow.unknown", "true").is_err());
        assert!(config.apply_property("flow.versionless", "svn").is_err());
    }

    #[test]
    fn test_apply_definitions() {
        let mut config = Config::default();
        config
            .apply_definitions(&["flow.push=true", "flow.tagPrefix=release-"])
            .unwrap();
        assert!(config.flow.push);
        assert_eq!(config.version.tag_prefix, "release-");

        assert!(config.apply_definitions(&["flow.push"]).is_err());
    }
}
