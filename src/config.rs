use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::domain::tag::TagPattern;
use crate::domain::version::{VersionSpec, DEFAULT_OVERRIDE_PROPERTY};
use crate::error::{GitStampError, Result};
use crate::git::GitBackend;

const LOCAL_CONFIG_FILE: &str = "gitstamp.toml";
const USER_CONFIG_FILE: &str = ".gitstamp.toml";

/// Represents the complete configuration for git-stamp.
///
/// Contains the version rules and how git is accessed.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub version: VersionConfig,

    #[serde(default)]
    pub git: GitConfig,
}

fn default_base_version() -> String {
    "0.1.0".to_string()
}

fn default_override_property() -> String {
    DEFAULT_OVERRIDE_PROPERTY.to_string()
}

fn default_executable() -> String {
    "git".to_string()
}

/// Inputs to version resolution that don't come from the repository.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VersionConfig {
    /// Prefix of snapshot versions
    #[serde(default = "default_base_version")]
    pub base_version: String,

    /// Environment variable that pins the version when set
    #[serde(default = "default_override_property")]
    pub override_property: String,

    /// Release tag naming, e.g. "release-{version}"; `v<digit>...` when unset
    #[serde(default)]
    pub tag_pattern: Option<String>,
}

impl Default for VersionConfig {
    fn default() -> Self {
        VersionConfig {
            base_version: default_base_version(),
            override_property: default_override_property(),
            tag_pattern: None,
        }
    }
}

/// How the repository is read.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default)]
    pub backend: GitBackend,

    /// git binary for the process backend
    #[serde(default = "default_executable")]
    pub executable: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            backend: GitBackend::default(),
            executable: default_executable(),
        }
    }
}

impl Config {
    /// Build the version spec, compiling the tag pattern if one is set.
    pub fn version_spec(&self) -> Result<VersionSpec> {
        let spec = VersionSpec::new(&self.version.base_version)
            .with_override_property(&self.version.override_property);

        match &self.version.tag_pattern {
            Some(pattern) => Ok(spec.with_tag_mapping(TagPattern::new(pattern.as_str())?)),
            None => Ok(spec),
        }
    }
}

/// Parses configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| GitStampError::config(e.to_string()))
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitstamp.toml` in `project_dir`, the directory being versioned
/// 3. `.gitstamp.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>, project_dir: &Path) -> Result<Config> {
    let local_config = project_dir.join(LOCAL_CONFIG_FILE);

    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path).map_err(|e| {
            GitStampError::config(format!("Cannot read '{}': {}", path.display(), e))
        })?
    } else if local_config.exists() {
        tracing::debug!(path = %local_config.display(), "using project configuration");
        fs::read_to_string(&local_config)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(USER_CONFIG_FILE);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            tracing::debug!("no configuration file found, using defaults");
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}
