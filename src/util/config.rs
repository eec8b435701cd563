//! Configuration file support for keel.
//!
//! keel supports two configuration file locations:
//! - Global: `~/.keel/config.toml` - User-wide defaults
//! - Project: `.keel/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and the
//! `KEEL_BUILD_VERSION` / `KEEL_ASSEMBLY_FILE_VERSION` environment variables
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::project::LoadOptions;

/// Environment variable holding the snapshot token for `-*` versions.
pub const BUILD_VERSION_ENV: &str = "KEEL_BUILD_VERSION";

/// Environment variable holding the assembly file version revision.
pub const ASSEMBLY_FILE_VERSION_ENV: &str = "KEEL_ASSEMBLY_FILE_VERSION";

/// keel configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Snapshot token substituted into versions ending in `-*`
    pub version_suffix: Option<String>,

    /// Revision of the assembly file version
    pub file_revision: Option<String>,

    /// Configuration used when none is requested (e.g. "Release")
    pub configuration: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't
    /// exist or can't be read.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.version_suffix.is_some() {
            self.build.version_suffix = other.build.version_suffix;
        }
        if other.build.file_revision.is_some() {
            self.build.file_revision = other.build.file_revision;
        }
        if other.build.configuration.is_some() {
            self.build.configuration = other.build.configuration;
        }
    }

    /// Options for loading a project, with environment overrides applied.
    pub fn load_options(&self) -> LoadOptions {
        self.load_options_with(|key| std::env::var(key).ok())
    }

    /// Like [`Config::load_options`], reading variables through `env`.
    pub fn load_options_with(&self, env: impl Fn(&str) -> Option<String>) -> LoadOptions {
        LoadOptions {
            build_version: env(BUILD_VERSION_ENV).or_else(|| self.build.version_suffix.clone()),
            assembly_file_version: env(ASSEMBLY_FILE_VERSION_ENV)
                .or_else(|| self.build.file_revision.clone()),
        }
    }
}

/// Get the global keel config directory (~/.keel).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".keel"))
}

/// Get the project config path (.keel/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".keel").join("config.toml")
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.keel/config.toml)
/// 2. Global config (~/.keel/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if let Some(global_path) = global_path.filter(|p| p.exists()) {
        config.merge(Config::load_or_default(global_path));
    }

    // Project config overrides global
    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.build.version_suffix.is_none());
        assert!(config.build.file_revision.is_none());
        assert_eq!(config.load_options_with(|_| None), LoadOptions::default());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[build]
version-suffix = "beta-42"
file-revision = "7"
configuration = "Release"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.build.version_suffix.as_deref(), Some("beta-42"));
        assert_eq!(config.build.file_revision.as_deref(), Some("7"));
        assert_eq!(config.build.configuration.as_deref(), Some("Release"));
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.build.version_suffix = Some("global".to_string());
        base.build.file_revision = Some("1".to_string());

        let mut override_cfg = Config::default();
        override_cfg.build.version_suffix = Some("project".to_string());

        base.merge(override_cfg);

        assert_eq!(base.build.version_suffix.as_deref(), Some("project"));
        assert_eq!(base.build.file_revision.as_deref(), Some("1")); // Not overridden
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");
        std::fs::write(&global, "[build]\nversion-suffix = \"g\"\nfile-revision = \"3\"\n").unwrap();
        std::fs::write(&project, "[build]\nversion-suffix = \"p\"\n").unwrap();

        let config = load_config(Some(&global), &project);
        assert_eq!(config.build.version_suffix.as_deref(), Some("p"));
        assert_eq!(config.build.file_revision.as_deref(), Some("3"));

        let missing = load_config(None, &tmp.path().join("nope.toml"));
        assert_eq!(missing, Config::default());
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[build\n").unwrap();

        assert!(Config::load(&path).is_err());
        assert_eq!(Config::load_or_default(&path), Config::default());
    }

    #[test]
    fn test_environment_overrides_files() {
        let mut config = Config::default();
        config.build.version_suffix = Some("from-file".to_string());
        config.build.file_revision = Some("5".to_string());

        let options = config.load_options_with(|key| match key {
            BUILD_VERSION_ENV => Some("from-env".to_string()),
            _ => None,
        });

        assert_eq!(options.build_version.as_deref(), Some("from-env"));
        assert_eq!(options.assembly_file_version.as_deref(), Some("5"));
    }
}
