//! Global context for keel operations.
//!
//! Provides centralized access to configuration, paths, and environment.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::project::PROJECT_FILE_NAME;
use crate::util::config::{self, Config};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global keel data (~/.keel/)
    home: Option<PathBuf>,

    /// Whether to use colors in output
    color: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        GlobalContext {
            cwd,
            home: config::global_config_dir(),
            color: true,
        }
    }

    /// Use a different home directory for global configuration.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Set color output.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|home| home.join("config.toml"))
    }

    /// Check if color output is enabled.
    pub fn color(&self) -> bool {
        self.color
    }

    /// Find `project.json` starting from cwd and searching upward.
    pub fn find_project_file(&self) -> Option<PathBuf> {
        find_project_file(&self.cwd)
    }

    /// The project file to operate on: `explicit` (a file, or a directory
    /// containing one) relative to cwd, or the nearest one above cwd.
    pub fn resolve_project_path(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        let Some(explicit) = explicit else {
            return match self.find_project_file() {
                Some(path) => Ok(path),
                None => bail!(
                    "could not find `{}` in `{}` or any parent directory",
                    PROJECT_FILE_NAME,
                    self.cwd.display()
                ),
            };
        };

        let path = self.cwd.join(explicit);
        let path = if path.is_dir() {
            path.join(PROJECT_FILE_NAME)
        } else {
            path
        };
        if !path.is_file() {
            bail!("project file `{}` does not exist", path.display());
        }
        Ok(path)
    }

    /// Load configuration for the project in `project_dir`.
    pub fn load_config(&self, project_dir: &Path) -> Config {
        config::load_config(
            self.config_path().as_deref(),
            &config::project_config_path(project_dir),
        )
    }
}

/// Walk up from `start` looking for a directory containing `project.json`.
pub fn find_project_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_paths() {
        let ctx = GlobalContext::new().unwrap();
        assert!(ctx.cwd().is_absolute());

        let ctx = ctx.with_home(Some(PathBuf::from("/home/me/.keel")));
        assert_eq!(ctx.config_path(), Some(PathBuf::from("/home/me/.keel/config.toml")));
    }

    #[test]
    fn test_find_project_file_walks_up() {
        let tmp = TempDir::new().unwrap();
        let manifest = tmp.path().join(PROJECT_FILE_NAME);
        std::fs::write(&manifest, "{}").unwrap();
        let nested = tmp.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = GlobalContext::with_cwd(nested);
        assert_eq!(ctx.find_project_file(), Some(manifest.clone()));
        assert_eq!(ctx.resolve_project_path(None).unwrap(), manifest);
    }

    #[test]
    fn test_resolve_explicit_project_path() {
        let tmp = TempDir::new().unwrap();
        let app = tmp.path().join("app");
        std::fs::create_dir_all(&app).unwrap();
        std::fs::write(app.join(PROJECT_FILE_NAME), "{}").unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf());
        let expected = app.join(PROJECT_FILE_NAME);
        assert_eq!(ctx.resolve_project_path(Some(Path::new("app"))).unwrap(), expected);
        assert_eq!(
            ctx.resolve_project_path(Some(Path::new("app/project.json"))).unwrap(),
            expected
        );

        let err = ctx.resolve_project_path(Some(Path::new("missing"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_project_config_is_loaded() {
        let tmp = TempDir::new().unwrap();
        let config_dir = tmp.path().join(".keel");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            "[build]\nversion-suffix = \"local\"\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).with_home(None);
        let config = ctx.load_config(tmp.path());
        assert_eq!(config.build.version_suffix.as_deref(), Some("local"));
    }
}
