//! Test fixtures for common test scenarios.
//!
//! This module provides project directories on disk and manifest templates
//! for common testing patterns in keel.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::project::{LOCK_FILE_NAME, PROJECT_FILE_NAME};

/// Fixture for a project directory.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Directory name, which is also the fallback project name.
    pub name: String,
    /// project.json content; not written when `None`.
    pub manifest: Option<String>,
    /// project.lock.json content; not written when `None`.
    pub lock: Option<String>,
    /// .keel/config.toml content; not written when `None`.
    pub config: Option<String>,
}

impl ProjectFixture {
    /// Create an empty fixture named `app`.
    pub fn new() -> Self {
        ProjectFixture::named("app")
    }

    pub fn named(name: impl Into<String>) -> Self {
        ProjectFixture {
            name: name.into(),
            manifest: None,
            lock: None,
            config: None,
        }
    }

    /// Set the manifest content.
    pub fn with_manifest(mut self, manifest: impl Into<String>) -> Self {
        self.manifest = Some(manifest.into());
        self
    }

    /// Set the lock file content.
    pub fn with_lock(mut self, lock: impl Into<String>) -> Self {
        self.lock = Some(lock.into());
        self
    }

    /// Set the project-level config file content.
    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = Some(config.into());
        self
    }

    /// Write this fixture below `base_path`, returning the project directory.
    pub fn write_to(&self, base_path: &Path) -> std::io::Result<PathBuf> {
        let project_path = base_path.join(&self.name);
        std::fs::create_dir_all(&project_path)?;

        if let Some(manifest) = &self.manifest {
            std::fs::write(project_path.join(PROJECT_FILE_NAME), manifest)?;
        }
        if let Some(lock) = &self.lock {
            std::fs::write(project_path.join(LOCK_FILE_NAME), lock)?;
        }
        if let Some(config) = &self.config {
            let config_dir = project_path.join(".keel");
            std::fs::create_dir_all(&config_dir)?;
            std::fs::write(config_dir.join("config.toml"), config)?;
        }

        Ok(project_path)
    }

    /// Write this fixture into a fresh temporary directory.
    pub fn create(&self) -> FixtureDir {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let path = self
            .write_to(tmp.path())
            .expect("failed to write project fixture");
        FixtureDir { _tmp: tmp, path }
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        ProjectFixture::new()
    }
}

/// A project directory that is removed when dropped.
#[derive(Debug)]
pub struct FixtureDir {
    _tmp: TempDir,
    path: PathBuf,
}

impl FixtureDir {
    /// The project directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path.join(PROJECT_FILE_NAME)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.path.join(LOCK_FILE_NAME)
    }
}

/// Common manifest templates.
pub mod manifests {
    /// A manifest with global dependencies only.
    pub fn with_dependencies(deps: &[(&str, &str)]) -> String {
        let entries = deps
            .iter()
            .map(|(name, range)| format!("    \"{}\": \"{}\"", name, range))
            .collect::<Vec<_>>()
            .join(",\n");

        format!("{{\n  \"version\": \"1.0.0\",\n  \"dependencies\": {{\n{entries}\n  }}\n}}\n")
    }

    /// Two frameworks, one with a system reference, and a global dependency.
    pub fn multi_framework() -> &'static str {
        r#"{
  "version": "2.1.0-*",
  "description": "Multi-framework sample",
  "dependencies": {
    "Newtonsoft.Json": "8.0.3"
  },
  "compilationOptions": {
    "define": ["SAMPLE"],
    "warningsAsErrors": true
  },
  "frameworks": {
    "net45": {
      "frameworkAssemblies": { "System.Xml": "" },
      "dependencies": { "Foo": "1.2.0" }
    },
    "netstandard1.3": {
      "compilationOptions": { "optimize": true },
      "dependencies": { "System.Runtime": "[4.1.0, 5.0.0)" }
    }
  }
}
"#
    }

    /// The lock a resolver would write for [`multi_framework`].
    pub fn multi_framework_lock() -> &'static str {
        r#"{
  "locked": false,
  "version": 1,
  "projectFileDependencyGroups": {
    "": ["Newtonsoft.Json [8.0.3]"],
    ".NETFramework,Version=v4.5": ["Foo [1.2.0]", "fx/System.Xml"],
    ".NETStandard,Version=v1.3": ["System.Runtime [4.1.0, 5.0.0)"]
  },
  "libraries": {}
}
"#
    }

    /// A manifest that is not valid JSON.
    pub fn invalid() -> &'static str {
        "{\n  \"name\": \"broken\",\n  \"version\": \"1.0.0\"\n  \"dependencies\": {}\n}\n"
    }
}
