//! Test utilities for keel unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use keel::test_support::{manifests, ProjectFixture};
//!
//! #[test]
//! fn test_example() {
//!     let fixture = ProjectFixture::new()
//!         .with_manifest(manifests::multi_framework())
//!         .create();
//!
//!     let project = Project::load(fixture.path(), &LoadOptions::default()).unwrap();
//! }
//! ```

pub mod fixtures;

use std::path::Path;

use crate::core::project::{LoadOptions, Project};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Parse a manifest held in memory as `/work/<name>/project.json`.
pub fn parse_project(name: &str, manifest: &str) -> Project {
    let path = Path::new("/work").join(name).join("project.json");
    Project::parse(manifest, &path, &LoadOptions::default()).expect("fixture manifest should parse")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_layout() {
        let fixture = ProjectFixture::named("sample")
            .with_manifest("{}")
            .with_lock(manifests::multi_framework_lock())
            .with_config("[build]\nversion-suffix = \"ci\"\n")
            .create();

        assert!(fixture.path().ends_with("sample"));
        assert!(fixture.manifest_path().is_file());
        assert!(fixture.lock_path().is_file());
        assert!(fixture.path().join(".keel/config.toml").is_file());
    }

    #[test]
    fn test_dependency_manifest_template() {
        let project = parse_project(
            "deps",
            &manifests::with_dependencies(&[("Foo", "1.0.0"), ("Bar", ">= 2.0")]),
        );
        let deps: Vec<String> = project.dependencies().iter().map(|d| d.to_string()).collect();
        assert_eq!(deps, vec!["Foo [1.0.0]", "Bar >= 2.0.0"]);
        assert_eq!(project.name(), "deps");
    }
}
