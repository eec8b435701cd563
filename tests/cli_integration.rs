//! CLI integration tests for keel.
//!
//! Each test writes a project into a temporary directory and runs the binary
//! against it with an isolated home directory.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const MANIFEST: &str = r#"{
  "version": "2.1.0-*",
  "description": "Multi-framework sample",
  "authors": ["Ada"],
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
  },
  "scripts": {
    "postcompile": "echo done"
  }
}
"#;

const LOCK: &str = r#"{
  "locked": false,
  "version": 1,
  "projectFileDependencyGroups": {
    "": ["Newtonsoft.Json [8.0.3]"],
    ".NETFramework,Version=v4.5": ["Foo [1.2.0]", "fx/System.Xml"],
    ".NETStandard,Version=v1.3": ["System.Runtime [4.1.0, 5.0.0)"]
  },
  "libraries": {}
}
"#;

/// Get the keel binary command, isolated from the user's configuration.
fn keel(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("keel").unwrap();
    cmd.env("HOME", home)
        .env_remove("KEEL_BUILD_VERSION")
        .env_remove("KEEL_ASSEMBLY_FILE_VERSION")
        .arg("--no-color");
    cmd
}

/// Create `<tmp>/sample/project.json`.
fn project(manifest: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("sample");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("project.json"), manifest).unwrap();
    tmp
}

// ============================================================================
// keel show
// ============================================================================

#[test]
fn test_show_summary() {
    let tmp = project(MANIFEST);

    keel(tmp.path())
        .args(["show", "--project", "sample"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("sample v2.1.0"))
        .stdout(predicate::str::contains("frameworks: net45, netstandard1.3"))
        .stdout(predicate::str::contains("configurations: Debug, Release"))
        .stdout(predicate::str::contains("postcompile: echo done"));
}

#[test]
fn test_show_finds_project_in_parent_directory() {
    let tmp = project(MANIFEST);
    let nested = tmp.path().join("sample/src/deep");
    fs::create_dir_all(&nested).unwrap();

    keel(tmp.path())
        .arg("show")
        .current_dir(&nested)
        .assert()
        .success()
        .stdout(predicate::str::contains("sample v2.1.0"));
}

#[test]
fn test_show_json() {
    let tmp = project(MANIFEST);

    let output = keel(tmp.path())
        .args(["show", "--json", "--project", "sample/project.json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "sample");
    assert_eq!(json["version"], "2.1.0");
    assert_eq!(json["assemblyFileVersion"], "2.1.0.0");
}

#[test]
fn test_build_version_from_environment() {
    let tmp = project(MANIFEST);

    keel(tmp.path())
        .args(["show", "--project", "sample"])
        .env("KEEL_BUILD_VERSION", "beta-7")
        .env("KEEL_ASSEMBLY_FILE_VERSION", "42")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("sample v2.1.0-beta-7"))
        .stdout(predicate::str::contains("file version: 2.1.0.42"));
}

#[test]
fn test_build_version_from_project_config() {
    let tmp = project(MANIFEST);
    let config_dir = tmp.path().join("sample/.keel");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[build]\nversion-suffix = \"nightly\"\n",
    )
    .unwrap();

    keel(tmp.path())
        .args(["show", "--project", "sample"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("sample v2.1.0-nightly"));
}

#[test]
fn test_malformed_manifest_reports_location() {
    let tmp = project("{\n  \"name\": \"broken\",\n  \"version\": \"1.0.0\"\n  \"dependencies\": {}\n}\n");

    keel(tmp.path())
        .args(["show", "--project", "sample"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("project file is not valid JSON"))
        .stderr(predicate::str::contains("project.json:4"));
}

#[test]
fn test_invalid_version_fails() {
    let tmp = project(r#"{"version": "one.two"}"#);

    keel(tmp.path())
        .args(["show", "--project", "sample"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid version `one.two`"));
}

#[test]
fn test_missing_project_fails() {
    let tmp = TempDir::new().unwrap();

    keel(tmp.path())
        .args(["show", "--project", "nowhere"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

// ============================================================================
// keel options
// ============================================================================

#[test]
fn test_options_layers_configuration_and_framework() {
    let tmp = project(MANIFEST);

    keel(tmp.path())
        .args(["options", "--framework", "net45", "--configuration", "Release"])
        .args(["--project", "sample"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(".NETFramework,Version=v4.5 (Release)"))
        .stdout(predicate::str::contains("defines: NET45;RELEASE;SAMPLE;TRACE"))
        .stdout(predicate::str::contains("optimize: true"))
        .stdout(predicate::str::contains("warningsAsErrors: true"));
}

#[test]
fn test_options_default_to_debug() {
    let tmp = project(MANIFEST);

    keel(tmp.path())
        .args(["options", "--framework", "netstandard1.3", "--project", "sample"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("(Debug)"))
        .stdout(predicate::str::contains("DEBUG"))
        // The framework layer turns optimization on even in Debug.
        .stdout(predicate::str::contains("optimize: true"));
}

#[test]
fn test_options_json() {
    let tmp = project(MANIFEST);

    let output = keel(tmp.path())
        .args(["options", "-f", "net45", "-c", "release", "--json", "--project", "sample"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["optimize"], true);
    assert_eq!(json["allowUnsafe"], false);
    assert!(json["defines"]
        .as_array()
        .unwrap()
        .contains(&serde_json::Value::from("NET45")));
}

#[test]
fn test_options_unknown_configuration_fails() {
    let tmp = project(MANIFEST);

    keel(tmp.path())
        .args(["options", "-f", "net45", "-c", "Profile", "--project", "sample"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration `Profile` is not defined"));
}

#[test]
fn test_options_unsupported_framework_fails() {
    let tmp = project(MANIFEST);

    keel(tmp.path())
        .args(["options", "-f", "bogus", "--project", "sample"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --framework value `bogus`"));
}

// ============================================================================
// keel deps
// ============================================================================

#[test]
fn test_deps_lists_every_group() {
    let tmp = project(MANIFEST);

    keel(tmp.path())
        .args(["deps", "--project", "sample"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Newtonsoft.Json [8.0.3]"))
        .stdout(predicate::str::contains("fx/System.Xml"))
        .stdout(predicate::str::contains("System.Runtime [4.1.0, 5.0.0)"));
}

#[test]
fn test_deps_for_compatible_framework() {
    let tmp = project(MANIFEST);

    // net46 is not declared; net45 is the nearest compatible framework.
    keel(tmp.path())
        .args(["deps", "--framework", "net46", "--project", "sample"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("net45"))
        .stdout(predicate::str::contains("Foo [1.2.0]"))
        .stdout(predicate::str::contains("System.Runtime").not());
}

// ============================================================================
// keel verify-lock
// ============================================================================

#[test]
fn test_verify_lock_up_to_date() {
    let tmp = project(MANIFEST);
    fs::write(tmp.path().join("sample/project.lock.json"), LOCK).unwrap();

    keel(tmp.path())
        .args(["verify-lock", "--project", "sample"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("lock file is up to date"));
}

#[test]
fn test_verify_lock_reports_stale_group() {
    let tmp = project(MANIFEST);
    fs::write(
        tmp.path().join("sample/project.lock.json"),
        LOCK.replace("Foo [1.2.0]", "Foo [1.1.0]"),
    )
    .unwrap();

    keel(tmp.path())
        .args(["verify-lock", "--project", "sample"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("lock file is out of date"))
        .stderr(predicate::str::contains(".NETFramework,Version=v4.5"))
        .stderr(predicate::str::contains("(shared)").not());
}

#[test]
fn test_verify_lock_missing() {
    let tmp = project(MANIFEST);

    keel(tmp.path())
        .args(["verify-lock", "--project", "sample"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("lock file not found"));
}

#[test]
fn test_verify_lock_explicit_path() {
    let tmp = project(MANIFEST);
    fs::write(tmp.path().join("other.lock.json"), LOCK).unwrap();

    keel(tmp.path())
        .args(["verify-lock", "--lockfile", "other.lock.json", "--project", "sample"])
        .current_dir(tmp.path())
        .assert()
        .success();
}
