//! Lock file I/O and validation.
//!
//! A lock is usable only when it was produced from exactly the dependencies
//! the manifest declares now. Anything else means it is stale and the graph
//! must be resolved again.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;

use crate::core::dependency::Dependency;
use crate::core::project::Project;
use crate::resolver::encode::{DependencyGroup, LockFile, LOCK_FORMAT_VERSION};

/// Check whether `lock` was produced from the dependencies `project`
/// declares.
///
/// There is no partial validity: a wrong format version, a missing or extra
/// group, or any mismatched group makes the whole lock stale.
pub fn is_consistent(project: &Project, lock: &LockFile) -> bool {
    if lock.version != LOCK_FORMAT_VERSION {
        tracing::debug!(
            "lock format version {} does not match {}",
            lock.version,
            LOCK_FORMAT_VERSION
        );
        return false;
    }

    let framework_count = project.target_frameworks().count();
    if lock.groups.len() != framework_count + 1 {
        tracing::debug!(
            "lock has {} dependency groups, expected {}",
            lock.groups.len(),
            framework_count + 1
        );
        return false;
    }

    if !group_matches(lock.shared_group(), project.dependencies()) {
        tracing::debug!("shared dependency group is missing or out of date");
        return false;
    }

    project.frameworks().all(|info| {
        let Some(framework_name) = &info.framework_name else {
            return false;
        };
        let name = framework_name.to_string();
        let matches = group_matches(lock.framework_group(&name), &info.dependencies);
        if !matches {
            tracing::debug!("dependency group for {} is missing or out of date", name);
        }
        matches
    })
}

fn group_matches(group: Option<&DependencyGroup>, declared: &[Dependency]) -> bool {
    let Some(group) = group else {
        return false;
    };

    let mut locked: Vec<&str> = group.dependencies.iter().map(String::as_str).collect();
    locked.sort_unstable();

    let mut expected: Vec<String> = declared.iter().map(ToString::to_string).collect();
    expected.sort_unstable();

    locked == expected
}

/// Load a lock file from the given path. A missing file is `None`.
pub fn load_lock_file(path: &Path) -> Result<Option<LockFile>> {
    if !path.exists() {
        return Ok(None);
    }

    let lock = LockFile::load(path)?;
    if !lock.is_compatible() {
        tracing::debug!(
            "lock file {} has format version {}",
            path.display(),
            lock.version
        );
    }
    Ok(Some(lock))
}

/// Write the dependency groups `project` declares to a lock file.
pub fn save_lock_file(path: &Path, project: &Project) -> Result<()> {
    LockFile::from_project(project).save(path)
}

/// Check if the lock file needs regenerating.
///
/// Returns true if:
/// - Lock file doesn't exist
/// - Lock file can't be parsed
/// - Lock file doesn't match the declared dependencies
pub fn lock_file_needs_update(project: &Project, path: &Path) -> Result<bool> {
    let lock = match load_lock_file(path) {
        Ok(Some(lock)) => lock,
        Ok(None) => return Ok(true),
        Err(e) => {
            tracing::debug!("{:#}", e);
            return Ok(true); // Corrupted lock file, needs regeneration
        }
    };

    Ok(!is_consistent(project, &lock))
}

/// Names of the framework groups that are missing, extra or out of date,
/// for reporting. The shared group is reported as `(shared)`.
pub fn stale_groups(project: &Project, lock: &LockFile) -> BTreeSet<String> {
    let mut stale = BTreeSet::new();
    let label = |name: &str| {
        if name.is_empty() {
            "(shared)".to_string()
        } else {
            name.to_string()
        }
    };

    if !group_matches(lock.shared_group(), project.dependencies()) {
        stale.insert(label(""));
    }

    let mut declared = BTreeSet::new();
    for info in project.frameworks() {
        let name = info
            .framework_name
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        if !group_matches(lock.framework_group(&name), &info.dependencies) {
            stale.insert(label(&name));
        }
        declared.insert(name);
    }

    for group in &lock.groups {
        if !group.is_shared() && !declared.contains(&group.framework_name) {
            stale.insert(label(&group.framework_name));
        }
    }

    stale
}
