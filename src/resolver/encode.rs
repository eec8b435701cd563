//! Lock file encoding and decoding.
//!
//! `project.lock.json` pins a previous resolution of the project's
//! dependency graph. Only the parts needed to detect staleness are modeled
//! in detail; library entries are carried through as written.

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::project::Project;

/// The lock format version this crate reads and writes.
pub const LOCK_FORMAT_VERSION: u32 = 1;

/// Lock file representation for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockFile {
    /// Whether the lock was pinned by the user and must not be regenerated.
    #[serde(default)]
    pub locked: bool,

    /// Lock format version
    pub version: u32,

    /// Declared dependencies per framework, as strings. The shared group has
    /// an empty framework name.
    #[serde(rename = "projectFileDependencyGroups", default, with = "groups")]
    pub groups: Vec<DependencyGroup>,

    /// Resolved libraries keyed by `name/version`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub libraries: IndexMap<String, LockedLibrary>,
}

/// The dependency strings recorded for one framework, or for the shared
/// (framework-less) group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGroup {
    pub framework_name: String,
    pub dependencies: Vec<String>,
}

impl DependencyGroup {
    pub fn new(framework_name: impl Into<String>, dependencies: Vec<String>) -> Self {
        DependencyGroup {
            framework_name: framework_name.into(),
            dependencies,
        }
    }

    /// The group holding the project's global dependencies.
    pub fn shared(dependencies: Vec<String>) -> Self {
        DependencyGroup::new("", dependencies)
    }

    pub fn is_shared(&self) -> bool {
        self.framework_name.is_empty()
    }
}

/// A resolved library entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedLibrary {
    /// `package` or `project`
    #[serde(rename = "type", default = "default_library_type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha512: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

fn default_library_type() -> String {
    "package".to_string()
}

impl LockFile {
    /// An unlocked, empty lock of the current format.
    pub fn new() -> Self {
        LockFile {
            locked: false,
            version: LOCK_FORMAT_VERSION,
            groups: Vec::new(),
            libraries: IndexMap::new(),
        }
    }

    /// Record the project's declared dependencies the way a resolver writes
    /// them: the shared group first, then one group per framework in
    /// declaration order.
    pub fn from_project(project: &Project) -> Self {
        let strings = |deps: &[crate::core::Dependency]| -> Vec<String> {
            deps.iter().map(ToString::to_string).collect()
        };

        let mut groups = vec![DependencyGroup::shared(strings(project.dependencies()))];
        groups.extend(project.frameworks().map(|info| {
            let name = info
                .framework_name
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            DependencyGroup::new(name, strings(&info.dependencies))
        }));

        LockFile {
            groups,
            ..LockFile::new()
        }
    }

    /// Load a lock file from a path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read lock file: {}", path.display()))?;

        serde_json::from_str(content.trim_start_matches('\u{feff}'))
            .with_context(|| format!("failed to parse lock file: {}", path.display()))
    }

    /// Save the lock file to a path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');

        std::fs::write(path, content)
            .with_context(|| format!("failed to write lock file: {}", path.display()))?;

        Ok(())
    }

    /// Check if the lock file is compatible with this version of keel.
    pub fn is_compatible(&self) -> bool {
        self.version == LOCK_FORMAT_VERSION
    }

    /// The shared group, if exactly one is present.
    pub fn shared_group(&self) -> Option<&DependencyGroup> {
        self.single_group("")
    }

    /// The group for a framework (by long-form name), if exactly one is
    /// present.
    pub fn framework_group(&self, framework_name: &str) -> Option<&DependencyGroup> {
        self.single_group(framework_name)
    }

    fn single_group(&self, framework_name: &str) -> Option<&DependencyGroup> {
        let mut matching = self
            .groups
            .iter()
            .filter(|group| group.framework_name == framework_name);
        let first = matching.next()?;
        match matching.next() {
            Some(_) => None,
            None => Some(first),
        }
    }
}

impl Default for LockFile {
    fn default() -> Self {
        LockFile::new()
    }
}

/// `projectFileDependencyGroups` is a JSON object, but duplicate keys must
/// survive decoding so the validator can reject them.
mod groups {
    use std::fmt;

    use super::*;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        groups: &[DependencyGroup],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(groups.len()))?;
        for group in groups {
            map.serialize_entry(&group.framework_name, &group.dependencies)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<DependencyGroup>, D::Error> {
        struct GroupsVisitor;

        impl<'de> Visitor<'de> for GroupsVisitor {
            type Value = Vec<DependencyGroup>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping framework names to dependency lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut groups = Vec::new();
                while let Some((framework_name, dependencies)) =
                    access.next_entry::<String, Vec<String>>()?
                {
                    groups.push(DependencyGroup {
                        framework_name,
                        dependencies,
                    });
                }
                Ok(groups)
            }
        }

        deserializer.deserialize_map(GroupsVisitor)
    }
}
