//! Dependency specification.
//!
//! A Dependency describes what a project requires: a name, an optional
//! version range and how the dependency is used. Entries from a
//! `frameworkAssemblies` block are system references, provided by the
//! platform rather than the package graph.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::core::errors::ProjectError;
use crate::resolver::version::VersionRange;
use crate::util::diagnostic::SourceLocation;
use crate::util::json::JsonNode;

/// Prefix of the string form of a system reference.
pub const SYSTEM_REFERENCE_PREFIX: &str = "fx/";

/// A dependency declared in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    /// Package or assembly name
    name: String,

    /// Allowed versions; `None` accepts any version
    version_range: Option<VersionRange>,

    /// How the dependency is consumed
    #[serde(rename = "type")]
    dependency_type: DependencyType,

    /// Resolved against the platform rather than the package graph
    is_system_reference: bool,

    /// What kind of library may satisfy the dependency
    target: DependencyTarget,

    /// Where the dependency was declared
    #[serde(skip)]
    location: SourceLocation,
}

impl Dependency {
    /// Create an unconstrained dependency of the default type.
    pub fn new(name: impl Into<String>, location: SourceLocation) -> Self {
        Dependency {
            name: name.into(),
            version_range: None,
            dependency_type: DependencyType::default(),
            is_system_reference: false,
            target: DependencyTarget::Any,
            location,
        }
    }

    /// Constrain the dependency to a version range.
    pub fn with_version_range(mut self, range: Option<VersionRange>) -> Self {
        self.version_range = range;
        self
    }

    /// Set the dependency type.
    pub fn with_type(mut self, dependency_type: DependencyType) -> Self {
        self.dependency_type = dependency_type;
        self
    }

    /// Set what kind of library may satisfy the dependency.
    pub fn with_target(mut self, target: DependencyTarget) -> Self {
        self.target = target;
        self
    }

    /// Mark the dependency as provided by the platform.
    pub fn system_reference(mut self, is_system_reference: bool) -> Self {
        self.is_system_reference = is_system_reference;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version_range(&self) -> Option<&VersionRange> {
        self.version_range.as_ref()
    }

    pub fn dependency_type(&self) -> &DependencyType {
        &self.dependency_type
    }

    pub fn is_system_reference(&self) -> bool {
        self.is_system_reference
    }

    pub fn target(&self) -> DependencyTarget {
        self.target
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Check if a version satisfies this dependency's range.
    pub fn matches_version(&self, version: &semver::Version) -> bool {
        self.version_range
            .as_ref()
            .map_or(true, |range| range.satisfies(version))
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_system_reference {
            f.write_str(SYSTEM_REFERENCE_PREFIX)?;
        }
        f.write_str(&self.name)?;
        if let Some(range) = &self.version_range {
            write!(f, " {}", range)?;
        }
        Ok(())
    }
}

/// A single keyword of a dependency's `type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencyTypeKeyword {
    Default,
    Build,
    Preprocess,
    Private,
    Dev,
    /// A keyword this crate does not interpret, kept verbatim.
    Other(String),
}

impl DependencyTypeKeyword {
    /// Parse a keyword; known keywords match case-insensitively.
    pub fn parse(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "default" => DependencyTypeKeyword::Default,
            "build" => DependencyTypeKeyword::Build,
            "preprocess" => DependencyTypeKeyword::Preprocess,
            "private" => DependencyTypeKeyword::Private,
            "dev" => DependencyTypeKeyword::Dev,
            _ => DependencyTypeKeyword::Other(token.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DependencyTypeKeyword::Default => "default",
            DependencyTypeKeyword::Build => "build",
            DependencyTypeKeyword::Preprocess => "preprocess",
            DependencyTypeKeyword::Private => "private",
            DependencyTypeKeyword::Dev => "dev",
            DependencyTypeKeyword::Other(token) => token,
        }
    }

    fn is_build_time(&self) -> bool {
        matches!(
            self,
            DependencyTypeKeyword::Build
                | DependencyTypeKeyword::Dev
                | DependencyTypeKeyword::Preprocess
        )
    }
}

/// The ordered keywords of a dependency's `type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyType {
    keywords: Vec<DependencyTypeKeyword>,
}

impl DependencyType {
    /// Build from parsed keywords; no keywords means `default`.
    pub fn from_keywords(keywords: Vec<DependencyTypeKeyword>) -> Self {
        if keywords.is_empty() {
            return DependencyType::default();
        }
        DependencyType { keywords }
    }

    /// Parse a space or comma separated keyword list.
    pub fn parse(text: &str) -> Self {
        DependencyType::from_keywords(
            text.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|token| !token.is_empty())
                .map(DependencyTypeKeyword::parse)
                .collect(),
        )
    }

    pub fn keywords(&self) -> &[DependencyTypeKeyword] {
        &self.keywords
    }

    pub fn contains(&self, keyword: &DependencyTypeKeyword) -> bool {
        self.keywords.contains(keyword)
    }

    /// Only needed while building, never at run time.
    pub fn is_build_time_only(&self) -> bool {
        self.keywords.iter().all(DependencyTypeKeyword::is_build_time)
    }

    /// Not flowed to consumers of this project.
    pub fn is_private(&self) -> bool {
        self.contains(&DependencyTypeKeyword::Private)
    }

    /// Whether the dependency is carried into a published package.
    pub fn becomes_package_dependency(&self) -> bool {
        !self.is_private() && !self.is_build_time_only()
    }
}

impl Default for DependencyType {
    fn default() -> Self {
        DependencyType {
            keywords: vec![DependencyTypeKeyword::Default],
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keywords: Vec<&str> = self.keywords.iter().map(|k| k.as_str()).collect();
        f.write_str(&keywords.join(","))
    }
}

impl Serialize for DependencyType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.keywords.iter().map(|k| k.as_str()))
    }
}

/// What kind of library may satisfy a dependency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyTarget {
    #[default]
    Any,
    Package,
    Project,
}

impl DependencyTarget {
    fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "package" => Some(DependencyTarget::Package),
            "project" => Some(DependencyTarget::Project),
            _ => None,
        }
    }
}

/// Dependency specification as it appears in project.json.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum DependencySpec {
    /// Simple version string: `"Foo": "1.0.0"`
    Simple(String),

    /// Detailed specification
    Detailed(DetailedDependencySpec),
}

/// Detailed dependency specification.
#[derive(Debug, Clone, Default, Deserialize)]
struct DetailedDependencySpec {
    #[serde(default)]
    version: Option<String>,

    #[serde(default, rename = "type")]
    kind: Option<TypeSpec>,

    #[serde(default)]
    target: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TypeSpec {
    Keywords(String),
    List(Vec<String>),
}

/// Build the dependencies declared in a `dependencies` or
/// `frameworkAssemblies` object, in declaration order.
pub fn build_dependencies(
    node: &JsonNode<'_>,
    is_system_reference: bool,
) -> Result<Vec<Dependency>, ProjectError> {
    let entries = node.entries().ok_or_else(|| ProjectError::InvalidField {
        field: if is_system_reference {
            "frameworkAssemblies".to_string()
        } else {
            "dependencies".to_string()
        },
        expected: "an object",
        location: node.location(),
    })?;

    entries
        .into_iter()
        .map(|(name, value)| {
            Ok(normalize(name, &value)?.system_reference(is_system_reference))
        })
        .collect()
}

fn normalize(name: &str, value: &JsonNode<'_>) -> Result<Dependency, ProjectError> {
    let location = value.location();
    let malformed = |reason: String| ProjectError::MalformedDependency {
        name: name.to_string(),
        reason,
        location: location.clone(),
    };

    if name.trim().is_empty() {
        return Err(malformed("dependency name cannot be empty".to_string()));
    }

    let spec = DependencySpec::deserialize(value.value()).map_err(|_| {
        malformed(format!(
            "expected a version string or an object with `version`, `type` and `target`, found {}",
            value.kind()
        ))
    })?;

    let (version, kind, target) = match spec {
        DependencySpec::Simple(version) => (Some(version), None, None),
        DependencySpec::Detailed(detail) => (detail.version, detail.kind, detail.target),
    };

    let version_range = match version.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Some(
            text.parse::<VersionRange>()
                .map_err(|e| malformed(e.to_string()))?,
        ),
        _ => None,
    };

    let dependency_type = match kind {
        Some(TypeSpec::Keywords(text)) => DependencyType::parse(&text),
        Some(TypeSpec::List(items)) => DependencyType::from_keywords(
            items
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty())
                .map(DependencyTypeKeyword::parse)
                .collect(),
        ),
        None => DependencyType::default(),
    };

    let target = match target.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => DependencyTarget::parse(text).ok_or_else(|| {
            malformed(format!(
                "unknown target `{}`, expected `package` or `project`",
                text
            ))
        })?,
        _ => DependencyTarget::Any,
    };

    Ok(Dependency::new(name, location.clone())
        .with_version_range(version_range)
        .with_type(dependency_type)
        .with_target(target))
}
