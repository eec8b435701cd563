//! The project descriptor.
//!
//! A [`Project`] is built in one pass from `project.json` and never changes
//! afterwards, so it can be shared freely between build workers.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;

use crate::core::compiler_options::{
    combine, default_configurations, extract_options, CompilerOptions,
};
use crate::core::dependency::{build_dependencies, Dependency};
use crate::core::errors::ProjectError;
use crate::core::fields::{optional_object, require_object};
use crate::core::framework::{build_framework, TargetFrameworkInfo};
use crate::core::metadata::{parse_commands, parse_scripts, ProjectMetadata};
use crate::resolver::framework::{compatible_frameworks, FrameworkName};
use crate::resolver::version::{
    resolve_assembly_file_version, resolve_version, FileVersion, SemanticVersion,
};
use crate::util::json::JsonDocument;

/// Manifest file name.
pub const PROJECT_FILE_NAME: &str = "project.json";

/// Lock file name, next to the manifest.
pub const LOCK_FILE_NAME: &str = "project.lock.json";

/// Values supplied by the build environment rather than the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Replaces the `*` of a version ending in `-*`.
    pub build_version: Option<String>,
    /// Revision component of the assembly file version.
    pub assembly_file_version: Option<String>,
}

impl LoadOptions {
    pub fn with_build_version(mut self, token: impl Into<String>) -> Self {
        self.build_version = Some(token.into());
        self
    }

    pub fn with_assembly_file_version(mut self, revision: impl Into<String>) -> Self {
        self.assembly_file_version = Some(revision.into());
        self
    }
}

/// A fully resolved project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    name: String,
    project_file_path: PathBuf,
    version: SemanticVersion,
    assembly_file_version: FileVersion,
    metadata: ProjectMetadata,
    scripts: IndexMap<String, Vec<String>>,
    commands: IndexMap<String, String>,
    dependencies: Vec<Dependency>,
    #[serde(rename = "compilationOptions")]
    default_compiler_options: CompilerOptions,
    configurations: IndexMap<String, CompilerOptions>,
    frameworks: IndexMap<FrameworkName, TargetFrameworkInfo>,
    #[serde(skip)]
    default_framework_info: TargetFrameworkInfo,
}

impl Project {
    /// Load a project from a `project.json` file or a directory containing
    /// one.
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Project, ProjectError> {
        let path = if path.is_dir() {
            path.join(PROJECT_FILE_NAME)
        } else {
            path.to_path_buf()
        };
        let path = std::path::absolute(&path).unwrap_or(path);

        let content = std::fs::read_to_string(&path).map_err(|source| ProjectError::Io {
            path: path.clone(),
            source,
        })?;

        Project::parse(&content, &path, options)
    }

    /// Build a project from manifest text. `path` is used for the name
    /// fallback, for diagnostics and as the project file path.
    pub fn parse(content: &str, path: &Path, options: &LoadOptions) -> Result<Project, ProjectError> {
        tracing::debug!("loading project from {}", path.display());

        let doc = JsonDocument::parse(content, path).map_err(|source| {
            ProjectError::MalformedManifest {
                path: path.to_path_buf(),
                line: source.line(),
                column: source.column(),
                source,
            }
        })?;
        let root = doc.root();
        require_object(&root, "project")?;

        let name = root
            .get("name")
            .and_then(|node| node.as_str().map(str::trim))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| directory_name(path));

        let version = match root.get("version").filter(|node| !node.is_null()) {
            Some(node) => {
                let raw = node.as_str().ok_or_else(|| ProjectError::InvalidField {
                    field: "version".to_string(),
                    expected: "a string",
                    location: node.location(),
                })?;
                resolve_version(raw, options.build_version.as_deref()).map_err(|source| {
                    ProjectError::InvalidVersion {
                        value: raw.to_string(),
                        location: node.location(),
                        source,
                    }
                })?
            }
            None => SemanticVersion::default(),
        };

        let assembly_file_version =
            resolve_assembly_file_version(&version, options.assembly_file_version.as_deref())
                .map_err(|source| ProjectError::InvalidFileVersionOverride {
                    value: options.assembly_file_version.clone().unwrap_or_default(),
                    path: path.to_path_buf(),
                    source,
                })?;

        let metadata = ProjectMetadata::from_node(&root);
        let scripts = parse_scripts(&root)?;
        let commands = parse_commands(&root)?;

        let dependencies = match optional_object(&root, "dependencies")? {
            Some(node) => build_dependencies(&node, false)?,
            None => Vec::new(),
        };

        let default_compiler_options = extract_options(&root)?.unwrap_or_default();
        let configurations = build_configurations(&doc)?;
        let frameworks = build_frameworks(&doc)?;

        tracing::debug!(
            "loaded project {} {} ({} dependencies, {} frameworks, {} configurations)",
            name,
            version,
            dependencies.len(),
            frameworks.len(),
            configurations.len()
        );

        Ok(Project {
            name,
            project_file_path: path.to_path_buf(),
            version,
            assembly_file_version,
            metadata,
            scripts,
            commands,
            dependencies,
            default_compiler_options,
            configurations,
            frameworks,
            default_framework_info: TargetFrameworkInfo::default(),
        })
    }

    /// Check whether `dir` contains a project file.
    pub fn has_project_file(dir: &Path) -> bool {
        dir.join(PROJECT_FILE_NAME).is_file()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn project_file_path(&self) -> &Path {
        &self.project_file_path
    }

    /// The directory containing the project file.
    pub fn project_directory(&self) -> &Path {
        self.project_file_path.parent().unwrap_or(Path::new(""))
    }

    /// Where this project's lock file lives.
    pub fn lock_file_path(&self) -> PathBuf {
        self.project_directory().join(LOCK_FILE_NAME)
    }

    pub fn version(&self) -> &SemanticVersion {
        &self.version
    }

    pub fn assembly_file_version(&self) -> FileVersion {
        self.assembly_file_version
    }

    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    /// Global dependencies, shared by every framework.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn scripts(&self) -> &IndexMap<String, Vec<String>> {
        &self.scripts
    }

    /// Command lines for a script event.
    pub fn script(&self, event: &str) -> Option<&[String]> {
        self.scripts.get(event).map(Vec::as_slice)
    }

    pub fn commands(&self) -> &IndexMap<String, String> {
        &self.commands
    }

    pub fn command(&self, name: &str) -> Option<&str> {
        self.commands.get(name).map(String::as_str)
    }

    /// The global layer of compiler options.
    pub fn default_compiler_options(&self) -> &CompilerOptions {
        &self.default_compiler_options
    }

    /// Named configurations in declaration order, defaults first.
    pub fn configurations(&self) -> impl Iterator<Item = (&str, &CompilerOptions)> {
        self.configurations
            .iter()
            .map(|(name, options)| (name.as_str(), options))
    }

    /// Options of a named configuration. Names compare case-insensitively.
    pub fn configuration_options(&self, name: &str) -> Option<&CompilerOptions> {
        self.configurations
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, options)| options)
    }

    /// Declared frameworks in declaration order.
    pub fn frameworks(&self) -> impl Iterator<Item = &TargetFrameworkInfo> {
        self.frameworks.values()
    }

    pub fn target_frameworks(&self) -> impl Iterator<Item = &FrameworkName> {
        self.frameworks.keys()
    }

    /// The framework layer of compiler options. Exact match only.
    pub fn framework_options(&self, framework: &FrameworkName) -> Option<&CompilerOptions> {
        self.frameworks
            .get(framework)
            .map(|info| &info.compiler_options)
    }

    /// Compiler options for building `framework` in `configuration`.
    pub fn effective_options(
        &self,
        framework: Option<&FrameworkName>,
        configuration: Option<&str>,
    ) -> CompilerOptions {
        combine(
            &self.default_compiler_options,
            configuration.and_then(|name| self.configuration_options(name)),
            framework.and_then(|name| self.framework_options(name)),
        )
    }

    /// Settings for `requested`.
    ///
    /// An exact declaration wins; otherwise the best compatible declared
    /// framework is used, and failing that an empty fallback.
    pub fn framework_info(&self, requested: &FrameworkName) -> &TargetFrameworkInfo {
        if let Some(info) = self.frameworks.get(requested) {
            return info;
        }

        let fallback = compatible_frameworks(requested, self.frameworks.keys())
            .into_iter()
            .next()
            .and_then(|name| self.frameworks.get(name));

        match fallback {
            Some(info) => {
                tracing::debug!(
                    "{} is not declared, using compatible framework {}",
                    requested.short_name(),
                    info.framework_name
                        .as_ref()
                        .map(FrameworkName::short_name)
                        .unwrap_or_default()
                );
                info
            }
            None => &self.default_framework_info,
        }
    }

    /// The empty settings used when no declared framework applies.
    pub fn default_framework_info(&self) -> &TargetFrameworkInfo {
        &self.default_framework_info
    }
}

fn directory_name(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn build_configurations(
    doc: &JsonDocument,
) -> Result<IndexMap<String, CompilerOptions>, ProjectError> {
    let mut configurations: IndexMap<String, CompilerOptions> = default_configurations()
        .into_iter()
        .map(|(name, options)| (name.to_string(), options))
        .collect();

    let Some(section) = optional_object(&doc.root(), "configurations")? else {
        return Ok(configurations);
    };

    for (name, node) in section.entries().unwrap_or_default() {
        require_object(&node, &format!("configurations.{}", name))?;
        let options = extract_options(&node)?.unwrap_or_default();

        // Same name in a different case replaces the entry, keeping the
        // original spelling and position.
        let existing = configurations
            .keys()
            .position(|key| key.eq_ignore_ascii_case(name));
        match existing.and_then(|index| configurations.get_index_mut(index)) {
            Some((_, slot)) => *slot = options,
            None => {
                configurations.insert(name.to_string(), options);
            }
        }
    }

    Ok(configurations)
}

fn build_frameworks(
    doc: &JsonDocument,
) -> Result<IndexMap<FrameworkName, TargetFrameworkInfo>, ProjectError> {
    let mut frameworks = IndexMap::new();

    let Some(section) = optional_object(&doc.root(), "frameworks")? else {
        return Ok(frameworks);
    };

    for (key, node) in section.entries().unwrap_or_default() {
        let Some(info) = build_framework(key, &node)? else {
            continue;
        };
        if let Some(name) = info.framework_name.clone() {
            if frameworks.contains_key(&name) {
                tracing::debug!("framework `{}` redeclares {}", key, name);
            }
            frameworks.insert(name, info);
        }
    }

    Ok(frameworks)
}
