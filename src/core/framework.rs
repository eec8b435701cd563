//! Per-target-framework settings.

use serde::Serialize;

use crate::core::compiler_options::{extract_options, CompilerOptions};
use crate::core::dependency::{build_dependencies, Dependency};
use crate::core::errors::ProjectError;
use crate::core::fields::{optional_object, optional_string, require_object};
use crate::resolver::framework::FrameworkName;
use crate::util::json::JsonNode;

/// Everything a project declares for one target framework.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetFrameworkInfo {
    /// `None` only for the synthetic fallback of a project without a match.
    pub framework_name: Option<FrameworkName>,

    /// Ordinary dependencies followed by system references
    pub dependencies: Vec<Dependency>,

    /// The framework layer of compiler options, including the framework
    /// define
    pub compiler_options: CompilerOptions,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapped_project: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assembly_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdb_path: Option<String>,
}

impl TargetFrameworkInfo {
    /// Dependencies resolved against the package graph.
    pub fn package_dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|d| !d.is_system_reference())
    }

    /// Dependencies provided by the platform.
    pub fn system_references(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|d| d.is_system_reference())
    }
}

/// Build the settings for one entry of the `frameworks` object.
///
/// Returns `Ok(None)` when `key` does not name a supported framework; the
/// entry is skipped with a warning.
pub fn build_framework(
    key: &str,
    node: &JsonNode<'_>,
) -> Result<Option<TargetFrameworkInfo>, ProjectError> {
    let Some(framework_name) = FrameworkName::canonicalize(key) else {
        tracing::warn!(
            "{}: skipping unsupported target framework `{}`",
            node.location(),
            key
        );
        return Ok(None);
    };

    require_object(node, &format!("frameworks.{}", key))?;

    let compiler_options = extract_options(node)?
        .unwrap_or_default()
        .with_define(framework_name.default_define());

    let mut dependencies = match optional_object(node, "dependencies")? {
        Some(deps) => build_dependencies(&deps, false)?,
        None => Vec::new(),
    };
    if let Some(assemblies) = optional_object(node, "frameworkAssemblies")? {
        dependencies.extend(build_dependencies(&assemblies, true)?);
    }

    let (assembly_path, pdb_path) = match optional_object(node, "bin")? {
        Some(bin) => (
            optional_string(&bin, "assembly")?,
            optional_string(&bin, "pdb")?,
        ),
        None => (None, None),
    };

    tracing::debug!(
        "framework {} ({}): {} dependencies",
        framework_name.short_name(),
        framework_name,
        dependencies.len()
    );

    Ok(Some(TargetFrameworkInfo {
        framework_name: Some(framework_name),
        dependencies,
        compiler_options,
        wrapped_project: optional_string(node, "wrappedProject")?,
        assembly_path,
        pdb_path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::json::JsonDocument;

    fn build(key: &str, json: &str) -> Result<Option<TargetFrameworkInfo>, ProjectError> {
        let doc = JsonDocument::parse(json, "/app/project.json").unwrap();
        build_framework(key, &doc.root())
    }

    #[test]
    fn test_build_framework() {
        let info = build(
            "net45",
            r#"{
  "compilationOptions": { "define": ["CUSTOM"], "platform": "x86" },
  "frameworkAssemblies": { "System.Xml": "" },
  "dependencies": { "Foo": "1.2.0" },
  "wrappedProject": "../Legacy/Legacy.csproj",
  "bin": { "assembly": "lib/Legacy.dll", "pdb": "lib/Legacy.pdb" }
}"#,
        )
        .unwrap()
        .unwrap();

        assert_eq!(info.framework_name.as_ref().unwrap().short_name(), "net45");
        assert!(info.compiler_options.defines.contains("NET45"));
        assert!(info.compiler_options.defines.contains("CUSTOM"));
        assert_eq!(info.compiler_options.platform.as_deref(), Some("x86"));

        let deps: Vec<String> = info.dependencies.iter().map(|d| d.to_string()).collect();
        assert_eq!(deps, vec!["Foo [1.2.0]", "fx/System.Xml"]);
        assert_eq!(info.package_dependencies().count(), 1);
        assert_eq!(info.system_references().count(), 1);

        assert_eq!(info.wrapped_project.as_deref(), Some("../Legacy/Legacy.csproj"));
        assert_eq!(info.assembly_path.as_deref(), Some("lib/Legacy.dll"));
        assert_eq!(info.pdb_path.as_deref(), Some("lib/Legacy.pdb"));
    }

    #[test]
    fn test_empty_framework_has_only_its_define() {
        let info = build("netstandard1.3", "{}").unwrap().unwrap();
        assert!(info.dependencies.is_empty());
        assert_eq!(
            info.compiler_options.defines.iter().collect::<Vec<_>>(),
            vec!["NETSTANDARD1_3"]
        );
    }

    #[test]
    fn test_unsupported_framework_is_skipped() {
        assert_eq!(build("bogus99", r#"{ "dependencies": { "": "x" } }"#).unwrap(), None);
    }

    #[test]
    fn test_errors_propagate() {
        assert!(matches!(
            build("net45", r#"{ "dependencies": { "": "1.0.0" } }"#),
            Err(ProjectError::MalformedDependency { .. })
        ));
        assert!(matches!(
            build("net45", r#""net45""#),
            Err(ProjectError::InvalidField { .. })
        ));
    }
}
