//! Descriptive metadata, scripts and commands.
//!
//! Metadata is informational and read leniently: a value of the wrong type is
//! treated as absent. Scripts and commands are executed by other tools, so
//! their shape is checked strictly.

use indexmap::IndexMap;
use serde::Serialize;

use crate::core::errors::ProjectError;
use crate::core::fields::optional_object;
use crate::util::json::JsonNode;

/// Descriptive project metadata, passed through as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    pub authors: Vec<String>,
    pub owners: Vec<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    pub require_license_acceptance: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
}

impl ProjectMetadata {
    /// Read metadata from the manifest root.
    pub fn from_node(root: &JsonNode<'_>) -> Self {
        let text = |key: &str| root.get(key).and_then(|n| n.as_str().map(str::to_string));
        let list = |key: &str| -> Vec<String> {
            root.get(key)
                .and_then(|n| n.items())
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default()
        };

        ProjectMetadata {
            title: text("title"),
            description: text("description"),
            summary: text("summary"),
            release_notes: text("releaseNotes"),
            copyright: text("copyright"),
            authors: list("authors"),
            owners: list("owners"),
            tags: list("tags"),
            project_url: text("projectUrl"),
            license_url: text("licenseUrl"),
            icon_url: text("iconUrl"),
            require_license_acceptance: root
                .get("requireLicenseAcceptance")
                .and_then(|n| n.as_bool())
                .unwrap_or(false),
            language: text("language"),
            entry_point: text("entryPoint"),
        }
    }
}

/// Read the `scripts` object: event name to command lines.
pub fn parse_scripts(root: &JsonNode<'_>) -> Result<IndexMap<String, Vec<String>>, ProjectError> {
    let mut scripts = IndexMap::new();
    let Some(section) = optional_object(root, "scripts")? else {
        return Ok(scripts);
    };

    for (name, value) in section.entries().unwrap_or_default() {
        let malformed = |node: &JsonNode<'_>| ProjectError::MalformedScriptEntry {
            name: name.to_string(),
            location: node.location(),
        };

        let lines = if let Some(line) = value.as_str() {
            vec![line.to_string()]
        } else if let Some(items) = value.items() {
            items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(|| malformed(item)))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            return Err(malformed(&value));
        };

        scripts.insert(name.to_string(), lines);
    }

    Ok(scripts)
}

/// Read the `commands` object: command name to command line.
pub fn parse_commands(root: &JsonNode<'_>) -> Result<IndexMap<String, String>, ProjectError> {
    let mut commands = IndexMap::new();
    let Some(section) = optional_object(root, "commands")? else {
        return Ok(commands);
    };

    for (name, value) in section.entries().unwrap_or_default() {
        let line = value.as_str().ok_or_else(|| ProjectError::InvalidField {
            field: format!("commands.{}", name),
            expected: "a string",
            location: value.location(),
        })?;
        commands.insert(name.to_string(), line.to_string());
    }

    Ok(commands)
}
