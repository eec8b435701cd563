//! Compiler options and their three layers.
//!
//! Options come from the project root, from a named configuration and from a
//! target framework. [`combine`] flattens them, most specific layer first.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::errors::ProjectError;
use crate::core::fields::{optional_bool, optional_object, optional_string, string_list};
use crate::util::json::JsonNode;

/// Manifest key holding compiler options.
pub const COMPILATION_OPTIONS_KEY: &str = "compilationOptions";

/// Compiler settings for one layer, or the combined result.
///
/// Unset scalar fields are `None` so that a layer can leave a setting to the
/// layers below it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Preprocessor symbols
    pub defines: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_unsafe: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings_as_errors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_sign: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emit_entry_point: Option<bool>,
}

impl CompilerOptions {
    /// Add a preprocessor symbol.
    pub fn with_define(mut self, define: impl Into<String>) -> Self {
        self.defines.insert(define.into());
        self
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = Some(optimize);
        self
    }
}

/// Read the `compilationOptions` object of `node`. `None` when absent.
pub fn extract_options(node: &JsonNode<'_>) -> Result<Option<CompilerOptions>, ProjectError> {
    let Some(options) = optional_object(node, COMPILATION_OPTIONS_KEY)? else {
        return Ok(None);
    };

    Ok(Some(CompilerOptions {
        defines: string_list(&options, "define")?.into_iter().collect(),
        language_version: optional_string(&options, "languageVersion")?,
        platform: optional_string(&options, "platform")?,
        key_file: optional_string(&options, "keyFile")?,
        allow_unsafe: optional_bool(&options, "allowUnsafe")?,
        warnings_as_errors: optional_bool(&options, "warningsAsErrors")?,
        optimize: optional_bool(&options, "optimize")?,
        delay_sign: optional_bool(&options, "delaySign")?,
        emit_entry_point: optional_bool(&options, "emitEntryPoint")?,
    }))
}

/// Merge the global, configuration and framework layers.
///
/// Each scalar comes from the most specific layer that sets it; booleans
/// unset everywhere become `false`, strings stay `None`. Defines are the
/// union of all layers.
pub fn combine(
    base: &CompilerOptions,
    configuration: Option<&CompilerOptions>,
    framework: Option<&CompilerOptions>,
) -> CompilerOptions {
    let layers: Vec<&CompilerOptions> = [Some(base), configuration, framework]
        .into_iter()
        .flatten()
        .collect();

    let flag = |field: fn(&CompilerOptions) -> Option<bool>| {
        Some(layers.iter().rev().find_map(|layer| field(layer)).unwrap_or(false))
    };
    let text = |field: fn(&CompilerOptions) -> Option<&String>| {
        layers.iter().rev().find_map(|layer| field(layer)).cloned()
    };

    CompilerOptions {
        defines: layers
            .iter()
            .flat_map(|layer| layer.defines.iter().cloned())
            .collect(),
        language_version: text(|o| o.language_version.as_ref()),
        platform: text(|o| o.platform.as_ref()),
        key_file: text(|o| o.key_file.as_ref()),
        allow_unsafe: flag(|o| o.allow_unsafe),
        warnings_as_errors: flag(|o| o.warnings_as_errors),
        optimize: flag(|o| o.optimize),
        delay_sign: flag(|o| o.delay_sign),
        emit_entry_point: flag(|o| o.emit_entry_point),
    }
}

/// The `Debug` and `Release` configurations every project starts with.
pub fn default_configurations() -> Vec<(&'static str, CompilerOptions)> {
    vec![
        (
            "Debug",
            CompilerOptions::default()
                .with_define("DEBUG")
                .with_define("TRACE")
                .with_optimize(false),
        ),
        (
            "Release",
            CompilerOptions::default()
                .with_define("RELEASE")
                .with_define("TRACE")
                .with_optimize(true),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::json::JsonDocument;

    fn defines(options: &CompilerOptions) -> Vec<&str> {
        options.defines.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_extract_options() {
        let doc = JsonDocument::parse(
            r#"{
  "compilationOptions": {
    "define": ["FOO", "BAR"],
    "languageVersion": "csharp6",
    "allowUnsafe": true,
    "keyFile": "../key.snk",
    "unknown": 1
  }
}"#,
            "/app/project.json",
        )
        .unwrap();

        let options = extract_options(&doc.root()).unwrap().unwrap();
        assert_eq!(defines(&options), vec!["BAR", "FOO"]);
        assert_eq!(options.language_version.as_deref(), Some("csharp6"));
        assert_eq!(options.allow_unsafe, Some(true));
        assert_eq!(options.key_file.as_deref(), Some("../key.snk"));
        assert_eq!(options.optimize, None);
    }

    #[test]
    fn test_absent_options() {
        let doc = JsonDocument::parse(r#"{"name": "x"}"#, "p.json").unwrap();
        assert_eq!(extract_options(&doc.root()).unwrap(), None);
    }

    #[test]
    fn test_wrong_type_is_invalid_field() {
        let doc = JsonDocument::parse(
            "{\n  \"compilationOptions\": {\n    \"optimize\": \"yes\"\n  }\n}",
            "p.json",
        )
        .unwrap();

        match extract_options(&doc.root()).unwrap_err() {
            ProjectError::InvalidField {
                field, location, ..
            } => {
                assert_eq!(field, "optimize");
                assert_eq!((location.line, location.column), (3, 17));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_combine_most_specific_wins() {
        let base = CompilerOptions {
            platform: Some("anycpu".into()),
            warnings_as_errors: Some(true),
            ..Default::default()
        }
        .with_define("GLOBAL");
        let config = CompilerOptions::default()
            .with_define("DEBUG")
            .with_optimize(false);
        let framework = CompilerOptions {
            platform: Some("x64".into()),
            ..Default::default()
        }
        .with_optimize(true)
        .with_define("NET45");

        let combined = combine(&base, Some(&config), Some(&framework));
        assert_eq!(defines(&combined), vec!["DEBUG", "GLOBAL", "NET45"]);
        assert_eq!(combined.platform.as_deref(), Some("x64"));
        assert_eq!(combined.optimize, Some(true));
        assert_eq!(combined.warnings_as_errors, Some(true));
        assert_eq!(combined.allow_unsafe, Some(false));
        assert_eq!(combined.language_version, None);
    }

    #[test]
    fn test_combine_without_overlays() {
        let base = CompilerOptions::default().with_define("A");
        let combined = combine(&base, None, None);
        assert_eq!(defines(&combined), vec!["A"]);
        assert_eq!(combined.optimize, Some(false));
        assert_eq!(combined.emit_entry_point, Some(false));
    }

    #[test]
    fn test_default_configurations() {
        let configurations = default_configurations();
        let (name, debug) = &configurations[0];
        assert_eq!(*name, "Debug");
        assert_eq!(defines(debug), vec!["DEBUG", "TRACE"]);
        assert_eq!(debug.optimize, Some(false));

        let (name, release) = &configurations[1];
        assert_eq!(*name, "Release");
        assert_eq!(defines(release), vec!["RELEASE", "TRACE"]);
        assert_eq!(release.optimize, Some(true));
    }
}
