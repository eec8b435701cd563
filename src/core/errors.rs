//! Manifest loading errors.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::resolver::version::VersionError;
use crate::util::diagnostic::{suggestions, Diagnostic, SourceLocation};

/// Error raised while loading a project manifest.
///
/// Loading is all-or-nothing: any of these aborts construction of the
/// project. Errors that come from a JSON node carry its location.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ProjectError {
    #[error("failed to read project file {}", path.display())]
    #[diagnostic(code(keel::manifest::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}:{column}: project file is not valid JSON", path.display())]
    #[diagnostic(
        code(keel::manifest::malformed),
        help("Check for missing commas, quotes or braces near the reported position")
    )]
    MalformedManifest {
        path: PathBuf,
        line: usize,
        column: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("{location}: invalid version `{value}`")]
    #[diagnostic(code(keel::manifest::invalid_version))]
    InvalidVersion {
        value: String,
        location: SourceLocation,
        #[source]
        source: VersionError,
    },

    #[error("{}: invalid file version override `{value}`", path.display())]
    #[diagnostic(
        code(keel::manifest::invalid_file_version),
        help("The file version override must be a non-negative integer")
    )]
    InvalidFileVersionOverride {
        value: String,
        path: PathBuf,
        #[source]
        source: VersionError,
    },

    #[error("{location}: invalid dependency `{name}`: {reason}")]
    #[diagnostic(code(keel::manifest::malformed_dependency))]
    MalformedDependency {
        name: String,
        reason: String,
        location: SourceLocation,
    },

    #[error("{location}: script `{name}` must be a string or an array of strings")]
    #[diagnostic(code(keel::manifest::malformed_script))]
    MalformedScriptEntry {
        name: String,
        location: SourceLocation,
    },

    #[error("{location}: `{field}` must be {expected}")]
    #[diagnostic(code(keel::manifest::invalid_field))]
    InvalidField {
        field: String,
        expected: &'static str,
        location: SourceLocation,
    },
}

impl ProjectError {
    /// The source position the error points at, if any.
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            ProjectError::Io { .. } | ProjectError::InvalidFileVersionOverride { .. } => None,
            ProjectError::MalformedManifest {
                path, line, column, ..
            } => Some(SourceLocation::new(path, *line, *column)),
            ProjectError::InvalidVersion { location, .. }
            | ProjectError::MalformedDependency { location, .. }
            | ProjectError::MalformedScriptEntry { location, .. }
            | ProjectError::InvalidField { location, .. } => Some(location.clone()),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let with_location = |diag: Diagnostic| match self.location() {
            Some(location) => diag.with_location(location),
            None => diag,
        };

        match self {
            ProjectError::Io { path, source } => {
                Diagnostic::error(format!("failed to read `{}`", path.display()))
                    .with_context(source.to_string())
                    .with_suggestion(suggestions::NO_PROJECT)
            }

            ProjectError::MalformedManifest { source, .. } => {
                with_location(Diagnostic::error("project file is not valid JSON"))
                    .with_context(source.to_string())
                    .with_suggestion(suggestions::FIX_JSON)
            }

            ProjectError::InvalidVersion { value, source, .. } => {
                with_location(Diagnostic::error(format!("invalid version `{}`", value)))
                    .with_context(source.to_string())
                    .with_suggestion(suggestions::VERSION_SYNTAX)
            }

            ProjectError::InvalidFileVersionOverride {
                value,
                path,
                source,
            } => Diagnostic::error(format!("invalid file version override `{}`", value))
                .with_context(format!("while loading {}", path.display()))
                .with_context(source.to_string())
                .with_suggestion("Set the file revision to a whole number, e.g. `42`"),

            ProjectError::MalformedDependency { name, reason, .. } => {
                let label = if name.is_empty() { "<empty>" } else { name.as_str() };
                with_location(Diagnostic::error(format!("invalid dependency `{}`", label)))
                    .with_context(reason.clone())
                    .with_suggestion(suggestions::DEPENDENCY_SYNTAX)
            }

            ProjectError::MalformedScriptEntry { name, .. } => {
                with_location(Diagnostic::error(format!("invalid script `{}`", name)))
                    .with_suggestion(suggestions::SCRIPT_SYNTAX)
            }

            ProjectError::InvalidField {
                field, expected, ..
            } => with_location(Diagnostic::error(format!(
                "`{}` must be {}",
                field, expected
            ))),
        }
    }
}
