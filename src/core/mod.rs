//! Core data structures for keel.
//!
//! This module contains the project descriptor and the pieces it is built
//! from:
//! - Dependencies and dependency types
//! - Layered compiler options and configurations
//! - Per-framework settings
//! - Metadata, scripts and commands

pub mod compiler_options;
pub mod dependency;
pub mod errors;
mod fields;
pub mod framework;
pub mod metadata;
pub mod project;

pub use compiler_options::CompilerOptions;
pub use dependency::{Dependency, DependencyTarget, DependencyType, DependencyTypeKeyword};
pub use errors::ProjectError;
pub use framework::TargetFrameworkInfo;
pub use metadata::ProjectMetadata;
pub use project::{LoadOptions, Project, LOCK_FILE_NAME, PROJECT_FILE_NAME};
