//! keel - project manifest loading and resolution
//!
//! This crate loads a `project.json` manifest into an immutable [`Project`]:
//! metadata, per-framework dependency sets, layered compiler options and
//! named configurations. It also validates `project.lock.json` against the
//! declared dependencies.

pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities and fixtures for keel unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use core::{
    compiler_options::CompilerOptions, dependency::Dependency, errors::ProjectError,
    framework::TargetFrameworkInfo, project::LoadOptions, project::Project,
};

pub use resolver::{FrameworkName, LockFile, SemanticVersion, VersionRange};
pub use util::context::GlobalContext;
