//! Loading the project a command operates on.

use std::path::Path;

use anyhow::Result;

use crate::core::project::{LoadOptions, Project};
use crate::util::context::GlobalContext;

/// Locate, configure and load a project.
///
/// `explicit` is a `project.json` or a directory holding one, relative to
/// cwd; without it the nearest project above cwd is used. Load options come
/// from config files and the environment.
pub fn load_project(ctx: &GlobalContext, explicit: Option<&Path>) -> Result<Project> {
    let path = ctx.resolve_project_path(explicit)?;
    let project_dir = path.parent().unwrap_or(ctx.cwd());

    let options = ctx.load_config(project_dir).load_options();
    tracing::debug!(
        "load options: build version {:?}, file revision {:?}",
        options.build_version,
        options.assembly_file_version
    );

    load_project_with(&path, &options)
}

/// Load a project with explicit options.
pub fn load_project_with(path: &Path, options: &LoadOptions) -> Result<Project> {
    // ProjectError is kept as the error's root so callers can render it.
    Ok(Project::load(path, options)?)
}
