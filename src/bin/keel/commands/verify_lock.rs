//! `keel verify-lock` command

use std::path::Path;

use anyhow::Result;

use crate::cli::VerifyLockArgs;
use keel::ops::{is_consistent, load_lock_file, load_project, stale_groups};
use keel::util::diagnostic::{emit, suggestions, Diagnostic};
use keel::util::GlobalContext;

pub fn execute(
    ctx: &GlobalContext,
    project_path: Option<&Path>,
    args: VerifyLockArgs,
) -> Result<()> {
    let project = load_project(ctx, project_path)?;
    let lock_path = match args.lockfile {
        Some(path) => ctx.cwd().join(path),
        None => project.lock_file_path(),
    };

    let Some(lock) = load_lock_file(&lock_path)? else {
        let diagnostic = Diagnostic::error(format!("lock file not found: {}", lock_path.display()))
            .with_suggestion(suggestions::STALE_LOCK);
        emit(&diagnostic, ctx.color());
        std::process::exit(1);
    };

    if is_consistent(&project, &lock) {
        println!("{}: lock file is up to date", project.name());
        return Ok(());
    }

    let mut diagnostic = Diagnostic::error(format!(
        "lock file is out of date: {}",
        lock_path.display()
    ));
    if !lock.is_compatible() {
        diagnostic = diagnostic.with_context(format!(
            "lock format version {} is not supported",
            lock.version
        ));
    }
    for group in stale_groups(&project, &lock) {
        diagnostic = diagnostic.with_context(format!("dependency group `{}` does not match", group));
    }
    emit(&diagnostic.with_suggestion(suggestions::STALE_LOCK), ctx.color());
    std::process::exit(1);
}
