//! `keel deps` command

use std::path::Path;

use anyhow::Result;

use super::parse_framework;
use crate::cli::DepsArgs;
use keel::ops::load_project;
use keel::util::GlobalContext;
use keel::Dependency;

pub fn execute(ctx: &GlobalContext, project_path: Option<&Path>, args: DepsArgs) -> Result<()> {
    let project = load_project(ctx, project_path)?;

    print_group("(shared)", project.dependencies());

    match args.framework {
        Some(framework) => {
            let framework = parse_framework(&framework)?;
            let info = project.framework_info(&framework);
            let label = info
                .framework_name
                .as_ref()
                .map(|name| name.short_name())
                .unwrap_or_else(|| framework.short_name());
            print_group(&label, &info.dependencies);
        }
        None => {
            for info in project.frameworks() {
                if let Some(name) = &info.framework_name {
                    print_group(&name.short_name(), &info.dependencies);
                }
            }
        }
    }

    Ok(())
}

fn print_group(label: &str, dependencies: &[Dependency]) {
    println!("{}", label);
    if dependencies.is_empty() {
        println!("  (none)");
        return;
    }

    for dependency in dependencies {
        let kind = dependency.dependency_type();
        if kind.keywords().len() == 1 && !kind.is_build_time_only() && !kind.is_private() {
            println!("  {}", dependency);
        } else {
            println!("  {} ({})", dependency, kind);
        }
    }
}
