//! `keel show` command

use std::path::Path;

use anyhow::Result;

use crate::cli::ShowArgs;
use keel::ops::load_project;
use keel::util::GlobalContext;
use keel::Project;

pub fn execute(ctx: &GlobalContext, project_path: Option<&Path>, args: ShowArgs) -> Result<()> {
    let project = load_project(ctx, project_path)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&project)?);
        return Ok(());
    }

    print_summary(&project);
    Ok(())
}

fn print_summary(project: &Project) {
    println!("{} v{}", project.name(), project.version());
    println!("  file version: {}", project.assembly_file_version());
    println!("  path: {}", project.project_file_path().display());

    let metadata = project.metadata();
    if let Some(description) = &metadata.description {
        println!("  description: {}", description);
    }
    if !metadata.authors.is_empty() {
        println!("  authors: {}", metadata.authors.join(", "));
    }

    let frameworks: Vec<String> = project
        .target_frameworks()
        .map(|name| name.short_name())
        .collect();
    if !frameworks.is_empty() {
        println!("  frameworks: {}", frameworks.join(", "));
    }

    let configurations: Vec<&str> = project.configurations().map(|(name, _)| name).collect();
    println!("  configurations: {}", configurations.join(", "));

    println!("  dependencies: {}", project.dependencies().len());

    if !project.scripts().is_empty() {
        println!("  scripts:");
        for (event, commands) in project.scripts() {
            println!("    {}: {}", event, commands.join(" && "));
        }
    }
    if !project.commands().is_empty() {
        println!("  commands:");
        for (name, command) in project.commands() {
            println!("    {}: {}", name, command);
        }
    }
}
