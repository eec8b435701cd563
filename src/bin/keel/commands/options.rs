//! `keel options` command

use std::path::Path;

use anyhow::{bail, Result};

use super::parse_framework;
use crate::cli::OptionsArgs;
use keel::ops::load_project;
use keel::util::GlobalContext;
use keel::CompilerOptions;

const DEFAULT_CONFIGURATION: &str = "Debug";

pub fn execute(ctx: &GlobalContext, project_path: Option<&Path>, args: OptionsArgs) -> Result<()> {
    let project = load_project(ctx, project_path)?;
    let framework = parse_framework(&args.framework)?;

    let configuration = match args.configuration {
        Some(configuration) => configuration,
        None => ctx
            .load_config(project.project_directory())
            .build
            .configuration
            .unwrap_or_else(|| DEFAULT_CONFIGURATION.to_string()),
    };

    if project.configuration_options(&configuration).is_none() {
        let known: Vec<&str> = project.configurations().map(|(name, _)| name).collect();
        bail!(
            "configuration `{}` is not defined (available: {})",
            configuration,
            known.join(", ")
        );
    }

    if project.framework_options(&framework).is_none() {
        tracing::warn!(
            "{} is not declared by {}, using project-wide options",
            framework.short_name(),
            project.name()
        );
    }

    let options = project.effective_options(Some(&framework), Some(&configuration));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&options)?);
    } else {
        println!("{} ({})", framework, configuration);
        print_options(&options);
    }

    Ok(())
}

fn print_options(options: &CompilerOptions) {
    let defines: Vec<&str> = options.defines.iter().map(String::as_str).collect();
    println!("  defines: {}", defines.join(";"));

    let text = [
        ("languageVersion", &options.language_version),
        ("platform", &options.platform),
        ("keyFile", &options.key_file),
    ];
    for (name, value) in text {
        if let Some(value) = value {
            println!("  {}: {}", name, value);
        }
    }

    let flags = [
        ("allowUnsafe", options.allow_unsafe),
        ("warningsAsErrors", options.warnings_as_errors),
        ("optimize", options.optimize),
        ("delaySign", options.delay_sign),
        ("emitEntryPoint", options.emit_entry_point),
    ];
    for (name, value) in flags {
        println!("  {}: {}", name, value.unwrap_or(false));
    }
}
