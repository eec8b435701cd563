//! keel CLI - project manifest loader

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use keel::util::diagnostic;
use keel::util::GlobalContext;
use keel::ProjectError;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        match e.downcast_ref::<ProjectError>() {
            Some(project_error) => diagnostic::emit(&project_error.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("keel=debug")
    } else {
        EnvFilter::new("keel=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let mut ctx = GlobalContext::new()?;
    ctx.set_color(!cli.no_color);

    let project = cli.project.as_deref();

    // Execute command
    match cli.command {
        Commands::Show(args) => commands::show::execute(&ctx, project, args),
        Commands::Options(args) => commands::options::execute(&ctx, project, args),
        Commands::Deps(args) => commands::deps::execute(&ctx, project, args),
        Commands::VerifyLock(args) => commands::verify_lock::execute(&ctx, project, args),
    }
}
