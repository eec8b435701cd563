//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// keel - load and inspect project.json manifests
#[derive(Parser)]
#[command(name = "keel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to project.json or the directory containing it
    #[arg(short, long, global = true, value_name = "PATH")]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the resolved project
    Show(ShowArgs),

    /// Show the effective compiler options for a framework and configuration
    Options(OptionsArgs),

    /// List declared dependencies
    Deps(DepsArgs),

    /// Check that project.lock.json matches the declared dependencies
    VerifyLock(VerifyLockArgs),
}

#[derive(Args)]
pub struct ShowArgs {
    /// Print the project as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct OptionsArgs {
    /// Target framework (e.g. net45, netstandard1.3)
    #[arg(short, long)]
    pub framework: String,

    /// Configuration name (defaults to the configured one, then Debug)
    #[arg(short, long)]
    pub configuration: Option<String>,

    /// Print the options as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct DepsArgs {
    /// Only show dependencies for this framework (global ones included)
    #[arg(short, long)]
    pub framework: Option<String>,
}

#[derive(Args)]
pub struct VerifyLockArgs {
    /// Lock file to check (defaults to project.lock.json next to the project)
    #[arg(long, value_name = "PATH")]
    pub lockfile: Option<PathBuf>,
}
