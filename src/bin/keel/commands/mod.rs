//! Command implementations

pub mod deps;
pub mod options;
pub mod show;
pub mod verify_lock;

use anyhow::{Context, Result};

use keel::FrameworkName;

/// Parse a framework given on the command line.
pub fn parse_framework(name: &str) -> Result<FrameworkName> {
    name.parse::<FrameworkName>()
        .with_context(|| format!("invalid --framework value `{}`", name))
}
