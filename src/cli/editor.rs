//! Launching the user's editor

use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, bail, Context, Result};

/// Runs `command` on `path` and waits for it to exit
///
/// The command may carry arguments (`code --wait`); the path is appended.
pub fn run_editor(command: &str, path: &Path) -> Result<()> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| anyhow!("Editor command is empty"))?;

    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to launch editor '{}'", command))?;

    if !status.success() {
        bail!("Editor '{}' exited with {}", command, status);
    }

    Ok(())
}
