//! Opening a directory in the host file manager.

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use std::path::Path;
use std::process::Command;
use tracing::info;

/// Returns the launcher program for the current platform.
pub const fn opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    }
}

/// Opens `dir` with the platform launcher and waits for it to exit.
pub fn open_directory(dir: &Path) -> Result<()> {
    let program = opener();
    info!(dir = %dir.display(), program, "opening directory");

    let status = Command::new(program)
        .arg(dir)
        .status()
        .with_context(|| format!("failed to run '{program}'"))?;

    // explorer reports a non-zero status even when the window opened
    if !status.success() && !cfg!(target_os = "windows") {
        bail!("'{program}' exited with {status} for {}", dir.display());
    }
    Ok(())
}
