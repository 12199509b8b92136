//! Shared filesystem helpers for the CLI and TUI.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Gets the cross-platform log file path used while the TUI owns the terminal.
///
/// Returns the path as `{data_local_dir}/docqa/docqa.log` where
/// `data_local_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Local`
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn get_log_path() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("docqa").join("docqa.log"))
}

/// Ensures the parent directory of the log file exists.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_log_directory(log_path: &Path) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    Ok(())
}
