// ABOUTME: Staging directory transfer between machines
// ABOUTME: Thin rsync wrapper used by the sync command

use crate::process::ProcessInvoker;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Pull a remote staging directory to a local one with rsync.
///
/// `--delete` keeps the local copy an exact mirror, so files from an earlier
/// dump of a table that no longer exists do not survive into the import.
pub async fn pull_staging<I: ProcessInvoker>(
    invoker: &I,
    remote_host: &str,
    remote_dir: &Path,
    local_dir: &Path,
) -> Result<()> {
    fs::create_dir_all(local_dir).with_context(|| {
        format!(
            "Failed to create local transfer directory {}",
            local_dir.display()
        )
    })?;

    let command = format!(
        "rsync -az --delete {}:{}/ {}/",
        remote_host,
        remote_dir.display(),
        local_dir.display()
    );

    tracing::info!(
        "Transferring dump files from {}:{}",
        remote_host,
        remote_dir.display()
    );

    let output = invoker.execute(&command).await?;
    if !output.success {
        bail!(
            "rsync from {} failed: {}",
            remote_host,
            output.stderr.trim()
        );
    }

    tracing::info!("✓ Transfer complete: {}", local_dir.display());
    Ok(())
}
