// ABOUTME: Backup command implementation - create a custom-format dump artifact
// ABOUTME: Wraps pg_dump; the artifact is what the restore command consumes

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::restore::create_backup;
use crate::utils::{check_required_tools, validate_connection_string};

/// Create a custom-format backup of the source database
///
/// The artifact path defaults to `backup_<timestamp>.dump` in the current
/// directory.
pub async fn backup(source_url: &str, output: Option<PathBuf>) -> Result<()> {
    validate_connection_string(source_url)?;
    check_required_tools()?;

    let artifact = create_backup(source_url, output)
        .await
        .context("Backup failed")?;

    tracing::info!("✓ Backup complete: {}", artifact.display());
    Ok(())
}
