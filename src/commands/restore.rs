// ABOUTME: Restore command implementation - section-ordered restore of a dump artifact
// ABOUTME: Supports resuming after a crash and full clean-then-restore runs

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::restore::{
    PgRestoreTool, RestoreOutcome, Section, SectionState, SectionedRestoreController,
};
use crate::utils::{check_required_tools, validate_connection_string};

/// Restore a backup artifact into the target, one archive section at a time
///
/// Sections run in order: pre-data, data, post-data. A section failure stops
/// the run; later sections are not attempted. `resume_from` skips sections
/// already confirmed complete, and `full` cleans the target before starting.
pub async fn restore(
    artifact: PathBuf,
    target_url: &str,
    resume_from: Option<Section>,
    full: bool,
) -> Result<()> {
    validate_connection_string(target_url)?;
    check_required_tools()?;

    if full && resume_from.is_some() {
        anyhow::bail!("--full and --resume-from are mutually exclusive");
    }

    let tool = PgRestoreTool::open(&artifact, target_url)
        .with_context(|| format!("Cannot open backup artifact {}", artifact.display()))?;
    let controller = SectionedRestoreController::new(&tool);

    tracing::info!("Restoring {} into target...", artifact.display());
    let report = if full {
        tracing::info!("Full restore requested, cleaning target first");
        controller.run_full().await?
    } else if let Some(section) = resume_from {
        tracing::info!("Resuming restore from section '{section}'");
        controller.resume_from(section).await?
    } else {
        controller.run().await?
    };

    tracing::info!("");
    for (section, state) in &report.sections {
        match state {
            SectionState::Succeeded => tracing::info!("  ✓ {section}: done"),
            SectionState::Failed => tracing::error!("  ✗ {section}: failed"),
            SectionState::Pending => tracing::warn!("  - {section}: not attempted"),
            SectionState::InProgress => tracing::warn!("  ? {section}: interrupted"),
        }
    }

    match report.outcome {
        RestoreOutcome::Completed => {
            tracing::info!("✓ Restore complete");
            Ok(())
        }
        RestoreOutcome::Failed(section) => {
            tracing::error!(
                "Restore failed in section '{section}'. After fixing the cause, \
                 rerun with --resume-from {section}"
            );
            anyhow::bail!("restore failed in section '{section}'");
        }
    }
}
