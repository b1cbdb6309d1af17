// ABOUTME: Sync command implementation - one incremental sync pass
// ABOUTME: Applies rows newer than the target's watermark, or falls back to a full copy

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::engine::IncrementalSyncer;
use crate::store::{PgSource, PgTarget};
use crate::utils::validate_connection_string;

/// Run one incremental sync cycle for the given tables
///
/// The watermark is the target's `MAX(timestamp_column)`; only strictly newer
/// source rows are applied. A table with no watermark (empty target) falls
/// back to a full batch migration.
pub async fn sync(
    source_url: &str,
    target_url: &str,
    tables: &[String],
    ts_column: &str,
    settings: &Settings,
) -> Result<()> {
    validate_connection_string(source_url)?;
    validate_connection_string(target_url)?;

    tracing::info!("Starting incremental sync of {} table(s)...", tables.len());

    tracing::info!("Connecting to source database...");
    let source = PgSource::connect(source_url)
        .await
        .context("Failed to connect to source database")?;

    tracing::info!("Connecting to target database...");
    let target = PgTarget::connect(target_url, settings.pool_size)
        .await
        .context("Failed to connect to target database")?;

    let syncer = IncrementalSyncer::new(&source, &target, settings.batch_size);

    let mut skipped_total = 0u64;
    for table in tables {
        let report = syncer
            .sync(table, ts_column)
            .await
            .with_context(|| format!("Sync of '{table}' aborted"))?;

        if report.was_full_sync() {
            tracing::info!(
                "  ✓ {}: no watermark, full sync applied {} row(s)",
                table,
                report.rows_applied
            );
        } else {
            tracing::info!(
                "  ✓ {}: {} row(s) applied, {} skipped (watermark {:?})",
                table,
                report.rows_applied,
                report.rows_skipped,
                report.watermark
            );
        }
        skipped_total += report.rows_skipped;
    }

    if skipped_total > 0 {
        anyhow::bail!("{skipped_total} row(s) failed to apply; review the logs above");
    }

    tracing::info!("✓ Sync complete");
    Ok(())
}
