// ABOUTME: Watch command implementation - continuous scheduled incremental sync
// ABOUTME: Runs sync cycles on an interval until Ctrl-C, draining the in-flight cycle

use anyhow::{Context, Result};
use tokio::sync::watch as watch_channel;

use crate::config::Settings;
use crate::engine::{IncrementalSyncer, SyncScheduler};
use crate::store::{PgSource, PgTarget};
use crate::utils::validate_connection_string;

/// Continuously sync the given tables on a fixed interval
///
/// The first cycle runs immediately on startup. Ctrl-C requests shutdown;
/// the cycle in flight finishes before the loop exits, so a table is never
/// left mid-application.
pub async fn watch(
    source_url: &str,
    target_url: &str,
    tables: &[String],
    ts_column: &str,
    settings: &Settings,
) -> Result<()> {
    validate_connection_string(source_url)?;
    validate_connection_string(target_url)?;

    tracing::info!("Connecting to source database...");
    let source = PgSource::connect(source_url)
        .await
        .context("Failed to connect to source database")?;

    tracing::info!("Connecting to target database...");
    let target = PgTarget::connect(target_url, settings.pool_size)
        .await
        .context("Failed to connect to target database")?;

    let syncer = IncrementalSyncer::new(&source, &target, settings.batch_size);
    let pairs: Vec<(String, String)> = tables
        .iter()
        .map(|t| (t.clone(), ts_column.to_string()))
        .collect();
    let scheduler = SyncScheduler::new(settings.sync_interval(), pairs);

    let (shutdown_tx, shutdown_rx) = watch_channel::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested, finishing current cycle...");
            let _ = shutdown_tx.send(true);
        }
    });

    tracing::info!(
        "Watching {} table(s), syncing every {}s (Ctrl-C to stop)",
        tables.len(),
        settings.sync_interval_secs
    );

    scheduler.run(&syncer, shutdown_rx).await?;

    tracing::info!("✓ Watch stopped cleanly");
    Ok(())
}
