// ABOUTME: Migrate command implementation - batch copy of whole tables
// ABOUTME: Upserts source rows into the target in batches with progress reporting

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::config::Settings;
use crate::engine::BatchMigrator;
use crate::monitor::ResourceMonitor;
use crate::store::{PgSource, PgTarget, SourceStore};
use crate::utils::validate_connection_string;

/// Batch-migrate whole tables from source to target
///
/// For each table this command:
/// 1. Reads the table's schema descriptor from the source
/// 2. Copies all rows in batches, upserting on the primary key
/// 3. Reports per-table success and failure counts
///
/// A failed batch is skipped and counted; the migration continues with the
/// next batch. Connection loss aborts the run.
///
/// # Errors
///
/// Returns an error if a connection string is malformed, a connection cannot
/// be established, a table is unknown, or a table has no primary key.
pub async fn migrate(
    source_url: &str,
    target_url: &str,
    tables: &[String],
    settings: &Settings,
) -> Result<()> {
    validate_connection_string(source_url)?;
    validate_connection_string(target_url)?;

    tracing::info!("Starting batch migration of {} table(s)...", tables.len());
    tracing::info!("Batch size: {} rows", settings.batch_size);
    tracing::info!("");

    tracing::info!("Connecting to source database...");
    let source = PgSource::connect(source_url)
        .await
        .context("Failed to connect to source database")?;

    tracing::info!("Connecting to target database...");
    let target = PgTarget::connect(target_url, settings.pool_size)
        .await
        .context("Failed to connect to target database")?;

    let monitor = ResourceMonitor::start(settings.monitor_interval());
    let migrator = BatchMigrator::new(&source, &target, settings.batch_size);

    let progress = ProgressBar::new(tables.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    let mut failed_tables = 0u64;
    let mut total_failures = 0u64;
    for table in tables {
        progress.set_message(format!("Migrating {table}"));

        let descriptor = source
            .fetch_schema(table)
            .await
            .with_context(|| format!("Failed to read schema for '{table}'"))?;
        let key_column = descriptor.first_primary_key()?.to_string();

        let report = migrator
            .migrate(table, &key_column)
            .await
            .with_context(|| format!("Migration of '{table}' aborted"))?;

        if report.is_success() {
            tracing::info!(
                "  ✓ {}: {} rows in {:.1}s",
                table,
                report.success_count,
                report.duration().num_milliseconds() as f64 / 1000.0
            );
        } else {
            tracing::error!(
                "  ✗ {}: {} of {} rows failed",
                table,
                report.failure_count,
                report.total_rows
            );
            failed_tables += 1;
            total_failures += report.failure_count;
        }
        progress.inc(1);
    }
    progress.finish_with_message("Migration complete");

    match monitor.stop(Duration::from_secs(10)) {
        Ok(summary) => tracing::info!("Resource usage: {summary}"),
        Err(e) => tracing::warn!("Resource monitor did not stop cleanly: {e}"),
    }

    tracing::info!("");
    tracing::info!("========================================");
    tracing::info!("Migration Summary");
    tracing::info!("========================================");
    tracing::info!("Total tables: {}", tables.len());
    tracing::info!("✓ Clean: {}", tables.len() as u64 - failed_tables);
    tracing::info!("✗ With failures: {}", failed_tables);
    tracing::info!("========================================");

    if failed_tables > 0 {
        anyhow::bail!(
            "{} table(s) had {} failed row(s); review the logs above",
            failed_tables,
            total_failures
        );
    }

    tracing::info!("✓ ALL TABLES MIGRATED SUCCESSFULLY!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore]
    async fn test_migrate_command() {
        // Requires live source and target databases with an 'employees' table
        let source_url = std::env::var("TEST_SOURCE_URL").unwrap();
        let target_url = std::env::var("TEST_TARGET_URL").unwrap();

        let settings = Settings::default();
        let result = migrate(
            &source_url,
            &target_url,
            &["employees".to_string()],
            &settings,
        )
        .await;

        match &result {
            Ok(_) => println!("✓ Migrate command completed successfully"),
            Err(e) => println!("Migrate command result: {:?}", e),
        }
    }
}
