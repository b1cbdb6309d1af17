// ABOUTME: Verify command implementation - row count reconciliation
// ABOUTME: Compares source and target row counts per table with bounded parallelism

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Settings;
use crate::engine::VerificationReconciler;
use crate::store::{PgSource, PgTarget};
use crate::utils::validate_connection_string;

/// Verify row counts between source and target databases
///
/// Counts rows on both sides of each table and reports mismatches. This is a
/// count-only reconciliation; matching counts do not prove matching content.
///
/// Up to 4 tables are checked concurrently.
///
/// # Errors
///
/// Returns an error if a connection fails, or if any table's counts do not
/// match after all tables have been checked.
pub async fn verify(
    source_url: &str,
    target_url: &str,
    tables: &[String],
    settings: &Settings,
) -> Result<()> {
    validate_connection_string(source_url)?;
    validate_connection_string(target_url)?;

    tracing::info!("Starting row count verification...");
    tracing::info!("");

    tracing::info!("Connecting to source database...");
    let source = PgSource::connect(source_url)
        .await
        .context("Failed to connect to source database")?;

    tracing::info!("Connecting to target database...");
    let target = PgTarget::connect(target_url, settings.pool_size)
        .await
        .context("Failed to connect to target database")?;

    if tables.is_empty() {
        tracing::warn!("⚠ No tables given to verify");
        return Ok(());
    }

    tracing::info!("Found {} table(s) to verify", tables.len());
    tracing::info!("Using parallel verification (concurrency: 4)");
    tracing::info!("");

    let progress = ProgressBar::new(tables.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    let reconciler = VerificationReconciler::new(&source, &target);
    let results: Vec<_> = stream::iter(tables.iter())
        .map(|table| {
            let reconciler = &reconciler;
            let pb = progress.clone();
            async move {
                let result = reconciler.verify(table).await;
                pb.inc(1);
                pb.set_message(format!("Verified {table}"));
                (table.as_str(), result)
            }
        })
        .buffer_unordered(4)
        .collect()
        .await;

    progress.finish_with_message("Verification complete");
    tracing::info!("");

    let mut matches = 0;
    let mut mismatches = 0;
    for (table, result) in results {
        match result {
            Ok(report) if report.is_match() => {
                tracing::info!("  ✓ {}: Match ({} rows)", table, report.source_rows);
                matches += 1;
            }
            Ok(report) => {
                tracing::error!(
                    "  ✗ {}: MISMATCH: source={}, target={}",
                    table,
                    report.source_rows,
                    report.target_rows
                );
                mismatches += 1;
            }
            Err(e) => {
                tracing::error!("  ✗ ERROR: {}: {}", table, e);
                mismatches += 1;
            }
        }
    }

    tracing::info!("");
    tracing::info!("========================================");
    tracing::info!("Verification Summary");
    tracing::info!("========================================");
    tracing::info!("Total tables: {}", tables.len());
    tracing::info!("✓ Matches: {}", matches);
    tracing::info!("✗ Mismatches: {}", mismatches);
    tracing::info!("========================================");

    if mismatches > 0 {
        anyhow::bail!("{} table(s) failed verification", mismatches);
    }

    tracing::info!("✓ ALL TABLES VERIFIED SUCCESSFULLY!");
    Ok(())
}
