// ABOUTME: Full-table batch migration with per-batch failure isolation
// ABOUTME: Fetches source rows once, upserts in transactional batches, accumulates counts

use chrono::Utc;

use crate::engine::MigrationReport;
use crate::error::{Error, Result};
use crate::store::{SourceStore, TargetStore};

/// Full-table copy: fetch everything from the source in one pass, partition
/// into batches, upsert each batch in its own transaction on the target.
///
/// A failed batch is rolled back by the store, counted entirely as failures,
/// and the run continues with the next batch. Only connection-level errors
/// abort the run.
pub struct BatchMigrator<'a> {
    source: &'a dyn SourceStore,
    target: &'a dyn TargetStore,
    batch_size: usize,
}

impl<'a> BatchMigrator<'a> {
    pub fn new(source: &'a dyn SourceStore, target: &'a dyn TargetStore, batch_size: usize) -> Self {
        debug_assert!(batch_size > 0);
        Self {
            source,
            target,
            batch_size: batch_size.max(1),
        }
    }

    /// Migrate one table, upserting by `key_column`.
    ///
    /// Rows whose key already exists are rewritten unconditionally; the
    /// upsert is not change-detecting, which makes re-running safe.
    pub async fn migrate(&self, table: &str, key_column: &str) -> Result<MigrationReport> {
        let started_at = Utc::now();

        let descriptor = self.source.fetch_schema(table).await?;
        descriptor.require_column(key_column)?;
        let columns = descriptor.column_names();

        tracing::info!("Fetching rows from source table '{}'...", table);
        let rowset = self.source.fetch_all(table, &columns).await?;

        if rowset.is_empty() {
            tracing::info!("Source table '{}' is empty, nothing to migrate", table);
            return Ok(MigrationReport {
                table: table.to_string(),
                total_rows: 0,
                success_count: 0,
                failure_count: 0,
                started_at,
                finished_at: Utc::now(),
            });
        }

        let total_rows = rowset.len() as u64;
        let batch_count = rowset.rows.len().div_ceil(self.batch_size);
        tracing::info!(
            "Migrating {} rows from '{}' in {} batches of up to {}",
            total_rows,
            table,
            batch_count,
            self.batch_size
        );

        let mut success_count = 0u64;
        let mut failure_count = 0u64;

        for (batch_no, batch) in rowset.rows.chunks(self.batch_size).enumerate() {
            match self
                .target
                .upsert_batch(table, key_column, &columns, batch)
                .await
            {
                Ok(()) => {
                    success_count += batch.len() as u64;
                    tracing::debug!(
                        "✓ Batch {}/{} ({} rows) committed",
                        batch_no + 1,
                        batch_count,
                        batch.len()
                    );
                }
                Err(Error::Statement(msg)) => {
                    // The store rolled the whole batch back; count it as
                    // failed and keep going.
                    failure_count += batch.len() as u64;
                    tracing::error!(
                        "✗ Batch {}/{} ({} rows) rolled back: {}",
                        batch_no + 1,
                        batch_count,
                        batch.len(),
                        msg
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let report = MigrationReport {
            table: table.to_string(),
            total_rows,
            success_count,
            failure_count,
            started_at,
            finished_at: Utc::now(),
        };
        tracing::info!(
            "Migration of '{}' completed: {} successful, {} failed",
            table,
            report.success_count,
            report.failure_count
        );
        Ok(report)
    }
}
