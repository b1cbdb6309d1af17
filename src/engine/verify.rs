// ABOUTME: Row-count reconciliation between source and target stores
// ABOUTME: Coarse parity check, deterministic and side-effect free

use crate::engine::VerifyReport;
use crate::error::Result;
use crate::store::{SourceStore, TargetStore};

/// Compares row counts between the two stores. A mismatch is reported, never
/// auto-repaired; re-running migration or sync is the caller's decision.
pub struct VerificationReconciler<'a> {
    source: &'a dyn SourceStore,
    target: &'a dyn TargetStore,
}

impl<'a> VerificationReconciler<'a> {
    pub fn new(source: &'a dyn SourceStore, target: &'a dyn TargetStore) -> Self {
        Self { source, target }
    }

    pub async fn verify(&self, table: &str) -> Result<VerifyReport> {
        let source_rows = self.source.row_count(table).await?;
        let target_rows = self.target.row_count(table).await?;

        let report = VerifyReport {
            source_rows,
            target_rows,
        };
        if report.is_match() {
            tracing::info!(
                "✓ Row counts match for '{}': {} rows",
                table,
                report.source_rows
            );
        } else {
            tracing::error!(
                "✗ Row count mismatch for '{}': source={}, target={}",
                table,
                report.source_rows,
                report.target_rows
            );
        }
        Ok(report)
    }
}
