// ABOUTME: Structured outcome types for migration, sync, and verification runs
// ABOUTME: Per-batch and per-row failures accumulate into counts, not exceptions

use chrono::{DateTime, Utc};

/// Outcome of one full-table migration run.
///
/// Invariant: `success_count + failure_count == total_rows`. Partial failure
/// is a valid terminal outcome; a run is successful iff no row failed. An
/// empty source yields an all-zero report and counts as a no-op success.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    pub table: String,
    pub total_rows: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl MigrationReport {
    pub fn is_success(&self) -> bool {
        self.failure_count == 0
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Outcome of one incremental sync cycle.
///
/// Row-level failures are counted and skipped, never aborting the cycle;
/// the cycle itself only fails on connection-level errors (reported as an
/// `Err`, not through this struct).
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub table: String,
    /// Rows selected past the watermark and applied.
    pub rows_applied: u64,
    /// Rows selected but skipped after a statement failure.
    pub rows_skipped: u64,
    /// Set when an absent watermark forced a full sync instead.
    pub full_sync: Option<MigrationReport>,
    /// Watermark the cycle started from, if any.
    pub watermark: Option<chrono::NaiveDateTime>,
}

impl SyncReport {
    pub fn was_full_sync(&self) -> bool {
        self.full_sync.is_some()
    }
}

/// Row-count reconciliation between source and target for one table.
/// Coarse by design: detects missing or extra rows, not value divergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyReport {
    pub source_rows: i64,
    pub target_rows: i64,
}

impl VerifyReport {
    pub fn is_match(&self) -> bool {
        self.source_rows == self.target_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_success_means_zero_failures() {
        let now = Utc::now();
        let report = MigrationReport {
            table: "employees".into(),
            total_rows: 10,
            success_count: 8,
            failure_count: 2,
            started_at: now,
            finished_at: now,
        };
        assert!(!report.is_success());
        assert_eq!(report.success_count + report.failure_count, report.total_rows);
    }

    #[test]
    fn verify_matches_only_on_equal_counts() {
        assert!(VerifyReport { source_rows: 0, target_rows: 0 }.is_match());
        assert!(!VerifyReport { source_rows: 3, target_rows: 2 }.is_match());
    }
}
