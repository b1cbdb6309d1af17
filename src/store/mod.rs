// ABOUTME: Store trait seams and implementations for source and target
// ABOUTME: Exports typed values, the PostgreSQL impls, and the in-memory test double

pub mod memory;
pub mod postgres;
pub mod value;

pub use memory::{MemorySource, MemoryTarget};
pub use postgres::{PgSource, PgTarget};
pub use value::{Row, RowSet, Value};

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::Result;
use crate::schema::SchemaDescriptor;

/// Read side of a migration: a store with catalog metadata and a
/// forward-only row fetch. Implementations serialize access internally
/// (one cursor at a time).
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Fetch the column descriptor for a table from catalog metadata.
    ///
    /// This is also the table allow-list check: unknown tables error here
    /// before any dynamic SQL is built from the name.
    async fn fetch_schema(&self, table: &str) -> Result<SchemaDescriptor>;

    /// Fetch the complete row set in storage order, single pass.
    async fn fetch_all(&self, table: &str, columns: &[String]) -> Result<RowSet>;

    /// Fetch rows with `ts_column` strictly greater than the watermark.
    async fn fetch_changed(
        &self,
        table: &str,
        columns: &[String],
        ts_column: &str,
        watermark: NaiveDateTime,
    ) -> Result<RowSet>;

    async fn row_count(&self, table: &str) -> Result<i64>;
}

/// Write side of a migration: transactional batched upserts against a
/// pooled store.
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Upsert a batch of rows inside one transaction.
    ///
    /// All-or-nothing: if any statement fails, the transaction is rolled
    /// back and the error describes the whole batch. Rows whose key already
    /// exists are rewritten unconditionally.
    async fn upsert_batch(
        &self,
        table: &str,
        key_column: &str,
        columns: &[String],
        rows: &[Row],
    ) -> Result<()>;

    /// Upsert a single row, autocommitted.
    async fn upsert_row(
        &self,
        table: &str,
        key_column: &str,
        columns: &[String],
        row: &Row,
    ) -> Result<()>;

    /// Highest value of a timestamp column, or None for an empty table.
    /// This derived value is the sync watermark; it is never stored apart
    /// from the data itself.
    async fn max_timestamp(&self, table: &str, ts_column: &str) -> Result<Option<NaiveDateTime>>;

    async fn row_count(&self, table: &str) -> Result<i64>;

    /// Execute a DDL statement (CREATE TABLE etc.).
    async fn execute_ddl(&self, sql: &str) -> Result<()>;
}
