// ABOUTME: In-memory SourceStore/TargetStore used by engine tests and demos
// ABOUTME: Supports fault injection for batch-failure and connection-loss paths

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::{Error, Result};
use crate::schema::SchemaDescriptor;
use crate::store::{Row, RowSet, SourceStore, TargetStore, Value};

fn key_repr(value: &Value) -> String {
    format!("{value:?}")
}

/// In-memory source: one table described by a SchemaDescriptor.
pub struct MemorySource {
    descriptor: SchemaDescriptor,
    rows: Mutex<Vec<Row>>,
    connected: AtomicBool,
}

impl MemorySource {
    pub fn new(descriptor: SchemaDescriptor, rows: Vec<Row>) -> Self {
        Self {
            descriptor,
            rows: Mutex::new(rows),
            connected: AtomicBool::new(true),
        }
    }

    /// Append a row, as if the source system wrote it.
    pub fn push_row(&self, row: Row) {
        self.rows.lock().unwrap().push(row);
    }

    /// Replace the row whose key column (position 0) matches, simulating an
    /// update on the source.
    pub fn replace_row(&self, row: Row) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows.iter_mut().find(|r| key_repr(&r[0]) == key_repr(&row[0])) {
            *existing = row;
        } else {
            rows.push(row);
        }
    }

    /// Simulate losing the connection: every later call fails fatally.
    pub fn fail_connection(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    fn check_connected(&self) -> Result<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::Connection("source connection lost".into()))
        }
    }

    fn check_table(&self, table: &str) -> Result<()> {
        if table == self.descriptor.table {
            Ok(())
        } else {
            Err(Error::UnknownTable(table.to_string()))
        }
    }

    fn project(&self, columns: &[String], rows: &[Row]) -> Result<RowSet> {
        let mut indices = Vec::with_capacity(columns.len());
        for name in columns {
            self.descriptor.require_column(name)?;
            indices.push(
                self.descriptor
                    .columns
                    .iter()
                    .position(|c| &c.name == name)
                    .expect("validated column"),
            );
        }
        let mut out = RowSet::new(columns.to_vec());
        for row in rows {
            out.rows.push(indices.iter().map(|&i| row[i].clone()).collect());
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceStore for MemorySource {
    async fn fetch_schema(&self, table: &str) -> Result<SchemaDescriptor> {
        self.check_connected()?;
        self.check_table(table)?;
        Ok(self.descriptor.clone())
    }

    async fn fetch_all(&self, table: &str, columns: &[String]) -> Result<RowSet> {
        self.check_connected()?;
        self.check_table(table)?;
        let rows = self.rows.lock().unwrap().clone();
        self.project(columns, &rows)
    }

    async fn fetch_changed(
        &self,
        table: &str,
        columns: &[String],
        ts_column: &str,
        watermark: NaiveDateTime,
    ) -> Result<RowSet> {
        self.check_connected()?;
        self.check_table(table)?;
        let ts_idx = self
            .descriptor
            .columns
            .iter()
            .position(|c| c.name == ts_column)
            .ok_or_else(|| Error::UnknownColumn {
                table: table.to_string(),
                column: ts_column.to_string(),
            })?;
        let rows: Vec<Row> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| match r[ts_idx].as_timestamp() {
                Some(ts) => ts > watermark,
                None => false,
            })
            .cloned()
            .collect();
        self.project(columns, &rows)
    }

    async fn row_count(&self, table: &str) -> Result<i64> {
        self.check_connected()?;
        self.check_table(table)?;
        Ok(self.rows.lock().unwrap().len() as i64)
    }
}

struct MemoryTable {
    columns: Vec<String>,
    // Insertion-ordered (key, row) pairs; upserts rewrite in place.
    rows: Vec<(String, Row)>,
}

/// In-memory target with transactional batch semantics: a batch containing
/// any poisoned key applies nothing.
pub struct MemoryTarget {
    tables: Mutex<HashMap<String, MemoryTable>>,
    fail_keys: Mutex<HashSet<String>>,
    connected: AtomicBool,
    ddl_log: Mutex<Vec<String>>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            fail_keys: Mutex::new(HashSet::new()),
            connected: AtomicBool::new(true),
            ddl_log: Mutex::new(Vec::new()),
        }
    }

    /// Poison a key: any upsert of a row with this key value (in the key
    /// column) fails as a statement error, like a constraint violation.
    pub fn fail_key(&self, key: &Value) {
        self.fail_keys.lock().unwrap().insert(key_repr(key));
    }

    pub fn clear_failures(&self) {
        self.fail_keys.lock().unwrap().clear();
    }

    pub fn fail_connection(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Snapshot of a table's rows in insertion order, for assertions.
    pub fn table_rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .map(|t| t.rows.iter().map(|(_, r)| r.clone()).collect())
            .unwrap_or_default()
    }

    pub fn ddl_statements(&self) -> Vec<String> {
        self.ddl_log.lock().unwrap().clone()
    }

    fn check_connected(&self) -> Result<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::Connection("target connection lost".into()))
        }
    }

    fn apply_rows(
        &self,
        table: &str,
        key_column: &str,
        columns: &[String],
        rows: &[Row],
    ) -> Result<()> {
        let key_idx = columns
            .iter()
            .position(|c| c == key_column)
            .ok_or_else(|| Error::UnknownColumn {
                table: table.to_string(),
                column: key_column.to_string(),
            })?;

        // Simulated transaction: validate every row before touching state.
        {
            let fail_keys = self.fail_keys.lock().unwrap();
            for row in rows {
                if fail_keys.contains(&key_repr(&row[key_idx])) {
                    return Err(Error::Statement(format!(
                        "constraint violation on {}.{} for key {:?}",
                        table, key_column, row[key_idx]
                    )));
                }
            }
        }

        let mut tables = self.tables.lock().unwrap();
        let entry = tables.entry(table.to_string()).or_insert_with(|| MemoryTable {
            columns: columns.to_vec(),
            rows: Vec::new(),
        });
        for row in rows {
            let key = key_repr(&row[key_idx]);
            if let Some(existing) = entry.rows.iter_mut().find(|(k, _)| *k == key) {
                existing.1 = row.clone();
            } else {
                entry.rows.push((key, row.clone()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TargetStore for MemoryTarget {
    async fn upsert_batch(
        &self,
        table: &str,
        key_column: &str,
        columns: &[String],
        rows: &[Row],
    ) -> Result<()> {
        self.check_connected()?;
        self.apply_rows(table, key_column, columns, rows)
    }

    async fn upsert_row(
        &self,
        table: &str,
        key_column: &str,
        columns: &[String],
        row: &Row,
    ) -> Result<()> {
        self.check_connected()?;
        self.apply_rows(table, key_column, columns, std::slice::from_ref(row))
    }

    async fn max_timestamp(&self, table: &str, ts_column: &str) -> Result<Option<NaiveDateTime>> {
        self.check_connected()?;
        let tables = self.tables.lock().unwrap();
        let Some(t) = tables.get(table) else {
            return Ok(None);
        };
        let Some(idx) = t.columns.iter().position(|c| c == ts_column) else {
            return Err(Error::UnknownColumn {
                table: table.to_string(),
                column: ts_column.to_string(),
            });
        };
        Ok(t.rows
            .iter()
            .filter_map(|(_, r)| r[idx].as_timestamp())
            .max())
    }

    async fn row_count(&self, table: &str) -> Result<i64> {
        self.check_connected()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .get(table)
            .map(|t| t.rows.len() as i64)
            .unwrap_or(0))
    }

    async fn execute_ddl(&self, sql: &str) -> Result<()> {
        self.check_connected()?;
        self.ddl_log.lock().unwrap().push(sql.to_string());
        Ok(())
    }
}

impl Default for MemoryTarget {
    fn default() -> Self {
        Self::new()
    }
}
