// ABOUTME: Static source-to-PostgreSQL type mapping and CREATE TABLE rendering
// ABOUTME: Pure functions over a SchemaDescriptor, no catalog access

use crate::error::{Error, Result};
use crate::schema::{ColumnDescriptor, SchemaDescriptor};
use crate::store::postgres::quote_ident;

/// Map a source column type to its PostgreSQL DDL type.
///
/// Unmapped source types fall back to unbounded TEXT rather than failing;
/// migration should degrade to a lossy-but-working column, not stop.
pub fn translate_column_type(col: &ColumnDescriptor) -> String {
    match col.source_type.to_lowercase().as_str() {
        "int" | "integer" => "INTEGER".to_string(),
        "smallint" => "SMALLINT".to_string(),
        "tinyint" => "SMALLINT".to_string(),
        "bigint" => "BIGINT".to_string(),
        "decimal" | "numeric" => format!("NUMERIC({},{})", col.precision, col.scale),
        "real" => "REAL".to_string(),
        "money" => "NUMERIC(19,4)".to_string(),
        "smallmoney" => "NUMERIC(10,4)".to_string(),
        "float" | "double precision" => "DOUBLE PRECISION".to_string(),
        "char" | "nchar" | "character" => format!("CHAR({})", col.length),
        "varchar" | "nvarchar" | "character varying" => format!("VARCHAR({})", col.length),
        "text" | "ntext" => "TEXT".to_string(),
        "binary" | "varbinary" | "image" | "bytea" => "BYTEA".to_string(),
        "bit" | "boolean" => "BOOLEAN".to_string(),
        "datetime" | "smalldatetime" | "timestamp" | "timestamp without time zone" => {
            "TIMESTAMP".to_string()
        }
        "date" => "DATE".to_string(),
        "time" => "TIME".to_string(),
        _ => "TEXT".to_string(),
    }
}

/// Render a full CREATE TABLE statement for the target.
///
/// Column order follows the descriptor. Primary-key columns are collected
/// into a single composite `PRIMARY KEY(...)` constraint appended after the
/// column definitions.
pub fn translate_schema(desc: &SchemaDescriptor) -> Result<String> {
    if desc.columns.is_empty() {
        return Err(Error::SchemaEmpty(desc.table.clone()));
    }

    let mut definitions: Vec<String> = Vec::with_capacity(desc.columns.len() + 1);
    let mut primary_keys: Vec<String> = Vec::new();

    for col in &desc.columns {
        let mut def = format!("{} {}", quote_ident(&col.name), translate_column_type(col));
        if !col.nullable {
            def.push_str(" NOT NULL");
        }
        definitions.push(def);

        if col.primary_key {
            primary_keys.push(quote_ident(&col.name));
        }
    }

    if !primary_keys.is_empty() {
        definitions.push(format!("PRIMARY KEY ({})", primary_keys.join(", ")));
    }

    Ok(format!(
        "CREATE TABLE {} (\n    {}\n)",
        quote_ident(&desc.table),
        definitions.join(",\n    ")
    ))
}
