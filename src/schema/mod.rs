// ABOUTME: Schema descriptor types and DDL translation
// ABOUTME: Describes source tables and renders equivalent PostgreSQL definitions

pub mod descriptor;
pub mod translate;

pub use descriptor::{ColumnDescriptor, SchemaDescriptor};
pub use translate::{translate_column_type, translate_schema};
