// ABOUTME: Table schema descriptors fetched once from source catalog metadata
// ABOUTME: Serves as the identifier allow-list for dynamic SQL construction

use crate::error::{Error, Result};

/// One column of a source table, as reported by the source catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Source type name, e.g. "varchar", "numeric", "datetime".
    pub source_type: String,
    /// Declared length for character/binary kinds, 0 when not applicable.
    pub length: i32,
    /// Precision for decimal kinds, 0 when not applicable.
    pub precision: i32,
    /// Scale for decimal kinds, 0 when not applicable.
    pub scale: i32,
    pub nullable: bool,
    pub primary_key: bool,
}

/// Ordered column list for one table, fetched once per run and passed through
/// as data. Engine code never re-queries catalog metadata mid-operation.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    pub table: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl SchemaDescriptor {
    pub fn new(table: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// First primary-key column, used when a caller does not name one.
    pub fn first_primary_key(&self) -> Result<&str> {
        self.primary_key_columns()
            .first()
            .copied()
            .ok_or_else(|| Error::NoPrimaryKey(self.table.clone()))
    }

    /// Validate a column name against the descriptor before it is ever
    /// interpolated into SQL. This is the allow-list check: only names the
    /// source catalog reported are accepted.
    pub fn require_column(&self, name: &str) -> Result<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::UnknownColumn {
                table: self.table.clone(),
                column: name.to_string(),
            })
    }
}

#[cfg(test)]
pub(crate) fn employees_descriptor() -> SchemaDescriptor {
    SchemaDescriptor::new(
        "employees",
        vec![
            ColumnDescriptor {
                name: "id".into(),
                source_type: "int".into(),
                length: 4,
                precision: 0,
                scale: 0,
                nullable: false,
                primary_key: true,
            },
            ColumnDescriptor {
                name: "name".into(),
                source_type: "varchar".into(),
                length: 100,
                precision: 0,
                scale: 0,
                nullable: true,
                primary_key: false,
            },
            ColumnDescriptor {
                name: "dept".into(),
                source_type: "varchar".into(),
                length: 50,
                precision: 0,
                scale: 0,
                nullable: true,
                primary_key: false,
            },
            ColumnDescriptor {
                name: "salary".into(),
                source_type: "numeric".into(),
                length: 0,
                precision: 10,
                scale: 2,
                nullable: true,
                primary_key: false,
            },
            ColumnDescriptor {
                name: "updated_at".into(),
                source_type: "datetime".into(),
                length: 0,
                precision: 0,
                scale: 0,
                nullable: true,
                primary_key: false,
            },
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_column_accepts_known_names() {
        let desc = employees_descriptor();
        assert!(desc.require_column("updated_at").is_ok());
        assert_eq!(desc.first_primary_key().unwrap(), "id");
    }

    #[test]
    fn require_column_rejects_unknown_names() {
        let desc = employees_descriptor();
        let err = desc.require_column("name; DROP TABLE employees").unwrap_err();
        assert!(matches!(err, Error::UnknownColumn { .. }));
    }

    #[test]
    fn first_primary_key_errors_without_pk() {
        let desc = SchemaDescriptor::new(
            "log",
            vec![ColumnDescriptor {
                name: "line".into(),
                source_type: "text".into(),
                length: 0,
                precision: 0,
                scale: 0,
                nullable: true,
                primary_key: false,
            }],
        );
        assert!(matches!(
            desc.first_primary_key(),
            Err(Error::NoPrimaryKey(_))
        ));
    }
}
