// ABOUTME: Error types for the replication library
// ABOUTME: Distinguishes fatal connection errors from recoverable statement/section failures

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::restore::Section;

/// Error type for all library operations.
///
/// The engine converts recoverable failures (`Statement`, and section
/// failures inside the restore controller) into structured outcomes with
/// counts and states; only connection-level errors propagate out of a run.
#[derive(Error, Debug)]
pub enum Error {
    /// Cannot reach the source or target store at all. Aborts the current
    /// run or sync cycle.
    #[error("connection error: {0}")]
    Connection(String),

    /// A single SQL statement failed but the connection is still usable.
    /// Callers at batch/row boundaries count these, they never abort a run.
    #[error("statement failed: {0}")]
    Statement(String),

    /// Schema descriptor for a table contained no columns.
    #[error("schema for table '{0}' has no columns")]
    SchemaEmpty(String),

    /// Full-sync fallback requires a primary key to upsert against.
    #[error("table '{0}' has no primary key column")]
    NoPrimaryKey(String),

    /// Table name not present in the source catalog (identifier allow-list).
    #[error("unknown table: '{0}'")]
    UnknownTable(String),

    /// Column name not present in the table's descriptor.
    #[error("unknown column '{column}' on table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// A restore section failed. The state machine halts here; the caller
    /// resumes later starting at this section.
    #[error("restore of section '{section}' failed: {message}")]
    Section { section: Section, message: String },

    /// Backup artifact path does not exist or is not readable.
    #[error("backup artifact not found: {0}")]
    ArtifactMissing(PathBuf),

    /// The external dump/restore tool could not be executed.
    #[error("restore tool error: {0}")]
    Tool(String),

    /// The resource sampler thread did not stop within the allowed time.
    #[error("monitor thread did not stop within {0:?}")]
    MonitorTimeout(Duration),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a Section error.
    pub fn section(section: Section, message: impl Into<String>) -> Self {
        Error::Section {
            section,
            message: message.into(),
        }
    }

    /// True for errors that abort a whole run rather than one batch or row.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Statement(_))
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_errors_are_recoverable() {
        assert!(!Error::Statement("duplicate key".into()).is_fatal());
        assert!(Error::Connection("refused".into()).is_fatal());
        assert!(Error::section(Section::Data, "constraint violation").is_fatal());
    }

    #[test]
    fn section_error_names_the_section() {
        let err = Error::section(Section::PostData, "index build failed");
        assert_eq!(
            err.to_string(),
            "restore of section 'post-data' failed: index build failed"
        );
    }
}
