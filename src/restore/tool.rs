// ABOUTME: External restore capability seam and its pg_restore/pg_dump implementation
// ABOUTME: Sections are restored with clean/if-exists semantics for idempotent re-application

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Error, Result};
use crate::restore::Section;

const INSTALL_HINT: &str = "Is the PostgreSQL client installed?\n\
     Install with:\n\
     - Ubuntu/Debian: sudo apt-get install postgresql-client\n\
     - macOS: brew install postgresql\n\
     - RHEL/CentOS: sudo yum install postgresql";

/// The external restore capability: an opaque backup artifact exposing an
/// ordered set of named sections and a per-section restore operation.
///
/// Implementations must make section restore idempotent (clean/if-exists
/// semantics): re-running an already-succeeded section must not corrupt
/// state.
#[async_trait]
pub trait SectionRestore: Send + Sync {
    /// The artifact's sections in restore order.
    fn list_sections(&self) -> Vec<Section>;

    /// Restore one section into the target database. Failure is reported as
    /// [`Error::Section`] naming the section.
    async fn restore_section(&self, section: Section) -> Result<()>;

    /// Drop and recreate the target's contents ahead of a full restore.
    async fn clean_target(&self) -> Result<()>;
}

/// `pg_restore` wrapper over a custom-format dump file.
pub struct PgRestoreTool {
    artifact: PathBuf,
    target_url: String,
}

impl PgRestoreTool {
    /// Open an artifact for restoring into `target_url`.
    ///
    /// Verifies the client tools are present and that `pg_restore --list`
    /// can read the artifact's table of contents.
    pub fn open(artifact: impl Into<PathBuf>, target_url: impl Into<String>) -> Result<Self> {
        let artifact = artifact.into();

        for tool in ["pg_restore", "psql"] {
            which::which(tool)
                .map_err(|_| Error::Tool(format!("'{tool}' not found in PATH. {INSTALL_HINT}")))?;
        }

        if !artifact.exists() {
            return Err(Error::ArtifactMissing(artifact));
        }

        let output = Command::new("pg_restore")
            .arg("--list")
            .arg(&artifact)
            .output()
            .map_err(|e| Error::Tool(format!("failed to execute pg_restore: {e}")))?;
        if !output.status.success() {
            return Err(Error::Tool(format!(
                "pg_restore cannot read '{}': {}",
                artifact.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(Self {
            artifact,
            target_url: target_url.into(),
        })
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }
}

#[async_trait]
impl SectionRestore for PgRestoreTool {
    fn list_sections(&self) -> Vec<Section> {
        // Custom-format dumps always carry the three archive sections.
        Section::ALL.to_vec()
    }

    async fn restore_section(&self, section: Section) -> Result<()> {
        tracing::info!(
            "Running pg_restore --section={} on {}",
            section,
            self.artifact.display()
        );

        let output = Command::new("pg_restore")
            .arg(format!("--dbname={}", self.target_url))
            .arg(format!("--section={}", section))
            .arg("--clean")
            .arg("--if-exists")
            .arg("--no-owner")
            .arg("--exit-on-error")
            .arg(&self.artifact)
            .stdout(Stdio::null())
            .output()
            .map_err(|e| Error::Tool(format!("failed to execute pg_restore: {e}")))?;

        if !output.status.success() {
            return Err(Error::section(
                section,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }

    async fn clean_target(&self) -> Result<()> {
        let output = Command::new("psql")
            .arg(format!("--dbname={}", self.target_url))
            .arg("--quiet")
            .arg("--command")
            .arg("DROP SCHEMA IF EXISTS public CASCADE")
            .arg("--command")
            .arg("CREATE SCHEMA public")
            .output()
            .map_err(|e| Error::Tool(format!("failed to execute psql: {e}")))?;

        if !output.status.success() {
            return Err(Error::Tool(format!(
                "cleaning target failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

/// Create a custom-format backup of a database with `pg_dump`, returning the
/// artifact path. The default filename is timestamped.
pub async fn create_backup(source_url: &str, output: Option<PathBuf>) -> Result<PathBuf> {
    which::which("pg_dump")
        .map_err(|_| Error::Tool(format!("'pg_dump' not found in PATH. {INSTALL_HINT}")))?;

    let output_path = output.unwrap_or_else(|| {
        PathBuf::from(format!("backup_{}.dump", Utc::now().format("%Y%m%d_%H%M%S")))
    });

    tracing::info!("Creating backup artifact {}", output_path.display());
    let result = Command::new("pg_dump")
        .arg(format!("--dbname={source_url}"))
        .arg("--format=custom")
        .arg(format!("--file={}", output_path.display()))
        .output()
        .map_err(|e| Error::Tool(format!("failed to execute pg_dump: {e}")))?;

    if !result.status.success() {
        return Err(Error::Tool(format!(
            "pg_dump failed: {}",
            String::from_utf8_lossy(&result.stderr).trim()
        )));
    }

    tracing::info!("✓ Backup created: {}", output_path.display());
    Ok(output_path)
}
