// ABOUTME: Schema command implementation - translate source table definitions
// ABOUTME: Prints or applies CREATE TABLE statements derived from the source schema

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::schema::translate_schema;
use crate::store::{PgSource, PgTarget, SourceStore, TargetStore};
use crate::utils::validate_connection_string;

/// Translate source table schemas into target DDL
///
/// Reads each table's column descriptors from the source and emits a
/// `CREATE TABLE` statement with translated types. With `apply` set, the DDL
/// is executed on the target instead of printed.
pub async fn schema(
    source_url: &str,
    target_url: Option<&str>,
    tables: &[String],
    apply: bool,
    settings: &Settings,
) -> Result<()> {
    validate_connection_string(source_url)?;

    tracing::info!("Connecting to source database...");
    let source = PgSource::connect(source_url)
        .await
        .context("Failed to connect to source database")?;

    let target = match (apply, target_url) {
        (true, Some(url)) => {
            validate_connection_string(url)?;
            tracing::info!("Connecting to target database...");
            Some(
                PgTarget::connect(url, settings.pool_size)
                    .await
                    .context("Failed to connect to target database")?,
            )
        }
        (true, None) => anyhow::bail!("--apply requires --target"),
        (false, _) => None,
    };

    for table in tables {
        let descriptor = source
            .fetch_schema(table)
            .await
            .with_context(|| format!("Failed to read schema for '{table}'"))?;
        let ddl = translate_schema(&descriptor)?;

        match &target {
            Some(target) => {
                target
                    .execute_ddl(&ddl)
                    .await
                    .with_context(|| format!("Failed to create '{table}' on target"))?;
                tracing::info!("  ✓ {}: table created on target", table);
            }
            None => {
                println!("{ddl};");
                println!();
            }
        }
    }

    Ok(())
}
