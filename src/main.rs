// ABOUTME: CLI entry point for pg-table-replicator
// ABOUTME: Parses commands and routes to appropriate handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pg_table_replicator::commands;
use pg_table_replicator::config::Settings;
use pg_table_replicator::restore::Section;

#[derive(Parser)]
#[command(name = "pg-table-replicator")]
#[command(about = "Batch migration and incremental sync between PostgreSQL databases", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML settings file (batch size, sync interval, pool size)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Batch-copy whole tables from source to target
    Migrate {
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        /// Tables to migrate (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        tables: Vec<String>,
    },
    /// Run one incremental sync cycle using a timestamp watermark
    Sync {
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        /// Tables to sync (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        tables: Vec<String>,
        /// Column holding each row's last-modified timestamp
        #[arg(long, default_value = "updated_at")]
        timestamp_column: String,
    },
    /// Continuously sync on an interval until Ctrl-C
    Watch {
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        /// Tables to sync (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        tables: Vec<String>,
        /// Column holding each row's last-modified timestamp
        #[arg(long, default_value = "updated_at")]
        timestamp_column: String,
    },
    /// Compare row counts between source and target
    Verify {
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        /// Tables to verify (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        tables: Vec<String>,
    },
    /// Print or apply translated CREATE TABLE statements
    Schema {
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: Option<String>,
        /// Tables to translate (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        tables: Vec<String>,
        /// Execute the DDL on the target instead of printing it
        #[arg(long)]
        apply: bool,
    },
    /// Create a custom-format backup artifact with pg_dump
    Backup {
        #[arg(long)]
        source: String,
        /// Output path (default: backup_<timestamp>.dump)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Restore a backup artifact section by section
    Restore {
        #[arg(long)]
        target: String,
        /// Backup artifact created by the backup command
        #[arg(long)]
        artifact: PathBuf,
        /// First section to run, skipping earlier completed ones
        /// (pre-data, data, or post-data)
        #[arg(long, value_parser = parse_section)]
        resume_from: Option<Section>,
        /// Clean the target before restoring all sections
        #[arg(long)]
        full: bool,
    },
}

fn parse_section(name: &str) -> Result<Section, String> {
    Section::parse(name)
        .ok_or_else(|| format!("unknown section '{name}' (expected pre-data, data, or post-data)"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Migrate {
            source,
            target,
            tables,
        } => commands::migrate(&source, &target, &tables, &settings).await,
        Commands::Sync {
            source,
            target,
            tables,
            timestamp_column,
        } => commands::sync(&source, &target, &tables, &timestamp_column, &settings).await,
        Commands::Watch {
            source,
            target,
            tables,
            timestamp_column,
        } => commands::watch(&source, &target, &tables, &timestamp_column, &settings).await,
        Commands::Verify {
            source,
            target,
            tables,
        } => commands::verify(&source, &target, &tables, &settings).await,
        Commands::Schema {
            source,
            target,
            tables,
            apply,
        } => commands::schema(&source, target.as_deref(), &tables, apply, &settings).await,
        Commands::Backup { source, output } => commands::backup(&source, output).await,
        Commands::Restore {
            target,
            artifact,
            resume_from,
            full,
        } => commands::restore(artifact, &target, resume_from, full).await,
    }
}
