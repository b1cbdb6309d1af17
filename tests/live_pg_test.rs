// ABOUTME: Integration tests for the full replication workflow against live databases
// ABOUTME: All tests are ignored by default; set TEST_SOURCE_URL and TEST_TARGET_URL to run

use std::env;

use pg_table_replicator::commands;
use pg_table_replicator::config::Settings;
use pg_table_replicator::store::{PgSource, PgTarget, SourceStore, TargetStore};

/// Helper to get test database URLs from environment
fn get_test_urls() -> Option<(String, String)> {
    let source = env::var("TEST_SOURCE_URL").ok()?;
    let target = env::var("TEST_TARGET_URL").ok()?;
    Some((source, target))
}

#[tokio::test]
#[ignore]
async fn test_source_schema_discovery() {
    let (source_url, _) = get_test_urls().expect("TEST_SOURCE_URL and TEST_TARGET_URL must be set");

    let source = PgSource::connect(&source_url).await.unwrap();
    let descriptor = source.fetch_schema("employees").await.unwrap();

    println!("✓ Discovered {} column(s)", descriptor.columns.len());
    assert!(!descriptor.columns.is_empty());
    assert!(
        descriptor.first_primary_key().is_ok(),
        "test table needs a primary key"
    );
}

#[tokio::test]
#[ignore]
async fn test_target_upsert_and_count() {
    let (source_url, target_url) =
        get_test_urls().expect("TEST_SOURCE_URL and TEST_TARGET_URL must be set");

    let source = PgSource::connect(&source_url).await.unwrap();
    let target = PgTarget::connect(&target_url, 4).await.unwrap();

    let descriptor = source.fetch_schema("employees").await.unwrap();
    let columns = descriptor.column_names();
    let rows = source.fetch_all("employees", &columns).await.unwrap();
    println!("Fetched {} row(s) from source", rows.len());

    if !rows.rows.is_empty() {
        let key = descriptor.first_primary_key().unwrap();
        target
            .upsert_batch("employees", key, &columns, &rows.rows)
            .await
            .unwrap();

        // Upsert is idempotent; a second pass must not change counts.
        let before = target.row_count("employees").await.unwrap();
        target
            .upsert_batch("employees", key, &columns, &rows.rows)
            .await
            .unwrap();
        let after = target.row_count("employees").await.unwrap();
        assert_eq!(before, after);
        println!("✓ Upsert idempotent at {} row(s)", after);
    }
}

#[tokio::test]
#[ignore]
async fn test_migrate_command_integration() {
    let (source_url, target_url) =
        get_test_urls().expect("TEST_SOURCE_URL and TEST_TARGET_URL must be set");

    println!("Testing migrate command...");
    println!("⚠ WARNING: This will copy the employees table from source to target!");

    let settings = Settings::default();
    let result = commands::migrate(
        &source_url,
        &target_url,
        &["employees".to_string()],
        &settings,
    )
    .await;

    match &result {
        Ok(_) => {
            println!("✓ Migrate command completed successfully");
        }
        Err(e) => {
            println!("Migrate command failed: {:?}", e);
            // Migration might fail for various reasons (missing table, permissions)
            // We just want to verify the command runs without panicking
        }
    }
}

#[tokio::test]
#[ignore]
async fn test_sync_then_verify_integration() {
    let (source_url, target_url) =
        get_test_urls().expect("TEST_SOURCE_URL and TEST_TARGET_URL must be set");

    let settings = Settings::default();

    println!("Testing sync command...");
    let sync_result = commands::sync(
        &source_url,
        &target_url,
        &["employees".to_string()],
        "updated_at",
        &settings,
    )
    .await;
    match &sync_result {
        Ok(_) => println!("✓ Sync command completed successfully"),
        Err(e) => println!("Sync command failed: {:?}", e),
    }

    println!("Testing verify command...");
    let verify_result = commands::verify(
        &source_url,
        &target_url,
        &["employees".to_string()],
        &settings,
    )
    .await;
    match &verify_result {
        Ok(_) => println!("✓ Verify command completed successfully"),
        Err(e) => {
            println!("Verify command result: {:?}", e);
            // Mismatches are a valid result if the target drifted
        }
    }
}

#[tokio::test]
#[ignore]
async fn test_pool_replaces_terminated_connections() {
    let (_, target_url) = get_test_urls().expect("TEST_SOURCE_URL and TEST_TARGET_URL must be set");

    let target = PgTarget::connect(&target_url, 2).await.unwrap();
    target.row_count("employees").await.unwrap();

    // Kill every other backend on the target database, including the
    // pool's idle connections.
    let admin = pg_table_replicator::store::postgres::connect(&target_url)
        .await
        .unwrap();
    admin
        .execute(
            "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
             WHERE pid <> pg_backend_pid() AND datname = current_database()",
            &[],
        )
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    // The pool must not hand out the dead clients; a fresh connection is
    // made instead and the query succeeds.
    let count = target.row_count("employees").await.unwrap();
    println!("✓ Pool recovered after termination, {} row(s)", count);
}

#[tokio::test]
#[ignore]
async fn test_backup_restore_cycle() {
    let (source_url, target_url) =
        get_test_urls().expect("TEST_SOURCE_URL and TEST_TARGET_URL must be set");

    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("cycle.dump");

    println!("Testing backup command...");
    commands::backup(&source_url, Some(artifact.clone()))
        .await
        .expect("backup should succeed against a live source");
    assert!(artifact.exists());

    println!("Testing restore command...");
    println!("⚠ WARNING: This restores over the target database!");
    let result = commands::restore(artifact, &target_url, None, false).await;
    match &result {
        Ok(_) => println!("✓ Restore completed through all sections"),
        Err(e) => println!("Restore result: {:?}", e),
    }
}
