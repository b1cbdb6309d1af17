// ABOUTME: Migration and sync engine built on the store trait seams
// ABOUTME: Exports the batch migrator, incremental syncer, verifier, and scheduler

pub mod migrate;
pub mod report;
pub mod scheduler;
pub mod sync;
pub mod verify;

pub use migrate::BatchMigrator;
pub use report::{MigrationReport, SyncReport, VerifyReport};
pub use scheduler::SyncScheduler;
pub use sync::IncrementalSyncer;
pub use verify::VerificationReconciler;
