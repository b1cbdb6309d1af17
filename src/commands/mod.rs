// ABOUTME: Command implementations for each replication phase
// ABOUTME: Exports migrate, sync, watch, verify, schema, backup, and restore commands

pub mod backup;
pub mod migrate;
pub mod restore;
pub mod schema;
pub mod sync;
pub mod verify;
pub mod watch;

pub use backup::backup;
pub use migrate::migrate;
pub use restore::restore;
pub use schema::schema;
pub use sync::sync;
pub use verify::verify;
pub use watch::watch;
