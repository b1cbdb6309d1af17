// ABOUTME: Section-ordered crash-safe restore of backup artifacts
// ABOUTME: Exports the section model, state-machine controller, and pg_restore wrapper

pub mod controller;
pub mod section;
pub mod tool;

pub use controller::{RestoreOutcome, RestoreReport, SectionedRestoreController};
pub use section::{Section, SectionState};
pub use tool::{create_backup, PgRestoreTool, SectionRestore};
