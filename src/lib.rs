// ABOUTME: Library module for pg-table-replicator
// ABOUTME: Exports all core functionality for use in binary and tests

pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod monitor;
pub mod restore;
pub mod schema;
pub mod store;
pub mod utils;
