//! Storage layer for pipeline-sync
//!
//! PostgreSQL access via `sqlx`: configuration, schema-catalog queries and the
//! idempotent valuation-column migration.

pub mod catalog;
mod column_helpers;
mod config;
mod error;
mod migrator;
mod runner;

pub use column_helpers::{ColumnAddition, add_column_if_not_exists, quote_ident};
pub use config::{DbConfig, DbTarget, resolve_schema};
pub use error::StorageError;
pub use migrator::SchemaMigrator;
pub use runner::{MigrationRunner, run_migration};
