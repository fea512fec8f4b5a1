//! Typed error enum for the storage layer.
//!
//! Callers match on failure modes (connection loss, transient DDL conflict,
//! type conflict) instead of inspecting opaque `sqlx` errors.

use pipeline_sync_core::{CoreError, FailureKind};
use thiserror::Error;

/// SQLSTATE for `duplicate_column`.
const SQLSTATE_DUPLICATE_COLUMN: &str = "42701";
/// SQLSTATE for `serialization_failure`.
const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE for `deadlock_detected`.
const SQLSTATE_DEADLOCK: &str = "40P01";
/// SQLSTATE for `unique_violation`, raised on `pg_attribute` by racing DDL.
const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Could not acquire or keep a connection.
    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// Concurrent DDL lost a race; safe to retry the whole transaction once.
    #[error("transient conflict: {0}")]
    Conflict(#[source] sqlx::Error),

    /// Column already exists (benign for guarded additions).
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    /// Existing column type differs from the declared one.
    #[error("column {schema}.{table}.{column} is {found}, artifact declares {expected}")]
    TypeConflict { schema: String, table: String, column: String, expected: String, found: String },

    /// Target table is missing from the schema.
    #[error("table {schema}.{table} does not exist")]
    MissingTable { schema: String, table: String },

    /// Any other SQL failure.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Missing or malformed database configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid schema name or artifact.
    #[error("invalid input: {0}")]
    Core(#[from] CoreError),
}

impl StorageError {
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Whether this error is a transient DDL race worth one retry.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    #[must_use]
    pub fn is_duplicate_column(&self) -> bool {
        matches!(self, Self::DuplicateColumn(_))
    }

    /// Classification carried into `MigrationRunResult`.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Connection(_) => FailureKind::Connection,
            Self::Conflict(_) | Self::DuplicateColumn(_) => FailureKind::Conflict,
            Self::TypeConflict { .. } => FailureKind::TypeConflict,
            Self::MissingTable { .. } | Self::Database(_) => FailureKind::Database,
            Self::Config(_) | Self::Core(_) => FailureKind::InvalidInput,
        }
    }
}

/// Classifies by error kind and SQLSTATE instead of a blanket `#[from]`.
///
/// - I/O, TLS and pool failures → `Connection`
/// - SQLSTATE 42701 → `DuplicateColumn`
/// - SQLSTATE 40001 / 40P01 / 23505 → `Conflict`
/// - Everything else → `Database`
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Connection(err),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(SQLSTATE_DUPLICATE_COLUMN) => Self::DuplicateColumn(db_err.message().to_owned()),
                Some(
                    SQLSTATE_SERIALIZATION_FAILURE | SQLSTATE_DEADLOCK | SQLSTATE_UNIQUE_VIOLATION,
                ) => Self::Conflict(err),
                _ => Self::Database(err),
            },
            _ => Self::Database(err),
        }
    }
}
