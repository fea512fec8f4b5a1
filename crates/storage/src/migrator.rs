//! Idempotent, atomic application of a schema-extension artifact.
//!
//! One transaction per run: read the catalog, reject type conflicts, add only
//! the missing columns (each in its own savepoint), commit. Re-running against
//! an up-to-date table commits an empty delta and still succeeds.

use std::collections::HashMap;

use pipeline_sync_core::{
    MigrationRunResult, SchemaExtensionSpec, VerifiedColumn, validate_identifier,
};
use sqlx::{Connection, PgConnection};

use crate::catalog;
use crate::column_helpers::{ColumnAddition, add_column_if_not_exists};
use crate::error::StorageError;

#[derive(Debug, Clone)]
pub struct SchemaMigrator {
    spec: SchemaExtensionSpec,
    schema: String,
}

impl SchemaMigrator {
    pub fn new(spec: SchemaExtensionSpec, schema: &str) -> Result<Self, StorageError> {
        validate_identifier(schema)?;
        Ok(Self { spec, schema: schema.to_owned() })
    }

    #[must_use]
    pub fn spec(&self) -> &SchemaExtensionSpec {
        &self.spec
    }

    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Empty result for this migrator's target, before anything has run.
    #[must_use]
    pub fn pending_result(&self) -> MigrationRunResult {
        MigrationRunResult::begin(
            &self.schema,
            self.spec.table(),
            self.spec.version(),
            self.spec.columns().len(),
        )
    }

    /// Apply the artifact as one unit of work, then verify against the catalog.
    ///
    /// Never returns early with a partially committed column set: either the
    /// transaction commits every missing column or it is rolled back.
    pub async fn apply(&self, conn: &mut PgConnection) -> MigrationRunResult {
        let result = self.pending_result();
        let result = match self.extend(conn).await {
            Ok(added) => result.committed(added),
            Err(err) => {
                tracing::warn!(schema = %self.schema, error = %err, "schema extension rolled back");
                return result.failed(err.failure_kind(), &err);
            },
        };
        self.attach_verification(conn, result).await
    }

    /// Run the transactional part only. Returns the columns this run added.
    pub async fn extend(&self, conn: &mut PgConnection) -> Result<Vec<String>, StorageError> {
        let mut tx = conn.begin().await?;
        match self.extend_in_transaction(&mut *tx).await {
            Ok(added) => {
                tx.commit().await?;
                tracing::info!(
                    schema = %self.schema,
                    table = %self.spec.table(),
                    added = added.len(),
                    "schema extension committed"
                );
                Ok(added)
            },
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "explicit rollback failed; connection will discard the transaction");
                }
                Err(err)
            },
        }
    }

    async fn extend_in_transaction(&self, tx: &mut PgConnection) -> Result<Vec<String>, StorageError> {
        let table = self.spec.table();
        if !catalog::table_exists(&mut *tx, &self.schema, table).await? {
            return Err(StorageError::MissingTable {
                schema: self.schema.clone(),
                table: table.to_owned(),
            });
        }

        let existing: HashMap<String, String> =
            catalog::list_columns(&mut *tx, &self.schema, table, &self.spec.like_pattern())
                .await?
                .into_iter()
                .map(|c| (c.name, c.data_type))
                .collect();

        for column in self.spec.columns() {
            if let Some(found) = existing.get(&column.name)
                && !column.column_type.matches_catalog(found)
            {
                return Err(StorageError::TypeConflict {
                    schema: self.schema.clone(),
                    table: table.to_owned(),
                    column: column.name.clone(),
                    expected: column.column_type.catalog_name().to_owned(),
                    found: found.clone(),
                });
            }
        }

        let mut added = Vec::new();
        for column in self.spec.columns().iter().filter(|c| !existing.contains_key(&c.name)) {
            match add_column_if_not_exists(&mut *tx, &self.schema, table, column).await? {
                ColumnAddition::Added => {
                    tracing::info!(schema = %self.schema, column = %column.name, column_type = %column.column_type, "added column");
                    added.push(column.name.clone());
                },
                ColumnAddition::AlreadyPresent => {},
            }
        }

        if added.is_empty() {
            tracing::debug!(schema = %self.schema, "all columns already present");
        }
        Ok(added)
    }

    /// Read-only catalog listing of the artifact's column family.
    pub async fn verify(&self, conn: &mut PgConnection) -> Result<Vec<VerifiedColumn>, StorageError> {
        catalog::list_columns(conn, &self.schema, self.spec.table(), &self.spec.like_pattern()).await
    }

    async fn attach_verification(
        &self,
        conn: &mut PgConnection,
        mut result: MigrationRunResult,
    ) -> MigrationRunResult {
        match self.verify(conn).await {
            Ok(columns) => {
                let declared = self.spec.columns().iter().map(|c| c.name.as_str());
                result = result.with_verification(declared, columns);
                if let Some(missing) = result.columns_missing.as_ref().filter(|m| !m.is_empty()) {
                    tracing::warn!(
                        schema = %self.schema,
                        present = result.columns_present(),
                        expected = result.columns_expected,
                        missing = %missing.join(", "),
                        "declared columns missing after commit"
                    );
                }
            },
            Err(err) => {
                tracing::warn!(schema = %self.schema, error = %err, "post-commit verification failed");
                result.verification_error = Some(err.to_string());
            },
        }
        result
    }
}
