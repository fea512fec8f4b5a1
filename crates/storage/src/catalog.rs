//! Read-only schema catalog queries (`information_schema`).

use pipeline_sync_core::VerifiedColumn;
use sqlx::{Executor, Postgres, Row};

use crate::error::StorageError;

/// Whether `schema.table` exists.
pub async fn table_exists<'e, E>(executor: E, schema: &str, table: &str) -> Result<bool, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = $1 AND table_name = $2
        ) AS present
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_one(executor)
    .await?;
    Ok(row.try_get("present")?)
}

/// Columns of `schema.table` whose names match the `LIKE` pattern, sorted by name.
///
/// Identifier columns are cast to `text`; `information_schema` exposes them as
/// domain types that do not decode as `String`.
pub async fn list_columns<'e, E>(
    executor: E,
    schema: &str,
    table: &str,
    like_pattern: &str,
) -> Result<Vec<VerifiedColumn>, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query(
        r#"
        SELECT column_name::text AS column_name, data_type::text AS data_type
        FROM information_schema.columns
        WHERE table_schema = $1 AND table_name = $2 AND column_name LIKE $3
        ORDER BY column_name
        "#,
    )
    .bind(schema)
    .bind(table)
    .bind(like_pattern)
    .fetch_all(executor)
    .await?;

    rows.iter()
        .map(|row| -> Result<VerifiedColumn, StorageError> {
            Ok(VerifiedColumn {
                name: row.try_get("column_name")?,
                data_type: row.try_get("data_type")?,
            })
        })
        .collect()
}

/// Catalog `data_type` of a single column, `None` when absent.
pub async fn column_type<'e, E>(
    executor: E,
    schema: &str,
    table: &str,
    column: &str,
) -> Result<Option<String>, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query(
        r#"
        SELECT data_type::text AS data_type
        FROM information_schema.columns
        WHERE table_schema = $1 AND table_name = $2 AND column_name = $3
        "#,
    )
    .bind(schema)
    .bind(table)
    .bind(column)
    .fetch_optional(executor)
    .await?;
    row.map(|r| r.try_get("data_type")).transpose().map_err(StorageError::from)
}
