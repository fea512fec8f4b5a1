use pipeline_sync_core::ColumnSpec;
use sqlx::{Connection, PgConnection};

use crate::catalog;
use crate::error::StorageError;

/// How a guarded column addition ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAddition {
    Added,
    /// Another transaction added it first; the savepoint was rolled back.
    AlreadyPresent,
}

/// Quote an identifier that already passed `validate_identifier`.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Add `column` to `schema.table` inside a savepoint of the open transaction.
///
/// A `duplicate_column` error means a concurrent run won the race: the
/// savepoint is rolled back, the surviving column's type is checked, and the
/// outer transaction carries on.
pub async fn add_column_if_not_exists(
    conn: &mut PgConnection,
    schema: &str,
    table: &str,
    column: &ColumnSpec,
) -> Result<ColumnAddition, StorageError> {
    let sql = format!(
        "ALTER TABLE {}.{} ADD COLUMN {} {}",
        quote_ident(schema),
        quote_ident(table),
        quote_ident(&column.name),
        column.column_type.sql()
    );

    let mut savepoint = conn.begin().await?;
    match sqlx::query(&sql).execute(&mut *savepoint).await.map_err(StorageError::from) {
        Ok(_) => {
            savepoint.commit().await?;
            Ok(ColumnAddition::Added)
        },
        Err(err) if err.is_duplicate_column() => {
            savepoint.rollback().await?;
            tracing::debug!(schema, table, column = %column.name, "column appeared concurrently");
            let found = catalog::column_type(&mut *conn, schema, table, &column.name).await?;
            match found {
                Some(found) if !column.column_type.matches_catalog(&found) => {
                    Err(StorageError::TypeConflict {
                        schema: schema.to_owned(),
                        table: table.to_owned(),
                        column: column.name.clone(),
                        expected: column.column_type.catalog_name().to_owned(),
                        found,
                    })
                },
                _ => Ok(ColumnAddition::AlreadyPresent),
            }
        },
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("ma_irr"), "\"ma_irr\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }
}
