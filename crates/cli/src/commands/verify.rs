//! Read-only check of the valuation columns present in the catalog.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use pipeline_sync_storage::{SchemaMigrator, StorageError};

pub(crate) async fn run(schema: Option<&str>, script: Option<&Path>, json: bool) -> Result<ExitCode> {
    let spec = super::load_spec(script)?;
    let config = super::load_db_config(schema)?;
    let migrator = SchemaMigrator::new(spec, &config.schema)?;

    let pool = config.lazy_pool()?;
    let verified = {
        let mut conn = pool.acquire().await.map_err(StorageError::from)?;
        migrator.verify(&mut *conn).await
    };
    pool.close().await;
    let verified = verified?;

    let missing: Vec<&str> = migrator
        .spec()
        .columns()
        .iter()
        .filter(|c| !verified.iter().any(|v| v.name == c.name))
        .map(|c| c.name.as_str())
        .collect();

    if json {
        let body = serde_json::json!({
            "schema": migrator.schema(),
            "table": migrator.spec().table(),
            "columns_expected": migrator.spec().columns().len(),
            "columns_verified": verified,
            "missing": missing,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!(
            "{}.{}: {} of {} column(s) present",
            migrator.schema(),
            migrator.spec().table(),
            verified.len(),
            migrator.spec().columns().len()
        );
        for column in &verified {
            println!("  {:<32} {}", column.name, column.data_type);
        }
        for name in &missing {
            println!("  {name:<32} (missing)");
        }
    }

    Ok(if missing.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
