//! Apply the valuation-column artifact to the configured schema.
//!
//! Idempotent: running against an up-to-date table adds nothing and succeeds.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use pipeline_sync_core::MigrationRunResult;
use pipeline_sync_storage::run_migration;

pub(crate) async fn run(schema: Option<&str>, script: Option<&Path>, json: bool) -> Result<ExitCode> {
    let spec = super::load_spec(script)?;
    let config = super::load_db_config(schema)?;

    let result = run_migration(&config, spec).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_text(&result);
    }

    Ok(if result.succeeded { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn print_text(result: &MigrationRunResult) {
    println!("{}", result.summary());
    if !result.columns_added.is_empty() {
        println!("\nAdded:");
        for name in &result.columns_added {
            println!("  {name}");
        }
    }
    if !result.columns_verified.is_empty() {
        println!("\nPresent after run:");
        for column in &result.columns_verified {
            println!("  {:<32} {}", column.name, column.data_type);
        }
    }
    if let Some(missing) = result.columns_missing.as_ref().filter(|m| !m.is_empty()) {
        println!("\nMissing after run:");
        for name in missing {
            println!("  {name}");
        }
    }
    if let Some(err) = &result.verification_error {
        println!("\nverification failed: {err}");
    }
}
